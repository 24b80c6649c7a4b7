//! Channel alignment for block-based multi-channel I/Q capture sessions.
//!
//! Hosts the pieces around the [`iqsync`] core that a receiver setup needs:
//! - [`store`]: where the raw block bytes live (`<base>/<session>/ch<N>/block_<B>.bin`)
//! - [`catalog`]: which blocks and channels a session holds (`index.csv` or directory scan)
//! - [`load`]: strict or tolerant loading of block bytes
//! - [`sync`]: the pair driver, with an optional deadline
//! - [`report`]: the per-pair result, as text or JSON

pub mod catalog;
pub mod error;
pub mod load;
pub mod report;
pub mod store;
pub mod sync;

pub use catalog::{BlockCatalog, BlockRecord, SessionCatalog, find_block_with};
pub use error::{Error, Result};
pub use load::LoadMode;
pub use report::SyncReport;
pub use store::{BlockKey, CaptureStore, DirCaptureStore, MemoryCaptureStore};
pub use sync::{SyncRequest, synchronize, synchronize_with_timeout};
