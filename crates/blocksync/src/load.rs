//! Block loading policy
//!
//! The core loader rejects odd-length blocks. Receivers that were stopped
//! mid-write can leave a single trailing byte behind, so hosts may opt into
//! [`LoadMode::Tolerant`], which drops that byte with a warning and then goes
//! through the strict loader.

use iqsync::{ChannelSamples, load_channel_block};
use tracing::warn;

use crate::error::Result;
use crate::store::BlockKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Odd-length blocks are an error
    #[default]
    Strict,
    /// Odd-length blocks lose their trailing byte
    Tolerant,
}

/// Load `raw` as centered samples according to `mode`.
pub fn load_block(
    key: &BlockKey,
    raw: &[u8],
    max_samples: Option<usize>,
    mode: LoadMode,
) -> Result<ChannelSamples> {
    let raw = match mode {
        LoadMode::Tolerant if raw.len() % 2 != 0 => {
            warn!(block = %key, bytes = raw.len(), "dropping trailing byte of odd-length block");
            &raw[..raw.len() - 1]
        }
        _ => raw,
    };
    Ok(load_channel_block(raw, max_samples)?)
}
