//! Capture storage
//!
//! A session directory holds one sub-directory per channel, each with one
//! file per block:
//!
//! ```text
//! <base>/<session>/ch0/block_00007.bin
//! <base>/<session>/ch1/block_00007.bin
//! ```
//!
//! [`CaptureStore`] abstracts where the raw bytes come from so the sync
//! driver can run against files or memory alike.
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Identifies one channel's capture of one block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockKey {
    pub session: String,
    pub block_index: u32,
    pub channel: u8,
}

impl BlockKey {
    pub fn new<S: Into<String>>(session: S, block_index: u32, channel: u8) -> Self {
        Self {
            session: session.into(),
            block_index,
            channel,
        }
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/ch{}/block_{:05}",
            self.session, self.channel, self.block_index
        )
    }
}

/// Source of raw interleaved Cu8 block content.
pub trait CaptureStore {
    /// Raw bytes stored under `key`, or [`Error::NotFound`].
    fn read_block(&self, key: &BlockKey) -> Result<Vec<u8>>;
}

/// File name of a block inside a channel directory.
pub fn block_file_name(block_index: u32) -> String {
    format!("block_{block_index:05}.bin")
}

/// Channel directory name inside a session directory.
pub fn channel_dir_name(channel: u8) -> String {
    format!("ch{channel}")
}

/// Captures laid out on disk under a base directory.
#[derive(Debug, Clone)]
pub struct DirCaptureStore {
    base: PathBuf,
}

impl DirCaptureStore {
    /// `base` may start with `~`, which is expanded to the home directory.
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            base: expanduser(base.as_ref().to_path_buf()),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn session_dir(&self, session: &str) -> PathBuf {
        self.base.join(session)
    }

    pub fn block_path(&self, key: &BlockKey) -> PathBuf {
        self.session_dir(&key.session)
            .join(channel_dir_name(key.channel))
            .join(block_file_name(key.block_index))
    }
}

impl CaptureStore for DirCaptureStore {
    fn read_block(&self, key: &BlockKey) -> Result<Vec<u8>> {
        let path = self.block_path(key);
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "read block");
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(key.clone())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Captures held in memory, keyed by [`BlockKey`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCaptureStore {
    blocks: HashMap<BlockKey, Vec<u8>>,
}

impl MemoryCaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: BlockKey, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.blocks.insert(key, bytes)
    }
}

impl CaptureStore for MemoryCaptureStore {
    fn read_block(&self, key: &BlockKey) -> Result<Vec<u8>> {
        self.blocks
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.clone()))
    }
}

pub(crate) fn expanduser(path: PathBuf) -> PathBuf {
    // Only "~" and "~/..."; "~user" forms are left alone
    if let Some(p) = path.to_str()
        && (p == "~" || p.starts_with("~/"))
        && let Some(home_dir) = dirs::home_dir()
    {
        return home_dir.join(p[1..].trim_start_matches('/'));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_path_layout() {
        let store = DirCaptureStore::new("/data/iq");
        let path = store.block_path(&BlockKey::new("session", 7, 2));
        assert_eq!(path, PathBuf::from("/data/iq/session/ch2/block_00007.bin"));
    }

    #[test]
    fn test_block_file_name_padding() {
        assert_eq!(block_file_name(0), "block_00000.bin");
        assert_eq!(block_file_name(123456), "block_123456.bin");
    }

    #[test]
    fn test_expanduser_with_tilde() {
        let home = dirs::home_dir().expect("Could not get home directory");
        let store = DirCaptureStore::new("~/captures");
        assert_eq!(store.base(), home.join("captures"));
    }

    #[test]
    fn test_expanduser_bare_tilde() {
        let home = dirs::home_dir().expect("Could not get home directory");
        assert_eq!(DirCaptureStore::new("~").base(), home);
    }

    #[test]
    fn test_expanduser_leaves_other_users_alone() {
        let store = DirCaptureStore::new("~other/captures");
        assert_eq!(store.base(), Path::new("~other/captures"));
    }

    #[test]
    fn test_expanduser_leaves_plain_paths() {
        let store = DirCaptureStore::new("relative/captures");
        assert_eq!(store.base(), Path::new("relative/captures"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let store = DirCaptureStore::new(std::env::temp_dir().join("blocksync_no_such_base"));
        let key = BlockKey::new("session", 1, 0);
        assert!(matches!(store.read_block(&key), Err(Error::NotFound(k)) if k == key));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryCaptureStore::new();
        let key = BlockKey::new("s", 3, 1);
        store.insert(key.clone(), vec![1, 2, 3, 4]);
        assert_eq!(store.read_block(&key).unwrap(), vec![1, 2, 3, 4]);
        assert!(matches!(
            store.read_block(&BlockKey::new("s", 3, 0)),
            Err(Error::NotFound(_))
        ));
    }
}
