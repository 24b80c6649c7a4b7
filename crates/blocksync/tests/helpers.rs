//! Test helper utilities for building capture sessions on disk

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Deterministic pseudo-random Cu8 bytes (64-bit LCG, high byte)
pub fn generate_noise_cu8(seed: u64, num_samples: usize) -> Vec<u8> {
    let mut state = seed;
    (0..num_samples * 2)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

/// Delay a Cu8 capture by `delay >= 0` samples, keeping its length
pub fn delay_cu8(bytes: &[u8], delay: usize) -> Vec<u8> {
    std::iter::repeat_n(128u8, delay * 2)
        .chain(bytes.iter().copied())
        .take(bytes.len())
        .collect()
}

/// Temporary base directory, removed on drop
pub struct TempBase {
    path: PathBuf,
}

impl TempBase {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("blocksync_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("Failed to create test directory");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `<base>/<session>/ch<channel>/block_<block>.bin`
    pub fn write_block(&self, session: &str, channel: u8, block: u32, bytes: &[u8]) {
        let dir = self.path.join(session).join(format!("ch{channel}"));
        fs::create_dir_all(&dir).expect("Failed to create channel directory");
        fs::write(dir.join(format!("block_{block:05}.bin")), bytes)
            .expect("Failed to write block file");
    }

    pub fn write_index(&self, session: &str, content: &str) {
        let dir = self.path.join(session);
        fs::create_dir_all(&dir).expect("Failed to create session directory");
        fs::write(dir.join("index.csv"), content).expect("Failed to write index");
    }
}

impl Drop for TempBase {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.path).ok();
    }
}
