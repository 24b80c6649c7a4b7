//! Session block catalog
//!
//! Lists which blocks of a session exist and which channels captured them.
//! A session either carries an `index.csv` written by the receiver, or the
//! catalog is rebuilt by scanning the `ch0/` directory and probing the other
//! channel directories for the same block file.
//!
//! Index files come in two shapes:
//!
//! ```text
//! Timestamp,Block,Channel,Frequency,...      (header, columns found by name)
//! 1718000000.1,7,0,433920000,0,0,ch0/...     (no header, fixed positions)
//! ```
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::store::{block_file_name, channel_dir_name};

/// Name of the optional per-session index file.
pub const INDEX_FILE: &str = "index.csv";

// Positions in a headerless index row
const BLOCK_COLUMN: usize = 1;
const CHANNEL_COLUMN: usize = 2;

/// Channels captured for one block of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRecord {
    pub session: String,
    pub block_index: u32,
    /// Sorted, without duplicates
    pub channels: Vec<u8>,
}

impl BlockRecord {
    pub fn has_channel(&self, channel: u8) -> bool {
        self.channels.binary_search(&channel).is_ok()
    }
}

/// Enumerates the blocks available to a host.
pub trait BlockCatalog {
    /// Records sorted by block index.
    fn records(&self) -> Result<Vec<BlockRecord>>;
}

/// First record holding both channels.
pub fn find_block_with(records: &[BlockRecord], first: u8, second: u8) -> Option<&BlockRecord> {
    records
        .iter()
        .find(|r| r.has_channel(first) && r.has_channel(second))
}

/// Catalog read from a session's `index.csv`.
#[derive(Debug, Clone)]
pub struct IndexCatalog {
    session: String,
    path: PathBuf,
    channel_count: u8,
}

impl IndexCatalog {
    /// `channel_count` is assumed for indexes that list blocks without channels.
    pub fn new<S: Into<String>, P: Into<PathBuf>>(session: S, path: P, channel_count: u8) -> Self {
        Self {
            session: session.into(),
            path: path.into(),
            channel_count,
        }
    }
}

impl BlockCatalog for IndexCatalog {
    fn records(&self) -> Result<Vec<BlockRecord>> {
        let content = fs::read_to_string(&self.path)?;
        let records = parse_index(&self.session, &content, self.channel_count)?;
        info!(
            path = %self.path.display(),
            blocks = records.len(),
            "loaded session index"
        );
        Ok(records)
    }
}

/// Parse the content of an `index.csv`.
pub fn parse_index(session: &str, content: &str, channel_count: u8) -> Result<Vec<BlockRecord>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    let Some(&(_, first)) = lines.peek() else {
        return Ok(Vec::new());
    };

    let (block_column, channel_column) = if is_header(first) {
        lines.next();
        let header: Vec<&str> = first.split(',').map(str::trim).collect();
        let block = column(&header, &["block", "blockindex"])
            .ok_or_else(|| Error::catalog("index header has no Block column"))?;
        (block, column(&header, &["channel"]))
    } else {
        (BLOCK_COLUMN, Some(CHANNEL_COLUMN))
    };

    let mut blocks: BTreeMap<u32, BTreeSet<u8>> = BTreeMap::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let block_index = field(&fields, block_column, line_no)?;
        let channels = blocks.entry(block_index).or_default();
        match channel_column {
            Some(col) => {
                channels.insert(field(&fields, col, line_no)?);
            }
            None => channels.extend(0..channel_count),
        }
    }

    Ok(blocks
        .into_iter()
        .map(|(block_index, channels)| BlockRecord {
            session: session.to_string(),
            block_index,
            channels: channels.into_iter().collect(),
        })
        .collect())
}

fn is_header(line: &str) -> bool {
    line.split(',')
        .next()
        .is_some_and(|f| f.chars().any(|c| c.is_alphabetic()))
}

fn column(header: &[&str], names: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

fn field<T: std::str::FromStr>(fields: &[&str], col: usize, line_no: usize) -> Result<T> {
    let raw = fields
        .get(col)
        .ok_or_else(|| Error::catalog(format!("line {line_no}: missing column {col}")))?;
    raw.parse()
        .map_err(|_| Error::catalog(format!("line {line_no}: invalid value '{raw}'")))
}

/// Catalog rebuilt from the channel directories of a session.
#[derive(Debug, Clone)]
pub struct ScanCatalog {
    session: String,
    session_dir: PathBuf,
    channel_count: u8,
}

impl ScanCatalog {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(
        session: S,
        session_dir: P,
        channel_count: u8,
    ) -> Self {
        Self {
            session: session.into(),
            session_dir: session_dir.into(),
            channel_count,
        }
    }
}

impl BlockCatalog for ScanCatalog {
    fn records(&self) -> Result<Vec<BlockRecord>> {
        let ch0 = self.session_dir.join(channel_dir_name(0));
        if !ch0.is_dir() {
            return Err(Error::catalog(format!(
                "{} not found, cannot scan session",
                ch0.display()
            )));
        }

        let mut block_indices: Vec<u32> = fs::read_dir(&ch0)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_block_file_name(&entry.file_name().to_string_lossy()))
            .collect();
        block_indices.sort_unstable();

        let records: Vec<BlockRecord> = block_indices
            .into_iter()
            .map(|block_index| BlockRecord {
                session: self.session.clone(),
                block_index,
                channels: (0..self.channel_count)
                    .filter(|&ch| self.block_exists(ch, block_index))
                    .collect(),
            })
            .filter(|r| !r.channels.is_empty())
            .collect();

        info!(
            dir = %self.session_dir.display(),
            blocks = records.len(),
            "scanned session directory"
        );
        Ok(records)
    }
}

impl ScanCatalog {
    fn block_exists(&self, channel: u8, block_index: u32) -> bool {
        let path = self
            .session_dir
            .join(channel_dir_name(channel))
            .join(block_file_name(block_index));
        let exists = path.is_file();
        if !exists {
            debug!(path = %path.display(), "channel missing for block");
        }
        exists
    }
}

/// Block index of a `block_<n>.bin` file name.
pub fn parse_block_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("block_")?.strip_suffix(".bin")?.parse().ok()
}

/// Index-backed catalog when `index.csv` exists and parses, directory scan
/// otherwise.
#[derive(Debug, Clone)]
pub struct SessionCatalog {
    session: String,
    session_dir: PathBuf,
    channel_count: u8,
}

impl SessionCatalog {
    pub fn new<S: Into<String>>(session: S, session_dir: &Path, channel_count: u8) -> Self {
        Self {
            session: session.into(),
            session_dir: session_dir.to_path_buf(),
            channel_count,
        }
    }
}

impl BlockCatalog for SessionCatalog {
    fn records(&self) -> Result<Vec<BlockRecord>> {
        let index = self.session_dir.join(INDEX_FILE);
        if index.is_file() {
            match IndexCatalog::new(self.session.clone(), index.clone(), self.channel_count).records() {
                Ok(records) => return Ok(records),
                Err(e) => {
                    warn!(path = %index.display(), error = %e, "unreadable index file, scanning");
                }
            }
        } else {
            debug!(dir = %self.session_dir.display(), "no index file, scanning");
        }
        ScanCatalog::new(self.session.clone(), &self.session_dir, self.channel_count).records()
    }
}
