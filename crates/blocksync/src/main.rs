//! Inter-channel delay of a multi-channel IQ capture session
//!
//! Reads one block of two channels from a session directory and reports by
//! how many samples the candidate channel trails the reference channel.
//!
//! # Usage Examples
//!
//! ## List the blocks of a session
//! ```bash
//! blocksync --base _logs/iq_data --session session --list
//! ```
//!
//! ## Channel 1 against channel 0, block 7
//! ```bash
//! blocksync --base _logs/iq_data --block 7 -r 0 -c 1 -v
//! ```
//!
//! ## JSON output, tolerating truncated block files
//! ```bash
//! blocksync --block 7 --tolerant --json
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::{info, warn};

use blocksync::sync::{DEFAULT_ANALYSIS_LEN, DEFAULT_WINDOW_HALF};
use blocksync::{
    BlockCatalog, DirCaptureStore, Error, LoadMode, SessionCatalog, SyncRequest,
    find_block_with, synchronize_with_timeout,
};

#[derive(Debug, Clone, Copy)]
struct SampleRate(f64);

#[derive(Parser, Debug)]
#[command(author, version, about = "Inter-channel sample delay of block-based IQ captures", long_about = None)]
struct Args {
    /// Directory holding the session directories (accepts ~)
    #[arg(short, long, default_value = "_logs/iq_data")]
    base: String,

    /// Session directory name
    #[arg(short, long, default_value = "session")]
    session: String,

    /// Block index (default: first block holding both channels)
    #[arg(long)]
    block: Option<u32>,

    /// Reference channel
    #[arg(short, long, default_value_t = 0)]
    reference: u8,

    /// Candidate channel, whose delay against the reference is reported
    #[arg(short, long, default_value_t = 1)]
    candidate: u8,

    /// Samples per channel used for the correlation (N)
    #[arg(short = 'n', long, default_value_t = DEFAULT_ANALYSIS_LEN)]
    samples: usize,

    /// Sample rate in Hz (accepts k/M suffix, e.g. 2.4M)
    #[arg(long, default_value = "2.4M", value_parser = SampleRate::from_str)]
    sample_rate: SampleRate,

    /// Number of channel directories probed when scanning a session
    #[arg(long, default_value_t = 4)]
    channels: u8,

    /// Drop the trailing byte of odd-length blocks instead of failing
    #[arg(long, default_value_t = false)]
    tolerant: bool,

    /// Correlation points shown on each side of the peak
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_HALF)]
    window: usize,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// List the blocks and channels of the session and exit
    #[arg(short, long, default_value_t = false)]
    list: bool,

    /// Output as JSON (one object per line)
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Verbosity level (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> blocksync::Result<()> {
    let args = Args::parse();

    // 0 = WARN (quiet), 1 = INFO, 2 = DEBUG, 3+ = TRACE
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .try_init();

    let store = Arc::new(DirCaptureStore::new(&args.base));
    let catalog = SessionCatalog::new(
        args.session.clone(),
        &store.session_dir(&args.session),
        args.channels,
    );

    if args.list {
        for record in catalog.records()? {
            if args.json {
                match serde_json::to_string(&record) {
                    Ok(json_str) => println!("{}", json_str),
                    Err(e) => warn!("could not serialize block record: {}", e),
                }
            } else {
                println!(
                    "{} block {:05}: channels {:?}",
                    record.session, record.block_index, record.channels
                );
            }
        }
        return Ok(());
    }

    let block_index = match args.block {
        Some(block) => block,
        None => {
            let records = catalog.records()?;
            let record = find_block_with(&records, args.reference, args.candidate).ok_or_else(
                || {
                    Error::catalog(format!(
                        "no block of session '{}' holds channels {} and {}",
                        args.session, args.reference, args.candidate
                    ))
                },
            )?;
            info!(block = record.block_index, "selected first block with both channels");
            record.block_index
        }
    };

    let request = SyncRequest {
        max_samples: Some(args.samples),
        load_mode: if args.tolerant {
            LoadMode::Tolerant
        } else {
            LoadMode::Strict
        },
        window_half: args.window,
        sample_rate: Some(args.sample_rate.0),
        ..SyncRequest::new(args.session.clone(), block_index, args.reference, args.candidate)
    };

    let timeout = args.timeout_ms.map(Duration::from_millis);
    let report = synchronize_with_timeout(store, request, timeout).await?;

    if args.json {
        match serde_json::to_string(&report) {
            Ok(json_str) => println!("{}", json_str),
            Err(e) => warn!("could not serialize report: {}", e),
        }
    } else {
        print!("{}", report);
    }

    Ok(())
}

impl FromStr for SampleRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rate = if let Some(stripped) = s.strip_suffix('M') {
            let val: f64 = stripped.trim().parse().map_err(|_| "Invalid MHz value")?;
            val * 1_000_000.0
        } else if let Some(stripped) = s.strip_suffix('k') {
            let val: f64 = stripped.trim().parse().map_err(|_| "Invalid kHz value")?;
            val * 1_000.0
        } else {
            s.parse().map_err(|_| "Invalid Hz value")?
        };
        if rate > 0.0 {
            Ok(SampleRate(rate))
        } else {
            Err(format!("Sample rate must be positive, got {}", s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rate_suffixes() {
        assert_eq!(SampleRate::from_str("2.4M").unwrap().0, 2_400_000.0);
        assert_eq!(SampleRate::from_str("250k").unwrap().0, 250_000.0);
        assert_eq!(SampleRate::from_str("96000").unwrap().0, 96_000.0);
    }

    #[test]
    fn test_sample_rate_rejects_garbage() {
        assert!(SampleRate::from_str("fast").is_err());
        assert!(SampleRate::from_str("0").is_err());
        assert!(SampleRate::from_str("-2M").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["blocksync"]);
        assert_eq!(args.session, "session");
        assert_eq!(args.reference, 0);
        assert_eq!(args.candidate, 1);
        assert_eq!(args.samples, DEFAULT_ANALYSIS_LEN);
        assert_eq!(args.sample_rate.0, 2_400_000.0);
        assert!(!args.tolerant);
    }

    #[test]
    fn test_args_pair_selection() {
        let args = Args::parse_from(["blocksync", "--block", "7", "-r", "2", "-c", "3", "-vv"]);
        assert_eq!(args.block, Some(7));
        assert_eq!(args.reference, 2);
        assert_eq!(args.candidate, 3);
        assert_eq!(args.verbose, 2);
    }
}
