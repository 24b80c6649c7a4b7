//! Pair synchronization driver
//!
//! Reads one block of two channels from a [`CaptureStore`], loads both,
//! brings them to a common length and estimates the candidate's delay
//! against the reference.
use std::sync::Arc;
use std::time::Duration;

use iqsync::{estimate_delay, truncate_to_common};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::load::{LoadMode, load_block};
use crate::report::SyncReport;
use crate::store::{BlockKey, CaptureStore};

/// Samples per channel in one receiver block.
pub const DEFAULT_ANALYSIS_LEN: usize = 262_144;

/// Curve points logged and reported on each side of the peak.
pub const DEFAULT_WINDOW_HALF: usize = 5;

/// What to align.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRequest {
    pub session: String,
    pub block_index: u32,
    pub reference: u8,
    pub candidate: u8,
    /// Analysis length N; `None` uses the whole block
    pub max_samples: Option<usize>,
    pub load_mode: LoadMode,
    pub window_half: usize,
    /// Hz, only used to express the shift in seconds
    pub sample_rate: Option<f64>,
}

impl SyncRequest {
    pub fn new<S: Into<String>>(session: S, block_index: u32, reference: u8, candidate: u8) -> Self {
        Self {
            session: session.into(),
            block_index,
            reference,
            candidate,
            max_samples: Some(DEFAULT_ANALYSIS_LEN),
            load_mode: LoadMode::Strict,
            window_half: DEFAULT_WINDOW_HALF,
            sample_rate: None,
        }
    }

    pub fn reference_key(&self) -> BlockKey {
        BlockKey::new(self.session.clone(), self.block_index, self.reference)
    }

    pub fn candidate_key(&self) -> BlockKey {
        BlockKey::new(self.session.clone(), self.block_index, self.candidate)
    }
}

/// Estimate the delay of `request.candidate` relative to `request.reference`.
pub fn synchronize<S: CaptureStore + ?Sized>(store: &S, request: &SyncRequest) -> Result<SyncReport> {
    let reference_key = request.reference_key();
    let candidate_key = request.candidate_key();

    let raw = store.read_block(&reference_key)?;
    let mut reference = load_block(&reference_key, &raw, request.max_samples, request.load_mode)?;
    let raw = store.read_block(&candidate_key)?;
    let mut candidate = load_block(&candidate_key, &raw, request.max_samples, request.load_mode)?;

    if reference.len() != candidate.len() {
        info!(
            reference = reference.len(),
            candidate = candidate.len(),
            "channel lengths differ, truncating to the shorter one"
        );
    }
    let n = truncate_to_common(&mut reference, &mut candidate);
    debug!(block = request.block_index, n, "correlating");

    let result = estimate_delay(&reference, &candidate)?;
    let report = SyncReport::new(request, &result);

    info!(
        block = report.block_index,
        reference = report.reference,
        candidate = report.candidate,
        peak_index = report.peak_index,
        peak_power = report.peak_power,
        shift_samples = report.shift_samples,
        "correlation peak"
    );
    for point in &report.peak_window {
        trace!(
            k = point.k,
            power = point.power,
            peak = point.k == report.peak_index,
            "correlation window"
        );
    }

    Ok(report)
}

/// Run [`synchronize`] on the blocking pool, giving up after `timeout`.
///
/// The computation has no cancellation points: on timeout the worker runs to
/// completion in the background and its result is discarded.
pub async fn synchronize_with_timeout<S>(
    store: Arc<S>,
    request: SyncRequest,
    timeout: Option<Duration>,
) -> Result<SyncReport>
where
    S: CaptureStore + Send + Sync + 'static,
{
    let task = tokio::task::spawn_blocking(move || synchronize(store.as_ref(), &request));
    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => task.await,
    };
    joined.map_err(|e| Error::Task(e.to_string()))?
}
