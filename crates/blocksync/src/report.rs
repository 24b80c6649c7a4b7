//! Alignment report for one block pair.
use std::fmt;

use iqsync::CrossCorrelation;
use serde::Serialize;

use crate::sync::SyncRequest;

/// Curve value near the peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowPoint {
    pub k: usize,
    pub power: f64,
}

/// Result of aligning the candidate channel of a block to its reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub session: String,
    pub block_index: u32,
    pub reference: u8,
    pub candidate: u8,
    /// Samples per channel after truncation (N)
    pub analysis_len: usize,
    /// Number of checked shifts (2N)
    pub curve_length: usize,
    pub peak_index: usize,
    /// Positive when the candidate lags the reference
    pub shift_samples: i64,
    pub peak_power: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<f64>,
    pub peak_window: Vec<WindowPoint>,
}

impl SyncReport {
    pub fn new(request: &SyncRequest, result: &CrossCorrelation) -> Self {
        let estimate = &result.estimate;
        let peak_window = result
            .curve
            .window(estimate.peak_index, request.window_half)
            .into_iter()
            .map(|p| WindowPoint {
                k: p.index,
                power: p.power,
            })
            .collect();

        Self {
            session: request.session.clone(),
            block_index: request.block_index,
            reference: request.reference,
            candidate: request.candidate,
            analysis_len: estimate.analysis_len(),
            curve_length: estimate.curve_length,
            peak_index: estimate.peak_index,
            shift_samples: estimate.shift_samples,
            peak_power: estimate.peak_power,
            delay_seconds: request.sample_rate.map(|fs| estimate.delay_seconds(fs)),
            peak_window,
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Session {}, block {}, channels {} and {}",
            self.session, self.block_index, self.reference, self.candidate
        )?;
        writeln!(f, "Samples per channel (N): {}", self.analysis_len)?;
        writeln!(f, "Correlation length (checked shifts k): {}", self.curve_length)?;
        writeln!(f, "Peak index: {}", self.peak_index)?;
        write!(
            f,
            "Channel {} delay relative to channel {}: {} samples",
            self.candidate, self.reference, self.shift_samples
        )?;
        match self.delay_seconds {
            Some(seconds) => writeln!(f, " ({:.3} us)", seconds * 1e6)?,
            None => writeln!(f)?,
        }
        writeln!(f, "Max correlation value: {:.2e}", self.peak_power)?;
        for point in &self.peak_window {
            let mark = if point.k == self.peak_index {
                " <-- peak"
            } else {
                ""
            };
            writeln!(f, "  k={}: correlation = {:.2e}{}", point.k, point.power, mark)?;
        }
        Ok(())
    }
}
