//! Cross-correlation delay estimation
//!
//! Estimates the integer number of samples by which a candidate channel trails
//! (or leads) a reference channel, using a circular cross-correlation computed
//! in the frequency domain.
//!
//! # Zero-padding
//!
//! Both sequences of length `N` are padded to `2N` on opposite ends:
//!
//! ```text
//! x = [ reference | 0 .. 0 ]
//! y = [ 0 .. 0 | candidate ]
//! ```
//!
//! The `N` zeros keep the circular correlation from wrapping for any true
//! delay in `(-N, N)`, so it behaves as a linear correlation over that range.
//!
//! # Curve indexing
//!
//! Index `k` of the [`CorrelationCurve`] hypothesizes that the candidate lags
//! the reference by `N - k` samples. The reported shift is therefore
//! `N - peak_index`: positive when the candidate arrives later, negative when
//! it arrives earlier.
//!
//! ```
//! use iqsync::{ChannelSamples, estimate_delay};
//! use num_complex::Complex;
//!
//! let mut reference = vec![Complex::new(0.0f32, 0.0); 8];
//! let mut candidate = reference.clone();
//! reference[0] = Complex::new(1.0, 0.0);
//! candidate[3] = Complex::new(1.0, 0.0);
//!
//! let result = estimate_delay(&ChannelSamples::from(reference), &ChannelSamples::new(candidate))?;
//! assert_eq!(result.estimate.shift_samples, 3);
//! assert_eq!(result.estimate.peak_index, 5);
//! # Ok::<(), iqsync::Error>(())
//! ```
use std::ops::Deref;

use num_complex::Complex;
use rustfft::FftPlanner;

use crate::capture::ChannelSamples;
use crate::error::{Error, Result};

/// Outcome of a delay estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayEstimate {
    /// `N - peak_index`; positive when the candidate lags the reference
    pub shift_samples: i64,
    /// Position of the curve maximum, in `[0, 2N)`
    pub peak_index: usize,
    /// Correlation power at `peak_index`
    pub peak_power: f64,
    /// Always `2N`
    pub curve_length: usize,
}

impl DelayEstimate {
    /// Analysis length `N` the estimate was computed over.
    pub fn analysis_len(&self) -> usize {
        self.curve_length / 2
    }

    /// Shift converted to seconds at the given sample rate (Hz).
    pub fn delay_seconds(&self, sample_rate: f64) -> f64 {
        self.shift_samples as f64 / sample_rate
    }
}

/// One point of the correlation curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub index: usize,
    pub power: f64,
}

/// Correlation power per candidate shift index, `2N` values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrelationCurve(Vec<f64>);

impl CorrelationCurve {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Index and power of the maximum. Ties resolve to the lowest index.
    pub fn peak(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &power) in self.0.iter().enumerate() {
            if best.is_none_or(|(_, top)| power > top) {
                best = Some((index, power));
            }
        }
        best
    }

    /// Points within `half` indices of `center`, clipped to the curve bounds.
    pub fn window(&self, center: usize, half: usize) -> Vec<CurvePoint> {
        if self.0.is_empty() {
            return Vec::new();
        }
        let start = center.saturating_sub(half);
        let end = center.saturating_add(half).min(self.0.len() - 1);
        (start..=end)
            .map(|index| CurvePoint {
                index,
                power: self.0[index],
            })
            .collect()
    }
}

impl Deref for CorrelationCurve {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Estimate together with the full curve it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossCorrelation {
    pub estimate: DelayEstimate,
    pub curve: CorrelationCurve,
}

/// FFT cross-correlation delay estimator.
///
/// Holds an FFT planner so repeated estimations of the same length reuse
/// their plans. No sample data is kept between calls. The planner is not
/// shared: use one estimator per thread.
pub struct DelayEstimator {
    planner: FftPlanner<f64>,
}

impl Default for DelayEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayEstimator {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Correlate `candidate` against `reference`.
    ///
    /// Both sequences must hold the same number `N > 0` of samples; use
    /// [`truncate_to_common`] first when they do not.
    pub fn estimate(
        &mut self,
        reference: &ChannelSamples,
        candidate: &ChannelSamples,
    ) -> Result<CrossCorrelation> {
        let n = analysis_len(reference, candidate)?;
        let len = 2 * n;
        let forward = self.planner.plan_fft_forward(len);
        let inverse = self.planner.plan_fft_inverse(len);

        let mut x = pad_trailing(reference, n);
        let mut y = pad_leading(candidate, n);
        forward.process(&mut x);
        forward.process(&mut y);

        // conj(Y) * X puts a candidate lag of d samples at index N - d
        for (xv, yv) in x.iter_mut().zip(y.iter()) {
            *xv = yv.conj() * *xv;
        }
        inverse.process(&mut x);

        let scale = 1.0 / len as f64;
        let curve = CorrelationCurve(x.iter().map(|c| (*c * scale).norm_sqr()).collect());
        let (peak_index, peak_power) = curve.peak().ok_or(Error::EmptyInput)?;

        let estimate = DelayEstimate {
            shift_samples: n as i64 - peak_index as i64,
            peak_index,
            peak_power,
            curve_length: curve.len(),
        };
        Ok(CrossCorrelation { estimate, curve })
    }
}

/// Correlate `candidate` against `reference` with a fresh estimator.
pub fn estimate_delay(
    reference: &ChannelSamples,
    candidate: &ChannelSamples,
) -> Result<CrossCorrelation> {
    DelayEstimator::new().estimate(reference, candidate)
}

/// Truncate both sequences to the shorter length and return that length.
pub fn truncate_to_common(reference: &mut ChannelSamples, candidate: &mut ChannelSamples) -> usize {
    let n = reference.len().min(candidate.len());
    reference.truncate(n);
    candidate.truncate(n);
    n
}

fn analysis_len(reference: &[Complex<f32>], candidate: &[Complex<f32>]) -> Result<usize> {
    if reference.len() != candidate.len() {
        return Err(Error::dimension_mismatch(reference.len(), candidate.len()));
    }
    if reference.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(reference.len())
}

fn widen(sample: &Complex<f32>) -> Complex<f64> {
    Complex::new(sample.re as f64, sample.im as f64)
}

fn pad_trailing(samples: &[Complex<f32>], zeros: usize) -> Vec<Complex<f64>> {
    let mut padded = Vec::with_capacity(samples.len() + zeros);
    padded.extend(samples.iter().map(widen));
    padded.resize(samples.len() + zeros, Complex::new(0.0, 0.0));
    padded
}

fn pad_leading(samples: &[Complex<f32>], zeros: usize) -> Vec<Complex<f64>> {
    let mut padded = vec![Complex::new(0.0, 0.0); zeros];
    padded.reserve(samples.len());
    padded.extend(samples.iter().map(widen));
    padded
}
