//! Capture Loading Module
//!
//! Turns the raw content of one channel block into complex samples. Blocks are
//! written by the receiver as unsigned 8-bit I/Q pairs (`I, Q, I, Q, ...`),
//! centered on 127.5.
//!
//! The loader is strict: an empty or odd-length buffer is rejected with
//! [`Error::InvalidCapture`] instead of silently dropping the trailing byte.
//!
//! ```
//! use iqsync::capture::load_channel_block;
//!
//! let samples = load_channel_block(&[0, 255, 128, 127], None)?;
//! assert_eq!(samples.len(), 2);
//! assert_eq!(samples[0].re, -127.5);
//! assert_eq!(samples[0].im, 127.5);
//! # Ok::<(), iqsync::Error>(())
//! ```
use std::ops::Deref;

use num_complex::Complex;

use crate::error::{Error, Result};

/// Midpoint of the unsigned 8-bit sample range.
pub const CU8_CENTER: f32 = 127.5;

/**
 * Sample normalization
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Scaling {
    /// `byte - 127.5`, used for correlation
    #[default]
    Centered,
    /// `(byte - 127.5) / 127.5`, in [-1, +1], used for display
    Unit,
}

/**
 * Capture Loader Configuration
 */
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureConfig {
    pub max_samples: Option<usize>,
    pub scaling: Scaling,
}

impl CaptureConfig {
    pub fn new(max_samples: Option<usize>) -> Self {
        Self {
            max_samples,
            scaling: Scaling::Centered,
        }
    }
}

/// Centered complex samples of one channel block.
///
/// Only the centered form can be held in this type; the unit-scaled form for
/// display is available through [`ChannelSamples::unit_scaled`] as a plain
/// vector, so both normalizations never meet in one correlation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelSamples(Vec<Complex<f32>>);

impl ChannelSamples {
    pub fn new(samples: Vec<Complex<f32>>) -> Self {
        Self(samples)
    }

    pub fn as_slice(&self) -> &[Complex<f32>] {
        &self.0
    }

    /// Drop every sample beyond `len`. No-op when already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn into_inner(self) -> Vec<Complex<f32>> {
        self.0
    }

    /// Samples divided by 127.5, mapped into [-1, +1].
    pub fn unit_scaled(&self) -> Vec<Complex<f32>> {
        self.0.iter().map(|s| *s / CU8_CENTER).collect()
    }
}

impl Deref for ChannelSamples {
    type Target = [Complex<f32>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Complex<f32>>> for ChannelSamples {
    fn from(samples: Vec<Complex<f32>>) -> Self {
        Self(samples)
    }
}

/// Load one channel block into centered samples.
///
/// The output holds `min(max_samples, raw.len() / 2)` samples, or
/// `raw.len() / 2` without a maximum.
pub fn load_channel_block(raw: &[u8], max_samples: Option<usize>) -> Result<ChannelSamples> {
    let config = CaptureConfig::new(max_samples);
    let samples = load_with_config(raw, &config)?;
    Ok(ChannelSamples(samples))
}

/// Load one channel block with an explicit normalization.
///
/// Returns a plain vector: with [`Scaling::Unit`] the result belongs to the
/// display path and is not meant for [`crate::xcorr`].
pub fn load_with_config(raw: &[u8], config: &CaptureConfig) -> Result<Vec<Complex<f32>>> {
    validate(raw)?;
    let available = raw.len() / 2;
    let count = config.max_samples.map_or(available, |max| max.min(available));
    Ok(convert_bytes_to_complex(config.scaling, &raw[..count * 2]))
}

fn validate(raw: &[u8]) -> Result<()> {
    if raw.is_empty() {
        return Err(Error::invalid_capture("empty block"));
    }
    if raw.len() % 2 != 0 {
        return Err(Error::invalid_capture(format!(
            "odd length ({} bytes), trailing byte has no Q component",
            raw.len()
        )));
    }
    Ok(())
}

fn convert_bytes_to_complex(scaling: Scaling, buffer: &[u8]) -> Vec<Complex<f32>> {
    match scaling {
        Scaling::Centered => buffer
            .chunks_exact(2)
            .map(|c| Complex::new(c[0] as f32 - CU8_CENTER, c[1] as f32 - CU8_CENTER))
            .collect(),
        Scaling::Unit => buffer
            .chunks_exact(2)
            .map(|c| {
                Complex::new(
                    (c[0] as f32 - CU8_CENTER) / CU8_CENTER,
                    (c[1] as f32 - CU8_CENTER) / CU8_CENTER,
                )
            })
            .collect(),
    }
}
