#![doc = include_str!("../readme.md")]

pub mod capture;
pub mod error;
pub mod xcorr;

pub use capture::{CaptureConfig, ChannelSamples, Scaling, load_channel_block};
pub use error::{Error, Result};
pub use xcorr::{
    CorrelationCurve, CrossCorrelation, CurvePoint, DelayEstimate, DelayEstimator,
    estimate_delay, truncate_to_common,
};
