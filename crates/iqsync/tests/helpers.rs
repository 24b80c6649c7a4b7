//! Test helper utilities for generating synthetic channel captures

#![allow(dead_code)]

use std::f32::consts::PI;

use num_complex::Complex;

/// Generate a complex sine wave as interleaved Cu8 bytes
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `num_samples` - Number of samples to generate
pub fn generate_sine_wave_cu8(frequency: f32, sample_rate: u32, num_samples: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(num_samples * 2);
    let angular_freq = 2.0 * PI * frequency / sample_rate as f32;

    for n in 0..num_samples {
        let phase = angular_freq * n as f32;

        // Convert from [-1, 1] to [0, 255] for Cu8 format
        buffer.push(((phase.cos() + 1.0) * 127.5) as u8);
        buffer.push(((phase.sin() + 1.0) * 127.5) as u8);
    }

    buffer
}

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

/// Delay a Cu8 capture by `delay` samples, keeping its length.
///
/// Positive delays insert mid-scale samples at the front and drop the tail,
/// negative delays drop the head and pad the tail.
pub fn delay_cu8(bytes: &[u8], delay: i64) -> Vec<u8> {
    let samples = bytes.len() / 2;
    let shift = delay.unsigned_abs() as usize * 2;
    let fill = std::iter::repeat_n(128u8, shift.min(samples * 2));
    if delay >= 0 {
        fill.chain(bytes.iter().copied())
            .take(samples * 2)
            .collect()
    } else {
        bytes.iter().copied().skip(shift).chain(fill).take(samples * 2).collect()
    }
}

/// Unit impulse of length `len` at index `at`
pub fn impulse(len: usize, at: usize) -> Vec<Complex<f32>> {
    let mut samples = vec![Complex::new(0.0, 0.0); len];
    samples[at] = Complex::new(1.0, 0.0);
    samples
}

/// Constant-amplitude chirp `exp(-j * pi * n^2 / len)`
pub fn chirp(len: usize) -> Vec<Complex<f32>> {
    (0..len)
        .map(|n| {
            let phase = -PI * ((n * n) % (2 * len)) as f32 / len as f32;
            Complex::new(phase.cos(), phase.sin())
        })
        .collect()
}

/// `samples` delayed by `delay` samples with zero fill, same length
pub fn delayed(samples: &[Complex<f32>], delay: i64) -> Vec<Complex<f32>> {
    let len = samples.len() as i64;
    (0..len)
        .map(|j| {
            let source = j - delay;
            if (0..len).contains(&source) {
                samples[source as usize]
            } else {
                Complex::new(0.0, 0.0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_noise_cu8_is_deterministic() {
        assert_eq!(generate_noise_cu8(7, 64), generate_noise_cu8(7, 64));
        assert_ne!(generate_noise_cu8(7, 64), generate_noise_cu8(8, 64));
        assert_eq!(generate_noise_cu8(1, 10).len(), 20);
    }

    #[test]
    fn test_delay_cu8_positive() {
        let bytes = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(delay_cu8(&bytes, 1), vec![128, 128, 1, 2, 3, 4]);
    }

    #[test]
    fn test_delay_cu8_negative() {
        let bytes = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(delay_cu8(&bytes, -2), vec![5, 6, 128, 128, 128, 128]);
    }

    #[test]
    fn test_delayed_zero_fill() {
        let samples = vec![Complex::new(1.0, 0.0), Complex::new(2.0, 0.0), Complex::new(3.0, 0.0)];
        let out = delayed(&samples, 1);
        assert_eq!(out[0], Complex::new(0.0, 0.0));
        assert_eq!(out[2], Complex::new(2.0, 0.0));
        let out = delayed(&samples, -1);
        assert_eq!(out[0], Complex::new(2.0, 0.0));
        assert_eq!(out[2], Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_chirp_has_unit_magnitude() {
        assert!(chirp(32).iter().all(|s| (s.norm() - 1.0).abs() < 1e-5));
    }
}
