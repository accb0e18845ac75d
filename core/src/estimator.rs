//! Spektral kadensestimering.
//!
//! Per akse: Hann-vindu → FFT → effektspekter (|X_k|²) for de første n/2 binene.
//! Bin 0 (DC) er alltid kandidat, slik at stillstand kan vinne over svake topper.
//! Aksen med størst topp vinner; kadens rapporteres kun over effektterskelen.

use std::f64::consts::PI;

use ordered_float::OrderedFloat;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::models::{seconds_between, SensorSample};
use crate::types::DominantAxis;
use crate::workout::FrequencyBand;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FftPoint {
    pub frequency: f64, // Hz
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FftResult {
    pub dominant_axis: DominantAxis,
    /// Spekteret til beste akse, begrenset til båndet. Beholdes uansett terskel.
    pub power_spectrum: Vec<FftPoint>,
    /// RPM. 0 = ingen periodisk bevegelse.
    pub cadence: f64,
    pub peak_power: f64,
}

impl FftResult {
    pub fn none() -> Self {
        Self {
            dominant_axis: DominantAxis::None,
            power_spectrum: Vec::new(),
            cadence: 0.0,
            peak_power: 0.0,
        }
    }
}

/// Periodisk Hann-vindu, w[i] = 0.5·(1 − cos(2πi/n)).
fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / n as f64).cos()))
        .collect()
}

/// Faktisk samplingsrate fra bufferets veggklokke-spenn (tåler jitter).
fn effective_sample_rate(samples: &[SensorSample]) -> Option<f64> {
    let first = samples.first()?;
    let last = samples.last()?;
    let span = seconds_between(first.timestamp, last.timestamp);
    if !(span.is_finite() && span > 0.0) {
        return None;
    }
    Some(samples.len() as f64 / span)
}

/// Estimer kadens fra et fast vindu av tri-akse samples.
///
/// `None` ved < 2 samples eller null tidsspenn; kaller tolker det som kadens 0.
pub fn estimate_cadence(
    samples: &[SensorSample],
    band: FrequencyBand,
    magnitude_threshold: f64,
) -> Option<FftResult> {
    let n = samples.len();
    if n < 2 {
        return None;
    }
    let sample_rate = effective_sample_rate(samples)?;
    let bin_hz = sample_rate / n as f64;
    let half = n / 2;

    let window = hann_window(n);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); n];

    let mut best_power = 0.0f64;
    let mut best_spectrum: Vec<FftPoint> = Vec::new();
    let mut result_axis = DominantAxis::None;
    let mut result_cadence = 0.0f64;

    for axis in [DominantAxis::X, DominantAxis::Y, DominantAxis::Z] {
        for (slot, (s, w)) in buffer.iter_mut().zip(samples.iter().zip(window.iter())) {
            *slot = Complex::new(axis.project(s) * w, 0.0);
        }
        fft.process(&mut buffer);

        let power: Vec<f64> = buffer[..half].iter().map(|c| c.norm_sqr()).collect();

        // DC-bin er alltid med
        let mut peak_power = power[0];
        let mut peak_index = 0usize;
        for (k, &p) in power.iter().enumerate().skip(1) {
            let freq = k as f64 * bin_hz;
            if freq < band.min_hz {
                continue;
            }
            if freq > band.max_hz {
                break;
            }
            if p > peak_power {
                peak_power = p;
                peak_index = k;
            }
        }

        if peak_power > best_power {
            best_power = peak_power;
            best_spectrum = power
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, &p)| FftPoint { frequency: k as f64 * bin_hz, power: p })
                .filter(|pt| band.contains(pt.frequency))
                .collect();

            if peak_power > magnitude_threshold {
                result_cadence = peak_index as f64 * bin_hz * 60.0;
                result_axis = axis;
            }
        }
    }

    Some(FftResult {
        dominant_axis: result_axis,
        power_spectrum: best_spectrum,
        cadence: result_cadence,
        peak_power: best_power,
    })
}

/// Sterkeste punkt i et (båndbegrenset) spekter.
pub fn spectrum_peak(spectrum: &[FftPoint]) -> Option<FftPoint> {
    spectrum.iter().copied().max_by_key(|p| OrderedFloat(p.power))
}
