use std::f64::consts::PI;

use chrono::{DateTime, Duration, TimeZone, Utc};
use cadence_core::estimator::{estimate_cadence, spectrum_peak};
use cadence_core::models::SensorSample;
use cadence_core::types::DominantAxis;
use cadence_core::workout::WorkoutType;

const N: usize = 512;
const RATE_HZ: f64 = 100.0;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

/// 100 Hz-vindu med sinus på én akse + svak deterministisk støy.
fn window(axis: DominantAxis, freq_hz: f64, amplitude: f64) -> Vec<SensorSample> {
    (0..N)
        .map(|i| {
            let t = i as f64 / RATE_HZ;
            let signal = amplitude * (2.0 * PI * freq_hz * t).sin();
            let noise = 0.02 * (2.0 * PI * 37.3 * t).sin();
            let (mut x, mut y, mut z) = (noise, 0.5 * noise, 0.0);
            match axis {
                DominantAxis::X => x += signal,
                DominantAxis::Y => y += signal,
                DominantAxis::Z => z += signal,
                DominantAxis::None => {}
            }
            SensorSample {
                timestamp: t0() + Duration::milliseconds(10 * i as i64),
                x,
                y,
                z,
            }
        })
        .collect()
}

// eksakt bin k i et 512-vindu ved 100 Hz
fn bin_freq(k: usize) -> f64 {
    k as f64 * RATE_HZ / N as f64
}

#[test]
fn sinusoid_on_x_gives_cadence_within_one_bin() {
    let f = bin_freq(7); // ≈1.37 Hz ≈ 82 RPM
    let profile = WorkoutType::Cycling.profile();
    let res = estimate_cadence(&window(DominantAxis::X, f, 1.0), profile.band(), profile.magnitude_threshold)
        .expect("skal gi resultat");

    let bin_rpm = 60.0 * RATE_HZ / N as f64;
    assert_eq!(res.dominant_axis, DominantAxis::X);
    assert!(
        (res.cadence - f * 60.0).abs() <= bin_rpm,
        "kadens {} for langt fra {}",
        res.cadence,
        f * 60.0
    );
    assert!(res.peak_power > profile.magnitude_threshold);
}

#[test]
fn dominant_axis_follows_the_signal() {
    let f = bin_freq(12); // ≈2.34 Hz ≈ 141 skritt/min
    let profile = WorkoutType::Walking.profile();
    let res = estimate_cadence(&window(DominantAxis::Y, f, 1.5), profile.band(), profile.magnitude_threshold)
        .expect("skal gi resultat");
    assert_eq!(res.dominant_axis, DominantAxis::Y);
    assert!(res.cadence > 0.0);
}

#[test]
fn spectrum_is_band_limited_and_peaks_at_signal() {
    let f = bin_freq(7);
    let profile = WorkoutType::Cycling.profile();
    let band = profile.band();
    let res = estimate_cadence(&window(DominantAxis::Z, f, 1.0), band, profile.magnitude_threshold)
        .expect("skal gi resultat");

    assert!(!res.power_spectrum.is_empty());
    assert!(res.power_spectrum.iter().all(|p| band.contains(p.frequency)));

    let peak = spectrum_peak(&res.power_spectrum).expect("topp");
    assert!((peak.frequency * 60.0 - res.cadence).abs() < 1e-9);
}

#[test]
fn below_threshold_reports_zero_but_keeps_spectrum() {
    let f = bin_freq(7);
    let profile = WorkoutType::Cycling.profile();
    let res = estimate_cadence(&window(DominantAxis::X, f, 0.01), profile.band(), profile.magnitude_threshold)
        .expect("skal gi resultat");

    assert_eq!(res.cadence, 0.0);
    assert_eq!(res.dominant_axis, DominantAxis::None);
    assert!(!res.power_spectrum.is_empty(), "spekteret skal beholdes under terskel");
}

#[test]
fn still_device_gives_zero() {
    let profile = WorkoutType::Running.profile();
    let res = estimate_cadence(&window(DominantAxis::None, 0.0, 0.0), profile.band(), profile.magnitude_threshold)
        .expect("skal gi resultat");
    assert_eq!(res.cadence, 0.0);
    assert_eq!(res.dominant_axis, DominantAxis::None);
}

#[test]
fn out_of_band_signal_is_ignored() {
    // 4.3 Hz = 258 RPM, over sykkelbåndet (150 RPM)
    let f = bin_freq(22);
    let profile = WorkoutType::Cycling.profile();
    let res = estimate_cadence(&window(DominantAxis::X, f, 1.0), profile.band(), profile.magnitude_threshold)
        .expect("skal gi resultat");
    assert!(res.cadence < 150.0 + 1e-9);
    assert!(res.power_spectrum.iter().all(|p| p.frequency <= profile.band().max_hz));
}
