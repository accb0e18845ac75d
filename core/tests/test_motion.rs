use std::f64::consts::PI;

use chrono::{DateTime, TimeZone, Utc};
use cadence_core::config::EngineConfig;
use cadence_core::models::{RawRotation, SensorClock};
use cadence_core::motion::MotionProcessor;
use cadence_core::signal_buffer::SignalBuffer;
use cadence_core::telemetry::EngineMetrics;
use cadence_core::types::DominantAxis;
use cadence_core::workout::WorkoutType;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

fn raw(i: usize) -> RawRotation {
    let t = i as f64 * 0.01;
    RawRotation {
        uptime_s: 500.0 + t,
        x: (2.0 * PI * 1.3671875 * t).sin(),
        y: 0.0,
        z: 0.0,
    }
}

fn small_config(segment: usize, multiple: usize) -> EngineConfig {
    EngineConfig { segment_capacity: segment, section_multiple: multiple, ..EngineConfig::default() }
}

#[test]
fn estimator_runs_once_per_full_segment() {
    let cfg = EngineConfig::default();
    let mut mp = MotionProcessor::new(&cfg, WorkoutType::Cycling)
        .unwrap()
        .with_clock(SensorClock::new(t0(), 500.0));

    let n = 3 * 512 + 100;
    let readings: Vec<_> = (0..n).filter_map(|i| mp.push_raw(&raw(i))).collect();

    assert_eq!(readings.len(), n / 512);
    assert_eq!(mp.segment_runs(), (n / 512) as u64);
    assert_eq!(mp.buffered(), n % 512);
    assert_eq!(mp.section_runs(), 0, "seksjonen (8192) er ikke fylt");
    assert!(readings.iter().all(|r| r.preferred_cadence.is_none()));
}

#[test]
fn reading_is_stamped_with_last_sample_of_window() {
    let cfg = EngineConfig::default();
    let clock = SensorClock::new(t0(), 500.0);
    let mut mp = MotionProcessor::new(&cfg, WorkoutType::Cycling).unwrap().with_clock(clock);

    let reading = (0..512).find_map(|i| mp.push_raw(&raw(i))).expect("ett segment");
    assert_eq!(Some(reading.timestamp), clock.to_wall(raw(511).uptime_s));
    assert_eq!(reading.dominant_axis, DominantAxis::X);
    assert_eq!(reading.axis_trace.len(), 512);
    assert!((reading.axis_trace[100] - raw(100).x).abs() < 1e-12);
    assert!(reading.cadence > 0.0);
    let peak = reading.peak_frequency_hz.expect("topp i båndet");
    assert!((peak * 60.0 - reading.cadence).abs() < 1e-9);
}

#[test]
fn sample_with_unusable_uptime_is_dropped() {
    let cfg = small_config(64, 2);
    let mut mp = MotionProcessor::new(&cfg, WorkoutType::Cycling)
        .unwrap()
        .with_clock(SensorClock::new(t0(), 500.0));

    for i in 0..10 {
        mp.push_raw(&raw(i));
    }
    for uptime_s in [f64::NAN, f64::INFINITY, 1e300] {
        assert!(mp.push_raw(&RawRotation { uptime_s, x: 1.0, y: 0.0, z: 0.0 }).is_none());
    }
    assert_eq!(mp.buffered(), 10, "ingen ugyldige samples i bufferen");

    let readings: Vec<_> = (10..64).filter_map(|i| mp.push_raw(&raw(i))).collect();
    assert_eq!(readings.len(), 1);
}

#[test]
fn weak_signal_keeps_peak_frequency_without_cadence() {
    let cfg = EngineConfig::default();
    let mut mp = MotionProcessor::new(&cfg, WorkoutType::Cycling)
        .unwrap()
        .with_clock(SensorClock::new(t0(), 500.0));

    let reading = (0..512)
        .find_map(|i| {
            let mut r = raw(i);
            r.x *= 0.01;
            mp.push_raw(&r)
        })
        .expect("ett segment");

    assert_eq!(reading.cadence, 0.0, "under terskel");
    let peak = reading.peak_frequency_hz.expect("spekteret beholdes");
    assert!((peak - 1.3671875).abs() < 0.05, "topp {peak} Hz");
}

#[test]
fn section_fills_together_with_every_kth_segment() {
    let cfg = small_config(64, 2);
    let metrics = EngineMetrics::new().unwrap();
    let mut mp = MotionProcessor::new(&cfg, WorkoutType::Cycling)
        .unwrap()
        .with_clock(SensorClock::new(t0(), 500.0))
        .with_metrics(metrics.clone());

    let readings: Vec<_> = (0..64 * 5).filter_map(|i| mp.push_raw(&raw(i))).collect();

    assert_eq!(readings.len(), 5);
    let with_section: Vec<usize> = readings
        .iter()
        .enumerate()
        .filter(|(_, r)| r.preferred_cadence.is_some())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(with_section, vec![1, 3]);
    assert_eq!(mp.section_runs(), 2);

    // FFT-teller = segment + seksjon
    assert_eq!(metrics.fft_runs_total.get(), mp.segment_runs() + mp.section_runs());
    assert!(metrics.render().contains("cadence_fft_runs_total"));
}

#[test]
fn configure_switches_band_and_clears_window() {
    let cfg = EngineConfig::default();
    let mut mp = MotionProcessor::new(&cfg, WorkoutType::Cycling).unwrap();
    for i in 0..300 {
        mp.push_raw(&raw(i));
    }
    assert_eq!(mp.buffered(), 300);

    mp.configure(WorkoutType::Cycling);
    assert_eq!(mp.buffered(), 300, "samme type er no-op");

    mp.configure(WorkoutType::Running);
    assert_eq!(mp.workout(), WorkoutType::Running);
    assert_eq!(mp.buffered(), 0);
}

#[test]
fn invalid_capacity_is_rejected() {
    assert!(SignalBuffer::new(500, 16).is_err());
    assert!(MotionProcessor::new(&small_config(100, 4), WorkoutType::Walking).is_err());
    assert!(MotionProcessor::new(&small_config(128, 0), WorkoutType::Walking).is_err());
}

#[test]
fn stop_discards_partial_window() {
    let mut mp = MotionProcessor::new(&EngineConfig::default(), WorkoutType::Walking).unwrap();
    for i in 0..200 {
        assert!(mp.push_raw(&raw(i)).is_none());
    }
    mp.stop();
    assert_eq!(mp.buffered(), 0);
    assert_eq!(mp.segment_runs(), 0);
}
