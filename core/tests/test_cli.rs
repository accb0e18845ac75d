use std::fs;
use std::path::Path;

use chrono::{Duration, TimeZone, Utc};
use cadence_core::cli::{format_session_report, replay_file};
use cadence_core::models::SensorSample;
use cadence_core::types::{AlertKind, AlertRequest, WorkoutSummary};
use cadence_core::workout::WorkoutType;

fn summary() -> WorkoutSummary {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    WorkoutSummary {
        workout_type: WorkoutType::Cycling,
        start_time: start,
        end_time: start + Duration::seconds(600),
        cadence_segments: Vec::new(),
        preferred_cadence_samples: Vec::new(),
        alerts: vec![AlertRequest { kind: AlertKind::PushingBike, at: start, window_s: 245.76 }],
        average_cadence: 78.456,
        total_distance: 2501.27,
        average_speed: 4.1688,
        max_speed: 9.02,
        elevation_gain: 31.04,
        active_calories: 61.2,
        total_calories: 72.9,
    }
}

#[test]
fn test_report_contains_rounded_values() {
    let report = format_session_report(&summary());
    assert!(report.starts_with("--- Ride Report ---"));
    assert!(report.contains("Varighet: 600 s"));
    assert!(report.contains("Snittkadens: 78.5"));
    assert!(report.contains("Distanse: 2501.3 m"));
    assert!(report.contains("4.17 / 9.02 m/s"));
    assert!(report.contains("Consider walking with your bike"));
}

#[test]
fn test_replay_file_writes_summary() {
    let input = "tests/tmp_recording.json";
    let output = "tests/tmp_summary.json";
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();

    let rotation: Vec<SensorSample> = (0..1024)
        .map(|i| {
            let t = i as f64 * 0.01;
            SensorSample {
                timestamp: start + Duration::milliseconds(10 * i as i64),
                x: 0.0,
                y: (2.0 * std::f64::consts::PI * 2.5390625 * t).sin(),
                z: 0.0,
            }
        })
        .collect();
    let rec = serde_json::json!({
        "workout": "running",
        "start_time": start,
        "rotation": rotation,
    });
    fs::write(input, rec.to_string()).unwrap();

    let summary = replay_file(Path::new(input), Some(Path::new(output)))
        .expect("replay feilet")
        .expect("to segmenter");
    assert_eq!(summary.workout_type, WorkoutType::Running);
    assert_eq!(summary.cadence_segments.len(), 2);
    assert!(Path::new(output).exists());

    let saved: WorkoutSummary = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(saved.cadence_segments.len(), 2);
    assert_eq!(saved.end_time, summary.end_time);

    fs::remove_file(input).ok();
    fs::remove_file(output).ok();
}

#[test]
fn test_replay_missing_file_is_error() {
    assert!(replay_file(Path::new("tests/finnes_ikke_opptak.json"), None).is_err());
}
