use std::f64::consts::PI;
use std::time::Duration as StdDuration;

use chrono::{DateTime, TimeZone, Utc};
use cadence_core::config::EngineConfig;
use cadence_core::error::EngineError;
use cadence_core::models::{LocationFix, RawAltitude, RawRotation, SensorClock};
use cadence_core::session::{
    LocationEvent, MotionEvent, RideSession, SensorCapabilities, SessionEvent, SessionSettings,
};
use cadence_core::types::LocationAuthorization;
use cadence_core::workout::WorkoutType;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

const UPTIME0: f64 = 1000.0;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

fn settings() -> SessionSettings {
    SessionSettings {
        config: EngineConfig { segment_capacity: 128, section_multiple: 2, ..EngineConfig::default() },
        workout: WorkoutType::Cycling,
        capabilities: SensorCapabilities::default(),
        authorization: LocationAuthorization::AuthorizedWhenInUse,
    }
}

// 1.5625 Hz = eksakt bin for 128/256-vinduer ved 100 Hz
fn rotation(i: usize) -> RawRotation {
    let t = i as f64 * 0.01;
    RawRotation { uptime_s: UPTIME0 + t, x: (2.0 * PI * 1.5625 * t).sin(), y: 0.0, z: 0.0 }
}

async fn next_segments(rx: &mut UnboundedReceiver<SessionEvent>, n: usize) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    let mut segments = 0;
    while segments < n {
        let ev = timeout(StdDuration::from_secs(5), rx.recv())
            .await
            .expect("tidsavbrudd")
            .expect("kanal lukket");
        if matches!(ev, SessionEvent::Segment(_)) {
            segments += 1;
        }
        seen.push(ev);
    }
    // resten av siste segments hendelser er allerede sendt
    while let Ok(ev) = rx.try_recv() {
        seen.push(ev);
    }
    seen
}

#[tokio::test]
async fn live_session_emits_segments_and_summary() {
    let clock = SensorClock::new(t0(), UPTIME0);
    let (session, mut events) = RideSession::start(settings(), clock).unwrap();

    let gyro = session.gyro_sender().expect("gyro");
    let baro = session.altimeter_sender().expect("baro");
    let gps = session.location_sender().expect("gps");

    for i in 0..256 {
        if i % 50 == 0 {
            let fix = LocationFix {
                timestamp: clock.to_wall(UPTIME0 + i as f64 * 0.01 + 0.001).unwrap(),
                latitude: 59.9139 + i as f64 * 1e-6,
                longitude: 10.7522,
                altitude_m: 0.0,
                speed_ms: 4.0,
                horizontal_accuracy_m: 5.0,
                vertical_accuracy_m: -1.0,
            };
            gps.send(LocationEvent::Fix(fix)).await.unwrap();
            baro.send(RawAltitude { uptime_s: UPTIME0 + i as f64 * 0.01, relative_altitude_m: 1.0 })
                .await
                .unwrap();
        }
        gyro.send(MotionEvent::Rotation(rotation(i))).await.unwrap();
    }

    let seen = next_segments(&mut events, 2).await;
    assert!(seen.iter().any(|e| matches!(e, SessionEvent::LiveCadence(c) if *c > 0.0)));
    assert!(seen.iter().any(|e| matches!(e, SessionEvent::Aggregates(_))));

    let metrics = session.metrics().clone();
    let summary = session.stop().await.unwrap().expect("sammendrag");

    assert_eq!(summary.cadence_segments.len(), 2);
    assert!(summary.cadence_segments.iter().all(|s| s.cadence > 0.0));
    assert_eq!(Some(summary.end_time), clock.to_wall(rotation(255).uptime_s));
    assert_eq!(summary.preferred_cadence_samples.len(), 1);
    assert!(summary.cadence_segments.iter().all(|s| s.baro_altitude == Some(1.0)));
    assert_eq!(metrics.segments_total.get(), 2);
    assert_eq!(metrics.fft_runs_total.get(), 3);
}

#[tokio::test]
async fn gyro_failure_stops_session_gracefully() {
    let (session, mut events) = RideSession::start(settings(), SensorClock::new(t0(), UPTIME0)).unwrap();
    let gyro = session.gyro_sender().unwrap();
    let baro = session.altimeter_sender().unwrap();

    for i in 0..10 {
        gyro.send(MotionEvent::Rotation(rotation(i))).await.unwrap();
    }
    baro.send_error("midlertidig").await.unwrap();
    gyro.send(MotionEvent::RotationFailure("sensor borte".into())).await.unwrap();

    let ev = timeout(StdDuration::from_secs(5), events.recv()).await.unwrap();
    assert_eq!(ev, Some(SessionEvent::SensorFailure("sensor borte".into())));

    // ingen segmenter før feilen
    let summary = session.stop().await.unwrap();
    assert!(summary.is_none());
}

#[tokio::test]
async fn unavailable_sensors_get_no_sender() {
    let mut s = settings();
    s.capabilities = SensorCapabilities { gyro: false, altimeter: true, location: false };
    let (session, _events) = RideSession::start(s, SensorClock::new(t0(), UPTIME0)).unwrap();

    assert!(session.gyro_sender().is_none());
    assert!(session.altimeter_sender().is_some());
    assert!(session.location_sender().is_none());

    assert!(session.stop().await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_config_is_rejected_at_start() {
    let mut s = settings();
    s.config.segment_capacity = 100;
    assert!(RideSession::start(s, SensorClock::new(t0(), UPTIME0)).is_err());
}

#[tokio::test]
async fn unusable_uptime_does_not_break_session() {
    let (session, mut events) = RideSession::start(settings(), SensorClock::new(t0(), UPTIME0)).unwrap();
    let gyro = session.gyro_sender().unwrap();
    let baro = session.altimeter_sender().unwrap();

    baro.send(RawAltitude { uptime_s: f64::NAN, relative_altitude_m: 3.0 }).await.unwrap();
    for i in 0..128 {
        if i == 64 {
            gyro.send(MotionEvent::Rotation(RawRotation { uptime_s: 1e300, x: 1.0, y: 0.0, z: 0.0 }))
                .await
                .unwrap();
        }
        gyro.send(MotionEvent::Rotation(rotation(i))).await.unwrap();
    }

    let seen = next_segments(&mut events, 1).await;
    assert!(seen.iter().all(|e| !matches!(e, SessionEvent::SensorFailure(_))));

    let summary = session.stop().await.expect("stopp uten panikk").expect("sammendrag");
    assert_eq!(summary.cadence_segments.len(), 1);
    assert_eq!(summary.cadence_segments[0].baro_altitude, None);
}

#[tokio::test]
async fn altitude_sender_fails_after_stop() {
    let (session, _events) = RideSession::start(settings(), SensorClock::new(t0(), UPTIME0)).unwrap();
    let baro = session.altimeter_sender().unwrap();

    assert!(session.stop().await.unwrap().is_none());

    let res = baro.send(RawAltitude { uptime_s: UPTIME0, relative_altitude_m: 0.0 }).await;
    assert!(matches!(res, Err(EngineError::SessionClosed)));
}
