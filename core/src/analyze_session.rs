use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::estimator::estimate_cadence;
use crate::fusion::SegmentFusionEngine;
use crate::models::{AltitudeSample, LocationFix, SensorClock, SensorSample};
use crate::motion::MotionProcessor;
use crate::storage::from_json_str;
use crate::types::{LocationAuthorization, WorkoutSummary};
use crate::workout::WorkoutType;

/// Innspilt økt: alle strømmer allerede på veggklokke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    pub workout: WorkoutType,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default = "replay_authorization")]
    pub authorization: LocationAuthorization,
    #[serde(default)]
    pub rotation: Vec<SensorSample>,
    #[serde(default)]
    pub altitude: Vec<AltitudeSample>,
    #[serde(default)]
    pub locations: Vec<LocationFix>,
}

// opptak med posisjoner er tatt opp med tilgang
fn replay_authorization() -> LocationAuthorization {
    LocationAuthorization::AuthorizedWhenInUse
}

/// Én hendelse i den flettede tidslinjen.
#[derive(Debug, Clone, Copy)]
enum ReplayInput {
    Location(LocationFix),
    Altitude(AltitudeSample),
    Rotation(SensorSample),
}

impl ReplayInput {
    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ReplayInput::Location(f) => f.timestamp,
            ReplayInput::Altitude(a) => a.timestamp,
            ReplayInput::Rotation(s) => s.timestamp,
        }
    }

    // samme tidspunkt: posisjon og høyde før gyro, slik at de havner i (start, slutt]
    fn rank(&self) -> u8 {
        match self {
            ReplayInput::Location(_) => 0,
            ReplayInput::Altitude(_) => 1,
            ReplayInput::Rotation(_) => 2,
        }
    }
}

fn merged_timeline(rec: &RecordedSession) -> Vec<ReplayInput> {
    let mut timeline: Vec<ReplayInput> =
        Vec::with_capacity(rec.rotation.len() + rec.altitude.len() + rec.locations.len());
    timeline.extend(rec.locations.iter().copied().map(ReplayInput::Location));
    timeline.extend(rec.altitude.iter().copied().map(ReplayInput::Altitude));
    timeline.extend(rec.rotation.iter().copied().map(ReplayInput::Rotation));
    // stabil sortering bevarer rekkefølgen innen hver strøm
    timeline.sort_by_key(|i| (i.timestamp(), i.rank()));
    timeline
}

/// Kjører samme motion- og fusjonslogikk som live-økten, synkront.
/// `Ok(None)` når opptaket er for kort til ett segment.
pub fn analyze_session(rec: &RecordedSession) -> EngineResult<Option<WorkoutSummary>> {
    let clock = SensorClock::new(rec.start_time, 0.0);
    let mut processor = MotionProcessor::new(&rec.config, rec.workout)?.with_clock(clock);
    let mut engine =
        SegmentFusionEngine::new(&rec.config, rec.workout, clock).with_authorization(rec.authorization);

    for input in merged_timeline(rec) {
        match input {
            ReplayInput::Location(fix) => engine.ingest_location(fix),
            ReplayInput::Altitude(sample) => engine.ingest_altitude(sample),
            ReplayInput::Rotation(sample) => {
                if let Some(reading) = processor.push(sample) {
                    engine.process(&reading);
                }
            }
        }
    }
    processor.stop();

    let summary = engine.finish();
    info!(
        "replay {:?}: {} gyro-samples → {} segmenter ({} FFT på segment, {} på seksjon)",
        rec.workout,
        rec.rotation.len(),
        engine.segments().len(),
        processor.segment_runs(),
        processor.section_runs()
    );
    Ok(summary)
}

/// JSON inn (RecordedSession) → JSON ut (WorkoutSummary eller `null`).
pub fn analyze_session_json(input: &str) -> EngineResult<String> {
    let rec: RecordedSession = from_json_str(input)?;
    let summary = analyze_session(&rec)?;
    Ok(serde_json::to_string(&summary)?)
}

#[derive(Debug, Deserialize)]
struct EstimateIn {
    workout: WorkoutType,
    samples: Vec<SensorSample>,
}

/// Ett vindu → `FftResult` som JSON (`null` ved < 2 samples eller null tidsspenn).
pub fn estimate_cadence_json(input: &str) -> EngineResult<String> {
    let parsed: EstimateIn = from_json_str(input)?;
    let profile = parsed.workout.profile();
    let result = estimate_cadence(&parsed.samples, profile.band(), profile.magnitude_threshold);
    Ok(serde_json::to_string(&result)?)
}
