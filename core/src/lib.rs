//! Kadensmotor: gyro + barometer + GPS → klassifiserte kadenssegmenter,
//! løpende aggregater og varselforespørsler.

pub mod altitude;
pub mod analyze_session;
pub mod calories;
pub mod cli;
pub mod config;
pub mod counter;
pub mod error;
pub mod estimator;
pub mod fusion;
pub mod history;
pub mod metrics;
pub mod models;
pub mod motion;
pub mod session;
pub mod signal_buffer;
pub mod storage;
pub mod telemetry;
pub mod types;
pub mod workout;

#[cfg(feature = "python")]
mod py;

pub use analyze_session::{analyze_session, analyze_session_json, estimate_cadence_json, RecordedSession};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use estimator::{estimate_cadence, FftPoint, FftResult};
pub use fusion::{SegmentFusionEngine, SegmentOutcome};
pub use metrics::RunningAggregates;
pub use models::{AltitudeSample, LocationFix, RawAltitude, RawRotation, SensorClock, SensorSample, UserProfile};
pub use motion::{CadenceReading, MotionProcessor};
pub use session::{AltitudeSender, LocationEvent, MotionEvent, RideSession, SensorCapabilities, SessionEvent, SessionSettings};
pub use signal_buffer::SignalBuffer;
pub use storage::{load_config, load_user_profile, save_config, save_summary, save_user_profile};
pub use types::{
    AlertKind, AlertRequest, CadenceSegment, CadenceZone, DominantAxis, LocationAuthorization,
    MovementActivity, SpeedTrend, TerrainGradient, WorkoutSummary,
};
pub use workout::WorkoutType;
