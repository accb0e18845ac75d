use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LocationFix, SensorSample};
use crate::workout::{CadenceThresholds, WorkoutType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DominantAxis {
    X,
    Y,
    Z,
    None,
}

impl DominantAxis {
    /// Verdien for aksen, eller vektorlengden når ingen akse dominerer.
    pub fn project(self, s: &SensorSample) -> f64 {
        match self {
            DominantAxis::X => s.x,
            DominantAxis::Y => s.y,
            DominantAxis::Z => s.z,
            DominantAxis::None => s.magnitude(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CadenceZone {
    Low,
    Normal,
    High,
    Zero,
}

impl CadenceZone {
    /// ≤0 → Zero; uten terskler er all positiv kadens Normal.
    pub fn classify(cadence: f64, thresholds: Option<CadenceThresholds>) -> CadenceZone {
        if cadence <= 0.0 {
            return CadenceZone::Zero;
        }
        match thresholds {
            Some(t) if cadence < t.low => CadenceZone::Low,
            Some(t) if cadence > t.high => CadenceZone::High,
            _ => CadenceZone::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementActivity {
    Stationary,
    Slow,
    Fast,
    NotDetermined,
}

pub const STATIONARY_SPEED_MS: f64 = 0.7;
pub const SLOW_SPEED_MS: f64 = 2.2;

impl MovementActivity {
    pub fn classify(speed_ms: f64) -> MovementActivity {
        if speed_ms < STATIONARY_SPEED_MS {
            MovementActivity::Stationary
        } else if speed_ms < SLOW_SPEED_MS {
            MovementActivity::Slow
        } else {
            MovementActivity::Fast
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedTrend {
    Stable,
    Accelerating,
    Decelerating,
    NotDetermined,
}

pub const SPEED_CHANGE_MS: f64 = 1.2;

impl SpeedTrend {
    pub fn classify(speed_delta_ms: f64) -> SpeedTrend {
        if speed_delta_ms > SPEED_CHANGE_MS {
            SpeedTrend::Accelerating
        } else if speed_delta_ms < -SPEED_CHANGE_MS {
            SpeedTrend::Decelerating
        } else {
            SpeedTrend::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainGradient {
    Level,
    Ascending,
    Descending,
    NotDetermined,
}

pub const LEVEL_SLOPE_PCT: f64 = 3.0;

impl TerrainGradient {
    pub fn classify(slope_pct: f64) -> TerrainGradient {
        if slope_pct > LEVEL_SLOPE_PCT {
            TerrainGradient::Ascending
        } else if slope_pct < -LEVEL_SLOPE_PCT {
            TerrainGradient::Descending
        } else {
            TerrainGradient::Level
        }
    }
}

/// Uforanderlig resultat for ett segmentintervall, nøklet på slutt-tid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceSegment {
    pub timestamp: DateTime<Utc>,
    pub cadence: f64,
    pub zone: CadenceZone,
    /// Gyldige posisjoner i intervallet (tom når stillestående)
    pub locations: Vec<LocationFix>,
    pub speed: Option<f64>,
    pub baro_altitude: Option<f64>,
    pub gps_altitude: Option<f64>,
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    LowCadence,
    HighCadence,
    PushingBike,
    FinishedWorkout,
}

impl AlertKind {
    pub fn label(self) -> &'static str {
        match self {
            AlertKind::LowCadence => "low_cadence",
            AlertKind::HighCadence => "high_cadence",
            AlertKind::PushingBike => "pushing_bike",
            AlertKind::FinishedWorkout => "finished_workout",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AlertKind::LowCadence | AlertKind::HighCadence | AlertKind::PushingBike => "Cadence Alert",
            AlertKind::FinishedWorkout => "Finished Workout?",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            AlertKind::LowCadence => "Your cadence is a bit low!",
            AlertKind::HighCadence => "Your cadence is a bit high!",
            AlertKind::PushingBike => "Consider walking with your bike when uphill.",
            AlertKind::FinishedWorkout => "We noticed that you haven't moved for a while.",
        }
    }
}

/// Forespørsel til ekstern varsler. Kjernen leverer aldri varsler selv.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub kind: AlertKind,
    pub at: DateTime<Utc>,
    /// Lengden på vurderingsvinduet (s)
    pub window_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LocationAuthorization {
    #[default]
    NotDetermined,
    Denied,
    Restricted,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl LocationAuthorization {
    /// Kontinuerlig posisjonssporing tilgjengelig?
    pub fn allows_tracking(self) -> bool {
        matches!(
            self,
            LocationAuthorization::AuthorizedWhenInUse | LocationAuthorization::AuthorizedAlways
        )
    }
}

/// Foretrukket (seksjons-)kadens for helse-eksport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferredCadenceSample {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub cadence: f64,
}

/// Ferdig økt – overleveres til persistens-/UI-laget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub workout_type: WorkoutType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub cadence_segments: Vec<CadenceSegment>,
    pub preferred_cadence_samples: Vec<PreferredCadenceSample>,
    pub alerts: Vec<AlertRequest>,
    pub average_cadence: f64,
    pub total_distance: f64,
    pub average_speed: f64,
    pub max_speed: f64,
    pub elevation_gain: f64,
    pub active_calories: f64,
    pub total_calories: f64,
}

impl WorkoutSummary {
    pub fn duration_s(&self) -> f64 {
        crate::models::seconds_between(self.start_time, self.end_time)
    }
}

pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}
