use serde::{Deserialize, Serialize};

/// Økttype. Bestemmer frekvensbånd, kadenssoner og spektralterskel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Cycling,
    Running,
    Walking,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 3] = [WorkoutType::Cycling, WorkoutType::Running, WorkoutType::Walking];

    pub fn title(self) -> &'static str {
        match self {
            WorkoutType::Cycling => "Ride",
            WorkoutType::Running => "Run",
            WorkoutType::Walking => "Walk",
        }
    }

    /// Konstant profil for økttypen.
    pub fn profile(self) -> WorkoutProfile {
        match self {
            WorkoutType::Cycling => WorkoutProfile {
                cadence_range_rpm: (20.0, 150.0),
                thresholds: Some(CadenceThresholds { low: 60.0, high: 110.0 }),
                magnitude_threshold: 50.0,
            },
            WorkoutType::Running => WorkoutProfile {
                cadence_range_rpm: (100.0, 240.0),
                thresholds: Some(CadenceThresholds { low: 160.0, high: 200.0 }),
                magnitude_threshold: 80.0,
            },
            WorkoutType::Walking => WorkoutProfile {
                cadence_range_rpm: (60.0, 160.0),
                thresholds: None,
                magnitude_threshold: 50.0,
            },
        }
    }
}

/// Nedre/øvre RPM-grense for kadenssonene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceThresholds {
    pub low: f64,
    pub high: f64,
}

/// Frekvensbånd i Hz for toppsøk i spekteret.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub min_hz: f64,
    pub max_hz: f64,
}

impl FrequencyBand {
    #[inline]
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.min_hz && freq_hz <= self.max_hz
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutProfile {
    /// (min, max) i RPM
    pub cadence_range_rpm: (f64, f64),
    pub thresholds: Option<CadenceThresholds>,
    /// Minste toppeffekt (|X_k|², uskalert FFT) for å godta en kadens.
    pub magnitude_threshold: f64,
}

impl WorkoutProfile {
    /// RPM → Hz
    pub fn band(&self) -> FrequencyBand {
        FrequencyBand {
            min_hz: self.cadence_range_rpm.0 / 60.0,
            max_hz: self.cadence_range_rpm.1 / 60.0,
        }
    }
}
