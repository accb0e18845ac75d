use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::UserProfile;

/// Motor-konfigurasjon. Alle felt har defaults, så en delvis JSON-fil holder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Nominelt gyro-intervall (s). 0.01 = 100 Hz.
    pub update_interval_s: f64,
    /// Segmentvindu (antall samples, 2^n for FFT)
    pub segment_capacity: usize,
    /// Seksjonsvindu = segment_capacity * section_multiple
    pub section_multiple: usize,
    /// Halv maks-lengde for posisjonshistorikk
    pub location_history_half: usize,
    /// Halv maks-lengde for høydehistorikk
    pub altitude_history_half: usize,
    /// Kapasitet på kanalene i async-økten
    pub channel_capacity: usize,
    pub user: UserProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_interval_s: 0.01,
            segment_capacity: 512,
            section_multiple: 16,
            location_history_half: 5,
            altitude_history_half: 5,
            channel_capacity: 1024,
            user: UserProfile::default(),
        }
    }
}

impl EngineConfig {
    pub fn section_capacity(&self) -> usize {
        self.segment_capacity * self.section_multiple
    }

    /// Nominell segmentvarighet (5.12 s med defaults).
    pub fn segment_duration_s(&self) -> f64 {
        self.update_interval_s * self.segment_capacity as f64
    }

    /// Nominell seksjonsvarighet (81.92 s med defaults).
    pub fn section_duration_s(&self) -> f64 {
        self.update_interval_s * self.section_capacity() as f64
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.update_interval_s.is_finite() && self.update_interval_s > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "update_interval_s må være > 0 (fikk {})",
                self.update_interval_s
            )));
        }
        if self.segment_capacity < 2 || !self.segment_capacity.is_power_of_two() {
            return Err(EngineError::InvalidConfig(format!(
                "segment_capacity må være 2^n ≥ 2 (fikk {})",
                self.segment_capacity
            )));
        }
        if self.section_multiple == 0 {
            return Err(EngineError::InvalidConfig("section_multiple må være ≥ 1".into()));
        }
        if self.location_history_half == 0 || self.altitude_history_half == 0 {
            return Err(EngineError::InvalidConfig("historikk-kapasitet må være ≥ 1".into()));
        }
        if self.channel_capacity == 0 {
            return Err(EngineError::InvalidConfig("channel_capacity må være ≥ 1".into()));
        }
        if !(self.user.weight_kg.is_finite() && self.user.height_cm.is_finite()) {
            return Err(EngineError::InvalidConfig("brukerprofil har ikke-endelige verdier".into()));
        }
        Ok(())
    }
}
