use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Ett gyro-sample (rotasjonshastighet, rad/s) med veggklokke-tid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SensorSample {
    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Rå gyro-callback: tid i sekunder siden oppstart av enheten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRotation {
    pub uptime_s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Rå barometer-callback: relativ høyde (m) siden start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawAltitude {
    pub uptime_s: f64,
    pub relative_altitude_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeSample {
    pub timestamp: DateTime<Utc>,
    pub altitude_m: f64, // relativ, meter
}

/// GPS-posisjon. Negativ nøyaktighet/fart betyr ugyldig (plattformkonvensjon).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude_m: f64,
    #[serde(default = "invalid")]
    pub speed_ms: f64,
    #[serde(default = "invalid")]
    pub horizontal_accuracy_m: f64,
    #[serde(default = "invalid")]
    pub vertical_accuracy_m: f64,
}

fn invalid() -> f64 {
    -1.0
}

/// Brukerprofil for kaloriberegning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            weight_kg: 70.0,
            height_cm: 170.0,
        }
    }
}

/// Kobler sensorens oppetid-klokke til veggklokke.
///
/// veggtid = veggtid_ved_start + (hendelse_oppetid − oppetid_ved_start)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorClock {
    pub wall_at_start: DateTime<Utc>,
    pub uptime_at_start_s: f64,
}

impl SensorClock {
    pub fn new(wall_at_start: DateTime<Utc>, uptime_at_start_s: f64) -> Self {
        Self { wall_at_start, uptime_at_start_s }
    }

    /// `None` for ikke-endelig oppetid eller veggtid utenfor `DateTime`-området.
    pub fn to_wall(&self, uptime_s: f64) -> Option<DateTime<Utc>> {
        let micros = ((uptime_s - self.uptime_at_start_s) * 1e6).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return None;
        }
        self.wall_at_start.checked_add_signed(Duration::microseconds(micros as i64))
    }

    pub fn rotation(&self, raw: &RawRotation) -> Option<SensorSample> {
        Some(SensorSample {
            timestamp: self.to_wall(raw.uptime_s)?,
            x: raw.x,
            y: raw.y,
            z: raw.z,
        })
    }
}

/// Sekunder mellom to tidspunkt (negativ hvis `b` er før `a`).
#[inline]
pub fn seconds_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    let d = b - a;
    match d.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => d.num_milliseconds() as f64 / 1e3,
    }
}
