use chrono::{DateTime, Utc};
use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::calories::CalorieEstimate;
use crate::models::{seconds_between, AltitudeSample, LocationFix};

pub const MAX_HORIZONTAL_ACCURACY_M: f64 = 30.0;
pub const MAX_VERTICAL_ACCURACY_M: f64 = 10.0;
/// Under dette regnes ikke snittfart (unngår støy rett etter start)
pub const MIN_DISTANCE_FOR_AVG_SPEED_M: f64 = 0.5;

/// Horisontal nøyaktighet i [0, 30] m.
pub fn valid_locations(fixes: &[LocationFix]) -> Vec<LocationFix> {
    fixes
        .iter()
        .filter(|f| f.horizontal_accuracy_m >= 0.0 && f.horizontal_accuracy_m <= MAX_HORIZONTAL_ACCURACY_M)
        .copied()
        .collect()
}

/// Snitt av ikke-negative rapporterte farter.
pub fn average_speed(fixes: &[LocationFix]) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut cnt = 0usize;
    for f in fixes {
        if f.speed_ms >= 0.0 {
            sum += f.speed_ms;
            cnt += 1;
        }
    }
    if cnt == 0 { None } else { Some(sum / cnt as f64) }
}

/// GPS-høyde fra posisjoner med vertikal nøyaktighet i [0, 10] m.
pub fn average_gps_altitude(fixes: &[LocationFix]) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut cnt = 0usize;
    for f in fixes {
        if f.vertical_accuracy_m >= 0.0 && f.vertical_accuracy_m <= MAX_VERTICAL_ACCURACY_M {
            sum += f.altitude_m;
            cnt += 1;
        }
    }
    if cnt == 0 { None } else { Some(sum / cnt as f64) }
}

pub fn average_baro_altitude(samples: &[AltitudeSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|s| s.altitude_m).sum::<f64>() / samples.len() as f64)
}

/// Haversine-avstand i meter.
pub fn distance_m(a: &LocationFix, b: &LocationFix) -> f64 {
    let pa = Point::new(a.longitude, a.latitude);
    let pb = Point::new(b.longitude, b.latitude);
    Haversine::distance(pa, pb)
}

/// Kjedet avstand, inkludert broen fra forrige intervalls siste gyldige posisjon.
/// `None` når intervallet ikke har gyldige posisjoner.
pub fn chained_distance(previous: Option<&LocationFix>, valid: &[LocationFix]) -> Option<f64> {
    let first = valid.first()?;
    let mut dist = previous.map(|p| distance_m(p, first)).unwrap_or(0.0);
    for w in valid.windows(2) {
        dist += distance_m(&w[0], &w[1]);
    }
    Some(dist)
}

/// Løpende aggregater for én økt. Oppdateres kun som følge av et nytt segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningAggregates {
    pub total_distance: f64,
    pub elevation_gain: f64,
    pub max_speed: Option<f64>,
    pub average_speed: Option<f64>,
    pub average_cadence: Option<f64>,
    pub active_calories: f64,
    pub total_calories: f64,
}

/// Bidraget fra ett segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentContribution {
    pub timestamp: DateTime<Utc>,
    pub distance: Option<f64>,
    pub speed: Option<f64>,
    pub cadence: f64,
    pub elevation_gain: f64,
    pub calories: Option<CalorieEstimate>,
    /// Segmenter før dette, også de med kadens 0
    pub prior_segments: usize,
}

impl RunningAggregates {
    pub fn record(&mut self, c: &SegmentContribution, session_start: DateTime<Utc>) {
        if let Some(speed) = c.speed {
            self.max_speed = Some(self.max_speed.map_or(speed, |m| m.max(speed)));
        }

        if let Some(dist) = c.distance {
            self.total_distance += dist;
            let elapsed = seconds_between(session_start, c.timestamp);
            if self.total_distance >= MIN_DISTANCE_FOR_AVG_SPEED_M && elapsed > 0.0 {
                self.average_speed = Some(self.total_distance / elapsed);
            }
        }

        // inkrementelt snitt: (snitt·n + c) / (n + 1), n = tidligere segmenter
        if c.cadence != 0.0 {
            let n = c.prior_segments as f64;
            let prev = self.average_cadence.unwrap_or(0.0);
            self.average_cadence = Some((prev * n + c.cadence) / (n + 1.0));
        }

        if c.elevation_gain > 0.0 {
            self.elevation_gain += c.elevation_gain;
        }

        if let Some(cal) = c.calories {
            self.active_calories += cal.active;
            self.total_calories += cal.total;
        }
    }
}
