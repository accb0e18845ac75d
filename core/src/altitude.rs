use chrono::{DateTime, Utc};
use log::warn;

use crate::history::History;
use crate::models::{AltitudeSample, RawAltitude, SensorClock};

/// Passiv barometer-mottaker: tidsstempler relativ høyde og legger den i historikken.
#[derive(Debug, Clone)]
pub struct AltitudeSampler {
    clock: SensorClock,
    history: History<AltitudeSample>,
}

impl AltitudeSampler {
    pub fn new(clock: SensorClock, history_half: usize) -> Self {
        Self { clock, history: History::new(history_half) }
    }

    pub fn clock(&self) -> SensorClock {
        self.clock
    }

    /// Rå callback (oppetid) → veggklokke. Ugyldig oppetid forkastes.
    pub fn record_raw(&mut self, raw: &RawAltitude) -> Option<AltitudeSample> {
        let Some(timestamp) = self.clock.to_wall(raw.uptime_s) else {
            warn!("høyde-sample forkastet: ugyldig oppetid {}", raw.uptime_s);
            return None;
        };
        let sample = AltitudeSample { timestamp, altitude_m: raw.relative_altitude_m };
        self.history.push(sample);
        Some(sample)
    }

    /// Allerede tidsstemplet sample (replay).
    pub fn record(&mut self, sample: AltitudeSample) {
        self.history.push(sample);
    }

    pub fn window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<AltitudeSample> {
        self.history.window(start, end)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn reset(&mut self, clock: SensorClock) {
        self.clock = clock;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn trims_to_half_when_twice_full() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let mut sampler = AltitudeSampler::new(SensorClock::new(start, 100.0), 5);
        for i in 0..9 {
            sampler.record_raw(&RawAltitude { uptime_s: 101.0 + i as f64, relative_altitude_m: i as f64 });
        }
        assert_eq!(sampler.len(), 9);
        sampler.record_raw(&RawAltitude { uptime_s: 110.0, relative_altitude_m: 9.0 });
        assert_eq!(sampler.len(), 5);

        // oppetid 101 → start + 1 s
        let w = sampler.window(start, start + chrono::Duration::seconds(100));
        assert_eq!(w.first().map(|s| s.altitude_m), Some(5.0));
    }

    #[test]
    fn unusable_uptime_is_dropped() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let mut sampler = AltitudeSampler::new(SensorClock::new(start, 100.0), 5);
        assert!(sampler.record_raw(&RawAltitude { uptime_s: f64::NAN, relative_altitude_m: 1.0 }).is_none());
        assert!(sampler.record_raw(&RawAltitude { uptime_s: 1e300, relative_altitude_m: 1.0 }).is_none());
        assert!(sampler.is_empty());
    }
}
