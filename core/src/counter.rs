use serde::{Deserialize, Serialize};

use crate::types::{AlertKind, CadenceZone, MovementActivity, SpeedTrend, TerrainGradient};
use crate::workout::WorkoutType;

/// Antall seksjonshendelser før vurdering.
pub const MAX_SPLIT_COUNT: u32 = 3;

pub const CADENCE_RATIO: f64 = 0.5;
pub const UPHILL_RATIO: f64 = 0.1;
pub const UPHILL_BAD_RATIO: f64 = 0.5;
pub const INACTIVE_RATIO: f64 = 0.75;

/// Rullerende opptelling over en «split» (3 seksjonskadenser).
/// Nullstilles helt etter hver vurdering, uansett utfall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub low_cadence: u32,
    pub high_cadence: u32,
    pub uphill: u32,
    pub uphill_bad: u32,
    pub inactive: u32,
    pub inactive_or_slow: u32,
    pub total: u32,
    pub split: u32,
}

#[inline]
fn ratio(num: u32, den: u32) -> f64 {
    num as f64 / den as f64
}

impl Counter {
    /// Én gang per segment.
    pub fn update(
        &mut self,
        zone: CadenceZone,
        activity: MovementActivity,
        trend: SpeedTrend,
        gradient: TerrainGradient,
    ) {
        self.total += 1;

        if activity != MovementActivity::Fast {
            self.inactive_or_slow += 1;
            if activity != MovementActivity::Slow {
                self.inactive += 1;
            }
        }

        match gradient {
            TerrainGradient::Ascending => {
                self.uphill += 1;
                match zone {
                    CadenceZone::Low => {
                        self.low_cadence += 1;
                        self.uphill_bad += 1;
                    }
                    CadenceZone::High => {
                        self.high_cadence += 1;
                        if activity == MovementActivity::Slow {
                            self.uphill_bad += 1;
                        }
                    }
                    _ => {}
                }
            }
            // nedoverbakke teller ikke
            TerrainGradient::Descending => {}
            // flatt (også ubestemt)
            _ => match zone {
                CadenceZone::Low => {
                    if activity == MovementActivity::Fast && trend != SpeedTrend::Decelerating {
                        self.low_cadence += 1;
                    }
                }
                CadenceZone::High => self.high_cadence += 1,
                _ => {}
            },
        }
    }

    /// Seksjonshendelse. `true` når det er tid for vurdering.
    pub fn register_split(&mut self) -> bool {
        self.split += 1;
        self.split >= MAX_SPLIT_COUNT
    }

    /// Kadensvarsel, høyst ett, i prioritert rekkefølge.
    pub fn cadence_alert(&self) -> Option<AlertKind> {
        if self.total == 0 {
            return None;
        }
        if ratio(self.low_cadence, self.total) > CADENCE_RATIO {
            Some(AlertKind::LowCadence)
        } else if ratio(self.high_cadence, self.total) > CADENCE_RATIO {
            Some(AlertKind::HighCadence)
        } else if ratio(self.uphill, self.total) > UPHILL_RATIO
            && ratio(self.uphill_bad, self.uphill) > UPHILL_BAD_RATIO
        {
            Some(AlertKind::PushingBike)
        } else {
            None
        }
    }

    /// «Ferdig med økten?» – sykling teller også sakte, gang/løp kun inaktiv.
    pub fn finished_alert(&self, workout: WorkoutType) -> Option<AlertKind> {
        if self.total == 0 {
            return None;
        }
        let idle = match workout {
            WorkoutType::Cycling => self.inactive_or_slow,
            WorkoutType::Walking | WorkoutType::Running => self.inactive,
        };
        (ratio(idle, self.total) > INACTIVE_RATIO).then_some(AlertKind::FinishedWorkout)
    }

    /// Full vurdering. Kadensvarsel kun for sykling; ferdig-varsel kun med posisjonssporing.
    pub fn evaluate(&self, workout: WorkoutType, location_tracking: bool) -> Vec<AlertKind> {
        let mut out = Vec::with_capacity(2);
        if workout == WorkoutType::Cycling {
            out.extend(self.cadence_alert());
        }
        if location_tracking {
            out.extend(self.finished_alert(workout));
        }
        out
    }

    pub fn reset(&mut self) {
        *self = Counter::default();
    }
}
