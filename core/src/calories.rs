use serde::{Deserialize, Serialize};

use crate::types::MovementActivity;
use crate::workout::WorkoutType;

const MS_TO_MPH: f64 = 2.23694;

/// Inndata for MET-basert kaloriestimat for ett intervall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorieInputs {
    pub duration_s: f64,
    pub distance_m: f64,
    pub speed_ms: f64,
    pub cadence: f64,
    pub workout: WorkoutType,
    pub weight_kg: f64,
    pub height_cm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalorieEstimate {
    pub active: f64, // kcal
    pub total: f64,  // kcal, aktiv + basal
}

impl CalorieInputs {
    /// Basal ≈ 1 kcal/kg/t. Ugyldig intervall gir kun basal.
    pub fn calculate(&self) -> CalorieEstimate {
        let hours = self.duration_s / 3600.0;
        let basal = self.weight_kg * hours;

        if !self.is_valid() {
            return CalorieEstimate { active: 0.0, total: basal };
        }

        let active = self.met_value() * self.weight_kg * hours;
        CalorieEstimate { active, total: active + basal }
    }

    fn is_valid(&self) -> bool {
        self.weight_kg > 0.0
            && self.duration_s > 0.0
            && self.cadence > 0.0
            && MovementActivity::classify(self.speed_ms) != MovementActivity::Stationary
    }

    /// MET-tabeller (Compendium of Physical Activities), oppslag på mph.
    pub fn met_value(&self) -> f64 {
        let mph = self.speed_ms * MS_TO_MPH;
        match self.workout {
            WorkoutType::Cycling => {
                if mph < 10.0 { 4.0 }        // rolig
                else if mph < 12.0 { 6.8 }
                else if mph < 14.0 { 8.0 }
                else if mph < 16.0 { 10.0 }
                else if mph < 20.0 { 12.0 }
                else { 15.8 }
            }
            WorkoutType::Running => {
                if mph < 5.0 { 6.0 }         // jogging
                else if mph < 6.0 { 8.3 }
                else if mph < 7.0 { 9.8 }
                else if mph < 8.0 { 11.0 }
                else if mph < 9.0 { 12.8 }
                else { 14.5 }
            }
            WorkoutType::Walking => {
                let base = if mph < 2.0 { 2.0 }
                    else if mph < 3.0 { 3.0 }
                    else if mph < 3.5 { 3.8 }
                    else if mph < 4.0 { 5.0 }
                    else { 6.3 };
                // høy skrittfrekvens
                if self.cadence > 120.0 { base + 0.5 } else { base }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(workout: WorkoutType, speed_ms: f64, cadence: f64) -> CalorieInputs {
        CalorieInputs {
            duration_s: 3600.0,
            distance_m: speed_ms * 3600.0,
            speed_ms,
            cadence,
            workout,
            weight_kg: 70.0,
            height_cm: 175.0,
        }
    }

    #[test]
    fn stationary_gives_only_basal() {
        let est = inputs(WorkoutType::Cycling, 0.3, 80.0).calculate();
        assert_eq!(est.active, 0.0);
        assert!((est.total - 70.0).abs() < 1e-9);
    }

    #[test]
    fn walking_cadence_bonus() {
        let slow = inputs(WorkoutType::Walking, 1.5, 110.0).met_value();
        let brisk = inputs(WorkoutType::Walking, 1.5, 125.0).met_value();
        assert!((brisk - slow - 0.5).abs() < 1e-12);
    }
}
