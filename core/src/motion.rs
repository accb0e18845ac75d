use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::estimator::{estimate_cadence, spectrum_peak, FftPoint, FftResult};
use crate::models::{RawRotation, SensorClock, SensorSample};
use crate::signal_buffer::{FilledWindows, SignalBuffer};
use crate::telemetry::EngineMetrics;
use crate::types::DominantAxis;
use crate::workout::{WorkoutProfile, WorkoutType};

/// Én kadensavlesning per fylt segmentvindu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceReading {
    /// Tid for siste sample i segmentvinduet
    pub timestamp: DateTime<Utc>,
    pub cadence: f64,
    /// Seksjonskadens, kun når seksjonsvinduet også ble fylt
    pub preferred_cadence: Option<f64>,
    pub dominant_axis: DominantAxis,
    pub power_spectrum: Vec<FftPoint>,
    /// Sterkeste frekvens i båndet (Hz), også når toppen er under terskel
    pub peak_frequency_hz: Option<f64>,
    /// Dominant akse (eller vektorlengde) over segmentvinduet
    pub axis_trace: Vec<f64>,
}

/// Eier glidende vinduer + spektralestimering. Kjøres på én seriell worker.
#[derive(Debug)]
pub struct MotionProcessor {
    buffer: SignalBuffer,
    workout: WorkoutType,
    profile: WorkoutProfile,
    clock: Option<SensorClock>,
    segment_runs: u64,
    section_runs: u64,
    metrics: Option<EngineMetrics>,
}

impl MotionProcessor {
    pub fn new(config: &EngineConfig, workout: WorkoutType) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            buffer: SignalBuffer::new(config.segment_capacity, config.section_multiple)?,
            workout,
            profile: workout.profile(),
            clock: None,
            segment_runs: 0,
            section_runs: 0,
            metrics: None,
        })
    }

    pub fn with_clock(mut self, clock: SensorClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_metrics(mut self, metrics: EngineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn workout(&self) -> WorkoutType {
        self.workout
    }

    /// Bytt økttype: nytt bånd/terskel, vinduene tømmes.
    pub fn configure(&mut self, workout: WorkoutType) {
        if workout == self.workout {
            return;
        }
        self.workout = workout;
        self.profile = workout.profile();
        self.buffer.clear();
    }

    /// Estimator-kall på segmentvinduer (= antall avlesninger).
    pub fn segment_runs(&self) -> u64 {
        self.segment_runs
    }

    /// Estimator-kall på seksjonsvinduer.
    pub fn section_runs(&self) -> u64 {
        self.section_runs
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &SignalBuffer {
        &self.buffer
    }

    /// Rå callback. Uten klokke brukes oppetid direkte fra epoch (kun tester/replay).
    pub fn push_raw(&mut self, raw: &RawRotation) -> Option<CadenceReading> {
        let clock = self
            .clock
            .unwrap_or_else(|| SensorClock::new(DateTime::<Utc>::default(), 0.0));
        match clock.rotation(raw) {
            Some(sample) => self.push(sample),
            None => {
                warn!("gyro-sample forkastet: ugyldig oppetid {}", raw.uptime_s);
                None
            }
        }
    }

    pub fn push(&mut self, sample: SensorSample) -> Option<CadenceReading> {
        let FilledWindows { segment, section } = self.buffer.push(sample)?;

        self.segment_runs += 1;
        let result = self.run_estimate(&segment).unwrap_or_else(FftResult::none);
        let preferred_cadence = match section.as_deref() {
            Some(s) => {
                self.section_runs += 1;
                Some(self.run_estimate(s).map(|r| r.cadence).unwrap_or(0.0))
            }
            None => None,
        };

        let peak_frequency_hz = spectrum_peak(&result.power_spectrum).map(|p| p.frequency);
        let axis_trace = segment.iter().map(|s| result.dominant_axis.project(s)).collect();
        let timestamp = segment.last().map(|s| s.timestamp).unwrap_or(sample.timestamp);

        Some(CadenceReading {
            timestamp,
            cadence: result.cadence,
            preferred_cadence,
            dominant_axis: result.dominant_axis,
            power_spectrum: result.power_spectrum,
            peak_frequency_hz,
            axis_trace,
        })
    }

    fn run_estimate(&self, window: &[SensorSample]) -> Option<FftResult> {
        if let Some(m) = &self.metrics {
            m.fft_runs_total.inc();
        }
        estimate_cadence(window, self.profile.band(), self.profile.magnitude_threshold)
    }

    /// Stopp: delvise vinduer forkastes.
    pub fn stop(&mut self) {
        self.buffer.clear();
    }
}
