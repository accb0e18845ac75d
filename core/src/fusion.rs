//! Segmentfusjon: kadens + posisjon + høyde → ett uforanderlig `CadenceSegment`.
//!
//! For hvert nytt kadensestimat (slutt-tid = nå):
//! 1. intervall = (forrige segments slutt, nå], eller fra øktstart
//! 2. posisjoner/høyder i intervallet hentes fra historikken
//! 3. fart, bevegelse, trend, distanse, høyde, stigning, sone, kalorier
//! 4. segmentet lagres, aggregater + teller oppdateres, ev. varsler
//!
//! Manglende data gir `None`-felt, aldri avbrutt intervall.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::altitude::AltitudeSampler;
use crate::calories::{CalorieEstimate, CalorieInputs};
use crate::config::EngineConfig;
use crate::counter::Counter;
use crate::history::History;
use crate::metrics::{
    average_baro_altitude, average_gps_altitude, average_speed, chained_distance, valid_locations,
    RunningAggregates, SegmentContribution,
};
use crate::models::{seconds_between, AltitudeSample, LocationFix, RawAltitude, SensorClock, UserProfile};
use crate::motion::CadenceReading;
use crate::telemetry::EngineMetrics;
use crate::types::{
    AlertRequest, CadenceSegment, CadenceZone, LocationAuthorization, MovementActivity,
    PreferredCadenceSample, SpeedTrend, TerrainGradient, WorkoutSummary,
};
use crate::workout::{WorkoutProfile, WorkoutType};

/// Minste snittdistanse mellom intervaller før stigning regnes (m)
pub const MIN_DISTANCE_FOR_SLOPE_M: f64 = 7.5;
/// Maks avvik mellom barometer- og GPS-høydeendring før baro-delta forkastes (m)
pub const MAX_BARO_GPS_DISAGREEMENT_M: f64 = 0.30;

/// Beregnet intervall, før det committes til øktens tilstand.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalAnalysis {
    pub segment: CadenceSegment,
    pub movement: MovementActivity,
    pub trend: SpeedTrend,
    pub gradient: TerrainGradient,
    pub elevation_gain: f64,
    pub calories: Option<CalorieEstimate>,
    /// Siste gyldige posisjon i intervallet (også når stillestående)
    pub route_anchor: Option<LocationFix>,
}

/// Resultat av ett kadensestimat.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOutcome {
    pub segment: CadenceSegment,
    pub movement: MovementActivity,
    pub trend: SpeedTrend,
    pub gradient: TerrainGradient,
    pub elevation_gain: f64,
    pub calories: Option<CalorieEstimate>,
    /// Positiv seksjonskadens til live-statusflaten
    pub live_cadence: Option<f64>,
    pub alerts: Vec<AlertRequest>,
    pub aggregates: RunningAggregates,
}

/// Eneste skriver for øktens delte tilstand (historikk, aggregater, teller).
#[derive(Debug)]
pub struct SegmentFusionEngine {
    workout: WorkoutType,
    profile: WorkoutProfile,
    user: UserProfile,
    section_duration_s: f64,
    location_history_half: usize,
    session_start: DateTime<Utc>,

    locations: History<LocationFix>,
    altitude: AltitudeSampler,
    last_valid_location: Option<LocationFix>,
    authorization: LocationAuthorization,

    segments: Vec<CadenceSegment>,
    aggregates: RunningAggregates,
    counter: Counter,
    last_evaluation: DateTime<Utc>,
    preferred_samples: Vec<PreferredCadenceSample>,
    alerts: Vec<AlertRequest>,

    metrics: Option<EngineMetrics>,
}

impl SegmentFusionEngine {
    pub fn new(config: &EngineConfig, workout: WorkoutType, clock: SensorClock) -> Self {
        let session_start = clock.wall_at_start;
        Self {
            workout,
            profile: workout.profile(),
            user: config.user.clone(),
            section_duration_s: config.section_duration_s(),
            location_history_half: config.location_history_half,
            session_start,
            locations: History::new(config.location_history_half),
            altitude: AltitudeSampler::new(clock, config.altitude_history_half),
            last_valid_location: None,
            authorization: LocationAuthorization::default(),
            segments: Vec::new(),
            aggregates: RunningAggregates::default(),
            counter: Counter::default(),
            last_evaluation: session_start,
            preferred_samples: Vec::new(),
            alerts: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: EngineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_authorization(mut self, status: LocationAuthorization) -> Self {
        self.authorization = status;
        self
    }

    pub fn workout(&self) -> WorkoutType {
        self.workout
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    pub fn segments(&self) -> &[CadenceSegment] {
        &self.segments
    }

    pub fn aggregates(&self) -> &RunningAggregates {
        &self.aggregates
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub fn authorization(&self) -> LocationAuthorization {
        self.authorization
    }

    pub fn alerts(&self) -> &[AlertRequest] {
        &self.alerts
    }

    pub fn preferred_samples(&self) -> &[PreferredCadenceSample] {
        &self.preferred_samples
    }

    // ── Inndata ──────────────────────────────────────────────────────────────

    pub fn ingest_location(&mut self, fix: LocationFix) {
        self.locations.push(fix);
    }

    pub fn ingest_altitude_raw(&mut self, raw: &RawAltitude) -> Option<AltitudeSample> {
        self.altitude.record_raw(raw)
    }

    pub fn ingest_altitude(&mut self, sample: AltitudeSample) {
        self.altitude.record(sample);
    }

    pub fn set_authorization(&mut self, status: LocationAuthorization) {
        if status != self.authorization {
            info!("posisjonstilgang: {:?} → {:?}", self.authorization, status);
        }
        self.authorization = status;
    }

    /// Bytt økttype. Nullstiller hele økt-tilstanden (no-op ved samme type).
    pub fn configure(&mut self, workout: WorkoutType) {
        if workout == self.workout {
            return;
        }
        self.workout = workout;
        self.profile = workout.profile();
        self.reset_session_state();
    }

    pub fn reset_session_state(&mut self) {
        self.locations = History::new(self.location_history_half);
        let clock = self.altitude.clock();
        self.altitude.reset(clock);
        self.last_valid_location = None;
        self.segments.clear();
        self.aggregates = RunningAggregates::default();
        self.counter.reset();
        self.last_evaluation = self.session_start;
        self.preferred_samples.clear();
        self.alerts.clear();
    }

    // ── Fusjon ───────────────────────────────────────────────────────────────

    pub fn process(&mut self, reading: &CadenceReading) -> SegmentOutcome {
        self.process_cadence(reading.timestamp, reading.cadence, reading.preferred_cadence)
    }

    pub fn process_cadence(
        &mut self,
        timestamp: DateTime<Utc>,
        raw_cadence: f64,
        preferred_cadence: Option<f64>,
    ) -> SegmentOutcome {
        let analysis = self.analyze_interval(timestamp, raw_cadence);
        self.commit(analysis, preferred_cadence)
    }

    /// Ren beregning av intervallet (endrer ingen tilstand).
    pub fn analyze_interval(&self, timestamp: DateTime<Utc>, raw_cadence: f64) -> IntervalAnalysis {
        let prev = self.segments.last();
        let start = prev.map(|s| s.timestamp).unwrap_or(self.session_start);
        let duration_s = seconds_between(start, timestamp);

        let relevant_locs = self.locations.window(start, timestamp);
        let relevant_alts = self.altitude.window(start, timestamp);
        let mut valid = valid_locations(&relevant_locs);

        let speed = average_speed(&relevant_locs);
        let movement = speed.map(MovementActivity::classify).unwrap_or(MovementActivity::NotDetermined);
        let trend = match (speed, prev.and_then(|p| p.speed)) {
            (Some(s), Some(ps)) => SpeedTrend::classify(s - ps),
            _ => SpeedTrend::NotDetermined,
        };

        let gps_altitude = average_gps_altitude(&relevant_locs);
        let distance = chained_distance(self.last_valid_location.as_ref(), &valid);
        let baro_altitude = average_baro_altitude(&relevant_alts);

        let mut gradient = TerrainGradient::NotDetermined;
        let mut elevation_gain = 0.0;
        if let (Some(p), Some(alt), Some(dist)) = (prev, baro_altitude, distance) {
            if let (Some(prev_alt), Some(prev_dist)) = (p.baro_altitude, p.distance) {
                let baro_delta = alt - prev_alt;
                let avg_distance = (dist + prev_dist) / 2.0;

                // barometer mot GPS: stor uenighet = støy
                let noisy = match (gps_altitude, p.gps_altitude) {
                    (Some(g), Some(prev_g)) => (baro_delta - (g - prev_g)).abs() > MAX_BARO_GPS_DISAGREEMENT_M,
                    _ => false,
                };

                if avg_distance > MIN_DISTANCE_FOR_SLOPE_M && movement != MovementActivity::Stationary && !noisy {
                    let slope_pct = (baro_delta / avg_distance) * 100.0;
                    gradient = TerrainGradient::classify(slope_pct);
                    if baro_delta > 0.0 {
                        elevation_gain = baro_delta;
                    }
                }
            }
        }

        let route_anchor = valid.last().copied();

        let mut cadence = raw_cadence;
        if movement == MovementActivity::Stationary {
            // ingen kadens og ingen rute for stillstand
            cadence = 0.0;
            valid.clear();
        }
        let zone = CadenceZone::classify(cadence, self.profile.thresholds);

        let calories = match (distance, speed) {
            (Some(d), Some(s)) => Some(
                CalorieInputs {
                    duration_s,
                    distance_m: d,
                    speed_ms: s,
                    cadence,
                    workout: self.workout,
                    weight_kg: self.user.weight_kg,
                    height_cm: self.user.height_cm,
                }
                .calculate(),
            ),
            _ => None,
        };

        IntervalAnalysis {
            segment: CadenceSegment {
                timestamp,
                cadence,
                zone,
                locations: valid,
                speed,
                baro_altitude,
                gps_altitude,
                distance,
            },
            movement,
            trend,
            gradient,
            elevation_gain,
            calories,
            route_anchor,
        }
    }

    fn commit(&mut self, a: IntervalAnalysis, preferred_cadence: Option<f64>) -> SegmentOutcome {
        let timestamp = a.segment.timestamp;

        self.segments.push(a.segment.clone());
        if let Some(anchor) = a.route_anchor {
            self.last_valid_location = Some(anchor);
        }

        self.counter.update(a.segment.zone, a.movement, a.trend, a.gradient);

        self.aggregates.record(
            &SegmentContribution {
                timestamp,
                distance: a.segment.distance,
                speed: a.segment.speed,
                cadence: a.segment.cadence,
                elevation_gain: a.elevation_gain,
                calories: a.calories,
                prior_segments: self.segments.len().saturating_sub(1),
            },
            self.session_start,
        );

        if let Some(m) = &self.metrics {
            m.segments_total.inc();
            m.distance_m.set(self.aggregates.total_distance);
        }

        debug!(
            "{:.0}, {:?}, {:?}, {:?}",
            a.segment.cadence, a.movement, a.trend, a.gradient
        );

        let mut live_cadence = None;
        let mut alerts = Vec::new();
        if let Some(preferred) = preferred_cadence {
            if preferred > 0.0 {
                live_cadence = Some(preferred);
                self.record_preferred(timestamp, preferred);
            }
            if self.counter.register_split() {
                alerts = self.evaluate_split(timestamp);
            }
        }

        SegmentOutcome {
            segment: a.segment,
            movement: a.movement,
            trend: a.trend,
            gradient: a.gradient,
            elevation_gain: a.elevation_gain,
            calories: a.calories,
            live_cadence,
            alerts,
            aggregates: self.aggregates.clone(),
        }
    }

    fn record_preferred(&mut self, end: DateTime<Utc>, cadence: f64) {
        let start = match self.preferred_samples.last() {
            Some(prev) => prev.end,
            None => end - Duration::microseconds((self.section_duration_s * 1e6).round() as i64),
        };
        self.preferred_samples.push(PreferredCadenceSample { start, end, cadence });
    }

    fn evaluate_split(&mut self, at: DateTime<Utc>) -> Vec<AlertRequest> {
        let kinds = self.counter.evaluate(self.workout, self.authorization.allows_tracking());
        let window_s = seconds_between(self.last_evaluation, at);

        let requests: Vec<AlertRequest> = kinds
            .into_iter()
            .map(|kind| AlertRequest { kind, at, window_s })
            .collect();

        for r in &requests {
            info!("varsel: {:?} ({})", r.kind, r.kind.body());
            if let Some(m) = &self.metrics {
                m.alert(r.kind);
            }
        }

        self.alerts.extend(requests.iter().cloned());
        self.counter.reset();
        self.last_evaluation = at;
        requests
    }

    // ── Avslutning ───────────────────────────────────────────────────────────

    /// Ferdig økt. `None` når ingen segmenter ble produsert (for kort økt).
    pub fn finish(&self) -> Option<WorkoutSummary> {
        let last = self.segments.last()?;
        Some(WorkoutSummary {
            workout_type: self.workout,
            start_time: self.session_start,
            end_time: last.timestamp,
            cadence_segments: self.segments.clone(),
            preferred_cadence_samples: self.preferred_samples.clone(),
            alerts: self.alerts.clone(),
            average_cadence: self.aggregates.average_cadence.unwrap_or(0.0),
            total_distance: self.aggregates.total_distance,
            average_speed: self.aggregates.average_speed.unwrap_or(0.0),
            max_speed: self.aggregates.max_speed.unwrap_or(0.0),
            elevation_gain: self.aggregates.elevation_gain,
            active_calories: self.aggregates.active_calories,
            total_calories: self.aggregates.total_calories,
        })
    }
}
