//! Live økt på tokio.
//!
//! To tasks:
//! - motion-worker: eneste konsument av gyro/barometer-køen (seriell), eier `MotionProcessor`
//! - koordinator: eneste skriver av fusjonstilstanden, `select!` over worker-utdata,
//!   posisjonskanalen og stopp-signalet
//!
//! Stopp: koordinatoren setter shutdown-flagget, avbryter og venter på workeren,
//! og først da avsluttes økten. Input som ligger i kø forkastes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::fusion::{SegmentFusionEngine, SegmentOutcome};
use crate::metrics::RunningAggregates;
use crate::models::{LocationFix, RawAltitude, RawRotation, SensorClock};
use crate::motion::{CadenceReading, MotionProcessor};
use crate::telemetry::EngineMetrics;
use crate::types::{AlertRequest, CadenceSegment, LocationAuthorization, WorkoutSummary};
use crate::workout::WorkoutType;

/// Hendelser inn til motion-workeren (én seriell kø).
#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    Rotation(RawRotation),
    Altitude(RawAltitude),
    /// Forbigående barometerfeil – logges, økten fortsetter
    AltitudeError(String),
    /// Hard gyro-feil – økten stoppes
    RotationFailure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Fix(LocationFix),
    Authorization(LocationAuthorization),
    /// Forbigående posisjonsfeil – logges
    Error(String),
}

/// Utdata til UI/varsler/eksport.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Segment(CadenceSegment),
    Aggregates(RunningAggregates),
    LiveCadence(f64),
    Alert(AlertRequest),
    SensorFailure(String),
}

/// Hvilke sensorer enheten har. Uten kapabilitet startes ikke strømmen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCapabilities {
    pub gyro: bool,
    pub altimeter: bool,
    pub location: bool,
}

impl Default for SensorCapabilities {
    fn default() -> Self {
        Self { gyro: true, altimeter: true, location: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub config: EngineConfig,
    pub workout: WorkoutType,
    pub capabilities: SensorCapabilities,
    pub authorization: LocationAuthorization,
}

impl SessionSettings {
    pub fn new(workout: WorkoutType) -> Self {
        Self {
            config: EngineConfig::default(),
            workout,
            capabilities: SensorCapabilities::default(),
            authorization: LocationAuthorization::default(),
        }
    }
}

/// Barometer-inngang. Deler den serielle køen med gyro, men kan bare sende høyde
/// og forbigående høydefeil.
#[derive(Debug, Clone)]
pub struct AltitudeSender {
    tx: mpsc::Sender<MotionEvent>,
}

impl AltitudeSender {
    pub async fn send(&self, raw: RawAltitude) -> EngineResult<()> {
        self.tx.send(MotionEvent::Altitude(raw)).await.map_err(|_| EngineError::SessionClosed)
    }

    pub async fn send_error(&self, message: impl Into<String>) -> EngineResult<()> {
        self.tx
            .send(MotionEvent::AltitudeError(message.into()))
            .await
            .map_err(|_| EngineError::SessionClosed)
    }
}

/// Worker → koordinator.
#[derive(Debug)]
enum WorkerOutput {
    Reading(CadenceReading),
    Altitude(RawAltitude),
    Failure(String),
}

pub struct RideSession {
    gyro_tx: Option<mpsc::Sender<MotionEvent>>,
    altimeter_tx: Option<AltitudeSender>,
    location_tx: Option<mpsc::Sender<LocationEvent>>,
    stop_tx: Option<oneshot::Sender<()>>,
    coordinator: JoinHandle<EngineResult<Option<WorkoutSummary>>>,
    metrics: EngineMetrics,
}

impl RideSession {
    /// Start økten. Må kalles innenfor en tokio-runtime.
    pub fn start(
        settings: SessionSettings,
        clock: SensorClock,
    ) -> EngineResult<(Self, mpsc::UnboundedReceiver<SessionEvent>)> {
        let SessionSettings { config, workout, capabilities, authorization } = settings;
        config.validate()?;

        let metrics = EngineMetrics::new()?;
        let processor = MotionProcessor::new(&config, workout)?
            .with_clock(clock)
            .with_metrics(metrics.clone());
        let engine = SegmentFusionEngine::new(&config, workout, clock)
            .with_authorization(authorization)
            .with_metrics(metrics.clone());

        let (motion_tx, motion_rx) = mpsc::channel(config.channel_capacity);
        let (location_tx, location_rx) = mpsc::channel(config.channel_capacity);
        let (worker_tx, worker_rx) = mpsc::channel(config.channel_capacity);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = tokio::spawn(motion_worker(processor, motion_rx, worker_tx, shutdown.clone()));
        let coordinator = tokio::spawn(coordinate(
            engine,
            worker,
            worker_rx,
            location_rx,
            stop_rx,
            events_tx,
            shutdown,
        ));

        info!(
            "økt startet: {:?} (gyro={}, baro={}, gps={})",
            workout, capabilities.gyro, capabilities.altimeter, capabilities.location
        );

        let session = Self {
            gyro_tx: capabilities.gyro.then(|| motion_tx.clone()),
            altimeter_tx: capabilities.altimeter.then(|| AltitudeSender { tx: motion_tx.clone() }),
            location_tx: capabilities.location.then_some(location_tx),
            stop_tx: Some(stop_tx),
            coordinator,
            metrics,
        };
        Ok((session, events_rx))
    }

    /// Gyro-strøm. `None` når enheten mangler gyro.
    pub fn gyro_sender(&self) -> Option<mpsc::Sender<MotionEvent>> {
        self.gyro_tx.clone()
    }

    /// Barometer-strøm, samme serielle kø som gyro.
    pub fn altimeter_sender(&self) -> Option<AltitudeSender> {
        self.altimeter_tx.clone()
    }

    pub fn location_sender(&self) -> Option<mpsc::Sender<LocationEvent>> {
        self.location_tx.clone()
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Stopp og hent sammendraget. `Ok(None)` når økten ikke ga noen segmenter.
    pub async fn stop(mut self) -> EngineResult<Option<WorkoutSummary>> {
        if let Some(tx) = self.stop_tx.take() {
            // koordinatoren kan allerede ha stoppet (sensorfeil)
            let _ = tx.send(());
        }
        self.gyro_tx = None;
        self.altimeter_tx = None;
        self.location_tx = None;
        self.coordinator.await?
    }
}

async fn motion_worker(
    mut processor: MotionProcessor,
    mut rx: mpsc::Receiver<MotionEvent>,
    out: mpsc::Sender<WorkerOutput>,
    shutdown: Arc<AtomicBool>,
) {
    while let Some(event) = rx.recv().await {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let forwarded = match event {
            MotionEvent::Rotation(raw) => match processor.push_raw(&raw) {
                Some(reading) => out.send(WorkerOutput::Reading(reading)).await.is_ok(),
                None => true,
            },
            MotionEvent::Altitude(raw) => out.send(WorkerOutput::Altitude(raw)).await.is_ok(),
            MotionEvent::AltitudeError(msg) => {
                warn!("høydemåler: {msg}");
                true
            }
            MotionEvent::RotationFailure(msg) => {
                let err = EngineError::SensorFailure { sensor: "gyro", message: msg.clone() };
                error!("{err}");
                let _ = out.send(WorkerOutput::Failure(msg)).await;
                false
            }
        };
        if !forwarded {
            break;
        }
    }
    processor.stop();
    debug!("motion-worker avsluttet");
}

async fn coordinate(
    mut engine: SegmentFusionEngine,
    worker: JoinHandle<()>,
    mut worker_rx: mpsc::Receiver<WorkerOutput>,
    mut location_rx: mpsc::Receiver<LocationEvent>,
    mut stop_rx: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<SessionEvent>,
    shutdown: Arc<AtomicBool>,
) -> EngineResult<Option<WorkoutSummary>> {
    let mut worker_open = true;
    let mut location_open = true;

    loop {
        tokio::select! {
            biased;

            _ = &mut stop_rx => {
                debug!("stopp mottatt");
                break;
            }
            out = worker_rx.recv(), if worker_open => match out {
                Some(WorkerOutput::Reading(reading)) => {
                    let outcome = engine.process(&reading);
                    emit(&events, outcome);
                }
                Some(WorkerOutput::Altitude(raw)) => {
                    engine.ingest_altitude_raw(&raw);
                }
                Some(WorkerOutput::Failure(msg)) => {
                    let _ = events.send(SessionEvent::SensorFailure(msg));
                    break;
                }
                None => worker_open = false,
            },
            loc = location_rx.recv(), if location_open => match loc {
                Some(LocationEvent::Fix(fix)) => engine.ingest_location(fix),
                Some(LocationEvent::Authorization(status)) => engine.set_authorization(status),
                Some(LocationEvent::Error(msg)) => warn!("posisjon: {msg}"),
                None => location_open = false,
            },
        }
    }

    shutdown.store(true, Ordering::SeqCst);
    worker.abort();
    match worker.await {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => {}
        Err(e) => return Err(e.into()),
    }

    let summary = engine.finish();
    match &summary {
        Some(s) => info!(
            "økt ferdig: {} segmenter, {:.0} m, snittkadens {:.0}",
            s.cadence_segments.len(),
            s.total_distance,
            s.average_cadence
        ),
        None => info!("økt ferdig uten segmenter (for kort)"),
    }
    Ok(summary)
}

fn emit(events: &mpsc::UnboundedSender<SessionEvent>, outcome: SegmentOutcome) {
    // mottaker borte = ingen lytter, ikke en feil
    let _ = events.send(SessionEvent::Segment(outcome.segment));
    let _ = events.send(SessionEvent::Aggregates(outcome.aggregates));
    if let Some(c) = outcome.live_cadence {
        let _ = events.send(SessionEvent::LiveCadence(c));
    }
    for alert in outcome.alerts {
        let _ = events.send(SessionEvent::Alert(alert));
    }
}
