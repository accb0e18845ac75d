use prometheus::{Gauge, IntCounter, IntCounterVec, Opts, Registry};

use crate::error::EngineResult;
use crate::types::AlertKind;

/// Prometheus-målinger for én økt. Eget register per økt, ingen global tilstand.
/// Klones billig (metrikkene deler intern tilstand).
#[derive(Clone)]
pub struct EngineMetrics {
    registry: Registry,
    pub fft_runs_total: IntCounter,
    pub segments_total: IntCounter,
    pub alerts_total: IntCounterVec,
    pub distance_m: Gauge,
}

impl EngineMetrics {
    pub fn new() -> EngineResult<Self> {
        let registry = Registry::new();

        let fft_runs_total = IntCounter::new("cadence_fft_runs_total", "Antall FFT-estimater (segment + seksjon)")?;
        let segments_total = IntCounter::new("cadence_segments_total", "Antall kadenssegmenter")?;
        let alerts_total = IntCounterVec::new(
            Opts::new("cadence_alerts_total", "Varselforespørsler per type"),
            &["kind"],
        )?;
        let distance_m = Gauge::new("cadence_distance_meters", "Total distanse i økten")?;

        registry.register(Box::new(fft_runs_total.clone()))?;
        registry.register(Box::new(segments_total.clone()))?;
        registry.register(Box::new(alerts_total.clone()))?;
        registry.register(Box::new(distance_m.clone()))?;

        Ok(Self { registry, fft_runs_total, segments_total, alerts_total, distance_m })
    }

    pub fn alert(&self, kind: AlertKind) {
        self.alerts_total.with_label_values(&[kind.label()]).inc();
    }

    pub fn alerts_for(&self, kind: AlertKind) -> u64 {
        self.alerts_total.with_label_values(&[kind.label()]).get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Tekstformat (for debug-dump / scrape).
    pub fn render(&self) -> String {
        use prometheus::Encoder;
        let mut buf = Vec::new();
        let encoder = prometheus::TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buf).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl std::fmt::Debug for EngineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineMetrics")
            .field("fft_runs_total", &self.fft_runs_total.get())
            .field("segments_total", &self.segments_total.get())
            .field("distance_m", &self.distance_m.get())
            .finish()
    }
}
