use std::collections::VecDeque;

use crate::error::{EngineError, EngineResult};
use crate::models::SensorSample;

/// Fulle vinduer fra ett `push`. Seksjonen fylles alltid samtidig med et segment,
/// siden seksjonskapasiteten er et heltallsmultiplum av segmentkapasiteten.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledWindows {
    pub segment: Vec<SensorSample>,
    pub section: Option<Vec<SensorSample>>,
}

/// To nestede glidende vinduer: kort segment (C₁ = 2^n) og lang seksjon (C₂ = k·C₁).
///
/// Når et vindu når kapasitet, leveres de eldste C samples og nøyaktig C
/// fjernes forfra.
#[derive(Debug, Clone)]
pub struct SignalBuffer {
    segment: VecDeque<SensorSample>,
    section: VecDeque<SensorSample>,
    segment_capacity: usize,
    section_capacity: usize,
}

impl SignalBuffer {
    pub fn new(segment_capacity: usize, section_multiple: usize) -> EngineResult<Self> {
        if segment_capacity < 2 || !segment_capacity.is_power_of_two() {
            return Err(EngineError::InvalidConfig(format!(
                "segmentkapasitet må være 2^n (fikk {segment_capacity})"
            )));
        }
        if section_multiple == 0 {
            return Err(EngineError::InvalidConfig("seksjonsmultiplum må være ≥ 1".into()));
        }
        let section_capacity = segment_capacity * section_multiple;
        Ok(Self {
            segment: VecDeque::with_capacity(segment_capacity),
            section: VecDeque::with_capacity(section_capacity),
            segment_capacity,
            section_capacity,
        })
    }

    pub fn segment_capacity(&self) -> usize {
        self.segment_capacity
    }

    pub fn section_capacity(&self) -> usize {
        self.section_capacity
    }

    /// Nåværende lengde av segmentvinduet.
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    pub fn section_len(&self) -> usize {
        self.section.len()
    }

    pub fn push(&mut self, sample: SensorSample) -> Option<FilledWindows> {
        self.segment.push_back(sample);
        self.section.push_back(sample);

        if self.segment.len() < self.segment_capacity {
            debug_assert!(self.section.len() < self.section_capacity);
            return None;
        }

        let segment: Vec<SensorSample> = self.segment.drain(..self.segment_capacity).collect();

        let section = if self.section.len() >= self.section_capacity {
            Some(self.section.drain(..self.section_capacity).collect())
        } else {
            None
        };

        Some(FilledWindows { segment, section })
    }

    /// Ved stopp: ingen behandling av delvise vinduer.
    pub fn clear(&mut self) {
        self.segment.clear();
        self.section.clear();
    }
}
