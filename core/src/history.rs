use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::models::{AltitudeSample, LocationFix};

/// Noe med et veggklokke-tidsstempel.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for LocationFix {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for AltitudeSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Begrenset historikk: når lengden når 2·half, fjernes `half` eldste.
/// Amortisert trimming, ikke et strengt tak.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    half: usize,
}

impl<T: Timestamped + Clone> History<T> {
    pub fn new(half: usize) -> Self {
        let half = half.max(1);
        Self { items: VecDeque::with_capacity(2 * half), half }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        if self.items.len() >= 2 * self.half {
            self.items.drain(..self.half);
        }
    }

    /// Elementer med tid i (start, end].
    pub fn window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<T> {
        self.items
            .iter()
            .filter(|it| {
                let t = it.timestamp();
                t > start && t <= end
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
