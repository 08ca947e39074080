use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A numeric series indexed by timestamp, always in ascending time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeriesRecord")]
pub struct TimeSeries {
    samples: Vec<(NaiveDateTime, f64)>,
}

/// Serialized samples, in whatever order they were written.
#[derive(Deserialize)]
struct SeriesRecord {
    samples: Vec<(NaiveDateTime, f64)>,
}

impl From<SeriesRecord> for TimeSeries {
    fn from(record: SeriesRecord) -> Self {
        TimeSeries::from_samples(record.samples)
    }
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from samples in any order. Sorting is stable, so
    /// samples sharing a timestamp keep their relative order.
    pub fn from_samples(mut samples: Vec<(NaiveDateTime, f64)>) -> Self {
        samples.sort_by_key(|(time, _)| *time);
        TimeSeries { samples }
    }

    /// Insert a sample at its place in time order.
    pub fn push(&mut self, time: NaiveDateTime, value: f64) {
        let idx = self.samples.partition_point(|(t, _)| *t <= time);
        self.samples.insert(idx, (time, value));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&(NaiveDateTime, f64)> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&(NaiveDateTime, f64)> {
        self.samples.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NaiveDateTime, f64)> {
        self.samples.iter()
    }

    /// Samples with `start <= time <= end`.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> TimeSeries {
        let lo = self.samples.partition_point(|(t, _)| *t < start);
        let hi = self.samples.partition_point(|(t, _)| *t <= end);
        TimeSeries {
            samples: self.samples[lo..hi.max(lo)].to_vec(),
        }
    }
}
