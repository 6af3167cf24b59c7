use query_extract::ExtractionResult;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    rejected_requests: AtomicUsize,
    unavailable_requests: AtomicUsize,

    // Timing (in microseconds), successful parses only
    total_parse_time_us: AtomicU64,

    // Per-field hits
    field_hits: FieldHits,
}

#[derive(Default)]
struct FieldHits {
    make: AtomicUsize,
    model: AtomicUsize,
    location: AtomicUsize,
    year: AtomicUsize,
    min_price: AtomicUsize,
    max_price: AtomicUsize,
    fuel_type: AtomicUsize,
}

/// How a parse request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Parsed,
    Rejected,
    Unavailable,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: Outcome) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Outcome::Parsed => &self.successful_requests,
            Outcome::Rejected => &self.rejected_requests,
            Outcome::Unavailable => &self.unavailable_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse(&self, duration: Duration, result: &ExtractionResult) {
        self.record(Outcome::Parsed);
        self.total_parse_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        let hits = &self.field_hits;
        for field in result.resolved_fields() {
            let counter = match field {
                "make" => &hits.make,
                "model" => &hits.model,
                "location" => &hits.location,
                "year" => &hits.year,
                "min_price" => &hits.min_price,
                "max_price" => &hits.max_price,
                "fuel_type" => &hits.fuel_type,
                _ => continue,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let parsed = self.successful_requests.load(Ordering::Relaxed);
        let total_us = self.total_parse_time_us.load(Ordering::Relaxed) as f64;
        let hits = &self.field_hits;

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: parsed,
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            unavailable_requests: self.unavailable_requests.load(Ordering::Relaxed),
            avg_parse_time_ms: if parsed > 0 {
                total_us / parsed as f64 / 1000.0
            } else {
                0.0
            },
            field_hits: FieldHitsSnapshot {
                make: hits.make.load(Ordering::Relaxed),
                model: hits.model.load(Ordering::Relaxed),
                location: hits.location.load(Ordering::Relaxed),
                year: hits.year.load(Ordering::Relaxed),
                min_price: hits.min_price.load(Ordering::Relaxed),
                max_price: hits.max_price.load(Ordering::Relaxed),
                fuel_type: hits.fuel_type.load(Ordering::Relaxed),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub rejected_requests: usize,
    pub unavailable_requests: usize,
    pub avg_parse_time_ms: f64,
    pub field_hits: FieldHitsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct FieldHitsSnapshot {
    pub make: usize,
    pub model: usize,
    pub location: usize,
    pub year: usize,
    pub min_price: usize,
    pub max_price: usize,
    pub fuel_type: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
