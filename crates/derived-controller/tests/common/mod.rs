//! Shared utilities for integration tests

#![allow(dead_code)]

use derived_core::{EventHandler, SampleSource, SeriesEvent};
use std::sync::{Arc, Mutex};

pub use approx::assert_relative_eq;

/// Install a test-friendly subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Records every event together with the emitter's samples at that moment
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<(SeriesEvent, Vec<f64>)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SeriesEvent> {
        self.seen.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn samples_at(&self, position: usize) -> Vec<f64> {
        self.seen.lock().unwrap()[position].1.clone()
    }

    pub fn clear(&self) {
        self.seen.lock().unwrap().clear();
    }
}

impl EventHandler for Recorder {
    fn handle_event(&self, event: &SeriesEvent, source: &dyn SampleSource) {
        self.seen
            .lock()
            .unwrap()
            .push((event.clone(), source.samples()));
    }
}

/// Integers `0..n` as samples
pub fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|x| x as f64).collect()
}
