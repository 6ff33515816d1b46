//! In-memory base series and reference resolution
//!
//! [`SampleSeries`] is a minimal base dataset: it stores samples, supports
//! the four mutation kinds (replace, append, remove, update) and publishes a
//! [`SeriesEvent`] after each one. [`SeriesRegistry`] holds sibling series so
//! a [`SeriesRef`] can be resolved by identifier or position.

use crate::error::{Error, Result};
use crate::events::{EventBus, EventHandler, SeriesEvent, SubscriptionId};
use crate::traits::{DataSource, SampleSource};
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Reference to a base series by identifier or by position among siblings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SeriesRef {
    /// Identifier string
    Id(String),
    /// Zero-based position in the registry
    Index(usize),
}

impl fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id '{id}'"),
            Self::Index(index) => write!(f, "index {index}"),
        }
    }
}

impl From<&str> for SeriesRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for SeriesRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<usize> for SeriesRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Base series holding a plain sample vector
///
/// Subscribers are notified after the data lock is released. Errors are
/// returned only when the mutation itself could not happen; a failed
/// notification is logged and never undoes a mutation.
pub struct SampleSeries {
    id: Option<String>,
    data: Mutex<Vec<f64>>,
    events: EventBus,
}

impl SampleSeries {
    /// Create an anonymous series
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            id: None,
            data: Mutex::new(data),
            events: EventBus::new(),
        }
    }

    /// Create a series that can be referenced by `id`
    pub fn with_id(id: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(data)
        }
    }

    /// The bus this series publishes its changes on
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples().len()
    }

    /// Whether the series has no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every sample
    pub fn set_data(&self, data: Vec<f64>, redraw: bool) -> Result<()> {
        let len = data.len();
        *self.data.lock().map_err(|_| Error::poisoned("series data"))? = data;
        self.notify(SeriesEvent::DataReplaced { len, redraw });
        Ok(())
    }

    /// Append a sample
    pub fn add_point(&self, value: f64, redraw: bool) -> Result<()> {
        let index = {
            let mut data = self.data.lock().map_err(|_| Error::poisoned("series data"))?;
            data.push(value);
            data.len() - 1
        };
        self.notify(SeriesEvent::PointAdded { index, value, redraw });
        Ok(())
    }

    /// Remove the sample at `index`, returning it
    pub fn remove_point(&self, index: usize, redraw: bool) -> Result<f64> {
        let value = {
            let mut data = self.data.lock().map_err(|_| Error::poisoned("series data"))?;
            if index >= data.len() {
                return Err(Error::PointOutOfRange {
                    index,
                    len: data.len(),
                });
            }
            data.remove(index)
        };
        self.notify(SeriesEvent::PointRemoved { index, value, redraw });
        Ok(value)
    }

    /// Overwrite the sample at `index`, returning the previous value
    pub fn update_point(&self, index: usize, value: f64, redraw: bool) -> Result<f64> {
        let old = {
            let mut data = self.data.lock().map_err(|_| Error::poisoned("series data"))?;
            let len = data.len();
            let slot = data
                .get_mut(index)
                .ok_or(Error::PointOutOfRange { index, len })?;
            std::mem::replace(slot, value)
        };
        self.notify(SeriesEvent::PointUpdated {
            index,
            old,
            new: value,
            redraw,
        });
        Ok(old)
    }

    // The data lock is released before handlers run, so they see the settled state.
    // A failed notification is logged; the mutation stays in place.
    fn notify(&self, event: SeriesEvent) {
        tracing::trace!(series = ?self.id, kind = event.name(), "base series changed");
        if let Err(error) = self.events.emit(&event, self) {
            tracing::warn!(series = ?self.id, kind = event.name(), %error, "failed to notify subscribers");
        }
    }
}

impl SampleSource for SampleSeries {
    fn samples(&self) -> Vec<f64> {
        match self.data.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }
}

impl DataSource for SampleSeries {
    fn subscribe(&self, handler: Box<dyn EventHandler>) -> Result<SubscriptionId> {
        self.events.register_boxed(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        self.events.unregister(id)
    }
}

/// Sibling series that derived series can be linked to
#[derive(Default, Clone)]
pub struct SeriesRegistry {
    series: Vec<Arc<dyn DataSource>>,
}

impl SeriesRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series, returning its position
    pub fn add(&mut self, series: Arc<dyn DataSource>) -> usize {
        self.series.push(series);
        self.series.len() - 1
    }

    /// Number of registered series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Resolve a reference to a registered series
    pub fn resolve(&self, reference: &SeriesRef) -> Result<Arc<dyn DataSource>> {
        let found = match reference {
            SeriesRef::Index(index) => self.series.get(*index),
            SeriesRef::Id(id) => self
                .series
                .iter()
                .find(|s| s.id().as_deref() == Some(id.as_str())),
        };

        found.cloned().ok_or_else(|| {
            Error::unresolved(format!(
                "{reference} does not match any of {} series",
                self.series.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, Default)]
    struct Recorder(Arc<StdMutex<Vec<(String, Vec<f64>)>>>);

    impl EventHandler for Recorder {
        fn handle_event(&self, event: &SeriesEvent, source: &dyn SampleSource) {
            self.0
                .lock()
                .unwrap()
                .push((event.name().to_string(), source.samples()));
        }
    }

    #[test]
    fn test_mutations_notify_with_settled_state() {
        let series = SampleSeries::with_id("main", vec![1.0, 2.0]);
        let recorder = Recorder::default();
        series.subscribe(Box::new(recorder.clone())).unwrap();

        series.add_point(3.0, true).unwrap();
        assert_eq!(series.update_point(0, 5.0, false).unwrap(), 1.0);
        assert_eq!(series.remove_point(1, true).unwrap(), 2.0);
        series.set_data(vec![9.0], true).unwrap();

        let log = recorder.0.lock().unwrap().clone();
        assert_eq!(
            log,
            vec![
                ("append".to_string(), vec![1.0, 2.0, 3.0]),
                ("update".to_string(), vec![5.0, 2.0, 3.0]),
                ("remove".to_string(), vec![5.0, 3.0]),
                ("replace".to_string(), vec![9.0]),
            ]
        );
    }

    struct Panicking;

    impl EventHandler for Panicking {
        fn handle_event(&self, _event: &SeriesEvent, _source: &dyn SampleSource) {
            panic!("handler failure");
        }
    }

    #[test]
    fn test_mutation_survives_failing_subscriber() {
        let series = SampleSeries::new(vec![1.0]);
        let id = series.subscribe(Box::new(Panicking)).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            series.add_point(2.0, true)
        }));
        assert!(result.is_err());
        assert_eq!(series.samples(), vec![1.0, 2.0]);

        // neither the data nor the bus is left poisoned
        assert!(series.unsubscribe(id).unwrap());
        let recorder = Recorder::default();
        series.subscribe(Box::new(recorder.clone())).unwrap();
        series.add_point(3.0, true).unwrap();
        assert_eq!(series.samples(), vec![1.0, 2.0, 3.0]);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_out_of_range_points() {
        let series = SampleSeries::new(vec![1.0]);
        let recorder = Recorder::default();
        series.subscribe(Box::new(recorder.clone())).unwrap();

        assert!(matches!(
            series.remove_point(3, true),
            Err(Error::PointOutOfRange { index: 3, len: 1 })
        ));
        assert!(matches!(
            series.update_point(1, 0.0, true),
            Err(Error::PointOutOfRange { index: 1, len: 1 })
        ));
        assert!(recorder.0.lock().unwrap().is_empty());
        assert_eq!(series.samples(), vec![1.0]);
    }

    #[test]
    fn test_registry_resolution() {
        let mut registry = SeriesRegistry::new();
        registry.add(Arc::new(SampleSeries::new(vec![1.0])));
        registry.add(Arc::new(SampleSeries::with_id("main", vec![2.0, 3.0])));

        let by_id = registry.resolve(&"main".into()).unwrap();
        assert_eq!(by_id.samples(), vec![2.0, 3.0]);

        let by_index = registry.resolve(&SeriesRef::Index(0)).unwrap();
        assert_eq!(by_index.samples(), vec![1.0]);

        let err = registry.resolve(&"missing".into()).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unresolved base reference: id 'missing' does not match any of 2 series"
        );
        assert!(registry.resolve(&SeriesRef::Index(2)).is_err());
    }

    #[test]
    fn test_series_ref_deserialize() {
        let by_id: SeriesRef = serde_json::from_str("\"main\"").unwrap();
        assert_eq!(by_id, SeriesRef::Id("main".into()));
        let by_index: SeriesRef = serde_json::from_str("1").unwrap();
        assert_eq!(by_index, SeriesRef::Index(1));
    }
}
