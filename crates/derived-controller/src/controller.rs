//! Reactive controller keeping a derived dataset in sync with its base

use crate::options::{DerivedSeriesOptions, HistogramSeriesOptions};
use derived_core::{
    DataPoint, DataSource, DerivedData, Error, EventBus, EventHandler, Recomputable, Result,
    SampleSource, SeriesEvent, SeriesRegistry, SubscriptionId,
};
use derived_histogram::{Histogram, HistogramComputer};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{debug, instrument, warn};

/// Derived series producing a histogram of its base
pub type HistogramSeries = DerivedSeries<HistogramComputer>;

struct State<C: Recomputable> {
    computer: C,
    data: C::Output,
    last_error: Option<Arc<Error>>,
}

/// State reachable from the base series' listener
struct Shared<C: Recomputable> {
    id: Option<String>,
    state: Mutex<State<C>>,
    events: EventBus,
}

impl<C: Recomputable> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, State<C>> {
        // a panicking handler never leaves the state half-written
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Recompute from the full base sample set and publish the outcome
    ///
    /// The state lock is released before any event is emitted, so handlers
    /// may read the derived series freely.
    #[instrument(skip_all, fields(series = ?self.id, trigger = trigger, n = samples.len()))]
    fn recompute(&self, samples: &[f64], trigger: &'static str, redraw: bool) {
        let pending = {
            let mut state = self.lock();
            match state.computer.recompute(samples) {
                Ok(data) => {
                    debug!(
                        algorithm = state.computer.name(),
                        points = data.points().len(),
                        "recomputed derived data"
                    );
                    state.data = data;
                    state.last_error = None;
                    vec![SeriesEvent::Recomputed {
                        points: state.data.points().len(),
                        redraw,
                    }]
                }
                Err(error) => {
                    let fallback = state.computer.fallback(samples, &error);
                    warn!(
                        algorithm = state.computer.name(),
                        %error,
                        fallback = fallback.is_some(),
                        "recomputation failed"
                    );
                    let issue = SeriesEvent::ComputationIssue {
                        error: error.to_string(),
                        fallback: fallback.is_some(),
                    };
                    state.last_error = Some(Arc::new(error));
                    match fallback {
                        Some(data) => {
                            state.data = data;
                            vec![
                                issue,
                                SeriesEvent::Recomputed {
                                    points: state.data.points().len(),
                                    redraw,
                                },
                            ]
                        }
                        None => vec![issue],
                    }
                }
            }
        };

        for event in &pending {
            if let Err(error) = self.events.emit(event, self) {
                warn!(%error, kind = event.name(), "failed to notify derived series subscribers");
            }
        }
    }
}

impl<C: Recomputable> SampleSource for Shared<C> {
    fn samples(&self) -> Vec<f64> {
        self.lock().data.points().iter().map(DataPoint::y).collect()
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }
}

/// Listener registered on the base series
///
/// Holds the derived state weakly, so a dropped derived series that missed
/// its unsubscription simply stops reacting.
struct BaseListener<C: Recomputable> {
    shared: Weak<Shared<C>>,
}

impl<C: Recomputable> EventHandler for BaseListener<C> {
    fn handle_event(&self, event: &SeriesEvent, source: &dyn SampleSource) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let samples = source.samples();
        shared.recompute(&samples, event.name(), event.redraw());
    }

    fn is_interested(&self, event: &SeriesEvent) -> bool {
        event.is_data_change()
    }

    fn name(&self) -> &str {
        "BaseListener"
    }
}

struct Binding {
    base: Arc<dyn DataSource>,
    subscription: SubscriptionId,
}

/// A series whose data is a pure function of another series
///
/// After [`bind`](Self::bind) the derived dataset is recomputed from the
/// complete base sample set on every base change, synchronously and before
/// the mutating call returns. Whether consumers redraw immediately follows
/// the `redraw` flag of the triggering change; collect deferred redraws with
/// a [`derived_core::RedrawTracker`] subscribed to [`events`](Self::events).
///
/// A failed recomputation keeps the previous dataset unless the algorithm
/// defines a fallback. Either way the failure is logged, published as
/// [`SeriesEvent::ComputationIssue`] and kept in
/// [`last_error`](Self::last_error).
///
/// # Example
///
/// ```rust
/// use derived_controller::{DerivedSeriesOptions, HistogramSeries};
/// use derived_core::{SampleSeries, SeriesRegistry};
/// use derived_histogram::HistogramComputer;
/// use std::sync::Arc;
///
/// let base = Arc::new(SampleSeries::with_id("main", vec![1.0, 2.0, 2.0, 3.0]));
/// let mut registry = SeriesRegistry::new();
/// registry.add(base.clone());
///
/// let histogram = HistogramSeries::new(
///     HistogramComputer::with_bins(2),
///     DerivedSeriesOptions::default().with_base("main"),
/// );
/// histogram.bind(&registry).unwrap();
/// assert_eq!(histogram.points(), vec![(1.0, 1.0), (2.0, 2.0), (3.0, 1.0)]);
///
/// base.add_point(10.0, true).unwrap();
/// assert_eq!(histogram.points(), vec![(0.0, 4.0), (4.5, 0.0), (9.0, 1.0)]);
/// ```
pub struct DerivedSeries<C: Recomputable> {
    shared: Arc<Shared<C>>,
    options: DerivedSeriesOptions,
    binding: Mutex<Option<Binding>>,
}

impl<C: Recomputable> DerivedSeries<C> {
    /// Create an unbound derived series
    pub fn new(computer: C, options: DerivedSeriesOptions) -> Self {
        let shared = Shared {
            id: options.id.clone(),
            state: Mutex::new(State {
                computer,
                data: C::Output::default(),
                last_error: None,
            }),
            events: EventBus::new(),
        };
        Self {
            shared: Arc::new(shared),
            options,
            binding: Mutex::new(None),
        }
    }

    /// Options this series was created with
    pub fn options(&self) -> &DerivedSeriesOptions {
        &self.options
    }

    /// Resolve the configured base among `registry` and bind to it
    pub fn bind(&self, registry: &SeriesRegistry) -> Result<()> {
        let reference = self
            .options
            .base
            .as_ref()
            .ok_or_else(|| Error::unresolved("no base series configured"))?;
        let base = registry.resolve(reference)?;
        self.bind_to(base)
    }

    /// Bind to `base` directly, replacing any previous binding
    ///
    /// Computes the initial dataset before returning.
    pub fn bind_to(&self, base: Arc<dyn DataSource>) -> Result<()> {
        self.unbind()?;

        let listener = BaseListener {
            shared: Arc::downgrade(&self.shared),
        };
        let subscription = base.subscribe(Box::new(listener))?;
        debug!(series = ?self.shared.id, base = ?base.id(), %subscription, "bound derived series");

        let samples = base.samples();
        *self.binding_slot()? = Some(Binding { base, subscription });
        self.shared.recompute(&samples, "bind", false);
        Ok(())
    }

    /// Stop following the base series
    ///
    /// Returns whether the series was bound. The last dataset stays in place.
    pub fn unbind(&self) -> Result<bool> {
        let Some(binding) = self.binding_slot()?.take() else {
            return Ok(false);
        };
        binding.base.unsubscribe(binding.subscription)?;
        debug!(series = ?self.shared.id, subscription = %binding.subscription, "unbound derived series");
        Ok(true)
    }

    /// Whether the series currently follows a base
    pub fn is_bound(&self) -> bool {
        self.binding_slot().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Recompute from the current base samples
    ///
    /// Gives the same dataset as the last recomputation when the base did not
    /// change in between.
    pub fn refresh(&self, redraw: bool) -> Result<()> {
        let base = self.base()?;
        self.shared.recompute(&base.samples(), "refresh", redraw);
        Ok(())
    }

    /// Change the algorithm configuration and recompute
    ///
    /// An unbound series only stores the new configuration; it takes effect
    /// on [`bind`](Self::bind).
    pub fn reconfigure(&self, update: impl FnOnce(&mut C), redraw: bool) -> Result<()> {
        update(&mut self.shared.lock().computer);

        match self.base() {
            Ok(base) => {
                let trigger = SeriesEvent::OptionsUpdated { redraw }.name();
                self.shared.recompute(&base.samples(), trigger, redraw);
            }
            Err(_) => debug!(series = ?self.shared.id, "stored options for unbound series"),
        }
        Ok(())
    }

    /// Copy of the algorithm currently in use
    pub fn computer(&self) -> C
    where
        C: Clone,
    {
        self.shared.lock().computer.clone()
    }

    /// Snapshot of the installed dataset
    pub fn data(&self) -> C::Output {
        self.shared.lock().data.clone()
    }

    /// Installed points as `(x, y)` pairs
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.shared.lock().data.points().iter().map(DataPoint::xy).collect()
    }

    /// Error of the most recent recomputation, if it failed
    pub fn last_error(&self) -> Option<Arc<Error>> {
        self.shared.lock().last_error.clone()
    }

    /// Bus on which recomputations and issues are published
    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    fn base(&self) -> Result<Arc<dyn DataSource>> {
        self.binding_slot()?
            .as_ref()
            .map(|binding| binding.base.clone())
            .ok_or_else(|| {
                let target = match &self.options.base {
                    Some(reference) => reference.to_string(),
                    None => "no base series configured".to_string(),
                };
                Error::unresolved(format!("{target} is not bound"))
            })
    }

    fn binding_slot(&self) -> Result<MutexGuard<'_, Option<Binding>>> {
        self.binding
            .lock()
            .map_err(|_| Error::poisoned("derived series binding"))
    }
}

impl HistogramSeries {
    /// Histogram series built from a complete configuration
    pub fn from_options(options: HistogramSeriesOptions) -> Self {
        Self::new(HistogramComputer::new(options.histogram), options.series)
    }

    /// Width of the bins currently installed
    pub fn bin_width(&self) -> Option<f64> {
        self.shared.lock().data.bin_width()
    }

    /// Snapshot of the installed histogram
    pub fn histogram(&self) -> Histogram {
        self.data()
    }
}

impl<C: Recomputable> SampleSource for DerivedSeries<C> {
    /// The y values of the installed dataset
    fn samples(&self) -> Vec<f64> {
        self.shared.samples()
    }

    fn id(&self) -> Option<String> {
        self.shared.id.clone()
    }
}

impl<C: Recomputable> DataSource for DerivedSeries<C> {
    fn subscribe(&self, handler: Box<dyn EventHandler>) -> Result<SubscriptionId> {
        self.shared.events.register_boxed(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        self.shared.events.unregister(id)
    }
}

impl<C: Recomputable> Drop for DerivedSeries<C> {
    fn drop(&mut self) {
        if let Err(error) = self.unbind() {
            warn!(%error, series = ?self.shared.id, "failed to unsubscribe from base series");
        }
    }
}
