//! Change notification system for series
//!
//! Every series owns an [`EventBus`]. Mutations of a base series and
//! recomputations of a derived series are published as [`SeriesEvent`]s to
//! the registered [`EventHandler`]s, strictly in the order they happen.
//! Handlers receive the emitting series as a [`SampleSource`] so they can
//! pull its settled state without holding a reference back to it.

use crate::error::{Error, Result};
use crate::traits::SampleSource;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Identifies a registered handler so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event emitted by a series
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesEvent {
    /// The whole dataset was replaced
    DataReplaced { len: usize, redraw: bool },

    /// A point was appended
    PointAdded { index: usize, value: f64, redraw: bool },

    /// A point was removed
    PointRemoved { index: usize, value: f64, redraw: bool },

    /// A point was updated in place
    PointUpdated {
        index: usize,
        old: f64,
        new: f64,
        redraw: bool,
    },

    /// Computation options changed
    OptionsUpdated { redraw: bool },

    /// A derived series installed a freshly computed dataset
    Recomputed { points: usize, redraw: bool },

    /// A recomputation failed or degraded
    ///
    /// `fallback` tells whether a fallback dataset was installed or the
    /// previous one was kept.
    ComputationIssue { error: String, fallback: bool },
}

impl SeriesEvent {
    /// Whether consumers should redraw immediately
    pub fn redraw(&self) -> bool {
        match self {
            Self::DataReplaced { redraw, .. }
            | Self::PointAdded { redraw, .. }
            | Self::PointRemoved { redraw, .. }
            | Self::PointUpdated { redraw, .. }
            | Self::OptionsUpdated { redraw }
            | Self::Recomputed { redraw, .. } => *redraw,
            Self::ComputationIssue { .. } => false,
        }
    }

    /// Whether the event means the emitting series' samples may have changed
    pub fn is_data_change(&self) -> bool {
        !matches!(self, Self::ComputationIssue { .. })
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::DataReplaced { .. } => "replace",
            Self::PointAdded { .. } => "append",
            Self::PointRemoved { .. } => "remove",
            Self::PointUpdated { .. } => "update",
            Self::OptionsUpdated { .. } => "options",
            Self::Recomputed { .. } => "recomputed",
            Self::ComputationIssue { .. } => "issue",
        }
    }
}

/// Trait for handling series events
pub trait EventHandler: Send + Sync {
    /// Handle an event emitted by `source`
    fn handle_event(&self, event: &SeriesEvent, source: &dyn SampleSource);

    /// Check if this handler is interested in a particular event type
    fn is_interested(&self, event: &SeriesEvent) -> bool {
        let _ = event;
        true
    }

    /// Get the name of this handler for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

type Handlers = Vec<(SubscriptionId, Arc<dyn EventHandler>)>;

/// Event bus for distributing events to multiple handlers
///
/// Handlers run without the registry lock held, so they may register,
/// unregister or trigger further emissions on the same bus. Registry changes
/// made during an emission apply from the next one.
pub struct EventBus {
    handlers: Arc<Mutex<Handlers>>,
    enabled: Arc<Mutex<bool>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(Vec::new())),
            enabled: Arc::new(Mutex::new(true)),
        }
    }

    /// Register an event handler
    pub fn register<H>(&self, handler: H) -> Result<SubscriptionId>
    where
        H: EventHandler + 'static,
    {
        self.register_boxed(Box::new(handler))
    }

    /// Register an already boxed event handler
    pub fn register_boxed(&self, handler: Box<dyn EventHandler>) -> Result<SubscriptionId> {
        let mut handlers = self.handlers.lock().map_err(|_| Error::poisoned("handlers"))?;
        let id = SubscriptionId::new();
        handlers.push((id, Arc::from(handler)));
        Ok(id)
    }

    /// Remove a handler, returning whether it was registered
    pub fn unregister(&self, id: SubscriptionId) -> Result<bool> {
        let mut handlers = self.handlers.lock().map_err(|_| Error::poisoned("handlers"))?;
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        Ok(handlers.len() != before)
    }

    /// Emit an event to all registered handlers, in registration order
    pub fn emit(&self, event: &SeriesEvent, source: &dyn SampleSource) -> Result<()> {
        if !self.is_enabled()? {
            return Ok(());
        }

        let handlers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self.handlers.lock().map_err(|_| Error::poisoned("handlers"))?;
            handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect()
        };
        for handler in &handlers {
            if handler.is_interested(event) {
                handler.handle_event(event, source);
            }
        }

        Ok(())
    }

    /// Enable or disable event emission
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let mut state = self.enabled.lock().map_err(|_| Error::poisoned("enabled state"))?;
        *state = enabled;
        Ok(())
    }

    /// Check if the event bus is enabled
    pub fn is_enabled(&self) -> Result<bool> {
        let state = self.enabled.lock().map_err(|_| Error::poisoned("enabled state"))?;
        Ok(*state)
    }

    /// Get the number of registered handlers
    pub fn handler_count(&self) -> Result<usize> {
        let handlers = self.handlers.lock().map_err(|_| Error::poisoned("handlers"))?;
        Ok(handlers.len())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            enabled: Arc::clone(&self.enabled),
        }
    }
}

/// Logs every event it sees through `tracing`
pub struct LoggingHandler {
    label: String,
}

impl LoggingHandler {
    /// Create a new logging handler
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl EventHandler for LoggingHandler {
    fn handle_event(&self, event: &SeriesEvent, source: &dyn SampleSource) {
        let series = source.id().unwrap_or_else(|| "<anonymous>".to_string());
        match event {
            SeriesEvent::ComputationIssue { error, fallback } => {
                tracing::warn!(label = %self.label, %series, fallback, "computation issue: {error}");
            }
            SeriesEvent::Recomputed { points, redraw } => {
                tracing::debug!(label = %self.label, %series, points, redraw, "series recomputed");
            }
            _ => {
                tracing::trace!(label = %self.label, %series, kind = event.name(), "series event: {event:?}");
            }
        }
    }
}

/// Redraw bookkeeping collected by [`RedrawTracker`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedrawStats {
    /// Recomputations observed
    pub recomputations: usize,
    /// Recomputations that asked for an immediate redraw
    pub immediate_redraws: usize,
    /// Recomputations whose redraw is still deferred
    pub pending: usize,
    /// Deferred batches collapsed into a single redraw by [`RedrawTracker::flush`]
    pub flushed: usize,
}

/// Collapses deferred redraws of a derived series into one
///
/// Clones share the same counters, so a clone can be registered on a bus
/// while the original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RedrawTracker {
    stats: Arc<Mutex<RedrawStats>>,
}

impl RedrawTracker {
    /// Create a new redraw tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether deferred recomputations are waiting for a redraw
    pub fn needs_redraw(&self) -> Result<bool> {
        Ok(self.snapshot()?.pending > 0)
    }

    /// Perform a single redraw for all deferred recomputations
    ///
    /// Returns `false` when nothing was pending.
    pub fn flush(&self) -> Result<bool> {
        let mut stats = self.stats.lock().map_err(|_| Error::poisoned("redraw stats"))?;
        if stats.pending == 0 {
            return Ok(false);
        }
        stats.pending = 0;
        stats.flushed += 1;
        Ok(true)
    }

    /// Get a snapshot of current counters
    pub fn snapshot(&self) -> Result<RedrawStats> {
        let stats = self.stats.lock().map_err(|_| Error::poisoned("redraw stats"))?;
        Ok(stats.clone())
    }
}

impl EventHandler for RedrawTracker {
    fn handle_event(&self, event: &SeriesEvent, _source: &dyn SampleSource) {
        let Ok(mut stats) = self.stats.lock() else {
            tracing::error!("Failed to lock redraw stats");
            return;
        };

        if let SeriesEvent::Recomputed { redraw, .. } = event {
            stats.recomputations += 1;
            if *redraw {
                // an immediate redraw also paints everything deferred so far
                stats.immediate_redraws += 1;
                stats.pending = 0;
            } else {
                stats.pending += 1;
            }
        }
    }

    fn is_interested(&self, event: &SeriesEvent) -> bool {
        matches!(event, SeriesEvent::Recomputed { .. })
    }
}
