//! Core traits connecting base series, derivation algorithms and consumers

use crate::error::{Error, Result};
use crate::events::{EventHandler, SubscriptionId};

/// Anything that can hand out its current samples
pub trait SampleSource: Send + Sync {
    /// Snapshot of the full current sample set, never a delta
    fn samples(&self) -> Vec<f64>;

    /// Identifier of the series, if it has one
    fn id(&self) -> Option<String> {
        None
    }
}

/// A sample source that notifies subscribers when its samples change
pub trait DataSource: SampleSource {
    /// Register a handler for change notifications
    fn subscribe(&self, handler: Box<dyn EventHandler>) -> Result<SubscriptionId>;

    /// Remove a previously registered handler
    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool>;
}

/// A plotted point of a derived dataset
pub trait DataPoint {
    /// Category or position on the x axis
    fn x(&self) -> f64;

    /// Value on the y axis
    fn y(&self) -> f64;

    /// Both coordinates as a pair
    fn xy(&self) -> (f64, f64) {
        (self.x(), self.y())
    }
}

impl DataPoint for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }

    fn y(&self) -> f64 {
        self.1
    }
}

/// Output of a derivation: an ordered sequence of points plus whatever
/// metadata the algorithm wants to expose
pub trait DerivedData: Clone + Default + Send + Sync + 'static {
    /// Point type emitted to consumers
    type Point: DataPoint + Clone;

    /// Points in emission order
    fn points(&self) -> &[Self::Point];
}

/// A derivation algorithm that can be recomputed from a full sample set
///
/// Implementations must be pure: the same samples and configuration always
/// give the same output.
pub trait Recomputable: Send + Sync + 'static {
    /// Dataset produced by the algorithm
    type Output: DerivedData;

    /// Compute the derived dataset from the complete sample set
    fn recompute(&self, samples: &[f64]) -> Result<Self::Output>;

    /// Defined result to install when `recompute` failed with `error`
    ///
    /// Returning `None` keeps the previously installed dataset.
    fn fallback(&self, samples: &[f64], error: &Error) -> Option<Self::Output> {
        let _ = (samples, error);
        None
    }

    /// Get the name of this algorithm for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
