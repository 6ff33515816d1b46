//! Core traits and types for derived-series computation
//!
//! A derived series is a dataset that is a pure function of another dataset
//! (its base) and is regenerated every time the base changes. This crate
//! holds what every derivation shares:
//!
//! - [`Recomputable`]: the capability a derivation algorithm implements
//! - [`DataSource`] / [`SampleSource`]: what a base series offers
//! - [`EventBus`] and [`SeriesEvent`]: ordered change notifications
//! - [`SampleSeries`] and [`SeriesRegistry`]: an in-memory base series and
//!   resolution of [`SeriesRef`]s among siblings
//! - [`correct_float`]: the float normalization used for bin keys
//!
//! # Example
//!
//! ```rust
//! use derived_core::{SampleSeries, SampleSource, SeriesRegistry, SeriesRef};
//! use std::sync::Arc;
//!
//! let mut registry = SeriesRegistry::new();
//! registry.add(Arc::new(SampleSeries::with_id("main", vec![1.0, 2.0, 2.0])));
//!
//! let base = registry.resolve(&SeriesRef::from("main")).unwrap();
//! assert_eq!(base.samples(), vec![1.0, 2.0, 2.0]);
//! ```

pub mod error;
pub mod events;
pub mod numeric;
pub mod series;
pub mod traits;

pub use error::{Error, Result};
pub use events::{
    EventBus, EventHandler, LoggingHandler, RedrawStats, RedrawTracker,
    SeriesEvent, SubscriptionId,
};
pub use numeric::{check_finite, correct_float, min_max, FLOAT_PRECISION};
pub use series::{SampleSeries, SeriesRef, SeriesRegistry};
pub use traits::{DataPoint, DataSource, DerivedData, Recomputable, SampleSource};
