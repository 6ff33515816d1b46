//! Derived series for charting
//!
//! Umbrella crate re-exporting the workspace:
//!
//! - [`derived_core`]: errors, events, base series and the derivation traits
//! - [`derived_histogram`]: histogram binning and bin-count heuristics
//! - [`derived_controller`]: derived series kept in sync with their base
//!
//! # Example
//!
//! ```rust
//! use derived_series::prelude::*;
//! use std::sync::Arc;
//!
//! let base = Arc::new(SampleSeries::with_id("latency", vec![12.0, 15.0, 15.5, 22.0]));
//! let mut registry = SeriesRegistry::new();
//! registry.add(base.clone());
//!
//! let histogram = HistogramSeries::new(
//!     HistogramComputer::with_bin_width(5.0),
//!     DerivedSeriesOptions::default().with_base("latency"),
//! );
//! histogram.bind(&registry).unwrap();
//! assert_eq!(histogram.points(), vec![(10.0, 1.0), (15.0, 2.0), (20.0, 1.0)]);
//!
//! base.add_point(31.0, true).unwrap();
//! assert_eq!(histogram.points().last(), Some(&(30.0, 1.0)));
//! ```

pub use derived_controller;
pub use derived_core;
pub use derived_histogram;

pub use derived_controller::{DerivedSeries, DerivedSeriesOptions, HistogramSeries};
pub use derived_core::{Error, Result};

/// Commonly used items
pub mod prelude {
    pub use derived_controller::{
        DerivedSeries, DerivedSeriesOptions, HistogramSeries, HistogramSeriesOptions,
    };
    pub use derived_core::{
        DataPoint, DataSource, DerivedData, Error, EventBus, EventHandler, LoggingHandler,
        Recomputable, RedrawTracker, Result, SampleSeries, SampleSource, SeriesEvent, SeriesRef,
        SeriesRegistry,
    };
    pub use derived_histogram::{
        BinCountStrategy, Histogram, HistogramBin, HistogramComputer, HistogramOptions,
    };
}
