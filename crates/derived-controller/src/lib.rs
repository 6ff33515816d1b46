//! Reactive derived series
//!
//! A [`DerivedSeries`] links to a base series, computes its dataset from the
//! base's complete sample set once bound, and recomputes it every time the
//! base changes: replacing, appending, removing or updating points, as well
//! as changing the derivation options. Recomputation runs before the
//! mutating call returns; only redrawing can be deferred.
//!
//! [`HistogramSeries`] is the derived series backed by
//! [`derived_histogram::HistogramComputer`].
//!
//! # Example
//!
//! ```rust
//! use derived_controller::{HistogramSeries, HistogramSeriesOptions};
//! use derived_core::{SampleSeries, SeriesRegistry};
//! use std::sync::Arc;
//!
//! let options: HistogramSeriesOptions =
//!     serde_json::from_str(r#"{ "baseSeries": 0, "binWidth": 5.0 }"#).unwrap();
//!
//! let mut registry = SeriesRegistry::new();
//! let base = Arc::new(SampleSeries::new(vec![1.0, 4.0, 6.0, 12.0]));
//! registry.add(base.clone());
//!
//! let histogram = HistogramSeries::from_options(options);
//! histogram.bind(&registry).unwrap();
//! assert_eq!(histogram.points(), vec![(0.0, 2.0), (5.0, 1.0), (10.0, 1.0)]);
//!
//! base.remove_point(3, true).unwrap();
//! assert_eq!(histogram.points(), vec![(0.0, 2.0), (5.0, 1.0)]);
//! ```

pub mod controller;
pub mod options;

pub use controller::{DerivedSeries, HistogramSeries};
pub use options::{DerivedSeriesOptions, HistogramSeriesOptions};
