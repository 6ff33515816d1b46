//! Histogram binning for derived series
//!
//! This crate partitions a sample set into contiguous, left-closed bins of
//! equal width and counts the samples in each one. The bin count comes from
//! a [`BinCountStrategy`] (square-root, Sturges, Rice, an explicit count or a
//! custom function) unless an explicit bin width is configured.
//!
//! # Key Features
//!
//! - **Complete output**: every bin between the minimum and the maximum is
//!   emitted, empty bins included
//! - **Drift-tolerant edges**: bin keys are normalized with
//!   [`derived_core::correct_float`] so equal edges always coincide
//! - **Deterministic**: bins come out of an ordered map, sorted ascending
//! - **Reactive ready**: [`HistogramComputer`] implements
//!   [`derived_core::Recomputable`] and plugs into a derived-series controller
//!
//! # Examples
//!
//! ```rust
//! use derived_histogram::{BinCountStrategy, HistogramComputer, HistogramOptions};
//!
//! let data = vec![1.0, 2.0, 2.0, 3.0, 10.0];
//! let computer = HistogramComputer::new(
//!     HistogramOptions::default().with_bins(BinCountStrategy::Explicit(2.0)),
//! );
//! let histogram = computer.compute(&data).unwrap();
//!
//! assert_eq!(histogram.pairs(), vec![(0.0, 4.0), (4.5, 0.0), (9.0, 1.0)]);
//! for bin in histogram.bins() {
//!     println!("{bin}");
//! }
//! ```
//!
//! ## Explicit Bin Width
//!
//! ```rust
//! use derived_histogram::HistogramComputer;
//!
//! let histogram = HistogramComputer::with_bin_width(0.5)
//!     .compute(&[0.1, 0.2, 0.7, 1.4])
//!     .unwrap();
//! assert_eq!(histogram.counts(), vec![2, 1, 1]);
//! assert_eq!(histogram.bin_width(), Some(0.5));
//! ```

pub mod assign;
pub mod computer;
pub mod strategy;
pub mod types;

pub use assign::{fit_to_bin, BinAssigner};
pub use computer::{compute_histogram, HistogramComputer, HistogramOptions, DEFAULT_MAX_BINS};
pub use strategy::{BinCountStrategy, BinsSetting, CustomBinCount};
pub use types::{Histogram, HistogramBin};

pub use derived_core::{Error, Result};
