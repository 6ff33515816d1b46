//! Histogram computation from a full sample set

use crate::assign::BinAssigner;
use crate::strategy::BinCountStrategy;
use crate::types::{Histogram, HistogramBin};
use derived_core::{check_finite, min_max, Error, Recomputable, Result, FLOAT_PRECISION};
use ordered_float::OrderedFloat;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Default upper bound on the number of bins a single computation may seed
pub const DEFAULT_MAX_BINS: usize = 10_000;

/// Options controlling histogram computation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistogramOptions {
    /// Bin-count policy, ignored when `bin_width` is set
    #[serde(alias = "binsNumber")]
    pub bins: BinCountStrategy,
    /// Explicit bin width; takes precedence over `bins`
    pub bin_width: Option<f64>,
    /// Computations needing more bins than this fail with `TooManyBins`
    pub max_bins: usize,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            bins: BinCountStrategy::SquareRoot,
            bin_width: None,
            max_bins: DEFAULT_MAX_BINS,
        }
    }
}

impl HistogramOptions {
    /// Set the bin-count policy
    pub fn with_bins(mut self, bins: impl Into<BinCountStrategy>) -> Self {
        self.bins = bins.into();
        self
    }

    /// Set an explicit bin width
    pub fn with_bin_width(mut self, width: f64) -> Self {
        self.bin_width = Some(width);
        self
    }

    /// Set the bin limit
    pub fn with_max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins.max(1);
        self
    }
}

/// Computes histograms with left-closed bins of equal width
///
/// Bins run contiguously from the bin containing the minimum to the bin
/// containing the maximum, empty bins included. The bin holding the maximum
/// is the one whose left edge is `floor(max / width) * width`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramComputer {
    options: HistogramOptions,
}

impl HistogramComputer {
    /// Create a computer with the given options
    pub fn new(options: HistogramOptions) -> Self {
        Self { options }
    }

    /// Computer with a bin-count policy and default options otherwise
    pub fn with_bins(bins: impl Into<BinCountStrategy>) -> Self {
        Self::new(HistogramOptions::default().with_bins(bins))
    }

    /// Computer with an explicit bin width
    pub fn with_bin_width(width: f64) -> Self {
        Self::new(HistogramOptions::default().with_bin_width(width))
    }

    /// Current options
    pub fn options(&self) -> &HistogramOptions {
        &self.options
    }

    /// Mutable access to the options
    pub fn options_mut(&mut self) -> &mut HistogramOptions {
        &mut self.options
    }

    /// Bin width that `compute` would use for `samples`
    ///
    /// The explicit width wins when it is positive and finite; anything else
    /// is ignored and the width is derived from the bin count.
    pub fn resolve_bin_width(&self, samples: &[f64]) -> Option<f64> {
        let (min, max) = min_max(samples)?;
        Some(self.width_for(samples, min, max))
    }

    fn width_for(&self, samples: &[f64], min: f64, max: f64) -> f64 {
        match self.options.bin_width {
            Some(width) if width > 0.0 && width.is_finite() => width,
            explicit => {
                if let Some(width) = explicit {
                    warn!(width, "ignoring invalid bin width");
                }
                let bins = self.options.bins.count(samples);
                (max - min) / bins as f64
            }
        }
    }

    /// Compute the histogram of `samples`
    ///
    /// An empty sample set yields an empty histogram.
    #[instrument(skip_all, fields(n = samples.len(), bins = self.options.bins.name()))]
    pub fn compute(&self, samples: &[f64]) -> Result<Histogram> {
        let Some((min, max)) = min_max(samples) else {
            return Ok(Histogram::default());
        };
        check_finite(samples)?;

        let width = self.width_for(samples, min, max);
        bin_samples(samples, min, max, width, self.options.max_bins)
    }
}

/// Compute a histogram with `bins_number` bins, or bins of `bin_width` when
/// given
pub fn compute_histogram(
    samples: &[f64],
    bins_number: usize,
    bin_width: Option<f64>,
) -> Result<Histogram> {
    let mut options = HistogramOptions::default().with_bins(bins_number);
    options.bin_width = bin_width;
    HistogramComputer::new(options).compute(samples)
}

fn bin_samples(samples: &[f64], min: f64, max: f64, width: f64, max_bins: usize) -> Result<Histogram> {
    let assigner = BinAssigner::new(width)?;
    let first = assigner.bin_index(min);
    let last = assigner.bin_index(max);

    // beyond this, neighbouring edges no longer differ at FLOAT_PRECISION digits
    let max_index = 10f64.powi(FLOAT_PRECISION - 1);
    if first.abs().max(last.abs()) >= max_index {
        return Err(Error::DegenerateBinWidth { width });
    }

    let span = last - first + 1.0;
    if span > max_bins as f64 {
        return Err(Error::TooManyBins {
            requested: span as usize,
            limit: max_bins,
        });
    }
    let span = span as usize;

    let mut frequencies: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    for offset in 0..span {
        let edge = assigner.edge(first + offset as f64);
        frequencies.insert(OrderedFloat(edge), 0);
    }
    debug!(width, first, bins = span, "seeded bins");

    for &value in samples {
        let edge = assigner.assign(value);
        match frequencies.get_mut(&OrderedFloat(edge)) {
            Some(count) => *count += 1,
            None => {
                debug!(value, edge, "sample fell outside the seeded bins");
                frequencies.insert(OrderedFloat(edge), 1);
            }
        }
    }

    let total = samples.len();
    let bins = frequencies
        .into_iter()
        .map(|(edge, count)| {
            let left = edge.into_inner();
            // right edge is the next bin's key
            HistogramBin {
                right: assigner.edge(assigner.bin_index(left) + 1.0),
                ..HistogramBin::new(left, width, count, total)
            }
        })
        .collect();

    Ok(Histogram::new(bins, total, min, max, Some(width)))
}

impl Recomputable for HistogramComputer {
    type Output = Histogram;

    fn recompute(&self, samples: &[f64]) -> Result<Histogram> {
        self.compute(samples)
    }

    fn fallback(&self, samples: &[f64], error: &Error) -> Option<Histogram> {
        if !error.is_degenerate() {
            return None;
        }
        // a width too fine for spread-out data has no sensible single bin
        let (min, max) = min_max(samples)?;
        (min == max).then(|| Histogram::single_bin(min, samples.len()))
    }

    fn name(&self) -> &str {
        "histogram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_append_scenario() {
        let computer = HistogramComputer::with_bins(2);

        let hist = computer.compute(&[1.0, 2.0, 2.0, 3.0]).unwrap();
        assert_eq!(hist.pairs(), vec![(1.0, 1.0), (2.0, 2.0), (3.0, 1.0)]);
        assert_eq!(hist.bin_width(), Some(1.0));

        let hist = computer.compute(&[1.0, 2.0, 2.0, 3.0, 10.0]).unwrap();
        assert_eq!(hist.pairs(), vec![(0.0, 4.0), (4.5, 0.0), (9.0, 1.0)]);
        assert_eq!(hist.frequency_sum(), 5);
        assert!(hist.find_bin(10.0).is_some());
    }

    #[test]
    fn test_empty_samples() {
        let hist = HistogramComputer::default().compute(&[]).unwrap();
        assert!(hist.is_empty());
        assert_eq!(hist.total_count(), 0);
    }

    #[test]
    fn test_explicit_width_precedence() {
        let data: Vec<f64> = (1..=10).map(f64::from).collect();
        let options = HistogramOptions::default()
            .with_bins(3)
            .with_bin_width(2.5);
        let hist = HistogramComputer::new(options).compute(&data).unwrap();

        assert_eq!(hist.bin_width(), Some(2.5));
        assert_eq!(hist.pairs(), vec![
            (0.0, 2.0),
            (2.5, 2.0),
            (5.0, 3.0),
            (7.5, 2.0),
            (10.0, 1.0),
        ]);
        for bin in hist.bins() {
            assert_relative_eq!(bin.width(), 2.5);
        }
    }

    #[test]
    fn test_invalid_explicit_width_is_ignored() {
        let options = HistogramOptions::default().with_bins(2).with_bin_width(-1.0);
        let hist = HistogramComputer::new(options).compute(&[0.0, 4.0]).unwrap();
        assert_eq!(hist.bin_width(), Some(2.0));
    }

    #[test]
    fn test_zero_frequency_gaps_are_kept() {
        let hist = HistogramComputer::with_bin_width(1.0)
            .compute(&[0.5, 4.5])
            .unwrap();
        assert_eq!(hist.counts(), vec![1, 0, 0, 0, 1]);
        assert_eq!(hist.edges(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_decimal_edges_coincide() {
        let data: Vec<f64> = (1..=10).map(|i| i as f64 * 0.1).collect();
        let hist = HistogramComputer::with_bin_width(0.1).compute(&data).unwrap();

        assert_eq!(hist.len(), 10);
        assert!(hist.counts().iter().all(|&c| c == 1));
        let lefts: Vec<f64> = hist.bins().iter().map(|b| b.left).collect();
        assert_eq!(lefts, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]);
    }

    #[test]
    fn test_degenerate_width() {
        let computer = HistogramComputer::default();
        let err = computer.compute(&[5.0, 5.0, 5.0]).unwrap_err();
        assert!(matches!(err, Error::DegenerateBinWidth { width } if width == 0.0));

        let fallback = computer.fallback(&[5.0, 5.0, 5.0], &err).unwrap();
        assert_eq!(fallback.pairs(), vec![(5.0, 3.0)]);
        assert_eq!(fallback.bin_width(), None);
    }

    #[test]
    fn test_single_value_with_explicit_width() {
        let hist = HistogramComputer::with_bin_width(2.0).compute(&[5.0, 5.0]).unwrap();
        assert_eq!(hist.pairs(), vec![(4.0, 2.0)]);
    }

    #[test]
    fn test_fallback_only_for_degenerate() {
        let computer = HistogramComputer::default();
        let err = Error::NonFiniteSample { index: 0, value: f64::NAN };
        assert!(computer.fallback(&[1.0], &err).is_none());
    }

    #[test]
    fn test_non_finite_samples_rejected() {
        let err = HistogramComputer::default()
            .compute(&[1.0, f64::NAN, 3.0])
            .unwrap_err();
        assert!(matches!(err, Error::NonFiniteSample { index: 1, .. }));
    }

    #[test]
    fn test_too_many_bins() {
        let options = HistogramOptions::default()
            .with_bin_width(0.001)
            .with_max_bins(100);
        let err = HistogramComputer::new(options)
            .compute(&[0.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, Error::TooManyBins { requested: 1001, limit: 100 }));
    }

    #[test]
    fn test_width_too_fine_for_magnitude() {
        let err = HistogramComputer::with_bin_width(1e-3)
            .compute(&[1e12, 1e12 + 1.0])
            .unwrap_err();
        assert!(err.is_degenerate());
        assert!(HistogramComputer::default()
            .fallback(&[1e12, 1e12 + 1.0], &err)
            .is_none());
    }

    #[test]
    fn test_values_far_from_zero_stay_in_their_bin() {
        let base = 1e12;
        let samples = [base + 0.2, base + 0.96, base + 1.5];
        let hist = HistogramComputer::with_bin_width(1.0).compute(&samples).unwrap();

        assert_eq!(hist.pairs(), vec![(base, 2.0), (base + 1.0, 1.0)]);
        for &value in &samples {
            let bin = &hist.bins()[hist.find_bin(value).unwrap()];
            assert!(bin.contains(value));
            assert_eq!(bin.left, BinAssigner::new(1.0).unwrap().assign(value));
        }
    }

    #[test]
    fn test_bins_share_edges() {
        let hist = HistogramComputer::with_bin_width(0.1)
            .compute(&[0.05, 0.3, 0.71, 1.0])
            .unwrap();
        for pair in hist.bins().windows(2) {
            assert_eq!(pair[0].right, pair[1].left);
        }
        assert_eq!(hist.find_bin(0.3), Some(3));
        assert_eq!(hist.find_bin(1.0), Some(hist.len() - 1));
    }

    #[test]
    fn test_compute_histogram_contract() {
        let hist = compute_histogram(&[0.0, 1.0, 2.0, 3.0], 3, None).unwrap();
        assert_eq!(hist.bin_width(), Some(1.0));
        assert_eq!(hist.counts(), vec![1, 1, 1, 1]);

        let hist = compute_histogram(&[0.0, 1.0, 2.0, 3.0], 3, Some(2.0)).unwrap();
        assert_eq!(hist.counts(), vec![2, 2]);
    }

    #[test]
    fn test_options_deserialize() {
        let options: HistogramOptions =
            serde_json::from_str(r#"{"binsNumber": "rice", "binWidth": 0.5}"#).unwrap();
        assert_eq!(options.bins, BinCountStrategy::Rice);
        assert_eq!(options.bin_width, Some(0.5));
        assert_eq!(options.max_bins, DEFAULT_MAX_BINS);

        let options: HistogramOptions = serde_json::from_str(r#"{"bins": 8}"#).unwrap();
        assert_eq!(options.bins, BinCountStrategy::Explicit(8.0));
        assert_eq!(options.bin_width, None);
    }
}
