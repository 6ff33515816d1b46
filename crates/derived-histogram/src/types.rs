//! Core types for histogram representation

use derived_core::{correct_float, DataPoint, DerivedData};
use std::fmt;

/// A single bin in a histogram
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Left edge of the bin (inclusive)
    pub left: f64,
    /// Right edge of the bin (exclusive)
    pub right: f64,
    /// Number of values in this bin
    pub count: usize,
    /// Density (count / (total_count * bin_width))
    pub density: f64,
}

impl HistogramBin {
    /// Create a new histogram bin starting at `left`
    pub fn new(left: f64, width: f64, count: usize, total_count: usize) -> Self {
        let density = if width > 0.0 && total_count > 0 {
            count as f64 / (total_count as f64 * width)
        } else {
            0.0
        };

        Self {
            left,
            right: correct_float(left + width),
            count,
            density,
        }
    }

    /// Get the center point of the bin
    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    /// Get the width of the bin
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Check if a value falls within this bin
    ///
    /// A zero-width bin contains exactly its left edge.
    pub fn contains(&self, value: f64) -> bool {
        if self.left == self.right {
            return value == self.left;
        }
        value >= self.left && value < self.right
    }
}

impl DataPoint for HistogramBin {
    fn x(&self) -> f64 {
        self.left
    }

    fn y(&self) -> f64 {
        self.count as f64
    }
}

impl fmt::Display for HistogramBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}): count={}", self.left, self.right, self.count)
    }
}

/// A histogram: bins sorted ascending by left edge
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Histogram {
    bins: Vec<HistogramBin>,
    total_count: usize,
    min: f64,
    max: f64,
    bin_width: Option<f64>,
}

impl Histogram {
    /// Create a new histogram
    pub fn new(
        bins: Vec<HistogramBin>,
        total_count: usize,
        min: f64,
        max: f64,
        bin_width: Option<f64>,
    ) -> Self {
        Self {
            bins,
            total_count,
            min,
            max,
            bin_width,
        }
    }

    /// A single zero-width bin at `value` holding every sample
    ///
    /// Used when the samples have no spread and no width was configured.
    pub fn single_bin(value: f64, count: usize) -> Self {
        let bin = HistogramBin::new(value, 0.0, count, count);
        Self::new(vec![bin], count, value, value, None)
    }

    /// Get the bins
    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    /// Get the number of bins
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Check if the histogram is empty
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Get the total count of data points
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Get the minimum value
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Get the maximum value
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Get the range of the data
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Effective bin width, `None` for empty or single-value histograms
    pub fn bin_width(&self) -> Option<f64> {
        self.bin_width
    }

    /// Find which bin contains a given value
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        self.bins.iter().position(|bin| bin.contains(value))
    }

    /// Get counts as a vector
    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|bin| bin.count).collect()
    }

    /// Sum of all bin counts
    pub fn frequency_sum(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Get bin edges (including rightmost edge)
    pub fn edges(&self) -> Vec<f64> {
        let Some(last) = self.bins.last() else {
            return vec![];
        };

        let mut edges: Vec<f64> = self.bins.iter().map(|bin| bin.left).collect();
        edges.push(last.right);
        edges
    }

    /// `(left edge, frequency)` pairs
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.bins.iter().map(DataPoint::xy).collect()
    }
}

impl DerivedData for Histogram {
    type Point = HistogramBin;

    fn points(&self) -> &[HistogramBin] {
        &self.bins
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Histogram({} bins, n={}, range=[{:.3}, {:.3}])",
            self.len(),
            self.total_count,
            self.min,
            self.max
        )
    }
}
