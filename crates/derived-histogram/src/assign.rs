//! Mapping of values to left-closed bins

use derived_core::{correct_float, Error, Result};

/// Left edge of the bin containing `value`: `floor(value / width) * width`
///
/// This is the raw formula without drift correction. Use [`BinAssigner`]
/// when the edge is used as a lookup key.
pub fn fit_to_bin(value: f64, width: f64) -> f64 {
    (value / width).floor() * width
}

/// Assigns values to bins `[k * width, (k + 1) * width)`
///
/// Seeding and assignment both go through [`BinAssigner::bin_index`] and
/// [`BinAssigner::edge`], so a sample always maps onto exactly the key its
/// bin was seeded with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinAssigner {
    width: f64,
}

impl BinAssigner {
    /// Create an assigner for a positive, finite bin width
    pub fn new(width: f64) -> Result<Self> {
        if width > 0.0 && width.is_finite() {
            Ok(Self { width })
        } else {
            Err(Error::DegenerateBinWidth { width })
        }
    }

    /// Bin width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Integral index `k` of the bin containing `value`
    ///
    /// Always satisfies `edge(k) <= value < edge(k + 1)`. The raw quotient is
    /// floored and then checked against the normalized edges, so values
    /// sitting exactly on an edge (`0.3` for width `0.1`) open their own bin.
    pub fn bin_index(&self, value: f64) -> f64 {
        let index = (value / self.width).floor();
        if self.edge(index + 1.0) <= value {
            index + 1.0
        } else if self.edge(index) > value {
            index - 1.0
        } else {
            index
        }
    }

    /// Normalized left edge of bin `index`
    pub fn edge(&self, index: f64) -> f64 {
        correct_float(index * self.width)
    }

    /// Normalized left edge of the bin containing `value`
    pub fn assign(&self, value: f64) -> f64 {
        self.edge(self.bin_index(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_bin() {
        assert_eq!(fit_to_bin(3.7, 1.0), 3.0);
        assert_eq!(fit_to_bin(-0.5, 1.0), -1.0);
        assert_eq!(fit_to_bin(10.0, 4.5), 9.0);
        assert_eq!(fit_to_bin(1.0, 4.5), 0.0);
    }

    #[test]
    fn test_assign_left_closed() {
        let assigner = BinAssigner::new(2.0).unwrap();
        assert_eq!(assigner.assign(2.0), 2.0);
        assert_eq!(assigner.assign(3.999), 2.0);
        assert_eq!(assigner.assign(4.0), 4.0);
        assert_eq!(assigner.assign(-0.1), -2.0);
        assert_eq!(assigner.assign(0.0), 0.0);
    }

    #[test]
    fn test_assign_tolerates_drift() {
        let assigner = BinAssigner::new(0.1).unwrap();
        // 0.3 / 0.1 is 2.9999999999999996 in binary floating point
        assert_eq!(assigner.assign(0.3), 0.3);
        assert_eq!(assigner.assign(0.1 * 7.0), 0.7);
        assert_eq!(assigner.assign(0.35), 0.3);
        assert_eq!(assigner.edge(3.0), assigner.assign(0.3));
    }

    #[test]
    fn test_assign_far_from_zero() {
        let assigner = BinAssigner::new(1.0).unwrap();
        let base = 1e12;
        assert_eq!(assigner.assign(base + 0.2), base);
        assert_eq!(assigner.assign(base + 0.96), base);
        assert_eq!(assigner.assign(base + 1.0), base + 1.0);
        assert_eq!(assigner.assign(base + 1.5), base + 1.0);
    }

    #[test]
    fn test_index_brackets_value() {
        for width in [0.1, 0.25, 1.0 / 3.0, 4.5, 7.0] {
            let assigner = BinAssigner::new(width).unwrap();
            for i in -500..500 {
                let value = f64::from(i) * 0.07;
                let k = assigner.bin_index(value);
                assert!(assigner.edge(k) <= value, "{value} below its bin for {width}");
                assert!(value < assigner.edge(k + 1.0), "{value} above its bin for {width}");
            }
        }
    }

    #[test]
    fn test_rejects_degenerate_width() {
        for width in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                BinAssigner::new(width),
                Err(Error::DegenerateBinWidth { .. })
            ));
        }
    }
}
