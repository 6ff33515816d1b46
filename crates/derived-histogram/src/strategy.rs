//! Bin-count selection policies
//!
//! A [`BinCountStrategy`] turns a sample set into a target number of bins.
//! Whatever the policy returns goes through `ceil` and is floored at one, so
//! the result is always a usable positive count.

use derived_core::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User-supplied bin-count function
pub type CustomBinCount = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Policy choosing the number of bins
#[derive(Clone, Default, Deserialize)]
#[serde(from = "BinsSetting")]
pub enum BinCountStrategy {
    /// `round(sqrt(n))`
    #[default]
    SquareRoot,
    /// `ceil(log2(n))`
    Sturges,
    /// `ceil(2 * n^(1/3))`
    Rice,
    /// A fixed count
    Explicit(f64),
    /// A function of the samples
    Custom(CustomBinCount),
}

impl BinCountStrategy {
    /// Build a strategy from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Parse a heuristic name, falling back to [`BinCountStrategy::SquareRoot`]
    ///
    /// An unknown name is a configuration mistake, not a data problem, so it
    /// is logged and the default heuristic is used instead of failing.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: Error| {
            tracing::warn!("{err}; falling back to square-root");
            Self::SquareRoot
        })
    }

    /// Count before rounding
    pub fn raw_count(&self, samples: &[f64]) -> f64 {
        let n = samples.len() as f64;
        match self {
            Self::SquareRoot => n.sqrt().round(),
            Self::Sturges => n.log2().ceil(),
            Self::Rice => (2.0 * n.powf(1.0 / 3.0)).ceil(),
            Self::Explicit(count) => *count,
            Self::Custom(f) => f(samples),
        }
    }

    /// Number of bins to use for `samples`, always at least one
    pub fn count(&self, samples: &[f64]) -> usize {
        let count = self.raw_count(samples).ceil();
        if count.is_nan() || count < 1.0 {
            1
        } else {
            // saturating cast; absurd counts are caught by the bin limit
            count as usize
        }
    }

    /// Name of the heuristic
    pub fn name(&self) -> &'static str {
        match self {
            Self::SquareRoot => "square-root",
            Self::Sturges => "sturges",
            Self::Rice => "rice",
            Self::Explicit(_) => "explicit",
            Self::Custom(_) => "custom",
        }
    }
}

impl FromStr for BinCountStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "square-root" => Ok(Self::SquareRoot),
            "sturges" => Ok(Self::Sturges),
            "rice" => Ok(Self::Rice),
            other => Err(Error::UnknownBinCountHeuristic(other.to_string())),
        }
    }
}

impl fmt::Debug for BinCountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(count) => f.debug_tuple("Explicit").field(count).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

impl PartialEq for BinCountStrategy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Explicit(a), Self::Explicit(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl From<usize> for BinCountStrategy {
    fn from(count: usize) -> Self {
        Self::Explicit(count as f64)
    }
}

/// Serialized form of a bin-count setting: a heuristic name or a number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BinsSetting {
    Count(f64),
    Name(String),
}

impl From<BinsSetting> for BinCountStrategy {
    fn from(setting: BinsSetting) -> Self {
        match setting {
            BinsSetting::Count(count) => Self::Explicit(count),
            BinsSetting::Name(name) => Self::from_name_or_default(&name),
        }
    }
}
