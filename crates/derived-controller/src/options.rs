//! Configuration for derived series

use derived_core::SeriesRef;
use derived_histogram::HistogramOptions;
use serde::Deserialize;

/// Options shared by every derived series
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DerivedSeriesOptions {
    /// Base series to derive from, by identifier or position
    #[serde(alias = "baseSeries")]
    pub base: Option<SeriesRef>,
    /// Identifier of the derived series itself
    pub id: Option<String>,
}

impl DerivedSeriesOptions {
    /// Link to a base series
    pub fn with_base(mut self, base: impl Into<SeriesRef>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Give the derived series an identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Complete configuration of a histogram series
///
/// ```rust
/// use derived_controller::HistogramSeriesOptions;
/// use derived_core::SeriesRef;
///
/// let options: HistogramSeriesOptions = serde_json::from_str(
///     r#"{ "baseSeries": "main", "binsNumber": "sturges" }"#,
/// ).unwrap();
/// assert_eq!(options.series.base, Some(SeriesRef::Id("main".into())));
/// assert_eq!(options.histogram.bins.name(), "sturges");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistogramSeriesOptions {
    #[serde(flatten)]
    pub series: DerivedSeriesOptions,
    #[serde(flatten)]
    pub histogram: HistogramOptions,
}
