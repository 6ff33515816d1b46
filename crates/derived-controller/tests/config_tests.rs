//! Configuration to live histogram, with JSON log output

use derived_controller::{HistogramSeries, HistogramSeriesOptions};
use derived_core::{LoggingHandler, RedrawTracker, SampleSeries, SeriesRegistry};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::new("derived_controller=debug"))
        .with_test_writer()
        .try_init();
}

#[test]
fn test_configured_histogram_follows_base() -> anyhow::Result<()> {
    init_tracing();

    let config = r#"[
        { "id": "by-count", "baseSeries": "latency", "binsNumber": "rice" },
        { "id": "by-width", "baseSeries": 0, "binWidth": 10 }
    ]"#;
    let configs: Vec<HistogramSeriesOptions> = serde_json::from_str(config)?;

    let base = Arc::new(SampleSeries::with_id("latency", Vec::new()));
    let mut registry = SeriesRegistry::new();
    registry.add(base.clone());

    let series: Vec<HistogramSeries> = configs
        .into_iter()
        .map(HistogramSeries::from_options)
        .collect();
    for s in &series {
        s.bind(&registry)?;
        s.events().register(LoggingHandler::new(s.options().id.clone().unwrap_or_default()))?;
        assert!(s.points().is_empty());
    }

    let tracker = RedrawTracker::new();
    series[1].events().register(tracker.clone())?;

    for value in [3.0, 14.0, 15.0, 27.0, 41.0, 44.0, 45.0, 58.0] {
        base.add_point(value, false)?;
    }
    assert!(tracker.flush()?);

    assert_eq!(
        series[1].points(),
        vec![(0.0, 1.0), (10.0, 2.0), (20.0, 1.0), (30.0, 0.0), (40.0, 3.0), (50.0, 1.0)]
    );

    // rice asks for about 4 bins over [3, 58]
    let by_count = series[0].histogram();
    assert_eq!(by_count.frequency_sum(), 8);
    assert!(by_count.len() >= 4);
    assert!(series[0].last_error().is_none());

    tracing::info!(bins = by_count.len(), "end to end run complete");
    Ok(())
}
