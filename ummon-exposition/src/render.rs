use crate::collection::{MetricCollection, MetricKind};
use prometheus::proto::{self, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};
use ummon_core::ExporterError;

/// Content type served alongside the rendered document.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Render collections to the Prometheus text exposition format.
///
/// Order of collections, samples and labels is preserved exactly as given.
/// A collection without samples has no lines to contribute and is skipped;
/// the text encoder rejects empty families.
pub fn render(collections: &[MetricCollection]) -> Result<String, ExporterError> {
    let families: Vec<MetricFamily> = collections
        .iter()
        .filter(|c| !c.is_empty())
        .map(to_family)
        .collect();

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| ExporterError::Render(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| ExporterError::Render(e.to_string()))
}

fn to_family(collection: &MetricCollection) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(collection.name().to_string());
    family.set_help(collection.help().to_string());
    family.set_field_type(match collection.kind() {
        MetricKind::Gauge => MetricType::GAUGE,
        MetricKind::Counter => MetricType::COUNTER,
    });

    for sample in collection.samples() {
        let mut metric = Metric::default();
        for (name, value) in sample.labels() {
            let mut pair = LabelPair::default();
            pair.set_name(name.clone());
            pair.set_value(value.clone());
            metric.mut_label().push(pair);
        }
        match collection.kind() {
            MetricKind::Gauge => {
                let mut gauge = proto::Gauge::default();
                gauge.set_value(sample.value());
                metric.set_gauge(gauge);
            }
            MetricKind::Counter => {
                let mut counter = proto::Counter::default();
                counter.set_value(sample.value());
                metric.set_counter(counter);
            }
        }
        family.mut_metric().push(metric);
    }
    family
}
