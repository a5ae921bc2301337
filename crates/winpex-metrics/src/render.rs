use std::collections::BTreeMap;

use crate::types::{Metric, MetricDescriptor};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders samples in the Prometheus text exposition format. Families are
/// sorted by name; samples keep the order they were produced in.
pub fn render_prometheus(metrics: &[Metric]) -> String {
    let mut families: BTreeMap<&str, (&MetricDescriptor, Vec<&Metric>)> = BTreeMap::new();
    for metric in metrics {
        families
            .entry(metric.desc.name.as_str())
            .or_insert_with(|| (metric.desc.as_ref(), Vec::new()))
            .1
            .push(metric);
    }

    let mut output = String::new();
    for (name, (descriptor, samples)) in families {
        output.push_str("# HELP ");
        output.push_str(name);
        output.push(' ');
        output.push_str(&escape_help(&descriptor.help));
        output.push('\n');

        output.push_str("# TYPE ");
        output.push_str(name);
        output.push(' ');
        output.push_str(descriptor.metric_type.as_prometheus_type());
        output.push('\n');

        for sample in samples {
            output.push_str(&render_sample_line(name, &sample.labels, sample.value));
        }
    }

    output
}

fn render_sample_line(name: &str, labels: &[(String, String)], value: f64) -> String {
    let mut rendered = String::new();
    rendered.push_str(name);

    if !labels.is_empty() {
        rendered.push('{');
        for (index, (key, value)) in labels.iter().enumerate() {
            if index > 0 {
                rendered.push(',');
            }
            rendered.push_str(key);
            rendered.push_str("=\"");
            rendered.push_str(&escape_label_value(value));
            rendered.push('"');
        }
        rendered.push('}');
    }

    rendered.push(' ');
    rendered.push_str(&format_metric_value(value));
    rendered.push('\n');
    rendered
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}
