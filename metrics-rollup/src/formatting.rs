//! Helpers for rendering metrics in the Prometheus [exposition format].
//!
//! [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details

use std::fmt::{Display, Write as _};

/// Writes a help (description) line.
///
/// The description is escaped as required by the exposition format.
pub fn write_help_line(buffer: &mut String, name: &str, desc: &str) {
    buffer.push_str("# HELP ");
    push_metric_name(buffer, name, None);
    buffer.push(' ');
    push_description(buffer, desc);
    buffer.push('\n');
}

/// Writes a metric type line, such as `counter` or `histogram`.
pub fn write_type_line(buffer: &mut String, name: &str, metric_type: &str) {
    buffer.push_str("# TYPE ");
    push_metric_name(buffer, name, None);
    buffer.push(' ');
    buffer.push_str(metric_type);
    buffer.push('\n');
}

/// Writes a single sample line.
///
/// When `suffix` is specified, it is appended to `name` with an underscore, which is how the
/// per-bucket, sum and count series of a histogram are written. `label` would typically carry a
/// type-specific label, such as `le` for histogram buckets.
pub fn write_metric_line<L, V>(
    buffer: &mut String,
    name: &str,
    suffix: Option<&str>,
    label: Option<(&str, L)>,
    value: V,
) where
    L: Display,
    V: Display,
{
    push_metric_name(buffer, name, suffix);

    if let Some((key, label_value)) = label {
        buffer.push('{');
        buffer.push_str(key);
        buffer.push_str("=\"");
        let _ = write!(buffer, "{}", label_value);
        buffer.push_str("\"}");
    }

    let _ = writeln!(buffer, " {}", value);
}

fn push_metric_name(buffer: &mut String, name: &str, suffix: Option<&str>) {
    buffer.extend(name.chars().enumerate().map(|(i, c)| {
        if i == 0 && valid_metric_name_start_character(c)
            || i != 0 && valid_metric_name_character(c)
        {
            c
        } else {
            '_'
        }
    }));
    if name.is_empty() {
        buffer.push('_');
    }

    if let Some(suffix) = suffix {
        buffer.push('_');
        buffer.push_str(suffix);
    }
}

fn push_description(buffer: &mut String, desc: &str) {
    for c in desc.chars() {
        match c {
            '\\' => buffer.push_str("\\\\"),
            '\n' => buffer.push_str("\\n"),
            c => buffer.push(c),
        }
    }
}

/// Sanitizes a metric name to be valid under the Prometheus [data model].
///
/// Names that are already valid are returned unchanged.
///
/// [data model]: https://prometheus.io/docs/concepts/data_model/#metric-names-and-labels
pub fn sanitize_metric_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    push_metric_name(&mut sanitized, name, None);
    sanitized
}

/// Escapes a metric description for use in a `# HELP` line.
pub fn sanitize_description(desc: &str) -> String {
    let mut sanitized = String::with_capacity(desc.len());
    push_description(&mut sanitized, desc);
    sanitized
}

#[inline]
fn valid_metric_name_start_character(c: char) -> bool {
    // [a-zA-Z_:]
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

#[inline]
fn valid_metric_name_character(c: char) -> bool {
    // [a-zA-Z0-9_:]
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}
