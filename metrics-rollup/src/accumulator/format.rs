use std::fmt::Write as _;

use super::WindowSnapshot;

const DEFAULT_TEMPLATE: &str = "{name}:\n{values}\n";
const DEFAULT_NO_DATA_TEMPLATE: &str = "{name}: no data in the last {size} intervals\n";
const DEFAULT_COLUMNS: usize = 4;
const DEFAULT_COLUMN_WIDTH: usize = 12;

/// Text layout for rendering an accumulator window.
///
/// Templates may contain the following placeholders:
///
/// - `{name}`: the accumulator name
/// - `{size}`: the accumulator window size
/// - `{values}`: the window values, laid out in fixed-width columns separated by a single space
/// - `{max}`: the largest value in the window
/// - `{max_window}`: the largest raw interval sum in the window
///
/// Anything else between braces is written out as-is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WindowFormat {
    template: String,
    no_data_template: String,
    columns: usize,
    column_width: usize,
}

impl Default for WindowFormat {
    fn default() -> Self {
        WindowFormat {
            template: DEFAULT_TEMPLATE.to_string(),
            no_data_template: DEFAULT_NO_DATA_TEMPLATE.to_string(),
            columns: DEFAULT_COLUMNS,
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

impl WindowFormat {
    /// Creates a new `WindowFormat` with the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the template used when the window has data.
    ///
    /// Defaults to `"{name}:\n{values}\n"`.
    #[must_use]
    pub fn with_template<T: Into<String>>(mut self, template: T) -> Self {
        self.template = template.into();
        self
    }

    /// Sets the template used when no interval in the window received an update.
    ///
    /// Defaults to `"{name}: no data in the last {size} intervals\n"`.
    #[must_use]
    pub fn with_no_data_template<T: Into<String>>(mut self, template: T) -> Self {
        self.no_data_template = template.into();
        self
    }

    /// Sets how many values are written per line. Values of zero are treated as one.
    ///
    /// Defaults to 4.
    #[must_use]
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Sets the width each value is right-aligned to.
    ///
    /// Values wider than this are written in full, and columns are always separated by a space.
    ///
    /// Defaults to 12.
    #[must_use]
    pub fn with_column_width(mut self, width: usize) -> Self {
        self.column_width = width;
        self
    }

    pub(crate) fn render(&self, name: &str, size: usize, snapshot: &WindowSnapshot) -> String {
        let template = if snapshot.nonzero { &self.template } else { &self.no_data_template };

        let mut buffer = String::with_capacity(template.len() + name.len());
        let mut rest = template.as_str();
        while let Some(open) = rest.find('{') {
            buffer.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                rest = tail;
                break;
            };

            match &tail[1..close] {
                "name" => buffer.push_str(name),
                "size" => {
                    let _ = write!(buffer, "{}", size);
                }
                "values" => self.write_values(&mut buffer, &snapshot.results),
                "max" => {
                    let _ = write!(buffer, "{}", snapshot.max);
                }
                "max_window" => {
                    let _ = write!(buffer, "{}", snapshot.max_window);
                }
                _ => buffer.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }
        buffer.push_str(rest);

        buffer
    }

    fn write_values(&self, buffer: &mut String, values: &[u64]) {
        for (i, line) in values.chunks(self.columns).enumerate() {
            if i > 0 {
                buffer.push('\n');
            }
            for (column, value) in line.iter().enumerate() {
                if column > 0 {
                    buffer.push(' ');
                }
                let _ = write!(buffer, "{:>width$}", value, width = self.column_width);
            }
        }
    }
}
