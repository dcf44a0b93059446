//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), including response
//! payloads and progress indicators.

use crate::cli::OutputFormat;
use crate::error::Result;
use burrow_core::Payload;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::time::Duration;

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a decoded response body
    fn format_value(&self, value: &Value) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_value_human(value)),
            _ => self.format(value),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.emit(&formatted)
    }

    /// Write a response payload
    ///
    /// Decoded bodies follow the output format; raw bodies are written as
    /// they arrived.
    pub fn payload(&mut self, payload: &Payload) -> Result<()> {
        match payload {
            Payload::Decoded(value) => {
                let formatted = self.format.format_value(value)?;
                self.emit(&formatted)
            }
            Payload::Raw(bytes) if bytes.is_empty() => self.info("No content"),
            Payload::Raw(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                self.emit(&text)
            }
        }
    }

    /// Write the outcome of a put or delete
    pub fn applied(&mut self, applied: bool) -> Result<()> {
        match self.format {
            OutputFormat::Human if applied => self.success("true"),
            OutputFormat::Human => self.warning("false"),
            _ => self.data(&applied),
        }
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
        let rendered = render_table(headers, rows);
        let mut lines = rendered.lines();

        if let Some(header_row) = lines.next() {
            if self.use_color {
                self.writeln(&header_row.bold().to_string())?;
            } else {
                self.writeln(header_row)?;
            }
        }
        for line in lines {
            self.writeln(line)?;
        }

        Ok(())
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    fn emit(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Human rendering of a decoded body
///
/// Lists of flat objects become a table, bare strings are printed without
/// quotes, everything else is pretty JSON.
fn format_value_human(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => match table_rows(items) {
            Some((headers, rows)) => render_table(&headers, &rows),
            None => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        },
        _ => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    }
}

/// Columns and cells for a non-empty list of objects with scalar fields
fn table_rows(items: &[Value]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let objects: Vec<&Map<String, Value>> = items.iter().map(Value::as_object).collect::<Option<_>>()?;
    if objects.is_empty() {
        return None;
    }

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for (key, value) in object.iter() {
            if value.is_object() || value.is_array() {
                return None;
            }
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            headers
                .iter()
                .map(|key| object.get(key).map(format_value_compact).unwrap_or_default())
                .collect()
        })
        .collect();

    Some((headers, rows))
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let render_row = |cells: &[String]| {
        // Missing trailing cells leave no dangling separators
        let filled = cells.iter().rposition(|cell| !cell.is_empty()).map_or(0, |i| i + 1);
        cells[..filled]
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render_row(headers)];
    lines.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    lines.extend(rows.iter().map(|row| render_row(row.as_slice())));
    lines.join("\n")
}

/// Format a scalar JSON value for a table cell
fn format_value_compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let output = OutputWriter::with_writer(format, false, false, Box::new(buffer.clone()));
        (output, buffer)
    }

    #[test]
    fn test_decoded_payload_json() {
        let (mut output, buffer) = writer(OutputFormat::Json);
        output
            .payload(&Payload::Decoded(json!({"id": 1, "name": "ada"})))
            .unwrap();
        assert_eq!(buffer.contents(), "{\"id\":1,\"name\":\"ada\"}\n");
    }

    #[test]
    fn test_decoded_payload_yaml() {
        let (mut output, buffer) = writer(OutputFormat::Yaml);
        output.payload(&Payload::Decoded(json!({"id": 1}))).unwrap();
        assert_eq!(buffer.contents(), "id: 1\n");
    }

    #[test]
    fn test_raw_payload_is_written_verbatim() {
        let (mut output, buffer) = writer(OutputFormat::Json);
        output.payload(&Payload::Raw(b"plain text".to_vec())).unwrap();
        assert_eq!(buffer.contents(), "plain text\n");
    }

    #[test]
    fn test_empty_raw_payload() {
        let (mut output, buffer) = writer(OutputFormat::Human);
        output.payload(&Payload::Raw(Vec::new())).unwrap();
        assert_eq!(buffer.contents(), "INFO: No content\n");

        let (mut output, buffer) = writer(OutputFormat::Json);
        output.payload(&Payload::Raw(Vec::new())).unwrap();
        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn test_human_table_for_flat_objects() {
        let (mut output, buffer) = writer(OutputFormat::Human);
        output
            .payload(&Payload::Decoded(json!([
                {"id": 1, "name": "ada"},
                {"id": 22, "name": "grace", "admin": true}
            ])))
            .unwrap();

        let expected = "\
id │ name  │ admin
───┼───────┼──────
1  │ ada
22 │ grace │ true
";
        assert_eq!(buffer.contents(), expected);
    }

    #[test]
    fn test_table_keeps_inner_gaps() {
        let headers = vec!["a".to_string(), "c".to_string(), "b".to_string()];
        let rows = vec![
            vec!["1".to_string(), "3".to_string(), String::new()],
            vec![String::new(), String::new(), "2".to_string()],
            vec![String::new(), String::new(), String::new()],
        ];

        let expected = "a │ c │ b\n──┼───┼──\n1 │ 3\n  │   │ 2\n";
        assert_eq!(render_table(&headers, &rows), expected);
    }

    #[test]
    fn test_human_nested_values_fall_back_to_json() {
        let (mut output, buffer) = writer(OutputFormat::Human);
        output
            .payload(&Payload::Decoded(json!([{"tags": ["a"]}])))
            .unwrap();
        assert!(buffer.contents().contains("\"tags\""));
    }

    #[test]
    fn test_human_string_is_unquoted() {
        let (mut output, buffer) = writer(OutputFormat::Human);
        output.payload(&Payload::Decoded(json!("hello"))).unwrap();
        assert_eq!(buffer.contents(), "hello\n");
    }

    #[test]
    fn test_applied() {
        let (mut output, buffer) = writer(OutputFormat::Human);
        output.applied(true).unwrap();
        output.applied(false).unwrap();
        assert_eq!(buffer.contents(), "true\nWARNING: false\n");

        let (mut output, buffer) = writer(OutputFormat::Json);
        output.applied(false).unwrap();
        assert_eq!(buffer.contents(), "false\n");
    }

    #[test]
    fn test_quiet_suppresses_info() {
        let buffer = SharedBuffer::default();
        let mut output =
            OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(buffer.clone()));
        output.info("hidden").unwrap();
        output.success("hidden").unwrap();
        output.data(&json!({"shown": true})).unwrap();
        assert_eq!(buffer.contents(), "{\n  \"shown\": true\n}\n");
    }

    #[test]
    fn test_no_spinner_with_custom_writer() {
        let (output, _buffer) = writer(OutputFormat::Human);
        assert!(output.spinner("working").is_none());
    }
}
