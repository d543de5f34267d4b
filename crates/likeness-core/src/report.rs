//! Discrepancy aggregation and report rendering
//!
//! The engine never short-circuits on the first mismatch: every
//! discrepancy found below the top-level call is collected in discovery
//! order (depth-first) and rendered at the end as one deterministic
//! report. Rendering supports plain text (with optional colors) and JSON
//! for programmatic consumption.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::console::{Color, Console};
use crate::path::NodePath;

/// A single difference between subject and expectation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Fully-qualified path of the differing node
    pub path: String,
    /// Description of the expected value
    pub expected: String,
    /// Description of the actual value
    pub actual: String,
    /// Optional detail, e.g. where two strings first diverge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Discrepancy {
    pub fn new(path: &NodePath, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Summary of the active configuration, rendered in a fixed declarative
/// order at the end of a report when requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSummary {
    pub selection: String,
    pub matching: String,
    pub ordering: String,
    pub enums: String,
    pub records: String,
    pub typing: String,
    pub conversion: String,
}

impl ConfigurationSummary {
    fn render_into(&self, out: &mut String) {
        out.push_str("Configuration:\n");
        // The order here is contract: selection, matching, ordering,
        // enums, records, typing, conversion.
        let entries = [
            ("selection", &self.selection),
            ("matching", &self.matching),
            ("ordering", &self.ordering),
            ("enums", &self.enums),
            ("records", &self.records),
            ("typing", &self.typing),
            ("conversion", &self.conversion),
        ];
        for (label, value) in entries {
            out.push_str(&format!("- {label}: {value}\n"));
        }
    }
}

/// The aggregated outcome of a failed comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    discrepancies: Vec<Discrepancy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration: Option<ConfigurationSummary>,
}

impl Report {
    pub fn new(discrepancies: Vec<Discrepancy>) -> Self {
        Self {
            discrepancies,
            reason: None,
            configuration: None,
        }
    }

    /// Attach the caller-supplied reason, rendered into every line
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if !reason.is_empty() {
            self.reason = Some(reason);
        }
        self
    }

    /// Attach the configuration summary appended after the discrepancies
    pub fn with_configuration(mut self, configuration: ConfigurationSummary) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn configuration(&self) -> Option<&ConfigurationSummary> {
        self.configuration.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Deterministic plain-text rendering in discovery order
    pub fn render(&self) -> String {
        let mut out = String::new();
        for discrepancy in &self.discrepancies {
            out.push_str(&render_line(discrepancy, self.reason.as_deref()));
            out.push('\n');
        }
        if let Some(configuration) = &self.configuration {
            out.push('\n');
            configuration.render_into(&mut out);
        }
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

fn render_line(discrepancy: &Discrepancy, reason: Option<&str>) -> String {
    let mut line = format!(
        "Expected {} to be {}",
        discrepancy.path, discrepancy.expected
    );
    if let Some(reason) = reason {
        line.push_str(" because ");
        line.push_str(reason);
    }
    line.push_str(&format!(", but found {}", discrepancy.actual));
    if let Some(note) = &discrepancy.note {
        line.push_str(&format!(" ({note})"));
    }
    line.push('.');
    line
}

/// Output format for rendered reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with optional colors
    Text,
    /// JSON for programmatic consumption
    Json,
    /// JSON with pretty-printing
    JsonPretty,
}

/// Report renderer with color and format support
pub struct ReportRenderer {
    console: Console,
    format: OutputFormat,
}

impl ReportRenderer {
    /// Text renderer with automatic terminal detection
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            format: OutputFormat::Text,
        }
    }

    /// Text renderer with colors disabled
    pub fn no_colors() -> Self {
        Self {
            console: Console::no_colors(),
            format: OutputFormat::Text,
        }
    }

    /// Renderer with a specific output format; colors are disabled for
    /// the JSON formats
    pub fn with_format(format: OutputFormat) -> Self {
        let console = match format {
            OutputFormat::Json | OutputFormat::JsonPretty => Console::no_colors(),
            OutputFormat::Text => Console::new(),
        };
        Self { console, format }
    }

    pub fn render(&self, report: &Report) -> String {
        match self.format {
            OutputFormat::Text => self.render_text(report),
            OutputFormat::Json => serde_json::to_string(report)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}")),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}")),
        }
    }

    fn render_text(&self, report: &Report) -> String {
        let mut out = String::new();
        for discrepancy in report.discrepancies() {
            let path = self.console.colorize(&discrepancy.path, Color::Bold);
            let expected = self.console.colorize(&discrepancy.expected, Color::Green);
            let actual = self.console.colorize(&discrepancy.actual, Color::Red);

            let mut line = format!("Expected {path} to be {expected}");
            if let Some(reason) = report.reason() {
                line.push_str(" because ");
                line.push_str(reason);
            }
            line.push_str(&format!(", but found {actual}"));
            if let Some(note) = &discrepancy.note {
                line.push_str(&self.console.colorize(&format!(" ({note})"), Color::Dim));
            }
            line.push('.');
            out.push_str(&line);
            out.push('\n');
        }
        if let Some(configuration) = report.configuration() {
            out.push('\n');
            configuration.render_into(&mut out);
        }
        out
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;

    fn sample() -> Report {
        let path = NodePath::root().child(PathSegment::member("Age"));
        Report::new(vec![Discrepancy::new(&path, "37", "36")])
    }

    #[test]
    fn renders_the_canonical_line() {
        let text = sample().render();
        assert_eq!(text, "Expected Age to be 37, but found 36.\n");
    }

    #[test]
    fn reason_is_woven_into_each_line() {
        let text = sample().with_reason("ages were synced").render();
        assert_eq!(
            text,
            "Expected Age to be 37 because ages were synced, but found 36.\n"
        );
    }

    #[test]
    fn notes_trail_the_line() {
        let path = NodePath::root().child(PathSegment::member("Name"));
        let report = Report::new(vec![
            Discrepancy::new(&path, "\"bar\"", "\"foo\"").with_note("differs near \"foo\" (index 0)"),
        ]);
        assert!(
            report
                .render()
                .contains("but found \"foo\" (differs near \"foo\" (index 0))")
        );
    }

    #[test]
    fn configuration_summary_has_fixed_order() {
        let summary = ConfigurationSummary {
            selection: "all public members".into(),
            matching: "case-sensitive names".into(),
            ordering: "unordered by default".into(),
            enums: "by value".into(),
            records: "by members".into(),
            typing: "declared types".into(),
            conversion: "disabled".into(),
        };
        let text = sample().with_configuration(summary).render();
        let selection_at = text.find("- selection:").unwrap();
        let matching_at = text.find("- matching:").unwrap();
        let conversion_at = text.find("- conversion:").unwrap();
        assert!(selection_at < matching_at);
        assert!(matching_at < conversion_at);
    }

    #[test]
    fn json_round_trips() {
        let report = sample().with_reason("sync");
        let rendered = ReportRenderer::with_format(OutputFormat::Json).render(&report);
        let parsed: Report = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.discrepancies(), report.discrepancies());
        assert_eq!(parsed.reason(), report.reason());
    }

    #[test]
    fn discovery_order_is_preserved() {
        let first = NodePath::root().child(PathSegment::member("A"));
        let second = NodePath::root().child(PathSegment::member("B"));
        let report = Report::new(vec![
            Discrepancy::new(&first, "1", "2"),
            Discrepancy::new(&second, "3", "4"),
        ]);
        let text = report.render();
        assert!(text.find("Expected A").unwrap() < text.find("Expected B").unwrap());
    }
}
