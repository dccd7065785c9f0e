//! Line-oriented reader shared by the GAF, GPAD and GPI builders
//!
//! The reader classifies every physical line, tracks header metadata (format
//! version, GPI namespace) in an explicit [`ReaderState`], validates data
//! rows against the active [`Schema`] and yields [`Row`]s. Rows with too few
//! columns are rejected and recorded as errors; rows with too many are
//! accepted with a warning.
//!
//! # Example
//!
//! ```rust
//! use anno_formats::config::ParserConfig;
//! use anno_formats::reader::AnnotationReader;
//! use anno_formats::schema::{Field, Format};
//!
//! let data = "!gpa-version: 1.1\nMGI\tMGI:1\tenables\tGO:1\tPMID:1\tECO:1\t\t\t20260101\tMGI\t\t\n";
//! let mut reader = AnnotationReader::new(data.as_bytes(), Format::Gpad, &ParserConfig::default());
//! let row = reader.next_row().unwrap().unwrap();
//! assert_eq!(row.get(Field::GoId), "GO:1");
//! assert!(reader.next_row().unwrap().is_none());
//! ```

use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, ParserListener, Severity};
use crate::schema::{Field, Format, FormatVersion, HeaderDeclaration, Schema};
use anno_common::Result;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// ============================================================================
// Line Classification
// ============================================================================

/// Kind of a physical line
#[derive(Debug)]
pub enum LineKind {
    Blank,
    /// Text after the first `!`
    Comment(String),
    HeaderMetadata(HeaderDeclaration),
    Data,
}

/// Classify one line (without its terminator)
pub fn classify_line(format: Format, line: &str) -> LineKind {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    match line.trim_start().strip_prefix('!') {
        Some(body) => match format.parse_header(body) {
            Some(declaration) => LineKind::HeaderMetadata(declaration),
            None => LineKind::Comment(body.to_string()),
        },
        None => LineKind::Data,
    }
}

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Accepted,
    /// More columns than required; extras ignored
    AcceptedWithWarning,
    /// Fewer columns than required
    Rejected,
}

/// Validate a row's column count against the schema
pub fn validate_columns(schema: &Schema, column_count: usize) -> RowStatus {
    let required = schema.column_count();
    if column_count < required {
        RowStatus::Rejected
    } else if column_count > required {
        RowStatus::AcceptedWithWarning
    } else {
        RowStatus::Accepted
    }
}

/// Split on tabs, keeping empty columns
pub fn tokenize(line: &str) -> Vec<String> {
    line.split('\t').map(String::from).collect()
}

/// A validated data row
#[derive(Debug, Clone)]
pub struct Row {
    pub raw: String,
    pub line_number: usize,
    pub status: RowStatus,
    pub schema: Schema,
    columns: Vec<String>,
}

impl Row {
    /// Trimmed column value; empty if the schema has no such field
    pub fn get(&self, field: Field) -> &str {
        self.schema
            .index_of(field)
            .and_then(|index| self.columns.get(index))
            .map_or("", |value| value.trim())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

// ============================================================================
// Reader State
// ============================================================================

/// Header-derived state of a reader session, visible to row filters
#[derive(Debug, Clone)]
pub struct ReaderState {
    pub format: Format,
    pub version: FormatVersion,
    /// GPI `!namespace:` value
    pub namespace: Option<String>,
    /// Physical line number of the last line read (1-based)
    pub line_number: usize,
    /// Data rows seen, rejected ones included
    pub rows_read: usize,
}

impl ReaderState {
    fn new(format: Format) -> Self {
        ReaderState {
            format,
            version: format.default_version(),
            namespace: None,
            line_number: 0,
            rows_read: 0,
        }
    }

    pub fn schema(&self) -> Schema {
        self.format.schema(self.version)
    }
}

enum ReadStep {
    Next,
    Success(Row),
    EndOfStream,
}

// ============================================================================
// Reader
// ============================================================================

pub struct AnnotationReader<R: BufRead> {
    input: R,
    buffer: Vec<u8>,
    state: ReaderState,
    report_warnings: bool,
    progress_interval: usize,
    comments: Vec<String>,
    diagnostics: Diagnostics,
    listeners: Vec<Arc<dyn ParserListener>>,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(input: R, format: Format, config: &ParserConfig) -> Self {
        AnnotationReader {
            input,
            buffer: Vec::new(),
            state: ReaderState::new(format),
            report_warnings: config.report_warnings,
            progress_interval: config.progress_interval,
            comments: Vec::new(),
            diagnostics: Diagnostics::new(),
            listeners: Vec::new(),
        }
    }

    pub fn with_listeners(mut self, listeners: Vec<Arc<dyn ParserListener>>) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Comments read since the last call, in file order
    pub fn take_comments(&mut self) -> Vec<String> {
        std::mem::take(&mut self.comments)
    }

    /// Next accepted row, or `None` at end of stream
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            match self.load_next()? {
                ReadStep::Success(row) => return Ok(Some(row)),
                ReadStep::EndOfStream => {
                    info!(
                        "Finished reading {} {}: {} lines, {} rows",
                        self.state.format, self.state.version, self.state.line_number,
                        self.state.rows_read
                    );
                    return Ok(None);
                }
                ReadStep::Next => continue,
            }
        }
    }

    /// Record a diagnostic raised while building from a row
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                error!("{}", diagnostic);
                for listener in &self.listeners {
                    listener.on_error(&diagnostic);
                }
            }
            Severity::Warning => {
                if !self.report_warnings {
                    debug!("{}", diagnostic);
                    return;
                }
                warn!("{}", diagnostic);
                for listener in self.listeners.iter().filter(|l| l.reports_warnings()) {
                    listener.on_warning(&diagnostic);
                }
            }
        }
        self.diagnostics.push(diagnostic);
    }

    fn load_next(&mut self) -> Result<ReadStep> {
        self.buffer.clear();
        if self.input.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(ReadStep::EndOfStream);
        }
        self.state.line_number += 1;

        let line = self.decode_line();
        match classify_line(self.state.format, &line) {
            LineKind::Blank => Ok(ReadStep::Next),
            LineKind::Comment(comment) => {
                for listener in &self.listeners {
                    listener.on_comment(&comment, self.state.line_number);
                }
                self.comments.push(comment);
                Ok(ReadStep::Next)
            }
            LineKind::HeaderMetadata(declaration) => {
                self.apply_header(declaration);
                Ok(ReadStep::Next)
            }
            LineKind::Data => Ok(self.validate(line)),
        }
    }

    /// Invalid UTF-8 (e.g. Latin-1 names) is replaced, not fatal
    fn decode_line(&self) -> String {
        let line = match std::str::from_utf8(&self.buffer) {
            Ok(text) => text.to_string(),
            Err(_) => {
                warn!(
                    "Line {} is not valid UTF-8; invalid bytes replaced",
                    self.state.line_number
                );
                String::from_utf8_lossy(&self.buffer).into_owned()
            }
        };
        line.trim_end_matches(['\n', '\r']).to_string()
    }

    fn apply_header(&mut self, declaration: HeaderDeclaration) {
        match declaration {
            HeaderDeclaration::Version(Ok(version)) => {
                debug!("{} version {} declared", self.state.format, version);
                self.state.version = version;
            }
            HeaderDeclaration::Version(Err(e)) => {
                let fallback = self.state.format.default_version();
                info!("{} at line {}, using {}", e, self.state.line_number, fallback);
                self.state.version = fallback;
            }
            HeaderDeclaration::Namespace(namespace) => {
                debug!("GPI namespace {}", namespace);
                self.state.namespace = Some(namespace);
            }
        }
    }

    fn validate(&mut self, raw: String) -> ReadStep {
        self.state.rows_read += 1;
        if self.progress_interval > 0 && self.state.rows_read % self.progress_interval == 0 {
            info!("Read {} {} rows", self.state.rows_read, self.state.format);
        }

        let schema = self.state.schema();
        let columns = tokenize(&raw);
        let line_number = self.state.line_number;

        for listener in &self.listeners {
            listener.on_row(&raw, line_number);
        }

        let status = validate_columns(&schema, columns.len());

        match status {
            RowStatus::Rejected => {
                let message = format!(
                    "Expected {} columns for {} {}, found {}; row dropped",
                    schema.column_count(),
                    schema.format,
                    schema.version,
                    columns.len()
                );
                self.report(column_diagnostic(
                    DiagnosticKind::ColumnDeficit,
                    Severity::Error,
                    message,
                    raw,
                    line_number,
                ));
                return ReadStep::Next;
            }
            RowStatus::AcceptedWithWarning => {
                let message = format!(
                    "Expected {} columns for {} {}, found {}; extra columns ignored",
                    schema.column_count(),
                    schema.format,
                    schema.version,
                    columns.len()
                );
                self.report(column_diagnostic(
                    DiagnosticKind::ColumnSurplus,
                    Severity::Warning,
                    message,
                    raw.clone(),
                    line_number,
                ));
            }
            RowStatus::Accepted => {}
        }

        ReadStep::Success(Row {
            raw,
            line_number,
            status,
            schema,
            columns,
        })
    }
}

fn column_diagnostic(
    kind: DiagnosticKind,
    severity: Severity,
    message: String,
    raw_line: String,
    line_number: usize,
) -> Diagnostic {
    Diagnostic {
        kind,
        severity,
        message,
        raw_line,
        line_number,
        subject: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn gpad_row(columns: usize) -> String {
        let mut values = vec![
            "MGI", "MGI:1", "enables", "GO:1", "PMID:1", "ECO:1", "", "", "20260101", "MGI", "",
            "",
        ];
        values.resize(columns, "extra");
        values.join("\t")
    }

    fn reader(data: &str, format: Format) -> AnnotationReader<&[u8]> {
        AnnotationReader::new(data.as_bytes(), format, &ParserConfig::default())
    }

    #[test]
    fn test_classify_line() {
        assert!(matches!(classify_line(Format::Gaf, "   "), LineKind::Blank));
        assert!(matches!(classify_line(Format::Gaf, "MGI\tMGI:1"), LineKind::Data));
        match classify_line(Format::Gaf, "!! Generated: 2026") {
            LineKind::Comment(c) => assert_eq!(c, "! Generated: 2026"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            classify_line(Format::Gaf, "!gaf-version: 2.1"),
            LineKind::HeaderMetadata(HeaderDeclaration::Version(Ok(_)))
        ));
    }

    #[test]
    fn test_tokenize_keeps_empty_columns() {
        assert_eq!(tokenize("a\t\tb\t"), vec!["a", "", "b", ""]);
    }

    #[test]
    fn test_column_deficit_dropped() {
        let data = format!("!gpa-version: 1.1\n{}\n{}\n", gpad_row(11), gpad_row(12));
        let mut r = reader(&data, Format::Gpad);

        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.line_number, 3);
        assert!(r.next_row().unwrap().is_none());

        let errors: Vec<_> = r.diagnostics().errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line_number, 2);
        assert_eq!(errors[0].kind, DiagnosticKind::ColumnDeficit);
    }

    #[test]
    fn test_column_surplus_warning() {
        let data = format!("{}\n", gpad_row(13));
        let mut r = reader(&data, Format::Gpad);

        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.status, RowStatus::AcceptedWithWarning);
        assert_eq!(row.get(Field::AnnotationProperties), "");
        assert_eq!(r.diagnostics().warnings().count(), 1);
        assert_eq!(r.diagnostics().errors().count(), 0);
    }

    #[test]
    fn test_warnings_suppressed() {
        let data = format!("{}\n", gpad_row(13));
        let config = ParserConfig::builder().report_warnings(false).build();
        let mut r = AnnotationReader::new(data.as_bytes(), Format::Gpad, &config);
        assert!(r.next_row().unwrap().is_some());
        assert!(r.diagnostics().is_empty());
    }

    #[test]
    fn test_version_switches_schema() {
        let gaf1_row = vec!["x"; 15].join("\t");
        let data = format!("{}\n!gaf-version: 1.0\n{}\n", gaf1_row, gaf1_row);
        let mut r = reader(&data, Format::Gaf);

        // default 2.0 needs 17 columns
        assert!(r.next_row().unwrap().is_some());
        assert_eq!(r.diagnostics().errors().count(), 1);
        assert_eq!(r.state().version, FormatVersion::new(1, 0));
    }

    #[test]
    fn test_malformed_version_falls_back() {
        let data = "!gpi-version: 1.2\n!gpi-version: x.y\n";
        let mut r = reader(data, Format::Gpi);
        assert!(r.next_row().unwrap().is_none());
        assert_eq!(r.state().version, FormatVersion::new(1, 1));
    }

    #[test]
    fn test_comments_and_namespace() {
        let data = "!gpi-version: 1.1\n!namespace: MGI\n!Generated by MGI\n\n";
        let mut r = reader(data, Format::Gpi);
        assert!(r.next_row().unwrap().is_none());
        assert_eq!(r.take_comments(), vec!["Generated by MGI"]);
        assert_eq!(r.state().namespace.as_deref(), Some("MGI"));
        assert_eq!(r.state().line_number, 4);
    }

    #[test]
    fn test_invalid_utf8_row_is_kept() {
        let mut data = format!("{}\n", gpad_row(12)).into_bytes();
        data.extend_from_slice(b"MGI\tMGI:2\tenables\tGO:1\tPMID:1\tECO:1\t\t\t20260101\tcaf\xe9\t\t\n");
        data.extend_from_slice(format!("{}\n", gpad_row(12)).as_bytes());

        let mut r = AnnotationReader::new(&data[..], Format::Gpad, &ParserConfig::default());
        let mut rows = Vec::new();
        while let Some(row) = r.next_row().unwrap() {
            rows.push(row);
        }

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get(Field::AssignedBy), "caf\u{FFFD}");
        assert_eq!(rows[2].line_number, 3);
        assert!(r.diagnostics().is_empty());
    }

    #[test]
    fn test_deficit_message_names_format() {
        let data = format!("{}\n", gpad_row(3));
        let mut r = reader(&data, Format::Gpad);
        assert!(r.next_row().unwrap().is_none());

        let error = r.diagnostics().errors().next().unwrap();
        assert_eq!(
            error.message,
            "Expected 12 columns for GPAD 1.1, found 3; row dropped"
        );
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ParserListener for Recorder {
        fn on_row(&self, _raw: &str, line: usize) {
            self.events.lock().unwrap().push(format!("row {}", line));
        }
        fn on_comment(&self, comment: &str, _line: usize) {
            self.events.lock().unwrap().push(format!("comment {}", comment));
        }
        fn on_error(&self, d: &Diagnostic) {
            self.events.lock().unwrap().push(format!("error {}", d.line_number));
        }
        fn on_warning(&self, d: &Diagnostic) {
            self.events.lock().unwrap().push(format!("warning {}", d.line_number));
        }
    }

    #[test]
    fn test_listener_events() {
        let recorder = Arc::new(Recorder::default());
        let data = format!("!hello\n{}\n{}\n{}\n", gpad_row(12), gpad_row(3), gpad_row(13));
        let listener: Arc<dyn ParserListener> = recorder.clone();
        let mut r = reader(&data, Format::Gpad).with_listeners(vec![listener]);
        while r.next_row().unwrap().is_some() {}

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["comment hello", "row 2", "row 3", "error 3", "row 4", "warning 4"]
        );
    }
}
