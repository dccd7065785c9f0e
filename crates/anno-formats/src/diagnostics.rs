//! Row-level diagnostics
//!
//! Problems with individual rows never abort a parse. They are recorded as
//! [`Diagnostic`] values on the reader (and from there on the builder) and
//! forwarded to any registered [`ParserListener`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Row was dropped
    Error,
    /// Row was kept
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Fewer columns than the schema requires
    ColumnDeficit,
    /// More columns than the schema requires; extras ignored
    ColumnSurplus,
    /// GPAD evidence class with no GO evidence code mapping
    UnmappedEvidence,
    /// GPAD row referencing an entity absent from the GPI document
    UnknownBioentity,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::ColumnDeficit => "column_deficit",
            DiagnosticKind::ColumnSurplus => "column_surplus",
            DiagnosticKind::UnmappedEvidence => "unmapped_evidence",
            DiagnosticKind::UnknownBioentity => "unknown_bioentity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub raw_line: String,
    pub line_number: usize,
    /// Entity ID for `UnknownBioentity`, evidence class for `UnmappedEvidence`
    pub subject: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.message, self.kind.as_str())
    }
}

/// Accumulated diagnostics of one parse session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn by_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    /// Distinct evidence classes that could not be mapped, in first-seen order
    pub fn unmapped_evidence(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for code in self
            .by_kind(DiagnosticKind::UnmappedEvidence)
            .filter_map(|d| d.subject.as_deref())
        {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Observer of a parse session
///
/// All methods have no-op defaults. Listeners are shared (`Arc`) between a
/// builder and its readers, so stateful listeners use interior mutability.
pub trait ParserListener: Send + Sync {
    /// Called for every data row before column validation, rejected rows included
    fn on_row(&self, _raw_line: &str, _line_number: usize) {}

    /// Called for every comment line (header metadata excluded)
    fn on_comment(&self, _comment: &str, _line_number: usize) {}

    fn on_error(&self, _diagnostic: &Diagnostic) {}

    fn on_warning(&self, _diagnostic: &Diagnostic) {}

    /// Whether `on_warning` should be called at all
    fn reports_warnings(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(kind: DiagnosticKind, severity: Severity, subject: Option<&str>) -> Diagnostic {
        Diagnostic {
            kind,
            severity,
            message: String::new(),
            raw_line: String::new(),
            line_number: 1,
            subject: subject.map(String::from),
        }
    }

    #[test]
    fn test_filters() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(diag(DiagnosticKind::ColumnDeficit, Severity::Error, None));
        diagnostics.push(diag(DiagnosticKind::ColumnSurplus, Severity::Warning, None));
        diagnostics.push(diag(
            DiagnosticKind::UnmappedEvidence,
            Severity::Warning,
            Some("ECO:1"),
        ));
        diagnostics.push(diag(
            DiagnosticKind::UnmappedEvidence,
            Severity::Warning,
            Some("ECO:1"),
        ));

        assert_eq!(diagnostics.len(), 4);
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(diagnostics.warnings().count(), 3);
        assert_eq!(diagnostics.unmapped_evidence(), vec!["ECO:1"]);
    }

    #[test]
    fn test_display() {
        let mut d = diag(DiagnosticKind::ColumnDeficit, Severity::Error, None);
        d.line_number = 12;
        d.message = "expected 12 columns, found 11".to_string();
        assert_eq!(
            d.to_string(),
            "line 12: expected 12 columns, found 11 (column_deficit)"
        );
    }
}
