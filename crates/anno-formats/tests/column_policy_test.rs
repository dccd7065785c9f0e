// Column-count validation and header version handling

mod common;

use anno_formats::reader::AnnotationReader;
use anno_formats::{
    DiagnosticKind, Format, FormatVersion, GafDocumentBuilder, GpadGpiBuilder, ParserConfig,
    Severity,
};
use common::eco_mapper;
use std::io::Cursor;
use std::sync::Arc;

const GPI: &str = "!gpi-version: 1.2\nMGI\tMGI:1\tA\t\t\tgene\ttaxon:10090\t\t\t\n";

fn gpad_row(columns: usize) -> String {
    let mut values = vec![
        "MGI",
        "MGI:1",
        "enables",
        "GO:0003674",
        "PMID:1",
        "ECO:0000314",
        "",
        "",
        "20260101",
        "MGI",
        "",
        "",
    ];
    values.resize(columns, "surplus");
    values.join("\t")
}

#[test]
fn test_gpad_short_row_is_dropped_with_error() {
    let gpad = format!(
        "!gpa-version: 1.1\n!comment\n{}\n{}\n{}\n",
        gpad_row(12),
        gpad_row(11),
        gpad_row(12)
    );

    let mut builder = GpadGpiBuilder::new(ParserConfig::default(), Arc::new(eco_mapper()));
    let gpi = builder.load_gpi(Cursor::new(GPI), "x.gpi", "x.gpi").unwrap();
    let document = builder
        .load_gpad(Cursor::new(gpad), &gpi, "x.gpad", "x.gpad")
        .unwrap();

    assert_eq!(document.len(), 2);
    let errors: Vec<_> = builder.diagnostics().errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::ColumnDeficit);
    assert_eq!(errors[0].line_number, 4);
    assert_eq!(errors[0].raw_line, gpad_row(11));
    assert_eq!(
        errors[0].message,
        "Expected 12 columns for GPAD 1.1, found 11; row dropped"
    );
    assert!(errors[0].to_string().starts_with("line 4: "));
    assert_eq!(builder.diagnostics().warnings().count(), 0);
}

#[test]
fn test_gpad_long_row_is_kept_with_warning() {
    let gpad = format!("!gpa-version: 1.1\n{}\n", gpad_row(13));

    let mut builder = GpadGpiBuilder::new(ParserConfig::default(), Arc::new(eco_mapper()));
    let gpi = builder.load_gpi(Cursor::new(GPI), "x.gpi", "x.gpi").unwrap();
    let document = builder
        .load_gpad(Cursor::new(gpad), &gpi, "x.gpad", "x.gpad")
        .unwrap();

    assert_eq!(document.len(), 1);
    assert_eq!(document.annotations()[0].cls, "GO:0003674");
    assert!(document.annotations()[0].properties.is_empty());

    let warnings: Vec<_> = builder.diagnostics().warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, DiagnosticKind::ColumnSurplus);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert_eq!(warnings[0].line_number, 2);
    assert_eq!(builder.diagnostics().errors().count(), 0);
}

#[test]
fn test_malformed_gpad_version_uses_default() {
    let gpad = format!("!gpad-version: 1.x\n{}\n", gpad_row(12));
    let mut reader = AnnotationReader::new(
        Cursor::new(gpad),
        Format::Gpad,
        &ParserConfig::default(),
    );

    assert!(reader.next_row().unwrap().is_some());
    assert_eq!(reader.state().version, FormatVersion::new(1, 1));
    assert!(reader.diagnostics().is_empty());
}

#[test]
fn test_gaf_without_header_defaults_to_2_0() {
    let row15 = vec!["x"; 15].join("\t");
    let row17 = vec!["x"; 17].join("\t");
    let gaf = format!("{}\n{}\n", row15, row17);

    let mut builder = GafDocumentBuilder::new(ParserConfig::default());
    let document = builder
        .build_document(Cursor::new(gaf), "x.gaf", "x.gaf")
        .unwrap();

    assert_eq!(document.len(), 1);
    let errors: Vec<_> = builder.diagnostics().errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line_number, 1);
}

#[test]
fn test_gaf_1_0_header_accepts_15_columns() {
    let row15 = vec!["x"; 15].join("\t");
    let gaf = format!("!gaf-version: 1.0\n{}\n{}\n", row15, row15);

    let mut builder = GafDocumentBuilder::new(ParserConfig::default());
    let document = builder
        .build_document(Cursor::new(gaf), "x.gaf", "x.gaf")
        .unwrap();

    assert_eq!(document.len(), 2);
    assert!(builder.diagnostics().is_empty());
}

#[test]
fn test_gpi_1_1_requires_namespace() {
    let gpi = "!gpi-version: 1.1\nMGI:1\tA\t\t\tgene\ttaxon:10090\t\t\t\n";
    let mut builder = GpadGpiBuilder::new(ParserConfig::default(), Arc::new(eco_mapper()));
    let document = builder.load_gpi(Cursor::new(gpi), "x.gpi", "x.gpi").unwrap();
    assert!(document.is_empty());
}
