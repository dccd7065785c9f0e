//! Anno Formats
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Readers, document builders and writers for the Gene Ontology annotation
//! exchange formats:
//!
//! - **GAF** 1.0 / 2.x: self-contained annotation rows
//! - **GPAD** 1.1 / 1.2: annotation rows referencing entities by ID
//! - **GPI** 1.1 / 1.2: the entity (gene product) records GPAD refers to
//!
//! # Architecture
//!
//! ```text
//! file (.gz) -> AnnotationReader -> Row -> builder -> Document -> writer -> file (.gz)
//!                    |                         |
//!               Diagnostics              RowFilter / EcoMapper / AspectProvider
//! ```
//!
//! # Example
//!
//! ```no_run
//! use anno_formats::builder::GafDocumentBuilder;
//! use anno_formats::config::{ParserConfig, WriterConfig};
//! use anno_formats::writer::GpadWriter;
//!
//! # fn main() -> anno_common::Result<()> {
//! let mut builder = GafDocumentBuilder::new(ParserConfig::default());
//! let document = builder.open("goa_human.gaf.gz")?;
//!
//! GpadWriter::create("goa_human.gpad.gz", &WriterConfig::default())?
//!     .write_document(&document)?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod collaborators;
pub mod config;
pub mod diagnostics;
pub mod fields;
pub mod io;
pub mod models;
pub mod reader;
pub mod schema;
pub mod writer;

pub use builder::{GafDocumentBuilder, GpadGpiBuilder, RowFilter};
pub use collaborators::{AspectProvider, EcoMapper, TableEcoMapper};
pub use config::{ParserConfig, WriterConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, ParserListener, Severity};
pub use models::{
    AnnotationDocument, AnnotationSource, Bioentity, BioentityDocument, ExtensionExpression,
    GeneAnnotation, Qualifier, TaxonRelation,
};
pub use io::{FinishWrite, OutputFile};
pub use schema::{Field, Format, FormatVersion, Schema};
pub use writer::{GafWriter, GpadWriter, GpiWriter};
