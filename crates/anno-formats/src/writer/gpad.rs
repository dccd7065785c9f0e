// GPAD writer (1.1 and 1.2)

use super::{entity_parts, finish, write_header, write_row};
use crate::config::WriterConfig;
use crate::fields;
use crate::io::{create_output, FinishWrite, OutputFile};
use crate::models::{AnnotationDocument, GeneAnnotation};
use crate::schema::{Field, Format, FormatVersion, Schema};
use anno_common::Result;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Writes annotations as GPAD rows
///
/// A gene product form, when present, is written as the annotated object
/// (GPAD has no separate column for it). Annotations without a usable
/// `DB:LocalID` are skipped with a warning.
pub struct GpadWriter<W: Write> {
    out: W,
    schema: Schema,
    rows_written: usize,
    skipped: usize,
}

impl GpadWriter<OutputFile> {
    pub fn create(path: impl AsRef<Path>, config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        let out = create_output(path.as_ref(), config.compression_level)?;
        Ok(GpadWriter::new(out).with_version(config.gpad_version))
    }
}

impl<W: FinishWrite> GpadWriter<W> {
    pub fn new(out: W) -> Self {
        GpadWriter {
            out,
            schema: Format::Gpad.schema(Format::Gpad.default_version()),
            rows_written: 0,
            skipped: 0,
        }
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.schema = Format::Gpad.schema(version);
        self
    }

    pub fn write_header(&mut self, comments: &[String]) -> Result<()> {
        write_header(&mut self.out, Format::Gpad, self.schema.version, comments)
    }

    /// Returns false if the annotation was skipped
    pub fn write_annotation(&mut self, annotation: &GeneAnnotation) -> Result<bool> {
        let Some((db, local_id)) = gpad_object(annotation) else {
            warn!(
                "Skipping annotation to {} without a DB:LocalID object",
                annotation.cls
            );
            self.skipped += 1;
            return Ok(false);
        };

        let columns: Vec<String> = self
            .schema
            .fields()
            .iter()
            .map(|&field| match field {
                Field::Db => db.clone(),
                Field::DbObjectId => local_id.clone(),
                other => gpad_column(annotation, other),
            })
            .collect();
        write_row(&mut self.out, &self.schema, &columns)?;
        self.rows_written += 1;
        Ok(true)
    }

    pub fn write_document(mut self, document: &AnnotationDocument) -> Result<()> {
        let result = self.write_all(document);
        finish(&mut self.out, result)?;
        info!(
            "Wrote GPAD {} document {}: {} rows, {} skipped",
            self.schema.version, document.id, self.rows_written, self.skipped
        );
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.try_finish()?;
        Ok(self.out)
    }

    fn write_all(&mut self, document: &AnnotationDocument) -> Result<()> {
        self.write_header(document.comments())?;
        for annotation in document.annotations() {
            self.write_annotation(annotation)?;
        }
        Ok(())
    }
}

fn gpad_object(annotation: &GeneAnnotation) -> Option<(String, String)> {
    if let Some(form) = annotation.gene_product_form.as_deref() {
        if let Some((db, local)) = fields::split_identifier(form) {
            return Some((db.to_string(), local.to_string()));
        }
    }
    entity_parts(annotation)
}

fn gpad_column(annotation: &GeneAnnotation, field: Field) -> String {
    match field {
        Field::Qualifier => fields::build_gpad_qualifier(annotation),
        Field::GoId => annotation.cls.clone(),
        Field::Reference => fields::build_list(&annotation.reference_ids),
        Field::EvidenceCode => annotation.eco_evidence_cls.clone().unwrap_or_default(),
        Field::With => fields::build_with(&annotation.with_infos),
        Field::InteractingTaxonId => annotation
            .acts_on_taxon
            .as_ref()
            .map(fields::build_taxon_relation)
            .unwrap_or_default(),
        Field::Date => annotation.last_update_date.clone(),
        Field::AssignedBy => annotation.assigned_by.clone(),
        Field::AnnotationExtension => fields::build_extensions(&annotation.extensions),
        Field::AnnotationProperties => fields::build_properties(&annotation.properties),
        _ => String::new(),
    }
}
