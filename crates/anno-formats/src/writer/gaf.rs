// GAF writer (1.0 and 2.x layouts)

use super::{entity_parts, finish, write_header, write_row};
use crate::config::WriterConfig;
use crate::fields;
use crate::io::{create_output, FinishWrite, OutputFile};
use crate::models::{AnnotationDocument, GeneAnnotation};
use crate::schema::{Field, Format, FormatVersion, Schema};
use anno_common::Result;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

pub struct GafWriter<W: Write> {
    out: W,
    schema: Schema,
    rows_written: usize,
}

impl GafWriter<OutputFile> {
    /// Create `path`, gzip-compressed if it ends in `.gz`
    pub fn create(path: impl AsRef<Path>, config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        let out = create_output(path.as_ref(), config.compression_level)?;
        Ok(GafWriter::new(out).with_version(config.gaf_version))
    }
}

impl<W: FinishWrite> GafWriter<W> {
    pub fn new(out: W) -> Self {
        GafWriter {
            out,
            schema: Format::Gaf.schema(Format::Gaf.default_version()),
            rows_written: 0,
        }
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.schema = Format::Gaf.schema(version);
        self
    }

    pub fn version(&self) -> FormatVersion {
        self.schema.version
    }

    pub fn write_header(&mut self, comments: &[String]) -> Result<()> {
        write_header(&mut self.out, Format::Gaf, self.schema.version, comments)
    }

    pub fn write_annotation(&mut self, annotation: &GeneAnnotation) -> Result<()> {
        let columns: Vec<String> = self
            .schema
            .fields()
            .iter()
            .map(|&field| gaf_column(annotation, field))
            .collect();
        write_row(&mut self.out, &self.schema, &columns)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Header, comments and every annotation, then flush and close
    pub fn write_document(mut self, document: &AnnotationDocument) -> Result<()> {
        let result = self.write_all(document);
        finish(&mut self.out, result)?;
        info!(
            "Wrote GAF {} document {}: {} rows",
            self.schema.version, document.id, self.rows_written
        );
        Ok(())
    }

    /// Flush and hand back the output
    pub fn finish(mut self) -> Result<W> {
        self.out.try_finish()?;
        Ok(self.out)
    }

    fn write_all(&mut self, document: &AnnotationDocument) -> Result<()> {
        self.write_header(document.comments())?;
        for annotation in document.annotations() {
            self.write_annotation(annotation)?;
        }
        debug!("Wrote {} GAF annotations", self.rows_written);
        Ok(())
    }
}

fn gaf_column(annotation: &GeneAnnotation, field: Field) -> String {
    let entity = annotation.bioentity.as_deref();
    match field {
        Field::Db => entity_parts(annotation).map(|(db, _)| db).unwrap_or_default(),
        Field::DbObjectId => entity_parts(annotation)
            .map(|(_, local)| local)
            .unwrap_or_default(),
        Field::DbObjectSymbol => entity.map(|e| e.symbol.clone()).unwrap_or_default(),
        Field::Qualifier => fields::build_gaf_qualifier(&annotation.qualifier),
        Field::GoId => annotation.cls.clone(),
        Field::Reference => fields::build_list(&annotation.reference_ids),
        Field::EvidenceCode => annotation.short_evidence.clone().unwrap_or_default(),
        Field::With => fields::build_with(&annotation.with_infos),
        Field::Aspect => annotation.aspect.clone(),
        Field::DbObjectName => entity.map(|e| e.full_name.clone()).unwrap_or_default(),
        Field::DbObjectSynonym => entity.map(|e| fields::build_list(&e.synonyms)).unwrap_or_default(),
        Field::DbObjectType => entity.map(|e| e.type_cls.clone()).unwrap_or_default(),
        Field::Taxon => fields::build_gaf_taxa(
            entity.map(|e| e.ncbi_taxon_id.as_str()).unwrap_or_default(),
            annotation.acts_on_taxon.as_ref(),
        ),
        Field::Date => annotation.last_update_date.clone(),
        Field::AssignedBy => annotation.assigned_by.clone(),
        Field::AnnotationExtension => fields::build_extensions(&annotation.extensions),
        Field::GeneProductFormId => annotation.gene_product_form.clone().unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{Bioentity, ExtensionExpression, TaxonRelation};
    use std::sync::Arc;

    fn annotation() -> GeneAnnotation {
        let mut entity = Bioentity::new(
            "UniProtKB:P12345",
            "ABC1",
            "ABC protein",
            "protein",
            "NCBITaxon:9606",
            "UniProtKB",
        );
        entity.synonyms = vec!["ABC".to_string()];

        let mut ann = GeneAnnotation {
            cls: "GO:0005634".to_string(),
            qualifier: fields::parse_qualifier("NOT|part_of"),
            aspect: "C".to_string(),
            reference_ids: vec!["PMID:1".to_string()],
            short_evidence: Some("IDA".to_string()),
            acts_on_taxon: Some(TaxonRelation::new("NCBITaxon:10090", None)),
            extensions: vec![vec![ExtensionExpression::new("part_of", "CL:1")]],
            last_update_date: "20260115".to_string(),
            assigned_by: "UniProt".to_string(),
            ..Default::default()
        };
        ann.set_bioentity(Arc::new(entity));
        ann
    }

    #[test]
    fn test_gaf_2_row() {
        let mut out = Vec::new();
        let mut writer = GafWriter::new(&mut out);
        writer.write_annotation(&annotation()).unwrap();
        writer.finish().unwrap();

        let line = String::from_utf8(out).unwrap();
        let columns: Vec<&str> = line.trim_end_matches('\n').split('\t').collect();
        assert_eq!(columns.len(), 17);
        assert_eq!(columns[0], "UniProtKB");
        assert_eq!(columns[1], "P12345");
        assert_eq!(columns[3], "NOT");
        assert_eq!(columns[12], "taxon:9606|taxon:10090");
        assert_eq!(columns[15], "part_of(CL:1)");
    }

    #[test]
    fn test_gaf_1_row() {
        let mut out = Vec::new();
        let mut writer = GafWriter::new(&mut out).with_version(FormatVersion::new(1, 0));
        writer.write_annotation(&annotation()).unwrap();
        writer.finish().unwrap();

        let line = String::from_utf8(out).unwrap();
        assert_eq!(line.trim_end_matches('\n').split('\t').count(), 15);
    }

    #[test]
    fn test_write_document() {
        let mut doc = AnnotationDocument::new("doc", "doc.gaf");
        doc.add_comment("Generated by test");
        doc.add_annotation(annotation());

        let mut out = Vec::new();
        GafWriter::new(&mut out).write_document(&doc).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "!gaf-version: 2.0");
        assert_eq!(lines[1], "!Generated by test");
        assert_eq!(lines.len(), 3);
    }
}
