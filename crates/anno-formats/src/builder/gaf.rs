// GAF document builder with optional chunked reading

use super::{accept_row, relation_for_aspect, RowFilter};
use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostics, ParserListener};
use crate::fields;
use crate::io::{document_id, open_input};
use crate::models::{AnnotationDocument, AnnotationSource, Bioentity, GeneAnnotation, Qualifier};
use crate::reader::{AnnotationReader, Row};
use crate::schema::{Field, Format};
use anno_common::{AnnoError, Result};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

struct GafSession {
    reader: AnnotationReader<Box<dyn BufRead>>,
    document_id: String,
    path: String,
    /// First row of the next chunk, read while detecting the split boundary
    pending: Option<Row>,
    exhausted: bool,
}

/// Builds [`AnnotationDocument`]s from GAF input
///
/// With a split size configured, [`build_document`](Self::build_document)
/// returns the first chunk and [`next_chunk`](Self::next_chunk) the rest.
/// Every chunk is an independent document with its own entity table.
pub struct GafDocumentBuilder {
    config: ParserConfig,
    filters: Vec<Box<dyn RowFilter>>,
    listeners: Vec<Arc<dyn ParserListener>>,
    session: Option<GafSession>,
    diagnostics: Diagnostics,
    is_split: bool,
}

impl GafDocumentBuilder {
    pub fn new(config: ParserConfig) -> Self {
        GafDocumentBuilder {
            config,
            filters: Vec::new(),
            listeners: Vec::new(),
            session: None,
            diagnostics: Diagnostics::new(),
            is_split: false,
        }
    }

    pub fn add_filter(&mut self, filter: impl RowFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn add_listener(&mut self, listener: Arc<dyn ParserListener>) {
        self.listeners.push(listener);
    }

    /// Open a GAF file (gzip if it ends in `.gz`) and build the first document
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<AnnotationDocument> {
        let path = path.as_ref();
        let input = open_input(path)?;
        self.build_document(input, document_id(path), path.display().to_string())
    }

    /// Start a new session on `input` and build the first document (or chunk)
    pub fn build_document<R: BufRead + 'static>(
        &mut self,
        input: R,
        document_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<AnnotationDocument> {
        self.config.validate()?;
        self.dispose();
        self.diagnostics = Diagnostics::new();

        let document_id = document_id.into();
        info!("Parsing GAF document {}", document_id);

        let input: Box<dyn BufRead> = Box::new(input);
        let reader = AnnotationReader::new(input, Format::Gaf, &self.config)
            .with_listeners(self.listeners.clone());
        self.session = Some(GafSession {
            reader,
            document_id,
            path: path.into(),
            pending: None,
            exhausted: false,
        });

        self.build_chunk()?
            .ok_or_else(|| AnnoError::State("GAF session ended before its first chunk".to_string()))
    }

    /// Next chunk of the current session; `None` once the input is exhausted
    pub fn next_chunk(&mut self) -> Result<Option<AnnotationDocument>> {
        match &self.session {
            None => Err(AnnoError::State("No GAF session in progress".to_string())),
            Some(session) if session.exhausted => Ok(None),
            Some(_) => self.build_chunk(),
        }
    }

    /// Whether the last document was cut at the split size with rows remaining
    pub fn is_split(&self) -> bool {
        self.is_split
    }

    /// Diagnostics of the current (or last) session
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Close the current session's input, if any
    pub fn dispose(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("Closing GAF session {}", session.document_id);
        }
        self.is_split = false;
    }

    fn build_chunk(&mut self) -> Result<Option<AnnotationDocument>> {
        let result = self.fill_chunk();
        if result.is_err() {
            self.session = None;
        }
        result
    }

    fn fill_chunk(&mut self) -> Result<Option<AnnotationDocument>> {
        let Self {
            config,
            filters,
            session,
            diagnostics,
            is_split,
            ..
        } = self;
        let session = session
            .as_mut()
            .ok_or_else(|| AnnoError::State("No GAF session in progress".to_string()))?;

        let mut document = AnnotationDocument::new(&session.document_id, &session.path);
        let mut counter = 0usize;
        *is_split = false;

        loop {
            let row = match session.pending.take() {
                Some(row) => Some(row),
                None => session.reader.next_row()?,
            };
            for comment in session.reader.take_comments() {
                document.add_comment(comment);
            }

            let Some(row) = row else {
                session.exhausted = true;
                break;
            };

            if config.split_size.is_some_and(|limit| counter >= limit) {
                session.pending = Some(row);
                *is_split = true;
                break;
            }
            counter += 1;

            if !accept_row(filters.as_mut_slice(), &row, session.reader.state()) {
                continue;
            }

            let entity = document.add_bioentity(parse_bioentity(&row));
            let annotation = parse_annotation(&row, entity, &session.document_id);
            document.add_annotation(annotation);
        }

        diagnostics.extend(session.reader.take_diagnostics());
        info!(
            "Built GAF document {}: {} annotations, {} entities{}",
            document.id,
            document.len(),
            document.bioentities().len(),
            if *is_split { " (split)" } else { "" }
        );
        Ok(Some(document))
    }
}

fn parse_bioentity(row: &Row) -> Bioentity {
    let db = row.get(Field::Db);
    let id = format!("{}:{}", db, row.get(Field::DbObjectId));
    let (taxon, _) = fields::parse_gaf_taxa(row.get(Field::Taxon));

    let mut entity = Bioentity::new(
        id,
        row.get(Field::DbObjectSymbol),
        row.get(Field::DbObjectName),
        row.get(Field::DbObjectType),
        taxon,
        db,
    );
    entity.synonyms = fields::parse_list(row.get(Field::DbObjectSynonym));
    entity
}

fn parse_annotation(row: &Row, entity: Arc<Bioentity>, document_id: &str) -> GeneAnnotation {
    let qualifier = fields::parse_qualifier(row.get(Field::Qualifier));
    let aspect = row.get(Field::Aspect).to_string();

    // colocalizes_with takes precedence over contributes_to
    let relation = if qualifier.has(Qualifier::COLOCALIZES_WITH) {
        Some(Qualifier::COLOCALIZES_WITH.to_string())
    } else if qualifier.has(Qualifier::CONTRIBUTES_TO) {
        Some(Qualifier::CONTRIBUTES_TO.to_string())
    } else {
        relation_for_aspect(&aspect)
            .map(String::from)
            .or_else(|| (!aspect.is_empty()).then(|| aspect.clone()))
    };

    let (_, acts_on_taxon) = fields::parse_gaf_taxa(row.get(Field::Taxon));
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());

    let mut annotation = GeneAnnotation {
        cls: row.get(Field::GoId).to_string(),
        qualifier,
        aspect,
        relation,
        reference_ids: fields::parse_list(row.get(Field::Reference)),
        short_evidence: non_empty(row.get(Field::EvidenceCode)),
        with_infos: fields::parse_with(row.get(Field::With)),
        acts_on_taxon,
        extensions: fields::parse_extensions(row.get(Field::AnnotationExtension)),
        last_update_date: row.get(Field::Date).to_string(),
        assigned_by: row.get(Field::AssignedBy).to_string(),
        gene_product_form: non_empty(row.get(Field::GeneProductFormId)),
        source: Some(AnnotationSource {
            raw_line: row.raw.clone(),
            line_number: row.line_number,
            document_id: document_id.to_string(),
        }),
        ..Default::default()
    };
    annotation.set_bioentity(entity);
    annotation
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::reader::ReaderState;
    use std::io::Cursor;

    const GAF: &str = "!gaf-version: 2.0\n\
!Generated by test\n\
UniProtKB\tP12345\tABC1\t\tGO:0005634\tPMID:1\tIDA\t\tC\tABC protein\tABC|abc1\tprotein\ttaxon:9606\t20260115\tUniProt\t\t\n\
UniProtKB\tP12345\tABC1\tNOT|contributes_to\tGO:0003674\tPMID:2|GO_REF:3\tIEA\tInterPro:IPR1,InterPro:IPR1\tF\tABC protein\t\tprotein\ttaxon:9606|taxon:10090\t20260116\tUniProt\tpart_of(CL:0000001)\tUniProtKB:P12345-2\n\
UniProtKB\tQ99999\tXYZ\t\tGO:0008150\tPMID:3\tTAS\t\tP\tXYZ protein\t\tprotein\ttaxon:10090\t20260117\tMGI\t\t\n";

    fn build(config: ParserConfig, data: &str) -> (GafDocumentBuilder, AnnotationDocument) {
        let mut builder = GafDocumentBuilder::new(config);
        let doc = builder
            .build_document(Cursor::new(data.to_string()), "test.gaf", "test.gaf")
            .unwrap();
        (builder, doc)
    }

    #[test]
    fn test_build_document() {
        let (builder, doc) = build(ParserConfig::default(), GAF);

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.bioentities().len(), 2);
        assert_eq!(doc.comments(), &["Generated by test".to_string()]);
        assert!(!builder.is_split());
        assert!(builder.diagnostics().is_empty());

        let first = &doc.annotations()[0];
        assert_eq!(first.bioentity_id, "UniProtKB:P12345");
        assert_eq!(first.relation.as_deref(), Some("part_of"));
        assert_eq!(first.short_evidence.as_deref(), Some("IDA"));
        let entity = first.bioentity.as_ref().unwrap();
        assert_eq!(entity.ncbi_taxon_id, "NCBITaxon:9606");
        assert_eq!(entity.synonyms, vec!["ABC", "abc1"]);

        let second = &doc.annotations()[1];
        assert!(second.is_negated());
        assert_eq!(second.relation.as_deref(), Some("contributes_to"));
        assert_eq!(second.reference_ids, vec!["PMID:2", "GO_REF:3"]);
        assert_eq!(second.with_infos, vec!["InterPro:IPR1"]);
        assert_eq!(second.acts_on_taxon.as_ref().unwrap().taxon, "NCBITaxon:10090");
        assert_eq!(second.extensions[0][0].cls, "CL:0000001");
        assert_eq!(second.gene_product_form.as_deref(), Some("UniProtKB:P12345-2"));
        assert_eq!(second.source.as_ref().unwrap().line_number, 4);

        // same entity instance for both rows
        assert!(Arc::ptr_eq(
            first.bioentity.as_ref().unwrap(),
            second.bioentity.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_colocalizes_with_wins_over_contributes_to() {
        let gaf = "!gaf-version: 2.0\n\
UniProtKB\tP1\tA\tcontributes_to|colocalizes_with\tGO:0005634\tPMID:1\tIDA\t\tC\tA\t\tprotein\ttaxon:9606\t20260101\tUniProt\t\t\n\
UniProtKB\tP1\tA\tcolocalizes_with|contributes_to\tGO:0005737\tPMID:1\tIDA\t\tC\tA\t\tprotein\ttaxon:9606\t20260101\tUniProt\t\t\n";
        let (_, doc) = build(ParserConfig::default(), gaf);

        for annotation in doc.annotations() {
            assert!(annotation.is_contributes_to());
            assert_eq!(annotation.relation.as_deref(), Some("colocalizes_with"));
        }
    }

    #[test]
    fn test_filters_short_circuit() {
        let mut builder = GafDocumentBuilder::new(ParserConfig::default());
        builder.add_filter(|row: &Row, _: &ReaderState| row.get(Field::Aspect) != "F");
        builder.add_filter(|row: &Row, _: &ReaderState| {
            assert_ne!(row.get(Field::Aspect), "F");
            true
        });
        let doc = builder
            .build_document(Cursor::new(GAF.to_string()), "test.gaf", "test.gaf")
            .unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_next_chunk_without_session() {
        let mut builder = GafDocumentBuilder::new(ParserConfig::default());
        assert!(matches!(builder.next_chunk(), Err(AnnoError::State(_))));
    }

    #[test]
    fn test_invalid_split_size() {
        let mut builder = GafDocumentBuilder::new(ParserConfig::builder().split_size(0).build());
        let result = builder.build_document(Cursor::new(GAF.to_string()), "t", "t");
        assert!(matches!(result, Err(AnnoError::Config(_))));
    }

    #[test]
    fn test_split_at_boundary() {
        let (mut builder, first) = build(ParserConfig::builder().split_size(2).build(), GAF);
        assert_eq!(first.len(), 2);
        assert!(builder.is_split());

        let second = builder.next_chunk().unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second.annotations()[0].cls, "GO:0008150");
        assert!(!builder.is_split());
        assert!(builder.next_chunk().unwrap().is_none());
    }
}
