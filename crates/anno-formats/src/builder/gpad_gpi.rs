// Two-phase GPI + GPAD builder

use super::{accept_row, relation_for_aspect, RowFilter};
use crate::collaborators::{AspectProvider, EcoMapper};
use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, ParserListener, Severity};
use crate::fields;
use crate::io::{document_id, open_input};
use crate::models::{
    AnnotationDocument, AnnotationSource, Bioentity, BioentityDocument, GeneAnnotation, Qualifier,
};
use crate::reader::{AnnotationReader, ReaderState, Row};
use crate::schema::{Field, Format, FormatVersion};
use anno_common::Result;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds a [`BioentityDocument`] from GPI input, then an
/// [`AnnotationDocument`] from GPAD input whose annotations share the GPI
/// entity instances
///
/// GPAD rows naming an entity missing from the GPI document are dropped
/// with an `UnknownBioentity` warning, unless
/// `include_unknown_bioentities` is set, in which case the annotation keeps
/// only its `bioentity_id`. Split size does not apply here.
pub struct GpadGpiBuilder {
    config: ParserConfig,
    eco_mapper: Arc<dyn EcoMapper>,
    aspect_provider: Option<Arc<dyn AspectProvider>>,
    gpi_filters: Vec<Box<dyn RowFilter>>,
    gpad_filters: Vec<Box<dyn RowFilter>>,
    listeners: Vec<Arc<dyn ParserListener>>,
    diagnostics: Diagnostics,
}

impl GpadGpiBuilder {
    pub fn new(config: ParserConfig, eco_mapper: Arc<dyn EcoMapper>) -> Self {
        GpadGpiBuilder {
            config,
            eco_mapper,
            aspect_provider: None,
            gpi_filters: Vec::new(),
            gpad_filters: Vec::new(),
            listeners: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_aspect_provider(mut self, provider: Arc<dyn AspectProvider>) -> Self {
        self.aspect_provider = Some(provider);
        self
    }

    pub fn add_gpi_filter(&mut self, filter: impl RowFilter + 'static) {
        self.gpi_filters.push(Box::new(filter));
    }

    pub fn add_gpad_filter(&mut self, filter: impl RowFilter + 'static) {
        self.gpad_filters.push(Box::new(filter));
    }

    pub fn add_listener(&mut self, listener: Arc<dyn ParserListener>) {
        self.listeners.push(listener);
    }

    /// Diagnostics since the last [`load_gpi`](Self::load_gpi)
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Load both files (gzip if they end in `.gz`)
    pub fn build_documents(
        &mut self,
        gpad_path: impl AsRef<Path>,
        gpi_path: impl AsRef<Path>,
    ) -> Result<(BioentityDocument, AnnotationDocument)> {
        let (gpad_path, gpi_path) = (gpad_path.as_ref(), gpi_path.as_ref());

        let entities = self.load_gpi(
            open_input(gpi_path)?,
            document_id(gpi_path),
            gpi_path.display().to_string(),
        )?;
        let annotations = self.load_gpad(
            open_input(gpad_path)?,
            &entities,
            document_id(gpad_path),
            gpad_path.display().to_string(),
        )?;
        Ok((entities, annotations))
    }

    /// Phase 1: GPI rows to shared entities; starts a new diagnostics session
    pub fn load_gpi<R: BufRead>(
        &mut self,
        input: R,
        document_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<BioentityDocument> {
        self.config.validate()?;
        self.diagnostics = Diagnostics::new();

        let mut document = BioentityDocument::new(document_id, path);
        info!("Parsing GPI document {}", document.id);

        let mut reader = AnnotationReader::new(input, Format::Gpi, &self.config)
            .with_listeners(self.listeners.clone());
        let mut missing_namespace = 0usize;

        while let Some(row) = reader.next_row()? {
            for comment in reader.take_comments() {
                document.add_comment(comment);
            }
            if !accept_row(self.gpi_filters.as_mut_slice(), &row, reader.state()) {
                continue;
            }
            match parse_bioentity(&row, reader.state()) {
                Some(entity) => {
                    document.add_bioentity(entity);
                }
                None => missing_namespace += 1,
            }
        }
        for comment in reader.take_comments() {
            document.add_comment(comment);
        }

        if missing_namespace > 0 {
            warn!(
                "Skipped {} GPI rows in {}: no !namespace header",
                missing_namespace, document.id
            );
        }
        self.diagnostics.extend(reader.take_diagnostics());
        info!("Built GPI document {}: {} entities", document.id, document.len());
        Ok(document)
    }

    /// Phase 2: GPAD rows to annotations resolved against `entities`
    pub fn load_gpad<R: BufRead>(
        &mut self,
        input: R,
        entities: &BioentityDocument,
        document_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<AnnotationDocument> {
        self.config.validate()?;

        let mut document = AnnotationDocument::with_bioentities(document_id, path, entities);
        info!("Parsing GPAD document {}", document.id);

        let mut reader = AnnotationReader::new(input, Format::Gpad, &self.config)
            .with_listeners(self.listeners.clone());

        while let Some(row) = reader.next_row()? {
            for comment in reader.take_comments() {
                document.add_comment(comment);
            }
            if !accept_row(self.gpad_filters.as_mut_slice(), &row, reader.state()) {
                continue;
            }
            if let Some(annotation) = self.parse_annotation(&row, &document, &mut reader) {
                document.add_annotation(annotation);
            }
        }
        for comment in reader.take_comments() {
            document.add_comment(comment);
        }

        self.diagnostics.extend(reader.take_diagnostics());
        info!(
            "Built GPAD document {}: {} annotations",
            document.id,
            document.len()
        );
        Ok(document)
    }

    fn parse_annotation<R: BufRead>(
        &self,
        row: &Row,
        document: &AnnotationDocument,
        reader: &mut AnnotationReader<R>,
    ) -> Option<GeneAnnotation> {
        let bioentity_id = format!("{}:{}", row.get(Field::Db), row.get(Field::DbObjectId));
        let entity = document.bioentity(&bioentity_id).cloned();

        if entity.is_none() {
            let message = if self.config.include_unknown_bioentities {
                format!("No bioentity found for {}; kept without entity", bioentity_id)
            } else {
                format!("No bioentity found for {}; row dropped", bioentity_id)
            };
            reader.report(row_diagnostic(
                row,
                DiagnosticKind::UnknownBioentity,
                message,
                &bioentity_id,
            ));
            if !self.config.include_unknown_bioentities {
                return None;
            }
        }

        let cls = row.get(Field::GoId).to_string();
        let qualifier = fields::parse_qualifier(row.get(Field::Qualifier));

        // last relation token wins; NOT is a modifier
        let mut relation = qualifier
            .tokens
            .iter()
            .rev()
            .find(|t| *t != Qualifier::NOT)
            .cloned();

        let aspect = match self.aspect_provider.as_ref().and_then(|p| p.aspect(&cls)) {
            Some(aspect) => {
                if relation.is_none() {
                    relation = relation_for_aspect(&aspect).map(String::from);
                }
                aspect
            }
            None => String::new(),
        };

        let eco = row.get(Field::EvidenceCode);
        let short_evidence = match self.eco_mapper.go_code(eco) {
            Some((code, _)) => Some(code),
            None => {
                if !eco.is_empty() {
                    reader.report(row_diagnostic(
                        row,
                        DiagnosticKind::UnmappedEvidence,
                        format!("No GO evidence code for {}", eco),
                        eco,
                    ));
                }
                None
            }
        };

        let mut annotation = GeneAnnotation {
            bioentity_id,
            cls,
            qualifier,
            aspect,
            relation,
            reference_ids: fields::parse_list(row.get(Field::Reference)),
            short_evidence,
            eco_evidence_cls: (!eco.is_empty()).then(|| eco.to_string()),
            with_infos: fields::parse_with(row.get(Field::With)),
            acts_on_taxon: fields::parse_taxon_relation(row.get(Field::InteractingTaxonId)),
            extensions: fields::parse_extensions(row.get(Field::AnnotationExtension)),
            properties: fields::parse_properties(row.get(Field::AnnotationProperties)),
            last_update_date: row.get(Field::Date).to_string(),
            assigned_by: row.get(Field::AssignedBy).to_string(),
            source: Some(AnnotationSource {
                raw_line: row.raw.clone(),
                line_number: row.line_number,
                document_id: document.id.clone(),
            }),
            ..Default::default()
        };
        if let Some(entity) = entity {
            annotation.set_bioentity(entity);
        }
        Some(annotation)
    }
}

fn row_diagnostic(row: &Row, kind: DiagnosticKind, message: String, subject: &str) -> Diagnostic {
    Diagnostic {
        kind,
        severity: Severity::Warning,
        message,
        raw_line: row.raw.clone(),
        line_number: row.line_number,
        subject: Some(subject.to_string()),
    }
}

/// `None` when the row has no namespace (GPI < 1.2 without `!namespace:`)
fn parse_bioentity(row: &Row, state: &ReaderState) -> Option<Bioentity> {
    let db = if state.version >= FormatVersion::new(1, 2) {
        Some(row.get(Field::Db).to_string())
    } else {
        state.namespace.clone()
    };
    let db = db.filter(|db| !db.is_empty())?;

    let id = format!("{}:{}", db, row.get(Field::DbObjectId));
    let mut entity = Bioentity::new(
        id,
        row.get(Field::DbObjectSymbol),
        row.get(Field::DbObjectName),
        row.get(Field::DbObjectType),
        fields::normalize_taxon(row.get(Field::Taxon)),
        db,
    );
    entity.synonyms = fields::parse_list(row.get(Field::DbObjectSynonym));
    let parent = row.get(Field::ParentObjectId);
    entity.parent_object_id = (!parent.is_empty()).then(|| parent.to_string());
    entity.db_xrefs = fields::parse_list(row.get(Field::DbXrefs));
    entity.properties = fields::parse_properties(row.get(Field::GeneProductProperties));
    Some(entity)
}
