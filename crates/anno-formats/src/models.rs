// Annotation data model (bioentities, gene annotations, documents)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Bioentity
// ============================================================================

/// A gene or gene product described by GAF columns 1-3, 10-13 or a GPI row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bioentity {
    /// Composite identifier `DB:LocalID`
    id: String,

    /// Object symbol (e.g., "Pax6")
    pub symbol: String,

    /// Object full name
    pub full_name: String,

    pub synonyms: Vec<String>,

    /// Object type (e.g., "protein", "gene_product")
    pub type_cls: String,

    /// Normalized NCBI taxon (e.g., "NCBITaxon:9606")
    pub ncbi_taxon_id: String,

    /// Source database / namespace (e.g., "MGI")
    pub db: String,

    /// GPI only
    pub parent_object_id: Option<String>,

    /// GPI only
    pub db_xrefs: Vec<String>,

    /// GPI gene product properties, in source order
    pub properties: Vec<(String, String)>,
}

impl Bioentity {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        full_name: impl Into<String>,
        type_cls: impl Into<String>,
        ncbi_taxon_id: impl Into<String>,
        db: impl Into<String>,
    ) -> Self {
        Bioentity {
            id: id.into(),
            symbol: symbol.into(),
            full_name: full_name.into(),
            synonyms: Vec::new(),
            type_cls: type_cls.into(),
            ncbi_taxon_id: ncbi_taxon_id.into(),
            db: db.into(),
            parent_object_id: None,
            db_xrefs: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Local part of the identifier
    /// Example: "MGI:MGI:97490" with db "MGI" -> "MGI:97490"
    pub fn local_id(&self) -> &str {
        if let Some(local) = self
            .id
            .strip_prefix(self.db.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return local;
        }
        self.id.split_once(':').map_or(self.id.as_str(), |(_, local)| local)
    }
}

// ============================================================================
// Qualifier
// ============================================================================

/// Composite qualifier column: raw text plus its parsed tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub raw: String,
    pub tokens: Vec<String>,
}

impl Qualifier {
    pub const NOT: &'static str = "NOT";
    pub const CONTRIBUTES_TO: &'static str = "contributes_to";
    pub const COLOCALIZES_WITH: &'static str = "colocalizes_with";
    pub const INTEGRAL_TO: &'static str = "integral_to";

    pub fn new(raw: impl Into<String>, tokens: Vec<String>) -> Self {
        Qualifier {
            raw: raw.into(),
            tokens,
        }
    }

    pub fn has(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn is_negated(&self) -> bool {
        self.has(Self::NOT)
    }

    pub fn is_contributes_to(&self) -> bool {
        self.has(Self::CONTRIBUTES_TO)
    }

    pub fn is_integral_to(&self) -> bool {
        self.has(Self::INTEGRAL_TO)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// ============================================================================
// Extension Expression
// ============================================================================

/// One `relation(ClassID)` term of an annotation extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionExpression {
    pub relation: String,
    pub cls: String,
}

impl ExtensionExpression {
    pub fn new(relation: impl Into<String>, cls: impl Into<String>) -> Self {
        ExtensionExpression {
            relation: relation.into(),
            cls: cls.into(),
        }
    }
}

impl std::fmt::Display for ExtensionExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.relation, self.cls)
    }
}

// ============================================================================
// Taxon
// ============================================================================

/// Interacting / acts-on taxon, optionally qualified by a relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRelation {
    /// Normalized taxon (e.g., "NCBITaxon:10090")
    pub taxon: String,
    pub relation: Option<String>,
}

impl TaxonRelation {
    pub fn new(taxon: impl Into<String>, relation: Option<String>) -> Self {
        TaxonRelation {
            taxon: taxon.into(),
            relation,
        }
    }
}

// ============================================================================
// Annotation Source
// ============================================================================

/// Where an annotation was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSource {
    pub raw_line: String,
    pub line_number: usize,
    pub document_id: String,
}

// ============================================================================
// Gene Annotation
// ============================================================================

/// A single annotation row from a GAF or GPAD file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneAnnotation {
    /// Composite identifier of the annotated entity (`DB:LocalID`)
    pub bioentity_id: String,

    /// Resolved entity; shared with the document that owns it
    #[serde(skip)]
    pub bioentity: Option<Arc<Bioentity>>,

    /// Ontology class (e.g., "GO:0005634")
    pub cls: String,

    pub qualifier: Qualifier,

    /// Aspect code (P/F/C), empty when unknown
    pub aspect: String,

    /// Relation implied by the aspect or qualifier (e.g., "part_of")
    pub relation: Option<String>,

    /// DB:Reference(s)
    pub reference_ids: Vec<String>,

    /// GO evidence code (e.g., "IDA")
    pub short_evidence: Option<String>,

    /// ECO evidence class (e.g., "ECO:0000314")
    pub eco_evidence_cls: Option<String>,

    /// With/From entries, unique, first occurrence order
    pub with_infos: Vec<String>,

    pub acts_on_taxon: Option<TaxonRelation>,

    /// Outer list is OR ('|'), inner list is AND (',')
    pub extensions: Vec<Vec<ExtensionExpression>>,

    /// GPAD annotation properties, in source order
    pub properties: Vec<(String, String)>,

    /// Raw date column (YYYYMMDD)
    pub last_update_date: String,

    pub assigned_by: String,

    pub gene_product_form: Option<String>,

    pub source: Option<AnnotationSource>,
}

impl GeneAnnotation {
    pub fn is_negated(&self) -> bool {
        self.qualifier.is_negated()
    }

    pub fn is_contributes_to(&self) -> bool {
        self.qualifier.is_contributes_to()
    }

    pub fn is_integral_to(&self) -> bool {
        self.qualifier.is_integral_to()
    }

    /// Parse the date column, `None` if it is not a valid YYYYMMDD date
    pub fn date(&self) -> Option<NaiveDate> {
        let date_str = self.last_update_date.trim();
        if date_str.len() != 8 {
            return None;
        }
        NaiveDate::parse_from_str(date_str, "%Y%m%d").ok()
    }

    /// Attach the resolved entity and keep `bioentity_id` in sync with it
    pub fn set_bioentity(&mut self, entity: Arc<Bioentity>) {
        self.bioentity_id = entity.id().to_string();
        self.bioentity = Some(entity);
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Ordered, ID-keyed set of shared bioentities
#[derive(Debug, Clone, Default)]
struct EntityTable {
    entities: Vec<Arc<Bioentity>>,
    by_id: HashMap<String, usize>,
}

impl EntityTable {
    /// Insert unless the ID is already present; returns the stored instance
    fn intern(&mut self, entity: Arc<Bioentity>) -> Arc<Bioentity> {
        if let Some(&index) = self.by_id.get(entity.id()) {
            return Arc::clone(&self.entities[index]);
        }
        self.by_id.insert(entity.id().to_string(), self.entities.len());
        self.entities.push(Arc::clone(&entity));
        entity
    }

    fn get(&self, id: &str) -> Option<&Arc<Bioentity>> {
        self.by_id.get(id).map(|&index| &self.entities[index])
    }
}

/// Entity-only document built from a GPI file
#[derive(Debug, Clone, Default)]
pub struct BioentityDocument {
    pub id: String,
    pub path: String,
    comments: Vec<String>,
    table: EntityTable,
}

impl BioentityDocument {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        BioentityDocument {
            id: id.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }

    /// First occurrence of an ID wins
    pub fn add_bioentity(&mut self, entity: Bioentity) -> Arc<Bioentity> {
        self.table.intern(Arc::new(entity))
    }

    pub fn bioentity(&self, id: &str) -> Option<&Arc<Bioentity>> {
        self.table.get(id)
    }

    pub fn bioentities(&self) -> &[Arc<Bioentity>] {
        &self.table.entities
    }

    pub fn len(&self) -> usize {
        self.table.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entities.is_empty()
    }
}

/// Annotation document built from a GAF file or a GPAD file
#[derive(Debug, Clone, Default)]
pub struct AnnotationDocument {
    pub id: String,
    pub path: String,
    comments: Vec<String>,
    table: EntityTable,
    annotations: Vec<GeneAnnotation>,
    index: Option<HashMap<String, Vec<usize>>>,
}

impl AnnotationDocument {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        AnnotationDocument {
            id: id.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Document that shares (not copies) the entities of a GPI document
    pub fn with_bioentities(
        id: impl Into<String>,
        path: impl Into<String>,
        entities: &BioentityDocument,
    ) -> Self {
        let mut document = AnnotationDocument::new(id, path);
        for entity in entities.bioentities() {
            document.table.intern(Arc::clone(entity));
        }
        document
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }

    /// First occurrence of an ID wins; later rows reuse the stored instance
    pub fn add_bioentity(&mut self, entity: Bioentity) -> Arc<Bioentity> {
        self.table.intern(Arc::new(entity))
    }

    pub fn add_annotation(&mut self, annotation: GeneAnnotation) {
        if let Some(index) = self.index.as_mut() {
            index
                .entry(annotation.bioentity_id.clone())
                .or_default()
                .push(self.annotations.len());
        }
        self.annotations.push(annotation);
    }

    pub fn bioentity(&self, id: &str) -> Option<&Arc<Bioentity>> {
        self.table.get(id)
    }

    pub fn bioentities(&self) -> &[Arc<Bioentity>] {
        &self.table.entities
    }

    pub fn annotations(&self) -> &[GeneAnnotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Build the entity -> annotations index used by `annotations_for`
    pub fn index(&mut self) {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, annotation) in self.annotations.iter().enumerate() {
            index
                .entry(annotation.bioentity_id.clone())
                .or_default()
                .push(position);
        }
        self.index = Some(index);
    }

    pub fn annotations_for(&self, bioentity_id: &str) -> Vec<&GeneAnnotation> {
        match &self.index {
            Some(index) => index
                .get(bioentity_id)
                .map(|positions| positions.iter().map(|&i| &self.annotations[i]).collect())
                .unwrap_or_default(),
            None => self
                .annotations
                .iter()
                .filter(|a| a.bioentity_id == bioentity_id)
                .collect(),
        }
    }

    pub fn annotations_by_class(&self, cls: &str) -> Vec<&GeneAnnotation> {
        self.annotations.iter().filter(|a| a.cls == cls).collect()
    }

    pub fn annotation_at_line(&self, line_number: usize) -> Option<&GeneAnnotation> {
        self.annotations
            .iter()
            .find(|a| a.source.as_ref().is_some_and(|s| s.line_number == line_number))
    }
}

// ============================================================================
// Tests
// ============================================================================
