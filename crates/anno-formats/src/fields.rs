// Sub-field codecs for composite columns (qualifiers, with/from, extensions,
// taxa, properties, pipe lists)
//
// Decoders are lenient: malformed tokens are skipped, empty input gives an
// empty collection. Encoders produce the canonical form the decoders accept.

use crate::models::{ExtensionExpression, GeneAnnotation, Qualifier, TaxonRelation};

pub const NCBI_TAXON_PREFIX: &str = "NCBITaxon:";
pub const TAXON_PREFIX: &str = "taxon:";

fn split_trimmed<'a>(s: &'a str, separators: &'a [char]) -> impl Iterator<Item = &'a str> {
    s.split(separators).map(str::trim).filter(|t| !t.is_empty())
}

// ============================================================================
// Lists
// ============================================================================

/// Pipe-separated list (references, synonyms, xrefs)
pub fn parse_list(s: &str) -> Vec<String> {
    split_trimmed(s, &['|']).map(String::from).collect()
}

pub fn build_list(items: &[String]) -> String {
    join_non_empty(items.iter().map(String::as_str), "|")
}

fn join_non_empty<'a>(items: impl Iterator<Item = &'a str>, separator: &str) -> String {
    items
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

// ============================================================================
// Qualifier
// ============================================================================

/// Qualifier tokens, split on `|` or `,`
pub fn parse_qualifier(s: &str) -> Qualifier {
    let raw = s.trim();
    Qualifier::new(raw, split_trimmed(raw, &['|', ',']).map(String::from).collect())
}

/// GAF keeps only the recognized qualifier flags
pub fn build_gaf_qualifier(qualifier: &Qualifier) -> String {
    const GAF_TOKENS: [&str; 4] = [
        Qualifier::NOT,
        Qualifier::CONTRIBUTES_TO,
        Qualifier::COLOCALIZES_WITH,
        Qualifier::INTEGRAL_TO,
    ];
    join_non_empty(
        qualifier
            .tokens
            .iter()
            .map(String::as_str)
            .filter(|t| GAF_TOKENS.contains(t)),
        "|",
    )
}

/// GPAD always states a relation: the tokens if they name one, else
/// `NOT|relation` / `relation` from the annotation's relation
pub fn build_gpad_qualifier(annotation: &GeneAnnotation) -> String {
    let qualifier = &annotation.qualifier;
    let names_relation = qualifier.tokens.iter().any(|t| t != Qualifier::NOT);
    if names_relation {
        return join_non_empty(qualifier.tokens.iter().map(String::as_str), "|");
    }

    let relation = annotation.relation.as_deref().unwrap_or_default();
    if qualifier.is_negated() {
        join_non_empty([Qualifier::NOT, relation].into_iter(), "|")
    } else {
        relation.trim().to_string()
    }
}

// ============================================================================
// With / From
// ============================================================================

/// With/From entries split on `|` or `,`; duplicates dropped, first wins
pub fn parse_with(s: &str) -> Vec<String> {
    let mut infos: Vec<String> = Vec::new();
    for token in split_trimmed(s, &['|', ',']) {
        if !infos.iter().any(|existing| existing == token) {
            infos.push(token.to_string());
        }
    }
    infos
}

pub fn build_with(infos: &[String]) -> String {
    build_list(infos)
}

// ============================================================================
// Annotation Extensions
// ============================================================================

/// `rel(CLS),rel(CLS)|rel(CLS)`: groups are OR, members AND
pub fn parse_extensions(s: &str) -> Vec<Vec<ExtensionExpression>> {
    split_trimmed(s, &['|'])
        .map(|group| {
            split_trimmed(group, &[','])
                .filter_map(parse_extension_expression)
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Split on the first `(` and its matching `)`; `None` if either is missing
/// or the relation is empty
pub fn parse_extension_expression(token: &str) -> Option<ExtensionExpression> {
    let open = token.find('(')?;
    if open == 0 {
        return None;
    }

    let mut depth = 0usize;
    let mut close = None;
    for (offset, c) in token[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + offset);
                    break;
                }
            }
            _ => {}
        }
    }

    let close = close?;
    let relation = token[..open].trim();
    let cls = token[open + 1..close].trim();
    if relation.is_empty() || cls.is_empty() {
        return None;
    }
    Some(ExtensionExpression::new(relation, cls))
}

pub fn build_extensions(groups: &[Vec<ExtensionExpression>]) -> String {
    groups
        .iter()
        .filter(|group| !group.is_empty())
        .map(|group| {
            group
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("|")
}

// ============================================================================
// Taxa
// ============================================================================

/// `taxon:9606` (or a bare `9606`) -> `NCBITaxon:9606`
pub fn normalize_taxon(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        return String::new();
    }
    let id = s.split_once(':').map_or(s, |(_, id)| id);
    format!("{}{}", NCBI_TAXON_PREFIX, id.trim())
}

/// `NCBITaxon:9606` -> `taxon:9606`
pub fn build_taxon(taxon: &str) -> String {
    let taxon = taxon.trim();
    if taxon.is_empty() {
        return String::new();
    }
    let id = taxon
        .strip_prefix(NCBI_TAXON_PREFIX)
        .or_else(|| taxon.strip_prefix(TAXON_PREFIX))
        .unwrap_or(taxon);
    format!("{}{}", TAXON_PREFIX, id)
}

/// `taxon:10090` or `part_of(taxon:10090)`
pub fn parse_taxon_relation(s: &str) -> Option<TaxonRelation> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match parse_extension_expression(s) {
        Some(expr) => Some(TaxonRelation::new(normalize_taxon(&expr.cls), Some(expr.relation))),
        None if s.contains('(') => None,
        None => Some(TaxonRelation::new(normalize_taxon(s), None)),
    }
}

pub fn build_taxon_relation(taxon: &TaxonRelation) -> String {
    let id = build_taxon(&taxon.taxon);
    match &taxon.relation {
        Some(relation) if !relation.is_empty() => format!("{}({})", relation, id),
        _ => id,
    }
}

/// GAF column 13: entity taxon, optionally followed by `|taxon:ID` for the
/// interacting taxon
pub fn parse_gaf_taxa(s: &str) -> (String, Option<TaxonRelation>) {
    let mut taxa = split_trimmed(s, &['|']);
    let entity_taxon = taxa.next().map(normalize_taxon).unwrap_or_default();
    let acts_on = taxa.next().and_then(parse_taxon_relation);
    (entity_taxon, acts_on)
}

pub fn build_gaf_taxa(entity_taxon: &str, acts_on: Option<&TaxonRelation>) -> String {
    let mut column = build_taxon(entity_taxon);
    if let Some(acts_on) = acts_on {
        let other = build_taxon(&acts_on.taxon);
        if !other.is_empty() {
            column.push('|');
            column.push_str(&other);
        }
    }
    column
}

// ============================================================================
// Properties
// ============================================================================

/// `key=value|key=value`; pairs without both a key and a value are skipped
pub fn parse_properties(s: &str) -> Vec<(String, String)> {
    split_trimmed(s, &['|'])
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let (key, value) = (key.trim(), value.trim());
            (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

pub fn build_properties(properties: &[(String, String)]) -> String {
    properties
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("|")
}

/// Split a composite `DB:LocalID` into its parts
pub fn split_identifier(id: &str) -> Option<(&str, &str)> {
    let (db, local) = id.split_once(':')?;
    (!db.is_empty() && !local.is_empty()).then_some((db, local))
}
