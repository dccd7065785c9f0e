//! Column layouts and header grammar for GAF, GPAD and GPI
//!
//! A [`Schema`] is the ordered list of [`Field`]s for one format version. The
//! reader uses it to validate and address columns, the writers walk the same
//! list to emit them, so a field can never be decoded from one position and
//! encoded at another.

use anno_common::{AnnoError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d+))?$").ok());

// ============================================================================
// Format and Version
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Gaf,
    Gpad,
    Gpi,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Gaf => "GAF",
            Format::Gpad => "GPAD",
            Format::Gpi => "GPI",
        }
    }

    /// Version assumed until a header declares one (or when it is malformed)
    pub fn default_version(self) -> FormatVersion {
        match self {
            Format::Gaf => FormatVersion::new(2, 0),
            Format::Gpad | Format::Gpi => FormatVersion::new(1, 1),
        }
    }

    /// Header keywords that declare the version, preferred spelling first
    fn version_keywords(self) -> &'static [&'static str] {
        match self {
            Format::Gaf => &["gaf-version"],
            Format::Gpad => &["gpa-version", "gpad-version"],
            Format::Gpi => &["gpi-version"],
        }
    }

    /// Header line written at the top of an output file
    pub fn version_header(self, version: FormatVersion) -> String {
        format!("{}: {}", self.version_keywords()[0], version)
    }

    pub fn schema(self, version: FormatVersion) -> Schema {
        let fields: &'static [Field] = match self {
            Format::Gaf if version < FormatVersion::new(2, 0) => GAF_1_FIELDS,
            Format::Gaf => GAF_2_FIELDS,
            Format::Gpad => GPAD_FIELDS,
            Format::Gpi if version < FormatVersion::new(1, 2) => GPI_1_1_FIELDS,
            Format::Gpi => GPI_1_2_FIELDS,
        };
        Schema {
            format: self,
            version,
            fields,
        }
    }

    /// Recognize a header metadata line (`!gaf-version: 2.0`, `!namespace: MGI`)
    ///
    /// `body` is the text after the leading `!`. Returns `None` for plain
    /// comments, including keyword lines with an empty value.
    pub fn parse_header(self, body: &str) -> Option<HeaderDeclaration> {
        let body = body.trim();
        for keyword in self.version_keywords() {
            if let Some(value) = header_value(body, keyword) {
                return Some(HeaderDeclaration::Version(value.parse()));
            }
        }
        if self == Format::Gpi {
            if let Some(value) = header_value(body, "namespace") {
                return Some(HeaderDeclaration::Namespace(value.to_string()));
            }
        }
        None
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn header_value<'a>(body: &'a str, keyword: &str) -> Option<&'a str> {
    let value = body.strip_prefix(keyword)?.trim_start().strip_prefix(':')?.trim();
    (!value.is_empty()).then_some(value)
}

/// A header metadata declaration
#[derive(Debug)]
pub enum HeaderDeclaration {
    Version(Result<FormatVersion>),
    Namespace(String),
}

/// `major.minor` format version; "2" parses as 2.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u16,
    pub minor: u16,
}

impl FormatVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        FormatVersion { major, minor }
    }
}

impl FromStr for FormatVersion {
    type Err = AnnoError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnnoError::InvalidVersion(s.to_string());
        let caps = VERSION_PATTERN
            .as_ref()
            .and_then(|pattern| pattern.captures(s.trim()))
            .ok_or_else(invalid)?;

        let major = caps[1].parse().map_err(|_| invalid())?;
        let minor = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(FormatVersion::new(major, minor))
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Db,
    DbObjectId,
    DbObjectSymbol,
    Qualifier,
    GoId,
    Reference,
    EvidenceCode,
    With,
    Aspect,
    DbObjectName,
    DbObjectSynonym,
    DbObjectType,
    Taxon,
    Date,
    AssignedBy,
    AnnotationExtension,
    GeneProductFormId,
    InteractingTaxonId,
    AnnotationProperties,
    ParentObjectId,
    DbXrefs,
    GeneProductProperties,
}

const GAF_1_FIELDS: &[Field] = &[
    Field::Db,
    Field::DbObjectId,
    Field::DbObjectSymbol,
    Field::Qualifier,
    Field::GoId,
    Field::Reference,
    Field::EvidenceCode,
    Field::With,
    Field::Aspect,
    Field::DbObjectName,
    Field::DbObjectSynonym,
    Field::DbObjectType,
    Field::Taxon,
    Field::Date,
    Field::AssignedBy,
];

const GAF_2_FIELDS: &[Field] = &[
    Field::Db,
    Field::DbObjectId,
    Field::DbObjectSymbol,
    Field::Qualifier,
    Field::GoId,
    Field::Reference,
    Field::EvidenceCode,
    Field::With,
    Field::Aspect,
    Field::DbObjectName,
    Field::DbObjectSynonym,
    Field::DbObjectType,
    Field::Taxon,
    Field::Date,
    Field::AssignedBy,
    Field::AnnotationExtension,
    Field::GeneProductFormId,
];

const GPAD_FIELDS: &[Field] = &[
    Field::Db,
    Field::DbObjectId,
    Field::Qualifier,
    Field::GoId,
    Field::Reference,
    Field::EvidenceCode,
    Field::With,
    Field::InteractingTaxonId,
    Field::Date,
    Field::AssignedBy,
    Field::AnnotationExtension,
    Field::AnnotationProperties,
];

const GPI_1_1_FIELDS: &[Field] = &[
    Field::DbObjectId,
    Field::DbObjectSymbol,
    Field::DbObjectName,
    Field::DbObjectSynonym,
    Field::DbObjectType,
    Field::Taxon,
    Field::ParentObjectId,
    Field::DbXrefs,
    Field::GeneProductProperties,
];

const GPI_1_2_FIELDS: &[Field] = &[
    Field::Db,
    Field::DbObjectId,
    Field::DbObjectSymbol,
    Field::DbObjectName,
    Field::DbObjectSynonym,
    Field::DbObjectType,
    Field::Taxon,
    Field::ParentObjectId,
    Field::DbXrefs,
    Field::GeneProductProperties,
];

// ============================================================================
// Schema
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub format: Format,
    pub version: FormatVersion,
    fields: &'static [Field],
}

impl Schema {
    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Required column count
    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|&f| f == field)
    }
}
