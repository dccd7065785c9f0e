// GPI writer (1.1 and 1.2)

use super::{finish, write_comments, write_row};
use crate::config::WriterConfig;
use crate::fields;
use crate::io::{create_output, FinishWrite, OutputFile};
use crate::models::{Bioentity, BioentityDocument};
use crate::schema::{Field, Format, FormatVersion, Schema};
use anno_common::Result;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Writes entities as GPI rows
///
/// Below 1.2 there is no DB column; the namespace is declared once in a
/// `!namespace:` header taken from the first entity.
pub struct GpiWriter<W: Write> {
    out: W,
    schema: Schema,
    rows_written: usize,
}

impl GpiWriter<OutputFile> {
    pub fn create(path: impl AsRef<Path>, config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        let out = create_output(path.as_ref(), config.compression_level)?;
        Ok(GpiWriter::new(out).with_version(config.gpi_version))
    }
}

impl<W: FinishWrite> GpiWriter<W> {
    pub fn new(out: W) -> Self {
        GpiWriter {
            out,
            schema: Format::Gpi.schema(Format::Gpi.default_version()),
            rows_written: 0,
        }
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.schema = Format::Gpi.schema(version);
        self
    }

    fn has_db_column(&self) -> bool {
        self.schema.index_of(Field::Db).is_some()
    }

    /// Version line, `!namespace:` (below 1.2, when given) and comments
    pub fn write_header(&mut self, namespace: Option<&str>, comments: &[String]) -> Result<()> {
        writeln!(self.out, "!{}", Format::Gpi.version_header(self.schema.version))?;
        if !self.has_db_column() {
            if let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) {
                writeln!(self.out, "!namespace: {}", namespace)?;
            }
        }
        write_comments(&mut self.out, comments)
    }

    pub fn write_bioentity(&mut self, entity: &Bioentity) -> Result<()> {
        let columns: Vec<String> = self
            .schema
            .fields()
            .iter()
            .map(|&field| gpi_column(entity, field))
            .collect();
        write_row(&mut self.out, &self.schema, &columns)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn write_document(mut self, document: &BioentityDocument) -> Result<()> {
        let result = self.write_all(document);
        finish(&mut self.out, result)?;
        info!(
            "Wrote GPI {} document {}: {} rows",
            self.schema.version, document.id, self.rows_written
        );
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.try_finish()?;
        Ok(self.out)
    }

    fn write_all(&mut self, document: &BioentityDocument) -> Result<()> {
        let entities: &[Arc<Bioentity>] = document.bioentities();
        let namespace = entities.first().map(|e| e.db.as_str());

        if !self.has_db_column() {
            if let Some(ns) = namespace {
                let foreign = entities.iter().filter(|e| e.db != ns).count();
                if foreign > 0 {
                    warn!(
                        "{} entities are not in namespace {} and lose their DB in GPI {}",
                        foreign, ns, self.schema.version
                    );
                }
            }
        }

        self.write_header(namespace, document.comments())?;
        for entity in entities {
            self.write_bioentity(entity)?;
        }
        Ok(())
    }
}

fn gpi_column(entity: &Bioentity, field: Field) -> String {
    match field {
        Field::Db => entity.db.clone(),
        Field::DbObjectId => entity.local_id().to_string(),
        Field::DbObjectSymbol => entity.symbol.clone(),
        Field::DbObjectName => entity.full_name.clone(),
        Field::DbObjectSynonym => fields::build_list(&entity.synonyms),
        Field::DbObjectType => entity.type_cls.clone(),
        Field::Taxon => fields::build_taxon(&entity.ncbi_taxon_id),
        Field::ParentObjectId => entity.parent_object_id.clone().unwrap_or_default(),
        Field::DbXrefs => fields::build_list(&entity.db_xrefs),
        Field::GeneProductProperties => fields::build_properties(&entity.properties),
        _ => String::new(),
    }
}
