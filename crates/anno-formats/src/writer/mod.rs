//! GAF, GPAD and GPI writers
//!
//! Writers walk the same [`Schema`] the reader validates against, so every
//! emitted row has exactly the column count of the target version. Output
//! created through `create` is gzip-compressed when the path ends in `.gz`.
//!
//! `write_document` consumes the writer; the underlying output is finished
//! (gzip trailer included) and dropped whether or not writing succeeded, and
//! a failure to finish it is returned.
//!
//! [`Schema`]: crate::schema::Schema

mod gaf;
mod gpad;
mod gpi;

pub use gaf::GafWriter;
pub use gpad::GpadWriter;
pub use gpi::GpiWriter;

use crate::fields::split_identifier;
use crate::io::FinishWrite;
use crate::models::GeneAnnotation;
use crate::schema::{Format, FormatVersion, Schema};
use anno_common::Result;
use std::io::Write;

/// Version declaration followed by `!`-prefixed comments
pub(crate) fn write_header<W: Write>(
    out: &mut W,
    format: Format,
    version: FormatVersion,
    comments: &[String],
) -> Result<()> {
    writeln!(out, "!{}", format.version_header(version))?;
    write_comments(out, comments)
}

pub(crate) fn write_comments<W: Write>(out: &mut W, comments: &[String]) -> Result<()> {
    for comment in comments {
        writeln!(out, "!{}", comment.trim_end_matches(['\n', '\r']))?;
    }
    Ok(())
}

/// One tab-separated row; the column count must match the schema
pub(crate) fn write_row<W: Write>(out: &mut W, schema: &Schema, columns: &[String]) -> Result<()> {
    debug_assert_eq!(columns.len(), schema.column_count());
    let cleaned: Vec<String> = columns.iter().map(|c| clean(c)).collect();
    writeln!(out, "{}", cleaned.join("\t"))?;
    Ok(())
}

/// Tabs and line breaks inside a value would shift columns
fn clean(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

/// End `out` even when `result` is an error; the first error wins
pub(crate) fn finish<W: FinishWrite>(out: &mut W, result: Result<()>) -> Result<()> {
    let finished = out.try_finish();
    result?;
    finished?;
    Ok(())
}

/// DB and local ID of the annotated entity, from the resolved object if
/// present, else from `bioentity_id`
pub(crate) fn entity_parts(annotation: &GeneAnnotation) -> Option<(String, String)> {
    if let Some(entity) = &annotation.bioentity {
        if !entity.db.is_empty() {
            return Some((entity.db.clone(), entity.local_id().to_string()));
        }
    }
    split_identifier(&annotation.bioentity_id).map(|(db, local)| (db.to_string(), local.to_string()))
}
