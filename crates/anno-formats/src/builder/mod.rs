//! Document builders
//!
//! - [`GafDocumentBuilder`]: GAF file to [`AnnotationDocument`], optionally
//!   in fixed-size chunks
//! - [`GpadGpiBuilder`]: GPI file to [`BioentityDocument`], then GPAD file to
//!   an [`AnnotationDocument`] whose annotations reference the GPI entities
//!
//! [`AnnotationDocument`]: crate::models::AnnotationDocument
//! [`BioentityDocument`]: crate::models::BioentityDocument

mod gaf;
mod gpad_gpi;

pub use gaf::GafDocumentBuilder;
pub use gpad_gpi::GpadGpiBuilder;

use crate::reader::{ReaderState, Row};

/// Row predicate applied before a row is turned into model objects
///
/// Any `FnMut(&Row, &ReaderState) -> bool` closure is a filter.
pub trait RowFilter: Send {
    fn accept(&mut self, row: &Row, state: &ReaderState) -> bool;
}

impl<F> RowFilter for F
where
    F: FnMut(&Row, &ReaderState) -> bool + Send,
{
    fn accept(&mut self, row: &Row, state: &ReaderState) -> bool {
        self(row, state)
    }
}

/// Filters run in registration order and stop at the first rejection
pub(crate) fn accept_row(
    filters: &mut [Box<dyn RowFilter>],
    row: &Row,
    state: &ReaderState,
) -> bool {
    filters.iter_mut().all(|filter| filter.accept(row, state))
}

/// Relation implied by an aspect code
pub fn relation_for_aspect(aspect: &str) -> Option<&'static str> {
    match aspect {
        "F" => Some("enables"),
        "P" => Some("involved_in"),
        "C" => Some("part_of"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_for_aspect() {
        assert_eq!(relation_for_aspect("F"), Some("enables"));
        assert_eq!(relation_for_aspect("P"), Some("involved_in"));
        assert_eq!(relation_for_aspect("C"), Some("part_of"));
        assert_eq!(relation_for_aspect(""), None);
    }
}
