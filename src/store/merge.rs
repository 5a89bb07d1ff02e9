//! Field-level application of a [`DocumentPatch`] onto a [`Document`].
//!
//! This is intentionally not a deep merge. Collections are replaced
//! wholesale when present in the patch — clients rely on that to delete
//! entries by omission. Only `settings` is key-merged, one level deep.

use crate::models::{Document, DocumentPatch};

/// Apply `patch` to `doc`. Fields absent from the patch are left untouched.
///
/// Book entries are stored as given; the store does not validate their
/// shape.
pub fn apply_patch(doc: &mut Document, patch: DocumentPatch) {
    if let Some(books) = patch.books {
        doc.books = books;
    }
    if let Some(groups) = patch.groups {
        doc.groups = groups;
    }
    if let Some(genres) = patch.custom_genres {
        doc.custom_genres = genres;
    }
    if let Some(settings) = patch.settings {
        doc.settings.merge(settings);
    }
}
