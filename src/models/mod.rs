//! Domain models for bookvault.
//!
//! The whole application state is a single [`Document`]: the book list,
//! user-defined groups and genres, and per-user settings. Clients never
//! address individual books over the wire — they send a [`DocumentPatch`]
//! and the store merges it into the live document.
//!
//! [`BackupInfo`] describes one on-disk snapshot of a past document
//! serialization.

mod backup;
mod document;

pub use backup::*;
pub use document::*;
