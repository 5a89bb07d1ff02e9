//! bookvault — a personal book-tracking server backed by a single JSON
//! document.
//!
//! All application data lives in one document file on disk; clients update
//! it by sending partial patches that are merged field by field. Every save
//! keeps a copy of the previous version, explicit backups are rotated down
//! to a retention cap, and any backup can be restored with a pre-restore
//! safety copy of the live document.

pub mod api;
pub mod models;
pub mod store;
