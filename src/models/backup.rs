use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one on-disk snapshot of a past document serialization.
///
/// Snapshots are immutable once written; the retention pass deletes whole
/// files, never rewrites them. The filename encodes the creation timestamp
/// at second resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    /// Size of the snapshot file in bytes.
    pub size: u64,
    /// Creation time, taken from the file's modification time.
    pub created: DateTime<Utc>,
}
