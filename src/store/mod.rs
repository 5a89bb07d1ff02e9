mod error;
pub mod merge;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use chrono::Utc;
use tempfile::NamedTempFile;

use crate::models::{BackupInfo, Document};

pub use error::StoreError;

/// Name of the live document file inside the data directory.
pub const DATA_FILE_NAME: &str = "books_data.json";

/// Rotation snapshots are `backup_<YYYY-MM-DD_HH-MM-SS>.json` in the backup
/// directory. Pre-save and pre-restore copies use sibling names of the data
/// file instead, so the rotation pass never touches them.
const BACKUP_PREFIX: &str = "backup_";
const BACKUP_SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Rotation snapshots retained after a rotation pass.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Directory writability report for the connectivity endpoint.
#[derive(Debug, Clone, Copy)]
pub struct StoreHealth {
    pub data_dir_writable: bool,
    pub backup_dir_writable: bool,
}

/// File-backed store for the single book-tracking document and its backups.
///
/// The document file is the single source of truth: every [`load`] re-reads
/// it from disk, and writers publish a complete new file via temp-file +
/// rename, so readers observe either the previous or the new content but
/// never a torn write. An in-process write lock serializes save, backup and
/// restore against each other.
///
/// [`load`]: Store::load
#[derive(Clone)]
pub struct Store {
    data_dir: PathBuf,
    backup_dir: PathBuf,
    max_backups: usize,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    pub fn open(data_dir: PathBuf, backup_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backup_dir)?;
        Ok(Self {
            data_dir,
            backup_dir,
            max_backups: DEFAULT_MAX_BACKUPS,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = directories::ProjectDirs::from("", "", "bookvault").ok_or_else(|| {
            StoreError::NotFound("could not determine data directory".to_string())
        })?;
        let data_dir = dirs.data_dir().to_path_buf();
        let backup_dir = data_dir.join("backups");
        Self::open(data_dir, backup_dir)
    }

    /// Override the rotation retention cap (default 10).
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Path of the live document file.
    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE_NAME)
    }

    pub fn health(&self) -> StoreHealth {
        StoreHealth {
            data_dir_writable: dir_writable(&self.data_dir),
            backup_dir_writable: dir_writable(&self.backup_dir),
        }
    }

    // ============================================================
    // Document operations
    // ============================================================

    /// Load the live document. Never fails: a missing file initializes and
    /// persists a default document, and unreadable or unparsable content
    /// degrades to the default.
    ///
    /// An unparsable file is left on disk untouched so the corrupt data
    /// stays available for manual recovery.
    pub fn load(&self) -> Document {
        let data_file = self.data_file();
        if !data_file.exists() {
            let mut doc = Document::default();
            if let Err(e) = self.save(&mut doc) {
                tracing::error!("failed to persist initial document: {e}");
            }
            return doc;
        }

        let content = match fs::read_to_string(&data_file) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("failed to read document file: {e}");
                return Document::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("failed to parse document file: {e}");
                Document::default()
            }
        }
    }

    /// Persist `doc`, stamping `lastModified` first.
    ///
    /// Two phases: if a previous file exists it is copied to a timestamped
    /// sibling (best-effort — a failed copy logs a warning and the save
    /// proceeds), then the new content is published atomically. Returns the
    /// byte length written.
    pub fn save(&self, doc: &mut Document) -> Result<usize, StoreError> {
        doc.last_modified = Utc::now();

        let json = match serde_json::to_string_pretty(doc) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("failed to serialize document: {e}");
                return Err(e.into());
            }
        };

        let _guard = self.write_lock.lock().expect("store write lock poisoned");

        let data_file = self.data_file();
        if data_file.exists() {
            let copy = self.data_file_sibling(&format!("backup_{}", timestamp()));
            if let Err(e) = fs::copy(&data_file, &copy) {
                tracing::warn!("pre-save copy of previous document failed: {e}");
            }
        }

        match self.publish(json.as_bytes()) {
            Ok(()) => {
                tracing::info!("document saved ({} bytes)", json.len());
                Ok(json.len())
            }
            Err(e) => {
                tracing::error!("failed to save document: {e}");
                Err(e)
            }
        }
    }

    /// Write `bytes` to a temp file in the data directory and rename it over
    /// the document file.
    fn publish(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(&self.data_dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(self.data_file())
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    // ============================================================
    // Backup operations
    // ============================================================

    /// Snapshot the current document file into the backup directory, then
    /// rotate old snapshots down to the retention cap.
    pub fn create_backup(&self) -> Result<BackupInfo, StoreError> {
        let _guard = self.write_lock.lock().expect("store write lock poisoned");

        let data_file = self.data_file();
        if !data_file.exists() {
            return Err(StoreError::NotFound("no document to back up".to_string()));
        }

        // Second-resolution stamps collide when backups run back to back;
        // a zero-padded suffix keeps each snapshot distinct and keeps
        // filename lexical order equal to creation order.
        let stamp = timestamp();
        let mut filename = format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}");
        let mut n = 1;
        while self.backup_dir.join(&filename).exists() {
            n += 1;
            filename = format!("{BACKUP_PREFIX}{stamp}_{n:02}{BACKUP_SUFFIX}");
        }

        let path = self.backup_dir.join(&filename);
        if let Err(e) = fs::copy(&data_file, &path) {
            tracing::error!("backup copy failed: {e}");
            return Err(e.into());
        }

        let meta = fs::metadata(&path)?;
        self.rotate()?;

        tracing::info!("backup created: {filename} ({} bytes)", meta.len());
        Ok(BackupInfo {
            filename,
            size: meta.len(),
            created: meta.modified()?.into(),
        })
    }

    /// All rotation snapshots, newest first. An empty list is not an error.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, StoreError> {
        let mut snapshots = self.rotation_snapshots()?;
        snapshots.sort_by(|a, b| (b.modified, &b.filename).cmp(&(a.modified, &a.filename)));
        Ok(snapshots
            .into_iter()
            .map(|s| BackupInfo {
                filename: s.filename,
                size: s.size,
                created: s.modified.into(),
            })
            .collect())
    }

    /// Make the named snapshot the live document.
    ///
    /// The current document file, if any, is first preserved as a
    /// `before_restore` sibling of the data file — outside the rotation
    /// namespace, so it is never auto-pruned. A failed safety copy aborts
    /// the restore rather than risk the only live copy.
    ///
    /// The snapshot content is published before it is validated; if it does
    /// not parse as a document the restore fails with
    /// [`StoreError::CorruptSnapshot`] and the bad content stays live.
    pub fn restore(&self, filename: &str) -> Result<Document, StoreError> {
        // Snapshots live flat in the backup directory; a name with path
        // components can never denote one.
        if filename.contains(['/', '\\']) || filename == ".." {
            return Err(StoreError::NotFound(format!("backup not found: {filename}")));
        }

        let _guard = self.write_lock.lock().expect("store write lock poisoned");

        let backup_path = self.backup_dir.join(filename);
        if !backup_path.exists() {
            return Err(StoreError::NotFound(format!("backup not found: {filename}")));
        }

        let data_file = self.data_file();
        if data_file.exists() {
            let safety = self.data_file_sibling(&format!("before_restore_{}", timestamp()));
            fs::copy(&data_file, &safety)?;
        }

        fs::copy(&backup_path, &data_file)?;

        let content = fs::read_to_string(&data_file)?;
        let doc = serde_json::from_str(&content).map_err(|e| {
            tracing::error!("restored snapshot {filename} failed validation: {e}");
            StoreError::CorruptSnapshot {
                filename: filename.to_string(),
                source: e,
            }
        })?;

        tracing::info!("backup restored: {filename}");
        Ok(doc)
    }

    /// Delete the oldest rotation snapshots beyond the retention cap.
    /// Modification time ascending, filename as tiebreak (names encode the
    /// creation timestamp, so the tiebreak equals creation order).
    fn rotate(&self) -> Result<(), StoreError> {
        let mut snapshots = self.rotation_snapshots()?;
        if snapshots.len() <= self.max_backups {
            return Ok(());
        }

        snapshots.sort_by(|a, b| (a.modified, &a.filename).cmp(&(b.modified, &b.filename)));
        let excess = snapshots.len() - self.max_backups;
        for snapshot in &snapshots[..excess] {
            fs::remove_file(self.backup_dir.join(&snapshot.filename))?;
            tracing::debug!("rotated out old backup: {}", snapshot.filename);
        }
        Ok(())
    }

    fn rotation_snapshots(&self) -> Result<Vec<SnapshotEntry>, StoreError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !filename.starts_with(BACKUP_PREFIX) || !filename.ends_with(BACKUP_SUFFIX) {
                continue;
            }
            let meta = entry.metadata()?;
            entries.push(SnapshotEntry {
                filename,
                size: meta.len(),
                modified: meta.modified()?,
            });
        }
        Ok(entries)
    }

    /// Sibling of the data file named `<data-file>.<suffix>`, used for
    /// pre-save and pre-restore copies.
    fn data_file_sibling(&self, suffix: &str) -> PathBuf {
        self.data_dir.join(format!("{DATA_FILE_NAME}.{suffix}"))
    }
}

struct SnapshotEntry {
    filename: String,
    size: u64,
    modified: SystemTime,
}

fn timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

fn dir_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir).is_ok()
}
