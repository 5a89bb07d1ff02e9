use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format tag written into every persisted document.
pub const DOCUMENT_VERSION: &str = "1.0";

/// The single persisted record holding all application data.
///
/// Books and groups are opaque to the server: whatever JSON the client sends
/// is stored and returned verbatim, so the frontend can evolve its record
/// shape without a server change. Only the top-level structure is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub books: Vec<Value>,
    pub groups: Vec<Value>,
    #[serde(rename = "customGenres")]
    pub custom_genres: Vec<String>,
    pub settings: Settings,
    /// Set to the current time on every successful save.
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
    pub version: String,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            books: Vec::new(),
            groups: Vec::new(),
            custom_genres: Vec::new(),
            settings: Settings::default(),
            last_modified: Utc::now(),
            version: DOCUMENT_VERSION.to_string(),
        }
    }
}

/// Per-user options.
///
/// Recognized keys are `theme` (string, default `"default"`) and
/// `autoBackup` (boolean, default `true`), but the map deliberately stays
/// untyped: updates overwrite keys wholesale and unknown keys round-trip
/// untouched, so older servers never strip options written by newer clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub Map<String, Value>);

impl Default for Settings {
    fn default() -> Self {
        let mut map = Map::new();
        map.insert("theme".to_string(), Value::String("default".to_string()));
        map.insert("autoBackup".to_string(), Value::Bool(true));
        Self(map)
    }
}

impl Settings {
    /// Shallow key-merge: every key in `patch` overwrites the current value,
    /// keys absent from `patch` are preserved, new keys are added.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.0.insert(key, value);
        }
    }
}

/// Partial update for a [`Document`]. All fields are optional; absent fields
/// leave the current value untouched.
///
/// `books`, `groups` and `customGenres` replace the whole collection when
/// present — clients remove a book by resending the list without it.
/// `settings` is key-merged. Unknown top-level fields in the payload are
/// dropped by serde and never reach the persisted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub books: Option<Vec<Value>>,
    pub groups: Option<Vec<Value>>,
    #[serde(rename = "customGenres")]
    pub custom_genres: Option<Vec<String>>,
    pub settings: Option<Map<String, Value>>,
}
