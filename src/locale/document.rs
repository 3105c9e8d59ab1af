//! Locale document input definitions.
//!
//! One document per (language, namespace) pair, stored as
//! `locales/<langCode>/<namespace>.json`.

use std::path::{
    Path,
    PathBuf,
};

use serde_json::Value;
use thiserror::Error;

use crate::classify::Script;
use crate::types::{
    KeyPath,
    PathSegment,
};

/// Errors raised while reading or writing a locale document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// File could not be read or written.
    #[error("failed to access locale file {path}: {source}")]
    Io {
        /// Offending file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// File content is not well-formed JSON.
    #[error("malformed JSON in {path}: {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Directory names that never count as a namespace.
const COMMON_PARENTS: [&str; 4] = ["locales", "messages", "translations", "i18n"];

/// Detect the language code from a locale file path.
///
/// Splits the path by `/` and `.` and searches backwards for a part that is
/// a supported language tag.
///
/// # Examples
/// - `locales/hi/forms.json` → `hi`
/// - `locales/ta.json` → `ta`
///
/// # Returns
/// Detected language code or "unknown".
#[must_use]
pub fn detect_language_from_path(file_path: &Path) -> String {
    let path_str = file_path.to_string_lossy();
    let parts: Vec<&str> = path_str.split(['/', '.']).collect();

    for part in parts.iter().rev() {
        if Script::for_language(part).is_some() {
            return (*part).to_string();
        }
    }

    "unknown".to_string()
}

/// Detect the namespace from a locale file path.
///
/// The file stem is the namespace unless it is itself a language code, in
/// which case the parent directory is used (unless it is a language code or
/// a common container directory).
///
/// # Examples
/// - `locales/hi/forms.json` → `Some("forms")`
/// - `locales/forms/hi.json` → `Some("forms")`
/// - `locales/hi.json` → `None`
#[must_use]
pub fn detect_namespace_from_path(file_path: &Path) -> Option<String> {
    let file_stem = file_path.file_stem()?.to_string_lossy().to_string();

    if Script::for_language(&file_stem).is_none() {
        return Some(file_stem);
    }

    let parent = file_path.parent()?;
    let parent_name = parent.file_name()?.to_string_lossy().to_string();

    if Script::for_language(&parent_name).is_none()
        && !COMMON_PARENTS.contains(&parent_name.to_lowercase().as_str())
    {
        return Some(parent_name);
    }

    None
}

/// One namespace of one language, held in memory as a JSON tree.
///
/// Loaded at batch start, mutated by the merge engine, persisted back by
/// overwriting the same storage location. Each run owns the tree
/// exclusively for its duration; there is no file locking, so runs must be
/// serialized by the caller.
#[derive(Debug, Clone)]
pub struct LocaleDocument {
    /// Language tag detected from the file path (e.g. "hi").
    pub language: String,
    /// Namespace detected from the file path (e.g. "forms").
    pub namespace: String,
    /// Where the document was loaded from and is saved back to.
    pub path: PathBuf,
    /// The document tree.
    root: Value,
}

impl LocaleDocument {
    /// Loads a locale document from disk.
    ///
    /// # Errors
    /// [`DocumentError::Io`] if the file cannot be read,
    /// [`DocumentError::Parse`] if it is not well-formed JSON.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| DocumentError::Io { path: path.to_path_buf(), source })?;

        let root: Value = serde_json::from_str(&content)
            .map_err(|source| DocumentError::Parse { path: path.to_path_buf(), source })?;

        let language = detect_language_from_path(path);
        let namespace =
            detect_namespace_from_path(path).unwrap_or_else(|| "default".to_string());

        tracing::debug!(path = %path.display(), %language, %namespace, "Loaded locale document");

        Ok(Self { language, namespace, path: path.to_path_buf(), root })
    }

    /// Builds a document from an in-memory tree (used by the merge engine
    /// and in tests).
    #[must_use]
    pub fn from_value(
        language: impl Into<String>,
        namespace: impl Into<String>,
        root: Value,
    ) -> Self {
        Self {
            language: language.into(),
            namespace: namespace.into(),
            path: PathBuf::new(),
            root,
        }
    }

    /// The document tree.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// Replaces the whole tree (merge write-back).
    pub fn replace_root(&mut self, root: Value) {
        self.root = root;
    }

    /// Looks up the value at `path`, if present.
    #[must_use]
    pub fn leaf_at(&self, path: &KeyPath) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = match segment {
                PathSegment::Key(key) => current.get(key)?,
                PathSegment::Index(index) => current.get(index)?,
            };
        }
        Some(current)
    }

    /// Sets the value at `path`, creating intermediate objects (and padding
    /// arrays with `null`) as needed.
    pub fn set_leaf(&mut self, path: &KeyPath, value: Value) {
        set_in(&mut self.root, path.segments(), value);
    }

    /// Persists the document back to its storage location, pretty-printed.
    ///
    /// # Errors
    /// [`DocumentError::Io`] if the file cannot be written.
    pub fn save(&self) -> Result<(), DocumentError> {
        let mut rendered = serde_json::to_string_pretty(&self.root)
            .map_err(|source| DocumentError::Parse { path: self.path.clone(), source })?;
        rendered.push('\n');

        std::fs::write(&self.path, rendered)
            .map_err(|source| DocumentError::Io { path: self.path.clone(), source })?;

        tracing::debug!(path = %self.path.display(), "Saved locale document");
        Ok(())
    }
}

/// Recursive insertion helper for [`LocaleDocument::set_leaf`].
fn set_in(current: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *current = value;
        return;
    };

    match head {
        PathSegment::Key(key) => {
            if !current.is_object() {
                *current = Value::Object(serde_json::Map::new());
            }
            if let Some(map) = current.as_object_mut() {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                set_in(slot, rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !current.is_array() {
                *current = Value::Array(Vec::new());
            }
            if let Some(items) = current.as_array_mut() {
                while items.len() <= *index {
                    items.push(Value::Null);
                }
                if let Some(slot) = items.get_mut(*index) {
                    set_in(slot, rest, value);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;
    use std::path::Path;

    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    // Standard layout: language directory, namespace file
    #[case("locales/hi/forms.json", "hi")]
    #[case("locales/ta/home.json", "ta")]
    #[case("public/locales/ur/contact.json", "ur")]
    // Single-file layout
    #[case("locales/bn.json", "bn")]
    // Not a supported tag
    #[case("locales/fr/forms.json", "unknown")]
    fn test_detect_language_from_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(detect_language_from_path(Path::new(path)), expected);
    }

    #[rstest]
    #[case("locales/hi/forms.json", Some("forms"))]
    #[case("locales/forms/hi.json", Some("forms"))]
    #[case("locales/hi.json", None)]
    #[case("i18n/ml.json", None)]
    fn test_detect_namespace_from_path(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(detect_namespace_from_path(Path::new(path)).as_deref(), expected);
    }

    #[rstest]
    fn load_detects_language_and_namespace() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("locales").join("hi");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("forms.json");
        fs::write(&path, r#"{"title": "नमस्ते"}"#).unwrap();

        let doc = LocaleDocument::load(&path).unwrap();

        assert_that!(doc.language, eq("hi"));
        assert_that!(doc.namespace, eq("forms"));
        assert_that!(doc.leaf_at(&KeyPath::root().child("title")), some(eq(&json!("नमस्ते"))));
    }

    #[rstest]
    fn load_rejects_malformed_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("en.json");
        fs::write(&path, "not json").unwrap();

        let result = LocaleDocument::load(&path);

        assert!(matches!(result, Err(DocumentError::Parse { .. })));
    }

    #[rstest]
    fn set_leaf_creates_intermediate_objects() {
        let mut doc = LocaleDocument::from_value("hi", "forms", json!({}));

        doc.set_leaf(&KeyPath::root().child("a").child("b"), json!("value"));

        assert_that!(doc.root(), eq(&json!({ "a": { "b": "value" } })));
    }

    #[rstest]
    fn set_leaf_pads_arrays_with_null() {
        let mut doc = LocaleDocument::from_value("hi", "forms", json!({}));

        doc.set_leaf(&KeyPath::root().child("items").index(2), json!("third"));

        assert_that!(doc.root(), eq(&json!({ "items": [null, null, "third"] })));
    }

    #[rstest]
    fn save_round_trips() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("locales").join("ta");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("home.json");
        fs::write(&path, r#"{"x": "original"}"#).unwrap();

        let mut doc = LocaleDocument::load(&path).unwrap();
        doc.set_leaf(&KeyPath::root().child("x"), json!("changed"));
        doc.save().unwrap();

        let reloaded = LocaleDocument::load(&path).unwrap();
        assert_that!(reloaded.leaf_at(&KeyPath::root().child("x")), some(eq(&json!("changed"))));
    }
}
