//! Shared, versioned translation glossary.
//!
//! 用語集は (原文, 言語コード) で引く一枚の JSON 表。
//! 各スクリプトに散在していた手書きの対訳表を一本化したもの。

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Errors raised while loading a glossary file.
#[derive(Error, Debug)]
pub enum GlossaryError {
    /// File exists but could not be read.
    #[error("failed to read glossary {path}: {source}")]
    Io {
        /// Offending file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// File content is not a well-formed glossary document.
    #[error("malformed glossary {path}: {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Current glossary document version.
const fn default_version() -> u32 {
    1
}

/// English source term → per-language translations.
///
/// ```json
/// {
///   "version": 1,
///   "terms": {
///     "Submit": { "hi": "जमा करें", "ta": "சமர்ப்பிக்கவும்" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Glossary {
    /// Document format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Source term → (language tag → translation).
    #[serde(default)]
    terms: HashMap<String, HashMap<String, String>>,
}

impl Default for Glossary {
    fn default() -> Self {
        Self { version: default_version(), terms: HashMap::new() }
    }
}

impl Glossary {
    /// Loads a glossary from `path`.
    ///
    /// A missing file is not an error: merges simply run without glossary
    /// fills.
    ///
    /// # Errors
    /// [`GlossaryError::Io`] / [`GlossaryError::Parse`] for unreadable or
    /// malformed files.
    pub fn load(path: &Path) -> Result<Option<Self>, GlossaryError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Glossary file not found");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|source| GlossaryError::Io { path: path.to_path_buf(), source })?;
        let glossary: Self = serde_json::from_str(&content)
            .map_err(|source| GlossaryError::Parse { path: path.to_path_buf(), source })?;

        tracing::debug!(
            path = %path.display(),
            terms = glossary.terms.len(),
            version = glossary.version,
            "Loaded glossary"
        );
        Ok(Some(glossary))
    }

    /// Exact-match lookup by source term and language tag.
    #[must_use]
    pub fn lookup(&self, source_term: &str, language: &str) -> Option<&str> {
        self.terms.get(source_term)?.get(language).map(String::as_str)
    }

    /// Adds or replaces one translation.
    pub fn insert(
        &mut self,
        source_term: impl Into<String>,
        language: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.terms
            .entry(source_term.into())
            .or_default()
            .insert(language.into(), translation.into());
    }

    /// Number of source terms.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of translations available for one language.
    #[must_use]
    pub fn translation_count_for(&self, language: &str) -> usize {
        self.terms.values().filter(|by_lang| by_lang.contains_key(language)).count()
    }

    /// All language tags that appear anywhere in the glossary, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> =
            self.terms.values().flat_map(|by_lang| by_lang.keys().cloned()).collect();
        languages.sort_unstable();
        languages.dedup();
        languages
    }

    /// Whether the glossary has no terms at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn lookup_by_term_and_language() {
        let mut glossary = Glossary::default();
        glossary.insert("Submit", "hi", "जमा करें");
        glossary.insert("Submit", "ta", "சமர்ப்பிக்கவும்");

        assert_that!(glossary.lookup("Submit", "hi"), some(eq("जमा करें")));
        assert_that!(glossary.lookup("Submit", "ta"), some(eq("சமர்ப்பிக்கவும்")));
        assert_that!(glossary.lookup("Submit", "bn"), none());
        assert_that!(glossary.lookup("Cancel", "hi"), none());
    }

    #[rstest]
    fn load_missing_file_is_absent_not_error() {
        let temp = TempDir::new().unwrap();

        let result = Glossary::load(&temp.path().join("glossary.json"));

        assert_that!(result.unwrap(), none());
    }

    #[rstest]
    fn load_parses_versioned_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("glossary.json");
        fs::write(
            &path,
            r#"{ "version": 1, "terms": { "Apply Now": { "hi": "अभी आवेदन करें" } } }"#,
        )
        .unwrap();

        let glossary = Glossary::load(&path).unwrap().unwrap();

        assert_that!(glossary.version, eq(1));
        assert_that!(glossary.lookup("Apply Now", "hi"), some(eq("अभी आवेदन करें")));
    }

    #[rstest]
    fn load_rejects_malformed_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("glossary.json");
        fs::write(&path, r#"{ "terms": [1, 2] }"#).unwrap();

        let result = Glossary::load(&path);

        assert!(matches!(result, Err(GlossaryError::Parse { .. })));
    }

    #[rstest]
    fn stats_count_terms_and_languages() {
        let mut glossary = Glossary::default();
        glossary.insert("Submit", "hi", "जमा करें");
        glossary.insert("Submit", "ta", "சமர்ப்பிக்கவும்");
        glossary.insert("Cancel", "hi", "रद्द करें");

        assert_that!(glossary.term_count(), eq(2));
        assert_that!(glossary.translation_count_for("hi"), eq(2));
        assert_that!(glossary.translation_count_for("ta"), eq(1));
        assert_that!(glossary.languages(), elements_are![eq("hi"), eq("ta")]);
    }
}
