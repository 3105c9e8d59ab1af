use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::classify::{
    DEFAULT_ALLOWED_TERMS,
    DEFAULT_SENTINELS,
    Script,
};

/// One field-level configuration problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "languages[0]")
    pub field_path: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for one field.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Errors raised while loading or validating the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more fields failed validation.
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// The settings file could not be read.
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The settings file is not well-formed JSON.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered, one-per-line rendering of the collected validation errors.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings for the reconciliation tool (`.i18n-tools.json`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolSettings {
    /// Root directory holding `<langCode>/<namespace>.json` files.
    pub locales_dir: String,

    /// Language whose files are the reference tree.
    pub reference_language: String,

    /// Target languages to reconcile against the reference.
    pub languages: Vec<String>,

    /// Glob selecting locale files below each language directory.
    pub file_pattern: String,

    /// Placeholder sentinels, matched case-insensitively as substrings.
    pub placeholder_sentinels: Vec<String>,

    /// Transliterable brand terms that never count as contamination.
    pub allowed_terms: Vec<String>,

    /// Path to the shared glossary file, if any.
    pub glossary_path: Option<String>,

    /// Minimum per-language coverage (percent) for the `check` command.
    pub coverage_threshold: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            locales_dir: "locales".to_string(),
            reference_language: "en".to_string(),
            languages: ["hi", "bn", "ta", "te", "mr", "gu", "ur", "kn", "or", "pa", "as", "ml"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            file_pattern: "*.json".to_string(),
            placeholder_sentinels: DEFAULT_SENTINELS.iter().map(ToString::to_string).collect(),
            allowed_terms: DEFAULT_ALLOWED_TERMS.iter().map(ToString::to_string).collect(),
            glossary_path: None,
            coverage_threshold: 80.0,
        }
    }
}

impl ToolSettings {
    /// # Errors
    /// - Empty locales dir, reference language or language list
    /// - Unsupported language tags
    /// - Invalid glob pattern
    /// - Threshold outside 0..=100
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.locales_dir.is_empty() {
            errors.push(ValidationError::new(
                "localesDir",
                "The locales directory cannot be empty. Example: \"locales\"",
            ));
        }

        if self.reference_language.is_empty() {
            errors.push(ValidationError::new(
                "referenceLanguage",
                "The reference language cannot be empty. Example: \"en\"",
            ));
        } else if Script::for_language(&self.reference_language).is_none() {
            errors.push(ValidationError::new(
                "referenceLanguage",
                format!("Unsupported language tag '{}'", self.reference_language),
            ));
        }

        if self.languages.is_empty() {
            errors.push(ValidationError::new(
                "languages",
                "At least one target language is required. Example: [\"hi\", \"ta\"]",
            ));
        }
        for (index, language) in self.languages.iter().enumerate() {
            if Script::for_language(language).is_none() {
                errors.push(ValidationError::new(
                    format!("languages[{index}]"),
                    format!("Unsupported language tag '{language}'"),
                ));
            }
        }

        if self.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "filePattern",
                "The pattern cannot be empty. Example: \"*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.file_pattern) {
            errors.push(ValidationError::new(
                "filePattern",
                format!("Invalid glob pattern '{}': {e}", self.file_pattern),
            ));
        }

        if !(0.0..=100.0).contains(&self.coverage_threshold) {
            errors.push(ValidationError::new(
                "coverageThreshold",
                format!("Must be between 0 and 100, got {}", self.coverage_threshold),
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
