//! Translation Classifier.
//!
//! 候補文字列を参照文字列・対象言語と突き合わせて分類する。
//! 判定順: Empty → Placeholder → SourceFallback → Contaminated → Translated。

use std::sync::LazyLock;

use regex::Regex;

/// Interpolation tokens like `{{count}}` are invisible to script checks.
static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a literal, cannot fail
    Regex::new(r"\{\{[^}]*\}\}").unwrap()
});

/// Default placeholder sentinels, matched case-insensitively as substrings.
pub const DEFAULT_SENTINELS: [&str; 3] = ["NEEDS TRANSLATION", "TODO", "TRANSLATE"];

/// Default transliterable brand terms that never count as contamination.
pub const DEFAULT_ALLOWED_TERMS: [&str; 10] =
    ["ATM", "RBI", "PAN", "WLA", "KYC", "GST", "EMI", "UPI", "FAQ", "SMS"];

/// Verdict for one candidate leaf against its reference counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationLabel {
    /// Genuinely translated into the target language.
    Translated,
    /// Verbatim copy of the reference (source-language) string.
    SourceFallback,
    /// Contains a recognized placeholder sentinel.
    Placeholder,
    /// Contains characters from the wrong script for the target language.
    Contaminated,
    /// Null, missing or blank after trimming.
    Empty,
}

impl ClassificationLabel {
    /// Short label for reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Translated => "translated",
            Self::SourceFallback => "fallback",
            Self::Placeholder => "placeholder",
            Self::Contaminated => "contaminated",
            Self::Empty => "empty",
        }
    }
}

/// Writing system expected for a supported language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// en
    Latin,
    /// hi, mr
    Devanagari,
    /// bn, as
    Bengali,
    /// ta
    Tamil,
    /// te
    Telugu,
    /// gu
    Gujarati,
    /// ur
    Arabic,
    /// kn
    Kannada,
    /// or
    Oriya,
    /// pa
    Gurmukhi,
    /// ml
    Malayalam,
}

impl Script {
    /// Maps a supported language tag to its expected script.
    ///
    /// Returns `None` for unsupported tags; classification then skips the
    /// contamination check for that language.
    #[must_use]
    pub fn for_language(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Self::Latin),
            "hi" | "mr" => Some(Self::Devanagari),
            "bn" | "as" => Some(Self::Bengali),
            "ta" => Some(Self::Tamil),
            "te" => Some(Self::Telugu),
            "gu" => Some(Self::Gujarati),
            "ur" => Some(Self::Arabic),
            "kn" => Some(Self::Kannada),
            "or" => Some(Self::Oriya),
            "pa" => Some(Self::Gurmukhi),
            "ml" => Some(Self::Malayalam),
            _ => None,
        }
    }

    /// Whether `c` belongs to this script's Unicode block range.
    #[must_use]
    pub const fn contains(self, c: char) -> bool {
        match self {
            Self::Latin => c.is_ascii_alphabetic() || matches!(c, '\u{00C0}'..='\u{024F}'),
            Self::Devanagari => matches!(c, '\u{0900}'..='\u{097F}'),
            Self::Bengali => matches!(c, '\u{0980}'..='\u{09FF}'),
            Self::Tamil => matches!(c, '\u{0B80}'..='\u{0BFF}'),
            Self::Telugu => matches!(c, '\u{0C00}'..='\u{0C7F}'),
            Self::Gujarati => matches!(c, '\u{0A80}'..='\u{0AFF}'),
            Self::Arabic => matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}'),
            Self::Kannada => matches!(c, '\u{0C80}'..='\u{0CFF}'),
            Self::Oriya => matches!(c, '\u{0B00}'..='\u{0B7F}'),
            Self::Gurmukhi => matches!(c, '\u{0A00}'..='\u{0A7F}'),
            Self::Malayalam => matches!(c, '\u{0D00}'..='\u{0D7F}'),
        }
    }
}

/// Classifies candidate values against their reference counterparts.
///
/// Pure and deterministic: the same `(candidate, reference, language)`
/// triple always yields the same label.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Placeholder sentinels, uppercased for case-insensitive matching.
    sentinels: Vec<String>,
    /// Allow-listed terms, uppercased for case-insensitive matching.
    allowed_terms: Vec<String>,
    /// Language whose files are the reference (source-fallback is not
    /// meaningful for the reference language itself).
    reference_language: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_SENTINELS.iter().map(ToString::to_string),
            DEFAULT_ALLOWED_TERMS.iter().map(ToString::to_string),
            "en",
        )
    }
}

impl Classifier {
    /// Builds a classifier with explicit sentinel and allow-list terms.
    pub fn new(
        sentinels: impl IntoIterator<Item = String>,
        allowed_terms: impl IntoIterator<Item = String>,
        reference_language: impl Into<String>,
    ) -> Self {
        Self {
            sentinels: sentinels.into_iter().map(|s| s.to_uppercase()).collect(),
            allowed_terms: allowed_terms.into_iter().map(|s| s.to_uppercase()).collect(),
            reference_language: reference_language.into(),
        }
    }

    /// Labels `candidate` against `reference` for the given target language.
    ///
    /// Acronyms from the allow-list, numerals and interpolation tokens never
    /// disqualify a `Translated` verdict; a candidate with no letters at all
    /// (currency figures, phone numbers, `{{count}}`) is `Translated`.
    #[must_use]
    pub fn classify(
        &self,
        candidate: Option<&str>,
        reference: &str,
        language: &str,
    ) -> ClassificationLabel {
        let Some(candidate) = candidate else {
            return ClassificationLabel::Empty;
        };
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return ClassificationLabel::Empty;
        }

        let upper = trimmed.to_uppercase();
        if self.sentinels.iter().any(|sentinel| upper.contains(sentinel)) {
            return ClassificationLabel::Placeholder;
        }

        // Nothing translatable at all (currency figures, phone numbers,
        // bare interpolation tokens): translated by definition, even when
        // identical to the reference.
        let visible = INTERPOLATION.replace_all(trimmed, " ");
        if !visible.chars().any(char::is_alphabetic) {
            return ClassificationLabel::Translated;
        }

        if language != self.reference_language
            && trimmed.to_lowercase() == reference.trim().to_lowercase()
        {
            return ClassificationLabel::SourceFallback;
        }

        if let Some(script) = Script::for_language(language)
            && self.is_contaminated(&visible, script)
        {
            return ClassificationLabel::Contaminated;
        }

        ClassificationLabel::Translated
    }

    /// Checks whether any alphabetic run falls outside the expected script.
    ///
    /// Interpolation tokens are already blanked out by the caller;
    /// allow-listed terms are skipped run-wise so `ATM` inside a Hindi
    /// sentence stays clean.
    fn is_contaminated(&self, visible: &str, script: Script) -> bool {
        visible
            .split(|c: char| !c.is_alphabetic())
            .filter(|run| !run.is_empty())
            .filter(|run| !self.allowed_terms.contains(&run.to_uppercase()))
            .any(|run| run.chars().any(|c| !script.contains(c)))
    }
}
