//! Coverage Aggregator.
//!
//! Folds classification results into per-(language, namespace) statistics.
//! The denominator is always the reference document's leaf count, so a
//! target missing whole sections is scored down rather than not counted.

use std::collections::BTreeMap;

use crate::classify::ClassificationLabel;

/// Counts per classification label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    /// Genuinely translated leaves.
    pub translated: usize,
    /// Verbatim source-language copies.
    pub source_fallback: usize,
    /// Placeholder sentinels.
    pub placeholder: usize,
    /// Wrong-script leaves.
    pub contaminated: usize,
    /// Missing or blank leaves.
    pub empty: usize,
}

impl LabelCounts {
    /// Records one classification result.
    pub const fn tally(&mut self, label: ClassificationLabel) {
        match label {
            ClassificationLabel::Translated => self.translated += 1,
            ClassificationLabel::SourceFallback => self.source_fallback += 1,
            ClassificationLabel::Placeholder => self.placeholder += 1,
            ClassificationLabel::Contaminated => self.contaminated += 1,
            ClassificationLabel::Empty => self.empty += 1,
        }
    }

    /// Adds another tally into this one.
    pub const fn absorb(&mut self, other: Self) {
        self.translated += other.translated;
        self.source_fallback += other.source_fallback;
        self.placeholder += other.placeholder;
        self.contaminated += other.contaminated;
        self.empty += other.empty;
    }
}

/// Coverage of one namespace for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRecord {
    /// Target language tag.
    pub language: String,
    /// Namespace name (file stem).
    pub namespace: String,
    /// Translatable leaf count of the reference document.
    pub total_leaves: usize,
    /// Classification tallies.
    pub counts: LabelCounts,
}

impl CoverageRecord {
    /// Creates an empty record with the reference denominator fixed.
    #[must_use]
    pub fn new(
        language: impl Into<String>,
        namespace: impl Into<String>,
        total_leaves: usize,
    ) -> Self {
        Self {
            language: language.into(),
            namespace: namespace.into(),
            total_leaves,
            counts: LabelCounts::default(),
        }
    }

    /// Records one classification result.
    pub const fn tally(&mut self, label: ClassificationLabel) {
        self.counts.tally(label);
    }

    /// Translated share of the reference leaves, rounded to one decimal.
    ///
    /// A namespace with no translatable leaves counts as fully covered.
    #[must_use]
    pub fn percent_translated(&self) -> f64 {
        percent(self.counts.translated, self.total_leaves)
    }
}

/// Coverage of one language across all namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSummary {
    /// Target language tag.
    pub language: String,
    /// Sum of reference leaf counts over all namespaces.
    pub total_leaves: usize,
    /// Summed tallies.
    pub counts: LabelCounts,
}

impl LanguageSummary {
    /// Translated share across all namespaces, rounded to one decimal.
    #[must_use]
    pub fn percent_translated(&self) -> f64 {
        percent(self.counts.translated, self.total_leaves)
    }
}

/// Rolls per-namespace records up into per-language summaries.
///
/// Returned sorted by language tag; ranking by percentage is left to the
/// report emitter.
#[must_use]
pub fn summarize_by_language(records: &[CoverageRecord]) -> Vec<LanguageSummary> {
    let mut by_language: BTreeMap<&str, LanguageSummary> = BTreeMap::new();

    for record in records {
        let summary =
            by_language.entry(record.language.as_str()).or_insert_with(|| LanguageSummary {
                language: record.language.clone(),
                total_leaves: 0,
                counts: LabelCounts::default(),
            });
        summary.total_leaves += record.total_leaves;
        summary.counts.absorb(record.counts);
    }

    by_language.into_values().collect()
}

/// Percentage rounded to one decimal; an empty denominator is full coverage.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    #[allow(clippy::cast_precision_loss)] // leaf counts are far below 2^52
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
