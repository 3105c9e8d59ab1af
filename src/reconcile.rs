//! Batch reconciliation runner.
//!
//! ロケール走査 → 分類 → マージ → 集計の一括実行。
//! 壊れたファイルは記録してスキップし、バッチ全体は止めない。

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use thiserror::Error;

use crate::classify::Classifier;
use crate::config::ToolSettings;
use crate::coverage::{
    CoverageRecord,
    LanguageSummary,
    summarize_by_language,
};
use crate::glossary::{
    Glossary,
    GlossaryError,
};
use crate::locale::{
    LocaleDocument,
    count_translatable_leaves,
    walk_leaves,
};
use crate::merge::{
    MergeOutcome,
    MergePolicy,
    Merger,
};

/// Errors that abort a whole batch run.
///
/// Per-file problems never end up here; they are collected into the run
/// summary instead.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The reference language directory does not exist.
    #[error("reference locale directory {0} not found")]
    ReferenceDirMissing(PathBuf),

    /// The configured file pattern is not a valid glob.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// The shared glossary exists but cannot be used.
    #[error(transparent)]
    Glossary(#[from] GlossaryError),

    /// Writing a merged document back failed.
    #[error("failed to write {path}: {source}")]
    WriteBack {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// One file skipped by the continue-on-error policy.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// The unreadable or malformed file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a coverage run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-(language, namespace) coverage.
    pub records: Vec<CoverageRecord>,
    /// Files skipped with their reasons.
    pub skipped: Vec<SkippedFile>,
}

impl RunSummary {
    /// Per-language rollup of the namespace records.
    #[must_use]
    pub fn language_summaries(&self) -> Vec<LanguageSummary> {
        summarize_by_language(&self.records)
    }
}

/// Result of filling one target file.
#[derive(Debug, Clone)]
pub struct FileFill {
    /// Target language.
    pub language: String,
    /// Namespace name.
    pub namespace: String,
    /// Target file path.
    pub path: PathBuf,
    /// Keep/fill counters from the merge engine.
    pub outcome: MergeOutcome,
    /// False in dry-run mode.
    pub written: bool,
}

/// Result of a fill run.
#[derive(Debug, Clone)]
pub struct FillSummary {
    /// Per-file merge outcomes.
    pub fills: Vec<FileFill>,
    /// Files skipped with their reasons.
    pub skipped: Vec<SkippedFile>,
}

/// Result of a `check` run.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Per-language coverage.
    pub summaries: Vec<LanguageSummary>,
    /// Languages below the threshold, with their percentages.
    pub failing: Vec<(String, f64)>,
    /// Files skipped during the underlying coverage run.
    pub skipped: Vec<SkippedFile>,
}

/// Drives a full reconciliation batch over one locales tree.
///
/// Single-threaded, sequential file I/O. There is no file locking: two
/// concurrent runs over the same tree race on write-back, so callers must
/// serialize runs.
#[derive(Debug)]
pub struct Reconciler {
    /// Resolved locales root.
    locales_root: PathBuf,
    /// Validated settings.
    settings: ToolSettings,
    /// Classifier built from the settings.
    classifier: Classifier,
    /// Shared glossary (empty when no file is configured).
    glossary: Glossary,
}

impl Reconciler {
    /// Builds a reconciler rooted at `base_dir`.
    ///
    /// # Errors
    /// [`ReconcileError::Glossary`] if a configured glossary file is
    /// malformed. A missing glossary file is fine (runs without fills).
    pub fn new(base_dir: &Path, settings: ToolSettings) -> Result<Self, ReconcileError> {
        let locales_root = base_dir.join(&settings.locales_dir);

        let glossary = match &settings.glossary_path {
            Some(path) => Glossary::load(&base_dir.join(path))?.unwrap_or_default(),
            None => Glossary::default(),
        };

        let classifier = Classifier::new(
            settings.placeholder_sentinels.iter().cloned(),
            settings.allowed_terms.iter().cloned(),
            settings.reference_language.clone(),
        );

        Ok(Self { locales_root, settings, classifier, glossary })
    }

    /// The classifier in use (shared with ad hoc callers).
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The glossary in use.
    #[must_use]
    pub const fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    /// Classifies every target leaf of every namespace for every language.
    ///
    /// # Errors
    /// Fatal setup errors only; per-file problems land in
    /// [`RunSummary::skipped`].
    pub fn run_coverage(&self) -> Result<RunSummary, ReconcileError> {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for reference_path in self.reference_files()? {
            let reference = match LocaleDocument::load(&reference_path) {
                Ok(document) => document,
                Err(error) => {
                    tracing::warn!(path = %reference_path.display(), %error, "Skipping reference file");
                    skipped.push(SkippedFile {
                        path: reference_path,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            let total = count_translatable_leaves(reference.root());

            for language in &self.settings.languages {
                match self.coverage_for(&reference, language, total) {
                    Ok(record) => records.push(record),
                    Err(skip) => skipped.push(skip),
                }
            }
        }

        tracing::info!(
            records = records.len(),
            skipped = skipped.len(),
            "Coverage run complete"
        );
        Ok(RunSummary { records, skipped })
    }

    /// Gap-fills every target namespace for every language.
    ///
    /// # Errors
    /// Fatal setup errors, or a write-back failure when `dry_run` is off.
    pub fn run_fill(
        &self,
        policy: MergePolicy,
        dry_run: bool,
    ) -> Result<FillSummary, ReconcileError> {
        let mut fills = Vec::new();
        let mut skipped = Vec::new();

        for reference_path in self.reference_files()? {
            let reference = match LocaleDocument::load(&reference_path) {
                Ok(document) => document,
                Err(error) => {
                    tracing::warn!(path = %reference_path.display(), %error, "Skipping reference file");
                    skipped.push(SkippedFile {
                        path: reference_path,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            for language in &self.settings.languages {
                match self.fill_one(&reference, language, policy, dry_run) {
                    Ok(fill) => fills.push(fill),
                    Err(FillProblem::Skip(skip)) => skipped.push(skip),
                    Err(FillProblem::Fatal(error)) => return Err(error),
                }
            }
        }

        tracing::info!(fills = fills.len(), skipped = skipped.len(), dry_run, "Fill run complete");
        Ok(FillSummary { fills, skipped })
    }

    /// Runs coverage and compares each language against `threshold`.
    ///
    /// # Errors
    /// Same as [`Reconciler::run_coverage`].
    pub fn check(&self, threshold: f64) -> Result<CheckOutcome, ReconcileError> {
        let summary = self.run_coverage()?;
        let summaries = summary.language_summaries();

        let failing: Vec<(String, f64)> = summaries
            .iter()
            .filter(|language| language.percent_translated() < threshold)
            .map(|language| (language.language.clone(), language.percent_translated()))
            .collect();

        for (language, percent) in &failing {
            tracing::warn!(%language, percent, threshold, "Coverage below threshold");
        }

        Ok(CheckOutcome { summaries, failing, skipped: summary.skipped })
    }

    /// Classifies one (reference namespace, language) pair.
    fn coverage_for(
        &self,
        reference: &LocaleDocument,
        language: &str,
        total: usize,
    ) -> Result<CoverageRecord, SkippedFile> {
        let target_path = self.target_path(&reference.path, language);
        let target = load_target(&target_path)?;

        let mut record = CoverageRecord::new(language, reference.namespace.clone(), total);
        for leaf in walk_leaves(reference.root()) {
            let Some(reference_text) = leaf.text() else {
                continue;
            };
            let candidate =
                target.as_ref().and_then(|doc| doc.leaf_at(&leaf.path)).and_then(|v| v.as_str());
            record.tally(self.classifier.classify(candidate, reference_text, language));
        }

        Ok(record)
    }

    /// Merges one (reference namespace, language) pair and writes it back.
    fn fill_one(
        &self,
        reference: &LocaleDocument,
        language: &str,
        policy: MergePolicy,
        dry_run: bool,
    ) -> Result<FileFill, FillProblem> {
        let target_path = self.target_path(&reference.path, language);
        let target = load_target(&target_path).map_err(FillProblem::Skip)?;

        let merger = Merger::new(&self.classifier, &self.glossary, language, policy);
        let empty = serde_json::Value::Object(serde_json::Map::new());
        let target_root = target.as_ref().map_or(&empty, LocaleDocument::root);
        let (merged, outcome) = merger.merge(target_root, reference.root());

        if !dry_run {
            if let Some(parent) = target_path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    FillProblem::Fatal(ReconcileError::WriteBack {
                        path: target_path.clone(),
                        source,
                    })
                })?;
            }

            let mut document =
                LocaleDocument::from_value(language, reference.namespace.clone(), merged);
            document.path = target_path.clone();
            document.save().map_err(|error| {
                FillProblem::Fatal(ReconcileError::WriteBack {
                    path: target_path.clone(),
                    source: std::io::Error::other(error.to_string()),
                })
            })?;
        }

        Ok(FileFill {
            language: language.to_string(),
            namespace: reference.namespace.clone(),
            path: target_path,
            outcome,
            written: !dry_run,
        })
    }

    /// Maps a reference file path to the same namespace in another language.
    fn target_path(&self, reference_path: &Path, language: &str) -> PathBuf {
        let reference_dir = self.locales_root.join(&self.settings.reference_language);
        let relative = reference_path.strip_prefix(&reference_dir).unwrap_or(reference_path);
        self.locales_root.join(language).join(relative)
    }

    /// Enumerates the reference-language files selected by the pattern.
    ///
    /// Sorted for deterministic diff output across runs.
    fn reference_files(&self) -> Result<Vec<PathBuf>, ReconcileError> {
        let reference_dir = self.locales_root.join(&self.settings.reference_language);
        if !reference_dir.is_dir() {
            return Err(ReconcileError::ReferenceDirMissing(reference_dir));
        }

        let pattern = build_pattern(&self.settings.file_pattern)?;

        let mut files = Vec::new();
        for result in WalkBuilder::new(&reference_dir).hidden(false).follow_links(false).build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(&reference_dir) else {
                continue;
            };
            if !pattern.is_match(relative) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        tracing::debug!(count = files.len(), "Discovered reference files");
        Ok(files)
    }
}

/// Why one fill step could not complete.
enum FillProblem {
    /// Per-file problem, recorded and skipped.
    Skip(SkippedFile),
    /// Batch-fatal problem (write-back failure).
    Fatal(ReconcileError),
}

/// Builds the file-selection glob set.
fn build_pattern(pattern: &str) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    builder.add(Glob::new(pattern)?);
    builder.build()
}

/// Loads a target document; a missing file is an empty target, a corrupt
/// one is a skip.
fn load_target(path: &Path) -> Result<Option<LocaleDocument>, SkippedFile> {
    if !path.exists() {
        return Ok(None);
    }
    match LocaleDocument::load(path) {
        Ok(document) => Ok(Some(document)),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "Skipping malformed target file");
            Err(SkippedFile { path: path.to_path_buf(), reason: error.to_string() })
        }
    }
}
