//! End-to-end batch reconciliation over a real locales tree.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use std::fs;
use std::path::Path;

use googletest::prelude::*;
use i18n_site_tools::config::ToolSettings;
use i18n_site_tools::merge::MergePolicy;
use i18n_site_tools::reconcile::Reconciler;
use tempfile::TempDir;

/// Seeds a three-language tree with a glossary and one corrupt file.
fn seed_project(root: &Path) {
    let en = root.join("locales/en");
    let hi = root.join("locales/hi");
    let ta = root.join("locales/ta");
    fs::create_dir_all(&en).unwrap();
    fs::create_dir_all(&hi).unwrap();
    fs::create_dir_all(&ta).unwrap();

    fs::write(
        en.join("forms.json"),
        r#"{
  "apply": { "title": "Apply Now", "cta": "Submit" },
  "steps": ["Fill the form", "We call you"]
}"#,
    )
    .unwrap();
    fs::write(en.join("home.json"), r#"{ "hero": { "title": "Your ATM business" } }"#).unwrap();

    // hi: partially translated, one placeholder
    fs::write(
        hi.join("forms.json"),
        r#"{
  "apply": { "title": "अभी आवेदन करें", "cta": "NEEDS TRANSLATION" },
  "steps": ["फ़ॉर्म भरें", "We call you"]
}"#,
    )
    .unwrap();

    // ta: corrupt on purpose
    fs::write(ta.join("forms.json"), "{ this is not json").unwrap();

    fs::write(
        root.join("glossary.json"),
        r#"{
  "version": 1,
  "terms": {
    "Submit": { "hi": "जमा करें", "ta": "சமர்ப்பிக்கவும்" },
    "Apply Now": { "ta": "இப்போது விண்ணப்பிக்கவும்" }
  }
}"#,
    )
    .unwrap();
}

/// Settings matching the seeded tree.
fn settings() -> ToolSettings {
    ToolSettings {
        languages: vec!["hi".to_string(), "ta".to_string()],
        glossary_path: Some("glossary.json".to_string()),
        ..ToolSettings::default()
    }
}

#[googletest::test]
fn coverage_run_scores_and_skips() {
    let temp = TempDir::new().unwrap();
    seed_project(temp.path());
    let reconciler = Reconciler::new(temp.path(), settings()).unwrap();

    let summary = reconciler.run_coverage().unwrap();

    // ta/forms.json is corrupt: skipped, not fatal.
    expect_that!(summary.skipped, len(eq(1)));

    // forms(hi), home(hi), home(ta): ta/forms dropped by the skip.
    expect_that!(summary.records, len(eq(3)));

    let languages = summary.language_summaries();
    // hi forms: 2 translated ("अभी आवेदन करें", "फ़ॉर्म भरें"),
    // 1 placeholder, 1 fallback; hi home: 1 empty. 2 of 5 leaves.
    let hi = languages.iter().find(|s| s.language == "hi").unwrap();
    expect_that!(hi.total_leaves, eq(5));
    expect_that!(hi.counts.translated, eq(2));
    expect_that!(hi.counts.placeholder, eq(1));
    expect_that!(hi.counts.source_fallback, eq(1));
    expect_that!(hi.counts.empty, eq(1));
    expect_that!(hi.percent_translated(), eq(40.0));
}

#[googletest::test]
fn fill_then_coverage_improves_and_is_idempotent() {
    let temp = TempDir::new().unwrap();
    seed_project(temp.path());
    // Drop the corrupt file so both languages fill cleanly.
    fs::remove_file(temp.path().join("locales/ta/forms.json")).unwrap();
    let reconciler = Reconciler::new(temp.path(), settings()).unwrap();

    let before = reconciler.run_coverage().unwrap();
    let fill = reconciler.run_fill(MergePolicy::FillGaps, false).unwrap();
    expect_that!(fill.skipped, is_empty());

    let after = reconciler.run_coverage().unwrap();

    // The hi placeholder leaf was filled from the glossary.
    let percent_of = |summary: &i18n_site_tools::reconcile::RunSummary, language: &str| {
        summary
            .language_summaries()
            .iter()
            .find(|s| s.language == language)
            .unwrap()
            .percent_translated()
    };
    expect_that!(percent_of(&after, "hi") > percent_of(&before, "hi"), eq(true));

    // Filled trees are structurally complete mirrors of the reference.
    let ta_forms = fs::read_to_string(temp.path().join("locales/ta/forms.json")).unwrap();
    expect_that!(ta_forms, contains_substring("சமர்ப்பிக்கவும்"));
    expect_that!(ta_forms, contains_substring("இப்போது விண்ணப்பிக்கவும்"));

    // Second fill changes nothing on disk.
    let snapshot_hi = fs::read_to_string(temp.path().join("locales/hi/forms.json")).unwrap();
    let _ = reconciler.run_fill(MergePolicy::FillGaps, false).unwrap();
    let again_hi = fs::read_to_string(temp.path().join("locales/hi/forms.json")).unwrap();
    expect_that!(again_hi, eq(&snapshot_hi));
}

#[googletest::test]
fn check_gates_on_threshold() {
    let temp = TempDir::new().unwrap();
    seed_project(temp.path());
    let reconciler = Reconciler::new(temp.path(), settings()).unwrap();

    let strict = reconciler.check(90.0).unwrap();
    expect_that!(strict.failing, len(eq(2)));

    let lax = reconciler.check(0.0).unwrap();
    expect_that!(lax.failing, is_empty());
}
