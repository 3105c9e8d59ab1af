//! Deep Merge Engine.
//!
//! Reference defines required structure; target may carry extra fields.
//! Existing translated work is never silently overwritten.

use serde_json::{
    Map,
    Value,
};

use crate::classify::{
    ClassificationLabel,
    Classifier,
};
use crate::glossary::Glossary;

/// Named precedence rule for a merge run.
///
/// Consolidates the divergent "existing-value-wins vs. always-overwrite"
/// heuristics that used to be copy-pasted per script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep every non-empty, non-placeholder, non-fallback target value;
    /// only fill the gaps.
    #[default]
    FillGaps,
    /// Like [`MergePolicy::FillGaps`], but a glossary entry also replaces
    /// an existing kept value, enforcing glossary consistency.
    GlossaryOverride,
}

/// Per-run counters, for logging and the CLI summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Leaves where the target value was kept.
    pub kept: usize,
    /// Leaves filled from the glossary.
    pub filled_from_glossary: usize,
    /// Leaves filled with the reference value itself.
    pub filled_from_reference: usize,
}

impl MergeOutcome {
    /// Total leaves visited.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.kept + self.filled_from_glossary + self.filled_from_reference
    }
}

/// Merges a target tree against a reference tree.
///
/// Pure: the merged tree is a function of `(target, reference, glossary,
/// language, policy)` alone, and merging twice with unchanged inputs yields
/// an identical tree.
#[derive(Debug, Clone, Copy)]
pub struct Merger<'run> {
    /// Classifier deciding which target values count as existing work.
    classifier: &'run Classifier,
    /// Glossary consulted before falling back to the reference value.
    glossary: &'run Glossary,
    /// Target language tag.
    language: &'run str,
    /// Precedence rule.
    policy: MergePolicy,
}

impl<'run> Merger<'run> {
    /// Builds a merger for one (language, policy) run.
    #[must_use]
    pub const fn new(
        classifier: &'run Classifier,
        glossary: &'run Glossary,
        language: &'run str,
        policy: MergePolicy,
    ) -> Self {
        Self { classifier, glossary, language, policy }
    }

    /// Merges `target` against `reference` and returns the merged tree with
    /// its fill counters.
    #[must_use]
    pub fn merge(&self, target: &Value, reference: &Value) -> (Value, MergeOutcome) {
        let mut outcome = MergeOutcome::default();
        let merged = self.merge_value(Some(target), reference, &mut outcome);
        (merged, outcome)
    }

    /// Recursive merge of one reference subtree.
    fn merge_value(
        &self,
        target: Option<&Value>,
        reference: &Value,
        outcome: &mut MergeOutcome,
    ) -> Value {
        match reference {
            Value::Object(reference_map) => {
                self.merge_object(target, reference_map, outcome)
            }
            Value::Array(reference_items) => {
                self.merge_array(target, reference_items, outcome)
            }
            Value::String(reference_text) => {
                self.resolve_leaf(target, reference_text, outcome)
            }
            other => match target {
                // Non-translatable reference leaf: target value wins when
                // present, otherwise the reference value is copied.
                Some(value) => {
                    outcome.kept += 1;
                    value.clone()
                }
                None => {
                    outcome.filled_from_reference += 1;
                    other.clone()
                }
            },
        }
    }

    /// Merges an object node key-wise; target-only keys are preserved.
    fn merge_object(
        &self,
        target: Option<&Value>,
        reference_map: &Map<String, Value>,
        outcome: &mut MergeOutcome,
    ) -> Value {
        let target_map = target.and_then(Value::as_object);
        let mut merged = Map::new();

        for (key, reference_child) in reference_map {
            let target_child = target_map.and_then(|map| map.get(key));
            merged.insert(key.clone(), self.merge_value(target_child, reference_child, outcome));
        }

        // The merge is not "reference is the whole truth": subtrees only
        // present in the target survive, so incremental namespace growth
        // never truncates prior manual edits.
        if let Some(target_map) = target_map {
            for (key, target_child) in target_map {
                if !reference_map.contains_key(key) {
                    merged.insert(key.clone(), target_child.clone());
                }
            }
        }

        Value::Object(merged)
    }

    /// Merges an array node index-wise; extra target elements are preserved.
    fn merge_array(
        &self,
        target: Option<&Value>,
        reference_items: &[Value],
        outcome: &mut MergeOutcome,
    ) -> Value {
        let target_items = target.and_then(Value::as_array);
        let mut merged = Vec::new();

        for (index, reference_child) in reference_items.iter().enumerate() {
            let target_child = target_items.and_then(|items| items.get(index));
            merged.push(self.merge_value(target_child, reference_child, outcome));
        }

        if let Some(target_items) = target_items {
            for target_child in target_items.iter().skip(reference_items.len()) {
                merged.push(target_child.clone());
            }
        }

        Value::Array(merged)
    }

    /// Decides one translatable leaf: keep the target value or fill it.
    fn resolve_leaf(
        &self,
        target: Option<&Value>,
        reference_text: &str,
        outcome: &mut MergeOutcome,
    ) -> Value {
        if let Some(target_value) = target {
            // A non-string target under a string reference leaf is outside
            // translation consideration and preserved verbatim.
            let Some(target_text) = target_value.as_str() else {
                outcome.kept += 1;
                return target_value.clone();
            };

            let label =
                self.classifier.classify(Some(target_text), reference_text, self.language);
            let keep = !matches!(
                label,
                ClassificationLabel::Empty
                    | ClassificationLabel::Placeholder
                    | ClassificationLabel::SourceFallback
            );

            if keep {
                let glossary_hit = self.glossary.lookup(reference_text, self.language);
                if self.policy == MergePolicy::GlossaryOverride
                    && let Some(translation) = glossary_hit
                    && translation != target_text
                {
                    tracing::debug!(
                        reference = reference_text,
                        language = self.language,
                        "Glossary override replaces existing value"
                    );
                    outcome.filled_from_glossary += 1;
                    return Value::String(translation.to_string());
                }

                outcome.kept += 1;
                return target_value.clone();
            }
        }

        if let Some(translation) = self.glossary.lookup(reference_text, self.language) {
            outcome.filled_from_glossary += 1;
            return Value::String(translation.to_string());
        }

        // Structural completeness beats semantic completeness: the tree is
        // always filled, even if only with the untranslated reference text.
        outcome.filled_from_reference += 1;
        Value::String(reference_text.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::locale::walk_leaves;

    /// Glossary with a couple of Hindi entries.
    fn hindi_glossary() -> Glossary {
        let mut glossary = Glossary::default();
        glossary.insert("Submit", "hi", "जमा करें");
        glossary.insert("Apply Now", "hi", "अभी आवेदन करें");
        glossary
    }

    #[rstest]
    fn empty_target_fills_from_reference() {
        let classifier = Classifier::default();
        let glossary = Glossary::default();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::FillGaps);

        let (merged, outcome) = merger.merge(&json!({}), &json!({ "a": { "b": "Submit" } }));

        assert_that!(merged, eq(&json!({ "a": { "b": "Submit" } })));
        assert_that!(outcome.filled_from_reference, eq(1));
    }

    #[rstest]
    fn empty_target_prefers_glossary_over_reference() {
        let classifier = Classifier::default();
        let glossary = hindi_glossary();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::FillGaps);

        let (merged, outcome) = merger.merge(&json!({}), &json!({ "a": { "b": "Submit" } }));

        assert_that!(merged, eq(&json!({ "a": { "b": "जमा करें" } })));
        assert_that!(outcome.filled_from_glossary, eq(1));
    }

    #[rstest]
    fn translated_target_value_is_kept_identical() {
        let classifier = Classifier::default();
        let glossary = hindi_glossary();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::FillGaps);

        let (merged, outcome) = merger.merge(&json!({ "x": "नमस्ते" }), &json!({ "x": "Hello" }));

        assert_that!(merged, eq(&json!({ "x": "नमस्ते" })));
        assert_that!(outcome.kept, eq(1));
    }

    #[rstest]
    #[case::placeholder(json!({ "x": "TODO" }))]
    #[case::source_fallback(json!({ "x": "Submit" }))]
    #[case::empty(json!({ "x": "  " }))]
    #[case::missing(json!({}))]
    fn non_work_values_are_replaced(#[case] target: serde_json::Value) {
        let classifier = Classifier::default();
        let glossary = hindi_glossary();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::FillGaps);

        let (merged, _) = merger.merge(&target, &json!({ "x": "Submit" }));

        assert_that!(merged, eq(&json!({ "x": "जमा करें" })));
    }

    #[rstest]
    fn target_only_subtrees_survive() {
        let classifier = Classifier::default();
        let glossary = Glossary::default();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::FillGaps);

        let target = json!({ "legacy": { "note": "पुराना" }, "x": "नमस्ते" });
        let reference = json!({ "x": "Hello" });

        let (merged, _) = merger.merge(&target, &reference);

        assert_that!(
            merged,
            eq(&json!({ "x": "नमस्ते", "legacy": { "note": "पुराना" } }))
        );
    }

    #[rstest]
    fn arrays_merge_index_wise_and_keep_extras() {
        let classifier = Classifier::default();
        let glossary = Glossary::default();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::FillGaps);

        let target = json!({ "steps": ["पहला", "", "तीसरा", "चौथा"] });
        let reference = json!({ "steps": ["First", "Second", "Third"] });

        let (merged, _) = merger.merge(&target, &reference);

        assert_that!(merged, eq(&json!({ "steps": ["पहला", "Second", "तीसरा", "चौथा"] })));
    }

    #[rstest]
    fn non_translatable_leaves_are_preserved_verbatim() {
        let classifier = Classifier::default();
        let glossary = Glossary::default();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::FillGaps);

        let target = json!({ "count": 7, "enabled": true });
        let reference = json!({ "count": 3, "enabled": false, "ratio": null });

        let (merged, _) = merger.merge(&target, &reference);

        assert_that!(merged, eq(&json!({ "count": 7, "enabled": true, "ratio": null })));
    }

    #[rstest]
    fn glossary_override_replaces_existing_translation() {
        let classifier = Classifier::default();
        let glossary = hindi_glossary();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::GlossaryOverride);

        // An older hand translation that diverges from the glossary.
        let target = json!({ "cta": "प्रस्तुत" });
        let reference = json!({ "cta": "Submit" });

        let (merged, outcome) = merger.merge(&target, &reference);

        assert_that!(merged, eq(&json!({ "cta": "जमा करें" })));
        assert_that!(outcome.filled_from_glossary, eq(1));
    }

    #[rstest]
    fn glossary_override_without_entry_behaves_like_fill_gaps() {
        let classifier = Classifier::default();
        let glossary = hindi_glossary();
        let merger = Merger::new(&classifier, &glossary, "hi", MergePolicy::GlossaryOverride);

        let target = json!({ "other": "नमस्ते" });
        let reference = json!({ "other": "Hello" });

        let (merged, _) = merger.merge(&target, &reference);

        assert_that!(merged, eq(&json!({ "other": "नमस्ते" })));
    }

    #[rstest]
    #[case::fill_gaps(MergePolicy::FillGaps)]
    #[case::glossary_override(MergePolicy::GlossaryOverride)]
    fn merge_is_idempotent(#[case] policy: MergePolicy) {
        let classifier = Classifier::default();
        let glossary = hindi_glossary();
        let merger = Merger::new(&classifier, &glossary, "hi", policy);

        let target = json!({
            "hero": { "title": "नमस्ते", "cta": "" },
            "footer": { "legal": "TODO" }
        });
        let reference = json!({
            "hero": { "title": "Hello", "cta": "Submit" },
            "footer": { "legal": "Terms apply", "year": "2024" }
        });

        let (once, _) = merger.merge(&target, &reference);
        let (twice, _) = merger.merge(&once, &reference);

        assert_that!(twice, eq(&once));
    }

    #[rstest]
    fn merged_tree_is_structurally_complete() {
        let classifier = Classifier::default();
        let glossary = Glossary::default();
        let merger = Merger::new(&classifier, &glossary, "ta", MergePolicy::FillGaps);

        let reference = json!({
            "a": { "b": "one", "c": ["x", "y"] },
            "d": "two"
        });

        let (merged, _) = merger.merge(&json!({ "a": { "b": "ஒன்று" } }), &reference);

        for leaf in walk_leaves(&reference) {
            let mut current = &merged;
            let mut present = true;
            for segment in leaf.path.segments() {
                let next = match segment {
                    crate::types::PathSegment::Key(key) => current.get(key),
                    crate::types::PathSegment::Index(index) => current.get(index),
                };
                match next {
                    Some(value) => current = value,
                    None => {
                        present = false;
                        break;
                    }
                }
            }
            assert_that!(present, eq(true));
        }
    }
}
