//! Report Emitter.
//!
//! Pure formatting over coverage records; no policy decisions live here.

use std::io::{
    self,
    Write,
};

use comfy_table::{
    ContentArrangement,
    Table,
    presets::UTF8_FULL_CONDENSED,
};

use crate::coverage::{
    CoverageRecord,
    LanguageSummary,
    summarize_by_language,
};

/// Builds the per-(language, namespace) table, ranked by coverage
/// descending.
#[must_use]
pub fn namespace_table(records: &[CoverageRecord]) -> Table {
    let mut rows: Vec<&CoverageRecord> = records.iter().collect();
    rows.sort_by(|a, b| {
        b.percent_translated()
            .total_cmp(&a.percent_translated())
            .then_with(|| a.language.cmp(&b.language))
            .then_with(|| a.namespace.cmp(&b.namespace))
    });

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Language",
            "Namespace",
            "Leaves",
            "Translated",
            "Fallback",
            "Placeholder",
            "Contaminated",
            "Empty",
            "Coverage",
        ]);

    for record in rows {
        table.add_row(vec![
            record.language.clone(),
            record.namespace.clone(),
            record.total_leaves.to_string(),
            record.counts.translated.to_string(),
            record.counts.source_fallback.to_string(),
            record.counts.placeholder.to_string(),
            record.counts.contaminated.to_string(),
            record.counts.empty.to_string(),
            format!("{:.1}%", record.percent_translated()),
        ]);
    }

    table
}

/// Builds the per-language ranking table with a totals row.
#[must_use]
pub fn language_ranking(summaries: &[LanguageSummary]) -> Table {
    let mut rows: Vec<&LanguageSummary> = summaries.iter().collect();
    rows.sort_by(|a, b| {
        b.percent_translated()
            .total_cmp(&a.percent_translated())
            .then_with(|| a.language.cmp(&b.language))
    });

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rank", "Language", "Leaves", "Translated", "Coverage"]);

    let mut total_leaves = 0usize;
    let mut total_translated = 0usize;
    for (rank, summary) in rows.iter().enumerate() {
        total_leaves += summary.total_leaves;
        total_translated += summary.counts.translated;
        table.add_row(vec![
            (rank + 1).to_string(),
            summary.language.clone(),
            summary.total_leaves.to_string(),
            summary.counts.translated.to_string(),
            format!("{:.1}%", summary.percent_translated()),
        ]);
    }

    let overall = if total_leaves == 0 {
        100.0
    } else {
        #[allow(clippy::cast_precision_loss)] // leaf counts are far below 2^52
        let raw = total_translated as f64 / total_leaves as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    };
    table.add_row(vec![
        String::new(),
        "TOTAL".to_string(),
        total_leaves.to_string(),
        total_translated.to_string(),
        format!("{overall:.1}%"),
    ]);

    table
}

/// Writes the full coverage report (namespace detail + language ranking).
///
/// # Errors
/// Propagates write failures from `writer`.
pub fn write_report(writer: &mut impl Write, records: &[CoverageRecord]) -> io::Result<()> {
    writeln!(writer, "Coverage by namespace")?;
    writeln!(writer, "{}", namespace_table(records))?;
    writeln!(writer)?;
    writeln!(writer, "Languages ranked")?;
    writeln!(writer, "{}", language_ranking(&summarize_by_language(records)))?;
    Ok(())
}
