//! Command line interface.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
    ValueEnum,
};
use comfy_table::{
    Table,
    presets::UTF8_FULL_CONDENSED,
};

use crate::config::{
    ConfigError,
    ToolSettings,
    load_from_dir,
};
use crate::merge::MergePolicy;
use crate::reconcile::{
    FillSummary,
    Reconciler,
    SkippedFile,
};
use crate::report;

/// Locale reconciliation and coverage tooling.
#[derive(Debug, Parser)]
#[command(name = "i18n-site-tools", version, about = "Locale tree reconciliation and translation coverage tooling")]
pub struct Cli {
    /// Project root holding `.i18n-tools.json` and the locales directory
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Override the locales directory from settings
    #[arg(long)]
    pub locales_dir: Option<String>,

    /// Override the reference language from settings
    #[arg(long)]
    pub reference: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the coverage report for every language and namespace
    Coverage,
    /// Gap-fill target locale files from the glossary and the reference
    Fill {
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Merge precedence rule
        #[arg(long, value_enum, default_value_t = PolicyArg::FillGaps)]
        policy: PolicyArg,
    },
    /// Exit non-zero when any language is below the coverage threshold
    Check {
        /// Override the configured threshold (percent)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Print term and language statistics for the shared glossary
    GlossaryStats,
}

/// CLI-facing merge policy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Keep existing translated work, only fill gaps.
    FillGaps,
    /// Glossary entries also replace existing values.
    GlossaryOverride,
}

impl From<PolicyArg> for MergePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::FillGaps => Self::FillGaps,
            PolicyArg::GlossaryOverride => Self::GlossaryOverride,
        }
    }
}

/// Runs the selected subcommand to completion.
#[must_use]
pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!(%error, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let threshold = settings.coverage_threshold;
    let reconciler = match Reconciler::new(&cli.project_root, settings) {
        Ok(reconciler) => reconciler,
        Err(error) => {
            tracing::error!(%error, "Failed to initialize");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match cli.command {
        Command::Coverage => coverage(&reconciler),
        Command::Fill { dry_run, policy } => fill(&reconciler, policy.into(), dry_run),
        Command::Check { threshold: override_threshold } => {
            check(&reconciler, override_threshold.unwrap_or(threshold))
        }
        Command::GlossaryStats => glossary_stats(&reconciler),
    };

    outcome.unwrap_or_else(|error| {
        tracing::error!(%error, "Run failed");
        ExitCode::FAILURE
    })
}

/// Loads settings from the project root and applies CLI overrides.
fn load_settings(cli: &Cli) -> Result<ToolSettings, ConfigError> {
    let mut settings = load_from_dir(&cli.project_root)?.unwrap_or_default();

    if let Some(locales_dir) = &cli.locales_dir {
        settings.locales_dir.clone_from(locales_dir);
    }
    if let Some(reference) = &cli.reference {
        settings.reference_language.clone_from(reference);
    }
    settings.validate().map_err(ConfigError::ValidationErrors)?;

    Ok(settings)
}

/// `coverage` subcommand.
fn coverage(reconciler: &Reconciler) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let summary = reconciler.run_coverage()?;

    let mut stdout = std::io::stdout().lock();
    report::write_report(&mut stdout, &summary.records)?;
    print_skipped(&mut stdout, &summary.skipped)?;

    Ok(ExitCode::SUCCESS)
}

/// `fill` subcommand.
fn fill(
    reconciler: &Reconciler,
    policy: MergePolicy,
    dry_run: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let summary: FillSummary = reconciler.run_fill(policy, dry_run)?;

    let mut stdout = std::io::stdout().lock();
    if dry_run {
        writeln!(stdout, "Dry run: nothing written")?;
    }
    for fill in &summary.fills {
        writeln!(
            stdout,
            "{} [{}]: kept {}, from glossary {}, from reference {}",
            fill.path.display(),
            fill.language,
            fill.outcome.kept,
            fill.outcome.filled_from_glossary,
            fill.outcome.filled_from_reference,
        )?;
    }
    print_skipped(&mut stdout, &summary.skipped)?;

    Ok(ExitCode::SUCCESS)
}

/// `check` subcommand.
fn check(
    reconciler: &Reconciler,
    threshold: f64,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let outcome = reconciler.check(threshold)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", report::language_ranking(&outcome.summaries))?;
    print_skipped(&mut stdout, &outcome.skipped)?;

    if outcome.failing.is_empty() {
        writeln!(stdout, "All languages at or above {threshold:.1}%")?;
        Ok(ExitCode::SUCCESS)
    } else {
        for (language, percent) in &outcome.failing {
            writeln!(stdout, "{language}: {percent:.1}% is below {threshold:.1}%")?;
        }
        Ok(ExitCode::FAILURE)
    }
}

/// `glossary-stats` subcommand.
fn glossary_stats(reconciler: &Reconciler) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let glossary = reconciler.glossary();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec!["Language", "Terms covered"]);
    for language in glossary.languages() {
        let count = glossary.translation_count_for(&language);
        table.add_row(vec![language, count.to_string()]);
    }

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Glossary version {} with {} terms", glossary.version, glossary.term_count())?;
    writeln!(stdout, "{table}")?;

    Ok(ExitCode::SUCCESS)
}

/// Lists files the continue-on-error policy skipped.
fn print_skipped(writer: &mut impl Write, skipped: &[SkippedFile]) -> std::io::Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }
    writeln!(writer)?;
    writeln!(writer, "Skipped {} file(s):", skipped.len())?;
    for skip in skipped {
        writeln!(writer, "  {}: {}", skip.path.display(), skip.reason)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn cli_parses_coverage() {
        let cli = Cli::try_parse_from(["i18n-site-tools", "coverage"]).unwrap();

        assert!(matches!(cli.command, Command::Coverage));
        assert_that!(cli.project_root.to_string_lossy().as_ref(), eq("."));
    }

    #[rstest]
    fn cli_parses_fill_with_policy() {
        let cli = Cli::try_parse_from([
            "i18n-site-tools",
            "fill",
            "--dry-run",
            "--policy",
            "glossary-override",
        ])
        .unwrap();

        let Command::Fill { dry_run, policy } = cli.command else {
            unreachable!();
        };
        assert_that!(dry_run, eq(true));
        assert_that!(policy, eq(PolicyArg::GlossaryOverride));
    }

    #[rstest]
    fn cli_parses_check_threshold() {
        let cli =
            Cli::try_parse_from(["i18n-site-tools", "check", "--threshold", "95.5"]).unwrap();

        let Command::Check { threshold } = cli.command else {
            unreachable!();
        };
        assert_that!(threshold, some(eq(95.5)));
    }

    #[rstest]
    fn unknown_subcommand_is_rejected() {
        let result = Cli::try_parse_from(["i18n-site-tools", "frobnicate"]);

        assert_that!(result.is_err(), eq(true));
    }
}
