//! Entry point for the reconciliation CLI.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use i18n_site_tools::cli::{
    Cli,
    run,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());
    run(cli)
}

/// Installs the tracing subscriber.
///
/// With `--log-file` the output goes through a non-blocking file appender;
/// the returned guard must stay alive until exit so buffered lines flush.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().map_or_else(
                || std::ffi::OsString::from("i18n-site-tools.log"),
                std::ffi::OsStr::to_os_string,
            );

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            // Reports own stdout; logs go to stderr.
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
