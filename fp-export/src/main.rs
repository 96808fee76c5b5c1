//! CLI entry point
//!
//! Prompts for credentials, connects with the reporting defaults, binds
//! one report variant to a project id, and optionally exports it. Without
//! `--output` the tool only verifies that the metric can be constructed
//! against a live connection and exits without producing anything.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fp_metrics::{ConnectionConfig, Metric, PgHandle, Report};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fp-export", about = "Run federal-project checkpoint reports")]
struct Cli {
    /// Database server host
    #[arg(long, env = "FP_DB_HOST", default_value = "172.17.130.30")]
    host: String,

    /// Database name
    #[arg(long, env = "FP_DB_NAME", default_value = "marts")]
    database: String,

    /// Database server port
    #[arg(long, env = "FP_DB_PORT", default_value_t = 5432)]
    port: u16,

    /// Schema set as the session search path
    #[arg(long, env = "FP_DB_SCHEMA", default_value = "national_projects_2021")]
    schema: String,

    /// Database login (prompted if not supplied)
    #[arg(long, env = "FP_DB_LOGIN")]
    login: Option<String>,

    /// Federal project id the report is scoped to
    #[arg(long, default_value = "2072")]
    fp_id: String,

    /// Report variant to run
    #[arg(long, value_enum, default_value_t = ReportArg::Gaps)]
    report: ReportArg,

    /// Spreadsheet file to write; without it nothing is produced
    #[arg(long)]
    output: Option<PathBuf>,

    /// Worksheet name for the exported file
    #[arg(long)]
    sheet: Option<String>,

    /// Abort any query running longer than this many seconds
    #[arg(long)]
    query_timeout: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportArg {
    /// Checkpoint-type gap report
    Gaps,
    /// Checkpoint shortfall by year
    Shortfall,
}

impl From<ReportArg> for Report {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Gaps => Report::CheckpointTypeGaps,
            ReportArg::Shortfall => Report::CheckpointShortfallByYear,
        }
    }
}

/// Combine the run's outcome with the disconnect result
///
/// A failed disconnect is only fatal on an otherwise clean run; when the
/// export already failed, that error is the one worth propagating and the
/// disconnect failure is just logged.
fn resolve_exit(
    outcome: Result<()>,
    disconnect: std::result::Result<(), fp_metrics::Error>,
) -> Result<()> {
    match (outcome, disconnect) {
        (Ok(()), Err(error)) => Err(error).context("failed to disconnect"),
        (outcome, Err(error)) => {
            warn!(%error, "failed to disconnect");
            outcome
        }
        (outcome, Ok(())) => outcome,
    }
}

fn prompt_login() -> Result<String> {
    print!("Login: ");
    io::stdout().flush()?;
    let mut login = String::new();
    io::stdin().read_line(&mut login)?;
    Ok(login.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let login = match cli.login {
        Some(login) => login,
        None => prompt_login()?,
    };
    let password = rpassword::prompt_password("Password: ").context("failed to read password")?;

    let config = ConnectionConfig::new(cli.host, cli.database)
        .port(cli.port)
        .schema(cli.schema);
    let mut db = PgHandle::new(config);
    if let Some(seconds) = cli.query_timeout {
        db = db.with_query_timeout(Duration::from_secs(seconds));
    }

    db.connect(&login, &password)
        .await
        .context("failed to connect to the database")?;

    let metric = Metric::new(cli.report.into(), cli.fp_id);
    let outcome = match &cli.output {
        Some(path) => {
            let result = metric
                .export(&mut db, path, cli.sheet.as_deref())
                .await
                .context("failed to export the report");
            if result.is_ok() {
                println!("Wrote {}", path.display());
            }
            result
        }
        None => Ok(()),
    };

    // Disconnect even when the export failed
    let disconnect = db.disconnect().await;
    resolve_exit(outcome, disconnect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use fp_metrics::Error;

    fn disconnect_failure() -> std::result::Result<(), Error> {
        Err(Error::InvalidState("disconnect called before connect"))
    }

    #[test]
    fn test_clean_run_surfaces_disconnect_failure() {
        let result = resolve_exit(Ok(()), disconnect_failure());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to disconnect"));
    }

    #[test]
    fn test_export_error_is_not_masked_by_disconnect_failure() {
        let result = resolve_exit(
            Err(anyhow!("failed to export the report")),
            disconnect_failure(),
        );
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to export the report"));
        assert!(!message.contains("failed to disconnect"));
    }

    #[test]
    fn test_quiet_paths_pass_the_outcome_through() {
        assert!(resolve_exit(Ok(()), Ok(())).is_ok());
        let result = resolve_exit(Err(anyhow!("failed to export the report")), Ok(()));
        assert!(result.is_err());
    }
}
