//! # fp-metrics
//!
//! Parameterized analytical reports over a federal-project checkpoint
//! database, exported to spreadsheet files.
//!
//! ## Features
//!
//! - Single-connection PostgreSQL handle with session search-path scoping
//! - Named-placeholder queries bound through the driver (never interpolated)
//! - A closed set of report variants, each a query plus declared column schema
//! - Explicit arity checking between declared columns and query projections
//! - `.xlsx` export with the declared columns as the header row
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fp_metrics::{ConnectionConfig, Metric, PgHandle, Report};
//!
//! #[tokio::main]
//! async fn main() -> fp_metrics::Result<()> {
//!     let config = ConnectionConfig::new("172.17.130.30", "marts")
//!         .schema("national_projects_2021");
//!     let mut db = PgHandle::new(config);
//!     db.connect("analyst", "secret").await?;
//!
//!     let metric = Metric::new(Report::CheckpointTypeGaps, "2072");
//!     metric.export(&mut db, "gaps_2072.xlsx".as_ref(), None).await?;
//!
//!     db.disconnect().await?;
//!     Ok(())
//! }
//! ```

// Public modules
pub mod config;
pub mod database;
pub mod export;
pub mod metrics;
pub mod report_number;
pub mod table;

// Public exports
pub use config::ConnectionConfig;
pub use metrics::{Metric, Report};
pub use report_number::ReportNumber;
pub use table::{Row, Table};

// Re-export the fetch seam and the Postgres handle
pub use database::postgres::PgHandle;
pub use database::traits::ResultFetcher;

// Error type
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or authentication failure while opening the connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Operation invoked on a handle in the wrong lifecycle phase.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Malformed SQL, a missing bound parameter, or a database-side failure.
    #[error("query failed: {0}")]
    Query(String),

    /// Declared column arity disagrees with the query's actual result arity.
    #[error("schema mismatch: declared {declared} columns, result row has {actual}")]
    SchemaMismatch { declared: usize, actual: usize },

    /// Query exceeded the handle's configured timeout.
    #[error("query timeout exceeded")]
    Timeout,

    /// Report-number parsing or lookup yielded nothing.
    #[error("no reports found: {0}")]
    NoReportsFound(String),

    /// Spreadsheet write failure.
    #[error("export failed: {0}")]
    Export(String),
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Error::Query(error.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Error::Export(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
