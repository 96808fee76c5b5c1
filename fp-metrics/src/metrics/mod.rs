//! Metric abstraction
//!
//! A [`Metric`] binds a report variant to a federal-project id plus any
//! extra query parameters, fetches the data through a [`ResultFetcher`],
//! applies the variant's post-processing, and can serialize the result to
//! a spreadsheet file.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::database::traits::ResultFetcher;
use crate::export::write_xlsx;
use crate::table::Table;
use crate::Result;

pub mod reports;

pub use reports::Report;

/// Reserved parameter key carrying the bound project id
pub const FP_ID_PARAM: &str = "fp_id";

/// A report variant bound to one project id
///
/// Owns its query parameters and the tables it produces; the database
/// handle is passed in per call and must outlive the call.
pub struct Metric {
    report: Report,
    params: IndexMap<String, Value>,
}

impl Metric {
    /// Bind a report to a project id
    pub fn new(report: Report, fp_id: impl Into<String>) -> Self {
        Self::with_params(report, fp_id, IndexMap::new())
    }

    /// Bind a report to a project id with extra query parameters
    ///
    /// The reserved `fp_id` key is inserted last, so a colliding key in
    /// `extra_params` is overwritten.
    pub fn with_params(
        report: Report,
        fp_id: impl Into<String>,
        extra_params: IndexMap<String, Value>,
    ) -> Self {
        let mut params = extra_params;
        params.insert(FP_ID_PARAM.to_string(), Value::String(fp_id.into()));
        Self { report, params }
    }

    /// The report variant this metric runs
    pub fn report(&self) -> Report {
        self.report
    }

    /// The query parameters, including the reserved project id
    pub fn params(&self) -> &IndexMap<String, Value> {
        &self.params
    }

    /// Fetch the report's data and apply its post-processing
    ///
    /// The call blocks until the database returns the full result set;
    /// there are no partial results. An empty result set yields a zero-row
    /// table that still carries the declared header.
    pub async fn produce<F: ResultFetcher>(&self, fetcher: &mut F) -> Result<Table> {
        debug!(report = self.report.name(), "producing metric");
        let rows = fetcher
            .fetch(self.report.columns(), self.report.query(), &self.params)
            .await?;
        let table = Table::from_rows(self.report.columns(), rows)?;
        Ok(self.report.postprocess(table))
    }

    /// Produce the report and write it to a spreadsheet file
    ///
    /// The header row is the declared column list; no index column is
    /// written.
    pub async fn export<F: ResultFetcher>(
        &self,
        fetcher: &mut F,
        path: &Path,
        sheet_name: Option<&str>,
    ) -> Result<()> {
        let table = self.produce(fetcher).await?;
        write_xlsx(&table, path, sheet_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{self, Row};
    use crate::Error;
    use async_trait::async_trait;
    use serde_json::json;

    /// Serves canned positional rows, zipping them against whatever
    /// columns the caller declares
    struct FakeFetcher {
        rows: Vec<Vec<Value>>,
        seen_params: Option<IndexMap<String, Value>>,
    }

    impl FakeFetcher {
        fn with_rows(rows: Vec<Vec<Value>>) -> Self {
            Self {
                rows,
                seen_params: None,
            }
        }
    }

    #[async_trait]
    impl ResultFetcher for FakeFetcher {
        async fn fetch(
            &mut self,
            columns: &[&str],
            _query: &str,
            params: &IndexMap<String, Value>,
        ) -> Result<Vec<Row>> {
            self.seen_params = Some(params.clone());
            self.rows
                .iter()
                .map(|values| table::zip_columns(columns, values.clone()))
                .collect()
        }
    }

    #[tokio::test]
    async fn test_empty_result_keeps_declared_header() {
        let mut fetcher = FakeFetcher::with_rows(vec![]);
        let metric = Metric::new(Report::CheckpointTypeGaps, "2072");

        let table = metric.produce(&mut fetcher).await.unwrap();
        assert!(table.is_empty());
        let headers: Vec<&str> = table.columns().iter().map(String::as_str).collect();
        assert_eq!(headers, Report::CheckpointTypeGaps.columns());
    }

    #[tokio::test]
    async fn test_fp_id_wins_over_colliding_extra_param() {
        let mut extra = IndexMap::new();
        extra.insert(FP_ID_PARAM.to_string(), json!("other"));
        extra.insert("threshold".to_string(), json!(6));

        let metric = Metric::with_params(Report::CheckpointTypeGaps, "2072", extra);
        assert_eq!(metric.params()[FP_ID_PARAM], json!("2072"));
        assert_eq!(metric.params()["threshold"], json!(6));
    }

    #[tokio::test]
    async fn test_produce_passes_bound_params_through() {
        let mut fetcher = FakeFetcher::with_rows(vec![]);
        let metric = Metric::new(Report::CheckpointTypeGaps, "2072");
        metric.produce(&mut fetcher).await.unwrap();

        let seen = fetcher.seen_params.unwrap();
        assert_eq!(seen[FP_ID_PARAM], json!("2072"));
    }

    #[tokio::test]
    async fn test_gap_report_builds_five_column_rows() {
        let mut fetcher = FakeFetcher::with_rows(vec![vec![
            json!("Broadband rollout"),
            json!(3),
            json!("Infrastructure"),
            json!(17),
            json!("Commissioning"),
        ]]);
        let metric = Metric::new(Report::CheckpointTypeGaps, "2072");

        let table = metric.produce(&mut fetcher).await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0][0], json!("Broadband rollout"));
    }

    /// The shortfall report declares four columns but its query projects
    /// five; the arity check must refuse the rows instead of silently
    /// dropping a cell.
    #[tokio::test]
    async fn test_shortfall_report_surfaces_declared_arity_mismatch() {
        let mut fetcher = FakeFetcher::with_rows(vec![vec![
            json!("Broadband rollout"),
            json!("FP-17"),
            json!("Network backbone"),
            json!(4),
            json!("2023"),
        ]]);
        let metric = Metric::new(Report::CheckpointShortfallByYear, "2072");

        let result = metric.produce(&mut fetcher).await;
        match result {
            Err(Error::SchemaMismatch { declared, actual }) => {
                assert_eq!(declared, 4);
                assert_eq!(actual, 5);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other.map(|t| t.len())),
        }
    }

    #[tokio::test]
    async fn test_default_postprocess_is_identity() {
        let rows = vec![vec![
            json!("Broadband rollout"),
            json!(3),
            json!("Infrastructure"),
            json!(17),
            json!("Commissioning"),
        ]];
        let mut fetcher = FakeFetcher::with_rows(rows.clone());
        let metric = Metric::new(Report::CheckpointTypeGaps, "2072");

        let table = metric.produce(&mut fetcher).await.unwrap();
        // Applying the default postprocess again changes nothing
        let again = metric.report().postprocess(table.clone());
        assert_eq!(again, table);
    }
}
