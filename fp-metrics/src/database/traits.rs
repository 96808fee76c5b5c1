//! Result fetcher trait
//!
//! This trait is the seam between report definitions and the database.
//! The production implementation is [`PgHandle`](crate::PgHandle); tests
//! substitute an in-memory fake.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::table::Row;
use crate::Result;

/// Executes a parameterized query and returns its rows as column-name
/// mappings
///
/// Callers must serialize all uses of one fetcher: exactly one query runs
/// at a time per underlying connection, and disconnecting while a fetch is
/// in flight is not supported.
#[async_trait]
pub trait ResultFetcher: Send {
    /// Execute `query` with `params` bound via the driver and return every
    /// resulting row eagerly
    ///
    /// # Arguments
    ///
    /// * `columns` - Expected ordered column list; each positional result
    ///   row is zipped against it, with an explicit arity check
    /// * `query` - Parameterized SQL using `%(name)s` placeholders
    /// * `params` - Values for every placeholder referenced in `query`;
    ///   unused extra keys are accepted
    ///
    /// # Returns
    ///
    /// One [`Row`] per database row, in database fetch order; every row has
    /// exactly the declared columns
    async fn fetch(
        &mut self,
        columns: &[&str],
        query: &str,
        params: &IndexMap<String, Value>,
    ) -> Result<Vec<Row>>;
}
