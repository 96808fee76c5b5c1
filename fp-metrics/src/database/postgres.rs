//! PostgreSQL database handle
//!
//! Owns exactly one connection. No pooling, no concurrent queries: callers
//! serialize all uses of one handle, which the `&mut self` receivers
//! enforce at compile time.

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgConnection, PgRow};
use sqlx::query::Query;
use sqlx::{Column, ConnectOptions, Connection, Postgres, Row, TypeInfo};
use tracing::{debug, trace};

use crate::config::ConnectionConfig;
use crate::database::bind::rewrite_placeholders;
use crate::database::traits::ResultFetcher;
use crate::table::{self, Row as ResultRow};
use crate::{Error, Result};

/// A handle over a single PostgreSQL connection
///
/// Lifecycle: construct with a [`ConnectionConfig`], then `connect`, fetch
/// through [`ResultFetcher`], and `disconnect`. Fetching or disconnecting
/// without a live connection is an [`Error::InvalidState`].
pub struct PgHandle {
    config: ConnectionConfig,
    connection: Option<PgConnection>,
    query_timeout: Option<Duration>,
}

impl PgHandle {
    /// Create an unconnected handle
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            connection: None,
            query_timeout: None,
        }
    }

    /// Bound every fetch by the given timeout
    ///
    /// Without one, a hung query blocks indefinitely.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Open the connection using the configured host, database, and port
    ///
    /// If the configuration names a schema, the session search path is set
    /// through the server `options` mechanism before any query executes,
    /// and stays set for the life of the connection. Failures are surfaced
    /// as [`Error::Connection`] and never retried.
    pub async fn connect(&mut self, login: &str, password: &str) -> Result<()> {
        let mut options = PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .database(&self.config.database)
            .username(login)
            .password(password);

        if let Some(schema) = &self.config.schema {
            options = options.options([("search_path", schema.as_str())]);
        }

        debug!(
            host = %self.config.host,
            database = %self.config.database,
            schema = self.config.schema.as_deref(),
            "opening connection"
        );

        let connection = options
            .connect()
            .await
            .map_err(|error| Error::Connection(error.to_string()))?;
        self.connection = Some(connection);
        Ok(())
    }

    /// Close the connection
    pub async fn disconnect(&mut self) -> Result<()> {
        let connection = self
            .connection
            .take()
            .ok_or(Error::InvalidState("disconnect called before connect"))?;
        connection
            .close()
            .await
            .map_err(|error| Error::Connection(error.to_string()))?;
        debug!("connection closed");
        Ok(())
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn connection_mut(&mut self) -> Result<&mut PgConnection> {
        self.connection
            .as_mut()
            .ok_or(Error::InvalidState("fetch called before connect"))
    }
}

/// Bind one parameter value through the driver
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                query.bind(integer)
            } else {
                query.bind(number.as_f64())
            }
        }
        Value::String(text) => query.bind(text.as_str()),
        other => query.bind(other.clone()),
    }
}

/// Decode one row into positional JSON values
///
/// Follows the column type reported by the driver; anything unrecognized
/// falls back to its string representation.
fn decode_row(row: &PgRow) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(row.columns().len());

    for (index, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();

        let value: Value = match type_name {
            "BOOL" => {
                let cell: Option<bool> = row.try_get(index)?;
                cell.map(Value::Bool).unwrap_or(Value::Null)
            }
            "INT2" | "SMALLINT" | "SMALLSERIAL" => {
                let cell: Option<i16> = row.try_get(index)?;
                cell.map(|v| Value::Number(v.into())).unwrap_or(Value::Null)
            }
            "INT4" | "INT" | "INTEGER" | "SERIAL" => {
                let cell: Option<i32> = row.try_get(index)?;
                cell.map(|v| Value::Number(v.into())).unwrap_or(Value::Null)
            }
            "INT8" | "BIGINT" | "BIGSERIAL" => {
                let cell: Option<i64> = row.try_get(index)?;
                cell.map(|v| Value::Number(v.into())).unwrap_or(Value::Null)
            }
            "FLOAT4" | "REAL" => {
                let cell: Option<f32> = row.try_get(index)?;
                cell.and_then(|v| serde_json::Number::from_f64(v as f64))
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            "FLOAT8" | "DOUBLE PRECISION" => {
                let cell: Option<f64> = row.try_get(index)?;
                cell.and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "BPCHAR" => {
                let cell: Option<String> = row.try_get(index)?;
                cell.map(Value::String).unwrap_or(Value::Null)
            }
            "JSON" | "JSONB" => {
                let cell: Option<Value> = row.try_get(index)?;
                cell.unwrap_or(Value::Null)
            }
            "TIMESTAMP" | "TIMESTAMPTZ" | "DATE" | "TIME" | "UUID" | "NUMERIC" | "DECIMAL" => {
                // String representation preserves precision and formatting
                let cell: Option<String> = row.try_get(index).ok().flatten();
                cell.map(Value::String).unwrap_or(Value::Null)
            }
            _ => {
                // Fallback: try to get as string
                let cell: Option<String> = row.try_get(index).ok().flatten();
                cell.map(Value::String).unwrap_or(Value::Null)
            }
        };

        values.push(value);
    }

    Ok(values)
}

#[async_trait]
impl ResultFetcher for PgHandle {
    async fn fetch(
        &mut self,
        columns: &[&str],
        query: &str,
        params: &IndexMap<String, Value>,
    ) -> Result<Vec<ResultRow>> {
        let (sql, values) = rewrite_placeholders(query, params)?;
        let timeout = self.query_timeout;
        let connection = self.connection_mut()?;

        let mut prepared = sqlx::query(&sql);
        for value in &values {
            prepared = bind_value(prepared, value);
        }

        debug!(parameters = values.len(), "executing query");
        let fetch = prepared.fetch_all(&mut *connection);
        let rows = match timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| Error::Timeout)?,
            None => fetch.await,
        }
        .map_err(|error| Error::Query(error.to_string()))?;
        trace!(rows = rows.len(), "query returned");

        rows.iter()
            .map(|row| table::zip_columns(columns, decode_row(row)?))
            .collect()
    }
}
