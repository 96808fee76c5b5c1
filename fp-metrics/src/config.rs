//! Connection configuration
//!
//! An explicit configuration struct passed into the connection step.
//! Credentials are deliberately not part of it; they are supplied to
//! [`PgHandle::connect`](crate::PgHandle::connect) and never stored.

use serde::{Deserialize, Serialize};

/// Parameters for opening a database connection
///
/// Immutable once a connection is opened. The optional schema scopes
/// unqualified table names by setting the session search path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Database server host
    pub host: String,

    /// Database name
    pub database: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Schema to set as the session search path (if any)
    pub schema: Option<String>,
}

fn default_port() -> u16 {
    5432
}

impl ConnectionConfig {
    /// Create a configuration with the default port and no schema
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            port: default_port(),
            schema: None,
        }
    }

    /// Override the server port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Scope unqualified table names to the given schema
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}
