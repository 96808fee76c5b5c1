//! Tabular artifact types
//!
//! A [`Table`] is an in-memory result set: ordered rows of named columns,
//! built 1:1 from the rows a query returned and optionally reshaped by a
//! report's post-processing step before serialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// A single result row: column name to cell value, in declared column order
pub type Row = IndexMap<String, Value>;

/// An in-memory table of named columns and ordered rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Column names, in header order
    columns: Vec<String>,

    /// Cell values per row, positionally matching `columns`
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from fetched rows
    ///
    /// Every row must carry exactly the declared columns; rows produced by
    /// [`zip_columns`] always do.
    pub fn from_rows(columns: &[&str], rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(columns);
        for mut row in rows {
            // Captured before the removals below so errors report the
            // row's original arity
            let actual = row.len();
            if actual != columns.len() {
                return Err(Error::SchemaMismatch {
                    declared: columns.len(),
                    actual,
                });
            }
            let values = columns
                .iter()
                .map(|column| {
                    row.swap_remove(*column).ok_or(Error::SchemaMismatch {
                        declared: columns.len(),
                        actual,
                    })
                })
                .collect::<Result<Vec<Value>>>()?;
            table.rows.push(values);
        }
        Ok(table)
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Cell values per row, positionally matching the columns
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows (the header is not counted)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Zip one positional row against the declared columns
///
/// The arity check is deliberate: blind zipping silently drops data when
/// the query's projection disagrees with the declared column list.
pub fn zip_columns(columns: &[&str], values: Vec<Value>) -> Result<Row> {
    if values.len() != columns.len() {
        return Err(Error::SchemaMismatch {
            declared: columns.len(),
            actual: values.len(),
        });
    }

    Ok(columns
        .iter()
        .map(|c| (*c).to_string())
        .zip(values)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zip_columns_preserves_order() {
        let row = zip_columns(&["b", "a"], vec![json!(1), json!(2)]).unwrap();
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(row["b"], json!(1));
        assert_eq!(row["a"], json!(2));
    }

    #[test]
    fn test_zip_columns_rejects_arity_mismatch() {
        let result = zip_columns(&["a", "b"], vec![json!(1), json!(2), json!(3)]);
        match result {
            Err(Error::SchemaMismatch { declared, actual }) => {
                assert_eq!(declared, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_from_rows_orders_cells_by_declared_columns() {
        let mut row = Row::new();
        row.insert("second".to_string(), json!("s"));
        row.insert("first".to_string(), json!("f"));

        let table = Table::from_rows(&["first", "second"], vec![row]).unwrap();
        assert_eq!(table.rows()[0], vec![json!("f"), json!("s")]);
    }

    #[test]
    fn test_from_rows_reports_original_arity_on_key_mismatch() {
        let mut row = Row::new();
        row.insert("a".to_string(), json!(1));
        row.insert("wrong".to_string(), json!(2));

        let result = Table::from_rows(&["a", "b"], vec![row]);
        match result {
            Err(Error::SchemaMismatch { declared, actual }) => {
                assert_eq!(declared, 2);
                // The row had two keys; removals along the way must not
                // shrink the reported count
                assert_eq!(actual, 2);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_from_rows_rejects_extra_keys() {
        let mut row = Row::new();
        row.insert("a".to_string(), json!(1));
        row.insert("b".to_string(), json!(2));

        let result = Table::from_rows(&["a"], vec![row]);
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let table = Table::new(&["x", "y"]);
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["x".to_string(), "y".to_string()]);
    }
}
