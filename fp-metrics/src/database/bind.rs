//! Named-placeholder rewriting
//!
//! Queries are written with `%(name)s` placeholders. Before execution they
//! are rewritten to the driver's positional `$n` form and the referenced
//! values are collected in binding order, so substitution always happens
//! driver-side and never by string interpolation.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::{Error, Result};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\((\w+)\)s").expect("placeholder pattern is valid"));

/// Rewrite `%(name)s` placeholders to positional `$n` bindings
///
/// Each distinct name gets one ordinal, reused on repetition. A placeholder
/// with no matching key in `params` is a query error; extra unused keys are
/// accepted.
pub fn rewrite_placeholders<'a>(
    query: &str,
    params: &'a IndexMap<String, Value>,
) -> Result<(String, Vec<&'a Value>)> {
    let mut ordinals: IndexMap<&str, usize> = IndexMap::new();
    let mut values: Vec<&'a Value> = Vec::new();
    let mut rewritten = String::with_capacity(query.len());
    let mut last_end = 0;

    for captures in PLACEHOLDER_RE.captures_iter(query) {
        let matched = captures.get(0).expect("whole match always present");
        let name = captures.get(1).expect("name group always present").as_str();

        let ordinal = match ordinals.get(name) {
            Some(&ordinal) => ordinal,
            None => {
                let value = params.get(name).ok_or_else(|| {
                    Error::Query(format!("missing value for query parameter `{name}`"))
                })?;
                values.push(value);
                let ordinal = values.len();
                ordinals.insert(name, ordinal);
                ordinal
            }
        };

        rewritten.push_str(&query[last_end..matched.start()]);
        rewritten.push_str(&format!("${ordinal}"));
        last_end = matched.end();
    }
    rewritten.push_str(&query[last_end..]);

    Ok((rewritten, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_rewrites_in_first_appearance_order() {
        let params = params(&[("b", json!(2)), ("a", json!(1))]);
        let (sql, values) =
            rewrite_placeholders("select * from t where x = %(a)s and y = %(b)s", &params)
                .unwrap();
        assert_eq!(sql, "select * from t where x = $1 and y = $2");
        assert_eq!(values, vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn test_repeated_name_reuses_one_ordinal() {
        let params = params(&[("fp_id", json!("2072"))]);
        let (sql, values) =
            rewrite_placeholders("select %(fp_id)s where id = %(fp_id)s", &params).unwrap();
        assert_eq!(sql, "select $1 where id = $1");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_missing_parameter_is_a_query_error() {
        let params = params(&[("other", json!(1))]);
        let result = rewrite_placeholders("select %(fp_id)s", &params);
        match result {
            Err(Error::Query(message)) => assert!(message.contains("fp_id")),
            other => panic!("expected Query error, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_unused_keys_are_accepted() {
        let params = params(&[("fp_id", json!("2072")), ("unused", json!(true))]);
        let (sql, values) = rewrite_placeholders("select %(fp_id)s", &params).unwrap();
        assert_eq!(sql, "select $1");
        assert_eq!(values, vec![&json!("2072")]);
    }

    #[test]
    fn test_query_without_placeholders_is_unchanged() {
        let params = params(&[]);
        let (sql, values) = rewrite_placeholders("select 1", &params).unwrap();
        assert_eq!(sql, "select 1");
        assert!(values.is_empty());
    }
}
