//! Query string decoding.
//!
//! Turns `a=1&b=x&b=y&tag[]=z&page[size]=10` into
//! `{"a": "1", "b": ["x", "y"], "tag": ["z"], "page": {"size": "10"}}`.
//! Leaves are always strings; the route's query field coerces them.

use serde_json::{Map, Value};
use thiserror::Error;

/// The query string could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Percent-encoding or pair syntax was invalid.
    #[error("{0}")]
    Syntax(String),

    /// A key is used both as a scalar and as a nested structure.
    #[error("conflicting uses of key '{0}'")]
    Conflict(String),
}

/// Decodes a raw query string (without the leading `?`).
///
/// # Errors
///
/// Returns [`QueryError`] on invalid encoding or when the same key is used
/// as both a value and an object.
pub fn parse_query(query: &str) -> Result<Value, QueryError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(query).map_err(|e| QueryError::Syntax(e.to_string()))?;

    let mut root = Map::new();
    for (key, value) in pairs {
        let (base, nested) = split_key(&key);
        insert(&mut root, &key, base, &nested, value)?;
    }
    Ok(Value::Object(root))
}

/// Splits `a[b][]` into `("a", ["b", ""])`.
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    if open == 0 || !key.ends_with(']') {
        return (key, Vec::new());
    }

    let mut parts = Vec::new();
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return (key, Vec::new());
        };
        parts.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        return (key, Vec::new());
    }
    (&key[..open], parts)
}

fn insert(
    map: &mut Map<String, Value>,
    full_key: &str,
    name: &str,
    nested: &[&str],
    value: String,
) -> Result<(), QueryError> {
    match nested.split_first() {
        None => {
            push_leaf(map, full_key, name, value, false)?;
        }
        Some((&"", [])) => {
            push_leaf(map, full_key, name, value, true)?;
        }
        Some((&child, rest)) => {
            let entry = map
                .entry(name.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(inner) = entry else {
                return Err(QueryError::Conflict(full_key.to_string()));
            };
            insert(inner, full_key, child, rest, value)?;
        }
    }
    Ok(())
}

fn push_leaf(
    map: &mut Map<String, Value>,
    full_key: &str,
    name: &str,
    value: String,
    force_array: bool,
) -> Result<(), QueryError> {
    let value = Value::String(value);
    match map.get_mut(name) {
        None if force_array => {
            map.insert(name.to_string(), Value::Array(vec![value]));
        }
        None => {
            map.insert(name.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing @ Value::String(_)) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        Some(_) => return Err(QueryError::Conflict(full_key.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty() {
        assert_eq!(parse_query("").unwrap(), json!({}));
    }

    #[test]
    fn test_plain_pairs() {
        assert_eq!(
            parse_query("page=2&title=Milk%20and%20eggs&q=a+b").unwrap(),
            json!({"page": "2", "title": "Milk and eggs", "q": "a b"})
        );
    }

    #[test]
    fn test_repeated_keys_become_arrays() {
        assert_eq!(
            parse_query("tag=a&tag=b&tag=c").unwrap(),
            json!({"tag": ["a", "b", "c"]})
        );
    }

    #[test]
    fn test_bracket_array() {
        assert_eq!(parse_query("tag[]=a").unwrap(), json!({"tag": ["a"]}));
        assert_eq!(parse_query("tag[]=a&tag[]=b").unwrap(), json!({"tag": ["a", "b"]}));
    }

    #[test]
    fn test_nested_objects() {
        assert_eq!(
            parse_query("page[size]=10&page[number]=3&filter[tags][]=x").unwrap(),
            json!({"page": {"size": "10", "number": "3"}, "filter": {"tags": ["x"]}})
        );
    }

    #[test]
    fn test_malformed_brackets_are_literal_keys() {
        assert_eq!(parse_query("a[b=1").unwrap(), json!({"a[b": "1"}));
        assert_eq!(parse_query("[x]=1").unwrap(), json!({"[x]": "1"}));
    }

    #[test]
    fn test_conflict() {
        let err = parse_query("page=1&page[size]=10").unwrap_err();
        assert_eq!(err, QueryError::Conflict("page[size]".into()));
    }
}
