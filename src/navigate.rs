//! Absence handling for decoded D&B Direct+ documents.
//!
//! D&B omits sub-documents, sends `null`, or sends `{}` for "no data". All
//! three mean the same thing here, and none of them is an error. Optional
//! sub-documents are declared with [`non_empty`] and optional lists with
//! [`list`], so the rest of the crate only ever sees `Option`/`Vec`.
//!
//! Reference codes are integers, but some sources send them quoted.
//! [`lenient_i64`] accepts both and drops anything else to `None` instead of
//! rejecting the whole document.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// True for `null` and for an object without keys.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Deserializes an optional sub-document, mapping `null` and `{}` to `None`.
pub fn non_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    match value {
        Some(v) if !is_empty_value(&v) => serde_json::from_value(v).map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// Deserializes an optional list, mapping `null` to an empty list.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes an optional integer code given as a number or a numeric
/// string. Other values (fractions, words, objects) become `None`.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let code = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Inner {
        name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[serde(default, deserialize_with = "non_empty")]
        inner: Option<Inner>,
        #[serde(default, deserialize_with = "list")]
        items: Vec<u32>,
    }

    #[derive(Debug, Deserialize)]
    struct Coded {
        #[serde(default, deserialize_with = "lenient_i64")]
        code: Option<i64>,
    }

    fn code(value: serde_json::Value) -> Option<i64> {
        serde_json::from_value::<Coded>(value).unwrap().code
    }

    #[test]
    fn test_empty_value_predicate() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!({"a": 1})));
        assert!(!is_empty_value(&json!([])));
        assert!(!is_empty_value(&json!("")));
    }

    #[test]
    fn test_empty_object_becomes_none() {
        let outer: Outer = serde_json::from_value(json!({"inner": {}, "items": null})).unwrap();
        assert!(outer.inner.is_none());
        assert!(outer.items.is_empty());

        let outer: Outer = serde_json::from_value(json!({})).unwrap();
        assert!(outer.inner.is_none());

        let outer: Outer =
            serde_json::from_value(json!({"inner": {"name": "Acme"}, "items": [1, 2]})).unwrap();
        assert_eq!(outer.inner.and_then(|i| i.name).as_deref(), Some("Acme"));
        assert_eq!(outer.items, vec![1, 2]);
    }

    #[test]
    fn test_quoted_codes_are_accepted() {
        assert_eq!(code(json!({"code": 9092})), Some(9092));
        assert_eq!(code(json!({"code": "1"})), Some(1));
        assert_eq!(code(json!({"code": " 3599 "})), Some(3599));
    }

    #[test]
    fn test_unusable_codes_become_none() {
        assert_eq!(code(json!({})), None);
        assert_eq!(code(json!({"code": null})), None);
        assert_eq!(code(json!({"code": "n/a"})), None);
        assert_eq!(code(json!({"code": 1.5})), None);
        assert_eq!(code(json!({"code": {"value": 1}})), None);
    }
}
