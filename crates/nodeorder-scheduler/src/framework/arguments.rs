use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// String-keyed plugin arguments
///
/// Values are kept as strings; typed getters parse on access and fall back
/// to the caller's default instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Arguments(BTreeMap<String, String>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Integer value of `key`. `None` when the key is absent, empty, or not
    /// an integer; the last case is logged as a warning.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        let value = match self.get(key) {
            Some(v) if !v.trim().is_empty() => v.trim(),
            _ => {
                debug!("Argument {} not set", key);
                return None;
            }
        };

        match value.parse::<i64>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Could not parse argument {} for key {}: {}", value, key, e);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Accepts any scalar value (`2`, `"2"`, `1.5`, `true`) and keeps its
/// string form
impl<'de> Deserialize<'de> for Arguments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;

        let mut args = BTreeMap::new();
        for (key, value) in raw.unwrap_or_default() {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => String::new(),
                other => {
                    return Err(de::Error::custom(format!(
                        "argument {} must be a scalar, got {}",
                        key, other
                    )))
                }
            };
            args.insert(key, value);
        }

        Ok(Self(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_int() {
        let args: Arguments = [
            ("a", "3"),
            ("b", " 7 "),
            ("c", "seven"),
            ("d", ""),
            ("e", "-2"),
        ]
        .into_iter()
        .collect();

        assert_eq!(args.get_int("a"), Some(3));
        assert_eq!(args.get_int("b"), Some(7));
        assert_eq!(args.get_int("c"), None);
        assert_eq!(args.get_int("d"), None);
        assert_eq!(args.get_int("e"), Some(-2));
        assert_eq!(args.get_int("missing"), None);
    }

    #[test]
    fn test_deserialize_scalars() {
        let args: Arguments = serde_json::from_str(
            r#"{"nodeaffinity.weight": 2, "podaffinity.weight": "3", "flag": true, "ratio": 1.5, "unset": null}"#,
        )
        .unwrap();

        assert_eq!(args.get("nodeaffinity.weight"), Some("2"));
        assert_eq!(args.get_int("podaffinity.weight"), Some(3));
        assert_eq!(args.get("flag"), Some("true"));
        assert_eq!(args.get_int("ratio"), None);
        assert_eq!(args.get_int("unset"), None);
    }

    #[test]
    fn test_deserialize_rejects_nested_values() {
        let result: Result<Arguments, _> = serde_json::from_str(r#"{"weights": {"a": 1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_null_map() {
        let args: Arguments = serde_json::from_str("null").unwrap();
        assert!(args.is_empty());
    }
}
