use std::{
    collections::{btree_map, BTreeMap},
    fmt,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ArgumentError;

/// Machine-readable context attached to a failure.
///
/// Keys are kept sorted so the text rendering is deterministic. The map sits
/// behind an `Arc`: cloning a `Data` shares the payload instead of copying it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Data(Arc<BTreeMap<String, Value>>);

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload with `key` set to `value`.
    ///
    /// Copies the underlying map only if it is currently shared.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    /// True when both values point at the same underlying map.
    pub fn shares_payload(&self, other: &Data) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn into_map(self) -> BTreeMap<String, Value> {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl From<BTreeMap<String, Value>> for Data {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(Arc::new(map))
    }
}

impl From<Arc<BTreeMap<String, Value>>> for Data {
    fn from(map: Arc<BTreeMap<String, Value>>) -> Self {
        Self(map)
    }
}

impl From<serde_json::Map<String, Value>> for Data {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Data
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<BTreeMap<_, _>>();
        Self::from(map)
    }
}

impl TryFrom<Value> for Data {
    type Error = ArgumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            Value::Null => Err(ArgumentError::MissingData),
            other => Err(ArgumentError::NotAMap {
                found: json_kind(&other),
            }),
        }
    }
}

impl<'a> IntoIterator for &'a Data {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders as `{key value, key value}` in key order.
///
/// Keys are bare, strings are quoted with JSON escaping, `null` is `nil`,
/// arrays are `[a b]` and nested objects follow the map rule.
impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_map(f, self.0.iter())
    }
}

fn write_map<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> fmt::Result {
    f.write_str("{")?;
    for (idx, (key, value)) in entries.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key} ")?;
        write_value(f, value)?;
    }
    f.write_str("}")
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("nil"),
        Value::Bool(flag) => write!(f, "{flag}"),
        Value::Number(number) => write!(f, "{number}"),
        // Value's Display emits the JSON-escaped, quoted form.
        Value::String(_) => write!(f, "{value}"),
        Value::Array(items) => {
            f.write_str("[")?;
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    f.write_str(" ")?;
                }
                write_value(f, item)?;
            }
            f.write_str("]")
        }
        Value::Object(map) => write_map(f, map.iter()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builds a [`Data`] payload from `key => value` pairs.
///
/// ```
/// let data = flowfail_types::data! { "code" => 42, "stage" => "parse" };
/// assert_eq!(data.to_string(), r#"{code 42, stage "parse"}"#);
/// ```
#[macro_export]
macro_rules! data {
    () => {
        $crate::Data::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Data::new()$(.with($key, $value))+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn renders_scalar_payload() {
        let data = Data::new().with("code", 42);
        assert_eq!(data.to_string(), "{code 42}");
        assert_eq!(Data::new().to_string(), "{}");
    }

    #[test]
    fn renders_keys_in_sorted_order() {
        let data = crate::data! { "zeta" => true, "alpha" => "x\"y", "mid" => 1.5 };
        assert_eq!(data.to_string(), r#"{alpha "x\"y", mid 1.5, zeta true}"#);
    }

    #[test]
    fn renders_nested_values() {
        let data = Data::try_from(json!({
            "ids": [1, 2, null],
            "request": { "path": "/v1", "retry": false }
        }))
        .expect("object payload");
        assert_eq!(
            data.to_string(),
            r#"{ids [1 2 nil], request {path "/v1", retry false}}"#
        );
    }

    #[test]
    fn rejects_non_map_json() {
        assert_eq!(Data::try_from(Value::Null), Err(ArgumentError::MissingData));
        assert_eq!(
            Data::try_from(json!([1, 2])),
            Err(ArgumentError::NotAMap { found: "array" })
        );
        assert_eq!(
            Data::try_from(json!("text")),
            Err(ArgumentError::NotAMap { found: "string" })
        );
    }

    #[test]
    fn clones_share_payload_until_written() {
        let original = Data::new().with("code", 1);
        let shared = original.clone();
        assert!(original.shares_payload(&shared));

        let extended = shared.with("extra", 2);
        assert!(!original.shares_payload(&extended));
        assert_eq!(original.len(), 1);
        assert_eq!(extended.len(), 2);
    }

    #[test]
    fn serializes_as_plain_object() {
        let data = crate::data! { "code" => 42 };
        let encoded = serde_json::to_value(&data).expect("serialize data");
        assert_eq!(encoded, json!({ "code": 42 }));
        let decoded: Data = serde_json::from_value(encoded).expect("deserialize data");
        assert_eq!(decoded, data);
    }

    proptest! {
        #[test]
        fn rendering_mentions_every_pair(entries in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8)) {
            let data: Data = entries.clone().into_iter().collect();
            let rendered = data.to_string();
            prop_assert_eq!(rendered.chars().next(), Some('{'));
            prop_assert_eq!(rendered.chars().last(), Some('}'));
            for (key, value) in &entries {
                let pair = format!("{key} {value}");
                prop_assert!(rendered.contains(&pair));
            }
            prop_assert_eq!(rendered, data.clone().to_string());
        }
    }
}
