//! Key/value application configuration.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{HttpError, Result};

/// Flat configuration store with JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    data: BTreeMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON object; each top-level member becomes a key.
    pub fn from_json(json: &str) -> Result<Self> {
        let data = serde_json::from_str(json)?;
        Ok(Self { data })
    }

    /// Fails with [`HttpError::MissingKey`] when the key is absent.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.data
            .get(key)
            .ok_or_else(|| HttpError::MissingKey(key.to_string()))
    }

    /// Reads a value into a concrete type.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        Ok(T::deserialize(self.get(key)?)?)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Result<Value> {
        self.data
            .remove(key)
            .ok_or_else(|| HttpError::MissingKey(key.to_string()))
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Copies every key of `other`, replacing existing values.
    pub fn merge(&mut self, other: &Self) {
        self.data
            .extend(other.data.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn all(&self) -> &BTreeMap<String, Value> {
        &self.data
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_and_set() {
        let mut config = Config::new();
        assert!(matches!(config.get("timezone"), Err(HttpError::MissingKey(k)) if k == "timezone"));

        config.set("timezone", "Europe/Brussels");
        config.set("debug", true);
        assert!(config.has("timezone"));
        assert_eq!(config.get("debug").unwrap(), &json!(true));
        assert_eq!(config.get_as::<String>("timezone").unwrap(), "Europe/Brussels");
        assert!(config.get_as::<u32>("timezone").is_err());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut config: Config = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(config.remove("a").unwrap(), json!(1));
        assert!(config.remove("a").is_err());
        config.clear();
        assert!(config.all().is_empty());
    }

    #[test]
    fn test_merge_overrides() {
        let mut config = Config::from_json(r#"{ "name": "blog", "items": 10 }"#).unwrap();
        let local = Config::from_json(r#"{ "items": 25, "locale": "fr" }"#).unwrap();
        config.merge(&local);

        assert_eq!(config.get("name").unwrap(), &json!("blog"));
        assert_eq!(config.get("items").unwrap(), &json!(25));
        assert_eq!(config.all().len(), 3);
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(matches!(Config::from_json("[1, 2]"), Err(HttpError::Json(_))));
    }
}
