// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat key/value configuration.

use crate::error::ConfigError;
use peniko::color::{parse_color, AlphaColor, Srgb};
use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};
use tracing::warn;

/// Read access to application settings.
///
/// Missing or malformed values fall back to the given default.
pub trait ConfigStore: Send + Sync {
    fn read_i32(&self, key: &str, default: i32) -> i32;
    fn read_bool(&self, key: &str, default: bool) -> bool;
    fn read_color(&self, key: &str, default: AlphaColor<Srgb>) -> AlphaColor<Srgb>;
    fn read_i32_list(&self, key: &str) -> Vec<i32>;
}

/// An in-memory [`ConfigStore`] backed by a JSON object.
///
/// Colors are stored either as `#rrggbb`/`#rrggbbaa` strings or as `[r, g, b, a]` arrays
/// of 8-bit values.
#[derive(Debug, Default)]
pub struct KeyValueConfig {
    values: RwLock<Map<String, Value>>,
}

impl KeyValueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str(json)? {
            Value::Object(values) => Ok(Self {
                values: RwLock::new(values),
            }),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }

    pub fn to_json_string(&self) -> String {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Value::Object(values.clone()).to_string()
    }

    fn read<T>(&self, key: &str, parse: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let value = values.get(key)?;
        let parsed = parse(value);
        if parsed.is_none() {
            warn!(key, %value, "ignoring unparsable config value");
        }
        parsed
    }
}

fn parse_color_value(value: &Value) -> Option<AlphaColor<Srgb>> {
    match value {
        Value::String(text) => parse_color(text)
            .ok()
            .map(|c| c.to_alpha_color::<Srgb>()),
        Value::Array(items) if items.len() == 3 || items.len() == 4 => {
            let mut rgba = [1.0_f32; 4];
            for (out, item) in rgba.iter_mut().zip(items) {
                *out = item.as_u64().filter(|v| *v <= 255)? as f32 / 255.0;
            }
            Some(AlphaColor::new(rgba))
        }
        _ => None,
    }
}

impl ConfigStore for KeyValueConfig {
    fn read_i32(&self, key: &str, default: i32) -> i32 {
        self.read(key, |v| v.as_i64().and_then(|v| i32::try_from(v).ok()))
            .unwrap_or(default)
    }

    fn read_bool(&self, key: &str, default: bool) -> bool {
        self.read(key, Value::as_bool).unwrap_or(default)
    }

    fn read_color(&self, key: &str, default: AlphaColor<Srgb>) -> AlphaColor<Srgb> {
        self.read(key, parse_color_value).unwrap_or(default)
    }

    fn read_i32_list(&self, key: &str) -> Vec<i32> {
        self.read(key, |v| {
            v.as_array()?
                .iter()
                .map(|item| item.as_i64().and_then(|v| i32::try_from(v).ok()))
                .collect()
        })
        .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_with_defaults() {
        let config = KeyValueConfig::from_json_str(
            r#"{"count": 7, "flag": true, "list": [1, 2, 3], "bad": "x"}"#,
        )
        .unwrap();

        assert_eq!(config.read_i32("count", 0), 7);
        assert_eq!(config.read_i32("missing", 4), 4);
        assert_eq!(config.read_i32("bad", 5), 5);
        assert!(config.read_bool("flag", false));
        assert_eq!(config.read_i32_list("list"), vec![1, 2, 3]);
        assert!(config.read_i32_list("count").is_empty());
    }

    #[test]
    fn colors_from_hex_and_arrays() {
        let config = KeyValueConfig::new();
        config.set("hex", "#ff000080");
        config.set("array", vec![0, 255, 0, 255]);

        let hex = config.read_color("hex", AlphaColor::new([0.0; 4]));
        assert_eq!(hex.components[0], 1.0);
        assert!((hex.components[3] - 128.0 / 255.0).abs() < 1e-3);

        let array = config.read_color("array", AlphaColor::new([0.0; 4]));
        assert_eq!(array.components, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn writes_survive_a_poisoned_lock() {
        let config = std::sync::Arc::new(KeyValueConfig::new());
        let poisoner = config.clone();
        let _ = std::thread::spawn(move || {
            let _values = poisoner.values.write().unwrap();
            panic!("poisoning the config lock");
        })
        .join();
        assert!(config.values.is_poisoned());

        config.set("count", 3);
        assert_eq!(config.read_i32("count", 0), 3);
        assert!(config.to_json_string().contains("count"));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(matches!(
            KeyValueConfig::from_json_str("[1]"),
            Err(ConfigError::NotAnObject)
        ));
    }
}
