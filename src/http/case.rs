//! Key-case conversion for JSON bodies.
//!
//! The API speaks camelCase; callers and results use snake_case.

use heck::{ToLowerCamelCase, ToSnakeCase};
use serde_json::{Map, Value};

/// Converts every object key in `value`, at any depth, to camelCase.
pub fn camelize_keys(value: Value) -> Value {
    transform_keys(value, &|key| key.to_lower_camel_case())
}

/// Converts every object key in `value`, at any depth, to snake_case.
pub fn snakeize_keys(value: Value) -> Value {
    transform_keys(value, &|key| key.to_snake_case())
}

fn transform_keys(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (f(&k), transform_keys(v, f)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| transform_keys(v, f)).collect())
        }
        other => other,
    }
}
