//! Lenient reading of JSON that a language model was asked to produce.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Parses `response` as a JSON object. Falls back to the outermost `{...}`
/// span when the model wrapped the object in prose or code fences, and to an
/// empty object when nothing parses.
pub fn extract_json(response: &str) -> Map<String, Value> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(response.trim()) {
        return map;
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&response[start..=end]) {
                return map;
            }
        }
    }

    Map::new()
}

/// Reads `key` from a model response as `T`, or returns `fallback` (logging why).
pub fn field_or<T: DeserializeOwned>(response: &str, key: &str, fallback: T) -> T {
    let map = extract_json(response);
    match map.get(key) {
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("⚠️ Model output for {:?} has the wrong shape ({}), using fallback", key, e);
                fallback
            }
        },
        None => {
            warn!("⚠️ Model output has no {:?} key, using fallback", key);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_object() {
        let map = extract_json(r#"{"CommonTopics": ["Finance"]}"#);
        assert_eq!(map["CommonTopics"][0], "Finance");
    }

    #[test]
    fn test_extract_fenced_object() {
        let response = "Here you go:\n```json\n{\"CommonTopics\": [\"Finance\", \"Legal\"]}\n```";
        let map = extract_json(response);
        assert_eq!(map["CommonTopics"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_garbage_yields_empty_object() {
        assert!(extract_json("I cannot answer that.").is_empty());
        assert!(extract_json("} nonsense {").is_empty());
        assert!(extract_json("[1, 2, 3]").is_empty());
    }

    #[test]
    fn test_field_or_fallbacks() {
        let fallback = vec!["Finance".to_string()];
        let topics: Vec<String> = field_or("not json", "CommonTopics", fallback.clone());
        assert_eq!(topics, fallback);

        let topics: Vec<String> = field_or(r#"{"CommonTopics": "Finance"}"#, "CommonTopics", fallback.clone());
        assert_eq!(topics, fallback);

        let topics: Vec<String> = field_or(r#"{"CommonTopics": ["Markets"]}"#, "CommonTopics", fallback);
        assert_eq!(topics, vec!["Markets".to_string()]);
    }
}
