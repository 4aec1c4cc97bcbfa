//! Serialization settings for outbound API arguments.

use serde::Serialize;
use serde_json::Value;

/// How API arguments are turned into JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSettings {
    /// Drop `null` object members before sending; the API treats a missing
    /// argument and an explicit `null` differently.
    pub skip_nulls: bool,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self { skip_nulls: true }
    }
}

impl JsonSettings {
    /// Serializes `value` according to these settings.
    pub fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(value)?;
        if self.skip_nulls {
            strip_nulls(&mut value);
        }
        Ok(value)
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skips_nested_nulls() {
        let args = json!({ "channel": "C1", "thread_ts": null, "blocks": [{ "text": null, "type": "divider" }] });
        let value = JsonSettings::default().to_value(&args).unwrap();
        assert_eq!(value, json!({ "channel": "C1", "blocks": [{ "type": "divider" }] }));

        let kept = JsonSettings { skip_nulls: false }.to_value(&args).unwrap();
        assert_eq!(kept, args);
    }
}
