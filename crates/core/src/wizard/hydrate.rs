//! Lenient decoding of stored step payloads.
//!
//! Stored blobs and context payloads are not trusted to match the current
//! record shape. Decoding never fails: absent fields take their typed
//! default, malformed fields are dropped back to the default one at a time,
//! and everything that does decode is kept.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Decode `value` into `T`, falling back to defaults field by field.
pub fn hydrate_lenient<T>(value: Option<&Value>) -> T
where
    T: DeserializeOwned + Serialize + Default,
{
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return T::default();
    };

    if let Ok(parsed) = serde_json::from_value::<T>(value.clone()) {
        return parsed;
    }

    let Some(incoming) = value.as_object() else {
        tracing::warn!(
            kind = json_kind(value),
            "Step payload is not a JSON object, using defaults"
        );
        return T::default();
    };

    let mut accepted = match serde_json::to_value(T::default()) {
        Ok(Value::Object(map)) => map,
        _ => return T::default(),
    };

    for (key, field) in incoming {
        let mut candidate = accepted.clone();
        candidate.insert(key.clone(), field.clone());
        if serde_json::from_value::<T>(Value::Object(candidate.clone())).is_ok() {
            accepted = candidate;
        } else {
            tracing::warn!(field = %key, "Dropping malformed step field, using default");
        }
    }

    serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
