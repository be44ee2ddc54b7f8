//! Lenient decoding of schema-shaped model output.
//!
//! Model JSON is treated as best-effort: an absent, null or mistyped field
//! decodes to its default instead of failing the whole reply. Only a reply
//! that is not JSON at all is a `Decode` error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{strip_json_fences, CompletionProvider, CompletionRequest, LlmError, ResponseFormat};

/// A typed reply shape requested from the model.
pub trait ResponseShape: DeserializeOwned + Default {
    /// Top-level keys whose absence is reported, not just defaulted.
    const REQUIRED_FIELDS: &'static [&'static str];

    /// Schema sent as `responseSchema`. `None` asks for JSON without a
    /// server-side schema (the prompt carries the structure instead).
    fn schema() -> Option<Value> {
        None
    }
}

/// A decoded reply plus what had to be filled in.
#[derive(Debug, Clone, Serialize)]
pub struct Structured<T> {
    #[serde(flatten)]
    pub value: T,
    /// Required top-level fields the model left out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    /// Set when the service returned nothing usable; `value` is then all defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// `deserialize_with` helper: any value that does not fit `T` becomes `T::default()`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// `deserialize_with` helper for lists: elements that do not fit `T` are
/// dropped, the rest are kept. A non-array value becomes an empty list.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| T::deserialize(item).ok())
        .collect();
    if kept.len() < total {
        debug!("Dropped {} undecodable list element(s)", total - kept.len());
    }
    Ok(kept)
}

/// `deserialize_with` helper for 0–100 scores. Accepts integers, floats and
/// strings such as `"82%"`; rounds and clamps. Anything else becomes 0.
pub fn lenient_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(raw
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u32)
        .unwrap_or_default())
}

/// Sends `request` asking for JSON shaped like `T` and decodes the reply leniently.
pub async fn complete_json<T: ResponseShape>(
    provider: &dyn CompletionProvider,
    request: CompletionRequest,
) -> Result<Structured<T>, LlmError> {
    let request = request.with_format(ResponseFormat::Json { schema: T::schema() });
    let completion = provider.complete(&request).await?;

    if completion.empty {
        return Ok(Structured {
            value: T::default(),
            missing_fields: T::REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            notice: Some(completion.text),
        });
    }

    decode_shape(&completion.text)
}

/// Parses reply text into `T`, tolerating fences, missing keys and wrong types.
pub fn decode_shape<T: ResponseShape>(text: &str) -> Result<Structured<T>, LlmError> {
    let json = strip_json_fences(text);
    let value: Value = serde_json::from_str(json).map_err(|e| LlmError::Decode {
        reason: format!("reply is not valid JSON: {e}"),
        raw: text.to_string(),
    })?;

    let Value::Object(ref map) = value else {
        return Err(LlmError::Decode {
            reason: "reply is not a JSON object".to_string(),
            raw: text.to_string(),
        });
    };

    let missing_fields: Vec<String> = T::REQUIRED_FIELDS
        .iter()
        .filter(|f| map.get(**f).map_or(true, Value::is_null))
        .map(|f| f.to_string())
        .collect();

    if !missing_fields.is_empty() {
        warn!(
            "Model reply for {} is missing required fields: {}",
            std::any::type_name::<T>(),
            missing_fields.join(", ")
        );
    }

    let decoded = T::deserialize(value).unwrap_or_else(|e| {
        debug!("Falling back to defaults for {}: {e}", std::any::type_name::<T>());
        T::default()
    });

    Ok(Structured {
        value: decoded,
        missing_fields,
        notice: None,
    })
}
