// src/message.rs
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub query: String,
    pub top_k: u32,
    pub chapter_slug: Option<String>,
}

/// Accept whatever shape the backend sent; a value that does not fit `T`
/// becomes `T::default()` instead of failing the whole response.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

/// A retrieved passage. `metadata` is free-form; the backend decides its keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatContext {
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Map<String, Value>,
}

impl ChatContext {
    pub fn chapter(&self) -> Option<&str> {
        self.metadata.get("chapter").and_then(Value::as_str)
    }

    pub fn section(&self) -> Option<&str> {
        self.metadata.get("section").and_then(Value::as_str)
    }

    /// Page number, whether sent as a number or a numeric string.
    pub fn page(&self) -> Option<u64> {
        match self.metadata.get("page")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<ChatContext>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskSelectionRequest {
    pub selected_text: String,
    pub question: String,
    pub chapter_slug: Option<String>,
}

/// A passage the backend retrieved alongside a selection answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectionContext {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub heading: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskSelectionResponse {
    pub answer: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub selected_text: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<SelectionContext>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Error body returned by the backend on non-2xx responses.
/// Either field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// `error` wins over `detail`; blank strings count as absent.
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.detail.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}
