use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status mpv puts in `error` when the command worked.
pub const SUCCESS: &str = "success";

// ── mpv IPC (newline-delimited JSON over the control socket) ─────────────────

/// Which `get_property*` variant to ask for.  `get_property` returns the
/// native type (numbers for times and sizes), `get_property_string` returns
/// mpv's formatted string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    Float,
    String,
}

impl PropertyShape {
    pub fn command_name(self) -> &'static str {
        match self {
            PropertyShape::Float => "get_property",
            PropertyShape::String => "get_property_string",
        }
    }
}

/// A single read-only property query.
#[derive(Debug, Clone, Serialize)]
pub struct MpvCommand<'a> {
    command: [&'a str; 2],
}

impl<'a> MpvCommand<'a> {
    pub fn get_property(name: &'a str, shape: PropertyShape) -> Self {
        Self {
            command: [shape.command_name(), name],
        }
    }

    /// Serialised command including the trailing newline mpv waits for.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Reply to a property query.  mpv leaves `data` out when the query failed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyReply<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: String,
}

impl<T: DeserializeOwned + Default> PropertyReply<T> {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn is_success(&self) -> bool {
        self.error == SUCCESS
    }

    /// `Ok(data)` on success, the verbatim status otherwise.
    pub fn into_result(self) -> Result<T, String> {
        if self.is_success() {
            Ok(self.data.unwrap_or_default())
        } else {
            Err(self.error)
        }
    }
}

/// mpv pushes events (`{"event":"pause"}`, `property-change`, ...) to every
/// connected client.  They are never replies to our queries.
pub fn is_event_line(value: &Value) -> bool {
    value.get("event").is_some()
}

// ── HTTP payload ──────────────────────────────────────────────────────────────

/// Body returned by the HTTP endpoint.  On success `error` carries the
/// `"success"` sentinel alongside `result`; on failure `result` is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub error: String,
}

impl ApiResponse {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            error: SUCCESS.to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: message.into(),
        }
    }
}
