use thiserror::Error;

/// Failure of a single content API call.
///
/// All variants are soft failures for the navigator: they are logged and
/// the affected state keeps its previous value.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("network error requesting {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {path}: {message}")]
    Status { status: u16, path: String, message: String },
    /// The response body was not the expected JSON shape.
    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// HTTP status code when the server responded with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human readable message out of an error body.
///
/// The backend answers errors with `{"message": ...}` or `{"error": ...}`;
/// anything else is reported verbatim (truncated).
pub(crate) fn error_message_from_body(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(200).collect()
}
