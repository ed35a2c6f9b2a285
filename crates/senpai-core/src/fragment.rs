//! Typed units of the newline-delimited JSON answer stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Auth,
    Server,
    History,
    Unknown,
}

impl ErrorKind {
    /// Maps the `type` field of an error fragment. `timeout` is a server fault.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "auth" => Self::Auth,
            "server" | "timeout" => Self::Server,
            "history" => Self::History,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Server => "server",
            Self::History => "history",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, message)
    }

    pub fn not_authenticated() -> Self {
        Self::auth("You are not authenticated")
    }

    /// Parses an error object such as `{"error": true, "type": "auth", "message": "..."}`.
    pub fn from_value(value: &Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(ErrorKind::from_wire)
            .unwrap_or(ErrorKind::Unknown);
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .unwrap_or_else(|| "Unknown error".to_string());
        Self { kind, message }
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(err: std::io::Error) -> Self {
        Self::server(format!("Connection to the server was interrupted: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentFragment {
    Text(String),
    End,
    Error(ErrorReport),
    Version {
        latest_version: String,
        original_response: Option<String>,
    },
}

impl ContentFragment {
    /// Decodes one stream line. Blank lines and unrecognized objects yield `None`.
    pub fn from_json_line(line: &str) -> Result<Option<Self>, ErrorReport> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|err| ErrorReport::server(format!("Malformed response from server: {err}")))?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(flag) = value.get("error")
            && !matches!(flag, Value::Null | Value::Bool(false))
        {
            return Some(Self::Error(ErrorReport::from_value(value)));
        }
        if let Some(latest) = value.get("latest_version") {
            let latest_version = match latest {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let original_response = value
                .get("original_response")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(ToString::to_string);
            return Some(Self::Version {
                latest_version,
                original_response,
            });
        }
        if value.get("end").and_then(Value::as_bool) == Some(true) {
            return Some(Self::End);
        }
        value
            .get("content")
            .and_then(Value::as_str)
            .map(|delta| Self::Text(delta.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_fragment_shape() {
        assert_eq!(
            ContentFragment::from_json_line(r#"{"content":"$ ls\n"}"#).expect("text"),
            Some(ContentFragment::Text("$ ls\n".to_string()))
        );
        assert_eq!(
            ContentFragment::from_json_line(r#"{"end":true}"#).expect("end"),
            Some(ContentFragment::End)
        );
        assert_eq!(
            ContentFragment::from_json_line(r#"{"latest_version":"1.2.0","original_response":"hi"}"#)
                .expect("version"),
            Some(ContentFragment::Version {
                latest_version: "1.2.0".to_string(),
                original_response: Some("hi".to_string()),
            })
        );
    }

    #[test]
    fn error_fragment_maps_wire_type() {
        let fragment = ContentFragment::from_json_line(
            r#"{"error":true,"type":"auth","message":"You are not authenticated"}"#,
        )
        .expect("decode");
        assert_eq!(
            fragment,
            Some(ContentFragment::Error(ErrorReport::not_authenticated()))
        );

        let timeout = ContentFragment::from_json_line(
            r#"{"error":true,"type":"timeout","message":"slow"}"#,
        )
        .expect("decode");
        assert!(matches!(
            timeout,
            Some(ContentFragment::Error(ErrorReport { kind: ErrorKind::Server, .. }))
        ));
    }

    #[test]
    fn false_error_flag_is_not_an_error() {
        let fragment =
            ContentFragment::from_json_line(r#"{"error":false,"content":"ok"}"#).expect("decode");
        assert_eq!(fragment, Some(ContentFragment::Text("ok".to_string())));
    }

    #[test]
    fn blank_and_unknown_lines_are_skipped() {
        assert_eq!(ContentFragment::from_json_line("   ").expect("blank"), None);
        assert_eq!(
            ContentFragment::from_json_line(r#"{"usage":{"tokens":3}}"#).expect("unknown"),
            None
        );
        assert_eq!(
            ContentFragment::from_json_line(r#"{"end":false}"#).expect("not end"),
            None
        );
    }

    #[test]
    fn garbage_line_is_a_server_error() {
        let err = ContentFragment::from_json_line("<html>").expect_err("garbage");
        assert_eq!(err.kind, ErrorKind::Server);
    }

    #[test]
    fn unknown_wire_type_falls_back() {
        assert_eq!(ErrorKind::from_wire("quota"), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_wire("HISTORY"), ErrorKind::History);
    }
}
