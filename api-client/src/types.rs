use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;

const RESULT_CODE_KEY: &str = "rc";
const MESSAGE_KEY: &str = "message";
const PAYLOAD_KEY: &str = "data";
const PARSE_ERROR: &str = "parsererror";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Outcome of one call. Exactly one variant is populated.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseResult {
    Success(Value),
    Application(ApplicationError),
    Transport(TransportError),
}

impl ResponseResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Value, CallError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Application(err) => Err(CallError::Application(err)),
            Self::Transport(err) => Err(CallError::Transport(err)),
        }
    }
}

/// The backend answered but reported a non-zero result code.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationError {
    pub rc: i64,
    pub message: String,
    /// Full response body as received.
    pub data: Value,
}

impl ApplicationError {
    fn from_body(rc: i64, data: Value) -> Self {
        let message = match data.get(MESSAGE_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self { rc, message, data }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {} {}", self.rc, self.message)
    }
}

/// The exchange never produced a usable backend response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError {
    /// `None` when no HTTP response was received at all.
    pub status: Option<u16>,
    pub status_text: String,
    pub error: String,
}

impl TransportError {
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        let status_text = if err.is_timeout() { "timeout" } else { "error" };
        Self {
            status: err.status().map(|s| s.as_u16()),
            status_text: status_text.to_string(),
            error: err.to_string(),
        }
    }

    fn unexpected_status(status: StatusCode, body: &str) -> Self {
        let body = body.trim();
        let error = if body.is_empty() {
            "unexpected status".to_string()
        } else {
            body.chars().take(MAX_ERROR_BODY_CHARS).collect()
        };
        Self {
            status: Some(status.as_u16()),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            error,
        }
    }

    fn malformed(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status: Some(status.as_u16()),
            status_text: PARSE_ERROR.to_string(),
            error: error.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP {} {} ({})",
            self.status.unwrap_or_default(),
            self.status_text,
            self.error
        )
    }
}

/// Failure half of [`ResponseResult`], as handed to failure reactions.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error("{0}")]
    Application(ApplicationError),
    #[error("{0}")]
    Transport(TransportError),
}

impl CallError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Raw backend body. Only application failures carry one.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Application(err) => Some(&err.data),
            Self::Transport(_) => None,
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Classify a received HTTP response.
///
/// A body that is a JSON value with a zero or missing `rc` is a success and
/// its `data` member (or the whole body when `data` is absent) is the
/// payload. A non-zero `rc` is an application failure, even on a non-2xx
/// status. Anything else is a transport failure.
pub fn classify_response(status: StatusCode, body: &str) -> ResponseResult {
    let parsed = serde_json::from_str::<Value>(body);

    if !status.is_success() {
        if let Ok(value) = parsed
            && value.is_object()
            && let Ok(rc) = result_code(&value)
            && rc != 0
        {
            return ResponseResult::Application(ApplicationError::from_body(rc, value));
        }
        return ResponseResult::Transport(TransportError::unexpected_status(status, body));
    }

    let value = match parsed {
        Ok(value) => value,
        Err(err) => {
            return ResponseResult::Transport(TransportError::malformed(status, err.to_string()));
        }
    };

    match result_code(&value) {
        Ok(0) => ResponseResult::Success(into_payload(value)),
        Ok(rc) => ResponseResult::Application(ApplicationError::from_body(rc, value)),
        Err(err) => ResponseResult::Transport(TransportError::malformed(status, err)),
    }
}

fn result_code(body: &Value) -> Result<i64, String> {
    match body.get(RESULT_CODE_KEY) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|code| code.is_finite() && code.fract() == 0.0)
                    .map(|code| code as i64)
            })
            .ok_or_else(|| format!("result code {n} is not an integer")),
        Some(other) => Err(format!("result code {other} is not a number")),
    }
}

fn into_payload(mut body: Value) -> Value {
    if let Value::Object(map) = &mut body
        && let Some(payload) = map.remove(PAYLOAD_KEY)
    {
        return payload;
    }
    body
}
