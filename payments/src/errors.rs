use std::fmt;

use serde_json::Value;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    Validation,
    Unauthorized,
    NotFound,
    Expired,
    Generic,
}
impl ApiErrorKind {
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            400 => ApiErrorKind::Validation,
            403 => ApiErrorKind::Unauthorized,
            404 => ApiErrorKind::NotFound,
            410 => ApiErrorKind::Expired,
            _ => ApiErrorKind::Generic,
        }
    }
}
impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiErrorKind::Validation => "validation error",
            ApiErrorKind::Unauthorized => "authentication error",
            ApiErrorKind::NotFound => "not found",
            ApiErrorKind::Expired => "payment link expired",
            ApiErrorKind::Generic => "api error",
        };
        f.write_str(s)
    }
}

/// A failed call to the gateway.
///
/// `status_code` is 0 when no HTTP response came back at all (connection
/// failure, timeout). `raw` holds the error body as the gateway sent it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status_code: u16,
    pub request_id: Option<String>,
    pub raw: Option<Value>,
}
impl ApiError {
    /// Maps a status code and an optional error body to an error.
    ///
    /// The body's `message` wins over `fallback_message`. A 2xx status only
    /// reaches this when the body said `success: false`, which lands on
    /// [`ApiErrorKind::Generic`].
    pub fn classify(status_code: u16, body: Option<&Value>, fallback_message: &str) -> Self {
        let message = body
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback_message)
            .to_string();
        let request_id = body
            .and_then(|b| b.get("meta"))
            .and_then(|meta| meta.get("requestId"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            kind: ApiErrorKind::from_status(status_code),
            message,
            status_code,
            request_id,
            raw: body.cloned(),
        }
    }

    /// An error for a call that failed before any HTTP response came back.
    pub fn transport(err: &reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
        let message = if err.is_timeout() {
            format!("Request timed out: {err}")
        } else {
            format!("Request failed: {err}")
        };
        Self::classify(status_code, None, &message)
    }

    /// The response arrived but its body could not be read. The status is
    /// kept, so the kind still follows the status table.
    pub fn unreadable_body(status_code: u16, cause: &dyn fmt::Display) -> Self {
        Self::classify(
            status_code,
            None,
            &format!("Could not read response body: {cause}"),
        )
    }

    pub(crate) fn invalid_body(status_code: u16, body: Option<Value>, err: &serde_json::Error) -> Self {
        Self {
            kind: ApiErrorKind::Generic,
            message: format!("Unexpected response body: {err}"),
            status_code,
            request_id: None,
            raw: body,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid client configuration: {0}")]
    Config(String),
}
impl Error {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
    pub fn kind(&self) -> Option<ApiErrorKind> {
        self.api().map(|err| err.kind)
    }
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidRequest(_)) || self.kind() == Some(ApiErrorKind::Validation)
    }
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == Some(ApiErrorKind::Unauthorized)
    }
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ApiErrorKind::NotFound)
    }
    pub fn is_expired(&self) -> bool {
        self.kind() == Some(ApiErrorKind::Expired)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
