use serde_json::Value;
use thiserror::Error;

/// Error codes reported by the local service in its `error.type` field.
const ERROR_TYPES: &[(i64, &str)] = &[
    // Protocol and authentication
    (4001, "Unknown method"),
    (4002, "Error parsing request"),
    (4003, "Unknown service"),
    (4004, "Service not responding"),
    (4102, "Invalid OAuthToken"),
    (4103, "Expired OAuth token"),
    (4104, "OAuth token not verified"),
    (4105, "Token verification denied, too many requests"),
    (4106, "Token verification timeout"),
    (4107, "Invalid Csrf token"),
    (4108, "OAuth token is invalid for current user"),
    (4109, "Invalid Csrf path"),
    (4110, "No user logged in"),
    (4111, "Invalid scope"),
    (4112, "Csrf challenge failed"),
    // Billing and premium
    (4201, "Upgrade to premium"),
    (4202, "Upgrade to premium or wait"),
    (4203, "Billing failed"),
    (4204, "Technical error"),
    (4205, "Commercial is playing"),
    // Content availability
    (4301, "Content is unavailable but can be purchased"),
    (4302, "Premium only content"),
    (4303, "Content unavailable"),
];

const UNEXPECTED_ERROR: &str = "Unexpected error";

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Unable to connect to client")]
    Connection { start: u16, end: u16 },

    #[error("Unable to decode JSON result: {0}")]
    Decode(String),

    #[error("{message}")]
    Service { code: i64, message: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl RemoteError {
    /// Build a service error from the `error` object of a response body.
    pub fn from_envelope(error: &Value) -> Self {
        let code = envelope_code(error);
        RemoteError::Service {
            code,
            message: error_message(code),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        RemoteError::Decode(format!("missing field `{}`", field))
    }

    /// Map a transport failure, keeping connect failures distinguishable so
    /// port discovery can move on to the next port.
    pub fn from_transport(err: reqwest::Error, port: u16) -> Self {
        if err.is_connect() {
            RemoteError::Connection { start: port, end: port }
        } else {
            RemoteError::Http(err)
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, RemoteError::Connection { .. })
    }
}

/// Look up the human readable message for a service error code.
pub fn error_message(code: i64) -> &'static str {
    ERROR_TYPES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
        .unwrap_or(UNEXPECTED_ERROR)
}

/// The service sends `type` either as a number or as a numeric string.
/// Fractional numbers are truncated.
fn envelope_code(error: &Value) -> i64 {
    match error.get("type") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
