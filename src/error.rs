//! Canonical error and result types for the crate.
//!
//! This module defines the single public `AcceptanceError` surface used by
//! the configuration layer and the cygnus/hadoop helper clients. Step
//! definitions convert these into scenario failures by panicking.

/// Top-level error type exposed by the acceptance helpers.
///
/// `AcceptanceError` distinguishes configuration problems from transport
/// failures and from verification failures raised while checking persisted
/// notification data.
#[derive(Debug)]
pub enum AcceptanceError {
    /// Reading or decoding the properties file failed.
    Config(String),
    /// An HTTP request to cygnus or hadoop failed at the transport level.
    Http(reqwest::Error),
    /// A constructed endpoint was not a valid URL.
    Url(url::ParseError),
    /// A response body could not be decoded as JSON.
    Json(serde_json::Error),
    /// A request completed with an unexpected HTTP status.
    UnexpectedStatus {
        /// The operation that was being performed.
        operation: &'static str,
        /// The status code the backend returned.
        status: u16,
    },
    /// The deployed component version does not match the configured one.
    VersionMismatch {
        /// The component whose version was checked.
        component: &'static str,
        /// The version the properties file expects.
        expected: String,
        /// The version the backend reported.
        found: String,
    },
    /// The captured notification response carried the wrong status code.
    HttpCodeMismatch {
        /// The code the scenario expects.
        expected: u16,
        /// The code the connector returned.
        found: u16,
    },
    /// An unrecognised persistence mode (not `ROW` or `COLUMN`).
    InvalidMode(String),
    /// An unrecognised notification content kind (not `json` or `xml`).
    InvalidContent(String),
    /// The attribute number capture was not a positive integer.
    InvalidAttributeNumber(String),
    /// A notification was sent before the storage schema was configured.
    SchemaNotConfigured,
    /// A verification did not find the expected content in the stored file.
    Verification {
        /// What the check was looking for.
        needle: String,
        /// The HDFS path that was searched.
        path: String,
    },
}

impl From<reqwest::Error> for AcceptanceError {
    fn from(error: reqwest::Error) -> Self { Self::Http(error) }
}

impl From<url::ParseError> for AcceptanceError {
    fn from(error: url::ParseError) -> Self { Self::Url(error) }
}

impl From<serde_json::Error> for AcceptanceError {
    fn from(error: serde_json::Error) -> Self { Self::Json(error) }
}

impl std::fmt::Display for AcceptanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Http(error) => write!(f, "http error: {error}"),
            Self::Url(error) => write!(f, "invalid endpoint: {error}"),
            Self::Json(error) => write!(f, "invalid json response: {error}"),
            Self::UnexpectedStatus { operation, status } => {
                write!(f, "{operation} returned unexpected status {status}")
            }
            Self::VersionMismatch {
                component,
                expected,
                found,
            } => write!(
                f,
                "{component} version mismatch: expected {expected}, found {found}"
            ),
            Self::HttpCodeMismatch { expected, found } => {
                write!(f, "expected http code {expected}, received {found}")
            }
            Self::InvalidMode(mode) => {
                write!(
                    f,
                    "unknown persistence mode {mode:?} (expected ROW or COLUMN)"
                )
            }
            Self::InvalidContent(content) => {
                write!(
                    f,
                    "unknown notification content {content:?} (expected json or xml)"
                )
            }
            Self::InvalidAttributeNumber(raw) => {
                write!(f, "attribute number {raw:?} is not a positive integer")
            }
            Self::SchemaNotConfigured => {
                write!(
                    f,
                    "no storage schema configured before sending a notification"
                )
            }
            Self::Verification { needle, path } => {
                write!(f, "expected {needle:?} in stored file {path}")
            }
        }
    }
}

impl std::error::Error for AcceptanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(error) => Some(error),
            Self::Url(error) => Some(error),
            Self::Json(error) => Some(error),
            _ => None,
        }
    }
}

/// Canonical result alias used by the helper clients.
pub type Result<T> = std::result::Result<T, AcceptanceError>;
