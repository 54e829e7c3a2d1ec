//! Error types for the speed test engine.
//!
//! Every fallible operation returns a [`SpeedTestError`], which pairs an
//! [`ErrorKind`] with a user-facing message and an optional suggestion.
//! Only [`ErrorKind::DirectoryUnreachable`] and
//! [`ErrorKind::NoServersAvailable`] ever stop a run; the other kinds are
//! produced and absorbed inside the engine.

use std::error::Error;
use std::fmt;

/// Exit codes for the application.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Network error (connection failed, timeout, directory down).
    pub const NETWORK_ERROR: i32 = 1;
    /// API error (server returned an error response).
    pub const API_ERROR: i32 = 2;
    /// Configuration error (invalid arguments).
    pub const CONFIG_ERROR: i32 = 3;
    /// The directory listed no usable measurement server.
    pub const NO_SERVER: i32 = 5;
    /// Unknown/unexpected error.
    pub const UNKNOWN_ERROR: i32 = 99;
}

/// Categories of errors that can occur during a measurement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The directory service could not be fetched.
    DirectoryUnreachable,
    /// The directory returned no candidate with a usable URL.
    NoServersAvailable,
    /// Every latency sample against one server failed.
    LatencyProbeFailed,
    /// A single request inside a transfer worker failed.
    TransferRequestFailed,
    /// The environment cannot send a streamed request body.
    StreamingUnsupported,
    /// Network connectivity issues.
    Network,
    /// Request timed out.
    Timeout,
    /// Server answered with an error status or an unreadable body.
    Api,
    /// Invalid configuration or arguments.
    Config,
    /// Unknown or unexpected errors.
    Unknown,
}

impl ErrorKind {
    /// Get the exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::DirectoryUnreachable => exit_codes::NETWORK_ERROR,
            ErrorKind::NoServersAvailable => exit_codes::NO_SERVER,
            ErrorKind::Network => exit_codes::NETWORK_ERROR,
            ErrorKind::Timeout => exit_codes::NETWORK_ERROR,
            ErrorKind::TransferRequestFailed => exit_codes::NETWORK_ERROR,
            ErrorKind::LatencyProbeFailed => exit_codes::NETWORK_ERROR,
            ErrorKind::Api => exit_codes::API_ERROR,
            ErrorKind::Config => exit_codes::CONFIG_ERROR,
            ErrorKind::StreamingUnsupported => exit_codes::UNKNOWN_ERROR,
            ErrorKind::Unknown => exit_codes::UNKNOWN_ERROR,
        }
    }

    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::DirectoryUnreachable => "Directory unreachable",
            ErrorKind::NoServersAvailable => "No server available",
            ErrorKind::LatencyProbeFailed => "Latency probe failed",
            ErrorKind::TransferRequestFailed => "Transfer request failed",
            ErrorKind::StreamingUnsupported => "Streaming upload unsupported",
            ErrorKind::Network => "Network error",
            ErrorKind::Timeout => "Request timeout",
            ErrorKind::Api => "API error",
            ErrorKind::Config => "Configuration error",
            ErrorKind::Unknown => "Unknown error",
        }
    }

    /// Whether an error of this kind halts a measurement run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::DirectoryUnreachable | ErrorKind::NoServersAvailable
        )
    }
}

/// A user-friendly error type for speed test operations.
#[derive(Debug)]
pub struct SpeedTestError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// User-friendly error message.
    pub message: String,
    /// Optional suggestion for how to resolve the error.
    pub suggestion: Option<String>,
    /// The underlying error, if any.
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl SpeedTestError {
    /// Create a new SpeedTestError.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), suggestion: None, source: None }
    }

    /// Add a suggestion for how to resolve the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add the underlying error source.
    pub fn with_source(
        mut self,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    /// The directory service could not be reached.
    pub fn directory_unreachable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DirectoryUnreachable, message).with_suggestion(
            "Check the directory URL and your internet connection.",
        )
    }

    /// The directory listed nothing usable.
    pub fn no_servers(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoServersAvailable, message).with_suggestion(
            "No measurement server is registered right now. Try again later \
             or pass a server with --server.",
        )
    }

    /// All latency samples against a server failed.
    pub fn latency_probe_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LatencyProbeFailed, message)
    }

    /// One request inside a transfer loop failed.
    pub fn transfer_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransferRequestFailed, message)
    }

    /// Streamed request bodies cannot be sent.
    pub fn streaming_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StreamingUnsupported, message)
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
            .with_suggestion("Check your internet connection and try again.")
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message).with_suggestion(
            "The server may be slow or unreachable. Try again later.",
        )
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, message)
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

impl fmt::Display for SpeedTestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.description(), self.message)?;

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

impl Error for SpeedTestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl From<reqwest::Error> for SpeedTestError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            ErrorKind::Timeout
        } else if error.is_connect() {
            ErrorKind::Network
        } else if error.is_status() || error.is_decode() {
            ErrorKind::Api
        } else {
            classify_error(&error)
        };

        SpeedTestError::new(kind, error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for SpeedTestError {
    fn from(error: serde_json::Error) -> Self {
        SpeedTestError::api(format!("unreadable response body: {}", error))
            .with_source(error)
    }
}

impl From<url::ParseError> for SpeedTestError {
    fn from(error: url::ParseError) -> Self {
        SpeedTestError::config(format!("invalid URL: {}", error))
            .with_source(error)
    }
}

/// Classify an error into an ErrorKind based on its message.
pub fn classify_error(error: &dyn Error) -> ErrorKind {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("timeout")
        || error_str.contains("timed out")
        || error_str.contains("deadline")
    {
        return ErrorKind::Timeout;
    }

    if error_str.contains("dns")
        || error_str.contains("resolve")
        || error_str.contains("connection refused")
        || error_str.contains("connection reset")
        || error_str.contains("network unreachable")
        || error_str.contains("host unreachable")
        || error_str.contains("no route")
        || error_str.contains("broken pipe")
    {
        return ErrorKind::Network;
    }

    if error_str.contains("status: 4")
        || error_str.contains("status: 5")
        || error_str.contains("server error")
    {
        return ErrorKind::Api;
    }

    ErrorKind::Unknown
}

/// Format an error for user display.
pub fn format_error_for_display(error: &SpeedTestError) -> String {
    let mut output = format!("Error: {}", error.message);

    if let Some(ref suggestion) = error.suggestion {
        output.push_str(&format!("\n\nSuggestion: {}", suggestion));
    }

    output
}
