//! Error types for the Counsel core library.
//!
//! Every failure the client can observe is funnelled into [`CounselError`],
//! which carries a stable code, a category and an optional user-facing
//! suggestion. Recovery is always "offer the user a path back to case
//! input"; nothing in this crate retries on its own except the fixed-interval
//! reconciliation poller.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Config | Environment, config file, and validation errors |
//! | E2001-E2099 | API | Backend request, response and availability errors |
//! | E3001-E3099 | Stream | Event stream transport and analysis failures |
//! | E4001-E4099 | Intake | Form validation, extraction and case creation errors |
//! | E5001-E5099 | Results | Final results retrieval errors |
//! | E9001-E9099 | General | Internal, IO and serialization errors |

use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// The main error type for the Counsel core library.
#[derive(Debug, Error)]
pub enum CounselError {
    // ========================================================================
    // Configuration Errors (E1001-E1099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E1002] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E1003] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // API Errors (E2001-E2099)
    // ========================================================================
    /// Request could not be sent or returned a non-success status
    #[error("[E2001] API request failed: {0}")]
    ApiRequestFailed(String),

    /// Response body did not match the expected shape
    #[error("[E2002] Failed to parse API response: {0}")]
    ApiParseError(String),

    /// Backend answered 404 for a case
    #[error("[E2003] Case not found: {0}")]
    CaseNotFound(String),

    /// Backend is unreachable
    #[error("[E2004] Backend unavailable: {0}")]
    ApiServiceUnavailable(String),

    /// Request timed out
    #[error("[E2005] Request timed out: {0}")]
    ApiTimeout(String),

    // ========================================================================
    // Stream Errors (E3001-E3099)
    // ========================================================================
    /// The event stream connection failed or closed before a terminal event
    #[error("[E3001] Event stream transport failed for case '{case_id}': {message}")]
    StreamTransport { case_id: String, message: String },

    /// A named event carried a payload that could not be decoded
    #[error("[E3002] Malformed '{event}' event: {message}")]
    MalformedEvent { event: String, message: String },

    /// The backend reported an analysis failure through the stream
    #[error("[E3003] Analysis failed: {0}")]
    AnalysisFailed(String),

    // ========================================================================
    // Intake Errors (E4001-E4099)
    // ========================================================================
    /// The case form is missing required fields or confirmation
    #[error("[E4001] Case form is incomplete: {0}")]
    FormIncomplete(String),

    /// Document extraction failed (advisory, never blocking)
    #[error("[E4002] Document extraction failed: {0}")]
    ExtractionFailed(String),

    /// Backend refused or failed to create the case
    #[error("[E4003] Failed to create case: {0}")]
    CaseCreationFailed(String),

    /// Operation not permitted in the current intake step
    #[error("[E4004] Invalid intake transition from {from} to {to}")]
    InvalidIntakeTransition { from: String, to: String },

    // ========================================================================
    // Results Errors (E5001-E5099)
    // ========================================================================
    /// Final case details could not be loaded
    #[error("[E5001] Failed to load results for case '{case_id}': {message}")]
    ResultsUnavailable { case_id: String, message: String },

    /// No case id was supplied and no handoff snapshot exists
    #[error("[E5002] No case ID provided")]
    MissingCaseId,

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (unexpected state)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// Input validation error
    #[error("[E9002] Validation error: {0}")]
    ValidationError(String),

    /// IO operation failed
    #[error("[E9003] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization failed
    #[error("[E9004] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias using CounselError.
pub type CounselResult<T> = Result<T, CounselError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for CounselError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CounselError::ApiTimeout(err.to_string())
        } else if err.is_connect() {
            CounselError::ApiServiceUnavailable(err.to_string())
        } else if err.is_status() {
            if let Some(status) = err.status() {
                if status.as_u16() == 404 {
                    return CounselError::CaseNotFound(
                        err.url()
                            .and_then(|u| u.path_segments())
                            .and_then(|mut segments| segments.next_back())
                            .unwrap_or("unknown")
                            .to_string(),
                    );
                }
                if status.is_server_error() {
                    return CounselError::ApiServiceUnavailable(status.to_string());
                }
            }
            CounselError::ApiRequestFailed(err.to_string())
        } else if err.is_decode() {
            CounselError::ApiParseError(err.to_string())
        } else {
            CounselError::ApiRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CounselError {
    fn from(err: serde_json::Error) -> Self {
        CounselError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for CounselError {
    fn from(err: std::io::Error) -> Self {
        CounselError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for CounselError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => CounselError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => CounselError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => CounselError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => CounselError::ConfigParseError(err.to_string()),
        }
    }
}

impl From<crate::config::ConfigLoadError> for CounselError {
    fn from(err: crate::config::ConfigLoadError) -> Self {
        match err {
            crate::config::ConfigLoadError::Config(e) => e.into(),
            crate::config::ConfigLoadError::MissingRequired(key) => {
                CounselError::InvalidConfigValue {
                    key,
                    message: "Missing required value".to_string(),
                }
            }
            crate::config::ConfigLoadError::InvalidValue { key, message } => {
                CounselError::InvalidConfigValue { key, message }
            }
            crate::config::ConfigLoadError::Io(e) => e.into(),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl CounselError {
    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CounselError::ConfigParseError(_)
                | CounselError::InvalidConfigValue { .. }
        )
    }

    /// Returns true if this error came from talking to the backend.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            CounselError::ApiRequestFailed(_)
                | CounselError::ApiParseError(_)
                | CounselError::CaseNotFound(_)
                | CounselError::ApiServiceUnavailable(_)
                | CounselError::ApiTimeout(_)
        )
    }

    /// Returns true if this error is related to the live event stream.
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            CounselError::StreamTransport { .. }
                | CounselError::MalformedEvent { .. }
                | CounselError::AnalysisFailed(_)
        )
    }

    /// Returns true if this error belongs to the case intake flow.
    pub fn is_intake_error(&self) -> bool {
        matches!(
            self,
            CounselError::FormIncomplete(_)
                | CounselError::ExtractionFailed(_)
                | CounselError::CaseCreationFailed(_)
                | CounselError::InvalidIntakeTransition { .. }
        )
    }

    /// Returns true if the error ends the current view and the user should
    /// be sent back to case input.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CounselError::AnalysisFailed(_)
                | CounselError::ResultsUnavailable { .. }
                | CounselError::MissingCaseId
        )
    }

    /// Returns true if this error is transient and the operation might succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CounselError::ApiServiceUnavailable(_)
                | CounselError::ApiTimeout(_)
                | CounselError::StreamTransport { .. }
        )
    }

    /// Returns a suggested wait in seconds before the user tries again.
    pub fn suggested_retry_delay(&self) -> Option<u64> {
        match self {
            CounselError::ApiServiceUnavailable(_) => Some(5),
            CounselError::ApiTimeout(_) => Some(10),
            CounselError::StreamTransport { .. } => Some(3),
            _ => None,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            CounselError::ConfigParseError(_) => "E1002",
            CounselError::InvalidConfigValue { .. } => "E1003",
            CounselError::ApiRequestFailed(_) => "E2001",
            CounselError::ApiParseError(_) => "E2002",
            CounselError::CaseNotFound(_) => "E2003",
            CounselError::ApiServiceUnavailable(_) => "E2004",
            CounselError::ApiTimeout(_) => "E2005",
            CounselError::StreamTransport { .. } => "E3001",
            CounselError::MalformedEvent { .. } => "E3002",
            CounselError::AnalysisFailed(_) => "E3003",
            CounselError::FormIncomplete(_) => "E4001",
            CounselError::ExtractionFailed(_) => "E4002",
            CounselError::CaseCreationFailed(_) => "E4003",
            CounselError::InvalidIntakeTransition { .. } => "E4004",
            CounselError::ResultsUnavailable { .. } => "E5001",
            CounselError::MissingCaseId => "E5002",
            CounselError::Internal(_) => "E9001",
            CounselError::ValidationError(_) => "E9002",
            CounselError::IoError(_) => "E9003",
            CounselError::SerializationError(_) => "E9004",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            CounselError::ApiServiceUnavailable(_) | CounselError::ApiTimeout(_) => {
                Some("Check that the analysis backend is running and COUNSEL_API_URL is correct")
            }
            CounselError::CaseNotFound(_) => {
                Some("Run 'counsel submit' to start a new case")
            }
            CounselError::FormIncomplete(_) => Some(
                "Fill in the missing fields and pass --confirm once the details are accurate",
            ),
            CounselError::ExtractionFailed(_) => {
                Some("You can still proceed with manual entry")
            }
            CounselError::CaseCreationFailed(_) => Some("Please try submitting the case again"),
            CounselError::AnalysisFailed(_) => {
                Some("Run 'counsel submit' to start over with a new case")
            }
            CounselError::ResultsUnavailable { .. } | CounselError::MissingCaseId => {
                Some("Run 'counsel submit' to start a new case")
            }
            CounselError::InvalidConfigValue { .. } | CounselError::ConfigParseError(_) => {
                Some("Check counsel.toml or the COUNSEL_* environment variables")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with its suggestion and retry hint.
pub struct CliErrorDisplay<'a> {
    error: &'a CounselError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a CounselError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        if self.error.is_transient() {
            if let Some(delay) = self.error.suggested_retry_delay() {
                writeln!(f)?;
                writeln!(
                    f,
                    "  This error may be temporary. Try again in {} seconds.",
                    delay
                )?;
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
