//! Error types for the anticaptcha library.

use thiserror::Error;

/// Code reported when a job produced no answer inside the polling budget.
pub const NOT_RECOGNIZED_CODE: &str = "CAPTCHA_NOT_RECOGNIZE";

/// Main error type for the anticaptcha library.
#[derive(Error, Debug)]
pub enum CaptchaError {
    /// No registered backend carries the requested name
    #[error("Unknown backend: \"{name}\"")]
    UnknownBackend { name: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-HTTP adapter
    #[error("Transport failed: {0}")]
    Transport(String),

    /// IO error (opening a payload file for upload)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with an error token instead of `OK|...`
    #[error("\"{backend}\" rejected the request: {code}")]
    RemoteRejected { backend: String, code: String },

    /// Polling budget exhausted without an answer
    #[error("\"{backend}\" did not recognize job {job_id} after {attempts} attempts")]
    RecognitionTimeout {
        backend: String,
        job_id: String,
        attempts: u64,
    },

    /// Polling was cancelled by the caller
    #[error("\"{backend}\" polling for job {job_id} was cancelled")]
    Cancelled { backend: String, job_id: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CaptchaError {
    /// Protocol-level classification code, if the error carries one.
    ///
    /// For rejections this is the exact token the service sent back
    /// (e.g. `ERROR_ZERO_BALANCE`).
    pub fn code(&self) -> Option<&str> {
        match self {
            CaptchaError::RemoteRejected { code, .. } => Some(code),
            CaptchaError::RecognitionTimeout { .. } => Some(NOT_RECOGNIZED_CODE),
            _ => None,
        }
    }
}

/// Result type alias for anticaptcha operations.
pub type Result<T> = std::result::Result<T, CaptchaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_code() {
        let err = CaptchaError::RemoteRejected {
            backend: "rucaptcha".into(),
            code: "ERROR_KEY_DOES_NOT_EXIST".into(),
        };
        assert_eq!(err.code(), Some("ERROR_KEY_DOES_NOT_EXIST"));
        assert_eq!(
            err.to_string(),
            "\"rucaptcha\" rejected the request: ERROR_KEY_DOES_NOT_EXIST"
        );
    }

    #[test]
    fn test_timeout_code() {
        let err = CaptchaError::RecognitionTimeout {
            backend: "a".into(),
            job_id: "1".into(),
            attempts: 100,
        };
        assert_eq!(err.code(), Some(NOT_RECOGNIZED_CODE));
        assert_eq!(CaptchaError::Config("x".into()).code(), None);
    }
}
