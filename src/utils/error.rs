use thiserror::Error;

#[derive(Error, Debug)]
pub enum StressError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Stress run aborted: {message}")]
    ExecutionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
    Execution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StressError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StressError::HttpError(_) => ErrorCategory::Network,
            StressError::CsvError(_) | StressError::SerializationError(_) => ErrorCategory::Data,
            StressError::IoError(_) => ErrorCategory::Storage,
            StressError::ConfigError { .. }
            | StressError::InvalidConfigValueError { .. }
            | StressError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            StressError::ExecutionError { .. } => ErrorCategory::Execution,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Execution => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StressError::HttpError(e) if e.is_timeout() => {
                "The target did not answer before the request timeout".to_string()
            }
            StressError::HttpError(e) if e.is_connect() => {
                "Could not connect to the target URL".to_string()
            }
            StressError::HttpError(e) => format!("HTTP request failed: {}", e),
            StressError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            StressError::ConfigValidationError { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
            StressError::ConfigError { message } => message.clone(),
            StressError::IoError(e) => format!("Could not read or write a file: {}", e),
            StressError::CsvError(e) => format!("Could not write the CSV report: {}", e),
            StressError::SerializationError(e) => {
                format!("Could not serialize the report: {}", e)
            }
            StressError::ExecutionError { message } => {
                format!("The stress run was aborted: {}", message)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags or plan file against --help"
            }
            ErrorCategory::Network => {
                "Verify the target URL is reachable, or raise --timeout"
            }
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Data => "Re-run with --verbose and inspect the collected results",
            ErrorCategory::Execution => {
                "A worker task panicked; re-run with RUST_LOG=debug to see where"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = StressError::InvalidConfigValueError {
            field: "concurrency".to_string(),
            value: "0".to_string(),
            reason: "concurrency must be positive".to_string(),
        };

        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("concurrency must be positive"));
    }

    #[test]
    fn test_execution_errors_are_critical() {
        let err = StressError::ExecutionError {
            message: "worker panicked".to_string(),
        };

        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StressError = io.into();

        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.to_string().starts_with("IO error"));
    }
}
