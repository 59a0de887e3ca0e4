use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    StoreError(#[from] mongodb::error::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid lookup endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::IoError(_) | ScanError::SerializationError(_) => ErrorCategory::Input,
            ScanError::HttpError(_) => ErrorCategory::Network,
            ScanError::StoreError(_) => ErrorCategory::Storage,
            ScanError::ConfigError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::InvalidEndpoint { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 連線問題通常稍後重跑即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScanError::IoError(_) => "Check that the config and input files exist and are readable",
            ScanError::SerializationError(_) => "Make sure the config file is valid JSON",
            ScanError::HttpError(_) => "Check network connectivity and the lookup endpoint",
            ScanError::StoreError(_) => {
                "Check that MongoDB is reachable at mongoUri and the email index is compatible"
            }
            ScanError::ConfigError { .. } => "Review the config file contents",
            ScanError::MissingConfigError { .. } => "Add the missing field to the config file",
            ScanError::InvalidConfigValueError { .. } => "Fix the reported field in the config file",
            ScanError::InvalidEndpoint { .. } => "Use an absolute http(s) URL for 'endpoint'",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Storage => format!("Breach store unavailable: {}", self),
        }
    }

    /// 依嚴重程度對應的結束代碼；正常結束為 0，不經過這裡
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = ScanError::MissingConfigError {
            field: "key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("key"));
    }

    #[test]
    fn test_malformed_json_maps_to_input_category() {
        let err: ScanError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.recovery_suggestion(), "Make sure the config file is valid JSON");
    }

    #[test]
    fn test_fatal_errors_never_exit_zero() {
        let io: ScanError = std::io::Error::other("x").into();
        assert_eq!(io.exit_code(), 1);

        let config = ScanError::ConfigError {
            message: "bad".to_string(),
        };
        assert_ne!(config.exit_code(), 0);
    }
}
