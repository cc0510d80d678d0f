use thiserror::Error;

#[derive(Error, Debug)]
pub enum IcioError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Flow API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Data integrity error in {scope}: {message}")]
    DataIntegrityError { scope: String, message: String },

    #[error("Flow source unavailable: {message}")]
    SourceUnavailableError { message: String },

    #[error("Configuration error on '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid config value for '{field}' ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    DataIntegrity,
    Source,
    Config,
    System,
}

impl IcioError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IcioError::ValidationError { .. } => ErrorCategory::Validation,
            IcioError::DataIntegrityError { .. } => ErrorCategory::DataIntegrity,
            IcioError::ApiError(_) | IcioError::SourceUnavailableError { .. } => {
                ErrorCategory::Source
            }
            IcioError::ConfigValidationError { .. }
            | IcioError::InvalidConfigValueError { .. }
            | IcioError::MissingConfigError { .. } => ErrorCategory::Config,
            IcioError::ZipError(_)
            | IcioError::CsvError(_)
            | IcioError::IoError(_)
            | IcioError::SerializationError(_)
            | IcioError::ProcessingError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Source => ErrorSeverity::Medium,
            ErrorCategory::Config | ErrorCategory::System => ErrorSeverity::High,
            ErrorCategory::DataIntegrity => ErrorSeverity::Critical,
        }
    }

    /// 呼叫端是否值得重試 (資料來源暫時不可用)
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Source)
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            IcioError::ValidationError { field, .. } => {
                format!("Check the '{}' query parameter and try again", field)
            }
            IcioError::DataIntegrityError { scope, .. } => format!(
                "The dataset for {} is inconsistent; re-ingest the flow table before querying",
                scope
            ),
            IcioError::ApiError(_) | IcioError::SourceUnavailableError { .. } => {
                "The flow source did not respond; retry later or check connectivity".to_string()
            }
            IcioError::ConfigValidationError { field, .. }
            | IcioError::MissingConfigError { field } => {
                format!("Fix the '{}' entry in the configuration file", field)
            }
            IcioError::InvalidConfigValueError { field, reason, .. } => {
                format!("Fix '{}': {}", field, reason)
            }
            IcioError::IoError(_) => "Check file paths and permissions".to_string(),
            IcioError::CsvError(_) | IcioError::ZipError(_) => {
                "Check that the flow snapshot file is a valid CSV / zip archive".to_string()
            }
            IcioError::SerializationError(_) => {
                "The flow source returned malformed JSON; check the endpoint".to_string()
            }
            IcioError::ProcessingError { .. } => {
                "Re-run with --verbose to see the failing step".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            IcioError::ValidationError { field, message } => {
                format!("Invalid query input '{}': {}", field, message)
            }
            IcioError::DataIntegrityError { .. } => {
                "The underlying flow data is inconsistent; results would be misleading".to_string()
            }
            IcioError::ApiError(_) | IcioError::SourceUnavailableError { .. } => {
                "Could not reach the flow data source".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IcioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_errors_are_retryable() {
        let err = IcioError::SourceUnavailableError {
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_integrity_errors_are_critical_and_final() {
        let err = IcioError::DataIntegrityError {
            scope: "buyer=FRA sector=C26 year=2022".to_string(),
            message: "supplier sum 99.0 does not match total 100.0".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.category(), ErrorCategory::DataIntegrity);
    }

    #[test]
    fn test_validation_error_names_the_field() {
        let err = IcioError::ValidationError {
            field: "limit".to_string(),
            message: "must be between 1 and 100".to_string(),
        };
        assert!(err.to_string().contains("limit"));
        assert!(err.recovery_suggestion().contains("limit"));
    }
}
