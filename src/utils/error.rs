use thiserror::Error;

#[derive(Error, Debug)]
pub enum DppError {
    // EDC 傳輸流程錯誤：Display 即為顯示給使用者的原文
    #[error("{message}")]
    ValidationError { message: String },

    #[error("{message}")]
    TransferInitiationError { message: String },

    #[error("{message}")]
    StatusCheckError { message: String },

    #[error("Data transfer timed out. Please try again.")]
    TimeoutError { attempts: u32 },

    #[error("Invalid passport payload: {message}")]
    PayloadError { message: String },

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("{message}")]
    LookupError { message: String },

    // 後端操作失敗，訊息即畫面原文
    #[error("{message}")]
    ActionError { message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Transfer,
    Backend,
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::TransferInitiationError { .. }
            | Self::StatusCheckError { .. }
            | Self::TimeoutError { .. }
            | Self::Cancelled => ErrorCategory::Transfer,
            Self::LookupError { .. }
            | Self::ActionError { .. }
            | Self::NotFound { .. }
            | Self::ApiError { .. } => ErrorCategory::Backend,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::PayloadError { .. } | Self::CsvError(_) => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Low,
            Self::ValidationError { .. }
            | Self::LookupError { .. }
            | Self::ActionError { .. }
            | Self::NotFound { .. }
            | Self::TimeoutError { .. }
            | Self::StatusCheckError { .. }
            | Self::TransferInitiationError { .. }
            | Self::HttpError(_) => ErrorSeverity::Medium,
            Self::ApiError { .. }
            | Self::PayloadError { .. }
            | Self::CsvError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_connect() => {
                "Could not reach the passport backend".to_string()
            }
            Self::HttpError(e) if e.is_timeout() => "The passport backend timed out".to_string(),
            Self::NotFound { resource, id } => format!("{} '{}' was not found", resource, id),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "Check the values you entered and try again",
            Self::TransferInitiationError { .. } => {
                "Make sure the connector service is running, then start the transfer again"
            }
            Self::StatusCheckError { .. } => "Start the transfer again; status checks are not retried",
            Self::TimeoutError { .. } => {
                "The connector did not deliver data in time; try again or raise transfer.max_attempts"
            }
            Self::PayloadError { .. } => "The transferred passport is malformed; contact the data provider",
            Self::Cancelled => "No action needed",
            Self::LookupError { .. } | Self::NotFound { .. } => "Verify the identifier and try again",
            Self::ActionError { .. } => "Check the backend is running and try again",
            Self::ApiError { .. } => "Inspect the backend logs for details",
            Self::HttpError(_) => "Check backend.base_url and that the backend is running",
            Self::CsvError(_) => "Make sure the file is valid comma-separated text",
            Self::IoError(_) => "Check the file path and permissions",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration file or CLI flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, DppError>;
