use crate::core::ConfigProvider;
use crate::utils::error::{DppError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_REFRESH_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub backend: BackendConfig,
    pub transfer: TransferConfig,
    pub repair: RepairConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// 單次請求逾時；未設定時不限制
    pub request_timeout_seconds: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub refresh_delay_ms: u64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            refresh_delay_ms: DEFAULT_REFRESH_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: LogFormat,
}

impl DashboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DPP_BACKEND_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DppError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(DppError::MissingConfigError {
                field: "backend.base_url".to_string(),
            });
        }
        validation::validate_url("backend.base_url", &self.backend.base_url)?;

        if let Some(timeout) = self.backend.request_timeout_seconds {
            validation::validate_positive_number("backend.request_timeout_seconds", timeout, 1)?;
        }

        validation::validate_range("transfer.max_attempts", self.transfer.max_attempts, 1, 100)?;
        validation::validate_range(
            "transfer.poll_interval_ms",
            self.transfer.poll_interval_ms,
            1,
            60_000,
        )?;

        if let Some(level) = &self.logging.level {
            validation::validate_one_of(
                "logging.level",
                level,
                &["trace", "debug", "info", "warn", "error"],
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for DashboardConfig {
    fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.backend.request_timeout_seconds.map(Duration::from_secs)
    }

    fn max_attempts(&self) -> u32 {
        self.transfer.max_attempts
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.transfer.poll_interval_ms)
    }

    fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.repair.refresh_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8081");
        assert_eq!(config.max_attempts(), 10);
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.refresh_delay(), Duration::from_millis(500));
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
[backend]
base_url = "https://dpp.example.com/"

[transfer]
max_attempts = 4
"#,
        )
        .unwrap();

        assert_eq!(config.transfer.max_attempts, 4);
        assert_eq!(config.transfer.poll_interval_ms, 2000);
        assert_eq!(config.base_url(), "https://dpp.example.com/");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("DPP_TEST_BACKEND_URL", "http://backend.test:9000");
        let config = DashboardConfig::from_toml_str(
            r#"
[backend]
base_url = "${DPP_TEST_BACKEND_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://backend.test:9000");
    }

    #[test]
    fn test_unset_env_var_left_in_place_fails_validation() {
        let config = DashboardConfig::from_toml_str(
            r#"
[backend]
base_url = "${DPP_TEST_SURELY_UNSET_VAR}"
"#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "${DPP_TEST_SURELY_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = DashboardConfig::default();
        config.transfer.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(DppError::InvalidConfigValueError { .. })
        ));

        let mut config = DashboardConfig::default();
        config.logging.level = Some("loud".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = DashboardConfig::from_toml_str("[backend\nbase_url = 1");
        assert!(matches!(result, Err(DppError::ConfigError { .. })));
    }
}
