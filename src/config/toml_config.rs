use crate::core::engine::{
    DEFAULT_MAX_LIMIT, DEFAULT_TOLERANCE, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{IcioError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub engine: Option<EngineSection>,
    pub source: SourceSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSection {
    pub tolerance: Option<f64>,
    pub max_limit: Option<usize>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub path: Option<String>,
    pub archive_entry: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IcioError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IcioError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FLOW_API_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type.as_str() {
            "http" => {
                let endpoint =
                    self.source
                        .endpoint
                        .as_deref()
                        .ok_or_else(|| IcioError::MissingConfigError {
                            field: "source.endpoint".to_string(),
                        })?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
            "csv" => {
                let path = self
                    .source
                    .path
                    .as_deref()
                    .ok_or_else(|| IcioError::MissingConfigError {
                        field: "source.path".to_string(),
                    })?;
                validation::validate_path("source.path", path)?;
            }
            other => {
                return Err(IcioError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Supported source types: http, csv".to_string(),
                });
            }
        }

        if let Some(engine) = &self.engine {
            if let Some(tolerance) = engine.tolerance {
                if !(tolerance > 0.0) {
                    return Err(IcioError::InvalidConfigValueError {
                        field: "engine.tolerance".to_string(),
                        value: tolerance.to_string(),
                        reason: "Tolerance must be a positive number".to_string(),
                    });
                }
            }
            if let Some(max_limit) = engine.max_limit {
                validation::validate_positive_number("engine.max_limit", max_limit, 1)?;
            }
            if let (Some(year_min), Some(year_max)) = (engine.year_min, engine.year_max) {
                if year_min > year_max {
                    return Err(IcioError::InvalidConfigValueError {
                        field: "engine.year_min".to_string(),
                        value: year_min.to_string(),
                        reason: format!("year_min is after year_max ({})", year_max),
                    });
                }
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn tolerance(&self) -> f64 {
        self.engine
            .as_ref()
            .and_then(|e| e.tolerance)
            .unwrap_or(DEFAULT_TOLERANCE)
    }

    fn max_limit(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.max_limit)
            .unwrap_or(DEFAULT_MAX_LIMIT)
    }

    fn year_min(&self) -> i32 {
        self.engine
            .as_ref()
            .and_then(|e| e.year_min)
            .unwrap_or(DEFAULT_YEAR_MIN)
    }

    fn year_max(&self) -> i32 {
        self.engine
            .as_ref()
            .and_then(|e| e.year_max)
            .unwrap_or(DEFAULT_YEAR_MAX)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
