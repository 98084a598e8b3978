//! 程序配置
//!
//! 解析顺序：内置默认值 → TOML 配置文件（可选）→ 环境变量

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 默认配置文件名
const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 默认服务分类体系
pub const DEFAULT_TAXONOMY: &[&str] = &[
    "Engine Oil",
    "Oil Filter",
    "Air Filter",
    "Cabin Air Filter",
    "Brake Pads",
    "Brake Rotors",
    "Brake Fluid",
    "Coolant",
    "Transmission Fluid",
    "Power Steering Fluid",
    "Spark Plugs",
    "Battery",
    "Wiper Blades",
    "Tire Rotation",
    "Tire Replacement",
    "Wheel Alignment",
    "Suspension",
    "Steering",
    "Exhaust",
    "Air Conditioning",
    "Belts and Hoses",
    "Timing Belt",
    "Fuel System",
    "Electrical",
    "Diagnostics",
    "Inspection",
];

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输入的导出文档
    pub input_file: String,
    /// 输出表格目录
    pub output_dir: String,
    /// 诊断信息文件
    pub diagnostics_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 同时进行的分类请求数量
    pub max_concurrent_requests: usize,
    /// 用户提示词的最小字符数，低于该值不调用分类服务
    pub min_input_chars: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    // --- 分类体系 ---
    pub taxonomy: Vec<String>,
    /// 丢弃不在分类体系中的标签
    pub strict_taxonomy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: "tekmetric_sample.json".to_string(),
            output_dir: "output".to_string(),
            diagnostics_file: "diagnostics.txt".to_string(),
            verbose_logging: false,
            max_concurrent_requests: 8,
            min_input_chars: 20,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 256,
            request_timeout_secs: 60,
            taxonomy: DEFAULT_TAXONOMY.iter().map(|s| s.to_string()).collect(),
            strict_taxonomy: true,
        }
    }
}

impl Config {
    /// 加载配置
    ///
    /// `CONFIG_FILE` 指定的文件（默认 `config.toml`）存在时先读取，再应用环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.with_env()
    }

    /// 从 TOML 文件读取，未出现的字段使用默认值
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 应用环境变量覆盖
    pub fn with_env(self) -> Result<Self, ConfigError> {
        Ok(Self {
            input_file: env_string("INPUT_FILE").unwrap_or(self.input_file),
            output_dir: env_string("OUTPUT_DIR").unwrap_or(self.output_dir),
            diagnostics_file: env_string("DIAGNOSTICS_FILE").unwrap_or(self.diagnostics_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            max_concurrent_requests: env_parse("MAX_CONCURRENT_REQUESTS", "usize")?
                .unwrap_or(self.max_concurrent_requests),
            min_input_chars: env_parse("MIN_INPUT_CHARS", "usize")?.unwrap_or(self.min_input_chars),
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            temperature: env_parse("LLM_TEMPERATURE", "f32")?.unwrap_or(self.temperature),
            max_tokens: env_parse("LLM_MAX_TOKENS", "u32")?.unwrap_or(self.max_tokens),
            request_timeout_secs: env_parse("LLM_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            taxonomy: self.taxonomy,
            strict_taxonomy: self.strict_taxonomy,
        })
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.taxonomy.is_empty() {
            return Err(ConfigError::invalid("taxonomy", "分类体系不能为空"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::invalid("max_concurrent_requests", "必须大于 0"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid("temperature", "必须在 [0, 2] 之间"));
        }
        Ok(())
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_overrides_defaults() {
        let config = Config::from_toml_str(
            r#"
            output_dir = "tables"
            min_input_chars = 5
            taxonomy = ["Engine Oil", "Inspection"]
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, "tables");
        assert_eq!(config.min_input_chars, 5);
        assert_eq!(config.taxonomy, vec!["Engine Oil", "Inspection"]);
        // 未出现的字段保持默认值
        assert_eq!(config.max_concurrent_requests, 8);
        assert!(config.strict_taxonomy);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));

        let config = Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        };

        let config = Config {
            taxonomy: Vec::new(),
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_concurrent_requests: 0,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = Config {
            temperature: 3.5,
            ..base
        };
        assert!(config.validate().is_err());
    }
}
