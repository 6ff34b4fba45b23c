/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量覆盖与验证
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use crate::core::error::{ConfigError, ConfigResult};
use crate::impl_default;

/// 骨骼系统主配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonConfig {
    /// 变换计算配置
    #[serde(default)]
    pub transforms: TransformSettings,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SkeletonConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("SKELETON_CONSISTENCY_TOLERANCE") {
            if let Ok(tolerance) = val.parse() {
                self.transforms.consistency_tolerance = tolerance;
            }
        }
        if let Ok(val) = env::var("SKELETON_SINGULAR_EPSILON") {
            if let Ok(epsilon) = val.parse() {
                self.transforms.singular_epsilon = epsilon;
            }
        }
        if let Ok(val) = env::var("SKELETON_VERIFY_TRANSFORMS") {
            self.transforms.verify_after_update =
                val.parse().unwrap_or(self.transforms.verify_after_update);
        }
        if let Ok(val) = env::var("SKELETON_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.transforms.validate()
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./skeleton.toml
    /// 2. ./skeleton.json
    /// 3. ~/.config/skeleton_core/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("skeleton.toml") {
            tracing::info!(target: "config", "Loaded config from skeleton.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("skeleton.json") {
            tracing::info!(target: "config", "Loaded config from skeleton.json");
            return config;
        }

        if let Some(home) = env::var_os("HOME") {
            let config_path = PathBuf::from(home)
                .join(".config")
                .join("skeleton_core")
                .join("config.toml");

            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::info!(target: "config", "Loaded config from {:?}", config_path);
                return config;
            }
        }

        tracing::info!(target: "config", "Using default configuration");
        Self::default()
    }
}

/// 变换计算配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// 相对行列式（行列式除以各列长度之积）绝对值不超过该值的父模型变换视为奇异
    pub singular_epsilon: f64,

    /// 缓存模型变换与重新计算结果之间允许的最大分量误差
    pub consistency_tolerance: f64,

    /// 传播后是否重新校验子树的模型变换
    pub verify_after_update: bool,
}

impl_default!(TransformSettings {
    singular_epsilon: 1e-12,
    consistency_tolerance: 1e-9,
    verify_after_update: cfg!(debug_assertions),
});

impl TransformSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.singular_epsilon.is_finite()
            || self.singular_epsilon <= 0.0
            || self.singular_epsilon >= 1.0
        {
            return Err(ConfigError::ValidationError(format!(
                "singular_epsilon must be in (0, 1), got {}",
                self.singular_epsilon
            )));
        }
        if !self.consistency_tolerance.is_finite() || self.consistency_tolerance <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "consistency_tolerance must be finite and positive, got {}",
                self.consistency_tolerance
            )));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 不区分大小写解析级别名称
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SkeletonConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transforms.singular_epsilon, 1e-12);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_toml_serialization() {
        let config = SkeletonConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: SkeletonConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_json_serialization() {
        let config = SkeletonConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed: SkeletonConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SkeletonConfig::from_toml_str(
            r#"
            [logging]
            level = "Debug"
            log_to_console = false
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.transforms, TransformSettings::default());
    }

    #[test]
    fn test_partial_tables_use_field_defaults() {
        let config = SkeletonConfig::from_toml_str(
            r#"
            [transforms]
            verify_after_update = true

            [logging]
            level = "Warn"
            "#,
        )
        .unwrap();
        assert!(config.transforms.verify_after_update);
        assert_eq!(config.transforms.singular_epsilon, 1e-12);
        assert_eq!(config.transforms.consistency_tolerance, 1e-9);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.logging.log_to_console);

        let json = SkeletonConfig::from_json_str(r#"{ "logging": { "log_to_console": false } }"#)
            .unwrap();
        assert_eq!(json.logging.level, LogLevel::Info);
        assert!(!json.logging.log_to_console);
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let mut config = SkeletonConfig::default();
        config.transforms.consistency_tolerance = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.transforms.consistency_tolerance = 1e-9;
        config.transforms.singular_epsilon = f64::NAN;
        assert!(config.validate().is_err());

        config.transforms.singular_epsilon = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let result = SkeletonConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" trace "), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("loud"), None);
    }
}
