//! 引导配置
//!
//! 配置文件（TOML/JSON/YAML）之上叠加环境变量，环境变量以 `BOOTSTRAP_`
//! 开头，层级以 `__` 分隔，例如 `BOOTSTRAP_LOGGING__LEVEL=debug`。
//! `BOOTSTRAP_PREFIXES` 以逗号分隔多个前缀。

use crate::discovery::AssemblySource;
use config::{Config, Environment, File};
use infrastructure_common::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "BOOTSTRAP";

/// 引导配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    /// 模块目录
    pub modules_path: Option<PathBuf>,
    /// 模块文件名前缀
    pub prefixes: Vec<String>,
    /// 复用进程内缓存的组合信息
    pub reuse_composition_information: bool,
    /// 存在发现错误时中止引导
    pub abort_on_discovery_errors: bool,
    /// 日志
    pub logging: LoggingSettings,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            modules_path: None,
            prefixes: Vec::new(),
            reuse_composition_information: true,
            abort_on_discovery_errors: false,
            logging: LoggingSettings::default(),
        }
    }
}

/// 日志配置项
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 是否由引导器初始化日志
    pub enabled: bool,
    /// 日志级别
    pub level: String,
    /// 是否使用 JSON 格式
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            json: false,
        }
    }
}

impl BootstrapSettings {
    /// 从配置文件和进程环境变量加载
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_environment(path, None)
    }

    /// 从配置文件和指定的环境变量集合加载
    ///
    /// `environment` 为 `None` 时读取进程环境变量。
    pub fn load_with_environment(
        path: Option<&Path>,
        environment: Option<HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            info!("加载引导配置文件: {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("prefixes")
                .source(environment),
        );

        let settings: Self = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(ConfigError::parse_error)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.modules_path.is_none() && !self.prefixes.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "设置了模块前缀但没有设置模块目录".to_string(),
            });
        }
        Ok(())
    }

    /// 配置对应的程序集来源
    pub fn assembly_source(&self) -> Option<AssemblySource> {
        self.modules_path
            .as_ref()
            .map(|root| AssemblySource::path(root.clone(), self.prefixes.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(extension: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_sources() {
        let settings =
            BootstrapSettings::load_with_environment(None, Some(HashMap::new())).unwrap();
        assert_eq!(settings, BootstrapSettings::default());
        assert!(settings.reuse_composition_information);
        assert!(settings.assembly_source().is_none());
    }

    #[test]
    fn loads_toml_file() {
        let file = write_config(
            ".toml",
            r#"
modules_path = "plugins"
prefixes = ["app", "ext"]
reuse_composition_information = false

[logging]
level = "debug"
"#,
        );
        let settings =
            BootstrapSettings::load_with_environment(Some(file.path()), Some(HashMap::new()))
                .unwrap();
        assert_eq!(settings.modules_path, Some(PathBuf::from("plugins")));
        assert_eq!(settings.prefixes, vec!["app", "ext"]);
        assert!(!settings.reuse_composition_information);
        assert_eq!(settings.logging.level, "debug");
        assert!(matches!(
            settings.assembly_source(),
            Some(AssemblySource::Path { ref prefixes, .. }) if prefixes.len() == 2
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config(".json", r#"{ "modules_path": "plugins", "logging": { "level": "warn" } }"#);
        let environment = HashMap::from([
            ("BOOTSTRAP_LOGGING__LEVEL".to_string(), "trace".to_string()),
            ("BOOTSTRAP_PREFIXES".to_string(), "core,ui".to_string()),
            (
                "BOOTSTRAP_ABORT_ON_DISCOVERY_ERRORS".to_string(),
                "true".to_string(),
            ),
        ]);
        let settings =
            BootstrapSettings::load_with_environment(Some(file.path()), Some(environment))
                .unwrap();
        assert_eq!(settings.logging.level, "trace");
        assert_eq!(settings.prefixes, vec!["core", "ui"]);
        assert!(settings.abort_on_discovery_errors);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = BootstrapSettings::load_with_environment(
            Some(Path::new("/definitely/not/here.toml")),
            Some(HashMap::new()),
        );
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn prefixes_require_modules_path() {
        let settings = BootstrapSettings {
            prefixes: vec!["app".to_string()],
            ..BootstrapSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
