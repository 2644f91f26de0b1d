//! 错误类型定义
//!
//! 发现错误与注册错误是两条独立的通道：前者随发现结果一起返回，
//! 由调用方决定继续还是中止；后者会立即中止当前的引导过程。

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name}")]
    ComponentNotRegistered { type_name: String },

    #[error("重复注册: {type_name}")]
    DuplicateRegistration { type_name: String },

    #[error("依赖解析失败: {type_name}, 原因: {message}")]
    DependencyResolutionFailed { type_name: String, message: String },

    #[error("组件注册失败: {type_name}, 原因: {message}")]
    RegistrationError { type_name: String, message: String },

    #[error("模块注册失败: {module}, 原因: {message}")]
    ModuleRegistrationFailed { module: String, message: String },
}

impl DependencyError {
    /// 创建注册错误
    pub fn registration(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegistrationError {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// 创建模块注册错误
    pub fn module_failed(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModuleRegistrationFailed {
            module: module.into(),
            message: message.into(),
        }
    }
}

/// 模块发现错误类型
///
/// 发现错误不会中止扫描，会与已发现的模块一同返回。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("程序集检查失败: {assembly}, 原因: {message}")]
    AssemblyInspectionFailed { assembly: String, message: String },

    #[error("未找到程序集: {path}")]
    AssemblyNotFound { path: String },

    #[error("模块路径不可用: {path}, 原因: {message}")]
    PathUnavailable { path: String, message: String },

    #[error("模块实例化失败: {type_name}, 原因: {message}")]
    ModuleActivationFailed { type_name: String, message: String },
}

impl DiscoveryError {
    /// 创建程序集检查错误
    pub fn inspection_failed(assembly: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssemblyInspectionFailed {
            assembly: assembly.into(),
            message: message.into(),
        }
    }
}

/// 引导错误类型
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// 注册中间件返回的原始错误，不做包装
    #[error(transparent)]
    Registration(#[from] DependencyError),

    #[error("引导器状态无效: 期望 {expected}, 实际 {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("模块发现出现 {} 个错误, 已中止引导", errors.len())]
    DiscoveryAborted { errors: Vec<DiscoveryError> },

    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigError),

    #[error("日志初始化失败: {message}")]
    LoggingInitFailed { message: String },
}

/// 依赖注入结果类型
pub type DependencyResult<T> = Result<T, DependencyError>;

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 引导结果类型
pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_error_is_not_wrapped() {
        let original = DependencyError::registration("Foo", "boom");
        let expected = original.to_string();
        let error: BootstrapError = original.into();
        assert_eq!(error.to_string(), expected);
        assert!(matches!(
            error,
            BootstrapError::Registration(DependencyError::RegistrationError { .. })
        ));
    }

    #[test]
    fn discovery_aborted_reports_count() {
        let error = BootstrapError::DiscoveryAborted {
            errors: vec![
                DiscoveryError::AssemblyNotFound { path: "a".into() },
                DiscoveryError::inspection_failed("b", "bad"),
            ],
        };
        assert!(error.to_string().contains('2'));
    }
}
