//! 引导器构建器

use crate::bootstrapper::{Bootstrapper, BootstrapperOptions};
use crate::cache::DiscoveryCache;
use crate::catalog::Assembly;
use crate::discovery::{AssemblySource, ModuleDiscoverer};
use crate::logging::LoggingConfig;
use crate::module::ModuleDescriptor;
use crate::settings::BootstrapSettings;
use di_abstractions::IocContainer;
use di_impl::DiContainerImpl;
use infrastructure_common::{BootstrapResult, ConfigResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// 引导器构建器
///
/// 使用建造者模式组装引导器，默认使用 [`DiContainerImpl`] 作为容器、
/// 进程级发现缓存和进程级程序集注册表。
pub struct BootstrapperBuilder<C: IocContainer + 'static> {
    /// 容器
    container: Arc<C>,
    /// 程序集来源
    source: Option<AssemblySource>,
    /// 显式提供的模块
    modules: Vec<ModuleDescriptor>,
    /// 引导选项
    options: BootstrapperOptions,
    /// 发现缓存
    cache: Option<Arc<DiscoveryCache>>,
    /// 模块发现器
    discoverer: Option<ModuleDiscoverer>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl BootstrapperBuilder<DiContainerImpl> {
    /// 使用默认容器创建构建器
    pub fn new() -> Self {
        Self::with_container(DiContainerImpl::shared())
    }
}

impl Default for BootstrapperBuilder<DiContainerImpl> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: IocContainer + 'static> BootstrapperBuilder<C> {
    /// 使用指定容器创建构建器
    pub fn with_container(container: Arc<C>) -> Self {
        Self {
            container,
            source: None,
            modules: Vec::new(),
            options: BootstrapperOptions::default(),
            cache: None,
            discoverer: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 从目录发现模块
    pub fn with_modules_path<I, S>(mut self, root: impl Into<PathBuf>, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = AssemblySource::path(root, prefixes);
        info!("设置模块目录: {:?}", source);
        self.source = Some(source);
        self
    }

    /// 从显式程序集列表发现模块
    pub fn with_assemblies(mut self, assemblies: impl IntoIterator<Item = Assembly>) -> Self {
        let source = AssemblySource::assemblies(assemblies);
        debug!("设置程序集来源: {:?}", source);
        self.source = Some(source);
        self
    }

    /// 设置程序集来源
    pub fn with_source(mut self, source: AssemblySource) -> Self {
        self.source = Some(source);
        self
    }

    /// 追加显式提供的模块
    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        debug!("添加模块: {}", module);
        self.modules.push(module);
        self
    }

    /// 追加多个显式提供的模块
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// 是否复用进程内缓存的组合信息
    pub fn reuse_composition_information(mut self, reuse: bool) -> Self {
        self.options.reuse_composition_information = reuse;
        self
    }

    /// 存在发现错误时是否中止初始化
    pub fn abort_on_discovery_errors(mut self, abort: bool) -> Self {
        self.options.abort_on_discovery_errors = abort;
        self
    }

    /// 使用指定的发现缓存
    pub fn with_discovery_cache(mut self, cache: Arc<DiscoveryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 使用指定的模块发现器
    pub fn with_discoverer(mut self, discoverer: ModuleDiscoverer) -> Self {
        self.discoverer = Some(discoverer);
        self
    }

    /// 设置日志配置
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 应用引导配置
    pub fn with_settings(mut self, settings: &BootstrapSettings) -> ConfigResult<Self> {
        settings.validate()?;
        if let Some(source) = settings.assembly_source() {
            self.source = Some(source);
        }
        self.options.reuse_composition_information = settings.reuse_composition_information;
        self.options.abort_on_discovery_errors = settings.abort_on_discovery_errors;
        if settings.logging.enabled {
            self = self.with_logging(LoggingConfig::from_settings(&settings.logging)?);
        }
        Ok(self)
    }

    /// 构建引导器
    pub fn build(self) -> BootstrapResult<Bootstrapper<C>> {
        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            self.logging_config.init()?;
        }

        let mut bootstrapper = match self.source {
            Some(source) => Bootstrapper::with_source(self.container, source),
            None => Bootstrapper::new(self.container),
        };
        bootstrapper.configure(
            self.options,
            self.cache.unwrap_or_else(DiscoveryCache::global),
            self.discoverer.unwrap_or_default(),
            self.modules,
        );
        info!(run_id = %bootstrapper.run_id(), "引导器构建完成");
        Ok(bootstrapper)
    }
}
