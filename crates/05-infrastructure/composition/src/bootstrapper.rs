//! 引导器
//!
//! 持有容器、程序集来源、发现的模块和中间件列表。`initialize` 依次完成
//! 模块发现（经过缓存）与中间件登记，成功后进入 `Initialized` 状态并触发
//! 初始化完成通知；任何登记错误都会使引导器进入 `Faulted` 状态，不可恢复。

use crate::cache::DiscoveryCache;
use crate::capabilities::{
    CompositionModulesProvider, DynRegistrator, Extensible, HasAssemblySource, HasContainer,
    HasRegistrator,
};
use crate::catalog::Assembly;
use crate::discovery::{AssemblySource, ModuleDiscoverer};
use crate::middleware::{Middleware, MiddlewareApplier};
use crate::module::ModuleDescriptor;
use chrono::{DateTime, Utc};
use di_abstractions::IocContainer;
use infrastructure_common::{BootstrapError, BootstrapResult, DiscoveryError};
use once_cell::unsync::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// 引导器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapperState {
    /// 已创建，可以追加中间件
    Created,
    /// 初始化中
    Initializing,
    /// 初始化完成
    Initialized,
    /// 初始化失败
    Faulted,
}

impl fmt::Display for BootstrapperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "Created",
            Self::Initializing => "Initializing",
            Self::Initialized => "Initialized",
            Self::Faulted => "Faulted",
        };
        f.write_str(name)
    }
}

/// 引导器选项
#[derive(Debug, Clone, Copy)]
pub struct BootstrapperOptions {
    /// 复用进程内缓存的组合信息
    pub reuse_composition_information: bool,
    /// 存在发现错误时中止初始化
    pub abort_on_discovery_errors: bool,
}

impl Default for BootstrapperOptions {
    fn default() -> Self {
        Self {
            reuse_composition_information: true,
            abort_on_discovery_errors: false,
        }
    }
}

/// 初始化完成通知
#[derive(Debug, Clone)]
pub struct InitializationCompleted {
    /// 引导运行ID
    pub run_id: Uuid,
    /// 参与登记的模块数量
    pub modules: usize,
    /// 发现错误数量
    pub discovery_errors: usize,
    /// 完成时间
    pub completed_at: DateTime<Utc>,
}

type CompletedHandler = Box<dyn FnMut(&InitializationCompleted)>;
type ExitedHandler = Box<dyn FnMut()>;

/// 引导器
pub struct Bootstrapper<C: IocContainer + 'static> {
    container: Arc<C>,
    source: Option<AssemblySource>,
    assemblies: Vec<Assembly>,
    /// 发现之前按目录来源解析出的程序集
    pending_assemblies: OnceCell<Vec<Assembly>>,
    explicit_modules: Vec<ModuleDescriptor>,
    modules: Vec<ModuleDescriptor>,
    discovery_errors: Vec<DiscoveryError>,
    discovered: bool,
    middlewares: Vec<Box<dyn Middleware<Bootstrapper<C>>>>,
    state: BootstrapperState,
    options: BootstrapperOptions,
    cache: Arc<DiscoveryCache>,
    discoverer: ModuleDiscoverer,
    run_id: Uuid,
    completed_handlers: Vec<CompletedHandler>,
    exited_handlers: Vec<ExitedHandler>,
}

impl<C: IocContainer + 'static> Bootstrapper<C> {
    /// 创建引导器，不带程序集来源
    pub fn new(container: Arc<C>) -> Self {
        Self {
            container,
            source: None,
            assemblies: Vec::new(),
            pending_assemblies: OnceCell::new(),
            explicit_modules: Vec::new(),
            modules: Vec::new(),
            discovery_errors: Vec::new(),
            discovered: false,
            middlewares: Vec::new(),
            state: BootstrapperState::Created,
            options: BootstrapperOptions::default(),
            cache: DiscoveryCache::global(),
            discoverer: ModuleDiscoverer::new(),
            run_id: Uuid::new_v4(),
            completed_handlers: Vec::new(),
            exited_handlers: Vec::new(),
        }
    }

    /// 创建带程序集来源的引导器
    pub fn with_source(container: Arc<C>, source: AssemblySource) -> Self {
        let mut bootstrapper = Self::new(container);
        bootstrapper.source = Some(source);
        bootstrapper
    }

    pub(crate) fn configure(
        &mut self,
        options: BootstrapperOptions,
        cache: Arc<DiscoveryCache>,
        discoverer: ModuleDiscoverer,
        modules: Vec<ModuleDescriptor>,
    ) {
        self.options = options;
        self.cache = cache;
        self.discoverer = discoverer;
        self.explicit_modules = modules;
    }

    /// 追加显式提供的模块，排在发现的模块之前
    pub fn add_module(&mut self, module: ModuleDescriptor) -> &mut Self {
        if self.discovered {
            warn!("模块发现已完成, 忽略模块: {}", module);
        } else {
            self.explicit_modules.push(module);
        }
        self
    }

    /// 追加已装箱的中间件
    pub fn use_boxed(&mut self, middleware: Box<dyn Middleware<Self>>) -> &mut Self {
        if self.state == BootstrapperState::Created {
            debug!("追加中间件: {}", middleware.name());
            self.middlewares.push(middleware);
        } else {
            warn!(
                "引导器处于 {} 状态, 忽略中间件: {}",
                self.state,
                middleware.name()
            );
        }
        self
    }

    /// 订阅初始化完成通知
    pub fn on_initialized<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&InitializationCompleted) + 'static,
    {
        self.completed_handlers.push(Box::new(handler));
        self
    }

    /// 订阅退出通知
    pub fn on_exited<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut() + 'static,
    {
        self.exited_handlers.push(Box::new(handler));
        self
    }

    /// 应用程序退出时调用，转发给退出通知的订阅者
    pub fn notify_exited(&mut self) {
        info!(run_id = %self.run_id, "应用程序退出");
        for handler in &mut self.exited_handlers {
            handler();
        }
    }

    /// 执行模块发现
    ///
    /// 只执行一次；`initialize` 在尚未发现时会自动调用。
    /// 发现错误不会中止发现，可以通过 [`discovery_errors`](Self::discovery_errors) 查看。
    pub fn discover(&mut self) -> &[DiscoveryError] {
        if self.discovered {
            return &self.discovery_errors;
        }

        let mut modules = self.explicit_modules.clone();
        let mut errors = Vec::new();

        if let Some(source) = &self.source {
            let resolved = self.discoverer.resolve(source);
            let discoverer = &self.discoverer;
            let assemblies = &resolved.assemblies;
            let resolve_errors = resolved.errors.clone();
            let result = self.cache.get_or_create(
                &resolved.key,
                self.options.reuse_composition_information,
                || {
                    let mut result = discoverer.inspect(assemblies);
                    result.errors.splice(0..0, resolve_errors);
                    result
                },
            );
            info!(
                key = %resolved.key,
                modules = result.modules.len(),
                errors = result.errors.len(),
                "模块发现结束"
            );
            modules.extend(result.modules);
            errors = result.errors;
            self.assemblies = resolved.assemblies;
        }

        self.modules = modules;
        self.discovery_errors = errors;
        self.discovered = true;
        &self.discovery_errors
    }

    /// 初始化：发现模块并按顺序执行中间件
    pub fn initialize(&mut self) -> BootstrapResult<()> {
        if self.state != BootstrapperState::Created {
            return Err(BootstrapError::InvalidState {
                expected: BootstrapperState::Created.to_string(),
                actual: self.state.to_string(),
            });
        }

        let span = info_span!("bootstrap", run_id = %self.run_id);
        let _guard = span.enter();

        self.state = BootstrapperState::Initializing;
        info!("开始初始化引导器, 中间件 {} 个", self.middlewares.len());

        self.discover();
        if self.options.abort_on_discovery_errors && !self.discovery_errors.is_empty() {
            self.state = BootstrapperState::Faulted;
            error!("发现错误 {} 个, 中止初始化", self.discovery_errors.len());
            return Err(BootstrapError::DiscoveryAborted {
                errors: self.discovery_errors.clone(),
            });
        }
        for discovery_error in &self.discovery_errors {
            warn!("模块发现错误: {}", discovery_error);
        }

        let outcome =
            MiddlewareApplier::apply_middlewares(&*self, &self.middlewares).map(|_| ());
        if let Err(registration_error) = outcome {
            self.state = BootstrapperState::Faulted;
            error!("引导器初始化失败: {}", registration_error);
            return Err(registration_error.into());
        }

        self.state = BootstrapperState::Initialized;
        let completed = InitializationCompleted {
            run_id: self.run_id,
            modules: self.modules.len(),
            discovery_errors: self.discovery_errors.len(),
            completed_at: Utc::now(),
        };
        info!(modules = completed.modules, "引导器初始化完成");
        for handler in &mut self.completed_handlers {
            handler(&completed);
        }
        Ok(())
    }

    /// 当前状态
    pub fn state(&self) -> BootstrapperState {
        self.state
    }

    /// 是否已初始化
    pub fn is_initialized(&self) -> bool {
        self.state == BootstrapperState::Initialized
    }

    /// 发现错误
    pub fn discovery_errors(&self) -> &[DiscoveryError] {
        &self.discovery_errors
    }

    /// 程序集来源
    pub fn source(&self) -> Option<&AssemblySource> {
        self.source.as_ref()
    }

    /// 选项
    pub fn options(&self) -> BootstrapperOptions {
        self.options
    }

    /// 已追加的中间件数量
    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    /// 引导运行ID
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

impl<C: IocContainer + 'static> HasRegistrator for Bootstrapper<C> {
    fn registrator(&self) -> &DynRegistrator {
        &*self.container
    }
}

impl<C: IocContainer + 'static> HasContainer for Bootstrapper<C> {
    type Container = C;

    fn container(&self) -> &Arc<C> {
        &self.container
    }
}

impl<C: IocContainer + 'static> HasAssemblySource for Bootstrapper<C> {
    /// 发现之前，目录来源在首次访问时解析，解析错误留给发现阶段报告
    fn assemblies(&self) -> &[Assembly] {
        if self.discovered {
            return &self.assemblies;
        }
        match &self.source {
            Some(AssemblySource::Assemblies(assemblies)) => assemblies,
            Some(source @ AssemblySource::Path { .. }) => self.pending_assemblies.get_or_init(|| {
                debug!("发现之前解析模块目录");
                self.discoverer.resolve(source).assemblies
            }),
            None => &self.assemblies,
        }
    }
}

impl<C: IocContainer + 'static> CompositionModulesProvider for Bootstrapper<C> {
    fn modules(&self) -> &[ModuleDescriptor] {
        if self.discovered {
            &self.modules
        } else {
            &self.explicit_modules
        }
    }
}

impl<C: IocContainer + 'static> Extensible for Bootstrapper<C> {
    fn use_middleware<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware<Self> + 'static,
    {
        self.use_boxed(Box::new(middleware))
    }
}

impl<C: IocContainer + 'static> fmt::Debug for Bootstrapper<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("run_id", &self.run_id)
            .field("state", &self.state)
            .field("source", &self.source)
            .field("modules", &self.modules.len())
            .field("discovery_errors", &self.discovery_errors)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
