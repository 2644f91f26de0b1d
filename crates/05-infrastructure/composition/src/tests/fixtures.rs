//! 测试用模块与程序集

use crate::bootstrapper::Bootstrapper;
use crate::builder::BootstrapperBuilder;
use crate::cache::DiscoveryCache;
use crate::capabilities::{BootstrapperWithRegistrator, DynRegistrator};
use crate::catalog::{Assembly, AssemblyRegistry, TypeEntry};
use crate::discovery::{AssemblySource, ModuleDiscoverer};
use crate::module::{
    BootstrapperModule, ContainerModule, HierarchicalModule, ModuleDescriptor, PlainModule,
    RegistratorModule,
};
use di_abstractions::{DependencyRegistratorExt, RegistrationEntry};
use di_impl::DiContainerImpl;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
pub fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok(); // 忽略初始化失败的错误
    });
}

pub trait Dependency: Send + Sync {}

pub struct TransientDependency;

impl Dependency for TransientDependency {}

pub trait ServiceContract: Send + Sync {}

pub struct FirstService;
pub struct SecondService;
pub struct UnrelatedService;

impl ServiceContract for FirstService {}
impl ServiceContract for SecondService {}

/// 根对象
pub struct RootObject;

/// 容器模块登记的标记
pub struct ContainerMarker;

/// 引导器模块登记的模块数量
pub struct ObservedModules(pub usize);

#[derive(Default)]
pub struct TransientModule;

impl RegistratorModule for TransientModule {
    fn register_module(&self, registrator: &DynRegistrator) -> DependencyResult<()> {
        registrator.register_transient_as::<dyn Dependency, TransientDependency>()
    }
}

#[derive(Default)]
pub struct PlainServicesModule;

impl PlainModule for PlainServicesModule {
    fn registrations(&self) -> Vec<RegistrationEntry> {
        vec![
            RegistrationEntry::singleton(
                TypeInfo::of::<dyn ServiceContract>(),
                TypeInfo::of::<FirstService>(),
            ),
            RegistrationEntry::transient(
                TypeInfo::of::<SecondService>(),
                TypeInfo::of::<SecondService>(),
            ),
        ]
    }
}

#[derive(Default)]
pub struct ParentModule;

impl HierarchicalModule for ParentModule {
    fn modules(&self) -> Vec<ModuleDescriptor> {
        vec![
            ModuleDescriptor::of::<TransientModule, dyn RegistratorModule>(
                Arc::new(TransientModule),
                |module| module,
            ),
            ModuleDescriptor::of::<PlainServicesModule, dyn PlainModule>(
                Arc::new(PlainServicesModule),
                |module| module,
            ),
        ]
    }
}

#[derive(Default)]
pub struct ContainerAwareModule;

impl ContainerModule<DiContainerImpl> for ContainerAwareModule {
    fn register_module(&self, container: &DiContainerImpl) -> DependencyResult<()> {
        container.register_instance_as(Arc::new(ContainerMarker))
    }
}

/// 同时是注册模块和引导器模块
#[derive(Default)]
pub struct BootstrapperAwareModule;

impl RegistratorModule for BootstrapperAwareModule {
    fn register_module(&self, registrator: &DynRegistrator) -> DependencyResult<()> {
        registrator.register_singleton_as::<UnrelatedService, UnrelatedService>()
    }
}

impl BootstrapperModule for BootstrapperAwareModule {
    fn register_module(
        &self,
        bootstrapper: &dyn BootstrapperWithRegistrator,
    ) -> DependencyResult<()> {
        bootstrapper
            .registrator()
            .register_instance_as(Arc::new(ObservedModules(bootstrapper.modules().len())))
    }
}

#[derive(Default)]
pub struct FailingModule;

impl RegistratorModule for FailingModule {
    fn register_module(&self, _registrator: &DynRegistrator) -> DependencyResult<()> {
        Err(DependencyError::module_failed("FailingModule", "模块登记失败"))
    }
}

pub fn transient_module_entry() -> TypeEntry {
    TypeEntry::module::<TransientModule>()
        .as_module::<dyn RegistratorModule>(|module| module)
        .build()
}

pub fn plain_module_entry() -> TypeEntry {
    TypeEntry::module::<PlainServicesModule>()
        .as_module::<dyn PlainModule>(|module| module)
        .build()
}

pub fn parent_module_entry() -> TypeEntry {
    TypeEntry::module::<ParentModule>()
        .as_module::<dyn HierarchicalModule>(|module| module)
        .build()
}

pub fn container_module_entry() -> TypeEntry {
    TypeEntry::module::<ContainerAwareModule>()
        .as_module::<dyn ContainerModule<DiContainerImpl>>(|module| module)
        .build()
}

pub fn bootstrapper_aware_entry() -> TypeEntry {
    TypeEntry::module::<BootstrapperAwareModule>()
        .as_module::<dyn RegistratorModule>(|module| module)
        .as_module::<dyn BootstrapperModule>(|module| module)
        .build()
}

pub fn failing_module_entry() -> TypeEntry {
    TypeEntry::module::<FailingModule>()
        .as_module::<dyn RegistratorModule>(|module| module)
        .build()
}

/// 服务类型：两个实现、一个无关类型、契约本身以及一个抽象声明
pub fn service_entries() -> Vec<TypeEntry> {
    vec![
        TypeEntry::interface::<dyn ServiceContract>().build(),
        TypeEntry::concrete::<FirstService>()
            .implements::<dyn ServiceContract>()
            .build(),
        TypeEntry::concrete::<UnrelatedService>().build(),
        TypeEntry::abstract_type::<TransientDependency>()
            .implements::<dyn ServiceContract>()
            .build(),
        TypeEntry::concrete::<SecondService>()
            .implements::<dyn ServiceContract>()
            .build(),
    ]
}

/// 每次检查都计数的程序集
pub fn counting_assembly(
    name: &str,
    entries: Vec<TypeEntry>,
    counter: Arc<AtomicUsize>,
) -> Assembly {
    Assembly::with_loader(name, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(entries.clone())
    })
}

pub fn broken_assembly(name: &str) -> Assembly {
    Assembly::with_loader(name, || Err("元数据损坏".to_string()))
}

/// 使用独立缓存和注册表的引导器，避免测试之间共享进程级状态
pub fn isolated_bootstrapper(source: AssemblySource) -> Bootstrapper<DiContainerImpl> {
    isolated_bootstrapper_with(DiContainerImpl::shared(), source, Arc::new(DiscoveryCache::new()))
}

pub fn isolated_bootstrapper_with(
    container: Arc<DiContainerImpl>,
    source: AssemblySource,
    cache: Arc<DiscoveryCache>,
) -> Bootstrapper<DiContainerImpl> {
    init_test_logger();
    BootstrapperBuilder::with_container(container)
        .with_source(source)
        .with_discovery_cache(cache)
        .with_discoverer(ModuleDiscoverer::with_registry(Arc::new(
            AssemblyRegistry::new(),
        )))
        .build()
        .unwrap()
}
