//! 组合模块契约与模块描述符

use crate::capabilities::{BootstrapperWithRegistrator, DynRegistrator};
use crate::catalog::{Assembly, ErasedInstance, ModuleCapability, TypeEntry};
use di_abstractions::{DependencyRegistrator, Implementation, RegistrationEntry, ServiceKey};
use infrastructure_common::{DependencyError, DependencyResult, DiscoveryError, Lifetime, TypeInfo};
use std::fmt;
use std::sync::Arc;

/// 向注册能力登记服务的模块
pub trait RegistratorModule: Send + Sync {
    /// 登记模块的服务
    fn register_module(&self, registrator: &DynRegistrator) -> DependencyResult<()>;
}

/// 需要完整容器的模块
pub trait ContainerModule<C: ?Sized>: Send + Sync {
    /// 登记模块的服务
    fn register_module(&self, container: &C) -> DependencyResult<()>;
}

/// 只声明注册记录的模块
pub trait PlainModule: Send + Sync {
    /// 模块的注册记录，按顺序登记
    fn registrations(&self) -> Vec<RegistrationEntry>;
}

/// 由子模块组成的模块
pub trait HierarchicalModule: Send + Sync {
    /// 子模块
    ///
    /// 只登记注册模块、声明式模块和层级模块；容器模块和引导器模块会被跳过。
    fn modules(&self) -> Vec<ModuleDescriptor>;
}

/// 感知引导器的模块
pub trait BootstrapperModule: Send + Sync {
    /// 针对引导器登记
    fn register_module(&self, bootstrapper: &dyn BootstrapperWithRegistrator)
        -> DependencyResult<()>;
}

/// 模块类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleCategory {
    /// [`RegistratorModule`]
    Registrator,
    /// [`ContainerModule`]
    Container,
    /// [`PlainModule`]
    Plain,
    /// [`HierarchicalModule`]
    Hierarchical,
    /// [`BootstrapperModule`]
    Bootstrapper,
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Registrator => "registrator",
            Self::Container => "container",
            Self::Plain => "plain",
            Self::Hierarchical => "hierarchical",
            Self::Bootstrapper => "bootstrapper",
        };
        f.write_str(name)
    }
}

/// 可被发现的模块契约
///
/// 为各模块 trait 对象实现，用于在类型目录中识别模块能力。
pub trait ModuleContract: Send + Sync + 'static {
    /// 契约对应的类别
    const CATEGORY: ModuleCategory;
}

impl ModuleContract for dyn RegistratorModule {
    const CATEGORY: ModuleCategory = ModuleCategory::Registrator;
}

impl<C: ?Sized + 'static> ModuleContract for dyn ContainerModule<C> {
    const CATEGORY: ModuleCategory = ModuleCategory::Container;
}

impl ModuleContract for dyn PlainModule {
    const CATEGORY: ModuleCategory = ModuleCategory::Plain;
}

impl ModuleContract for dyn HierarchicalModule {
    const CATEGORY: ModuleCategory = ModuleCategory::Hierarchical;
}

impl ModuleContract for dyn BootstrapperModule {
    const CATEGORY: ModuleCategory = ModuleCategory::Bootstrapper;
}

/// 模块描述符
///
/// 每个描述符对应一个模块实例的一种能力。同一个类型声明多种能力时，
/// 会得到多个共享同一实例的描述符。描述符创建后不可变，可以廉价克隆。
#[derive(Clone)]
pub struct ModuleDescriptor {
    type_info: TypeInfo,
    assembly: Option<Arc<str>>,
    instance: ErasedInstance,
    capability: ModuleCapability,
    capabilities: Arc<[ModuleCapability]>,
}

impl ModuleDescriptor {
    /// 从类型条目实例化模块，每种能力一个描述符
    pub fn from_entry(
        entry: &TypeEntry,
        assembly: Option<&Assembly>,
    ) -> Result<Vec<Self>, DiscoveryError> {
        let instance = entry.instantiate()?;
        let assembly: Option<Arc<str>> = assembly.map(|assembly| Arc::from(assembly.name()));
        let capabilities: Arc<[ModuleCapability]> = Arc::from(entry.module_capabilities());
        Ok(capabilities
            .iter()
            .map(|capability| Self {
                type_info: entry.type_info(),
                assembly: assembly.clone(),
                instance: Arc::clone(&instance),
                capability: capability.clone(),
                capabilities: Arc::clone(&capabilities),
            })
            .collect())
    }

    /// 由现成的模块实例创建描述符
    ///
    /// 用于显式提供的模块以及层级模块的子模块。
    pub fn of<T, S>(module: Arc<T>, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        T: Send + Sync + 'static,
        S: ?Sized + ModuleContract,
    {
        let entry = TypeEntry::concrete::<T>().as_module(cast).build();
        let capabilities: Arc<[ModuleCapability]> = Arc::from(entry.module_capabilities());
        let capability = capabilities[0].clone();
        Self {
            type_info: entry.type_info(),
            assembly: None,
            instance: module,
            capability,
            capabilities,
        }
    }

    /// 模块类型
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 来源程序集
    pub fn assembly(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    /// 描述符代表的模块类别
    pub fn category(&self) -> ModuleCategory {
        self.capability.category
    }

    /// 描述符代表的模块契约
    pub fn contract(&self) -> TypeInfo {
        self.capability.contract
    }

    /// 模块实例是否支持契约 `S`
    pub fn supports<S: ?Sized + ModuleContract>(&self) -> bool {
        let contract = TypeInfo::of::<S>();
        self.capabilities
            .iter()
            .any(|capability| capability.contract == contract)
    }

    /// 以契约 `S` 的形式访问模块实例
    ///
    /// 结构化判断：只要模块类型声明了该契约即可，与描述符自身的类别无关。
    pub fn capability<S: ?Sized + ModuleContract>(&self) -> Option<Arc<S>> {
        let contract = TypeInfo::of::<S>();
        let capability = self
            .capabilities
            .iter()
            .find(|capability| capability.contract == contract)?;
        let erased = capability.cast(&self.instance)?;
        erased.downcast_ref::<Arc<S>>().cloned()
    }

    /// 当前描述符是否以契约 `S` 的身份出现
    pub fn is<S: ?Sized + ModuleContract>(&self) -> bool {
        self.capability.contract == TypeInfo::of::<S>()
    }

    /// 若描述符以契约 `S` 的身份出现，返回对应的模块对象
    pub fn as_contract<S: ?Sized + ModuleContract>(&self) -> Option<Arc<S>> {
        if self.is::<S>() {
            self.capability::<S>()
        } else {
            None
        }
    }

    /// 是否与另一个描述符共享同一模块实例
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("type_info", &self.type_info)
            .field("assembly", &self.assembly)
            .field("category", &self.capability.category)
            .finish()
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.type_info, self.capability.category)
    }
}

/// 把一条声明式注册记录登记到注册能力上
pub fn apply_registration(
    registrator: &dyn DependencyRegistrator,
    entry: &RegistrationEntry,
) -> DependencyResult<()> {
    match (&entry.service, &entry.implementation, entry.lifetime) {
        (ServiceKey::Single(service), Implementation::Type(implementation), Lifetime::Singleton) => {
            registrator.register_singleton(*service, *implementation)
        }
        (ServiceKey::Single(service), Implementation::Type(implementation), Lifetime::Transient) => {
            registrator.register_transient(*service, *implementation)
        }
        (ServiceKey::Single(service), Implementation::Instance(instance), _) => {
            registrator.register_instance(*service, Arc::clone(instance))
        }
        (ServiceKey::Collection(service), Implementation::Types(implementations), _) => {
            registrator.register_collection(*service, implementations.clone())
        }
        _ => Err(DependencyError::registration(
            entry.service.contract().name,
            format!("无效的注册记录: {entry}"),
        )),
    }
}
