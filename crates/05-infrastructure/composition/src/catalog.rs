//! 类型目录
//!
//! 以显式登记的类型条目代替运行时反射。每个 [`Assembly`] 是一组
//! [`TypeEntry`] 的来源，条目记录类型的种类、声明实现的契约、
//! 构造方式以及到各模块契约的转换。
//!
//! 启动时登记（`#[discoverable]` 宏）的条目进入进程级的
//! [`AssemblyRegistry::global`]，按路径发现时按文件名查找。

use crate::module::{ModuleCategory, ModuleContract};
use infrastructure_common::{DiscoveryError, TypeInfo};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 类型擦除后的模块实例
pub type ErasedInstance = Arc<dyn Any + Send + Sync>;

type Factory = Arc<dyn Fn() -> Result<ErasedInstance, String> + Send + Sync>;
type Caster = Arc<dyn Fn(&ErasedInstance) -> Option<ErasedInstance> + Send + Sync>;
type Loader = Arc<dyn Fn() -> Result<Vec<TypeEntry>, String> + Send + Sync>;

/// 类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// 可实例化的具体类型
    Concrete,
    /// 抽象类型
    Abstract,
    /// 接口（trait）
    Interface,
}

/// 模块能力：类型声明实现的一个模块契约
#[derive(Clone)]
pub struct ModuleCapability {
    /// 模块契约
    pub contract: TypeInfo,
    /// 模块类别
    pub category: ModuleCategory,
    caster: Option<Caster>,
}

impl ModuleCapability {
    /// 把实例转换为 `Arc<S>` 并以擦除形式返回
    pub(crate) fn cast(&self, instance: &ErasedInstance) -> Option<ErasedInstance> {
        self.caster.as_ref().and_then(|cast| cast(instance))
    }
}

impl fmt::Debug for ModuleCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCapability")
            .field("contract", &self.contract)
            .field("category", &self.category)
            .finish()
    }
}

/// 类型条目
#[derive(Clone)]
pub struct TypeEntry {
    type_info: TypeInfo,
    kind: TypeKind,
    contracts: Vec<TypeInfo>,
    modules: Vec<ModuleCapability>,
    factory: Option<Factory>,
}

impl TypeEntry {
    /// 具体类型
    pub fn concrete<T: Send + Sync + 'static>() -> TypeEntryBuilder<T> {
        TypeEntryBuilder::new(TypeKind::Concrete)
    }

    /// 通过 `Default` 构造的具体类型，最常见的模块形式
    pub fn module<T: Default + Send + Sync + 'static>() -> TypeEntryBuilder<T> {
        Self::concrete::<T>().constructed_by(T::default)
    }

    /// 抽象类型
    pub fn abstract_type<T: ?Sized + 'static>() -> TypeEntryBuilder<T> {
        TypeEntryBuilder::new(TypeKind::Abstract)
    }

    /// 接口类型
    pub fn interface<T: ?Sized + 'static>() -> TypeEntryBuilder<T> {
        TypeEntryBuilder::new(TypeKind::Interface)
    }

    /// 类型信息
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 类型种类
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// 是否为具体类型
    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Concrete
    }

    /// 声明的模块能力，按声明顺序
    pub fn module_capabilities(&self) -> &[ModuleCapability] {
        &self.modules
    }

    /// 是否可以赋值给指定契约（包括类型自身）
    pub fn implements(&self, contract: &TypeInfo) -> bool {
        self.type_info == *contract
            || self.contracts.contains(contract)
            || self.modules.iter().any(|module| module.contract == *contract)
    }

    /// 是否为组合模块：具体类型且至少声明一个模块契约
    pub fn is_composition_module(&self) -> bool {
        self.is_concrete() && !self.modules.is_empty()
    }

    /// 创建实例
    pub fn instantiate(&self) -> Result<ErasedInstance, DiscoveryError> {
        let factory =
            self.factory
                .as_ref()
                .ok_or_else(|| DiscoveryError::ModuleActivationFailed {
                    type_name: self.type_info.name.to_string(),
                    message: "类型没有可用的构造方式".to_string(),
                })?;
        factory().map_err(|message| DiscoveryError::ModuleActivationFailed {
            type_name: self.type_info.name.to_string(),
            message,
        })
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("type_info", &self.type_info)
            .field("kind", &self.kind)
            .field("contracts", &self.contracts)
            .field("modules", &self.modules)
            .field("constructible", &self.factory.is_some())
            .finish()
    }
}

/// 类型条目构建器
pub struct TypeEntryBuilder<T: ?Sized> {
    entry: TypeEntry,
    _marker: std::marker::PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> TypeEntryBuilder<T> {
    fn new(kind: TypeKind) -> Self {
        Self {
            entry: TypeEntry {
                type_info: TypeInfo::of::<T>(),
                kind,
                contracts: Vec::new(),
                modules: Vec::new(),
                factory: None,
            },
            _marker: std::marker::PhantomData,
        }
    }

    /// 声明实现的契约
    pub fn implements<S: ?Sized + 'static>(mut self) -> Self {
        let contract = TypeInfo::of::<S>();
        if !self.entry.contracts.contains(&contract) {
            self.entry.contracts.push(contract);
        }
        self
    }

    /// 只声明模块契约，不提供转换
    ///
    /// 用于抽象类型和接口，它们不会被实例化。
    pub fn declares_module<S: ?Sized + ModuleContract>(mut self) -> Self {
        self.entry.modules.push(ModuleCapability {
            contract: TypeInfo::of::<S>(),
            category: S::CATEGORY,
            caster: None,
        });
        self
    }

    /// 完成构建
    pub fn build(self) -> TypeEntry {
        self.entry
    }
}

impl<T: Send + Sync + 'static> TypeEntryBuilder<T> {
    /// 指定构造方式
    pub fn constructed_by<F>(self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.try_constructed_by(move || Ok(factory()))
    }

    /// 指定可能失败的构造方式
    pub fn try_constructed_by<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        self.entry.factory = Some(Arc::new(move || {
            factory().map(|instance| Arc::new(instance) as ErasedInstance)
        }));
        self
    }

    /// 声明实现模块契约 `S`，`cast` 负责把实例转换为契约对象
    ///
    /// ```ignore
    /// TypeEntry::module::<CoreModule>()
    ///     .as_module::<dyn RegistratorModule>(|module| module)
    ///     .build();
    /// ```
    pub fn as_module<S>(mut self, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        S: ?Sized + ModuleContract,
    {
        let caster: Caster = Arc::new(move |instance: &ErasedInstance| {
            let concrete = Arc::clone(instance).downcast::<T>().ok()?;
            Some(Arc::new(cast(concrete)) as ErasedInstance)
        });
        self.entry.modules.push(ModuleCapability {
            contract: TypeInfo::of::<S>(),
            category: S::CATEGORY,
            caster: Some(caster),
        });
        self
    }
}

/// 程序集：一组类型条目的来源
///
/// 每次检查都会调用加载函数，加载失败作为发现错误返回。
#[derive(Clone)]
pub struct Assembly {
    name: Arc<str>,
    loader: Loader,
}

impl Assembly {
    /// 由固定的类型列表创建
    pub fn new(name: impl Into<String>, types: Vec<TypeEntry>) -> Self {
        Self::with_loader(name, move || Ok(types.clone()))
    }

    /// 由加载函数创建
    pub fn with_loader<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Vec<TypeEntry>, String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            loader: Arc::new(loader),
        }
    }

    /// 程序集名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取程序集中定义的类型，按声明顺序
    pub fn defined_types(&self) -> Result<Vec<TypeEntry>, DiscoveryError> {
        (self.loader)().map_err(|message| DiscoveryError::inspection_failed(self.name(), message))
    }
}

impl fmt::Debug for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assembly").field("name", &self.name).finish()
    }
}

static GLOBAL_ASSEMBLY_REGISTRY: Lazy<Arc<AssemblyRegistry>> =
    Lazy::new(|| Arc::new(AssemblyRegistry::new()));

/// 程序集注册表
///
/// 按名称保存程序集。名称中的 `-` 与 `_` 视为相同，
/// 因此 crate 名称和编译产物的文件名都能查到同一个程序集。
#[derive(Default)]
pub struct AssemblyRegistry {
    types: RwLock<BTreeMap<String, Vec<TypeEntry>>>,
    assemblies: RwLock<BTreeMap<String, Assembly>>,
}

impl AssemblyRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级注册表
    pub fn global() -> Arc<AssemblyRegistry> {
        Arc::clone(&GLOBAL_ASSEMBLY_REGISTRY)
    }

    /// 向指定程序集登记一个类型
    pub fn register_type(&self, assembly: &str, entry: TypeEntry) {
        debug!("登记类型: {} -> {}", entry.type_info(), assembly);
        self.types
            .write()
            .entry(normalize(assembly))
            .or_default()
            .push(entry);
    }

    /// 登记完整的程序集，同名时覆盖逐个登记的类型
    pub fn register_assembly(&self, assembly: Assembly) {
        debug!("登记程序集: {}", assembly.name());
        self.assemblies
            .write()
            .insert(normalize(assembly.name()), assembly);
    }

    /// 按名称查找程序集
    ///
    /// 逐个登记的类型按类型名称排序，启动时的登记顺序不固定。
    pub fn assembly(&self, name: &str) -> Option<Assembly> {
        let key = normalize(name);
        if let Some(assembly) = self.assemblies.read().get(&key) {
            return Some(assembly.clone());
        }
        let types = self.types.read();
        let mut entries = types.get(&key)?.clone();
        entries.sort_by(|left, right| left.type_info().name.cmp(right.type_info().name));
        Some(Assembly::new(name, entries))
    }

    /// 已登记的程序集名称
    pub fn assembly_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.extend(self.assemblies.read().keys().cloned());
        names.sort();
        names.dedup();
        names
    }
}

/// 向进程级注册表登记类型，供 `#[discoverable]` 宏生成的代码调用
pub fn register_type(assembly: &str, entry: TypeEntry) {
    AssemblyRegistry::global().register_type(assembly, entry);
}

fn normalize(name: &str) -> String {
    name.replace('-', "_")
}
