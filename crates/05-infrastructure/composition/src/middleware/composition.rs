//! 面向引导器能力的中间件
//!
//! 目标类型只需具备相应的能力 trait，因此同一个中间件可以用于
//! 任何满足条件的引导器。

use super::container::{
    register_container_adapter_composition_modules, register_container_composition_modules,
    register_core,
};
use super::Middleware;
use crate::capabilities::{
    BootstrapperWithRegistrator, CompositionModulesProvider, DynRegistrator, HasAssemblySource,
    HasContainer, HasRegistrator,
};
use crate::catalog::Assembly;
use crate::module::BootstrapperModule;
use di_abstractions::{DependencyRegistratorExt, DependencyResolver, IocContainer};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// 核心注册：根对象 `R` 与容器自身
pub struct RegisterCoreMiddleware<R> {
    _root: PhantomData<fn() -> R>,
}

impl<R> RegisterCoreMiddleware<R> {
    /// 创建中间件
    pub fn new() -> Self {
        Self { _root: PhantomData }
    }
}

impl<R> Default for RegisterCoreMiddleware<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Middleware<T> for RegisterCoreMiddleware<R>
where
    T: HasContainer,
    T::Container: IocContainer + Sized + 'static,
    R: 'static,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        register_core::<R, T::Container>(target.container())?;
        Ok(target)
    }
}

/// 组合模块注册：注册模块、声明式模块、层级模块
#[derive(Debug, Default, Clone, Copy)]
pub struct RegisterCompositionModulesMiddleware;

impl<T> Middleware<T> for RegisterCompositionModulesMiddleware
where
    T: HasRegistrator + CompositionModulesProvider,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        let modules = target.modules();
        info!("登记组合模块, 共 {} 个", modules.len());
        register_container_adapter_composition_modules(target.registrator(), modules)?;
        Ok(target)
    }
}

/// 容器模块注册：需要完整容器的模块
#[derive(Debug, Default, Clone, Copy)]
pub struct RegisterContainerCompositionModulesMiddleware;

impl<T> Middleware<T> for RegisterContainerCompositionModulesMiddleware
where
    T: HasContainer + CompositionModulesProvider,
    T::Container: 'static,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        register_container_composition_modules(target.container().as_ref(), target.modules())?;
        Ok(target)
    }
}

/// 集合注册：把程序集中可赋值给契约的具体类型登记为一条集合记录
#[derive(Debug, Clone, Copy)]
pub struct RegisterCollectionMiddleware {
    contract: TypeInfo,
}

impl RegisterCollectionMiddleware {
    /// 指定契约
    pub fn new(contract: TypeInfo) -> Self {
        Self { contract }
    }

    /// 以类型参数指定契约
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<S>())
    }

    /// 契约
    pub fn contract(&self) -> TypeInfo {
        self.contract
    }
}

impl<T> Middleware<T> for RegisterCollectionMiddleware
where
    T: HasRegistrator + HasAssemblySource,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        let implementations = collect_implementations(target.assemblies(), &self.contract)?;
        debug!(
            "登记集合: {}, 实现 {} 个",
            self.contract,
            implementations.len()
        );
        target
            .registrator()
            .register_collection(self.contract, implementations)?;
        Ok(target)
    }
}

/// 收集程序集中可赋值给契约的具体类型，按枚举顺序，重复类型只保留一次
///
/// 此时已处于注册阶段，程序集读取失败属于注册错误。
pub fn collect_implementations(
    assemblies: &[Assembly],
    contract: &TypeInfo,
) -> DependencyResult<Vec<TypeInfo>> {
    let mut implementations: Vec<TypeInfo> = Vec::new();
    for assembly in assemblies {
        let types = assembly
            .defined_types()
            .map_err(|error| DependencyError::registration(contract.name, error.to_string()))?;
        for entry in types {
            if entry.is_concrete()
                && entry.implements(contract)
                && !implementations.contains(&entry.type_info())
            {
                implementations.push(entry.type_info());
            }
        }
    }
    Ok(implementations)
}

/// 解析器注册
pub struct RegisterResolverMiddleware {
    resolver: Arc<dyn DependencyResolver>,
}

impl RegisterResolverMiddleware {
    /// 指定解析器
    pub fn new(resolver: Arc<dyn DependencyResolver>) -> Self {
        Self { resolver }
    }
}

impl<T> Middleware<T> for RegisterResolverMiddleware
where
    T: HasRegistrator,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        target
            .registrator()
            .register_instance_as::<dyn DependencyResolver>(Arc::clone(&self.resolver))?;
        Ok(target)
    }
}

/// 引导器模块注册：让感知引导器的模块针对引导器自身登记
#[derive(Debug, Default, Clone, Copy)]
pub struct RegisterBootstrapperCompositionModulesMiddleware;

impl<T> Middleware<T> for RegisterBootstrapperCompositionModulesMiddleware
where
    T: BootstrapperWithRegistrator,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        for descriptor in target.modules() {
            if let Some(module) = descriptor.as_contract::<dyn BootstrapperModule>() {
                debug!("登记引导器模块: {}", descriptor.type_info());
                module.register_module(target)?;
            }
        }
        Ok(target)
    }
}

/// 在引导器上执行面向注册能力的中间件
pub struct UseDependencyRegistratorMiddleware {
    inner: Box<dyn Middleware<DynRegistrator>>,
}

impl UseDependencyRegistratorMiddleware {
    /// 包装中间件
    pub fn new<M>(middleware: M) -> Self
    where
        M: Middleware<DynRegistrator> + 'static,
    {
        Self {
            inner: Box::new(middleware),
        }
    }

    /// 包装已装箱的中间件
    pub fn from_boxed(inner: Box<dyn Middleware<DynRegistrator>>) -> Self {
        Self { inner }
    }
}

impl<T> Middleware<T> for UseDependencyRegistratorMiddleware
where
    T: HasRegistrator,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        self.inner.apply(target.registrator())?;
        Ok(target)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
