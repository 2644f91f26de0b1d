//! 面向注册能力的中间件
//!
//! 这些中间件直接作用于 [`DynRegistrator`]，既可以被引导器的
//! 组合模块中间件调用，也可以脱离引导器单独使用。

use super::{Middleware, MiddlewareApplier};
use crate::capabilities::DynRegistrator;
use crate::module::{
    apply_registration, ContainerModule, HierarchicalModule, ModuleCategory, ModuleDescriptor,
    PlainModule, RegistratorModule,
};
use di_abstractions::{DependencyRegistratorExt, IocContainer};
use infrastructure_common::DependencyResult;
use std::sync::Arc;
use tracing::{debug, warn};

/// 执行注册模块
pub struct ContainerRegistrationMiddleware {
    modules: Vec<ModuleDescriptor>,
}

impl ContainerRegistrationMiddleware {
    /// 创建中间件
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }
}

impl Middleware<DynRegistrator> for ContainerRegistrationMiddleware {
    fn apply<'a>(
        &self,
        target: &'a DynRegistrator,
    ) -> DependencyResult<&'a DynRegistrator> {
        for descriptor in &self.modules {
            if let Some(module) = descriptor.as_contract::<dyn RegistratorModule>() {
                debug!("登记注册模块: {}", descriptor.type_info());
                module.register_module(target)?;
            }
        }
        Ok(target)
    }
}

/// 执行声明式模块
pub struct ContainerPlainRegistrationMiddleware {
    modules: Vec<ModuleDescriptor>,
}

impl ContainerPlainRegistrationMiddleware {
    /// 创建中间件
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }
}

impl Middleware<DynRegistrator> for ContainerPlainRegistrationMiddleware {
    fn apply<'a>(
        &self,
        target: &'a DynRegistrator,
    ) -> DependencyResult<&'a DynRegistrator> {
        for descriptor in &self.modules {
            if let Some(module) = descriptor.as_contract::<dyn PlainModule>() {
                let registrations = module.registrations();
                debug!(
                    "登记声明式模块: {}, 共 {} 条",
                    descriptor.type_info(),
                    registrations.len()
                );
                for entry in &registrations {
                    apply_registration(target, entry)?;
                }
            }
        }
        Ok(target)
    }
}

/// 执行层级模块，子模块按同样的规则递归登记
pub struct ContainerHierarchicalRegistrationMiddleware {
    modules: Vec<ModuleDescriptor>,
}

impl ContainerHierarchicalRegistrationMiddleware {
    /// 创建中间件
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }
}

impl Middleware<DynRegistrator> for ContainerHierarchicalRegistrationMiddleware {
    fn apply<'a>(
        &self,
        target: &'a DynRegistrator,
    ) -> DependencyResult<&'a DynRegistrator> {
        for descriptor in &self.modules {
            if let Some(module) = descriptor.as_contract::<dyn HierarchicalModule>() {
                let children = module.modules();
                debug!(
                    "登记层级模块: {}, 子模块 {} 个",
                    descriptor.type_info(),
                    children.len()
                );
                for child in children.iter().filter(|child| {
                    !matches!(
                        child.category(),
                        ModuleCategory::Registrator | ModuleCategory::Plain | ModuleCategory::Hierarchical
                    )
                }) {
                    warn!(
                        "层级模块 {} 的子模块 {} 不会被登记",
                        descriptor.type_info(),
                        child
                    );
                }
                register_container_adapter_composition_modules(target, &children)?;
            }
        }
        Ok(target)
    }
}

/// 执行需要完整容器的模块
pub struct ContainerModulesMiddleware {
    modules: Vec<ModuleDescriptor>,
}

impl ContainerModulesMiddleware {
    /// 创建中间件
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }
}

impl<C: ?Sized + 'static> Middleware<C> for ContainerModulesMiddleware {
    fn apply<'a>(&self, target: &'a C) -> DependencyResult<&'a C> {
        for descriptor in &self.modules {
            if let Some(module) = descriptor.as_contract::<dyn ContainerModule<C>>() {
                debug!("登记容器模块: {}", descriptor.type_info());
                module.register_module(target)?;
            }
        }
        Ok(target)
    }
}

/// 登记根对象与容器自身
///
/// 顺序固定：根对象单例，容器的具体类型实例，容器的抽象类型实例。
/// 容器会持有自身的引用，不再使用时需要由容器实现清理。
pub fn register_core<R, C>(container: &Arc<C>) -> DependencyResult<()>
where
    R: 'static,
    C: IocContainer + 'static,
{
    debug!(
        "登记核心服务: root={}, container={}",
        std::any::type_name::<R>(),
        std::any::type_name::<C>()
    );
    container.register_singleton_as::<R, R>()?;
    container.register_instance_as::<C>(Arc::clone(container))?;
    container.register_instance_as::<dyn IocContainer>(Arc::clone(container) as Arc<dyn IocContainer>)
}

/// 依次执行注册模块、声明式模块和层级模块
pub fn register_container_adapter_composition_modules(
    registrator: &DynRegistrator,
    modules: &[ModuleDescriptor],
) -> DependencyResult<()> {
    let middlewares: Vec<Box<dyn Middleware<DynRegistrator>>> = vec![
        Box::new(ContainerRegistrationMiddleware::new(modules.to_vec())),
        Box::new(ContainerPlainRegistrationMiddleware::new(modules.to_vec())),
        Box::new(ContainerHierarchicalRegistrationMiddleware::new(
            modules.to_vec(),
        )),
    ];
    MiddlewareApplier::apply_middlewares(registrator, &middlewares).map(|_| ())
}

/// 执行面向容器类型 `C` 的模块
pub fn register_container_composition_modules<C: ?Sized + 'static>(
    container: &C,
    modules: &[ModuleDescriptor],
) -> DependencyResult<()> {
    ContainerModulesMiddleware::new(modules.to_vec())
        .apply(container)
        .map(|_| ())
}
