//! 引导器扩展方法
//!
//! 每个方法向中间件列表末尾追加一个登记步骤，执行顺序即调用顺序。
//! 重复调用会重复登记。

use crate::capabilities::{DynRegistrator, Extensible};
use crate::middleware::{
    Middleware, RegisterBootstrapperCompositionModulesMiddleware, RegisterCollectionMiddleware,
    RegisterCompositionModulesMiddleware, RegisterContainerCompositionModulesMiddleware,
    RegisterCoreMiddleware, RegisterResolverMiddleware, UseDependencyRegistratorMiddleware,
};
use di_abstractions::DependencyResolver;
use infrastructure_common::{DependencyResult, TypeInfo};
use std::sync::Arc;

/// 引导器扩展方法
pub trait BootstrapperExtensions: Extensible {
    /// 登记根对象 `R` 与容器自身
    fn use_core_registration<R: 'static>(&mut self) -> &mut Self
    where
        RegisterCoreMiddleware<R>: Middleware<Self>,
    {
        self.use_middleware(RegisterCoreMiddleware::<R>::new())
    }

    /// 登记注册模块、声明式模块和层级模块
    fn use_composition_modules(&mut self) -> &mut Self
    where
        RegisterCompositionModulesMiddleware: Middleware<Self>,
    {
        self.use_middleware(RegisterCompositionModulesMiddleware)
    }

    /// 登记需要完整容器的模块
    fn use_container_composition_modules(&mut self) -> &mut Self
    where
        RegisterContainerCompositionModulesMiddleware: Middleware<Self>,
    {
        self.use_middleware(RegisterContainerCompositionModulesMiddleware)
    }

    /// 登记契约的实现集合
    fn use_collection_registration(&mut self, contract: TypeInfo) -> &mut Self
    where
        RegisterCollectionMiddleware: Middleware<Self>,
    {
        self.use_middleware(RegisterCollectionMiddleware::new(contract))
    }

    /// 登记契约 `S` 的实现集合
    fn use_collection_registration_of<S: ?Sized + 'static>(&mut self) -> &mut Self
    where
        RegisterCollectionMiddleware: Middleware<Self>,
    {
        self.use_middleware(RegisterCollectionMiddleware::of::<S>())
    }

    /// 立即登记契约的实现集合，不进入中间件列表
    fn apply_collection_registration(&self, contract: TypeInfo) -> DependencyResult<()>
    where
        RegisterCollectionMiddleware: Middleware<Self>,
    {
        RegisterCollectionMiddleware::new(contract)
            .apply(self)
            .map(|_| ())
    }

    /// 立即登记契约 `S` 的实现集合
    fn apply_collection_registration_of<S: ?Sized + 'static>(&self) -> DependencyResult<()>
    where
        RegisterCollectionMiddleware: Middleware<Self>,
    {
        self.apply_collection_registration(TypeInfo::of::<S>())
    }

    /// 登记解析器
    fn use_resolver(&mut self, resolver: Arc<dyn DependencyResolver>) -> &mut Self
    where
        RegisterResolverMiddleware: Middleware<Self>,
    {
        self.use_middleware(RegisterResolverMiddleware::new(resolver))
    }

    /// 让感知引导器的模块针对引导器登记
    fn use_bootstrapper_composition(&mut self) -> &mut Self
    where
        RegisterBootstrapperCompositionModulesMiddleware: Middleware<Self>,
    {
        self.use_middleware(RegisterBootstrapperCompositionModulesMiddleware)
    }

    /// 追加面向注册能力的中间件
    fn use_registrator_middleware<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware<DynRegistrator> + 'static,
        UseDependencyRegistratorMiddleware: Middleware<Self>,
    {
        self.use_middleware(UseDependencyRegistratorMiddleware::new(middleware))
    }

    /// 按顺序追加多个面向注册能力的中间件
    fn use_many<I>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn Middleware<DynRegistrator>>>,
        UseDependencyRegistratorMiddleware: Middleware<Self>,
    {
        for middleware in middlewares {
            self.use_middleware(UseDependencyRegistratorMiddleware::from_boxed(middleware));
        }
        self
    }
}

impl<T: Extensible> BootstrapperExtensions for T {}
