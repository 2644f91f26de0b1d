//! 引导器能力
//!
//! 中间件只依赖目标对象的能力，而不依赖具体的引导器类型。

use crate::catalog::Assembly;
use crate::middleware::Middleware;
use crate::module::ModuleDescriptor;
use di_abstractions::DependencyRegistrator;
use std::sync::Arc;

/// 注册能力对象
///
/// 中间件以此为目标类型，对象生命周期固定为 `'static`。
pub type DynRegistrator = dyn DependencyRegistrator;

/// 提供注册能力
pub trait HasRegistrator {
    /// 注册能力
    fn registrator(&self) -> &DynRegistrator;
}

/// 提供完整容器
pub trait HasContainer {
    /// 容器类型
    type Container: ?Sized;

    /// 容器
    fn container(&self) -> &Arc<Self::Container>;
}

/// 提供程序集来源
pub trait HasAssemblySource {
    /// 参与组合的程序集，按枚举顺序
    fn assemblies(&self) -> &[Assembly];
}

/// 提供已发现的组合模块
pub trait CompositionModulesProvider {
    /// 组合模块，按发现顺序
    fn modules(&self) -> &[ModuleDescriptor];
}

/// 具备注册能力的引导器
pub trait BootstrapperWithRegistrator:
    HasRegistrator + HasAssemblySource + CompositionModulesProvider
{
}

impl<T> BootstrapperWithRegistrator for T where
    T: HasRegistrator + HasAssemblySource + CompositionModulesProvider + ?Sized
{
}

/// 可以追加中间件的对象
pub trait Extensible: Sized {
    /// 追加中间件，按追加顺序执行
    fn use_middleware<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware<Self> + 'static;
}
