//! 依赖注入容器抽象接口

use crate::registry::DependencyRegistrator;
use crate::resolver::DependencyResolver;

/// 依赖注入容器
///
/// 注册能力与解析能力的组合。任何同时实现两者的类型都自动成为容器。
pub trait IocContainer: DependencyRegistrator + DependencyResolver {
    /// 以注册能力的形式访问容器
    fn as_registrator(&self) -> &dyn DependencyRegistrator;

    /// 以解析能力的形式访问容器
    fn as_resolver(&self) -> &dyn DependencyResolver;
}

impl<T> IocContainer for T
where
    T: DependencyRegistrator + DependencyResolver,
{
    fn as_registrator(&self) -> &dyn DependencyRegistrator {
        self
    }

    fn as_resolver(&self) -> &dyn DependencyResolver {
        self
    }
}
