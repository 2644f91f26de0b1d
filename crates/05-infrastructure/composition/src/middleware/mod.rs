//! # 注册中间件
//!
//! 中间件是引导过程中的一个注册步骤：接收目标对象，对其容器进行登记，
//! 再把目标交给下一个步骤。[`MiddlewareApplier`] 按列表顺序执行，
//! 第一个错误原样返回，后续步骤不再执行，已完成的登记不回滚。
//!
//! - [`container`] - 面向注册能力的中间件与辅助函数
//! - [`composition`] - 面向引导器能力的中间件

pub mod applier;
pub mod composition;
pub mod container;

pub use applier::MiddlewareApplier;
pub use composition::*;
pub use container::*;

use infrastructure_common::DependencyResult;

/// 注册中间件
///
/// 目标以共享引用传入，登记通过容器的内部可变性完成。
pub trait Middleware<T: ?Sized> {
    /// 对目标执行登记，返回交给下一个中间件的目标
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T>;

    /// 中间件名称，用于日志
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T, F> Middleware<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> DependencyResult<()>,
{
    fn apply<'a>(&self, target: &'a T) -> DependencyResult<&'a T> {
        self(target)?;
        Ok(target)
    }
}
