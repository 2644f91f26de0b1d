//! 解析能力

use crate::registry::SharedInstance;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::sync::Arc;

/// 依赖解析能力
///
/// 组合引擎只把解析器作为一个可注册的实例对待，解析算法由具体容器决定。
pub trait DependencyResolver: Send + Sync {
    /// 解析契约对应的实例
    fn resolve(&self, service: &TypeInfo) -> DependencyResult<SharedInstance>;

    /// 解析契约对应的全部实例
    fn resolve_all(&self, service: &TypeInfo) -> DependencyResult<Vec<SharedInstance>>;
}

/// 泛型解析辅助方法
pub trait DependencyResolverExt: DependencyResolver {
    /// 解析以 `Arc<S>` 形式注册的实例
    fn resolve_instance<S>(&self) -> DependencyResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let service = TypeInfo::of::<S>();
        let instance = self.resolve(&service)?;
        instance
            .downcast_ref::<Arc<S>>()
            .cloned()
            .ok_or_else(|| DependencyError::DependencyResolutionFailed {
                type_name: service.name.to_string(),
                message: "实例类型与契约不匹配".to_string(),
            })
    }
}

impl<R: DependencyResolver + ?Sized> DependencyResolverExt for R {}
