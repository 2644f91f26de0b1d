//! 注册能力与注册记录

use infrastructure_common::{DependencyResult, Lifetime, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的共享实例
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// 服务契约标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    /// 单一契约
    Single(TypeInfo),
    /// 契约的集合
    Collection(TypeInfo),
}

impl ServiceKey {
    /// 指定契约的单一标识
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self::Single(TypeInfo::of::<S>())
    }

    /// 指定契约的集合标识
    pub fn collection_of<S: ?Sized + 'static>() -> Self {
        Self::Collection(TypeInfo::of::<S>())
    }

    /// 获取契约类型
    pub fn contract(&self) -> TypeInfo {
        match self {
            Self::Single(info) | Self::Collection(info) => *info,
        }
    }

    /// 是否为集合标识
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(info) => write!(f, "{info}"),
            Self::Collection(info) => write!(f, "collection<{info}>"),
        }
    }
}

/// 注册的实现
#[derive(Debug, Clone)]
pub enum Implementation {
    /// 由容器按类型构造
    Type(TypeInfo),
    /// 预先构造好的实例
    Instance(SharedInstance),
    /// 一组实现类型
    Types(Vec<TypeInfo>),
}

/// 注册记录
///
/// 由容器持有，组合引擎只追加，不修改也不删除。
#[derive(Debug, Clone)]
pub struct RegistrationEntry {
    /// 服务契约
    pub service: ServiceKey,
    /// 实现
    pub implementation: Implementation,
    /// 生命周期
    pub lifetime: Lifetime,
}

impl RegistrationEntry {
    /// 瞬时注册
    pub fn transient(service: TypeInfo, implementation: TypeInfo) -> Self {
        Self {
            service: ServiceKey::Single(service),
            implementation: Implementation::Type(implementation),
            lifetime: Lifetime::Transient,
        }
    }

    /// 单例注册
    pub fn singleton(service: TypeInfo, implementation: TypeInfo) -> Self {
        Self {
            service: ServiceKey::Single(service),
            implementation: Implementation::Type(implementation),
            lifetime: Lifetime::Singleton,
        }
    }

    /// 实例注册
    pub fn instance(service: TypeInfo, instance: SharedInstance) -> Self {
        Self {
            service: ServiceKey::Single(service),
            implementation: Implementation::Instance(instance),
            lifetime: Lifetime::Instance,
        }
    }

    /// 集合注册
    pub fn collection(service: TypeInfo, implementations: Vec<TypeInfo>) -> Self {
        Self {
            service: ServiceKey::Collection(service),
            implementation: Implementation::Types(implementations),
            lifetime: Lifetime::Collection,
        }
    }

    /// 实现类型，仅对按类型注册的记录有值
    pub fn implementation_type(&self) -> Option<TypeInfo> {
        match &self.implementation {
            Implementation::Type(info) => Some(*info),
            _ => None,
        }
    }

    /// 集合注册的实现类型列表
    pub fn implementation_types(&self) -> &[TypeInfo] {
        match &self.implementation {
            Implementation::Types(types) => types,
            _ => &[],
        }
    }

    /// 实例注册持有的实例
    pub fn shared_instance(&self) -> Option<&SharedInstance> {
        match &self.implementation {
            Implementation::Instance(instance) => Some(instance),
            _ => None,
        }
    }
}

impl fmt::Display for RegistrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.implementation {
            Implementation::Type(info) => {
                write!(f, "{} -> {} ({})", self.service, info, self.lifetime)
            }
            Implementation::Instance(_) => write!(f, "{} -> <instance>", self.service),
            Implementation::Types(types) => write!(
                f,
                "{} -> [{}]",
                self.service,
                types
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// 依赖注册能力
///
/// 方法都以类型标识为参数，因此可以作为 `dyn DependencyRegistrator` 使用；
/// 泛型形式见 [`DependencyRegistratorExt`]。实现需要自行处理内部可变性。
pub trait DependencyRegistrator: Send + Sync {
    /// 注册瞬时服务
    fn register_transient(&self, service: TypeInfo, implementation: TypeInfo)
        -> DependencyResult<()>;

    /// 注册单例服务
    fn register_singleton(&self, service: TypeInfo, implementation: TypeInfo)
        -> DependencyResult<()>;

    /// 注册实例
    fn register_instance(&self, service: TypeInfo, instance: SharedInstance)
        -> DependencyResult<()>;

    /// 注册集合，一个契约对应一组实现
    fn register_collection(
        &self,
        service: TypeInfo,
        implementations: Vec<TypeInfo>,
    ) -> DependencyResult<()>;
}

/// 泛型注册辅助方法
pub trait DependencyRegistratorExt: DependencyRegistrator {
    /// 以 `S` 为契约注册瞬时实现 `I`
    fn register_transient_as<S: ?Sized + 'static, I: 'static>(&self) -> DependencyResult<()> {
        self.register_transient(TypeInfo::of::<S>(), TypeInfo::of::<I>())
    }

    /// 以 `S` 为契约注册单例实现 `I`
    fn register_singleton_as<S: ?Sized + 'static, I: 'static>(&self) -> DependencyResult<()> {
        self.register_singleton(TypeInfo::of::<S>(), TypeInfo::of::<I>())
    }

    /// 以 `S` 为契约注册实例
    ///
    /// 实例以 `Arc<S>` 的形式保存，可通过
    /// [`DependencyResolverExt::resolve_instance`](crate::DependencyResolverExt::resolve_instance) 取回。
    fn register_instance_as<S>(&self, instance: Arc<S>) -> DependencyResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.register_instance(TypeInfo::of::<S>(), Arc::new(instance))
    }

    /// 以 `S` 为契约注册一组实现
    fn register_collection_of<S: ?Sized + 'static>(
        &self,
        implementations: Vec<TypeInfo>,
    ) -> DependencyResult<()> {
        self.register_collection(TypeInfo::of::<S>(), implementations)
    }
}

impl<R: DependencyRegistrator + ?Sized> DependencyRegistratorExt for R {}

#[cfg(test)]
mod tests {
    use super::*;

    trait Contract {}
    struct First;
    struct Second;

    #[test]
    fn collection_entry_keys_by_collection_of_contract() {
        let entry = RegistrationEntry::collection(
            TypeInfo::of::<dyn Contract>(),
            vec![TypeInfo::of::<First>(), TypeInfo::of::<Second>()],
        );
        assert_eq!(entry.service, ServiceKey::collection_of::<dyn Contract>());
        assert_ne!(entry.service, ServiceKey::of::<dyn Contract>());
        assert_eq!(entry.implementation_types().len(), 2);
        assert_eq!(entry.lifetime, Lifetime::Collection);
        assert_eq!(entry.to_string(), "collection<dyn Contract> -> [First, Second]");
    }

    #[test]
    fn transient_entry_exposes_implementation_type() {
        let entry = RegistrationEntry::transient(TypeInfo::of::<dyn Contract>(), TypeInfo::of::<First>());
        assert_eq!(entry.implementation_type(), Some(TypeInfo::of::<First>()));
        assert!(entry.shared_instance().is_none());
        assert_eq!(entry.to_string(), "dyn Contract -> First (transient)");
    }
}
