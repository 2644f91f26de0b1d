//! # 依赖注入具体实现
//!
//! 提供一个按顺序记录注册的内存容器。
//!
//! 容器只保存注册记录，解析时返回以实例方式注册的对象；
//! 按类型注册的服务不在这里构造。

use di_abstractions::{
    DependencyRegistrator, DependencyResolver, Implementation, RegistrationEntry, ServiceKey,
    SharedInstance,
};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 容器选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerOptions {
    /// 拒绝同一契约的重复注册
    pub reject_duplicates: bool,
}

/// 具体的依赖注入容器实现
///
/// 默认允许重复注册，重复应用同一组注册会得到重复的记录。
#[derive(Debug, Default)]
pub struct DiContainerImpl {
    /// 注册记录，按注册顺序保存
    registrations: RwLock<Vec<RegistrationEntry>>,
    options: ContainerOptions,
}

impl DiContainerImpl {
    /// 创建新的容器
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// 创建拒绝重复注册的容器
    pub fn strict() -> Self {
        Self::with_options(ContainerOptions {
            reject_duplicates: true,
        })
    }

    /// 使用指定选项创建容器
    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            options,
        }
    }

    /// 创建共享容器
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// 获取所有注册记录的快照
    pub fn registrations(&self) -> Vec<RegistrationEntry> {
        self.registrations.read().clone()
    }

    /// 获取指定契约的注册记录
    pub fn registrations_for(&self, service: &ServiceKey) -> Vec<RegistrationEntry> {
        self.registrations
            .read()
            .iter()
            .filter(|entry| entry.service == *service)
            .cloned()
            .collect()
    }

    /// 是否存在指定契约的注册
    pub fn contains(&self, service: &ServiceKey) -> bool {
        self.registrations
            .read()
            .iter()
            .any(|entry| entry.service == *service)
    }

    /// 注册记录数量
    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    /// 是否没有任何注册
    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// 清空注册记录
    ///
    /// 核心注册会把容器自身作为实例放入容器，形成引用环；
    /// 不再使用容器时调用此方法以释放它。
    pub fn clear(&self) {
        let mut registrations = self.registrations.write();
        info!("清空容器注册, 共 {} 条", registrations.len());
        registrations.clear();
    }

    fn push(&self, entry: RegistrationEntry) -> DependencyResult<()> {
        let mut registrations = self.registrations.write();
        if self.options.reject_duplicates
            && registrations
                .iter()
                .any(|existing| existing.service == entry.service)
        {
            warn!("拒绝重复注册: {}", entry.service);
            return Err(DependencyError::DuplicateRegistration {
                type_name: entry.service.contract().name.to_string(),
            });
        }
        debug!("注册: {}", entry);
        registrations.push(entry);
        Ok(())
    }
}

impl DependencyRegistrator for DiContainerImpl {
    fn register_transient(
        &self,
        service: TypeInfo,
        implementation: TypeInfo,
    ) -> DependencyResult<()> {
        self.push(RegistrationEntry::transient(service, implementation))
    }

    fn register_singleton(
        &self,
        service: TypeInfo,
        implementation: TypeInfo,
    ) -> DependencyResult<()> {
        self.push(RegistrationEntry::singleton(service, implementation))
    }

    fn register_instance(&self, service: TypeInfo, instance: SharedInstance) -> DependencyResult<()> {
        self.push(RegistrationEntry::instance(service, instance))
    }

    fn register_collection(
        &self,
        service: TypeInfo,
        implementations: Vec<TypeInfo>,
    ) -> DependencyResult<()> {
        self.push(RegistrationEntry::collection(service, implementations))
    }
}

impl DependencyResolver for DiContainerImpl {
    fn resolve(&self, service: &TypeInfo) -> DependencyResult<SharedInstance> {
        let key = ServiceKey::Single(*service);
        let registrations = self.registrations.read();
        let entry = registrations
            .iter()
            .rev()
            .find(|entry| entry.service == key)
            .ok_or_else(|| DependencyError::ComponentNotRegistered {
                type_name: service.name.to_string(),
            })?;

        match &entry.implementation {
            Implementation::Instance(instance) => Ok(Arc::clone(instance)),
            _ => Err(DependencyError::DependencyResolutionFailed {
                type_name: service.name.to_string(),
                message: format!("不支持构造 {} 注册的服务", entry.lifetime),
            }),
        }
    }

    fn resolve_all(&self, service: &TypeInfo) -> DependencyResult<Vec<SharedInstance>> {
        let key = ServiceKey::Single(*service);
        Ok(self
            .registrations
            .read()
            .iter()
            .filter(|entry| entry.service == key)
            .filter_map(RegistrationEntry::shared_instance)
            .cloned()
            .collect())
    }
}
