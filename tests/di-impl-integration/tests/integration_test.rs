//! di-impl 通过抽象接口使用时的集成测试

use di_abstractions::{
    DependencyRegistrator, DependencyRegistratorExt, DependencyResolverExt, IocContainer,
    ServiceKey,
};
use di_impl::DiContainerImpl;
use infrastructure_common::{Lifetime, TypeInfo};
use std::sync::Arc;

trait Repository: Send + Sync {
    fn name(&self) -> &'static str;
}

struct SqlRepository;
struct MemoryRepository;

impl Repository for SqlRepository {
    fn name(&self) -> &'static str {
        "sql"
    }
}

impl Repository for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory"
    }
}

fn register_repositories(registrator: &dyn DependencyRegistrator) {
    registrator
        .register_transient_as::<dyn Repository, SqlRepository>()
        .unwrap();
    registrator
        .register_collection_of::<dyn Repository>(vec![
            TypeInfo::of::<SqlRepository>(),
            TypeInfo::of::<MemoryRepository>(),
        ])
        .unwrap();
}

#[test]
fn test_registration_through_trait_object() {
    let container = DiContainerImpl::new();
    register_repositories(&container);

    let entries = container.registrations();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].service, ServiceKey::of::<dyn Repository>());
    assert_eq!(entries[1].service, ServiceKey::collection_of::<dyn Repository>());
    assert_eq!(entries[1].lifetime, Lifetime::Collection);
    assert_eq!(
        entries[1].implementation_types(),
        &[
            TypeInfo::of::<SqlRepository>(),
            TypeInfo::of::<MemoryRepository>()
        ]
    );
}

#[test]
fn test_container_as_ioc_container() {
    let container: Arc<DiContainerImpl> = DiContainerImpl::shared();
    let ioc: Arc<dyn IocContainer> = container.clone();

    let repository: Arc<dyn Repository> = Arc::new(MemoryRepository);
    ioc.as_registrator().register_instance_as(repository).unwrap();

    let resolved = ioc
        .as_resolver()
        .resolve_instance::<dyn Repository>()
        .unwrap();
    assert_eq!(resolved.name(), "memory");
    assert_eq!(container.len(), 1);
}
