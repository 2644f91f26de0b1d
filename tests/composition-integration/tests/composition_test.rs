//! 组合引擎集中集成测试
//!
//! 本文件中的类型由 `#[discoverable]` 在启动时登记到以本 crate 命名的程序集。

use di_abstractions::{
    DependencyRegistratorExt, DependencyResolverExt, IocContainer, RegistrationEntry, ServiceKey,
};
use di_impl::DiContainerImpl;
use infrastructure_common::{DependencyResult, DiscoveryError, Lifetime, TypeInfo};
use infrastructure_composition::{
    discoverable, Assembly, AssemblyRegistry, AssemblySource, BootstrapperBuilder,
    BootstrapperExtensions, BootstrapperModule, BootstrapperState, BootstrapperWithRegistrator,
    CompositionModulesProvider, DiscoveryCache, DiscoveryKey, DynRegistrator, HasContainer,
    ModuleCategory, ModuleDescriptor, ModuleDiscoverer, PlainModule, RegistratorModule, TypeEntry,
    LEGACY_ASSEMBLIES_KEY,
};
use std::sync::Arc;

const ASSEMBLY: &str = env!("CARGO_PKG_NAME");

pub trait Notifier: Send + Sync {}

#[discoverable(implements(dyn Notifier))]
pub struct EmailNotifier;

#[discoverable(implements(dyn Notifier))]
pub struct SmsNotifier;

impl Notifier for EmailNotifier {}
impl Notifier for SmsNotifier {}

pub struct ReportService;

pub struct ApplicationRoot;

/// 启动时看到的模块数量
pub struct StartupSummary(pub usize);

#[discoverable(registrator, bootstrapper)]
#[derive(Default)]
pub struct ReportingModule;

impl RegistratorModule for ReportingModule {
    fn register_module(&self, registrator: &DynRegistrator) -> DependencyResult<()> {
        registrator.register_singleton_as::<ReportService, ReportService>()
    }
}

impl BootstrapperModule for ReportingModule {
    fn register_module(&self, bootstrapper: &dyn BootstrapperWithRegistrator) -> DependencyResult<()> {
        bootstrapper
            .registrator()
            .register_instance_as(Arc::new(StartupSummary(bootstrapper.modules().len())))
    }
}

#[discoverable(plain, constructor = SettingsModule::create)]
pub struct SettingsModule {
    retries: u32,
}

impl SettingsModule {
    fn create() -> Self {
        Self { retries: 3 }
    }
}

impl PlainModule for SettingsModule {
    fn registrations(&self) -> Vec<RegistrationEntry> {
        if self.retries == 0 {
            return Vec::new();
        }
        vec![RegistrationEntry::transient(
            TypeInfo::of::<dyn Notifier>(),
            TypeInfo::of::<EmailNotifier>(),
        )]
    }
}

fn generated_assembly() -> Assembly {
    AssemblyRegistry::global()
        .assembly(ASSEMBLY)
        .expect("宏登记的程序集应当存在")
}

fn module_names(modules: &[ModuleDescriptor]) -> Vec<(String, ModuleCategory)> {
    modules
        .iter()
        .map(|module| (module.type_info().short_name(), module.category()))
        .collect()
}

#[test]
fn test_macro_registers_types_sorted_by_name() {
    let names: Vec<String> = generated_assembly()
        .defined_types()
        .unwrap()
        .iter()
        .map(|entry| entry.type_info().short_name())
        .collect();

    assert_eq!(
        names,
        vec!["EmailNotifier", "ReportingModule", "SettingsModule", "SmsNotifier"]
    );
}

#[test]
fn test_discovers_macro_modules_from_assembly_list() {
    let result = ModuleDiscoverer::new().discover(&AssemblySource::assemblies([generated_assembly()]));

    assert!(result.is_clean());
    assert_eq!(
        module_names(&result.modules),
        vec![
            ("ReportingModule".to_string(), ModuleCategory::Registrator),
            ("ReportingModule".to_string(), ModuleCategory::Bootstrapper),
            ("SettingsModule".to_string(), ModuleCategory::Plain),
        ]
    );
    assert!(result.modules[0].same_instance(&result.modules[1]));
}

#[test]
fn test_discovers_macro_modules_from_directory() {
    let directory = tempfile::tempdir().unwrap();
    let file_name = format!("{}.dll", ASSEMBLY.replace('-', "_"));
    std::fs::write(directory.path().join(file_name), b"").unwrap();
    std::fs::write(directory.path().join("composition_unknown.dll"), b"").unwrap();

    let discoverer = ModuleDiscoverer::new();
    let resolved = discoverer.resolve(&AssemblySource::path(directory.path(), ["composition"]));
    let result = discoverer.discover(&AssemblySource::path(directory.path(), ["composition"]));

    assert_eq!(
        resolved.key,
        DiscoveryKey::for_path(&directory.path().canonicalize().unwrap())
    );
    assert_eq!(result.modules.len(), 3);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        &result.errors[0],
        DiscoveryError::AssemblyNotFound { path } if path.ends_with("composition_unknown.dll")
    ));
}

#[test]
fn test_full_bootstrap_scenario() {
    let container = DiContainerImpl::shared();
    let mut bootstrapper = BootstrapperBuilder::with_container(Arc::clone(&container))
        .with_assemblies([generated_assembly()])
        .with_discovery_cache(Arc::new(DiscoveryCache::new()))
        .build()
        .unwrap();
    bootstrapper
        .use_core_registration::<ApplicationRoot>()
        .use_composition_modules()
        .use_collection_registration_of::<dyn Notifier>()
        .use_bootstrapper_composition();

    bootstrapper.initialize().unwrap();
    assert_eq!(bootstrapper.state(), BootstrapperState::Initialized);

    let services: Vec<ServiceKey> = container
        .registrations()
        .iter()
        .map(|entry| entry.service)
        .collect();
    assert_eq!(
        services,
        vec![
            ServiceKey::of::<ApplicationRoot>(),
            ServiceKey::of::<DiContainerImpl>(),
            ServiceKey::of::<dyn IocContainer>(),
            ServiceKey::of::<ReportService>(),
            ServiceKey::of::<dyn Notifier>(),
            ServiceKey::collection_of::<dyn Notifier>(),
            ServiceKey::of::<StartupSummary>(),
        ]
    );

    let collection = container.registrations_for(&ServiceKey::collection_of::<dyn Notifier>());
    assert_eq!(collection[0].lifetime, Lifetime::Collection);
    assert_eq!(
        collection[0].implementation_types(),
        &[TypeInfo::of::<EmailNotifier>(), TypeInfo::of::<SmsNotifier>()]
    );

    let summary = container.resolve_instance::<StartupSummary>().unwrap();
    assert_eq!(summary.0, 3);
    assert_eq!(bootstrapper.modules().len(), 3);

    container.clear();
    assert_eq!(Arc::strong_count(bootstrapper.container()), 2);
}

#[test]
fn test_assembly_lists_share_one_cache_entry() {
    let cache = Arc::new(DiscoveryCache::new());
    let first = AssemblySource::assemblies([generated_assembly()]);
    let second = AssemblySource::assemblies([Assembly::new(
        "other",
        vec![TypeEntry::concrete::<ApplicationRoot>().build()],
    )]);

    let mut modules = Vec::new();
    for source in [first, second] {
        let mut bootstrapper = BootstrapperBuilder::new()
            .with_source(source)
            .with_discovery_cache(Arc::clone(&cache))
            .build()
            .unwrap();
        bootstrapper.discover();
        modules.push(bootstrapper.modules().len());
    }

    // 程序集列表使用同一个缓存键，第二次得到第一次的结果
    assert_eq!(modules, vec![3, 3]);
    assert!(cache.contains(&DiscoveryKey::new(LEGACY_ASSEMBLIES_KEY)));
}
