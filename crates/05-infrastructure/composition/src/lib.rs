//! # 组合与引导层
//!
//! 这个 crate 负责把分散在各个程序集中的组合模块发现出来，并通过有序的
//! 注册中间件把它们登记到依赖注入容器中，得到完整装配的应用根。
//!
//! ## 主要功能
//!
//! - **类型目录**: 以显式登记代替反射，见 [`catalog`]
//! - **模块发现**: 按目录前缀或程序集列表发现组合模块，错误聚合返回
//! - **发现缓存**: 进程级共享，原子的插入
//! - **注册中间件**: 核心、组合模块、集合、解析器、引导器模块
//! - **引导器**: `Created -> Initializing -> Initialized | Faulted`
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{BootstrapperBuilder, BootstrapperExtensions};
//!
//! struct AppRoot;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut bootstrapper = BootstrapperBuilder::new()
//!         .with_modules_path("plugins", ["app"])
//!         .build()?;
//!
//!     bootstrapper
//!         .use_core_registration::<AppRoot>()
//!         .use_composition_modules()
//!         .use_bootstrapper_composition();
//!
//!     bootstrapper.initialize()?;
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod builder;
pub mod cache;
pub mod capabilities;
pub mod catalog;
pub mod discovery;
pub mod extensions;
pub mod logging;
pub mod middleware;
pub mod module;
pub mod settings;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use bootstrapper::{
    Bootstrapper, BootstrapperOptions, BootstrapperState, InitializationCompleted,
};
pub use builder::BootstrapperBuilder;
pub use cache::{DiscoveryCache, DiscoveryKey, LEGACY_ASSEMBLIES_KEY};
pub use capabilities::{
    BootstrapperWithRegistrator, CompositionModulesProvider, DynRegistrator, Extensible,
    HasAssemblySource, HasContainer, HasRegistrator,
};
pub use catalog::{
    register_type, Assembly, AssemblyRegistry, ModuleCapability, TypeEntry, TypeEntryBuilder,
    TypeKind,
};
pub use discovery::{
    AssemblySource, CurrentDirPathProvider, DiscoveryResult, ModuleDiscoverer,
    PlatformPathProvider, ResolvedSource,
};
pub use extensions::BootstrapperExtensions;
pub use logging::LoggingConfig;
pub use middleware::{Middleware, MiddlewareApplier};
pub use module::{
    BootstrapperModule, ContainerModule, HierarchicalModule, ModuleCategory, ModuleContract,
    ModuleDescriptor, PlainModule, RegistratorModule,
};
pub use settings::{BootstrapSettings, LoggingSettings};

// 重新导出组合模块宏
pub use composition_macros::discoverable;
