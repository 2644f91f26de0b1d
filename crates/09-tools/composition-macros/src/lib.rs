//! # Composition Macros
//!
//! 这个 crate 提供 `#[discoverable]` 过程宏，在程序启动时把类型登记到
//! 进程级程序集注册表中，使其能够被模块发现找到。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use infrastructure_composition::{discoverable, DynRegistrator, RegistratorModule};
//! use infrastructure_common::DependencyResult;
//!
//! #[discoverable(registrator)]
//! #[derive(Default)]
//! pub struct CoreModule;
//!
//! impl RegistratorModule for CoreModule {
//!     fn register_module(&self, registrator: &DynRegistrator) -> DependencyResult<()> {
//!         Ok(())
//!     }
//! }
//! ```
//!
//! 生成的代码使用 `ctor` 在启动时执行，调用方需要依赖 `ctor`。

use proc_macro::TokenStream;

mod discoverable;

/// 组合模块登记宏
///
/// 把结构体登记到当前 crate 对应的程序集中，程序集名称取自 `CARGO_PKG_NAME`。
///
/// # 参数
///
/// - `registrator` - 实现 `RegistratorModule`
/// - `plain` - 实现 `PlainModule`
/// - `hierarchical` - 实现 `HierarchicalModule`
/// - `bootstrapper` - 实现 `BootstrapperModule`
/// - `container(Type)` - 实现 `ContainerModule<Type>`
/// - `implements(Trait, ...)` - 声明实现的契约，用于集合登记
/// - `constructor = path` - 构造函数，缺省时模块使用 `Default`
///
/// # 示例
///
/// ```rust,ignore
/// #[discoverable(registrator, bootstrapper, constructor = ReportingModule::create)]
/// pub struct ReportingModule {
///     // 字段
/// }
/// ```
#[proc_macro_attribute]
pub fn discoverable(args: TokenStream, input: TokenStream) -> TokenStream {
    discoverable::discoverable_impl(args, input)
}
