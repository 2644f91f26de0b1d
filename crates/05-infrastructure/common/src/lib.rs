//! # Infrastructure Common
//!
//! 这个 crate 提供了组合引擎各层共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`TypeInfo`] - 基于 `TypeId` 的类型标识
//! - [`Lifetime`] - 注册生命周期
//! - [`DependencyError`] / [`DiscoveryError`] / [`BootstrapError`] - 两条互不混用的错误通道
//!
//! ## 设计原则
//!
//! - 类型标识只依赖 Rust 类型系统，不依赖名称约定
//! - 发现错误可聚合、可恢复；注册错误立即中止

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
