//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组合引擎所依赖的容器能力。
//!
//! ## 核心接口
//!
//! - [`DependencyRegistrator`] - 注册能力（基于类型标识，可作为 trait 对象使用）
//! - [`DependencyRegistratorExt`] - 泛型注册辅助方法
//! - [`DependencyResolver`] - 解析能力
//! - [`IocContainer`] - 注册与解析能力的组合
//! - [`RegistrationEntry`] - 容器内的一条注册记录
//!
//! 容器的解析算法不在本层的范围内，组合引擎只通过注册能力追加记录。

pub mod container;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use registry::*;
pub use resolver::*;
