//! 注册生命周期

use std::fmt;

/// 注册生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// 瞬时模式 - 每次解析都创建新实例
    #[default]
    Transient,
    /// 单例模式 - 整个应用生命周期内只创建一个实例
    Singleton,
    /// 实例模式 - 直接使用注册时提供的实例
    Instance,
    /// 集合模式 - 一个契约对应一组实现
    Collection,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transient => "transient",
            Self::Singleton => "singleton",
            Self::Instance => "instance",
            Self::Collection => "collection",
        };
        f.write_str(name)
    }
}
