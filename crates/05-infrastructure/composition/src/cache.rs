//! 发现结果缓存
//!
//! 进程级共享，按发现键保存模块列表。条目在首次发现时创建，
//! 之后只读，不会被修改或淘汰。发现错误不进入缓存。

use crate::discovery::DiscoveryResult;
use crate::module::ModuleDescriptor;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 显式程序集列表使用的固定键
///
/// 不同的程序集列表会共享同一个缓存条目。
pub const LEGACY_ASSEMBLIES_KEY: &str = "key";

/// 发现键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscoveryKey(String);

impl DiscoveryKey {
    /// 创建键
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// 路径来源的键，使用解析后的绝对路径
    pub fn for_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    /// 显式程序集列表的键
    pub fn legacy_assemblies() -> Self {
        Self(LEGACY_ASSEMBLIES_KEY.to_string())
    }

    /// 键的字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiscoveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static GLOBAL_DISCOVERY_CACHE: Lazy<Arc<DiscoveryCache>> =
    Lazy::new(|| Arc::new(DiscoveryCache::new()));

/// 发现结果缓存
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    entries: DashMap<DiscoveryKey, Arc<[ModuleDescriptor]>>,
}

impl DiscoveryCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级缓存
    pub fn global() -> Arc<DiscoveryCache> {
        Arc::clone(&GLOBAL_DISCOVERY_CACHE)
    }

    /// 获取或创建发现结果
    ///
    /// - `reuse` 为 `false` 时总是调用 `factory`，不读也不写缓存
    /// - 命中时返回缓存的模块，错误列表为空
    /// - 未命中时调用 `factory`，只缓存模块，返回完整结果
    ///
    /// `factory` 在锁外执行；并发未命中时各自计算，先写入者生效。
    pub fn get_or_create<F>(&self, key: &DiscoveryKey, reuse: bool, factory: F) -> DiscoveryResult
    where
        F: FnOnce() -> DiscoveryResult,
    {
        if !reuse {
            debug!(key = %key, "不复用组合信息, 重新发现");
            return factory();
        }

        if let Some(modules) = self.get(key) {
            debug!(key = %key, modules = modules.len(), "命中发现缓存");
            return DiscoveryResult::cached(&modules);
        }

        let result = factory();
        match self.entries.entry(key.clone()) {
            Entry::Occupied(_) => {
                debug!(key = %key, "发现缓存已被并发写入, 保留已有条目");
            }
            Entry::Vacant(vacant) => {
                info!(key = %key, modules = result.modules.len(), "写入发现缓存");
                vacant.insert(Arc::from(result.modules.as_slice()));
            }
        }
        result
    }

    /// 读取缓存的模块
    pub fn get(&self, key: &DiscoveryKey) -> Option<Arc<[ModuleDescriptor]>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// 是否存在指定键
    pub fn contains(&self, key: &DiscoveryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
