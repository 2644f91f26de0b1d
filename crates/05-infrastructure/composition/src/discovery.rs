//! 模块发现
//!
//! 从程序集来源中找出组合模块：具体类型且至少声明一个模块契约。
//! 判断只依据类型目录中的结构信息，与名称无关。
//!
//! 顺序为程序集枚举顺序，其次是类型声明顺序；同一类型出现在多个程序集中时
//! 每次出现都会产生描述符。单个程序集检查失败不会中止扫描。

use crate::cache::DiscoveryKey;
use crate::catalog::{Assembly, AssemblyRegistry};
use crate::module::ModuleDescriptor;
use chrono::{DateTime, Utc};
use infrastructure_common::DiscoveryError;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 程序集来源
#[derive(Debug, Clone)]
pub enum AssemblySource {
    /// 目录及文件名前缀
    Path {
        /// 模块目录，相对路径由平台路径提供者解析
        root: PathBuf,
        /// 文件名前缀
        prefixes: Vec<String>,
    },
    /// 显式的程序集列表
    Assemblies(Vec<Assembly>),
}

impl AssemblySource {
    /// 目录来源
    pub fn path<I, S>(root: impl Into<PathBuf>, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Path {
            root: root.into(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// 显式程序集来源
    pub fn assemblies(assemblies: impl IntoIterator<Item = Assembly>) -> Self {
        Self::Assemblies(assemblies.into_iter().collect())
    }
}

/// 平台路径提供者
///
/// 把模块目录解析为绝对路径。
pub trait PlatformPathProvider: Send + Sync {
    /// 解析路径
    fn resolve(&self, path: &Path) -> std::io::Result<PathBuf>;
}

/// 以当前工作目录为基准的路径提供者
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentDirPathProvider;

impl PlatformPathProvider for CurrentDirPathProvider {
    fn resolve(&self, path: &Path) -> std::io::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        absolute.canonicalize()
    }
}

/// 发现结果
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// 发现的模块，按顺序
    pub modules: Vec<ModuleDescriptor>,
    /// 发现过程中的错误，按顺序
    pub errors: Vec<DiscoveryError>,
    /// 发现时间
    pub discovered_at: DateTime<Utc>,
}

impl DiscoveryResult {
    /// 创建结果
    pub fn new(modules: Vec<ModuleDescriptor>, errors: Vec<DiscoveryError>) -> Self {
        Self {
            modules,
            errors,
            discovered_at: Utc::now(),
        }
    }

    /// 空结果
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// 由缓存的模块创建，不带错误
    pub fn cached(modules: &[ModuleDescriptor]) -> Self {
        Self::new(modules.to_vec(), Vec::new())
    }

    /// 是否没有错误
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for DiscoveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} 个模块, {} 个错误",
            self.modules.len(),
            self.errors.len()
        )
    }
}

/// 解析后的来源：缓存键、程序集以及解析阶段的错误
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// 缓存键
    pub key: DiscoveryKey,
    /// 程序集，按枚举顺序
    pub assemblies: Vec<Assembly>,
    /// 解析阶段的错误
    pub errors: Vec<DiscoveryError>,
}

/// 模块发现器
#[derive(Clone)]
pub struct ModuleDiscoverer {
    registry: Arc<AssemblyRegistry>,
    path_provider: Arc<dyn PlatformPathProvider>,
}

impl ModuleDiscoverer {
    /// 使用进程级程序集注册表
    pub fn new() -> Self {
        Self::with_registry(AssemblyRegistry::global())
    }

    /// 使用指定的程序集注册表
    pub fn with_registry(registry: Arc<AssemblyRegistry>) -> Self {
        Self {
            registry,
            path_provider: Arc::new(CurrentDirPathProvider),
        }
    }

    /// 替换平台路径提供者
    pub fn with_path_provider(mut self, provider: Arc<dyn PlatformPathProvider>) -> Self {
        self.path_provider = provider;
        self
    }

    /// 发现模块
    pub fn discover(&self, source: &AssemblySource) -> DiscoveryResult {
        let resolved = self.resolve(source);
        let mut result = self.inspect(&resolved.assemblies);
        let mut errors = resolved.errors;
        errors.append(&mut result.errors);
        result.errors = errors;
        result
    }

    /// 解析来源，得到缓存键和程序集列表
    pub fn resolve(&self, source: &AssemblySource) -> ResolvedSource {
        match source {
            AssemblySource::Assemblies(assemblies) => ResolvedSource {
                key: DiscoveryKey::legacy_assemblies(),
                assemblies: assemblies.clone(),
                errors: Vec::new(),
            },
            AssemblySource::Path { root, prefixes } => self.resolve_path(root, prefixes),
        }
    }

    fn resolve_path(&self, root: &Path, prefixes: &[String]) -> ResolvedSource {
        let resolved = match self.path_provider.resolve(root) {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!("模块目录不可用: {}, {}", root.display(), error);
                return ResolvedSource {
                    key: DiscoveryKey::for_path(root),
                    assemblies: Vec::new(),
                    errors: vec![DiscoveryError::PathUnavailable {
                        path: root.display().to_string(),
                        message: error.to_string(),
                    }],
                };
            }
        };

        debug!("扫描模块目录: {}, 前缀: {:?}", resolved.display(), prefixes);
        let (files, mut errors) = scan_directory(&resolved, prefixes);

        let mut assemblies = Vec::new();
        for file in files {
            let Some(stem) = file.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match self.registry.assembly(stem) {
                Some(assembly) => assemblies.push(assembly),
                None => errors.push(DiscoveryError::AssemblyNotFound {
                    path: file.display().to_string(),
                }),
            }
        }

        ResolvedSource {
            key: DiscoveryKey::for_path(&resolved),
            assemblies,
            errors,
        }
    }

    /// 检查程序集，收集组合模块
    pub fn inspect(&self, assemblies: &[Assembly]) -> DiscoveryResult {
        let mut modules = Vec::new();
        let mut errors = Vec::new();

        for assembly in assemblies {
            let types = match assembly.defined_types() {
                Ok(types) => types,
                Err(error) => {
                    warn!("程序集检查失败: {}", error);
                    errors.push(error);
                    continue;
                }
            };

            for entry in types.iter().filter(|entry| entry.is_composition_module()) {
                match ModuleDescriptor::from_entry(entry, Some(assembly)) {
                    Ok(descriptors) => {
                        debug!(
                            "发现模块: {} ({}), 能力 {} 个",
                            entry.type_info(),
                            assembly.name(),
                            descriptors.len()
                        );
                        modules.extend(descriptors);
                    }
                    Err(error) => {
                        warn!("模块实例化失败: {}", error);
                        errors.push(error);
                    }
                }
            }
        }

        let result = DiscoveryResult::new(modules, errors);
        info!("模块发现完成: {}", result);
        result
    }
}

impl Default for ModuleDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModuleDiscoverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDiscoverer")
            .field("assemblies", &self.registry.assembly_names())
            .finish()
    }
}

/// 列出目录中文件名以任一前缀开头的文件
///
/// 按前缀顺序，同一前缀内按文件名排序；同名（去掉扩展名后）的文件只保留第一个。
fn scan_directory(root: &Path, prefixes: &[String]) -> (Vec<PathBuf>, Vec<DiscoveryError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let base = glob::Pattern::escape(&root.to_string_lossy());

    let patterns: Vec<String> = if prefixes.is_empty() {
        vec![format!("{base}/*")]
    } else {
        prefixes
            .iter()
            .map(|prefix| format!("{base}/{}*", glob::Pattern::escape(prefix)))
            .collect()
    };

    for pattern in patterns {
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(error) => {
                errors.push(DiscoveryError::PathUnavailable {
                    path: pattern.clone(),
                    message: error.to_string(),
                });
                continue;
            }
        };
        for path in paths {
            match path {
                Ok(path) if path.is_file() => {
                    let stem = path.file_stem().map(|stem| stem.to_os_string());
                    if seen.insert(stem) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(error) => errors.push(DiscoveryError::PathUnavailable {
                    path: error.path().display().to_string(),
                    message: error.error().to_string(),
                }),
            }
        }
    }

    (files, errors)
}
