//! # 示例应用程序
//!
//! 演示如何使用 Lorn ADSP 组合引擎发现模块并装配应用根

use anyhow::Context;
use clap::Parser;
use di_abstractions::{DependencyRegistratorExt, DependencyResolverExt, RegistrationEntry};
use di_impl::DiContainerImpl;
use infrastructure_common::{DependencyResult, TypeInfo};
use infrastructure_composition::{
    discoverable, Assembly, AssemblyRegistry, BootstrapSettings, Bootstrapper, BootstrapperBuilder,
    BootstrapperExtensions, BootstrapperModule, BootstrapperWithRegistrator, DynRegistrator,
    HasContainer, PlainModule, RegistratorModule,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn ADSP 组合引擎示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 模块目录，未指定时使用本程序内登记的模块
    #[arg(long)]
    modules_path: Option<PathBuf>,

    /// 模块文件名前缀
    #[arg(long, value_delimiter = ',')]
    prefixes: Vec<String>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 应用根
pub struct Application;

/// 问候服务
pub trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

#[discoverable(implements(dyn Greeter))]
pub struct ConsoleGreeter;

impl Greeter for ConsoleGreeter {
    fn greet(&self, name: &str) -> String {
        format!("你好, {}", name)
    }
}

#[discoverable(implements(dyn Greeter))]
pub struct FormalGreeter;

impl Greeter for FormalGreeter {
    fn greet(&self, name: &str) -> String {
        format!("尊敬的 {}, 您好", name)
    }
}

/// 登记默认问候服务
#[discoverable(registrator, bootstrapper)]
#[derive(Default)]
pub struct GreetingModule;

impl RegistratorModule for GreetingModule {
    fn register_module(&self, registrator: &DynRegistrator) -> DependencyResult<()> {
        registrator.register_instance_as::<dyn Greeter>(Arc::new(ConsoleGreeter))
    }
}

impl BootstrapperModule for GreetingModule {
    fn register_module(&self, bootstrapper: &dyn BootstrapperWithRegistrator) -> DependencyResult<()> {
        info!("问候模块看到 {} 个模块", bootstrapper.modules().len());
        Ok(())
    }
}

/// 声明式登记
#[discoverable(plain)]
#[derive(Default)]
pub struct FormalGreetingModule;

impl PlainModule for FormalGreetingModule {
    fn registrations(&self) -> Vec<RegistrationEntry> {
        vec![RegistrationEntry::transient(
            TypeInfo::of::<FormalGreeter>(),
            TypeInfo::of::<FormalGreeter>(),
        )]
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(args.log_level.as_str())
        .init();

    info!("启动 Lorn ADSP 组合引擎示例应用");

    let settings = load_settings(&args)?;
    let mut bootstrapper = build_bootstrapper(&settings)?;

    bootstrapper
        .use_core_registration::<Application>()
        .use_composition_modules()
        .use_collection_registration_of::<dyn Greeter>()
        .use_bootstrapper_composition()
        .on_initialized(|completed| {
            info!(
                "初始化完成: 模块 {} 个, 发现错误 {} 个",
                completed.modules, completed.discovery_errors
            );
        })
        .on_exited(|| info!("应用已关闭"));

    bootstrapper.initialize().context("引导器初始化失败")?;

    demonstrate_resolution(&bootstrapper)?;

    info!("正在关闭应用");
    bootstrapper.notify_exited();
    bootstrapper.container().clear();
    Ok(())
}

/// 加载引导配置，命令行参数优先
fn load_settings(args: &Args) -> anyhow::Result<BootstrapSettings> {
    let mut settings = BootstrapSettings::load(args.config.as_deref())
        .with_context(|| format!("无法加载配置: {:?}", args.config))?;

    if let Some(path) = &args.modules_path {
        settings.modules_path = Some(path.clone());
    }
    if !args.prefixes.is_empty() {
        settings.prefixes = args.prefixes.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// 构建引导器
fn build_bootstrapper(settings: &BootstrapSettings) -> anyhow::Result<Bootstrapper<DiContainerImpl>> {
    let mut builder = BootstrapperBuilder::new().with_settings(settings)?;

    if settings.modules_path.is_none() {
        info!("未指定模块目录，使用本程序登记的模块");
        let assembly = AssemblyRegistry::global()
            .assembly(env!("CARGO_PKG_NAME"))
            .unwrap_or_else(|| Assembly::new(env!("CARGO_PKG_NAME"), Vec::new()));
        builder = builder.with_assemblies([assembly]);
    }

    let mut bootstrapper = builder.build()?;
    for error in bootstrapper.discover() {
        warn!("模块发现错误: {}", error);
    }
    Ok(bootstrapper)
}

/// 演示解析登记结果
fn demonstrate_resolution(bootstrapper: &Bootstrapper<DiContainerImpl>) -> anyhow::Result<()> {
    info!("演示解析功能");

    let container = bootstrapper.container();
    let greeter = container.resolve_instance::<dyn Greeter>()?;
    info!("{}", greeter.greet("Lorn"));

    for entry in container.registrations() {
        info!("登记: {}", entry);
    }
    Ok(())
}
