//! 引导配置集成测试

use infrastructure_common::ConfigError;
use infrastructure_composition::{AssemblySource, BootstrapSettings, BootstrapperBuilder};
use std::collections::HashMap;
use std::io::Write;

#[test]
fn test_settings_file_with_environment_override() {
    let directory = tempfile::tempdir().unwrap();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "modules_path = {:?}\nprefixes = [\"app\"]\n\n[logging]\nlevel = \"debug\"",
        directory.path().display().to_string()
    )
    .unwrap();

    let environment = HashMap::from([
        ("BOOTSTRAP_PREFIXES".to_string(), "app,plugin".to_string()),
        (
            "BOOTSTRAP_REUSE_COMPOSITION_INFORMATION".to_string(),
            "false".to_string(),
        ),
    ]);
    let settings =
        BootstrapSettings::load_with_environment(Some(file.path()), Some(environment)).unwrap();

    assert_eq!(settings.prefixes, vec!["app", "plugin"]);
    assert!(!settings.reuse_composition_information);
    assert_eq!(settings.logging.level, "debug");

    let bootstrapper = BootstrapperBuilder::new()
        .with_settings(&settings)
        .unwrap()
        .build()
        .unwrap();
    match bootstrapper.source() {
        Some(AssemblySource::Path { root, prefixes }) => {
            assert_eq!(root, directory.path());
            assert_eq!(prefixes, &vec!["app".to_string(), "plugin".to_string()]);
        }
        other => panic!("unexpected source: {:?}", other),
    }
}

#[test]
fn test_missing_settings_file() {
    let result = BootstrapSettings::load_with_environment(
        Some(std::path::Path::new("does-not-exist.toml")),
        Some(HashMap::new()),
    );

    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}
