// Configuration file unit tests

use std::io::Write;

use hayabusa::cache::KeyFormat;
use hayabusa::config::Config;
use hayabusa::logging::LogFormat;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
cache:
  max_size_bytes: 2097152
  key_format: concat
  pass:
    - "nocache=1"
logging:
  level: "hayabusa=debug,info"
  format: compact
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.cache.max_size_bytes, 2_097_152);
    assert_eq!(config.cache.key_format, KeyFormat::Concat);
    assert_eq!(config.cache.pass, vec!["nocache=1".to_string()]);
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_error() {
    let err = Config::from_file("/nonexistent/hayabusa.yaml").unwrap_err();
    assert!(err.contains("Failed to read config file"));
}

#[test]
fn test_invalid_yaml_is_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "cache: [not, a, map]").unwrap();
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_entry_limit_above_capacity_fails_validation() {
    let config = Config::from_yaml_with_env(
        "cache:\n  max_size_bytes: 1024\n  max_entry_size_bytes: 4096\n",
    )
    .unwrap();
    assert!(config.validate().is_err());
}
