use civic_common::observability::LogFormat;
use civic_common::CivicError;
use civic_config::CivicConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_are_expanded_and_env_overrides_win() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
server:
  host: "127.0.0.1"
  port: 7000
llm:
  provider: gemini
  api_key: "${CIVIC_TEST_GEMINI_KEY}"
  model: "gemini-2.0-flash"
  max_output_tokens: 512
logging:
  format: json
  stderr: false
"#;
    let p = write_yaml(&tmp, "civicsense.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("CIVIC_TEST_GEMINI_KEY", Some("key-from-env")),
            ("CIVIC__SERVER__PORT", Some("9090")),
        ],
        || {
            let config = CivicConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load service config");

            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.llm.resolve_api_key().unwrap(), "key-from-env");
            assert_eq!(config.llm.max_output_tokens, Some(512));
            assert_eq!(config.logging.format, LogFormat::Json);
            assert!(!config.logging.stderr);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let absent = tmp.path().join("nope.yaml");

    let config = CivicConfigLoader::new()
        .with_optional_file(absent)
        .load()
        .expect("defaults load");

    assert_eq!(config.server.bind_addr(), "0.0.0.0:5000");
    assert_eq!(config.llm.timeout_secs, 60);
    assert_eq!(config.logging.filter, "info");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let absent = tmp.path().join("nope.yaml");

    let err = CivicConfigLoader::new().with_file(absent).load().unwrap_err();
    assert!(matches!(err, CivicError::Config(_)));
}

#[test]
#[serial]
fn mistyped_value_is_a_config_error() {
    let err = CivicConfigLoader::new()
        .with_yaml_str("server:\n  port: \"not-a-port\"\n")
        .load()
        .unwrap_err();

    assert!(matches!(err, CivicError::Config(_)));
    assert!(err.to_string().starts_with("Configuration error"));
}
