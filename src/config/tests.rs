use super::settings::Settings;
use super::{load_config, load_config_from};
use crate::broker::BrokerConfig;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, toml: &str) -> String {
    let path = dir.path().join("default.toml");
    fs::write(&path, toml).expect("write config file");
    dir.path().join("default").to_string_lossy().into_owned()
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.broker.channel_capacity, 256);
    assert_eq!(settings.topic.separator, '-');
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.broker_config(), BrokerConfig::default());
    assert_eq!(settings.key_deriver().unwrap().separator(), '-');
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let dir = TempDir::new().expect("create tempdir");
    let missing = dir.path().join("absent").to_string_lossy().into_owned();

    let cfg = load_config_from(&missing).expect("load_config failed");
    assert_eq!(cfg, Settings::default());
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let dir = TempDir::new().expect("create tempdir");
    let path = write_config(
        &dir,
        r#"
            [broker]
            channel_capacity = 8

            [topic]
            separator = ":"

            [logging]
            level = "debug"
        "#,
    );

    let cfg = load_config_from(&path).expect("load_config failed");
    assert_eq!(cfg.broker.channel_capacity, 8);
    assert_eq!(cfg.topic.separator, ':');
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
#[serial]
fn partial_file_keeps_remaining_defaults() {
    let dir = TempDir::new().expect("create tempdir");
    let path = write_config(
        &dir,
        r#"
            [broker]
            channel_capacity = 0
        "#,
    );

    let cfg = load_config_from(&path).expect("load_config failed");
    assert_eq!(cfg.broker.channel_capacity, 0);
    assert_eq!(cfg.topic.separator, '-');
    assert_eq!(cfg.logging.level, "info");
}

#[test]
#[serial]
fn environment_overrides_file() {
    let dir = TempDir::new().expect("create tempdir");
    let path = write_config(
        &dir,
        r#"
            [broker]
            channel_capacity = 8
        "#,
    );

    temp_env::with_vars(
        [
            ("TOPICWIRE__BROKER__CHANNEL_CAPACITY", Some("64")),
            ("TOPICWIRE__LOGGING__LEVEL", Some("warn")),
        ],
        || {
            let cfg = load_config_from(&path).expect("load_config failed");
            assert_eq!(cfg.broker.channel_capacity, 64);
            assert_eq!(cfg.logging.level, "warn");
        },
    );
}

#[test]
#[serial]
fn load_config_reads_environment_without_file() {
    temp_env::with_var("TOPICWIRE__TOPIC__SEPARATOR", Some("/"), || {
        let cfg = load_config().expect("load_config failed");
        assert_eq!(cfg.topic.separator, '/');
    });
}

#[test]
#[serial]
fn invalid_separator_is_rejected() {
    let dir = TempDir::new().expect("create tempdir");

    let multi = write_config(&dir, "[topic]\nseparator = \"::\"\n");
    assert!(load_config_from(&multi).is_err());

    let alnum = write_config(&dir, "[topic]\nseparator = \"x\"\n");
    assert!(load_config_from(&alnum).is_err());
}
