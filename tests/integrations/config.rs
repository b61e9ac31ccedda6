use alertlog::cli::Cli;
use alertlog::config::Config;
use alertlog::Level;
use clap::Parser;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(toml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let toml_content = r#"
        log_level = "debug"
        [logging]
        queue_capacity = 64
        [metrics]
        enabled = true
        namespace = "shop"
        subsystem = "billing"
        listen_address = "127.0.0.1:9100"
        [routing]
        warn = true
        critical = true
        fatal = true
        [telegram]
        token = "123:abc"
        chat_id = "-10042"
        thread_id = "7"
        queue_capacity = 32
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.logging.queue_capacity, 64);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.namespace, "shop");
        assert_eq!(config.metrics.subsystem, "billing");
        assert_eq!(
            config.metrics.listen_address,
            Some("127.0.0.1:9100".parse().unwrap())
        );
        assert!(config.routing.alerts_enabled);
        assert!(!config.routing.info);
        assert!(config.routing.warn);
        assert!(config.routing.critical);
        assert!(!config.routing.panic);
        assert!(config.routing.fatal);

        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.token, "123:abc");
        assert_eq!(telegram.chat_id, "-10042");
        assert_eq!(telegram.thread_id, "7");
        assert_eq!(telegram.queue_capacity, 32);
        assert_eq!(telegram.api_base_url, "https://api.telegram.org");
    });
}

#[test]
#[serial]
fn test_defaults_without_a_file() {
    let config = Config::load(None).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.logging.queue_capacity, 1024);
    assert!(config.telegram.is_none());
}

#[test]
#[serial]
fn test_telegram_requires_credentials() {
    let toml_content = r#"
        [telegram]
        token = "123:abc"
    "#;

    with_config_file(toml_content, |path| {
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("chat_id"), "{err}");
    });
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let toml_content = r#"
        [logging]
        queue_capacity = 64
    "#;

    with_config_file(toml_content, |path| {
        std::env::set_var("ALERTLOG_LOGGING__QUEUE_CAPACITY", "16");
        let result = Config::load(Some(&path));
        std::env::remove_var("ALERTLOG_LOGGING__QUEUE_CAPACITY");

        assert_eq!(result.unwrap().logging.queue_capacity, 16);
    });
}

#[test]
#[serial]
fn test_cli_overrides_file_and_environment() {
    let toml_content = r#"
        [logging]
        queue_capacity = 64
        [routing]
        alerts_enabled = false
    "#;

    with_config_file(toml_content, |path| {
        std::env::set_var("ALERTLOG_LOGGING__QUEUE_CAPACITY", "16");
        let cli = Cli::try_parse_from([
            "alertlog",
            "--config",
            path.to_str().unwrap(),
            "--queue-capacity",
            "0",
            "--alert",
            "fatal",
            "shutting",
            "down",
        ])
        .unwrap();
        let result = Config::load_from_cli(&cli);
        std::env::remove_var("ALERTLOG_LOGGING__QUEUE_CAPACITY");

        let config = result.unwrap();
        assert_eq!(cli.level, Level::Fatal);
        assert_eq!(config.logging.queue_capacity, 0);
        assert!(config.routing.alerts_enabled);
        assert!(config.routing.fatal);
        assert!(!config.routing.critical);
    });
}

#[test]
#[serial]
fn test_invalid_value_is_reported() {
    let toml_content = r#"
        [logging]
        queue_capacity = "lots"
    "#;

    with_config_file(toml_content, |path| {
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("failed to load configuration"));
    });
}
