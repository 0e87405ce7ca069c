// Config loading and validation tests

use uptime_monitor::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/uptime.db"
max_pool_size = 10
retention_days = 7
prune_interval_secs = 600
vacuum_interval_secs = 3600

[auth]
default_user_id = "42"

[dashboard]
window_size_minutes = 5
max_windows = 12
display_slots = 12

[publishing]
dashboard_refresh_secs = 30

[checker]
enabled = true
interval_secs = 45
timeout_ms = 5000
max_concurrency = 8
flush_rate = 20
flush_interval_secs = 2

[monitoring]
stats_log_interval_secs = 60
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 3000
host = "127.0.0.1"

[database]
path = "data/uptime.db"
max_pool_size = 4
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.database.path, "data/uptime.db");
    assert_eq!(config.database.retention_days, 7);
    assert_eq!(config.auth.default_user_id, "42");
    assert_eq!(config.dashboard.window_size_minutes, 5);
    assert_eq!(config.dashboard.max_windows, 12);
    assert_eq!(config.publishing.dashboard_refresh_secs, 30);
    assert_eq!(config.checker.max_concurrency, 8);
    assert_eq!(config.monitoring.stats_log_interval_secs, 60);
}

#[test]
fn test_config_defaults_when_sections_omitted() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("minimal");
    assert_eq!(config.database.retention_days, 30);
    assert_eq!(config.database.prune_interval_secs, 3600);
    assert!(config.database.vacuum_schedule.is_none());
    assert_eq!(config.auth.default_user_id, "1");
    assert_eq!(config.dashboard.window_size_minutes, 3);
    assert_eq!(config.dashboard.max_windows, 10);
    assert_eq!(config.dashboard.display_slots, 10);
    assert!(config.checker.enabled);
    assert_eq!(config.checker.interval_secs, 60);
    assert_eq!(config.checker.timeout_ms, 10_000);
    assert_eq!(config.publishing.dashboard_refresh_secs, 60);
}

#[test]
fn test_config_window_spec_matches_dashboard_section() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    let spec = config.dashboard.window_spec().unwrap();
    assert_eq!(spec.window_size_minutes(), 5);
    assert_eq!(spec.max_windows(), 12);
    assert_eq!(spec.window_size_ms(), 300_000);
}

fn assert_rejected(from: &str, to: &str, field: &str) {
    let bad = VALID_CONFIG.replace(from, to);
    assert_ne!(bad, VALID_CONFIG, "replacement {from:?} did not apply");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(
        err.to_string().contains(field),
        "expected error mentioning {field}, got {err}"
    );
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    assert_rejected("port = 8081", "port = 0", "server.port");
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    assert_rejected("path = \"data/uptime.db\"", "path = \"\"", "database.path");
}

#[test]
fn test_config_validation_rejects_max_pool_size_zero() {
    assert_rejected("max_pool_size = 10", "max_pool_size = 0", "max_pool_size");
}

#[test]
fn test_config_validation_rejects_retention_days_zero() {
    assert_rejected("retention_days = 7", "retention_days = 0", "retention_days");
}

#[test]
fn test_config_validation_rejects_empty_default_user() {
    assert_rejected(
        "default_user_id = \"42\"",
        "default_user_id = \"\"",
        "auth.default_user_id",
    );
}

#[test]
fn test_config_validation_rejects_window_size_zero() {
    assert_rejected(
        "window_size_minutes = 5",
        "window_size_minutes = 0",
        "dashboard.window_size_minutes",
    );
}

#[test]
fn test_config_validation_rejects_max_windows_zero() {
    assert_rejected("max_windows = 12", "max_windows = 0", "dashboard.max_windows");
}

#[test]
fn test_config_validation_rejects_display_slots_zero() {
    assert_rejected("display_slots = 12", "display_slots = 0", "display_slots");
}

#[test]
fn test_config_validation_rejects_refresh_zero() {
    assert_rejected(
        "dashboard_refresh_secs = 30",
        "dashboard_refresh_secs = 0",
        "dashboard_refresh_secs",
    );
}

#[test]
fn test_config_validation_rejects_checker_interval_zero_when_enabled() {
    assert_rejected("interval_secs = 45", "interval_secs = 0", "checker.interval_secs");
}

#[test]
fn test_config_validation_rejects_flush_rate_zero_when_enabled() {
    assert_rejected("flush_rate = 20", "flush_rate = 0", "flush_rate");
}

#[test]
fn test_config_checker_limits_ignored_when_disabled() {
    let cfg = VALID_CONFIG
        .replace("enabled = true", "enabled = false")
        .replace("timeout_ms = 5000", "timeout_ms = 0");
    let config = AppConfig::load_from_str(&cfg).expect("disabled checker skips its checks");
    assert!(!config.checker.enabled);
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.database.path, "data/uptime.db");
}

#[test]
fn test_config_validation_rejects_invalid_vacuum_schedule() {
    assert_rejected(
        "vacuum_interval_secs = 3600",
        "vacuum_interval_secs = 3600\nvacuum_schedule = \"not a cron\"",
        "database.vacuum_schedule",
    );
}

#[test]
fn test_config_accepts_cron_vacuum_schedule() {
    let with_cron = VALID_CONFIG.replace(
        "vacuum_interval_secs = 3600",
        "vacuum_interval_secs = 3600\nvacuum_schedule = \"0 0 3 * * *\"",
    );
    let config = AppConfig::load_from_str(&with_cron).unwrap();
    assert_eq!(
        config.database.vacuum_schedule.as_deref(),
        Some("0 0 3 * * *")
    );
}
