use serde::Deserialize;

use crate::aggregation::{DEFAULT_MAX_WINDOWS, DEFAULT_WINDOW_SIZE_MINUTES, WindowSpec};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Ticks older than this are pruned by the maintenance worker.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *"). Uses local time.
    #[serde(default)]
    pub vacuum_schedule: Option<String>,
    /// Run VACUUM every N seconds when vacuum_schedule is not set.
    #[serde(default = "default_vacuum_interval_secs")]
    pub vacuum_interval_secs: u64,
}

fn default_retention_days() -> u32 {
    30
}

fn default_prune_interval_secs() -> u64 {
    3600
}

fn default_vacuum_interval_secs() -> u64 {
    86_400
}

/// Auth is a stub: every request acts as `default_user_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
}

fn default_user_id() -> String {
    "1".into()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_user_id: default_user_id(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_window_size_minutes")]
    pub window_size_minutes: u32,
    #[serde(default = "default_max_windows")]
    pub max_windows: usize,
    /// Timeline length after padding with empty slots.
    #[serde(default = "default_display_slots")]
    pub display_slots: usize,
}

fn default_window_size_minutes() -> u32 {
    DEFAULT_WINDOW_SIZE_MINUTES
}

fn default_max_windows() -> usize {
    DEFAULT_MAX_WINDOWS
}

fn default_display_slots() -> usize {
    DEFAULT_MAX_WINDOWS
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_size_minutes: default_window_size_minutes(),
            max_windows: default_max_windows(),
            display_slots: default_display_slots(),
        }
    }
}

impl DashboardConfig {
    pub fn window_spec(&self) -> anyhow::Result<WindowSpec> {
        WindowSpec::new(self.window_size_minutes, self.max_windows)
            .map_err(|e| anyhow::anyhow!("dashboard.{}", e))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// How often /ws/dashboard pushes a fresh dashboard.
    #[serde(default = "default_dashboard_refresh_secs")]
    pub dashboard_refresh_secs: u64,
}

fn default_dashboard_refresh_secs() -> u64 {
    60
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            dashboard_refresh_secs: default_dashboard_refresh_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_check_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Max probes in flight per round.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Tick writer flushes once this many ticks are buffered.
    #[serde(default = "default_flush_rate")]
    pub flush_rate: u64,
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_check_interval_secs() -> u64 {
    60
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_concurrency() -> usize {
    16
}

fn default_flush_rate() -> u64 {
    10
}

fn default_flush_interval_secs() -> u64 {
    5
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_check_interval_secs(),
            timeout_ms: default_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            flush_rate: default_flush_rate(),
            flush_interval_secs: default_flush_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (ws dashboard clients, ticks saved) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        anyhow::ensure!(
            self.database.prune_interval_secs > 0,
            "database.prune_interval_secs must be > 0, got {}",
            self.database.prune_interval_secs
        );
        anyhow::ensure!(
            self.database.vacuum_interval_secs > 0,
            "database.vacuum_interval_secs must be > 0, got {}",
            self.database.vacuum_interval_secs
        );
        if let Some(expr) = &self.database.vacuum_schedule {
            crate::maintenance_worker::parse_vacuum_schedule(expr)?;
        }
        anyhow::ensure!(
            !self.auth.default_user_id.is_empty(),
            "auth.default_user_id must be non-empty"
        );
        self.dashboard.window_spec()?;
        anyhow::ensure!(
            self.dashboard.display_slots > 0,
            "dashboard.display_slots must be > 0, got {}",
            self.dashboard.display_slots
        );
        anyhow::ensure!(
            self.publishing.dashboard_refresh_secs > 0,
            "publishing.dashboard_refresh_secs must be > 0, got {}",
            self.publishing.dashboard_refresh_secs
        );
        if self.checker.enabled {
            anyhow::ensure!(
                self.checker.interval_secs > 0,
                "checker.interval_secs must be > 0, got {}",
                self.checker.interval_secs
            );
            anyhow::ensure!(
                self.checker.timeout_ms > 0,
                "checker.timeout_ms must be > 0, got {}",
                self.checker.timeout_ms
            );
            anyhow::ensure!(
                self.checker.max_concurrency > 0,
                "checker.max_concurrency must be > 0, got {}",
                self.checker.max_concurrency
            );
            anyhow::ensure!(
                self.checker.flush_rate > 0,
                "checker.flush_rate must be > 0, got {}",
                self.checker.flush_rate
            );
            anyhow::ensure!(
                self.checker.flush_interval_secs > 0,
                "checker.flush_interval_secs must be > 0, got {}",
                self.checker.flush_interval_secs
            );
        }
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
