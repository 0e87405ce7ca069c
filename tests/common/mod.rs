// Shared test helpers
#![allow(dead_code)]

use tempfile::TempDir;
use uptime_monitor::models::{NewTick, Reachability, Tick};
use uptime_monitor::website_repo::WebsiteRepo;

pub const MIN: i64 = 60_000;

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/test.db"
max_pool_size = 2

[publishing]
dashboard_refresh_secs = 1

[checker]
enabled = false
"#;

pub fn tick(created_at: i64, status: &str, latency_ms: Option<f64>) -> Tick {
    Tick {
        id: format!("t{created_at}"),
        website_id: "w1".into(),
        created_at,
        status: status.parse().expect("valid status"),
        latency_ms,
    }
}

pub fn new_tick(website_id: &str, created_at: i64, status: Reachability, latency: f64) -> NewTick {
    NewTick {
        website_id: website_id.into(),
        created_at,
        status,
        latency_ms: Some(latency),
    }
}

/// Fresh initialized repo in a temp dir; keep the TempDir alive for the test's duration.
pub async fn temp_repo() -> (TempDir, WebsiteRepo) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uptime.db");
    let repo = WebsiteRepo::connect(path.to_str().unwrap(), 2)
        .await
        .unwrap();
    repo.init().await.unwrap();
    (dir, repo)
}
