// Background maintenance: prune ticks older than retention_days every prune_interval_secs.
// VACUUM runs on a configurable schedule (cron expression or fixed interval).

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::now_ms;
use crate::website_repo::WebsiteRepo;
use tracing::{info, instrument, warn};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Config for the maintenance worker.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub prune_interval_secs: u64,
    pub retention_days: u32,
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *" = 03:00 daily). Uses local time.
    pub vacuum_schedule: Option<String>,
    /// Run VACUUM every N seconds when vacuum_schedule is not set.
    pub vacuum_interval_secs: u64,
}

impl MaintenanceConfig {
    pub fn from_config(db: &crate::config::DatabaseConfig) -> Self {
        Self {
            prune_interval_secs: db.prune_interval_secs,
            retention_days: db.retention_days,
            vacuum_schedule: db.vacuum_schedule.clone(),
            vacuum_interval_secs: db.vacuum_interval_secs,
        }
    }
}

/// Spawns the maintenance worker. Returns a join handle.
pub fn spawn(repo: Arc<WebsiteRepo>, config: MaintenanceConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(repo, config).await;
    })
}

#[instrument(skip(repo), fields(interval_secs = config.prune_interval_secs))]
async fn run(repo: Arc<WebsiteRepo>, config: MaintenanceConfig) {
    let mut prune_interval = tokio::time::interval(Duration::from_secs(config.prune_interval_secs));
    prune_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let (vacuum_tx, mut vacuum_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(vacuum_scheduler(config.clone(), vacuum_tx));

    loop {
        tokio::select! {
            _ = prune_interval.tick() => {
                if let Err(e) = run_one_pass(&repo, &config, now_ms()).await {
                    warn!(error = %e, "tick pruning failed");
                }
            }
            _ = vacuum_rx.recv() => {
                if let Err(e) = repo.vacuum().await {
                    warn!(error = %e, "vacuum failed");
                } else {
                    info!("vacuum complete");
                }
            }
        }
    }
}

/// Parses a `vacuum_schedule` cron expression (seconds field first, e.g. "0 0 3 * * *").
pub fn parse_vacuum_schedule(expr: &str) -> anyhow::Result<cron::Schedule> {
    cron::Schedule::from_str(expr)
        .map_err(|e| anyhow::anyhow!("database.vacuum_schedule invalid ({expr:?}): {e}"))
}

/// Sends a message on `tx` at each VACUUM time (cron or fixed interval). Uses local time for cron.
async fn vacuum_scheduler(config: MaintenanceConfig, tx: tokio::sync::mpsc::Sender<()>) {
    if let Some(ref cron_str) = config.vacuum_schedule {
        // config validation rejects bad expressions; this only guards direct callers
        let schedule = match parse_vacuum_schedule(cron_str) {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(error = %e, "VACUUM will not run");
                return;
            }
        };
        loop {
            let now = chrono::Local::now();
            let next = schedule.after(&now).next();
            if let Some(next) = next {
                let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(delay).await;
                if tx.send(()).await.is_err() {
                    break;
                }
            } else {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    } else {
        let interval = Duration::from_secs(config.vacuum_interval_secs);
        loop {
            tokio::time::sleep(interval).await;
            if tx.send(()).await.is_err() {
                break;
            }
        }
    }
}

/// Deletes ticks older than `retention_days` relative to `now_ms`. Returns rows removed.
pub async fn run_one_pass(
    repo: &WebsiteRepo,
    config: &MaintenanceConfig,
    now_ms: i64,
) -> anyhow::Result<u64> {
    let cutoff = now_ms - (config.retention_days as i64) * MS_PER_DAY;
    let pruned = repo.prune_ticks_before(cutoff).await?;
    if pruned > 0 {
        info!(pruned_ticks = pruned, "pruned ticks past retention");
    }
    Ok(pruned)
}
