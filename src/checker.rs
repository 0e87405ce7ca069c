// Background health checker: probes every active website each round.
// Probing runs in the checker; persistence runs in a dedicated tick writer task (channel).

use crate::clock::now_ms;
use crate::models::{NewTick, Reachability, Website};
use crate::website_repo::WebsiteRepo;
use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, interval};

/// Channel capacity for the tick writer (backpressure if writer falls behind).
pub fn writer_channel_capacity(flush_rate: u64) -> usize {
    (flush_rate as usize * 2).max(32)
}

/// HTTP client wrapper that turns one GET into one tick.
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// 2xx/3xx → up with latency; other statuses → down with latency; no response → down, no latency.
    pub async fn probe(&self, website: &Website) -> NewTick {
        let created_at = now_ms();
        let started = Instant::now();
        let (status, latency_ms) = match self.client.get(&website.url).send().await {
            Ok(resp) => {
                let latency = started.elapsed().as_secs_f64() * 1000.0;
                let code = resp.status();
                let status = if code.is_success() || code.is_redirection() {
                    Reachability::Reachable
                } else {
                    tracing::debug!(website_id = %website.id, status = %code, "probe got error status");
                    Reachability::Unreachable
                };
                (status, Some(latency))
            }
            Err(e) => {
                tracing::debug!(website_id = %website.id, error = %e, "probe failed");
                (Reachability::Unreachable, None)
            }
        };
        NewTick {
            website_id: website.id.clone(),
            created_at,
            status,
            latency_ms,
        }
    }
}

/// Probes all active websites (at most `max_concurrency` in flight) and forwards the ticks.
/// Returns how many ticks were handed to the writer.
pub async fn run_one_round(
    repo: &WebsiteRepo,
    prober: &Prober,
    max_concurrency: usize,
    write_tx: &mpsc::Sender<NewTick>,
) -> anyhow::Result<usize> {
    let websites = repo.list_active_websites().await?;
    let ticks: Vec<NewTick> = futures_util::stream::iter(websites)
        .map(|w| async move { prober.probe(&w).await })
        .buffer_unordered(max_concurrency.max(1))
        .collect()
        .await;

    let mut sent = 0;
    for tick in ticks {
        if write_tx.send(tick).await.is_err() {
            anyhow::bail!("tick writer channel closed");
        }
        sent += 1;
    }
    Ok(sent)
}

/// Repos, channels, and shutdown for the checker.
pub struct CheckerDeps {
    pub repo: Arc<WebsiteRepo>,
    pub prober: Prober,
    pub write_tx: mpsc::Sender<NewTick>,
    pub ws_dashboard_connections: Arc<AtomicUsize>,
    pub ticks_saved_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Checker timing and logging config.
pub struct CheckerSettings {
    pub interval_secs: u64,
    pub max_concurrency: usize,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Writer config: batching for the dedicated tick writer task.
pub struct TickWriterConfig {
    pub flush_rate: u64,
    pub flush_interval_secs: u64,
}

/// Spawns the task that receives ticks from the checker and flushes them to the DB.
/// Flushes when buffer len >= flush_rate, or every flush_interval_secs, or when channel closes.
/// When the checker drops its sender, this task flushes remaining and exits.
pub fn spawn_tick_writer(
    mut write_rx: mpsc::Receiver<NewTick>,
    repo: Arc<WebsiteRepo>,
    config: TickWriterConfig,
    ticks_saved_total: Arc<AtomicU64>,
) -> tokio::task::JoinHandle<()> {
    let flush_interval = Duration::from_secs(config.flush_interval_secs);
    tokio::spawn(async move {
        let mut buffer: Vec<NewTick> = Vec::new();
        let mut flush_tick = interval(flush_interval);
        flush_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                result = write_rx.recv() => {
                    match result {
                        Some(tick) => {
                            buffer.push(tick);
                            if buffer.len() >= config.flush_rate as usize
                                && let Err(e) = flush_buffer(&repo, &mut buffer, &ticks_saved_total).await
                            {
                                tracing::warn!(error = %format!("{e:#}"), "tick writer: save_ticks failed");
                            }
                        }
                        None => break,
                    }
                }
                _ = flush_tick.tick() => {
                    if let Err(e) = flush_buffer(&repo, &mut buffer, &ticks_saved_total).await {
                        tracing::warn!(error = %format!("{e:#}"), "tick writer: save_ticks failed");
                    }
                }
            }
        }
        if let Err(e) = flush_buffer(&repo, &mut buffer, &ticks_saved_total).await {
            tracing::warn!(error = %format!("{e:#}"), "tick writer: final flush failed");
        }
        tracing::debug!("Tick writer shutting down");
    })
}

/// Writes the buffered ticks in one transaction. The buffer is emptied either way:
/// a batch that fails to save is logged and dropped so it can't block later ticks.
async fn flush_buffer(
    repo: &WebsiteRepo,
    buffer: &mut Vec<NewTick>,
    ticks_saved_total: &AtomicU64,
) -> anyhow::Result<()> {
    if buffer.is_empty() {
        return Ok(());
    }
    let batch = std::mem::take(buffer);
    let n = batch.len();
    if let Err(e) = repo.save_ticks(&batch).await {
        return Err(e.context(format!("dropped {n} ticks")));
    }
    ticks_saved_total.fetch_add(n as u64, std::sync::atomic::Ordering::Relaxed);
    tracing::debug!(operation = "save_ticks", ticks_count = n, "Ticks saved");
    Ok(())
}

pub fn spawn(deps: CheckerDeps, settings: CheckerSettings) -> tokio::task::JoinHandle<()> {
    let CheckerDeps {
        repo,
        prober,
        write_tx,
        ws_dashboard_connections,
        ticks_saved_total,
        mut shutdown_rx,
    } = deps;
    let CheckerSettings {
        interval_secs,
        max_concurrency,
        stats_log_interval_secs,
    } = settings;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut rounds_total: u64 = 0;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match run_one_round(&repo, &prober, max_concurrency, &write_tx).await {
                        Ok(n) => {
                            rounds_total += 1;
                            tracing::debug!(operation = "check_round", ticks = n, "check round complete");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, operation = "check_round", "check round failed");
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Checker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_dashboard_clients =
                            ws_dashboard_connections.load(std::sync::atomic::Ordering::Relaxed),
                        ticks_saved_total = ticks_saved_total.load(std::sync::atomic::Ordering::Relaxed),
                        check_rounds_total = rounds_total,
                        "app stats"
                    );
                }
            }
        }
    })
}
