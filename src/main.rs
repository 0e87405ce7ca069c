use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use uptime_monitor::*;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let repo = Arc::new(
        website_repo::WebsiteRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
        )
        .await?,
    );
    repo.init().await?;

    let ws_dashboard_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let checker_handles = if app_config.checker.enabled {
        let ticks_saved_total = Arc::new(AtomicU64::new(0));
        let (write_tx, write_rx) = mpsc::channel(checker::writer_channel_capacity(
            app_config.checker.flush_rate,
        ));
        let writer_handle = checker::spawn_tick_writer(
            write_rx,
            repo.clone(),
            checker::TickWriterConfig {
                flush_rate: app_config.checker.flush_rate,
                flush_interval_secs: app_config.checker.flush_interval_secs,
            },
            ticks_saved_total.clone(),
        );
        let checker_handle = checker::spawn(
            checker::CheckerDeps {
                repo: repo.clone(),
                prober: checker::Prober::new(Duration::from_millis(
                    app_config.checker.timeout_ms,
                ))?,
                write_tx,
                ws_dashboard_connections: ws_dashboard_connections.clone(),
                ticks_saved_total,
                shutdown_rx,
            },
            checker::CheckerSettings {
                interval_secs: app_config.checker.interval_secs,
                max_concurrency: app_config.checker.max_concurrency,
                stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
            },
        );
        Some((checker_handle, writer_handle))
    } else {
        tracing::info!("health checker disabled");
        None
    };

    maintenance_worker::spawn(
        repo.clone(),
        maintenance_worker::MaintenanceConfig::from_config(&app_config.database),
    );

    let app = routes::app(repo, ws_dashboard_connections, app_config.clone())?;
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    if let Some((checker_handle, writer_handle)) = checker_handles {
        // checker drops its sender on exit, which lets the writer flush and stop
        let _ = checker_handle.await;
        let _ = writer_handle.await;
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
