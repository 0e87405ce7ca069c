// SQLite store for monitored websites and their ticks.
// Websites are soft-deleted (disabled = 1); every read filters them out.

mod schema;

use crate::clock::now_ms;
use crate::models::{NewTick, Reachability, Tick, Website, WebsiteWithTicks};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

pub struct WebsiteRepo {
    pool: SqlitePool,
}

impl WebsiteRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        schema::init_tables(&self.pool).await
    }

    #[instrument(skip(self, url), fields(repo = "website", operation = "create_website"))]
    pub async fn create_website(&self, user_id: &str, url: &str) -> anyhow::Result<String> {
        let id = sqlx::query_scalar::<_, String>(
            "INSERT INTO website (id, url, user_id, disabled, created_at)
             VALUES (lower(hex(randomblob(16))), $1, $2, 0, $3)
             RETURNING id",
        )
        .bind(url)
        .bind(user_id)
        .bind(now_ms())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Active website owned by `user_id`, with all ticks ascending by time.
    #[instrument(skip(self), fields(repo = "website", operation = "get_website_with_ticks"))]
    pub async fn get_website_with_ticks(
        &self,
        website_id: &str,
        user_id: &str,
    ) -> anyhow::Result<Option<WebsiteWithTicks>> {
        let row = sqlx::query(
            "SELECT id, url, user_id, disabled, created_at FROM website
             WHERE id = $1 AND user_id = $2 AND disabled = 0",
        )
        .bind(website_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let website = parse_website_row(&row)?;

        let rows = sqlx::query(
            "SELECT id, website_id, created_at, status, latency_ms FROM website_tick
             WHERE website_id = $1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(website_id)
        .fetch_all(&self.pool)
        .await?;
        let mut ticks = Vec::with_capacity(rows.len());
        for row in rows {
            ticks.push(parse_tick_row(&row)?);
        }
        Ok(Some(WebsiteWithTicks::new(website, ticks)))
    }

    #[instrument(skip(self), fields(repo = "website", operation = "list_websites"))]
    pub async fn list_websites(&self, user_id: &str) -> anyhow::Result<Vec<Website>> {
        let rows = sqlx::query(
            "SELECT id, url, user_id, disabled, created_at FROM website
             WHERE user_id = $1 AND disabled = 0 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_website_row).collect()
    }

    /// Every active website of `user_id` with its ticks; two queries regardless of website count.
    #[instrument(skip(self), fields(repo = "website", operation = "list_websites_with_ticks"))]
    pub async fn list_websites_with_ticks(
        &self,
        user_id: &str,
    ) -> anyhow::Result<Vec<WebsiteWithTicks>> {
        let websites = self.list_websites(user_id).await?;
        if websites.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT t.id, t.website_id, t.created_at, t.status, t.latency_ms
             FROM website_tick t JOIN website w ON w.id = t.website_id
             WHERE w.user_id = $1 AND w.disabled = 0
             ORDER BY t.created_at ASC, t.rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_website: HashMap<String, Vec<Tick>> = HashMap::new();
        for row in rows {
            let tick = parse_tick_row(&row)?;
            by_website
                .entry(tick.website_id.clone())
                .or_default()
                .push(tick);
        }

        Ok(websites
            .into_iter()
            .map(|w| {
                let ticks = by_website.remove(&w.id).unwrap_or_default();
                WebsiteWithTicks::new(w, ticks)
            })
            .collect())
    }

    /// Soft delete. Returns false when no active website with this id belongs to `user_id`.
    #[instrument(skip(self), fields(repo = "website", operation = "disable_website"))]
    pub async fn disable_website(&self, website_id: &str, user_id: &str) -> anyhow::Result<bool> {
        let r = sqlx::query(
            "UPDATE website SET disabled = 1 WHERE id = $1 AND user_id = $2 AND disabled = 0",
        )
        .bind(website_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected() > 0)
    }

    /// Active websites across all users (health checker input).
    #[instrument(skip(self), fields(repo = "website", operation = "list_active_websites"))]
    pub async fn list_active_websites(&self) -> anyhow::Result<Vec<Website>> {
        let rows = sqlx::query(
            "SELECT id, url, user_id, disabled, created_at FROM website
             WHERE disabled = 0 ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_website_row).collect()
    }

    #[instrument(skip(self, ticks), fields(repo = "website", operation = "save_ticks", ticks_count = ticks.len()))]
    pub async fn save_ticks(&self, ticks: &[NewTick]) -> anyhow::Result<()> {
        if ticks.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for t in ticks {
            sqlx::query(
                "INSERT INTO website_tick (id, website_id, created_at, status, latency_ms)
                 VALUES (lower(hex(randomblob(16))), $1, $2, $3, $4)",
            )
            .bind(&t.website_id)
            .bind(t.created_at)
            .bind(t.status.as_str())
            .bind(t.latency_ms)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Delete ticks with created_at < cutoff_ms.
    #[instrument(skip(self), fields(repo = "website", operation = "prune_ticks_before"))]
    pub async fn prune_ticks_before(&self, cutoff_ms: i64) -> anyhow::Result<u64> {
        let r = sqlx::query("DELETE FROM website_tick WHERE created_at < $1")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    /// Reclaim space after deletes (run periodically after pruning).
    #[instrument(skip(self), fields(repo = "website", operation = "vacuum"))]
    pub async fn vacuum(&self) -> anyhow::Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }
}

fn parse_website_row(row: &SqliteRow) -> anyhow::Result<Website> {
    Ok(Website {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        user_id: row.try_get("user_id")?,
        disabled: row.try_get("disabled")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Status text goes through the alias parser; an unrecognized value is an error, not a guess.
fn parse_tick_row(row: &SqliteRow) -> anyhow::Result<Tick> {
    let status: String = row.try_get("status")?;
    Ok(Tick {
        id: row.try_get("id")?,
        website_id: row.try_get("website_id")?,
        created_at: row.try_get("created_at")?,
        status: status.parse::<Reachability>()?,
        latency_ms: row.try_get("latency_ms")?,
    })
}
