// Table and index creation. Idempotent; runs at every startup.

use sqlx::SqlitePool;

/// Creates the website and website_tick tables and their indexes if not present.
pub(super) async fn init_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS website (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            user_id TEXT NOT NULL,
            disabled INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_website_user ON website(user_id, disabled)")
        .execute(pool)
        .await?;

    // status is free text so rows written by older checkers ("operational", "error") still load
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS website_tick (
            id TEXT PRIMARY KEY,
            website_id TEXT NOT NULL REFERENCES website(id),
            created_at INTEGER NOT NULL,
            status TEXT NOT NULL,
            latency_ms REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tick_website_created_at ON website_tick(website_id, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tick_created_at ON website_tick(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
