// WebsiteRepo tests: connect, init, CRUD with soft delete and ownership, tick batches, prune

mod common;

use common::{new_tick, temp_repo};
use sqlx::sqlite::SqlitePoolOptions;
use uptime_monitor::models::Reachability;
use uptime_monitor::website_repo::WebsiteRepo;

#[tokio::test]
async fn website_repo_connect_and_init() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("uptime.db");
    let repo = WebsiteRepo::connect(path.to_str().unwrap(), 2)
        .await
        .unwrap();
    repo.init().await.unwrap();
    // Second init is no-op (IF NOT EXISTS)
    repo.init().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn create_and_list_websites_per_user() {
    let (_dir, repo) = temp_repo().await;
    let a = repo.create_website("1", "https://a.example").await.unwrap();
    let b = repo.create_website("1", "https://b.example").await.unwrap();
    repo.create_website("2", "https://other.example")
        .await
        .unwrap();
    assert_ne!(a, b);

    let mine = repo.list_websites("1").await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, a);
    assert_eq!(mine[0].url, "https://a.example");
    assert_eq!(mine[1].id, b);
    assert!(mine.iter().all(|w| !w.disabled && w.user_id == "1"));

    let all = repo.list_active_websites().await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn get_website_with_ticks_orders_ticks_and_checks_owner() {
    let (_dir, repo) = temp_repo().await;
    let id = repo.create_website("1", "https://a.example").await.unwrap();
    repo.save_ticks(&[
        new_tick(&id, 3000, Reachability::Unreachable, 30.0),
        new_tick(&id, 1000, Reachability::Reachable, 10.0),
        new_tick(&id, 2000, Reachability::Reachable, 20.0),
    ])
    .await
    .unwrap();

    let w = repo.get_website_with_ticks(&id, "1").await.unwrap().unwrap();
    assert_eq!(w.url, "https://a.example");
    let times: Vec<i64> = w.ticks.iter().map(|t| t.created_at).collect();
    assert_eq!(times, vec![1000, 2000, 3000]);
    assert_eq!(w.ticks[2].status, Reachability::Unreachable);
    assert_eq!(w.ticks[0].latency_ms, Some(10.0));

    assert!(repo.get_website_with_ticks(&id, "2").await.unwrap().is_none());
    assert!(
        repo.get_website_with_ticks("missing", "1")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn disable_website_hides_it_everywhere() {
    let (_dir, repo) = temp_repo().await;
    let id = repo.create_website("1", "https://a.example").await.unwrap();

    assert!(!repo.disable_website(&id, "2").await.unwrap());
    assert!(repo.disable_website(&id, "1").await.unwrap());
    // already disabled
    assert!(!repo.disable_website(&id, "1").await.unwrap());

    assert!(repo.list_websites("1").await.unwrap().is_empty());
    assert!(repo.list_active_websites().await.unwrap().is_empty());
    assert!(repo.get_website_with_ticks(&id, "1").await.unwrap().is_none());
}

#[tokio::test]
async fn list_websites_with_ticks_groups_by_website() {
    let (_dir, repo) = temp_repo().await;
    let a = repo.create_website("1", "https://a.example").await.unwrap();
    let b = repo.create_website("1", "https://b.example").await.unwrap();
    let c = repo.create_website("1", "https://c.example").await.unwrap();
    repo.save_ticks(&[
        new_tick(&a, 1000, Reachability::Reachable, 1.0),
        new_tick(&b, 1500, Reachability::Unreachable, 2.0),
        new_tick(&a, 2000, Reachability::Reachable, 3.0),
    ])
    .await
    .unwrap();

    let out = repo.list_websites_with_ticks("1").await.unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].id, a);
    assert_eq!(out[0].ticks.len(), 2);
    assert_eq!(out[1].id, b);
    assert_eq!(out[1].ticks.len(), 1);
    assert_eq!(out[2].id, c);
    assert!(out[2].ticks.is_empty());

    assert!(repo.list_websites_with_ticks("2").await.unwrap().is_empty());
}

#[tokio::test]
async fn save_ticks_empty_is_noop_and_missing_latency_round_trips() {
    let (_dir, repo) = temp_repo().await;
    let id = repo.create_website("1", "https://a.example").await.unwrap();
    repo.save_ticks(&[]).await.unwrap();

    let mut t = new_tick(&id, 1000, Reachability::Unreachable, 0.0);
    t.latency_ms = None;
    repo.save_ticks(&[t]).await.unwrap();

    let w = repo.get_website_with_ticks(&id, "1").await.unwrap().unwrap();
    assert_eq!(w.ticks.len(), 1);
    assert_eq!(w.ticks[0].latency_ms, None);
}

#[tokio::test]
async fn prune_removes_only_older_ticks() {
    let (_dir, repo) = temp_repo().await;
    let id = repo.create_website("1", "https://a.example").await.unwrap();
    repo.save_ticks(&[
        new_tick(&id, 1000, Reachability::Reachable, 1.0),
        new_tick(&id, 2000, Reachability::Reachable, 1.0),
        new_tick(&id, 3000, Reachability::Reachable, 1.0),
    ])
    .await
    .unwrap();

    assert_eq!(repo.prune_ticks_before(2000).await.unwrap(), 1);
    let w = repo.get_website_with_ticks(&id, "1").await.unwrap().unwrap();
    assert_eq!(w.ticks.len(), 2);
    assert_eq!(w.ticks[0].created_at, 2000);
    repo.vacuum().await.unwrap();
}

#[tokio::test]
async fn legacy_status_aliases_normalize_on_read() {
    let (dir, repo) = temp_repo().await;
    let id = repo.create_website("1", "https://a.example").await.unwrap();

    let url = format!("sqlite:{}", dir.path().join("uptime.db").display());
    let raw = SqlitePoolOptions::new().connect(&url).await.unwrap();
    for (i, status) in ["operational", "error", "UP"].iter().enumerate() {
        sqlx::query(
            "INSERT INTO website_tick (id, website_id, created_at, status, latency_ms) VALUES ($1, $2, $3, $4, NULL)",
        )
        .bind(format!("legacy{i}"))
        .bind(&id)
        .bind(i as i64)
        .bind(*status)
        .execute(&raw)
        .await
        .unwrap();
    }

    let w = repo.get_website_with_ticks(&id, "1").await.unwrap().unwrap();
    let statuses: Vec<Reachability> = w.ticks.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![
            Reachability::Reachable,
            Reachability::Unreachable,
            Reachability::Reachable
        ]
    );

    sqlx::query(
        "INSERT INTO website_tick (id, website_id, created_at, status) VALUES ('bad', $1, 99, 'degraded')",
    )
    .bind(&id)
    .execute(&raw)
    .await
    .unwrap();
    let err = repo.get_website_with_ticks(&id, "1").await.unwrap_err();
    assert!(err.to_string().contains("degraded"));
}
