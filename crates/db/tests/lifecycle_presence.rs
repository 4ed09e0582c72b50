//! Integration tests for the territory lifecycle and player presence.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use terraclaim_core::density::{nearby_count, online_cutoff, PresenceFix};
use terraclaim_core::geodesy::{BoundingBox, Coordinate, METERS_PER_DEGREE};
use terraclaim_core::lifecycle::{LifecycleCutoffs, TerritoryStatus};
use terraclaim_db::models::territory::CreateTerritory;
use terraclaim_db::repositories::{HeartbeatRepo, TerritoryRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn square(lat: f64, lon: f64, side_m: f64) -> Vec<Coordinate> {
    let d = side_m / METERS_PER_DEGREE;
    vec![
        Coordinate::new(lat, lon),
        Coordinate::new(lat, lon + d),
        Coordinate::new(lat + d, lon + d),
        Coordinate::new(lat + d, lon),
    ]
}

async fn commit_square(pool: &PgPool, owner_id: i64, lon: f64) -> i64 {
    let input = CreateTerritory {
        owner_id,
        name: None,
        ring: square(0.01, lon, 100.0),
    };
    TerritoryRepo::commit(pool, &input).await.unwrap().id
}

async fn set_last_active(pool: &PgPool, id: i64, days_ago: i64) {
    sqlx::query("UPDATE territories SET last_active_at = now() - make_interval(days => $2) WHERE id = $1")
        .bind(id)
        .bind(days_ago as i32)
        .execute(pool)
        .await
        .unwrap();
}

async fn status_of(pool: &PgPool, id: i64) -> TerritoryStatus {
    TerritoryRepo::find_by_id(pool, id).await.unwrap().unwrap().status()
}

// ---------------------------------------------------------------------------
// Test: Lifecycle sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sweep_moves_stale_territories_down(pool: PgPool) {
    let fresh = commit_square(&pool, 1, 0.010).await;
    let idle = commit_square(&pool, 1, 0.012).await;
    let gone = commit_square(&pool, 1, 0.014).await;
    set_last_active(&pool, idle, 45).await;
    set_last_active(&pool, gone, 120).await;

    let report = TerritoryRepo::apply_lifecycle(&pool, &LifecycleCutoffs::at(Utc::now()))
        .await
        .unwrap();
    assert_eq!(report.deactivated, 1);
    assert_eq!(report.abandoned, 1);

    assert_eq!(status_of(&pool, fresh).await, TerritoryStatus::Active);
    assert_eq!(status_of(&pool, idle).await, TerritoryStatus::Inactive);
    assert_eq!(status_of(&pool, gone).await, TerritoryStatus::Abandoned);

    // A second sweep is a no-op.
    let again = TerritoryRepo::sweep_lifecycle(&pool).await.unwrap();
    assert_eq!(again.deactivated + again.abandoned, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_reactivates_inactive_but_not_abandoned(pool: PgPool) {
    let idle = commit_square(&pool, 1, 0.010).await;
    let gone = commit_square(&pool, 1, 0.012).await;
    set_last_active(&pool, idle, 45).await;
    set_last_active(&pool, gone, 120).await;
    TerritoryRepo::sweep_lifecycle(&pool).await.unwrap();

    let refreshed = TerritoryRepo::refresh_activity(&pool, idle).await.unwrap().unwrap();
    assert_eq!(refreshed.status(), TerritoryStatus::Active);
    assert!(Utc::now() - refreshed.last_active_at < Duration::minutes(1));

    assert!(TerritoryRepo::refresh_activity(&pool, gone).await.unwrap().is_none());
    assert!(TerritoryRepo::refresh_activity(&pool, 9_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_territory_still_blocks_claims(pool: PgPool) {
    let idle = commit_square(&pool, 1, 0.010).await;
    set_last_active(&pool, idle, 45).await;
    TerritoryRepo::sweep_lifecycle(&pool).await.unwrap();

    let conflicts = TerritoryRepo::check_overlap(&pool, &square(0.01, 0.0104, 100.0), None)
        .await
        .unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, idle);
}

// ---------------------------------------------------------------------------
// Test: Presence
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_heartbeat_upsert_keeps_one_row_per_player(pool: PgPool) {
    let first = HeartbeatRepo::upsert(&pool, 1, &Coordinate::new(35.0, 139.0))
        .await
        .unwrap();
    let second = HeartbeatRepo::upsert(&pool, 1, &Coordinate::new(35.001, 139.001))
        .await
        .unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert!(second.last_seen >= first.last_seen);
    assert_eq!(second.coordinate(), Coordinate::new(35.001, 139.001));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM player_heartbeats")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_density_counts_online_players_nearby(pool: PgPool) {
    let center = Coordinate::new(35.0, 139.0);
    HeartbeatRepo::upsert(&pool, 1, &center).await.unwrap();
    HeartbeatRepo::upsert(&pool, 2, &center.offset_meters(200.0, 0.0)).await.unwrap();
    HeartbeatRepo::upsert(&pool, 3, &center.offset_meters(0.0, 300.0)).await.unwrap();
    HeartbeatRepo::upsert(&pool, 4, &center.offset_meters(3_000.0, 0.0)).await.unwrap();
    assert!(HeartbeatRepo::mark_offline(&pool, 3).await.unwrap());
    assert!(!HeartbeatRepo::mark_offline(&pool, 42).await.unwrap());

    let now = Utc::now();
    let bbox = BoundingBox::around(&center, 500.0);
    let rows = HeartbeatRepo::list_online_in_bbox(&pool, &bbox, online_cutoff(now))
        .await
        .unwrap();
    let fixes: Vec<PresenceFix> = rows.iter().map(PresenceFix::from).collect();

    assert_eq!(nearby_count(&center, 500.0, 1, &fixes, now), 1);

    let last_seen: chrono::DateTime<Utc> =
        sqlx::query_scalar("SELECT last_seen FROM player_heartbeats WHERE user_id = 3")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(now - last_seen >= Duration::minutes(59));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_density_sees_players_across_the_antimeridian(pool: PgPool) {
    let center = Coordinate::new(-17.0, 179.999);
    HeartbeatRepo::upsert(&pool, 1, &center).await.unwrap();
    HeartbeatRepo::upsert(&pool, 2, &Coordinate::new(-17.0, -179.999)).await.unwrap();
    HeartbeatRepo::upsert(&pool, 3, &Coordinate::new(-17.0, 0.0)).await.unwrap();

    let now = Utc::now();
    let bbox = BoundingBox::around(&center, 500.0);
    let rows = HeartbeatRepo::list_online_in_bbox(&pool, &bbox, online_cutoff(now))
        .await
        .unwrap();
    let fixes: Vec<PresenceFix> = rows.iter().map(PresenceFix::from).collect();

    assert_eq!(nearby_count(&center, 500.0, 1, &fixes, now), 1);
}
