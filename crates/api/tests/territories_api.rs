//! Integration tests for territory endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json_auth, token_for};
use serde_json::{json, Value};
use sqlx::PgPool;
use terraclaim_core::geodesy::METERS_PER_DEGREE;
use terraclaim_core::polygon::MAX_CLAIM_VERTICES;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Rectangle as JSON `[{lat, lon}, ...]`, sides in meters.
fn rect(lat: f64, lon: f64, width_m: f64, height_m: f64) -> Value {
    let dlat = height_m / METERS_PER_DEGREE;
    let dlon = width_m / METERS_PER_DEGREE;
    json!([
        { "lat": lat, "lon": lon },
        { "lat": lat, "lon": lon + dlon },
        { "lat": lat + dlat, "lon": lon + dlon },
        { "lat": lat + dlat, "lon": lon },
    ])
}

/// A wiggly closed outline with many nearly-collinear vertices.
fn wiggly(lat: f64, lon: f64) -> Value {
    let d = 200.0 / METERS_PER_DEGREE;
    let jitter = 0.3 / METERS_PER_DEGREE;
    let mut points = Vec::new();
    for i in 0..=20 {
        let f = i as f64 / 20.0;
        let wobble = if i % 2 == 0 { 0.0 } else { jitter };
        points.push(json!({ "lat": lat + wobble, "lon": lon + d * f }));
    }
    points.push(json!({ "lat": lat + d, "lon": lon + d }));
    points.push(json!({ "lat": lat + d, "lon": lon }));
    Value::Array(points)
}

async fn commit(pool: &PgPool, user_id: i64, polygon: Value) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        "/api/v1/territories",
        json!({ "polygon": polygon }),
        &token_for(user_id),
    )
    .await
}

const VIEWPORT: &str = "min_lat=0.0&min_lon=0.0&max_lat=0.05&max_lon=0.05";

// ---------------------------------------------------------------------------
// Test: Commit and conflict
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_claim_wins_second_overlapping_claim_conflicts(pool: PgPool) {
    let response = commit(&pool, 1, rect(0.01, 0.01, 100.0, 100.0)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let a = body_json(response).await;
    let a_id = a["data"]["id"].as_i64().unwrap();
    assert_eq!(a["data"]["name"], format!("Territory #{a_id}"));

    let shifted = rect(0.01 + 50.0 / METERS_PER_DEGREE, 0.01, 100.0, 100.0);
    let response = commit(&pool, 2, shifted.clone()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "OVERLAP_CONFLICT");
    assert_eq!(json["conflicts"], 1);

    // Preview names the territory, and excluding A's owner clears it.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/territories/overlap-check",
        json!({ "polygon": shifted }),
        &token_for(2),
    )
    .await;
    assert_eq!(body_json(response).await["data"][0]["id"], a_id);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/territories/overlap-check",
        json!({ "polygon": shifted, "exclude_owner": 1 }),
        &token_for(2),
    )
    .await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_outlines_are_rejected(pool: PgPool) {
    let response = commit(&pool, 1, rect(0.01, 0.01, 10.0, 10.0)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "AREA_OUT_OF_BOUNDS");

    let d = 100.0 / METERS_PER_DEGREE;
    let bowtie = json!([
        { "lat": 0.01, "lon": 0.01 },
        { "lat": 0.01 + d, "lon": 0.01 + d },
        { "lat": 0.01, "lon": 0.01 + d },
        { "lat": 0.01 + d, "lon": 0.01 },
    ]);
    let response = commit(&pool, 1, bowtie).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "SELF_INTERSECTING");

    let two_points = json!([{ "lat": 0.01, "lon": 0.01 }, { "lat": 0.02, "lon": 0.02 }]);
    let response = commit(&pool, 1, two_points).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // Far more vertices than any outline may carry is refused before any
    // geometry work.
    let step = 0.1 / METERS_PER_DEGREE;
    let sprawling: Vec<Value> = (0..MAX_CLAIM_VERTICES + 2)
        .map(|i| json!({ "lat": 0.01 + (i % 2) as f64 * step, "lon": 0.01 + i as f64 * step }))
        .collect();
    let response = commit(&pool, 1, Value::Array(sprawling)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: Visible territories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn visible_geometry_shrinks_with_detail_level(pool: PgPool) {
    let response = commit(&pool, 1, wiggly(0.01, 0.01)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut previous = usize::MAX;
    for level in [22, 16, 14, 10] {
        let app = common::build_test_app(pool.clone());
        let uri = format!("/api/v1/territories/visible?{VIEWPORT}&detail_level={level}");
        let response = get_auth(app, &uri, &token_for(5)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let geometry = json["data"][0]["geometry"].as_array().unwrap();
        assert!(geometry.len() >= 4);
        assert_eq!(geometry.first(), geometry.last());
        assert!(geometry.len() <= previous, "level {level} grew to {}", geometry.len());
        previous = geometry.len();
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn visible_rejects_inverted_bbox(pool: PgPool) {
    let app = common::build_test_app(pool);
    let uri = "/api/v1/territories/visible?min_lat=1.0&min_lon=0.0&max_lat=0.0&max_lon=1.0";
    let response = get_auth(app, uri, &token_for(1)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: Listings and activity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_listing_and_owner_only_refresh(pool: PgPool) {
    let response = commit(&pool, 1, rect(0.01, 0.01, 100.0, 100.0)).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/users/1/territories", &token_for(2)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], id);
    assert_eq!(json["data"][0]["geometry"].as_array().unwrap().len(), 5);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/territories/{id}/activity");
    let response = post_auth(app, &uri, &token_for(2)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &uri, &token_for(1)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "active");

    let app = common::build_test_app(pool);
    let response = post_auth(app, "/api/v1/territories/424242/activity", &token_for(1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn redrawn_disjoint_claim_succeeds_after_conflict(pool: PgPool) {
    let response = commit(&pool, 1, rect(0.01, 0.01, 100.0, 100.0)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Overlaps A by 10% of its area.
    let response = commit(&pool, 2, rect(0.01, 0.01 + 90.0 / METERS_PER_DEGREE, 100.0, 100.0)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 2,000 m² well clear of A.
    let response = commit(&pool, 2, rect(0.01, 0.01 + 300.0 / METERS_PER_DEGREE, 50.0, 40.0)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let area = json["data"]["area_sq_meters"].as_f64().unwrap();
    assert!((area - 2_000.0).abs() < 20.0, "{area}");

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/territories/visible?{VIEWPORT}");
    let response = get_auth(app, &uri, &token_for(3)).await;
    let json = body_json(response).await;
    let owners: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["owner_id"].as_i64().unwrap())
        .collect();
    assert_eq!(owners, vec![2, 1]);
}
