//! Survey templates over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, post_json_auth, user_token};
use sqlx::PgPool;

const OWNER: i64 = 21;

async fn first_template_id(pool: &PgPool, category: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM survey_templates WHERE category = $1")
        .bind(category)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn seeded_templates_are_listed_without_auth(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/templates").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let templates = json["data"].as_array().unwrap();
    assert_eq!(templates.len(), 4);
    let categories: Vec<&str> = templates
        .iter()
        .map(|t| t["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["education", "feedback", "marketing", "satisfaction"]);

    let id = first_template_id(&pool, "marketing").await;
    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/templates/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Market research");
    assert_eq!(json["data"]["payload"]["questions"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_template_is_not_found(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/templates/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn instantiate_creates_a_template_based_survey(pool: PgPool) {
    let id = first_template_id(&pool, "marketing").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/templates/{id}/instantiate"),
        &user_token(OWNER),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["title"], "Market research");
    assert_eq!(data["owner_id"], OWNER);
    assert_eq!(data["is_template_based"], true);
    assert_eq!(data["visibility"], "anonymous");
    assert_eq!(data["status"], "active");
    assert_eq!(data["is_active"], true);
    let questions = data["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["type"], "multiple");
    assert_eq!(questions[0]["choices"].as_array().unwrap().len(), 3);

    // The new survey belongs to the caller like any other.
    let slug = data["slug"].as_str().unwrap();
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/surveys/{slug}"),
        &user_token(OWNER),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn instantiate_requires_auth(pool: PgPool) {
    let id = first_template_id(&pool, "feedback").await;
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/templates/{id}/instantiate"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM surveys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn hand_created_surveys_are_not_template_based(pool: PgPool) {
    let data = common::create_sample_survey(&pool, OWNER, "anonymous").await;
    assert_eq!(data["is_template_based"], false);
}
