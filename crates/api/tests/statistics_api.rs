//! Statistics and export over HTTP, including who may see them.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, body_text, create_sample_survey, get, get_auth, post_json_auth, token_for,
    user_token,
};
use quickvote_core::roles::ROLE_ADMIN;
use sqlx::PgPool;

const OWNER: i64 = 10;

struct Sample {
    slug: String,
    choice_question: i64,
    rating_question: i64,
    choice_a: i64,
}

async fn sample(pool: &PgPool, visibility: &str) -> Sample {
    let data = create_sample_survey(pool, OWNER, visibility).await;
    Sample {
        slug: data["slug"].as_str().unwrap().to_string(),
        choice_question: data["questions"][0]["id"].as_i64().unwrap(),
        rating_question: data["questions"][1]["id"].as_i64().unwrap(),
        choice_a: data["questions"][0]["choices"][0]["id"].as_i64().unwrap(),
    }
}

/// Respondents 1 and 2 answer (A, 5) and (A, 4).
async fn two_responses(pool: &PgPool, s: &Sample) {
    for (respondent, rating) in [(1, 5), (2, 4)] {
        let response = post_json_auth(
            common::build_test_app_without_notifier(pool.clone()),
            &format!("/api/v1/surveys/{}/responses", s.slug),
            &user_token(respondent),
            serde_json::json!({"answers": [
                {"question": s.choice_question, "selected_choices": [s.choice_a]},
                {"question": s.rating_question, "rating_value": rating}
            ]}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

fn stats_uri(slug: &str) -> String {
    format!("/api/v1/surveys/{slug}/statistics")
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_sees_aggregates_end_to_end(pool: PgPool) {
    let s = sample(&pool, "anonymous").await;
    two_responses(&pool, &s).await;

    let response = get_auth(
        common::build_test_app(pool),
        &stats_uri(&s.slug),
        &user_token(OWNER),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await["data"].clone();

    assert_eq!(stats["total_responses"], 2);

    let choice = &stats["questions"][0];
    assert_eq!(choice["type"], "single");
    let options = choice["options"].as_array().unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0]["label"], "A");
    assert_eq!(options[0]["count"], 2);
    assert_eq!(options[0]["percentage"], 100.0);

    let rating = &stats["questions"][1];
    assert_eq!(rating["type"], "rating");
    assert_eq!(rating["average"], 4.5);
    assert_eq!(
        rating["distribution"],
        serde_json::json!([{"rating": 5, "count": 1}, {"rating": 4, "count": 1}])
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_survey_has_zero_totals(pool: PgPool) {
    let s = sample(&pool, "anonymous").await;

    let response = get_auth(
        common::build_test_app(pool),
        &stats_uri(&s.slug),
        &user_token(OWNER),
    )
    .await;
    let stats = body_json(response).await["data"].clone();
    assert_eq!(stats["total_responses"], 0);
    assert_eq!(stats["questions"][0]["options"], serde_json::json!([]));
    assert_eq!(stats["questions"][1]["average"], 0.0);
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn participant_of_anonymous_survey_may_see_statistics(pool: PgPool) {
    let s = sample(&pool, "anonymous").await;
    two_responses(&pool, &s).await;

    let participant = get_auth(
        common::build_test_app(pool.clone()),
        &stats_uri(&s.slug),
        &user_token(1),
    )
    .await;
    assert_eq!(participant.status(), StatusCode::OK);

    let outsider = get_auth(
        common::build_test_app(pool.clone()),
        &stats_uri(&s.slug),
        &user_token(3),
    )
    .await;
    assert_eq!(outsider.status(), StatusCode::NOT_FOUND);

    let anonymous = get(common::build_test_app(pool), &stats_uri(&s.slug)).await;
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn participant_of_public_survey_is_denied(pool: PgPool) {
    let s = sample(&pool, "public").await;
    two_responses(&pool, &s).await;

    let participant = get_auth(
        common::build_test_app(pool.clone()),
        &stats_uri(&s.slug),
        &user_token(1),
    )
    .await;
    assert_eq!(participant.status(), StatusCode::NOT_FOUND);

    let admin = get_auth(
        common::build_test_app(pool),
        &stats_uri(&s.slug),
        &token_for(99, ROLE_ADMIN),
    )
    .await;
    assert_eq!(admin.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn csv_export_lists_every_answer(pool: PgPool) {
    let s = sample(&pool, "anonymous").await;
    two_responses(&pool, &s).await;

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/surveys/{}/export/csv", s.slug),
        &user_token(OWNER),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains(&s.slug));

    let body = body_text(response).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines,
        [
            "Question,Type,Answer",
            "Pick a place,Single choice,A",
            "Pick a place,Single choice,A",
            "How hungry are you?,Rating 1-5,5",
            "How hungry are you?,Rating 1-5,4",
        ]
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn json_export_matches_statistics(pool: PgPool) {
    let s = sample(&pool, "anonymous").await;
    two_responses(&pool, &s).await;

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/surveys/{}/export/json", s.slug),
        &user_token(OWNER),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_responses"], 2);
    assert_eq!(json["data"]["questions"][1]["average"], 4.5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn export_rejects_unknown_format_and_non_owner(pool: PgPool) {
    let s = sample(&pool, "anonymous").await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/surveys/{}/export/xlsx", s.slug),
        &user_token(OWNER),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/surveys/{}/export/csv", s.slug),
        &user_token(1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
