//! Integration tests for response recording, answer reads, and notification
//! rule storage.

use assert_matches::assert_matches;
use quickvote_core::answers::{AnswerValue, ValidatedAnswer};
use quickvote_core::error::RejectionReason;
use quickvote_core::status::QuestionType;
use quickvote_db::models::notification::CreateNotificationRule;
use quickvote_db::models::question::{CreateChoice, CreateQuestion, QuestionWithChoices};
use quickvote_db::models::response::{NewResponse, RecordOutcome};
use quickvote_db::models::survey::{CreateSurvey, Survey, UpdateSurvey};
use quickvote_db::repositories::{NotificationRuleRepo, QuestionRepo, ResponseRepo, SurveyRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_survey(pool: &PgPool) -> (Survey, Vec<QuestionWithChoices>) {
    let input = CreateSurvey {
        title: "Team offsite".to_string(),
        description: None,
        visibility: None,
        status: None,
        ends_at: None,
        welcome_message: None,
        thank_you_message: None,
        questions: vec![
            CreateQuestion {
                text: "Activities".to_string(),
                question_type: QuestionType::Multiple,
                is_required: None,
                max_text_length: None,
                choices: ["Hiking", "Kayak", "Cooking"]
                    .iter()
                    .map(|l| CreateChoice {
                        label: l.to_string(),
                    })
                    .collect(),
            },
            CreateQuestion {
                text: "Comments".to_string(),
                question_type: QuestionType::Text,
                is_required: Some(false),
                max_text_length: Some(200),
                choices: vec![],
            },
        ],
    };
    let survey = SurveyRepo::create(pool, 1, &input).await.unwrap();
    let questions = QuestionRepo::list_with_choices(pool, survey.id)
        .await
        .unwrap();
    (survey, questions)
}

fn choices_answer(question: &QuestionWithChoices, picks: &[usize]) -> ValidatedAnswer {
    ValidatedAnswer {
        question_id: question.question.id,
        value: AnswerValue::Choices(picks.iter().map(|&i| question.choices[i].id).collect()),
    }
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_record_writes_response_answers_and_links(pool: PgPool) {
    let (survey, questions) = seed_survey(&pool).await;
    let response = NewResponse::new(
        survey.id,
        Some(42),
        false,
        Some(31),
        Some("10.0.0.1".to_string()),
        Some("Mozilla/5.0"),
    );
    let answers = vec![
        choices_answer(&questions[0], &[2, 0]),
        ValidatedAnswer {
            question_id: questions[1].question.id,
            value: AnswerValue::Text("Bring snacks".to_string()),
        },
    ];

    let outcome = ResponseRepo::record(&pool, &response, &answers)
        .await
        .unwrap();
    let created = match outcome {
        RecordOutcome::Created(response) => response,
        other => panic!("expected a created response, got {other:?}"),
    };
    assert_eq!(created.respondent_id, Some(42));
    assert_eq!(created.duration_seconds, 31);
    assert_eq!(created.user_agent, "Mozilla/5.0");

    assert!(ResponseRepo::exists_for_respondent(&pool, survey.id, 42)
        .await
        .unwrap());
    assert_eq!(
        ResponseRepo::count_for_survey(&pool, survey.id).await.unwrap(),
        1
    );

    let records = ResponseRepo::list_answers_for_survey(&pool, survey.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    let mut expected = vec![questions[0].choices[0].id, questions[0].choices[2].id];
    expected.sort();
    assert_eq!(records[0].choice_ids, expected);
    assert_eq!(records[1].text_answer.as_deref(), Some("Bring snacks"));
    assert!(records[1].choice_ids.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_response_from_same_respondent_is_duplicate(pool: PgPool) {
    let (survey, questions) = seed_survey(&pool).await;
    let response = NewResponse::new(survey.id, Some(5), false, None, None, None);
    let answers = vec![choices_answer(&questions[0], &[0])];

    let first = ResponseRepo::record(&pool, &response, &answers)
        .await
        .unwrap();
    assert_matches!(first, RecordOutcome::Created(_));

    let second = ResponseRepo::record(&pool, &response, &answers)
        .await
        .unwrap();
    assert_matches!(second, RecordOutcome::Duplicate);

    assert_eq!(
        ResponseRepo::count_for_survey(&pool, survey.id).await.unwrap(),
        1
    );
    let answers_stored = ResponseRepo::list_answers_for_survey(&pool, survey.id)
        .await
        .unwrap();
    assert_eq!(answers_stored.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_duplicates_store_exactly_one(pool: PgPool) {
    let (survey, questions) = seed_survey(&pool).await;
    let response = NewResponse::new(survey.id, Some(9), false, None, None, None);
    let answers = vec![choices_answer(&questions[0], &[1])];

    let attempts = (0..8).map(|_| ResponseRepo::record(&pool, &response, &answers));
    let outcomes = futures::future::join_all(attempts).await;

    let created = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(RecordOutcome::Created(_))))
        .count();
    let duplicates = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(RecordOutcome::Duplicate)))
        .count();
    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(
        ResponseRepo::count_for_survey(&pool, survey.id).await.unwrap(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_anonymous_responses_are_unlimited(pool: PgPool) {
    let (survey, questions) = seed_survey(&pool).await;
    let response = NewResponse::new(survey.id, None, true, None, None, None);
    let answers = vec![choices_answer(&questions[0], &[0])];

    for _ in 0..3 {
        let outcome = ResponseRepo::record(&pool, &response, &answers)
            .await
            .unwrap();
        assert_matches!(outcome, RecordOutcome::Created(r) if r.is_anonymous);
    }
    assert_eq!(
        ResponseRepo::count_for_survey(&pool, survey.id).await.unwrap(),
        3
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rating_outside_range_rejected_by_storage(pool: PgPool) {
    let (survey, questions) = seed_survey(&pool).await;
    let response = NewResponse::new(survey.id, None, true, None, None, None);
    let answers = vec![ValidatedAnswer {
        question_id: questions[1].question.id,
        value: AnswerValue::Rating(9),
    }];

    let result = ResponseRepo::record(&pool, &response, &answers).await;
    assert!(result.is_err());
    assert_eq!(
        ResponseRepo::count_for_survey(&pool, survey.id).await.unwrap(),
        0,
        "failed answer insert must roll back the response"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_structure_replaced_after_validation_is_rejected(pool: PgPool) {
    let (survey, questions) = seed_survey(&pool).await;
    // Answers built against the structure as it was read for validation.
    let answers = vec![choices_answer(&questions[0], &[0])];

    let replacement = UpdateSurvey {
        questions: Some(vec![CreateQuestion {
            text: "Dinner spot".to_string(),
            question_type: QuestionType::Single,
            is_required: None,
            max_text_length: None,
            choices: vec![CreateChoice {
                label: "Harbour".to_string(),
            }],
        }]),
        ..Default::default()
    };
    let updated = SurveyRepo::update(&pool, survey.id, &replacement)
        .await
        .unwrap()
        .unwrap();
    assert!(!updated.frozen);

    let response = NewResponse::new(survey.id, Some(3), false, None, None, None);
    let outcome = ResponseRepo::record(&pool, &response, &answers)
        .await
        .unwrap();
    assert_matches!(
        outcome,
        RecordOutcome::Rejected(RejectionReason::ForeignQuestion)
    );
    assert_eq!(
        ResponseRepo::count_for_survey(&pool, survey.id).await.unwrap(),
        0
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_record_for_deleted_survey_is_not_found(pool: PgPool) {
    let (survey, questions) = seed_survey(&pool).await;
    let answers = vec![choices_answer(&questions[0], &[0])];
    assert!(SurveyRepo::delete(&pool, survey.id).await.unwrap());

    let response = NewResponse::new(survey.id, None, true, None, None, None);
    let result = ResponseRepo::record(&pool, &response, &answers).await;
    assert_matches!(result, Err(sqlx::Error::RowNotFound));
}

// ---------------------------------------------------------------------------
// Notification rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_rule_fires_at_most_once(pool: PgPool) {
    let (survey, _) = seed_survey(&pool).await;
    let rule = NotificationRuleRepo::create(
        &pool,
        survey.id,
        &CreateNotificationRule {
            threshold: 2,
            recipient_email: "owner@example.com".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(!rule.has_fired);

    let first = NotificationRuleRepo::record_firing(&pool, rule.id, 2, "reached 2")
        .await
        .unwrap();
    assert!(first.is_some());
    let second = NotificationRuleRepo::record_firing(&pool, rule.id, 3, "reached 3")
        .await
        .unwrap();
    assert!(second.is_none());

    let rules = NotificationRuleRepo::list_for_survey(&pool, survey.id)
        .await
        .unwrap();
    assert!(rules[0].has_fired);

    let fired = NotificationRuleRepo::list_notifications_for_survey(&pool, survey.id)
        .await
        .unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].total_responses, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rule_delete_is_scoped_to_survey(pool: PgPool) {
    let (survey, _) = seed_survey(&pool).await;
    let (other, _) = seed_survey(&pool).await;
    let rule = NotificationRuleRepo::create(
        &pool,
        survey.id,
        &CreateNotificationRule {
            threshold: 1,
            recipient_email: "owner@example.com".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(!NotificationRuleRepo::delete(&pool, other.id, rule.id)
        .await
        .unwrap());
    assert!(NotificationRuleRepo::delete(&pool, survey.id, rule.id)
        .await
        .unwrap());
}
