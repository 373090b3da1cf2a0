//! Statistics aggregator: pure projection of recorded answers into
//! per-question summaries.
//!
//! The caller loads the survey structure and every stored answer; nothing
//! here is cached, so each call reflects whatever was committed when the
//! rows were read.

use std::collections::HashMap;

use serde::Serialize;

use crate::status::QuestionType;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A choice as seen by the aggregator.
#[derive(Debug, Clone)]
pub struct ChoiceInfo {
    pub id: DbId,
    pub label: String,
    pub sort_order: i32,
}

/// A question with its choices, as seen by the aggregator.
#[derive(Debug, Clone)]
pub struct QuestionInfo {
    pub id: DbId,
    pub text: String,
    pub question_type: QuestionType,
    pub sort_order: i32,
    pub choices: Vec<ChoiceInfo>,
}

/// One stored answer. `id` reflects creation order.
#[derive(Debug, Clone, Default)]
pub struct AnswerRecord {
    pub id: DbId,
    pub question_id: DbId,
    pub text_answer: Option<String>,
    pub rating_value: Option<i16>,
    pub choice_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Statistics snapshot for one survey.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyStatistics {
    pub total_responses: i64,
    pub questions: Vec<QuestionStatistics>,
}

/// Summary of a single question, tagged with its type.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionStatistics {
    pub id: DbId,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(flatten)]
    pub summary: QuestionSummary,
}

/// Type-specific part of a question summary.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QuestionSummary {
    Choices {
        options: Vec<ChoiceTally>,
    },
    Text {
        responses: Vec<String>,
    },
    Rating {
        average: f64,
        distribution: Vec<RatingBucket>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceTally {
    pub choice_id: DbId,
    pub label: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingBucket {
    pub rating: i16,
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build the statistics snapshot.
///
/// Questions are reported in display order (`sort_order`, then id). Answers
/// are processed in creation order regardless of the order they are passed
/// in.
pub fn build_statistics(
    total_responses: i64,
    questions: &[QuestionInfo],
    answers: &[AnswerRecord],
) -> SurveyStatistics {
    let mut by_question: HashMap<DbId, Vec<&AnswerRecord>> = HashMap::new();
    for answer in answers {
        by_question.entry(answer.question_id).or_default().push(answer);
    }
    for list in by_question.values_mut() {
        list.sort_by_key(|a| a.id);
    }

    let mut ordered: Vec<&QuestionInfo> = questions.iter().collect();
    ordered.sort_by_key(|q| (q.sort_order, q.id));

    let questions = ordered
        .into_iter()
        .map(|question| {
            let answers = by_question
                .get(&question.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            QuestionStatistics {
                id: question.id,
                text: question.text.clone(),
                question_type: question.question_type,
                summary: summarize(question, answers),
            }
        })
        .collect();

    SurveyStatistics {
        total_responses,
        questions,
    }
}

fn summarize(question: &QuestionInfo, answers: &[&AnswerRecord]) -> QuestionSummary {
    match question.question_type {
        QuestionType::Single | QuestionType::Multiple => QuestionSummary::Choices {
            options: tally_choices(&question.choices, answers),
        },
        QuestionType::Text => QuestionSummary::Text {
            responses: answers
                .iter()
                .filter_map(|a| a.text_answer.as_deref())
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string)
                .collect(),
        },
        QuestionType::Rating => {
            let ratings: Vec<i16> = answers.iter().filter_map(|a| a.rating_value).collect();
            QuestionSummary::Rating {
                average: average(&ratings),
                distribution: distribution(&ratings),
            }
        }
    }
}

/// Count selections per choice. Choices nobody picked are omitted; the rest
/// are listed in display order.
fn tally_choices(choices: &[ChoiceInfo], answers: &[&AnswerRecord]) -> Vec<ChoiceTally> {
    let mut counts: HashMap<DbId, i64> = HashMap::new();
    for answer in answers {
        for choice_id in &answer.choice_ids {
            *counts.entry(*choice_id).or_default() += 1;
        }
    }

    let mut ordered: Vec<&ChoiceInfo> = choices
        .iter()
        .filter(|c| counts.contains_key(&c.id))
        .collect();
    ordered.sort_by_key(|c| (c.sort_order, c.id));

    let total: i64 = ordered.iter().map(|c| counts[&c.id]).sum();
    let denominator = total.max(1) as f64;

    ordered
        .into_iter()
        .map(|choice| {
            let count = counts[&choice.id];
            ChoiceTally {
                choice_id: choice.id,
                label: choice.label.clone(),
                count,
                percentage: round2(count as f64 / denominator * 100.0),
            }
        })
        .collect()
}

fn average(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    round2(sum as f64 / ratings.len() as f64)
}

/// Count per distinct rating, in order of first occurrence.
fn distribution(ratings: &[i16]) -> Vec<RatingBucket> {
    let mut buckets: Vec<RatingBucket> = Vec::new();
    for rating in ratings {
        match buckets.iter_mut().find(|b| b.rating == *rating) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(RatingBucket {
                rating: *rating,
                count: 1,
            }),
        }
    }
    buckets
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
