//! Row-oriented export of survey answers (question, type, answer value).

use std::collections::HashMap;

use serde::Serialize;

use crate::statistics::{AnswerRecord, QuestionInfo};
use crate::types::DbId;

/// CSV header row.
pub const CSV_HEADER: &str = "Question,Type,Answer";

/// One exported answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub question: String,
    pub question_type: String,
    pub answer: String,
}

/// Flatten answers into rows: questions in display order, then answers in
/// creation order. Choice answers list their labels in choice display order,
/// joined with `", "`.
pub fn export_rows(questions: &[QuestionInfo], answers: &[AnswerRecord]) -> Vec<ExportRow> {
    let mut ordered: Vec<&QuestionInfo> = questions.iter().collect();
    ordered.sort_by_key(|q| (q.sort_order, q.id));

    let mut sorted_answers: Vec<&AnswerRecord> = answers.iter().collect();
    sorted_answers.sort_by_key(|a| a.id);

    let mut rows = Vec::with_capacity(answers.len());
    for question in ordered {
        let choice_rank: HashMap<DbId, (i32, DbId, &str)> = question
            .choices
            .iter()
            .map(|c| (c.id, (c.sort_order, c.id, c.label.as_str())))
            .collect();

        for answer in sorted_answers.iter().filter(|a| a.question_id == question.id) {
            let value = if question.question_type.has_choices() {
                let mut picked: Vec<(i32, DbId, &str)> = answer
                    .choice_ids
                    .iter()
                    .filter_map(|id| choice_rank.get(id).copied())
                    .collect();
                picked.sort();
                picked
                    .into_iter()
                    .map(|(_, _, label)| label)
                    .collect::<Vec<_>>()
                    .join(", ")
            } else if let Some(rating) = answer.rating_value {
                rating.to_string()
            } else {
                answer.text_answer.clone().unwrap_or_default()
            };

            rows.push(ExportRow {
                question: question.text.clone(),
                question_type: question.question_type.display_label().to_string(),
                answer: value,
            });
        }
    }
    rows
}

/// Render rows as CSV text, header first.
pub fn rows_to_csv(rows: &[ExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for row in rows {
        lines.push(format!(
            "{},{},{}",
            csv_escape(&row.question),
            csv_escape(&row.question_type),
            csv_escape(&row.answer)
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Escape a value for CSV: wrap in quotes if it contains comma, quote, or newline.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
