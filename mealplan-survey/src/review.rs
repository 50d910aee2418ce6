//! Human-readable summary of a session's answers, shown before submission.

use crate::validate::is_answered;
use crate::{AnswerValue, Catalog, Category, FormState, QuestionDefinition, QuestionId, QuestionType};

const NOT_PROVIDED: &str = "Not provided";

/// One question and its formatted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEntry {
    pub question_id: QuestionId,
    pub text: String,
    pub answer: String,
    pub answered: bool,
}

/// The answers of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSection {
    pub category: Category,
    pub title: String,
    pub entries: Vec<ReviewEntry>,
}

impl ReviewSection {
    pub fn is_waiver(&self) -> bool {
        self.category.is_waiver()
    }
}

/// All sections, in category order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewSummary {
    pub sections: Vec<ReviewSection>,
}

impl ReviewSummary {
    /// Build the summary for the current answers.
    ///
    /// Categories without a single answer are left out, except the waiver,
    /// which is always listed so unagreed terms stay visible.
    pub fn build(catalog: &Catalog, state: &FormState) -> Self {
        let sections = catalog
            .categories()
            .iter()
            .filter_map(|category| {
                let waiver = category.is_waiver();
                let entries: Vec<ReviewEntry> = catalog
                    .questions_in(category)
                    .map(|question| {
                        let value = state.get(&question.field_key);
                        ReviewEntry {
                            question_id: question.id,
                            text: question.text.clone(),
                            answer: format_answer(question, value, waiver),
                            answered: is_answered(value),
                        }
                    })
                    .collect();

                if !waiver && !entries.iter().any(|e| e.answered) {
                    return None;
                }
                Some(ReviewSection {
                    category: category.clone(),
                    title: category.title(),
                    entries,
                })
            })
            .collect();

        Self { sections }
    }

    /// Waiver questions that have not been agreed to.
    pub fn unagreed_waivers(&self) -> Vec<&ReviewEntry> {
        self.sections
            .iter()
            .filter(|s| s.is_waiver())
            .flat_map(|s| &s.entries)
            .filter(|e| e.answer != AGREED)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

const AGREED: &str = "Agreed";

/// Format one answer for display.
pub fn format_answer(question: &QuestionDefinition, value: Option<&AnswerValue>, waiver: bool) -> String {
    if waiver {
        return match value {
            Some(AnswerValue::Bool(true)) => AGREED.to_string(),
            _ => "Not Agreed (Agreement Required)".to_string(),
        };
    }

    let Some(value) = value else {
        return NOT_PROVIDED.to_string();
    };

    match value {
        AnswerValue::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
        AnswerValue::Number(n) => format_number(question, *n),
        AnswerValue::Choices(choices) if choices.is_empty() => "None selected".to_string(),
        AnswerValue::Choices(choices) => choices.join(", "),
        AnswerValue::Text(s) if s.trim().is_empty() => NOT_PROVIDED.to_string(),
        AnswerValue::Text(s) => s.clone(),
        AnswerValue::Meal(meal) if meal.description.trim().is_empty() => NOT_PROVIDED.to_string(),
        AnswerValue::Meal(meal) => {
            let cooked = if meal.is_home_cooked { "Home Cooked" } else { "Not Home Cooked" };
            format!("{} ({cooked})", meal.description)
        }
        AnswerValue::Drink(drink) if drink.kind.trim().is_empty() => NOT_PROVIDED.to_string(),
        AnswerValue::Drink(drink) => {
            let mut parts = vec![
                drink.kind.clone(),
                format!("Organic: {}", if drink.organic { "Yes" } else { "No" }),
            ];
            if !drink.additives.is_empty() {
                parts.push(format!("Additives: {}", drink.additives.join(", ")));
            }
            parts.extend(
                [&drink.frequency, &drink.quantity]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .cloned(),
            );
            parts.join(" | ")
        }
    }
}

fn format_number(question: &QuestionDefinition, n: f64) -> String {
    if question.question_type == QuestionType::Slider {
        return format!("{n}%");
    }
    let text = question.text.to_lowercase();
    if text.contains("percentage") {
        format!("{n:.1}%")
    } else if text.contains("age") {
        format!("{}", n.round())
    } else {
        format!("{n:.1}")
    }
}
