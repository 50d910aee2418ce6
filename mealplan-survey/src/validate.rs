//! Per-question and per-category validation.
//!
//! Validation only reads the form state. A category fails when any of its
//! errors is blocking: a missing required answer, a constraint violation on a
//! required question, or an unagreed waiver.

use regex::Regex;

use crate::{
    AnswerValue, Catalog, Category, FieldError, FieldErrorKind, FormState, QuestionDefinition,
    ValidationFailure,
};

/// Whether a value satisfies `required`.
///
/// Text must be non-blank, a selection non-empty and a meal or drink must
/// carry a description or type. Any number or boolean counts.
pub fn is_answered(value: Option<&AnswerValue>) -> bool {
    match value {
        None => false,
        Some(AnswerValue::Text(s)) => !s.trim().is_empty(),
        Some(AnswerValue::Choices(choices)) => !choices.is_empty(),
        Some(AnswerValue::Meal(meal)) => !meal.description.trim().is_empty(),
        Some(AnswerValue::Drink(drink)) => !drink.kind.trim().is_empty(),
        Some(AnswerValue::Number(_) | AnswerValue::Bool(_)) => true,
    }
}

/// Check one question against its validation rules.
///
/// Constraints are only checked for answered questions, and only block when
/// the question is also required.
pub fn check_question(question: &QuestionDefinition, value: Option<&AnswerValue>) -> Vec<FieldError> {
    let rules = &question.validation;
    let error = |kind: FieldErrorKind| FieldError {
        question_id: question.id,
        field_key: question.field_key.clone(),
        text: question.text.clone(),
        kind,
        blocking: rules.required,
    };

    if !is_answered(value) {
        return if rules.required {
            vec![error(FieldErrorKind::Required)]
        } else {
            Vec::new()
        };
    }

    let mut errors = Vec::new();
    match value {
        Some(AnswerValue::Number(n)) => {
            if let Some(min) = rules.min
                && *n < min
            {
                errors.push(error(FieldErrorKind::BelowMin(min)));
            }
            if let Some(max) = rules.max
                && *n > max
            {
                errors.push(error(FieldErrorKind::AboveMax(max)));
            }
        }
        Some(AnswerValue::Choices(choices)) => {
            if let Some(min_select) = rules.min_select
                && choices.len() < min_select
            {
                errors.push(error(FieldErrorKind::TooFewSelections(min_select)));
            }
        }
        Some(AnswerValue::Text(text)) => {
            if let Some(pattern) = &rules.pattern
                && !matches_pattern(question, pattern, text)
            {
                errors.push(error(FieldErrorKind::PatternMismatch));
            }
        }
        _ => {}
    }
    errors
}

fn matches_pattern(question: &QuestionDefinition, pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(text),
        Err(err) => {
            log::warn!("Ignoring invalid pattern on question {}: {err}", question.id);
            true
        }
    }
}

/// Every field error of a category, blocking or not.
pub fn field_errors(catalog: &Catalog, category: &Category, state: &FormState) -> Vec<FieldError> {
    if category.is_waiver() {
        return catalog
            .questions_in(category)
            .filter(|q| state.get(&q.field_key) != Some(&AnswerValue::Bool(true)))
            .map(|q| FieldError {
                question_id: q.id,
                field_key: q.field_key.clone(),
                text: q.text.clone(),
                kind: FieldErrorKind::WaiverNotAccepted,
                blocking: true,
            })
            .collect();
    }

    catalog
        .questions_in(category)
        .flat_map(|q| check_question(q, state.get(&q.field_key)))
        .collect()
}

/// Validate one category, aggregating its blocking errors into one message.
pub fn validate_category(
    catalog: &Catalog,
    category: &Category,
    state: &FormState,
) -> Result<(), ValidationFailure> {
    let errors: Vec<FieldError> = field_errors(catalog, category, state)
        .into_iter()
        .filter(|e| e.blocking)
        .collect();
    if errors.is_empty() {
        return Ok(());
    }

    let message = if category.is_waiver() {
        let items: Vec<String> = errors.iter().map(|e| format!("• {}", e.text)).collect();
        format!("You must agree to all terms to continue:\n{}", items.join("\n"))
    } else {
        aggregate_message(&errors)
    };

    Err(ValidationFailure { message, errors })
}

/// Validate every category in order, stopping at the first failure.
pub fn validate_all(catalog: &Catalog, state: &FormState) -> Result<(), ValidationFailure> {
    catalog
        .categories()
        .iter()
        .try_for_each(|category| validate_category(catalog, category, state))
}

fn aggregate_message(errors: &[FieldError]) -> String {
    let missing: Vec<&str> = errors
        .iter()
        .filter(|e| e.kind == FieldErrorKind::Required)
        .map(|e| e.text.as_str())
        .collect();
    let invalid: Vec<String> = errors
        .iter()
        .filter(|e| e.kind != FieldErrorKind::Required)
        .map(|e| format!("{} ({})", e.text, e.kind))
        .collect();

    let mut lines = Vec::new();
    if !missing.is_empty() {
        lines.push(format!(
            "Please fill in the following required fields: {}",
            missing.join(", ")
        ));
    }
    if !invalid.is_empty() {
        lines.push(format!("Please correct the following fields: {}", invalid.join(", ")));
    }
    lines.join("\n")
}
