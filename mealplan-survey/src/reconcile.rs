//! Turning stored answers back into typed form values.
//!
//! Stored answers come back from the backend in whatever shape they were saved
//! in. Reconciliation coerces each one into the `AnswerValue` its question's
//! type expects. The conversion never fails: unusable data falls back to the
//! type's default and is recorded in the `ReconcileReport`.

use serde_json::{Map, Value};

use crate::{
    AnswerValue, Catalog, DrinkDetails, FormState, MealInput, QuestionDefinition, QuestionId,
    QuestionType, Response,
};

/// A stored answer that could not be used as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationDefault {
    pub question_id: QuestionId,
    pub reason: String,
}

/// What happened to the stored responses of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Questions that received a stored answer, in the order the answers arrived.
    pub applied: Vec<QuestionId>,

    /// Ids of stored answers with no matching question.
    pub orphaned: Vec<QuestionId>,

    /// Answers that were replaced or partially filled with defaults.
    pub defaulted: Vec<ReconciliationDefault>,
}

impl ReconcileReport {
    /// Check whether a question received a stored answer.
    pub fn has_answer(&self, question_id: QuestionId) -> bool {
        self.applied.contains(&question_id)
    }
}

/// The typed value for one stored answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: AnswerValue,

    /// Set when the stored data could not be used as-is.
    pub defaulted: Option<String>,
}

impl Coerced {
    fn exact(value: impl Into<AnswerValue>) -> Self {
        Self {
            value: value.into(),
            defaulted: None,
        }
    }

    fn defaulted(value: impl Into<AnswerValue>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            defaulted: Some(reason.into()),
        }
    }

    /// The type's default in place of an unusable answer.
    fn fallback(question_type: QuestionType, reason: impl Into<String>) -> Self {
        Self::defaulted(question_type.default_answer(), reason)
    }
}

/// Write every stored response into `state` at its question's field key.
///
/// Responses are applied in order, so a later answer for the same question
/// wins. Orphaned and `null` answers are skipped.
pub fn reconcile(catalog: &Catalog, responses: &[Response], state: &mut FormState) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for response in responses {
        let Some(question) = catalog.get(response.question_id) else {
            log::debug!("Discarding answer for unknown question {}", response.question_id);
            report.orphaned.push(response.question_id);
            continue;
        };
        if response.answer.is_null() {
            continue;
        }

        let coerced = coerce_answer(question, &response.answer);
        if let Some(reason) = coerced.defaulted {
            log::warn!(
                "Stored answer for question {} ('{}') defaulted: {reason}",
                question.id,
                question.field_key
            );
            report.defaulted.push(ReconciliationDefault {
                question_id: question.id,
                reason,
            });
        }

        match state.set(&question.field_key, coerced.value) {
            Ok(_) => {
                if !report.applied.contains(&question.id) {
                    report.applied.push(question.id);
                }
            }
            Err(err) => log::warn!("Could not store answer for question {}: {err}", question.id),
        }
    }

    report
}

/// Coerce a raw stored answer into the value `question` expects.
pub fn coerce_answer(question: &QuestionDefinition, raw: &Value) -> Coerced {
    let question_type = question.question_type;
    match question_type {
        QuestionType::Checkbox | QuestionType::MultipleChoice => coerce_choices(question_type, raw),
        QuestionType::Boolean => coerce_bool(question_type, raw),
        QuestionType::Number | QuestionType::Slider => coerce_number(question_type, raw),
        QuestionType::Radio => coerce_radio(question, raw),
        QuestionType::MealInput => coerce_meal(question_type, raw),
        QuestionType::DrinkDetails => coerce_drink(question_type, raw),
        QuestionType::Text => coerce_text(question_type, raw),
    }
}

fn coerce_choices(question_type: QuestionType, raw: &Value) -> Coerced {
    match raw {
        Value::Array(items) => {
            let choices: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if choices.len() == items.len() {
                Coerced::exact(choices)
            } else {
                Coerced::defaulted(choices, "dropped non-text selections")
            }
        }
        Value::String(s) if s.is_empty() => Coerced::exact(Vec::<String>::new()),
        Value::String(s) => Coerced::exact(vec![s.clone()]),
        Value::Object(map) => {
            Coerced::exact(map.values().filter_map(scalar_text).collect::<Vec<_>>())
        }
        other => Coerced::fallback(question_type, format!("expected a list, got {other}")),
    }
}

fn coerce_bool(question_type: QuestionType, raw: &Value) -> Coerced {
    match raw {
        Value::Bool(b) => Coerced::exact(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Coerced::exact(true)
            } else if s.eq_ignore_ascii_case("false") {
                Coerced::exact(false)
            } else {
                Coerced::fallback(question_type, format!("'{s}' is not a boolean"))
            }
        }
        other => Coerced::exact(truthy(other)),
    }
}

fn coerce_number(question_type: QuestionType, raw: &Value) -> Coerced {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => first_value(map).and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => Coerced::exact(n),
        _ => Coerced::fallback(question_type, format!("{raw} is not a number")),
    }
}

fn coerce_radio(question: &QuestionDefinition, raw: &Value) -> Coerced {
    let question_type = question.question_type;
    let choice = match raw {
        Value::String(s) => s.clone(),
        Value::Object(map) => match first_value(map).and_then(scalar_text) {
            Some(s) => s,
            None => return Coerced::fallback(question_type, "empty choice wrapper"),
        },
        other => return Coerced::fallback(question_type, format!("expected a choice, got {other}")),
    };

    if choice.is_empty() || question.has_option(&choice) {
        Coerced::exact(choice)
    } else {
        Coerced::fallback(question_type, format!("'{choice}' is no longer an option"))
    }
}

fn coerce_meal(question_type: QuestionType, raw: &Value) -> Coerced {
    match raw {
        Value::Object(map) => Coerced::exact(MealInput {
            description: map.get("description").and_then(scalar_text).unwrap_or_default(),
            is_home_cooked: map.get("isHomeCooked").is_some_and(truthy),
        }),
        Value::String(s) => Coerced::exact(MealInput::new(s.clone())),
        other => Coerced::fallback(question_type, format!("expected a meal, got {other}")),
    }
}

fn coerce_drink(question_type: QuestionType, raw: &Value) -> Coerced {
    match raw {
        Value::Object(map) => {
            let text = |key: &str| map.get(key).and_then(scalar_text).unwrap_or_default();
            let additives = match map.get("additives") {
                Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
                Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
                _ => Vec::new(),
            };
            Coerced::exact(DrinkDetails {
                kind: text("type"),
                organic: map.get("organic").is_some_and(truthy),
                additives,
                frequency: text("frequency"),
                quantity: text("quantity"),
            })
        }
        Value::String(s) => Coerced::exact(DrinkDetails::new(s.clone())),
        other => Coerced::fallback(question_type, format!("expected drink details, got {other}")),
    }
}

fn coerce_text(question_type: QuestionType, raw: &Value) -> Coerced {
    match raw {
        Value::String(s) => Coerced::exact(s.clone()),
        Value::Number(_) | Value::Bool(_) => Coerced::exact(raw.to_string()),
        Value::Object(map) => match first_value(map).and_then(scalar_text) {
            Some(s) => Coerced::exact(s),
            None => Coerced::fallback(question_type, "empty text wrapper"),
        },
        other => Coerced::fallback(question_type, format!("expected text, got {other}")),
    }
}

fn first_value(map: &Map<String, Value>) -> Option<&Value> {
    map.values().next()
}

/// Strings as-is, numbers and booleans in their JSON spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JavaScript truthiness, which is how the stored booleans were written.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(question_type: QuestionType) -> QuestionDefinition {
        QuestionDefinition::new(1, "Question", "goals", question_type, "goals.answer")
            .with_options(["Low", "Medium", "High"])
    }

    fn coerce(question_type: QuestionType, raw: Value) -> Coerced {
        coerce_answer(&question(question_type), &raw)
    }

    #[test]
    fn checkbox_keeps_array_order() {
        let coerced = coerce(QuestionType::Checkbox, json!(["b", "a"]));
        assert_eq!(coerced.value, AnswerValue::from(vec!["b", "a"]));
        assert!(coerced.defaulted.is_none());
    }

    #[test]
    fn checkbox_wraps_single_string_and_object_values() {
        assert_eq!(
            coerce(QuestionType::MultipleChoice, json!("Walking")).value,
            AnswerValue::from(vec!["Walking"])
        );
        assert_eq!(
            coerce(QuestionType::Checkbox, json!({"0": "Yoga", "1": "Running"})).value,
            AnswerValue::from(vec!["Yoga", "Running"])
        );
        let coerced = coerce(QuestionType::Checkbox, json!(7));
        assert_eq!(coerced.value, AnswerValue::Choices(vec![]));
        assert!(coerced.defaulted.is_some());
    }

    #[test]
    fn boolean_from_strings_and_truthiness() {
        assert_eq!(coerce(QuestionType::Boolean, json!("TRUE")).value, AnswerValue::Bool(true));
        assert_eq!(coerce(QuestionType::Boolean, json!("false")).value, AnswerValue::Bool(false));
        assert_eq!(coerce(QuestionType::Boolean, json!(1)).value, AnswerValue::Bool(true));
        assert_eq!(coerce(QuestionType::Boolean, json!(0)).value, AnswerValue::Bool(false));
        assert_eq!(coerce(QuestionType::Boolean, json!({})).value, AnswerValue::Bool(true));

        let coerced = coerce(QuestionType::Boolean, json!("maybe"));
        assert_eq!(coerced.value, AnswerValue::Bool(false));
        assert!(coerced.defaulted.is_some());
    }

    #[test]
    fn number_from_string() {
        let coerced = coerce(QuestionType::Number, json!("3.7"));
        assert_eq!(coerced.value, AnswerValue::Number(3.7));
        assert!(coerced.defaulted.is_none());
    }

    #[test]
    fn number_defaults_to_zero() {
        for raw in [json!("tall"), json!(true), json!([1]), json!("NaN"), json!("inf")] {
            let coerced = coerce(QuestionType::Slider, raw);
            assert_eq!(coerced.value, AnswerValue::Number(0.0));
            assert!(coerced.defaulted.is_some());
        }
        assert_eq!(
            coerce(QuestionType::Number, json!({"value": "72"})).value,
            AnswerValue::Number(72.0)
        );
    }

    #[test]
    fn radio_rejects_stale_choice() {
        let coerced = coerce(QuestionType::Radio, json!("Extreme"));
        assert_eq!(coerced.value, AnswerValue::from(""));
        assert!(coerced.defaulted.is_some());

        assert_eq!(coerce(QuestionType::Radio, json!("High")).value, AnswerValue::from("High"));
        assert_eq!(
            coerce(QuestionType::Radio, json!({"choice": "Low"})).value,
            AnswerValue::from("Low")
        );
    }

    #[test]
    fn meal_defaults_and_objects() {
        assert_eq!(
            coerce(QuestionType::MealInput, json!("Porridge")).value,
            AnswerValue::Meal(MealInput::new("Porridge"))
        );
        assert_eq!(
            coerce(
                QuestionType::MealInput,
                json!({"description": "Salad", "isHomeCooked": true})
            )
            .value,
            AnswerValue::Meal(MealInput::new("Salad").home_cooked(true))
        );
        let coerced = coerce(QuestionType::MealInput, json!(3));
        assert_eq!(coerced.value, AnswerValue::Meal(MealInput::default()));
        assert!(coerced.defaulted.is_some());
    }

    #[test]
    fn drink_defaults_and_objects() {
        let coerced = coerce(
            QuestionType::DrinkDetails,
            json!({"type": "Coffee", "organic": "yes", "additives": ["Milk"], "frequency": "Daily"}),
        );
        let AnswerValue::Drink(drink) = coerced.value else {
            panic!("expected drink details");
        };
        assert_eq!(drink.kind, "Coffee");
        assert!(drink.organic);
        assert_eq!(drink.additives, vec!["Milk"]);
        assert_eq!(drink.frequency, "Daily");
        assert_eq!(drink.quantity, "");

        assert_eq!(
            coerce(QuestionType::DrinkDetails, json!("Water")).value,
            AnswerValue::Drink(DrinkDetails::new("Water"))
        );
    }

    #[test]
    fn text_unwraps_objects() {
        assert_eq!(
            coerce(QuestionType::Text, json!({"fullName": "Ada"})).value,
            AnswerValue::from("Ada")
        );
        assert_eq!(coerce(QuestionType::Text, json!(42)).value, AnswerValue::from("42"));
        let coerced = coerce(QuestionType::Text, json!(["x"]));
        assert_eq!(coerced.value, AnswerValue::from(""));
        assert!(coerced.defaulted.is_some());
    }

    #[test]
    fn reconcile_skips_orphans_and_nulls_and_last_write_wins() {
        let catalog = Catalog::new(vec![
            QuestionDefinition::new(1, "Age", "personal_info", QuestionType::Number, "personalInfo.age"),
            QuestionDefinition::new(2, "Name", "personal_info", QuestionType::Text, "personalInfo.name"),
        ])
        .unwrap();
        let responses = vec![
            Response::new(1, "30"),
            Response::new(99, "ghost"),
            Response::new(2, Value::Null),
            Response::new(1, 31),
        ];

        let mut state = FormState::new();
        let report = reconcile(&catalog, &responses, &mut state);

        assert_eq!(state.get(&"personalInfo.age".into()), Some(&AnswerValue::Number(31.0)));
        assert!(!state.contains(&"personalInfo.name".into()));
        assert_eq!(report.applied, vec![1]);
        assert_eq!(report.orphaned, vec![99]);
        assert!(report.defaulted.is_empty());
        assert!(report.has_answer(1));
        assert!(!report.has_answer(2));
    }
}
