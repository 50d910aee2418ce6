//! Payloads exchanged with the questionnaire backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FormState, QuestionId};

/// A stored or outgoing answer to one question.
///
/// `answer` is kept as raw JSON: stored answers may be in any shape, and are
/// only turned into typed values by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: QuestionId,
    #[serde(default)]
    pub answer: Value,
}

impl Response {
    pub fn new(question_id: QuestionId, answer: impl Into<Value>) -> Self {
        Self {
            question_id,
            answer: answer.into(),
        }
    }
}

/// Body of `POST /questions/responses`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveResponsesRequest<'a> {
    pub responses: &'a [Response],
}

/// Body of `POST /meal-plans/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub user_info: &'a UserInfo,
    pub responses: &'a [Response],
}

/// Profile data sent alongside the responses when generating a meal plan.
///
/// Usually the nested form values themselves (`{"personalInfo": {...}, ...}`),
/// but callers may collect it separately and add fields of their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInfo(Map<String, Value>);

impl UserInfo {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build user info from the nested form values.
    pub fn from_form_state(state: &FormState) -> Self {
        match state.to_json() {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for UserInfo {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The generated meal plan, passed through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealPlan(pub Value);

impl MealPlan {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}
