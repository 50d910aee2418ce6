//! In-memory backend for driving sessions without a server.
//!
//! `TestApi` serves a fixed question list and stored responses, and records
//! every save and submission it receives so tests can inspect them.
//!
//! # Example
//!
//! ```rust,ignore
//! use mealplan_survey::{QuestionDefinition, QuestionType, Session, TestApi};
//!
//! let api = TestApi::new()
//!     .with_question(
//!         QuestionDefinition::new(1, "Name", "personal_info", QuestionType::Text, "p.name")
//!             .required(),
//!     )
//!     .with_response(1, "Ada");
//!
//! let mut session = Session::load(&api).await?;
//! session.next().await?;
//! assert_eq!(api.saved_batches().len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use crate::{ApiError, MealPlan, QuestionDefinition, QuestionId, QuestionnaireApi, Response, UserInfo};

/// A backend that answers from memory.
#[derive(Debug, Default)]
pub struct TestApi {
    questions: Vec<QuestionDefinition>,
    questions_error: Option<ApiError>,
    stored: Vec<Response>,
    responses_error: Option<ApiError>,
    save_failures: Mutex<VecDeque<ApiError>>,
    generate_failures: Mutex<VecDeque<ApiError>>,
    meal_plan: Option<Value>,
    saved: Mutex<Vec<Vec<Response>>>,
    submissions: Mutex<Vec<(UserInfo, Vec<Response>)>>,
}

impl TestApi {
    /// Create an empty backend. Loading a session from it fails until
    /// questions are added.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question(mut self, question: QuestionDefinition) -> Self {
        self.questions.push(question);
        self
    }

    pub fn with_questions(mut self, questions: impl IntoIterator<Item = QuestionDefinition>) -> Self {
        self.questions.extend(questions);
        self
    }

    /// Add a stored answer, served by `fetch_responses`.
    pub fn with_response(mut self, question_id: QuestionId, answer: impl Into<Value>) -> Self {
        self.stored.push(Response::new(question_id, answer));
        self
    }

    /// Make `fetch_questions` fail.
    pub fn with_questions_error(mut self, err: ApiError) -> Self {
        self.questions_error = Some(err);
        self
    }

    /// Make `fetch_responses` fail.
    pub fn with_responses_error(mut self, err: ApiError) -> Self {
        self.responses_error = Some(err);
        self
    }

    /// Fail the next save with `err`. Queued failures are used up in order.
    pub fn failing_save(self, err: ApiError) -> Self {
        lock(&self.save_failures).push_back(err);
        self
    }

    /// Fail the next meal-plan generation with `err`.
    pub fn failing_generate(self, err: ApiError) -> Self {
        lock(&self.generate_failures).push_back(err);
        self
    }

    /// The meal plan returned on successful generation.
    pub fn with_meal_plan(mut self, plan: Value) -> Self {
        self.meal_plan = Some(plan);
        self
    }

    /// Every successful save, in order.
    pub fn saved_batches(&self) -> Vec<Vec<Response>> {
        lock(&self.saved).clone()
    }

    /// Every successful save, flattened.
    pub fn saved_responses(&self) -> Vec<Response> {
        lock(&self.saved).iter().flatten().cloned().collect()
    }

    /// Every successful submission with the user info it carried.
    pub fn submissions(&self) -> Vec<(UserInfo, Vec<Response>)> {
        lock(&self.submissions).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl QuestionnaireApi for TestApi {
    async fn fetch_questions(&self) -> Result<Vec<QuestionDefinition>, ApiError> {
        match &self.questions_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.questions.clone()),
        }
    }

    async fn fetch_responses(&self) -> Result<Vec<Response>, ApiError> {
        match &self.responses_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.stored.clone()),
        }
    }

    async fn save_responses(&self, responses: &[Response]) -> Result<(), ApiError> {
        if let Some(err) = lock(&self.save_failures).pop_front() {
            return Err(err);
        }
        lock(&self.saved).push(responses.to_vec());
        Ok(())
    }

    async fn generate_meal_plan(
        &self,
        user_info: &UserInfo,
        responses: &[Response],
    ) -> Result<MealPlan, ApiError> {
        if let Some(err) = lock(&self.generate_failures).pop_front() {
            return Err(err);
        }
        lock(&self.submissions).push((user_info.clone(), responses.to_vec()));
        let plan = self.meal_plan.clone().unwrap_or_else(|| json!({"meals": []}));
        Ok(MealPlan(plan))
    }
}
