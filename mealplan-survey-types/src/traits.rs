use std::future::Future;

use crate::{ApiError, MealPlan, QuestionDefinition, Response, UserInfo};

/// The questionnaire backend as seen by a session.
///
/// Implemented over HTTP by `mealplan-survey-http` and in memory by
/// `mealplan_survey::TestApi`. Implementors may write these as `async fn`.
pub trait QuestionnaireApi {
    /// `GET /questions`: the active question definitions.
    ///
    /// Individual malformed entries may be skipped; a body that is not a list
    /// is an `ApiError::Malformed`.
    fn fetch_questions(
        &self,
    ) -> impl Future<Output = Result<Vec<QuestionDefinition>, ApiError>> + Send;

    /// `GET /questions/user-responses`: previously stored answers.
    fn fetch_responses(&self) -> impl Future<Output = Result<Vec<Response>, ApiError>> + Send;

    /// `POST /questions/responses`: persist answers.
    fn save_responses(
        &self,
        responses: &[Response],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /meal-plans/generate`: generate a meal plan from the answers.
    fn generate_meal_plan(
        &self,
        user_info: &UserInfo,
        responses: &[Response],
    ) -> impl Future<Output = Result<MealPlan, ApiError>> + Send;
}

impl<T: QuestionnaireApi + Sync> QuestionnaireApi for &T {
    fn fetch_questions(
        &self,
    ) -> impl Future<Output = Result<Vec<QuestionDefinition>, ApiError>> + Send {
        (**self).fetch_questions()
    }

    fn fetch_responses(&self) -> impl Future<Output = Result<Vec<Response>, ApiError>> + Send {
        (**self).fetch_responses()
    }

    fn save_responses(
        &self,
        responses: &[Response],
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).save_responses(responses)
    }

    fn generate_meal_plan(
        &self,
        user_info: &UserInfo,
        responses: &[Response],
    ) -> impl Future<Output = Result<MealPlan, ApiError>> + Send {
        (**self).generate_meal_plan(user_info, responses)
    }
}

/// Access to the bearer token and the reaction to an expired session.
///
/// Injected into the HTTP client instead of reading global storage.
pub trait AuthProvider: Send + Sync {
    /// The current bearer token, if logged in.
    fn token(&self) -> Option<String>;

    /// Store a freshly issued token.
    fn set_token(&self, token: String);

    /// Called when the backend answers 401. Implementations clear the token
    /// and send the user back to the login boundary.
    fn on_unauthorized(&self);
}
