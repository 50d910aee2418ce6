use std::sync::Arc;

use mealplan_survey_types::wire::{GenerateRequest, SaveResponsesRequest};
use mealplan_survey_types::{
    ApiError, AuthProvider, DraftError, MealPlan, QuestionDefinition, QuestionnaireApi,
    Registration, Response, UserAccount, UserInfo,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ClientConfig, HttpError, TokenStore};

/// The questionnaire backend over HTTP.
///
/// Every request carries the current bearer token. A 401 answer hands control
/// to the `AuthProvider` before the error is returned.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    config: ClientConfig,
    auth: Arc<dyn AuthProvider>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

impl HttpApi {
    pub fn new(config: ClientConfig, auth: Arc<dyn AuthProvider>) -> Result<Self, HttpError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HttpError::InvalidBaseUrl(config.base_url));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            config,
            auth,
        })
    }

    /// Client configured from the environment with an empty token store.
    pub fn from_env() -> Result<Self, HttpError> {
        Self::new(ClientConfig::from_env(), Arc::new(TokenStore::new()))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    /// Log in with email and password and store the issued token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.config.endpoint("/users/login"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match status {
                StatusCode::UNAUTHORIZED => "Invalid email or password".to_string(),
                StatusCode::FORBIDDEN => detail(&body)
                    .unwrap_or_else(|| "Login failed. Please try again.".to_string()),
                _ => "Login failed. Please try again.".to_string(),
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        self.auth.set_token(login.access_token);
        log::info!("Logged in as {email}");
        Ok(())
    }

    /// Create an account. It cannot log in until an administrator approves it.
    ///
    /// The registration is checked locally first; problems come back as a 422.
    pub async fn register(&self, registration: Registration) -> Result<UserAccount, ApiError> {
        let registration = registration.validate().map_err(draft_rejected)?;
        let account: UserAccount = self
            .read_json(
                self.client
                    .post(self.config.endpoint("/users/register"))
                    .json(&registration),
            )
            .await?;
        log::info!("Registered {}; awaiting approval", account.email);
        Ok(account)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.config.endpoint(path));
        match self.auth.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and turn non-success statuses into `ApiError`s.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Request to {} was unauthorized", response.url().path());
            self.auth.on_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        Ok(response)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.read_json(self.request(Method::GET, path)).await
    }

    /// Send a request and deserialize the success body.
    pub(crate) async fn read_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

impl QuestionnaireApi for HttpApi {
    async fn fetch_questions(&self) -> Result<Vec<QuestionDefinition>, ApiError> {
        let body: Value = self.get_json("/questions").await?;
        parse_questions(body)
    }

    async fn fetch_responses(&self) -> Result<Vec<Response>, ApiError> {
        let body: Value = self.get_json("/questions/user-responses").await?;
        parse_responses(body)
    }

    async fn save_responses(&self, responses: &[Response]) -> Result<(), ApiError> {
        let body = SaveResponsesRequest { responses };
        self.send(self.request(Method::POST, "/questions/responses").json(&body))
            .await?;
        log::debug!("Saved {} responses", responses.len());
        Ok(())
    }

    async fn generate_meal_plan(
        &self,
        user_info: &UserInfo,
        responses: &[Response],
    ) -> Result<MealPlan, ApiError> {
        let body = GenerateRequest {
            user_info,
            responses,
        };
        self.read_json(self.request(Method::POST, "/meal-plans/generate").json(&body))
            .await
            .map(MealPlan)
    }
}

/// Reject an invalid draft locally, with the status the backend would use.
pub(crate) fn draft_rejected(err: DraftError) -> ApiError {
    ApiError::Status {
        status: 422,
        message: err.to_string(),
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Transport("The server took too long to respond".to_string())
    } else if err.is_connect() {
        ApiError::Transport(
            "Unable to connect to the server. Please check if the backend is running.".to_string(),
        )
    } else {
        ApiError::Transport(err.to_string())
    }
}

/// The `detail` field of an error body, as the backend sends it.
///
/// Validation errors carry a list of `{"msg": ...}` objects instead of a string.
fn detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// The message to surface for a failed request: the server's `detail`, the
/// raw body, or the status itself.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Some(detail) = detail(body) {
        return detail;
    }
    let body = body.trim();
    if !body.is_empty() && !body.starts_with('<') {
        return body.to_string();
    }
    match status.canonical_reason() {
        Some(reason) => format!("Request failed ({} {reason})", status.as_u16()),
        None => format!("Request failed ({})", status.as_u16()),
    }
}

/// Parse a list body, skipping entries that do not deserialize.
pub(crate) fn parse_list<T: DeserializeOwned>(body: Value, what: &str) -> Result<Vec<T>, ApiError> {
    let Value::Array(items) = body else {
        return Err(ApiError::Malformed(format!("expected a list of {what}")));
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("Skipping malformed {what} entry {index}: {e}");
                None
            }
        })
        .collect())
}

pub(crate) fn parse_questions(body: Value) -> Result<Vec<QuestionDefinition>, ApiError> {
    parse_list(body, "questions")
}

pub(crate) fn parse_responses(body: Value) -> Result<Vec<Response>, ApiError> {
    parse_list(body, "responses")
}

#[cfg(test)]
mod tests {
    use super::*;
    use example_catalogs::quick_start_json;
    use serde_json::json;

    #[test]
    fn malformed_questions_are_skipped() {
        let questions = parse_questions(quick_start_json()).unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id).collect();
        // the unknown `date_picker` type is dropped, the rest is kept as sent
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(questions[1].sub_questions.len(), 1);
        assert!(!questions[2].is_active);
    }

    #[test]
    fn non_list_body_is_malformed() {
        assert!(matches!(
            parse_questions(json!({"detail": "oops"})),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn responses_tolerate_missing_answers() {
        let responses = parse_responses(json!([
            {"question_id": 1, "answer": "Ada"},
            {"question_id": 2},
            {"answer": "no id"}
        ]))
        .unwrap();
        assert_eq!(
            responses,
            vec![Response::new(1, "Ada"), Response::new(2, Value::Null)]
        );
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"detail": "Question not found"}"#),
            "Question not found"
        );
        assert_eq!(
            error_message(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"detail": [{"msg": "field required"}, {"msg": "value is not a valid integer"}]}"#
            ),
            "field required; value is not a valid integer"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream timed out"),
            "upstream timed out"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "Request failed (500 Internal Server Error)"
        );
    }

    #[tokio::test]
    async fn invalid_registration_is_rejected_before_sending() {
        // nothing listens here; a request would fail as a transport error
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9");
        let api = HttpApi::new(config, Arc::new(TokenStore::new())).unwrap();

        let err = api
            .register(Registration::new("ada@example.com", "short"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), "Password must be at least 6 characters");
    }

    #[test]
    fn rejects_relative_base_url() {
        let config = ClientConfig::default().with_base_url("localhost:8000");
        assert!(matches!(
            HttpApi::new(config, Arc::new(TokenStore::new())),
            Err(HttpError::InvalidBaseUrl(_))
        ));
    }
}
