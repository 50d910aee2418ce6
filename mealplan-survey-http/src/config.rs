use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BASE_URL_VAR: &str = "MEALPLAN_API_URL";
const TIMEOUT_VAR: &str = "MEALPLAN_API_TIMEOUT_SECS";

/// Where and how to reach the questionnaire backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8000/api`. Endpoint paths are appended to it.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("mealplan-survey/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `MEALPLAN_API_URL` and `MEALPLAN_API_TIMEOUT_SECS`, falling back
    /// to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match env::var(BASE_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => config.base_url = url.trim().to_string(),
            _ => log::debug!("{BASE_URL_VAR} not set, using default: {DEFAULT_BASE_URL}"),
        }

        if let Ok(secs) = env::var(TIMEOUT_VAR) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(e) => log::warn!("Invalid {TIMEOUT_VAR} value '{secs}': {e}"),
            }
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Full URL of an endpoint, e.g. `endpoint("/questions")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
