/// Error type for setting up the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}
