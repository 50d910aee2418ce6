//! HTTP transport for the meal-plan questionnaire.
//!
//! [`HttpApi`] implements `QuestionnaireApi` against the REST backend and
//! adds login and registration. [`AdminApi`] covers the dashboard endpoints. Tokens live in an injected
//! `AuthProvider`; [`TokenStore`] is the in-memory one.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mealplan_survey_http::{ClientConfig, HttpApi, TokenStore};
//!
//! let api = HttpApi::new(ClientConfig::from_env(), Arc::new(TokenStore::new()))?;
//! api.login("ada@example.com", "hunter2").await?;
//! let session = mealplan_survey::Session::load(api).await?;
//! ```

mod admin;
pub use admin::AdminApi;

mod auth;
pub use auth::TokenStore;

mod client;
pub use client::HttpApi;

mod config;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

mod error;
pub use error::HttpError;
