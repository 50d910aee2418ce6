//! # mealplan-survey
//!
//! Schema-driven questionnaire engine for meal-plan generation. Transport-agnostic.
//!
//! The backend defines the questions; this crate turns them into a guided,
//! category-by-category session:
//!
//! - [`reconcile`] coerces previously stored answers into typed form values
//! - [`validate`] checks a category before the user may leave it
//! - [`Navigator`] steps through the categories and into review
//! - [`Session`] ties these together, saving each category as it is completed
//!   and submitting the whole questionnaire for meal-plan generation
//! - [`ReviewSummary`] formats the answers for the final review
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mealplan_survey::Session;
//!
//! let mut session = Session::load(api).await?;
//! while !session.is_review() {
//!     let keys: Vec<_> = session
//!         .current_questions()
//!         .iter()
//!         .map(|q| q.field_key.clone())
//!         .collect();
//!     for key in keys {
//!         // ask the user, then:
//!         session.set_answer(key, answer)?;
//!     }
//!     session.next().await?;
//! }
//! let plan = session.submit_form().await?;
//! ```
//!
//! The backend is anything implementing [`QuestionnaireApi`]: the HTTP client
//! in `mealplan-survey-http`, or [`TestApi`] in tests.

pub use mealplan_survey_types::*;

pub mod reconcile;
pub use reconcile::{ReconcileReport, ReconciliationDefault};

pub mod validate;

mod navigator;
pub use navigator::{Navigator, Step};

mod review;
pub use review::{ReviewEntry, ReviewSection, ReviewSummary, format_answer};

mod session;
pub use session::{NextMove, PendingSave, PendingSubmit, Session};

// In-memory backend for testing sessions without a server
mod test_api;
pub use test_api::TestApi;
