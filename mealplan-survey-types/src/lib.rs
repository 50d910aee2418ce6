//! Core types for the meal-plan questionnaire.
//!
//! This crate provides the foundational types shared by the engine and the
//! transport:
//! - `QuestionDefinition`, `QuestionType` and `Validation` - questions as the backend defines them
//! - `Catalog` and `Category` - the ordered question set of one session
//! - `FieldPath`, `AnswerValue` and `FormState` - typed answers keyed by dotted paths
//! - `Response`, `UserInfo` and `MealPlan` - wire payloads
//! - `QuestionnaireApi` and `AuthProvider` traits - the seams to the backend
//! - `QuestionDraft`, `SystemPromptDraft` and `Registration` - admin and account payloads

mod field_path;
pub use field_path::FieldPath;

mod answer_value;
pub use answer_value::{AnswerValue, DrinkDetails, MealInput};

mod form_state;
pub use form_state::{FormState, FormStateError};

mod question;
pub use question::{QuestionDefinition, QuestionId, QuestionType, Validation};

mod catalog;
pub use catalog::{Catalog, Category, WAIVER_CATEGORY};

pub mod admin;
pub use admin::{
    DraftError, QuestionDraft, QuestionOrder, SystemPrompt, SystemPromptDraft, SystemPromptId,
    reorder_after_move,
};

mod account;
pub use account::{MIN_PASSWORD_LEN, PendingUser, Registration, UserAccount, UserId};

pub mod wire;
pub use wire::{MealPlan, Response, UserInfo};

mod error;
pub use error::{ApiError, FieldError, FieldErrorKind, SurveyError, ValidationFailure};

mod traits;
pub use traits::{AuthProvider, QuestionnaireApi};
