//! Step-by-step terminal wizard for the meal-plan questionnaire, built on `dialoguer`.
//!
//! One category is asked at a time. Leaving a category saves its answers;
//! the last step shows a review and submits for meal-plan generation.

mod wizard;
pub use wizard::{DialoguerWizard, WizardError};
