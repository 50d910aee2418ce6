use std::fmt;

use crate::{FieldPath, QuestionId, QuestionType};

/// Error type for questionnaire sessions.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    /// The question list was missing, malformed or empty. Fatal to the session.
    #[error("Questionnaire unavailable: {0}")]
    CatalogUnavailable(String),

    /// The current category did not pass validation. Recoverable.
    #[error("{0}")]
    Validation(ValidationFailure),

    /// The backend rejected a save or submission. The message is the server's.
    #[error("{0}")]
    Persistence(String),

    /// The backend answered 401; the token has been cleared.
    #[error("Your session has expired. Please log in again.")]
    AuthExpired,

    /// A save or submission is already outstanding for this session.
    #[error("A save is already in progress")]
    SaveInFlight,

    /// Submission was attempted before reaching the review step.
    #[error("All categories must be completed before submitting")]
    NotAtReview,

    /// No question in the catalog owns this field key.
    #[error("No question is stored at '{0}'")]
    UnknownField(FieldPath),

    /// The value does not have the shape the question type stores.
    #[error("Question '{field_key}' is of type {question_type} and cannot store a {actual} value")]
    AnswerTypeMismatch {
        field_key: FieldPath,
        question_type: QuestionType,
        actual: &'static str,
    },

    /// A radio answer that is not one of the question's options.
    #[error("'{option}' is not an option of '{field_key}'")]
    UnknownOption { field_key: FieldPath, option: String },
}

impl SurveyError {
    /// Map a transport error from a save or submission onto the session taxonomy.
    pub fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::AuthExpired,
            other => Self::Persistence(other.message()),
        }
    }

    /// Check if this error ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CatalogUnavailable(_) | Self::AuthExpired)
    }

    /// Check if this error is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ValidationFailure> for SurveyError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

/// Error type for calls to the questionnaire backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 401.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response from server: {0}")]
    Malformed(String),
}

impl ApiError {
    /// The human-readable message to surface to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a single question failed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldErrorKind {
    Required,
    BelowMin(f64),
    AboveMax(f64),
    TooFewSelections(usize),
    PatternMismatch,
    WaiverNotAccepted,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "This field is required"),
            Self::BelowMin(min) => write!(f, "Value must be at least {min}"),
            Self::AboveMax(max) => write!(f, "Value must be at most {max}"),
            Self::TooFewSelections(n) => write!(f, "Please select at least {n} options"),
            Self::PatternMismatch => write!(f, "Invalid format"),
            Self::WaiverNotAccepted => write!(f, "You must agree to proceed"),
        }
    }
}

/// A validation problem attached to one question.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub question_id: QuestionId,
    pub field_key: FieldPath,
    pub text: String,
    pub kind: FieldErrorKind,

    /// Whether this error prevents leaving the category.
    pub blocking: bool,
}

/// The aggregated result of a failed category validation.
///
/// `message` is the single human-readable string shown to the user; `errors`
/// holds the individual problems behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    /// Errors attached to a specific field.
    pub fn errors_for<'a>(&'a self, field_key: &'a FieldPath) -> impl Iterator<Item = &'a FieldError> {
        self.errors.iter().filter(move |e| &e.field_key == field_key)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth_expired() {
        let err = SurveyError::from_api(ApiError::Unauthorized);
        assert!(matches!(err, SurveyError::AuthExpired));
        assert!(err.is_fatal());
    }

    #[test]
    fn server_message_is_kept_verbatim() {
        let err = SurveyError::from_api(ApiError::Status {
            status: 500,
            message: "Meal plan generation failed: model timeout".into(),
        });
        assert_eq!(err.to_string(), "Meal plan generation failed: model timeout");
        assert!(!err.is_fatal());
    }

    #[test]
    fn field_error_messages() {
        assert_eq!(FieldErrorKind::BelowMin(18.0).to_string(), "Value must be at least 18");
        assert_eq!(
            FieldErrorKind::TooFewSelections(2).to_string(),
            "Please select at least 2 options"
        );
    }
}
