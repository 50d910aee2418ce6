use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{AnswerValue, DrinkDetails, FieldPath, MealInput};

/// Identifier of a question as assigned by the backend.
pub type QuestionId = i64;

/// A single question as defined by the backend.
///
/// Definitions are fetched once per session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: QuestionId,

    /// The prompt shown to the user. Also used verbatim in validation messages.
    pub text: String,

    /// Name of the category (wizard step) this question belongs to.
    pub category: String,

    pub question_type: QuestionType,

    /// Allowed choices for radio, checkbox and multiple-choice questions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,

    /// Position in the questionnaire. Lower comes first.
    #[serde(default)]
    pub order: i64,

    /// Where the answer lives in the form state.
    pub field_key: FieldPath,

    #[serde(default, deserialize_with = "null_as_default")]
    pub validation: Validation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<QuestionId>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub sub_questions: Vec<QuestionDefinition>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QuestionDefinition {
    /// Create a new question with no options and no validation rules.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        category: impl Into<String>,
        question_type: QuestionType,
        field_key: impl Into<FieldPath>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            category: category.into(),
            question_type,
            options: Vec::new(),
            order: 0,
            field_key: field_key.into(),
            validation: Validation::default(),
            parent_id: None,
            sub_questions: Vec::new(),
            is_active: true,
        }
    }

    /// Set the order.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Set the allowed options.
    pub fn with_options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the validation rules.
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// Mark the question as required.
    pub fn required(mut self) -> Self {
        self.validation.required = true;
        self
    }

    /// Whether `option` is one of the declared choices.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Validation rules attached to a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Validation {
    pub required: bool,

    /// Inclusive lower bound for numeric answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Inclusive upper bound for numeric answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Minimum number of selected options for choice questions.
    #[serde(rename = "minSelect", skip_serializing_if = "Option::is_none")]
    pub min_select: Option<usize>,

    /// Regular expression text answers must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Validation {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Set numeric bounds.
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_min_select(mut self, min_select: usize) -> Self {
        self.min_select = Some(min_select);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// The kind of question, determining the shape of its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Free text.
    Text,

    /// A number typed by the user.
    Number,

    /// Yes/no.
    Boolean,

    /// Pick any number of options (rendered as a list).
    MultipleChoice,

    /// Pick exactly one option.
    Radio,

    /// Pick any number of options (rendered as checkboxes).
    Checkbox,

    /// A number picked on a scale, bounded by `min`/`max` (default 0..=100).
    Slider,

    /// Description of a meal plus whether it was home cooked.
    MealInput,

    /// Type, additives, frequency and quantity of a drink.
    DrinkDetails,
}

impl QuestionType {
    /// Every question type, in declaration order.
    pub const ALL: [QuestionType; 9] = [
        Self::Text,
        Self::Number,
        Self::Boolean,
        Self::MultipleChoice,
        Self::Radio,
        Self::Checkbox,
        Self::Slider,
        Self::MealInput,
        Self::DrinkDetails,
    ];

    /// The wire name of this type, e.g. `"multiple_choice"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::MultipleChoice => "multiple_choice",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Slider => "slider",
            Self::MealInput => "meal_input",
            Self::DrinkDetails => "drink_details",
        }
    }

    /// Questions that need a declared list of options.
    pub fn uses_options(&self) -> bool {
        matches!(self, Self::MultipleChoice | Self::Radio | Self::Checkbox)
    }

    /// Whether `value` has the shape this question type stores.
    pub fn accepts(&self, value: &AnswerValue) -> bool {
        matches!(
            (self, value),
            (Self::Text | Self::Radio, AnswerValue::Text(_))
                | (Self::Number | Self::Slider, AnswerValue::Number(_))
                | (Self::Boolean, AnswerValue::Bool(_))
                | (Self::MultipleChoice | Self::Checkbox, AnswerValue::Choices(_))
                | (Self::MealInput, AnswerValue::Meal(_))
                | (Self::DrinkDetails, AnswerValue::Drink(_))
        )
    }

    /// The value a question of this type falls back to when stored data is unusable.
    pub fn default_answer(&self) -> AnswerValue {
        match self {
            Self::Text | Self::Radio => AnswerValue::Text(String::new()),
            Self::Number | Self::Slider => AnswerValue::Number(0.0),
            Self::Boolean => AnswerValue::Bool(false),
            Self::MultipleChoice | Self::Checkbox => AnswerValue::Choices(Vec::new()),
            Self::MealInput => AnswerValue::Meal(MealInput::default()),
            Self::DrinkDetails => AnswerValue::Drink(DrinkDetails::default()),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
