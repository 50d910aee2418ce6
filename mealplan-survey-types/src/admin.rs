//! Payloads for managing questions and system prompts from the admin dashboard.

use serde::{Deserialize, Serialize};

use crate::{FieldPath, QuestionDefinition, QuestionId, QuestionType, Validation};

/// Error type for drafts that cannot be sent to the backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0} questions must have options")]
    MissingOptions(QuestionType),

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}

/// A question as created or updated by an administrator (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub category: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub validation: Validation,
    pub field_key: FieldPath,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

impl QuestionDraft {
    /// Create a draft for a new, required question.
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        question_type: QuestionType,
        field_key: impl Into<FieldPath>,
    ) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            question_type,
            options: Vec::new(),
            validation: Validation::required(),
            field_key: field_key.into(),
            order: 0,
            is_active: true,
        }
    }

    /// Start editing an existing question.
    pub fn from_definition(question: &QuestionDefinition) -> Self {
        Self {
            text: question.text.clone(),
            category: question.category.clone(),
            question_type: question.question_type,
            options: question.options.clone(),
            validation: question.validation.clone(),
            field_key: question.field_key.clone(),
            order: question.order,
            is_active: question.is_active,
        }
    }

    pub fn with_options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Check the draft and normalize it for saving.
    ///
    /// Options are trimmed and blank ones removed; questions that do not use
    /// options have them cleared.
    pub fn validate(mut self) -> Result<Self, DraftError> {
        let mut missing = Vec::new();
        if self.text.trim().is_empty() {
            missing.push("text");
        }
        if self.category.trim().is_empty() {
            missing.push("category");
        }
        if self.field_key.is_empty() {
            missing.push("field_key");
        }
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }

        if self.question_type.uses_options() {
            self.options = self
                .options
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
            if self.options.is_empty() {
                return Err(DraftError::MissingOptions(self.question_type));
            }
        } else {
            self.options.clear();
        }

        Ok(self)
    }
}

/// New position of one question, as sent to `POST /admin/questions/reorder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOrder {
    pub id: QuestionId,
    pub order: i64,
}

/// Move the question at `from` to position `to` and renumber every question from 0.
///
/// Returns the new `{id, order}` pairs, or nothing if `from` is out of range.
/// A `to` past the end moves the question last.
pub fn reorder_after_move(
    questions: &mut Vec<QuestionDefinition>,
    from: usize,
    to: usize,
) -> Vec<QuestionOrder> {
    if from >= questions.len() {
        return Vec::new();
    }
    let moved = questions.remove(from);
    let to = to.min(questions.len());
    questions.insert(to, moved);

    questions
        .iter_mut()
        .enumerate()
        .map(|(index, question)| {
            question.order = index as i64;
            QuestionOrder {
                id: question.id,
                order: question.order,
            }
        })
        .collect()
}

pub type SystemPromptId = i64;

/// A system prompt used by the backend when generating meal plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPrompt {
    pub id: SystemPromptId,
    pub name: String,
    pub prompt_text: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_by_id: Option<i64>,
}

/// A system prompt as created or updated by an administrator.
///
/// Unset optional fields are left out of the payload so an update keeps the
/// stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemPromptDraft {
    pub name: String,
    pub prompt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl SystemPromptDraft {
    pub fn new(name: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt_text: prompt_text.into(),
            ..Default::default()
        }
    }

    /// Start editing an existing prompt.
    pub fn from_prompt(prompt: &SystemPrompt) -> Self {
        Self {
            name: prompt.name.clone(),
            prompt_text: prompt.prompt_text.clone(),
            description: prompt.description.clone(),
            output_format: prompt.output_format.clone(),
            is_active: Some(prompt.is_active),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = Some(output_format.into());
        self
    }

    /// Check the draft and normalize it for saving.
    ///
    /// The name is trimmed; blank descriptions and output formats are dropped.
    pub fn validate(mut self) -> Result<Self, DraftError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.prompt_text.trim().is_empty() {
            missing.push("prompt_text");
        }
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }

        self.name = self.name.trim().to_string();
        self.description = self.description.filter(|d| !d.trim().is_empty());
        self.output_format = self.output_format.filter(|f| !f.trim().is_empty());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed() {
        let err = QuestionDraft::new(" ", "", QuestionType::Text, "")
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            DraftError::MissingFields(vec!["text", "category", "field_key"])
        );
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields: text, category, field_key"
        );
    }

    #[test]
    fn option_questions_need_options() {
        let err = QuestionDraft::new("Diet?", "goals", QuestionType::Radio, "goals.diet")
            .with_options(["  ", ""])
            .validate()
            .unwrap_err();
        assert_eq!(err, DraftError::MissingOptions(QuestionType::Radio));
        assert_eq!(err.to_string(), "radio questions must have options");
    }

    #[test]
    fn options_are_normalized() {
        let draft = QuestionDraft::new("Diet?", "goals", QuestionType::Checkbox, "goals.diet")
            .with_options([" Vegan ", "", "Keto"])
            .validate()
            .unwrap();
        assert_eq!(draft.options, vec!["Vegan", "Keto"]);

        let text = QuestionDraft::new("Name", "personal_info", QuestionType::Text, "p.name")
            .with_options(["stray"])
            .validate()
            .unwrap();
        assert!(text.options.is_empty());
    }

    #[test]
    fn system_prompts_need_name_and_text() {
        let err = SystemPromptDraft::new("  ", "").validate().unwrap_err();
        assert_eq!(err, DraftError::MissingFields(vec!["name", "prompt_text"]));

        let draft = SystemPromptDraft::new(" Default ", "You are a nutritionist.")
            .with_description(" ")
            .with_output_format("json")
            .validate()
            .unwrap();
        assert_eq!(draft.name, "Default");
        assert_eq!(draft.description, None);

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Default",
                "prompt_text": "You are a nutritionist.",
                "output_format": "json"
            })
        );
    }

    #[test]
    fn system_prompt_tolerates_missing_optionals() {
        let prompt: SystemPrompt = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Keto",
            "prompt_text": "Plan keto meals.",
            "is_active": false
        }))
        .unwrap();
        assert!(!prompt.is_active);
        assert_eq!(prompt.created_by_id, None);

        let draft = SystemPromptDraft::from_prompt(&prompt);
        assert_eq!(draft.is_active, Some(false));
    }

    #[test]
    fn reorder_moves_and_renumbers() {
        let mut questions: Vec<QuestionDefinition> = (1..=4)
            .map(|id| {
                QuestionDefinition::new(id, "q", "goals", QuestionType::Text, format!("g.q{id}"))
                    .with_order(id * 10)
            })
            .collect();

        let orders = reorder_after_move(&mut questions, 3, 0);
        let ids: Vec<_> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![4, 1, 2, 3]);
        assert_eq!(orders[0], QuestionOrder { id: 4, order: 0 });
        assert_eq!(questions[3].order, 3);

        assert!(reorder_after_move(&mut questions, 9, 0).is_empty());
        let orders = reorder_after_move(&mut questions, 0, 99);
        assert_eq!(orders.last().map(|o| o.id), Some(4));
    }
}
