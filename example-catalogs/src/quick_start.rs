use mealplan_survey_types::{QuestionDefinition, QuestionType};
use serde_json::{Value, json};

/// A single required question, the smallest questionnaire that can be completed.
pub fn quick_start() -> Vec<QuestionDefinition> {
    vec![
        QuestionDefinition::new(1, "What should we call you?", "A", QuestionType::Text, "a.name")
            .required(),
    ]
}

/// A `GET /questions` body as the backend sends it, with the quirks clients
/// have to tolerate: `null` options and validation, an inactive question,
/// nested sub-questions and an entry of an unknown type.
pub fn quick_start_json() -> Value {
    json!([
        {
            "id": 1,
            "text": "What should we call you?",
            "category": "A",
            "question_type": "text",
            "options": null,
            "validation": {"required": true},
            "field_key": "a.name",
            "order": 1,
            "is_active": true
        },
        {
            "id": 2,
            "text": "Do you eat snacks?",
            "category": "A",
            "question_type": "boolean",
            "options": null,
            "validation": null,
            "field_key": "a.snacks",
            "order": 2,
            "is_active": true,
            "sub_questions": [
                {
                    "id": 3,
                    "text": "Which snacks?",
                    "category": "A",
                    "question_type": "checkbox",
                    "options": ["Nuts", "Fruit", "Chips"],
                    "validation": {"required": false, "minSelect": 1},
                    "field_key": "a.snackTypes",
                    "order": 3,
                    "parent_id": 2,
                    "is_active": true
                }
            ]
        },
        {
            "id": 4,
            "text": "Retired question",
            "category": "A",
            "question_type": "text",
            "field_key": "a.retired",
            "order": 4,
            "is_active": false
        },
        {
            "id": 5,
            "text": "Pick a date",
            "category": "A",
            "question_type": "date_picker",
            "field_key": "a.date",
            "order": 5,
            "is_active": true
        }
    ])
}
