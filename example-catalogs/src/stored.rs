//! Stored answers for the nutrition questionnaire.

use mealplan_survey_types::Response;
use serde_json::{Value, json};

/// A user who completed personal information and goals, then left.
pub fn returning_user_responses() -> Vec<Response> {
    vec![
        Response::new(1, "Ada Lovelace"),
        Response::new(2, "Female"),
        Response::new(3, "ada@example.com"),
        Response::new(4, 36),
        Response::new(5, 61.5),
        Response::new(10, json!(["Muscle Gain", "Maintenance"])),
        Response::new(11, "paleo"),
    ]
}

/// Answers saved by older clients, in shapes that need coercion.
pub fn messy_stored_responses() -> Vec<Response> {
    vec![
        // number as string
        Response::new(4, "36"),
        // option removed since
        Response::new(11, "vegan"),
        // single selection saved as plain string
        Response::new(10, "Weight Loss"),
        // meal saved as text
        Response::new(20, "Eggs and toast"),
        Response::new(22, json!({"type": "Espresso", "organic": "true", "additives": "Sugar"})),
        Response::new(23, "TRUE"),
        Response::new(30, json!({"value": "45"})),
        Response::new(31, Value::Null),
        // question deleted since
        Response::new(999, "orphan"),
    ]
}
