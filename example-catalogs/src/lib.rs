//! Question catalogs and stored answers for tests and demos.

pub mod nutrition;
pub mod quick_start;
pub mod stored;

pub use nutrition::{
    FOOD_INTAKE, GOALS, PERSONAL_INFO, STRESS_LEVELS, WAIVER, nutrition_questionnaire,
};
pub use quick_start::{quick_start, quick_start_json};
pub use stored::{messy_stored_responses, returning_user_responses};
