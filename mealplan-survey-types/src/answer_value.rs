use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A single typed answer held in `FormState`.
///
/// The variant is determined by the question's `QuestionType`; the
/// reconciler and the session only ever store the variant the type expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Free text or a single radio choice.
    Text(String),

    /// Number and slider answers.
    Number(f64),

    /// Yes/no answers, including waiver agreements.
    Bool(bool),

    /// Selected options of a checkbox or multiple-choice question, in selection order.
    Choices(Vec<String>),

    /// A described meal.
    Meal(MealInput),

    /// Details about a drink.
    Drink(DrinkDetails),
}

/// Structured answer of a `meal_input` question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealInput {
    pub description: String,
    pub is_home_cooked: bool,
}

impl MealInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            is_home_cooked: false,
        }
    }

    pub fn home_cooked(mut self, is_home_cooked: bool) -> Self {
        self.is_home_cooked = is_home_cooked;
        self
    }
}

/// Structured answer of a `drink_details` question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrinkDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub organic: bool,
    pub additives: Vec<String>,
    pub frequency: String,
    pub quantity: String,
}

impl DrinkDetails {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }
}

impl AnswerValue {
    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get this value as a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as a list of selected options.
    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Choices(choices) => Some(choices),
            _ => None,
        }
    }

    /// Try to get this value as a meal.
    pub fn as_meal(&self) -> Option<&MealInput> {
        match self {
            Self::Meal(meal) => Some(meal),
            _ => None,
        }
    }

    /// Try to get this value as drink details.
    pub fn as_drink(&self) -> Option<&DrinkDetails> {
        match self {
            Self::Drink(drink) => Some(drink),
            _ => None,
        }
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Number(_) => "Number",
            Self::Bool(_) => "Bool",
            Self::Choices(_) => "Choices",
            Self::Meal(_) => "Meal",
            Self::Drink(_) => "Drink",
        }
    }

    /// Whether this value counts as "no answer" when responses are flattened.
    ///
    /// Only an empty string and an empty selection are empty; `false` and `0`
    /// are real answers.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Choices(choices) => choices.is_empty(),
            _ => false,
        }
    }

    /// Convert to the JSON shape the backend stores.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Bool(b) => Value::Bool(*b),
            Self::Choices(choices) => {
                Value::Array(choices.iter().cloned().map(Value::String).collect())
            }
            Self::Meal(meal) => json!({
                "description": meal.description,
                "isHomeCooked": meal.is_home_cooked,
            }),
            Self::Drink(drink) => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String(drink.kind.clone()));
                map.insert("organic".into(), Value::Bool(drink.organic));
                map.insert(
                    "additives".into(),
                    Value::Array(drink.additives.iter().cloned().map(Value::String).collect()),
                );
                map.insert("frequency".into(), Value::String(drink.frequency.clone()));
                map.insert("quantity".into(), Value::String(drink.quantity.clone()));
                Value::Object(map)
            }
        }
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for AnswerValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for AnswerValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(choices: Vec<String>) -> Self {
        Self::Choices(choices)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(choices: Vec<&str>) -> Self {
        Self::Choices(choices.into_iter().map(str::to_string).collect())
    }
}

impl From<MealInput> for AnswerValue {
    fn from(meal: MealInput) -> Self {
        Self::Meal(meal)
    }
}

impl From<DrinkDetails> for AnswerValue {
    fn from(drink: DrinkDetails) -> Self {
        Self::Drink(drink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answers() {
        assert!(AnswerValue::from("").is_empty());
        assert!(AnswerValue::Choices(vec![]).is_empty());
        assert!(!AnswerValue::from(false).is_empty());
        assert!(!AnswerValue::from(0).is_empty());
        assert!(!AnswerValue::from(MealInput::default()).is_empty());
    }

    #[test]
    fn meal_json_uses_camel_case() {
        let meal = AnswerValue::from(MealInput::new("Oats with berries").home_cooked(true));
        assert_eq!(
            meal.to_json(),
            json!({"description": "Oats with berries", "isHomeCooked": true})
        );
    }

    #[test]
    fn drink_json_uses_type_key() {
        let mut drink = DrinkDetails::new("Green tea");
        drink.organic = true;
        drink.additives = vec!["Honey".into()];
        let value = AnswerValue::from(drink).to_json();
        assert_eq!(value["type"], "Green tea");
        assert_eq!(value["organic"], true);
        assert_eq!(value["additives"], json!(["Honey"]));
        assert_eq!(value["frequency"], "");
    }

    #[test]
    fn choices_keep_order() {
        let value = AnswerValue::from(vec!["b", "a"]);
        assert_eq!(value.to_json(), json!(["b", "a"]));
    }

    #[test]
    fn serialize_matches_to_json() {
        let value = AnswerValue::from(3.5);
        assert_eq!(serde_json::to_value(&value).unwrap(), value.to_json());
    }
}
