use mealplan_survey_types::{QuestionDefinition, QuestionType, Validation};

pub const PERSONAL_INFO: &str = "personal_info";
pub const GOALS: &str = "goals";
pub const FOOD_INTAKE: &str = "food_intake";
pub const STRESS_LEVELS: &str = "stress_levels";
pub const WAIVER: &str = "WAIVER";

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn question(
    id: i64,
    text: &str,
    category: &str,
    question_type: QuestionType,
    field_key: &str,
) -> QuestionDefinition {
    QuestionDefinition::new(id, text, category, question_type, field_key).with_order(id)
}

/// The intake questionnaire of a nutrition practice: five categories ending
/// in a two-question waiver.
pub fn nutrition_questionnaire() -> Vec<QuestionDefinition> {
    vec![
        // Personal information
        question(1, "What is your full name?", PERSONAL_INFO, QuestionType::Text, "personalInfo.fullName")
            .required(),
        question(2, "What is your sex?", PERSONAL_INFO, QuestionType::Radio, "personalInfo.sex")
            .with_options(["Male", "Female"])
            .required(),
        question(3, "What is your email address?", PERSONAL_INFO, QuestionType::Text, "personalInfo.email")
            .with_validation(Validation::required().with_pattern(EMAIL_PATTERN)),
        question(4, "What is your age?", PERSONAL_INFO, QuestionType::Number, "personalInfo.age")
            .with_validation(Validation::required().with_bounds(Some(18.0), Some(120.0))),
        question(5, "What is your weight (kg)?", PERSONAL_INFO, QuestionType::Number, "personalInfo.weight")
            .with_validation(Validation::required().with_bounds(Some(30.0), Some(300.0))),
        question(
            6,
            "What is your body fat percentage?",
            PERSONAL_INFO,
            QuestionType::Number,
            "personalInfo.bodyFatPercentage",
        )
        .with_validation(Validation::default().with_bounds(Some(0.0), Some(100.0))),
        // Goals
        question(
            10,
            "What are your primary health and fitness goals?",
            GOALS,
            QuestionType::Checkbox,
            "goalsInfo.primaryGoals",
        )
        .with_options(["Weight Loss", "Reduced Body Fat", "Maintenance", "Muscle Gain"])
        .with_validation(Validation::required().with_min_select(1)),
        question(11, "What type of diet do you prefer?", GOALS, QuestionType::Radio, "goalsInfo.preferredDiet")
            .with_options(["keto", "paleo", "carnivore", "other"])
            .required(),
        // Food intake
        question(20, "Describe your typical breakfast", FOOD_INTAKE, QuestionType::MealInput, "foodIntake.dailyMeals.breakfast"),
        question(21, "Describe your typical dinner", FOOD_INTAKE, QuestionType::MealInput, "foodIntake.dailyMeals.dinner"),
        question(22, "Tell us about your coffee", FOOD_INTAKE, QuestionType::DrinkDetails, "foodIntake.coffee"),
        question(23, "Do you drink filtered water?", FOOD_INTAKE, QuestionType::Boolean, "foodIntake.water.isFiltered"),
        question(
            24,
            "What types of artificial sweeteners do you use?",
            FOOD_INTAKE,
            QuestionType::MultipleChoice,
            "foodIntake.artificialSweeteners.types",
        )
        .with_options(["Aspartame", "Sucralose", "Stevia", "Saccharin", "Other"]),
        // Stress levels
        question(30, "What is your current stress level?", STRESS_LEVELS, QuestionType::Slider, "stressLevels.currentLevel")
            .with_validation(Validation::required().with_bounds(Some(0.0), Some(100.0))),
        question(31, "How do you currently manage stress?", STRESS_LEVELS, QuestionType::Text, "stressLevels.managementTechniques"),
        // Waiver
        question(40, "I agree to the terms and conditions", WAIVER, QuestionType::Boolean, "waiver.agreement")
            .required(),
        question(
            41,
            "I will consult my physician before changing my diet",
            WAIVER,
            QuestionType::Boolean,
            "waiver.physicianConsent",
        )
        .required(),
    ]
}
