//! Dialoguer front end for a questionnaire [`Session`].

use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use dialoguer::{Confirm, FuzzySelect, Input, MultiSelect, Select};
use mealplan_survey::validate::check_question;
use mealplan_survey::{
    AnswerValue, DrinkDetails, FieldErrorKind, MealInput, MealPlan, QuestionDefinition,
    QuestionType, QuestionnaireApi, ReviewSummary, Session, Step, SurveyError,
};
use thiserror::Error;

/// Radio questions with more options than this get a fuzzy finder.
const FUZZY_THRESHOLD: usize = 8;

/// Error type for the wizard.
#[derive(Debug, Error)]
pub enum WizardError {
    /// User cancelled the wizard (e.g., pressed Ctrl+C or Escape).
    #[error("Questionnaire cancelled by user")]
    Cancelled,

    /// An I/O error occurred during prompting.
    #[error("Dialoguer error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// The session could not continue.
    #[error(transparent)]
    Survey(#[from] SurveyError),
}

fn is_cancelled(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(io_err) if io_err.kind() == std::io::ErrorKind::Interrupted)
}

fn prompt_error(err: dialoguer::Error) -> WizardError {
    if is_cancelled(&err) {
        WizardError::Cancelled
    } else {
        WizardError::Dialoguer(err)
    }
}

/// Walks the user through a session, one category at a time.
#[derive(Debug, Default, Clone)]
pub struct DialoguerWizard {
    colorful: bool,
}

enum Action {
    Next,
    Back,
}

impl DialoguerWizard {
    /// Create a wizard with the colorful theme.
    pub fn new() -> Self {
        Self { colorful: true }
    }

    /// Create a wizard with the plain (no color) theme.
    pub fn plain() -> Self {
        Self { colorful: false }
    }

    fn theme(&self) -> Box<dyn Theme> {
        if self.colorful {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        }
    }

    /// Run the questionnaire until the meal plan is generated.
    ///
    /// Validation and save failures are shown and the step is asked again.
    /// Only fatal session errors and cancellation end the run early.
    pub async fn run<A: QuestionnaireApi>(
        &self,
        session: &mut Session<A>,
    ) -> Result<MealPlan, WizardError> {
        loop {
            match session.step() {
                Step::Category(_) => self.category_step(session).await?,
                Step::Review => {
                    if let Some(plan) = self.review_step(session).await? {
                        return Ok(plan);
                    }
                }
            }
        }
    }

    async fn category_step<A: QuestionnaireApi>(
        &self,
        session: &mut Session<A>,
    ) -> Result<(), WizardError> {
        let Some(category) = session.current_category().cloned() else {
            return Ok(());
        };
        let (position, total) = session.navigator().progress();
        println!();
        println!("[{position}/{total}] {}", category.title());

        let questions: Vec<QuestionDefinition> =
            session.current_questions().into_iter().cloned().collect();
        for question in &questions {
            self.ask_question(session, question, category.is_waiver())?;
        }

        match self.choose_action(!session.navigator().is_first(), "Continue")? {
            Action::Back => {
                session.back();
            }
            Action::Next => match session.next().await {
                Ok(step) => log::debug!("Moved to {step:?}"),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => println!("Error: {e}"),
            },
        }
        Ok(())
    }

    async fn review_step<A: QuestionnaireApi>(
        &self,
        session: &mut Session<A>,
    ) -> Result<Option<MealPlan>, WizardError> {
        let summary = session.review();
        println!();
        print_review(&summary);

        match self.choose_action(true, "Submit")? {
            Action::Back => {
                session.back();
                Ok(None)
            }
            Action::Next => match session.submit_form().await {
                Ok(plan) => Ok(Some(plan)),
                Err(e) if e.is_fatal() => Err(e.into()),
                Err(e) => {
                    println!("Error: {e}");
                    Ok(None)
                }
            },
        }
    }

    fn choose_action(&self, can_go_back: bool, next_label: &str) -> Result<Action, WizardError> {
        if !can_go_back {
            return Ok(Action::Next);
        }
        let theme = self.theme();
        let selection = Select::with_theme(&*theme)
            .items(&[next_label, "Back"])
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(if selection == 0 { Action::Next } else { Action::Back })
    }

    /// Ask one question, prefilled with its current answer, and store the result.
    fn ask_question<A>(
        &self,
        session: &mut Session<A>,
        question: &QuestionDefinition,
        waiver: bool,
    ) -> Result<(), WizardError> {
        let key = question.field_key.clone();
        let current = session.answer(&key).cloned();
        let prompt = if question.validation.required {
            format!("{} *", question.text)
        } else {
            question.text.clone()
        };

        loop {
            let answer = self.prompt_answer(question, &prompt, current.as_ref(), waiver)?;
            let problems: Vec<String> = check_question(question, answer.as_ref())
                .into_iter()
                .filter(|e| e.blocking && e.kind != FieldErrorKind::Required)
                .map(|e| e.kind.to_string())
                .collect();
            if !problems.is_empty() {
                println!("Error: {}", problems.join(", "));
                continue;
            }

            match answer {
                Some(value) => session.set_answer(key, value)?,
                None => {
                    session.clear_answer(&key);
                }
            }
            return Ok(());
        }
    }

    fn prompt_answer(
        &self,
        question: &QuestionDefinition,
        prompt: &str,
        current: Option<&AnswerValue>,
        waiver: bool,
    ) -> Result<Option<AnswerValue>, WizardError> {
        match question.question_type {
            QuestionType::Text => {
                let text = self.ask_text(prompt, current.and_then(AnswerValue::as_str))?;
                Ok(non_empty(text).map(AnswerValue::Text))
            }
            QuestionType::Number | QuestionType::Slider => self.ask_number(question, prompt, current),
            QuestionType::Boolean => {
                let default = current.and_then(AnswerValue::as_bool).unwrap_or(false);
                let prompt = if waiver {
                    format!("{prompt} (agree?)")
                } else {
                    prompt.to_string()
                };
                Ok(Some(AnswerValue::Bool(self.ask_confirm(&prompt, default)?)))
            }
            QuestionType::Radio => self.ask_radio(question, prompt, current),
            QuestionType::Checkbox | QuestionType::MultipleChoice => {
                let theme = self.theme();
                let flags = selected_flags(
                    &question.options,
                    current.and_then(AnswerValue::as_choices).unwrap_or_default(),
                );
                let picked = MultiSelect::with_theme(&*theme)
                    .with_prompt(prompt)
                    .items(question.options.as_slice())
                    .defaults(&flags)
                    .interact()
                    .map_err(prompt_error)?;
                let choices: Vec<String> = picked
                    .into_iter()
                    .filter_map(|i| question.options.get(i).cloned())
                    .collect();
                Ok((!choices.is_empty()).then_some(AnswerValue::Choices(choices)))
            }
            QuestionType::MealInput => self.ask_meal(prompt, current.and_then(AnswerValue::as_meal)),
            QuestionType::DrinkDetails => {
                self.ask_drink(prompt, current.and_then(AnswerValue::as_drink))
            }
        }
    }

    fn ask_text(&self, prompt: &str, initial: Option<&str>) -> Result<String, WizardError> {
        let theme = self.theme();
        let mut input = Input::<String>::with_theme(&*theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        input.interact_text().map_err(prompt_error)
    }

    fn ask_confirm(&self, prompt: &str, default: bool) -> Result<bool, WizardError> {
        let theme = self.theme();
        Confirm::with_theme(&*theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn ask_number(
        &self,
        question: &QuestionDefinition,
        prompt: &str,
        current: Option<&AnswerValue>,
    ) -> Result<Option<AnswerValue>, WizardError> {
        let (min, max) = bounds(question);
        let hint = match (min, max) {
            (Some(min), Some(max)) => format!("{prompt} ({min}-{max})"),
            _ => prompt.to_string(),
        };
        let initial = current.and_then(AnswerValue::as_number).map(|n| n.to_string());

        loop {
            let input = self.ask_text(&hint, initial.as_deref())?;
            match parse_number(&input, min, max) {
                Ok(number) => return Ok(number.map(AnswerValue::Number)),
                Err(msg) => println!("Error: {msg}"),
            }
        }
    }

    fn ask_radio(
        &self,
        question: &QuestionDefinition,
        prompt: &str,
        current: Option<&AnswerValue>,
    ) -> Result<Option<AnswerValue>, WizardError> {
        if question.options.is_empty() {
            log::warn!("Radio question {} has no options, skipping", question.id);
            return Ok(current.cloned());
        }
        let theme = self.theme();
        let default = default_index(&question.options, current.and_then(AnswerValue::as_str));

        let selection = if question.options.len() > FUZZY_THRESHOLD {
            FuzzySelect::with_theme(&*theme)
                .with_prompt(prompt)
                .items(question.options.as_slice())
                .default(default)
                .interact()
        } else {
            Select::with_theme(&*theme)
                .with_prompt(prompt)
                .items(question.options.as_slice())
                .default(default)
                .interact()
        }
        .map_err(prompt_error)?;

        Ok(question
            .options
            .get(selection)
            .map(|option| AnswerValue::Text(option.clone())))
    }

    fn ask_meal(
        &self,
        prompt: &str,
        current: Option<&MealInput>,
    ) -> Result<Option<AnswerValue>, WizardError> {
        println!("{prompt}");
        let description =
            self.ask_text("  Description", current.map(|m| m.description.as_str()))?;
        let Some(description) = non_empty(description) else {
            return Ok(None);
        };
        let home_cooked = self.ask_confirm(
            "  Home-cooked?",
            current.is_some_and(|m| m.is_home_cooked),
        )?;
        Ok(Some(AnswerValue::Meal(
            MealInput::new(description).home_cooked(home_cooked),
        )))
    }

    fn ask_drink(
        &self,
        prompt: &str,
        current: Option<&DrinkDetails>,
    ) -> Result<Option<AnswerValue>, WizardError> {
        println!("{prompt}");
        let kind = self.ask_text("  Type", current.map(|d| d.kind.as_str()))?;
        let Some(kind) = non_empty(kind) else {
            return Ok(None);
        };

        let organic = self.ask_confirm("  Organic?", current.is_some_and(|d| d.organic))?;
        let additives = current.map(|d| d.additives.join(", "));
        let additives = self.ask_text("  Additives (comma separated)", additives.as_deref())?;
        let frequency = self.ask_text("  How often?", current.map(|d| d.frequency.as_str()))?;
        let quantity = self.ask_text("  How much?", current.map(|d| d.quantity.as_str()))?;

        Ok(Some(AnswerValue::Drink(DrinkDetails {
            kind,
            organic,
            additives: parse_additives(&additives),
            frequency: frequency.trim().to_string(),
            quantity: quantity.trim().to_string(),
        })))
    }
}

fn print_review(summary: &ReviewSummary) {
    println!("Review your answers");
    for section in &summary.sections {
        println!();
        println!("{}", section.title);
        for entry in &section.entries {
            println!("  {}: {}", entry.text, entry.answer);
        }
    }

    let unagreed = summary.unagreed_waivers();
    if !unagreed.is_empty() {
        println!();
        println!("The following terms still need your agreement:");
        for entry in unagreed {
            println!("  • {}", entry.text);
        }
    }
    println!();
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Numeric bounds enforced at the prompt.
///
/// Only required questions are held to their `min`/`max`, matching what blocks
/// leaving the category. Sliders still run from 0 to 100.
fn bounds(question: &QuestionDefinition) -> (Option<f64>, Option<f64>) {
    let rules = &question.validation;
    let (min, max) = if rules.required {
        (rules.min, rules.max)
    } else {
        (None, None)
    };
    match question.question_type {
        QuestionType::Slider => (min.or(Some(0.0)), max.or(Some(100.0))),
        _ => (min, max),
    }
}

/// Parse a typed number. Empty input clears the answer.
fn parse_number(input: &str, min: Option<f64>, max: Option<f64>) -> Result<Option<f64>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let number: f64 = input
        .parse()
        .ok()
        .filter(|n: &f64| n.is_finite())
        .ok_or_else(|| format!("'{input}' is not a number"))?;

    if let Some(min) = min
        && number < min
    {
        return Err(FieldErrorKind::BelowMin(min).to_string());
    }
    if let Some(max) = max
        && number > max
    {
        return Err(FieldErrorKind::AboveMax(max).to_string());
    }
    Ok(Some(number))
}

fn parse_additives(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_index(options: &[String], current: Option<&str>) -> usize {
    current
        .and_then(|current| options.iter().position(|o| o == current))
        .unwrap_or(0)
}

fn selected_flags(options: &[String], selected: &[String]) -> Vec<bool> {
    options.iter().map(|o| selected.contains(o)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealplan_survey::Validation;

    fn options() -> Vec<String> {
        vec!["Weight loss".into(), "Maintenance".into(), "Muscle gain".into()]
    }

    #[test]
    fn wizard_creation() {
        assert!(DialoguerWizard::new().colorful);
        assert!(!DialoguerWizard::plain().colorful);
    }

    #[test]
    fn error_types() {
        assert_eq!(
            WizardError::Cancelled.to_string(),
            "Questionnaire cancelled by user"
        );
        assert_eq!(
            WizardError::from(SurveyError::AuthExpired).to_string(),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn interrupted_io_is_cancellation() {
        let err = dialoguer::Error::IO(std::io::Error::from(std::io::ErrorKind::Interrupted));
        assert!(matches!(prompt_error(err), WizardError::Cancelled));
        let err = dialoguer::Error::IO(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(matches!(prompt_error(err), WizardError::Dialoguer(_)));
    }

    #[test]
    fn numbers_respect_bounds() {
        assert_eq!(parse_number(" 36 ", Some(18.0), Some(120.0)), Ok(Some(36.0)));
        assert_eq!(parse_number("", Some(18.0), None), Ok(None));
        assert_eq!(
            parse_number("12", Some(18.0), None),
            Err("Value must be at least 18".to_string())
        );
        assert_eq!(
            parse_number("101", None, Some(100.0)),
            Err("Value must be at most 100".to_string())
        );
        assert!(parse_number("NaN", None, None).is_err());
        assert!(parse_number("lots", None, None).is_err());
    }

    #[test]
    fn sliders_default_to_percent_range() {
        let slider = QuestionDefinition::new(30, "Stress", "stress_levels", QuestionType::Slider, "s.level");
        assert_eq!(bounds(&slider), (Some(0.0), Some(100.0)));

        let number = QuestionDefinition::new(4, "Age", "personal_info", QuestionType::Number, "p.age");
        assert_eq!(bounds(&number), (None, None));
    }

    #[test]
    fn optional_numbers_skip_bounds() {
        let adult = Validation::default().with_bounds(Some(18.0), Some(120.0));
        let optional = QuestionDefinition::new(4, "Age", "personal_info", QuestionType::Number, "p.age")
            .with_validation(adult);
        assert_eq!(bounds(&optional), (None, None));
        let (min, max) = bounds(&optional);
        assert_eq!(parse_number("12", min, max), Ok(Some(12.0)));

        let required = optional.clone().required();
        assert_eq!(bounds(&required), (Some(18.0), Some(120.0)));
        let (min, max) = bounds(&required);
        assert!(parse_number("12", min, max).is_err());

        let slider = QuestionDefinition::new(30, "Stress", "stress_levels", QuestionType::Slider, "s.level")
            .with_validation(Validation::default().with_bounds(Some(1.0), Some(10.0)));
        assert_eq!(bounds(&slider), (Some(0.0), Some(100.0)));
        assert_eq!(bounds(&slider.required()), (Some(1.0), Some(10.0)));
    }

    #[test]
    fn additives_are_split_and_trimmed() {
        assert_eq!(
            parse_additives("sugar, , milk ,honey"),
            vec!["sugar", "milk", "honey"]
        );
        assert!(parse_additives("  ").is_empty());
    }

    #[test]
    fn radio_default_follows_current_answer() {
        assert_eq!(default_index(&options(), Some("Muscle gain")), 2);
        assert_eq!(default_index(&options(), Some("Bulking")), 0);
        assert_eq!(default_index(&options(), None), 0);
    }

    #[test]
    fn multi_select_flags_follow_current_answer() {
        let selected = vec!["Muscle gain".to_string(), "Weight loss".to_string()];
        assert_eq!(selected_flags(&options(), &selected), vec![true, false, true]);
        assert_eq!(selected_flags(&options(), &[]), vec![false, false, false]);
    }
}
