//! One user's pass through the questionnaire.

use crate::navigator::{Navigator, Step};
use crate::reconcile::{ReconcileReport, reconcile};
use crate::review::ReviewSummary;
use crate::validate;
use crate::{
    AnswerValue, ApiError, Catalog, Category, FieldError, FieldPath, FormState, MealPlan,
    QuestionDefinition, QuestionType, QuestionnaireApi, Response, SurveyError, UserInfo,
    ValidationFailure,
};

/// Save or submission started with `begin_next`/`begin_submit` and not yet completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Save(u64),
    Submit(u64),
}

/// A validated category waiting for its responses to be saved.
///
/// Returned by [`Session::begin_next`]. Send `responses` to the backend, then
/// hand the outcome to [`Session::complete_next`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    ticket: u64,
    step: Step,
    pub responses: Vec<Response>,
}

/// The outcome of [`Session::begin_next`].
#[derive(Debug, Clone, PartialEq)]
pub enum NextMove {
    /// Nothing needed saving; the session has already moved to this step.
    Moved(Step),

    /// The category's answers must be saved before the session moves.
    Save(PendingSave),
}

/// A validated submission waiting for the meal plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmit {
    ticket: u64,
    pub responses: Vec<Response>,
}

/// A questionnaire session: the catalog, the user's answers and the current step.
///
/// All mutation goes through the session so that every stored answer has the
/// shape its question type expects.
#[derive(Debug)]
pub struct Session<A> {
    api: A,
    catalog: Catalog,
    state: FormState,
    navigator: Navigator,
    report: ReconcileReport,
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl<A: QuestionnaireApi> Session<A> {
    /// Fetch the catalog and the stored answers, and resume where the user left off.
    pub async fn load(api: A) -> Result<Self, SurveyError> {
        let questions = api.fetch_questions().await.map_err(|err| match err {
            ApiError::Unauthorized => SurveyError::AuthExpired,
            other => SurveyError::CatalogUnavailable(other.message()),
        })?;
        let catalog = Catalog::new(questions)?;
        log::info!(
            "Loaded {} questions in {} categories",
            catalog.len(),
            catalog.categories().len()
        );

        let responses = match api.fetch_responses().await {
            Ok(responses) => responses,
            Err(ApiError::Unauthorized) => return Err(SurveyError::AuthExpired),
            Err(err) => {
                log::warn!("Could not fetch stored responses, starting fresh: {err}");
                Vec::new()
            }
        };

        Ok(Self::from_parts(api, catalog, &responses))
    }
}

impl<A> Session<A> {
    /// Build a session from an already loaded catalog and stored responses.
    pub fn from_parts(api: A, catalog: Catalog, responses: &[Response]) -> Self {
        let mut state = FormState::new();
        let report = reconcile(&catalog, responses, &mut state);
        if !report.orphaned.is_empty() || !report.defaulted.is_empty() {
            log::info!(
                "Reconciled {} answers ({} orphaned, {} defaulted)",
                report.applied.len(),
                report.orphaned.len(),
                report.defaulted.len()
            );
        }
        let navigator = Navigator::resume(&catalog, &report.applied);

        Self {
            api,
            catalog,
            state,
            navigator,
            report,
            in_flight: None,
            next_ticket: 0,
        }
    }

    // === Answers ===

    /// Store the answer for the question owning `field_key`.
    pub fn set_answer(
        &mut self,
        field_key: impl Into<FieldPath>,
        value: impl Into<AnswerValue>,
    ) -> Result<(), SurveyError> {
        let field_key = field_key.into();
        let value = value.into();
        let Some(question) = self.catalog.by_field_key(&field_key) else {
            return Err(SurveyError::UnknownField(field_key));
        };

        let non_finite = matches!(value, AnswerValue::Number(n) if !n.is_finite());
        if non_finite || !question.question_type.accepts(&value) {
            return Err(SurveyError::AnswerTypeMismatch {
                field_key,
                question_type: question.question_type,
                actual: if non_finite { "non-finite Number" } else { value.type_name() },
            });
        }
        if question.question_type == QuestionType::Radio
            && let AnswerValue::Text(choice) = &value
            && !choice.is_empty()
            && !question.has_option(choice)
        {
            return Err(SurveyError::UnknownOption {
                field_key,
                option: choice.clone(),
            });
        }

        self.state
            .set(&field_key, value)
            .map_err(|_| SurveyError::UnknownField(field_key))?;
        Ok(())
    }

    /// Remove the answer stored at `field_key`, if any.
    pub fn clear_answer(&mut self, field_key: &FieldPath) -> Option<AnswerValue> {
        self.state.remove(field_key)
    }

    pub fn answer(&self, field_key: &FieldPath) -> Option<&AnswerValue> {
        self.state.get(field_key)
    }

    // === Navigation ===

    pub fn step(&self) -> Step {
        self.navigator.step()
    }

    pub fn is_review(&self) -> bool {
        self.navigator.is_review()
    }

    /// The category being answered, or `None` at review.
    pub fn current_category(&self) -> Option<&Category> {
        self.navigator
            .current_category()
            .and_then(|index| self.catalog.categories().get(index))
    }

    /// The questions of the current category, in catalog order.
    pub fn current_questions(&self) -> Vec<&QuestionDefinition> {
        match self.current_category() {
            Some(category) => self.catalog.questions_in(category).collect(),
            None => Vec::new(),
        }
    }

    /// Validate the current category without moving. Review always passes.
    pub fn validate_current(&self) -> Result<(), ValidationFailure> {
        match self.current_category() {
            Some(category) => validate::validate_category(&self.catalog, category, &self.state),
            None => Ok(()),
        }
    }

    /// Every field error of the current category, including non-blocking ones.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self.current_category() {
            Some(category) => validate::field_errors(&self.catalog, category, &self.state),
            None => Vec::new(),
        }
    }

    /// Whether a save or submission started with `begin_*` is outstanding.
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validate the current category and start saving it.
    ///
    /// A category without answers moves on at once, and review stays put;
    /// neither issues a save. A `back` before `complete_next` cancels the move.
    pub fn begin_next(&mut self) -> Result<NextMove, SurveyError> {
        self.ensure_idle()?;
        let Some(index) = self.navigator.current_category() else {
            return Ok(NextMove::Moved(Step::Review));
        };
        self.validate_current()?;

        let responses = self.category_responses(index);
        if responses.is_empty() {
            return Ok(NextMove::Moved(self.navigator.advance()));
        }

        let ticket = self.issue_ticket();
        self.in_flight = Some(InFlight::Save(ticket));
        Ok(NextMove::Save(PendingSave {
            ticket,
            step: self.navigator.step(),
            responses,
        }))
    }

    /// Finish a move started with `begin_next`.
    ///
    /// On success the navigator advances. A save that was cancelled by `back`
    /// is ignored and the current step is returned unchanged.
    pub fn complete_next(
        &mut self,
        pending: PendingSave,
        result: Result<(), ApiError>,
    ) -> Result<Step, SurveyError> {
        if self.in_flight != Some(InFlight::Save(pending.ticket)) {
            log::debug!("Ignoring stale save #{}", pending.ticket);
            return Ok(self.navigator.step());
        }
        self.in_flight = None;

        result.map_err(save_error)?;
        if self.navigator.step() == pending.step {
            self.navigator.advance();
        }
        Ok(self.navigator.step())
    }

    /// Go back one category. Cancels an outstanding `begin_next`.
    pub fn back(&mut self) -> Step {
        if matches!(self.in_flight, Some(InFlight::Save(_))) {
            self.in_flight = None;
        }
        self.navigator.back()
    }

    // === Submission ===

    /// The non-empty answers of every question, in catalog order.
    pub fn responses(&self) -> Vec<Response> {
        self.responses_for(self.catalog.questions().iter())
    }

    /// The non-empty answers of one category.
    pub fn category_responses(&self, index: usize) -> Vec<Response> {
        match self.catalog.categories().get(index) {
            Some(category) => self.responses_for(self.catalog.questions_in(category)),
            None => Vec::new(),
        }
    }

    fn responses_for<'a>(
        &self,
        questions: impl Iterator<Item = &'a QuestionDefinition>,
    ) -> Vec<Response> {
        questions
            .filter_map(|q| {
                let value = self.state.get(&q.field_key)?;
                (!value.is_empty()).then(|| Response::new(q.id, value.to_json()))
            })
            .collect()
    }

    /// Check that the session may be submitted and collect the responses.
    pub fn prepare_submission(&self) -> Result<Vec<Response>, SurveyError> {
        if !self.navigator.is_review() {
            return Err(SurveyError::NotAtReview);
        }
        validate::validate_all(&self.catalog, &self.state)?;
        Ok(self.responses())
    }

    /// Start a submission. Complete it with `complete_submit`.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, SurveyError> {
        self.ensure_idle()?;
        let responses = self.prepare_submission()?;
        let ticket = self.issue_ticket();
        self.in_flight = Some(InFlight::Submit(ticket));
        Ok(PendingSubmit { ticket, responses })
    }

    /// Finish a submission started with `begin_submit`.
    pub fn complete_submit(
        &mut self,
        pending: PendingSubmit,
        result: Result<MealPlan, ApiError>,
    ) -> Result<MealPlan, SurveyError> {
        if self.in_flight == Some(InFlight::Submit(pending.ticket)) {
            self.in_flight = None;
        }
        result.map_err(save_error)
    }

    /// Nested form values, as sent alongside the responses on submission.
    pub fn user_info(&self) -> UserInfo {
        UserInfo::from_form_state(&self.state)
    }

    pub fn review(&self) -> ReviewSummary {
        ReviewSummary::build(&self.catalog, &self.state)
    }

    // === Accessors ===

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// What happened to the stored answers when the session was loaded.
    pub fn report(&self) -> &ReconcileReport {
        &self.report
    }

    fn ensure_idle(&self) -> Result<(), SurveyError> {
        match self.in_flight {
            Some(_) => Err(SurveyError::SaveInFlight),
            None => Ok(()),
        }
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }
}

impl<A: QuestionnaireApi> Session<A> {
    /// Validate the current category, save its answers and move on.
    ///
    /// Nothing is sent when the category has no answers. On any error the
    /// session stays where it was; dropping the future has the same effect.
    pub async fn next(&mut self) -> Result<Step, SurveyError> {
        self.ensure_idle()?;
        let Some(index) = self.navigator.current_category() else {
            return Ok(Step::Review);
        };
        self.validate_current()?;

        let responses = self.category_responses(index);
        if !responses.is_empty() {
            log::debug!("Saving {} responses for category {index}", responses.len());
            self.api.save_responses(&responses).await.map_err(save_error)?;
        }
        Ok(self.navigator.advance())
    }

    /// Submit the responses with the given user info and return the meal plan.
    pub async fn submit(&mut self, user_info: &UserInfo) -> Result<MealPlan, SurveyError> {
        self.ensure_idle()?;
        let responses = self.prepare_submission()?;
        log::info!("Submitting {} responses", responses.len());
        self.api
            .generate_meal_plan(user_info, &responses)
            .await
            .map_err(save_error)
    }

    /// Submit using the form values themselves as user info.
    pub async fn submit_form(&mut self) -> Result<MealPlan, SurveyError> {
        let user_info = self.user_info();
        self.submit(&user_info).await
    }
}

fn save_error(err: ApiError) -> SurveyError {
    log::warn!("Backend rejected request: {err}");
    SurveyError::from_api(err)
}
