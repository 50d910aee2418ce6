use std::collections::HashSet;
use std::fmt;

use crate::{FieldPath, QuestionDefinition, QuestionId, SurveyError};

/// Name of the category whose questions must all be agreed to.
pub const WAIVER_CATEGORY: &str = "waiver";

/// A named group of questions; one wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The category name as sent by the backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the waiver category (compared case-insensitively).
    pub fn is_waiver(&self) -> bool {
        self.0.eq_ignore_ascii_case(WAIVER_CATEGORY)
    }

    /// Human-readable title, e.g. `"personal_info"` becomes `"Personal Info"`.
    pub fn title(&self) -> String {
        self.0
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The ordered, validated set of questions for one session.
///
/// Questions are sorted by `order` (ties broken by id) and categories keep the
/// order in which they first appear in that sorted list. Every question in a
/// catalog owns a distinct, non-overlapping field key.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<QuestionDefinition>,
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog from the questions returned by the backend.
    ///
    /// Nested `sub_questions` are flattened into the list. Inactive questions,
    /// repeated ids, and questions whose field key is empty or overlaps an
    /// earlier question's key are dropped. Fails with
    /// `SurveyError::CatalogUnavailable` if nothing usable remains.
    pub fn new(questions: Vec<QuestionDefinition>) -> Result<Self, SurveyError> {
        let mut flat = Vec::with_capacity(questions.len());
        let mut seen_ids = HashSet::new();
        flatten(questions, &mut flat, &mut seen_ids);

        flat.retain(|q| {
            if !q.is_active {
                log::debug!("Skipping inactive question {}", q.id);
            }
            q.is_active
        });
        flat.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));

        let mut questions: Vec<QuestionDefinition> = Vec::with_capacity(flat.len());
        for question in flat {
            if question.field_key.is_empty() {
                log::warn!("Skipping question {} without a field key", question.id);
                continue;
            }
            if let Some(existing) = questions
                .iter()
                .find(|q| q.field_key.overlaps(&question.field_key))
            {
                log::warn!(
                    "Skipping question {}: field key '{}' overlaps '{}' of question {}",
                    question.id,
                    question.field_key,
                    existing.field_key,
                    existing.id
                );
                continue;
            }
            questions.push(question);
        }

        if questions.is_empty() {
            return Err(SurveyError::CatalogUnavailable(
                "No questions available".to_string(),
            ));
        }

        let mut categories: Vec<Category> = Vec::new();
        for question in &questions {
            if !categories.iter().any(|c| c.as_str() == question.category) {
                categories.push(Category::new(question.category.clone()));
            }
        }

        Ok(Self {
            questions,
            categories,
        })
    }

    /// All questions in catalog order.
    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    /// Look up a question by id.
    pub fn get(&self, id: QuestionId) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Look up the question that owns a field key.
    pub fn by_field_key(&self, field_key: &FieldPath) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| &q.field_key == field_key)
    }

    /// The distinct categories, in first-seen order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Position of a category by name.
    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.as_str() == name)
    }

    /// The questions of one category, in catalog order.
    pub fn questions_in<'a>(
        &'a self,
        category: &'a Category,
    ) -> impl Iterator<Item = &'a QuestionDefinition> + 'a {
        self.questions
            .iter()
            .filter(move |q| q.category == category.as_str())
    }

    /// Get the number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// A catalog is never empty once built; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn flatten(
    questions: Vec<QuestionDefinition>,
    out: &mut Vec<QuestionDefinition>,
    seen_ids: &mut HashSet<QuestionId>,
) {
    for mut question in questions {
        let children = std::mem::take(&mut question.sub_questions);
        if seen_ids.insert(question.id) {
            out.push(question);
        } else {
            log::warn!("Skipping repeated question id {}", question.id);
        }
        flatten(children, out, seen_ids);
    }
}
