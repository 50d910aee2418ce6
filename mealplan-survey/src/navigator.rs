use crate::{Catalog, QuestionId};

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Index into the catalog's categories.
    Category(usize),

    /// Every category passed; the answers are shown before submission.
    Review,
}

/// Moves between the categories of a catalog and the final review step.
///
/// The navigator knows nothing about answers; the session validates and
/// saves before asking it to advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    step: Step,
    category_count: usize,
}

impl Navigator {
    /// Start at the first category.
    pub fn new(category_count: usize) -> Self {
        Self::starting_at(category_count, 0)
    }

    /// Start at the given category, clamped to the last one.
    pub fn starting_at(category_count: usize, index: usize) -> Self {
        let step = match category_count {
            0 => Step::Review,
            n => Step::Category(index.min(n - 1)),
        };
        Self {
            step,
            category_count,
        }
    }

    /// Start at the category of the first question (in catalog order) that
    /// already has an answer, or at the first category if none does.
    pub fn resume(catalog: &Catalog, answered: &[QuestionId]) -> Self {
        let index = catalog
            .questions()
            .iter()
            .find(|q| answered.contains(&q.id))
            .and_then(|q| catalog.category_index(&q.category))
            .unwrap_or(0);
        Self::starting_at(catalog.categories().len(), index)
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// The current category index, or `None` at review.
    pub fn current_category(&self) -> Option<usize> {
        match self.step {
            Step::Category(index) => Some(index),
            Step::Review => None,
        }
    }

    pub fn is_review(&self) -> bool {
        self.step == Step::Review
    }

    pub fn is_first(&self) -> bool {
        self.step == Step::Category(0)
    }

    /// Move to the next category, or to review after the last one.
    /// Advancing from review stays at review.
    pub fn advance(&mut self) -> Step {
        self.step = match self.step {
            Step::Category(index) if index + 1 < self.category_count => Step::Category(index + 1),
            _ => Step::Review,
        };
        self.step
    }

    /// Move to the previous category. From review this is the last category;
    /// on the first category nothing happens.
    pub fn back(&mut self) -> Step {
        self.step = match self.step {
            Step::Category(index) => Step::Category(index.saturating_sub(1)),
            Step::Review if self.category_count > 0 => Step::Category(self.category_count - 1),
            Step::Review => Step::Review,
        };
        self.step
    }

    /// One-based position and total number of steps, review included.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.category_count + 1;
        match self.step {
            Step::Category(index) => (index + 1, total),
            Step::Review => (total, total),
        }
    }
}
