//! Review session for a set of changed fields.
//!
//! A session walks through `Idle -> Reviewing -> Validating -> Completed`,
//! or `Reviewing -> Cancelled` when the user backs out:
//!
//! - `open` shows the changed fields and focuses the first reason input;
//! - `submit` validates every row; missing reasons send the session back to
//!   `Reviewing` with the offending rows marked;
//! - a valid submit closes the presenter and hands the [`Submission`] to the
//!   completion callback exactly once.
//!
//! Opening again after `Completed` or `Cancelled` starts from scratch.

mod collector;

use std::fmt;

use thiserror::Error;

use crate::locale::Locale;
use crate::model::ChangedField;
use crate::present::{self, ReviewPresenter, ReviewRow};

pub use collector::{collect, summarize, Submission, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewState {
    Idle,
    Reviewing,
    Validating,
    Completed,
    Cancelled,
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Reviewing => "reviewing",
            Self::Validating => "validating",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cannot {action} a review session that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: ReviewState,
    },
    #[error("field '{0}' is not part of this review")]
    UnknownField(String),
    #[error("no review row at position {0}")]
    UnknownRow(usize),
}

type CompletionCallback<'a> = Box<dyn FnOnce(&Submission) + 'a>;

pub struct ReviewSession<'a, P: ReviewPresenter> {
    presenter: P,
    locale: Locale,
    state: ReviewState,
    rows: Vec<ReviewRow>,
    on_complete: Option<CompletionCallback<'a>>,
    submission: Option<Submission>,
}

impl<'a, P: ReviewPresenter> ReviewSession<'a, P> {
    pub fn new(presenter: P, locale: Locale) -> Self {
        Self {
            presenter,
            locale,
            state: ReviewState::Idle,
            rows: Vec::new(),
            on_complete: None,
            submission: None,
        }
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    /// The submission of the last completed review.
    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    fn require_reviewing(&self, action: &'static str) -> Result<(), ReviewError> {
        if self.state == ReviewState::Reviewing {
            Ok(())
        } else {
            Err(ReviewError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn reset(&mut self) {
        self.rows.clear();
        self.on_complete = None;
        self.submission = None;
    }

    pub fn open<F>(&mut self, changes: Vec<ChangedField>, on_complete: F) -> Result<(), ReviewError>
    where
        F: FnOnce(&Submission) + 'a,
    {
        if matches!(self.state, ReviewState::Reviewing | ReviewState::Validating) {
            return Err(ReviewError::InvalidTransition {
                action: "open",
                state: self.state,
            });
        }
        self.reset();

        if changes.is_empty() {
            let submission = Submission::default();
            on_complete(&submission);
            self.submission = Some(submission);
            self.state = ReviewState::Completed;
            return Ok(());
        }

        self.rows = present::build_rows(&changes, self.locale);
        self.on_complete = Some(Box::new(on_complete));
        self.state = ReviewState::Reviewing;
        self.presenter.present(&self.rows);
        self.presenter.focus_reason(0);
        Ok(())
    }

    pub fn set_reason(&mut self, key: &str, text: &str) -> Result<(), ReviewError> {
        self.require_reviewing("edit")?;
        let index = self
            .rows
            .iter()
            .position(|r| r.key == key)
            .ok_or_else(|| ReviewError::UnknownField(key.to_string()))?;
        self.set_reason_at(index, text)
    }

    pub fn set_reason_at(&mut self, index: usize, text: &str) -> Result<(), ReviewError> {
        self.require_reviewing("edit")?;
        let row = self
            .rows
            .get_mut(index)
            .ok_or(ReviewError::UnknownRow(index))?;
        row.reason = text.to_string();
        row.invalid = false;
        self.presenter.update_reasons(&self.rows);
        Ok(())
    }

    /// Fills every reason with `text`. Blank text leaves all reasons as they
    /// are; returns whether anything was applied.
    pub fn apply_common_reason(&mut self, text: &str) -> Result<bool, ReviewError> {
        self.require_reviewing("edit")?;
        if text.trim().is_empty() {
            return Ok(false);
        }
        for row in self.rows.iter_mut() {
            row.reason = text.to_string();
            row.invalid = false;
        }
        self.presenter.update_reasons(&self.rows);
        Ok(true)
    }

    pub fn submit(&mut self) -> Result<Submission, ReviewError> {
        self.require_reviewing("submit")?;
        self.state = ReviewState::Validating;

        let reason_map = match collect(&self.rows) {
            Ok(reasons) => reasons,
            Err(err) => {
                for row in self.rows.iter_mut() {
                    row.invalid = err.invalid_keys.contains(&row.key);
                }
                self.state = ReviewState::Reviewing;
                self.presenter.mark_invalid(&self.rows);
                return Err(err.into());
            }
        };

        for row in self.rows.iter_mut() {
            row.invalid = false;
        }
        let submission = Submission {
            human_readable_summary: summarize(&self.rows, &reason_map),
            reason_map,
        };
        self.state = ReviewState::Completed;
        self.presenter.close();
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(&submission);
        }
        self.submission = Some(submission.clone());
        Ok(submission)
    }

    pub fn cancel(&mut self) -> Result<(), ReviewError> {
        self.require_reviewing("cancel")?;
        self.reset();
        self.state = ReviewState::Cancelled;
        self.presenter.close();
        Ok(())
    }
}
