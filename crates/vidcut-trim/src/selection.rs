//! Caller-side selection state between batches.
//!
//! # Design
//! - Holds the raw inputs a front end collects before a batch starts.
//! - Reset only after a batch has run; a rejected selection stays editable.

use std::path::PathBuf;

use crate::error::{TrimError, TrimResult};
use crate::model::TrimRequest;
use crate::validate::parse_retained_seconds;

/// Transient state collected by a front end before a batch runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<PathBuf>,
    retained_seconds: String,
    delete_source_on_success: bool,
}

impl Selection {
    /// Empty selection ready for input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected files.
    pub fn set_paths<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.paths = paths.into_iter().collect();
    }

    /// Replace the retained-seconds text as typed by the user.
    pub fn set_retained_seconds(&mut self, text: impl Into<String>) {
        self.retained_seconds = text.into();
    }

    /// Toggle source removal.
    pub const fn set_delete_source_on_success(&mut self, delete: bool) {
        self.delete_source_on_success = delete;
    }

    /// Selected files.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Retained-seconds text.
    #[must_use]
    pub fn retained_seconds(&self) -> &str {
        &self.retained_seconds
    }

    /// Whether source removal is selected.
    #[must_use]
    pub const fn delete_source_on_success(&self) -> bool {
        self.delete_source_on_success
    }

    /// Whether the selection is back in its initial state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self == Self::default()
    }

    /// Check the selection without building a request.
    ///
    /// # Errors
    ///
    /// Returns [`TrimError::InvalidRequest`] when no file is selected or the
    /// retained seconds are not a positive integer.
    pub fn validate(&self) -> TrimResult<()> {
        self.checked_seconds().map(drop)
    }

    /// Validate the selection and build a request from it.
    ///
    /// The selection itself is left untouched.
    ///
    /// # Errors
    ///
    /// See [`Self::validate`].
    pub fn take_request(&self) -> TrimResult<TrimRequest> {
        let retained_seconds = self.checked_seconds()?;
        TrimRequest::new(
            self.paths.clone(),
            retained_seconds,
            self.delete_source_on_success,
        )
    }

    fn checked_seconds(&self) -> TrimResult<u32> {
        if self.paths.is_empty() {
            return Err(TrimError::invalid("input_paths", "empty", None));
        }
        parse_retained_seconds(&self.retained_seconds)
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Selection {
        let mut selection = Selection::new();
        selection.set_paths([PathBuf::from("/v/a.mp4"), PathBuf::from("/v/b.avi")]);
        selection.set_retained_seconds("15");
        selection.set_delete_source_on_success(true);
        selection
    }

    #[test]
    fn take_request_builds_validated_request() -> TrimResult<()> {
        let selection = filled();
        let request = selection.take_request()?;
        assert_eq!(request.input_paths().len(), 2);
        assert_eq!(request.retained_seconds(), 15);
        assert!(request.delete_source_on_success());
        assert!(!selection.is_ready());
        Ok(())
    }

    #[test]
    fn invalid_selection_is_left_intact() {
        let mut selection = filled();
        selection.set_retained_seconds("0");
        let before = selection.clone();
        assert!(selection.take_request().is_err());
        assert_eq!(selection, before);

        let mut empty = Selection::new();
        empty.set_retained_seconds("10");
        assert!(matches!(
            empty.take_request(),
            Err(TrimError::InvalidRequest {
                field: "input_paths",
                reason: "empty",
                ..
            })
        ));
    }

    #[test]
    fn validate_agrees_with_take_request() {
        let selection = filled();
        assert!(selection.validate().is_ok());
        assert!(selection.take_request().is_ok());

        let mut typo = filled();
        typo.set_retained_seconds("1O");
        assert!(matches!(
            typo.validate(),
            Err(TrimError::InvalidRequest {
                field: "retained_seconds",
                reason: "not_numeric",
                ..
            })
        ));
        assert!(typo.take_request().is_err());

        let mut nothing = Selection::new();
        nothing.set_retained_seconds("5");
        assert!(matches!(
            nothing.validate(),
            Err(TrimError::InvalidRequest {
                field: "input_paths",
                reason: "empty",
                ..
            })
        ));
        assert_eq!(nothing.retained_seconds(), "5");
    }

    #[test]
    fn reset_restores_ready_state() {
        let mut selection = filled();
        selection.reset();
        assert!(selection.is_ready());
        assert!(selection.paths().is_empty());
        assert_eq!(selection.retained_seconds(), "");
        assert!(!selection.delete_source_on_success());
    }
}
