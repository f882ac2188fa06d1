//! Results of catalog and pool mutations.
//!
//! Saves and deletes report failures as messages rather than errors so a
//! caller can show them per item and carry on.

use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};

/// The result of a single save or delete.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The change was applied and persisted.
    Done,
    /// The change failed; the message says why.
    Failed(String),
}

impl Outcome {
    /// Wrap a store result.
    pub fn from_result(result: StoreResult<()>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// True on success.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Done => None,
            Self::Failed(message) => Some(message),
        }
    }

    /// Convert to a plain result.
    pub fn into_result(self) -> Result<(), String> {
        match self {
            Self::Done => Ok(()),
            Self::Failed(message) => Err(message),
        }
    }
}

/// The result of deleting several items at once.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    removed: Vec<String>,
    failures: BTreeMap<String, String>,
    list_error: Option<String>,
}

impl BatchOutcome {
    /// True if every item was deleted and the list file was rewritten.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.list_error.is_none()
    }

    /// Names no longer present in memory, in the order they were removed.
    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    /// Per-item failure messages.
    pub fn failures(&self) -> &BTreeMap<String, String> {
        &self.failures
    }

    /// The failure message for `name`.
    pub fn failure(&self, name: &str) -> Option<&str> {
        self.failures.get(name).map(String::as_str)
    }

    /// Set if the list file could not be rewritten.
    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }

    pub(crate) fn removed_item(&mut self, name: &str) {
        self.removed.push(name.to_string());
    }

    pub(crate) fn was_removed(&self, name: &str) -> bool {
        self.removed.iter().any(|n| n == name)
    }

    pub(crate) fn fail(&mut self, name: &str, err: &StoreError) {
        self.failures.insert(name.to_string(), err.to_string());
    }

    pub(crate) fn fail_list(&mut self, err: &StoreError) {
        self.list_error = Some(err.to_string());
    }
}
