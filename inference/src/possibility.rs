//! Candidate-value sets for a single concealed attribute

use std::collections::BTreeSet;
use std::fmt;

use crate::InferenceError;

/// Remaining candidates for one attribute of one entity.
///
/// A successful operation never leaves the set empty. Once a single candidate
/// remains the value is considered known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossibilitySet<T: Ord = String> {
    label: String,
    values: BTreeSet<T>,
}

impl<T: Ord + Clone + fmt::Debug> PossibilitySet<T> {
    /// Create a set labelled with the entity and attribute it describes
    pub fn new(label: impl Into<String>, candidates: impl IntoIterator<Item = T>) -> Self {
        Self {
            label: label.into(),
            values: candidates.into_iter().collect(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> &BTreeSet<T> {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.values.contains(value)
    }

    /// The value, if narrowed down to exactly one candidate
    pub fn known(&self) -> Option<&T> {
        if self.values.len() == 1 {
            self.values.first()
        } else {
            None
        }
    }

    pub fn is_known(&self) -> bool {
        self.values.len() == 1
    }

    /// Keep only the candidates in `allowed`.
    ///
    /// Fails with [`InferenceError::Overnarrow`] and leaves the set untouched
    /// if nothing would remain.
    pub fn narrow(&mut self, allowed: &BTreeSet<T>) -> Result<(), InferenceError> {
        let next: BTreeSet<T> = self.values.intersection(allowed).cloned().collect();
        self.replace(next, "narrowing to", allowed)
    }

    /// Drop every candidate in `disallowed`, with the same atomicity as
    /// [`narrow`](Self::narrow).
    pub fn remove(&mut self, disallowed: &BTreeSet<T>) -> Result<(), InferenceError> {
        let next: BTreeSet<T> = self.values.difference(disallowed).cloned().collect();
        self.replace(next, "removing", disallowed)
    }

    fn replace(
        &mut self,
        next: BTreeSet<T>,
        operation: &'static str,
        requested: &BTreeSet<T>,
    ) -> Result<(), InferenceError> {
        if next.is_empty() {
            return Err(InferenceError::Overnarrow {
                label: self.label.clone(),
                operation,
                current: format!("{:?}", self.values),
                requested: format!("{requested:?}"),
            });
        }
        if next.len() != self.values.len() {
            tracing::debug!(
                label = %self.label,
                before = ?self.values,
                after = ?next,
                "{operation} candidates"
            );
            self.values = next;
        }
        Ok(())
    }
}
