//! Single owner of every possibility set in a session

use std::collections::BTreeSet;
use std::fmt;

use crate::reason::RejectMode;
use crate::{InferenceError, PossibilitySet, Reason, Truth};

/// Handle to a set stored in a [`PossibilityArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetId(usize);

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of possibility sets plus the rejections that could not be resolved
/// yet.
///
/// A deferred rejection records "these reasons do not all hold" when more
/// than one of them is still undetermined. After every mutation the deferred
/// list is re-evaluated until nothing changes: a constraint with a false
/// child is discharged, one with a single open child rejects it.
#[derive(Debug, Clone, Default)]
pub struct PossibilityArena {
    sets: Vec<PossibilitySet>,
    deferred: Vec<Reason>,
}

impl PossibilityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new attribute with its initial candidates
    pub fn insert<I, V>(&mut self, label: impl Into<String>, candidates: I) -> SetId
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let id = SetId(self.sets.len());
        self.sets.push(PossibilitySet::new(
            label,
            candidates.into_iter().map(Into::into),
        ));
        id
    }

    pub fn get(&self, id: SetId) -> Result<&PossibilitySet, InferenceError> {
        self.sets.get(id.0).ok_or(InferenceError::UnknownSet(id))
    }

    /// Known value of a set, if it has been narrowed to one candidate
    pub fn known(&self, id: SetId) -> Option<&str> {
        self.sets.get(id.0)?.known().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Rejections still waiting for enough evidence to resolve
    pub fn deferred(&self) -> &[Reason] {
        &self.deferred
    }

    /// Intersect a set with `allowed`, then propagate deferred rejections
    pub fn narrow<I, V>(&mut self, id: SetId, allowed: I) -> Result<(), InferenceError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let allowed: BTreeSet<String> = allowed.into_iter().map(Into::into).collect();
        self.atomically(|arena| arena.narrow_raw(id, &allowed))
    }

    /// Subtract `disallowed` from a set, then propagate deferred rejections
    pub fn remove<I, V>(&mut self, id: SetId, disallowed: I) -> Result<(), InferenceError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let disallowed: BTreeSet<String> = disallowed.into_iter().map(Into::into).collect();
        self.atomically(|arena| arena.remove_raw(id, &disallowed))
    }

    /// Run `f` as one all-or-nothing mutation.
    ///
    /// Deferred rejections are propagated before committing; if `f` or the
    /// propagation fails, every set and the deferred list are restored.
    pub fn atomically<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, InferenceError>,
    ) -> Result<R, InferenceError> {
        let snapshot = self.clone();
        let result = f(self).and_then(|value| {
            self.propagate()?;
            Ok(value)
        });
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    pub(crate) fn narrow_raw(
        &mut self,
        id: SetId,
        allowed: &BTreeSet<String>,
    ) -> Result<(), InferenceError> {
        self.sets
            .get_mut(id.0)
            .ok_or(InferenceError::UnknownSet(id))?
            .narrow(allowed)
    }

    pub(crate) fn remove_raw(
        &mut self,
        id: SetId,
        disallowed: &BTreeSet<String>,
    ) -> Result<(), InferenceError> {
        self.sets
            .get_mut(id.0)
            .ok_or(InferenceError::UnknownSet(id))?
            .remove(disallowed)
    }

    pub(crate) fn defer(&mut self, reason: Reason) {
        tracing::debug!(%reason, "deferring ambiguous rejection");
        self.deferred.push(reason);
    }

    fn propagate(&mut self) -> Result<(), InferenceError> {
        loop {
            let mut changed = false;
            let pending = std::mem::take(&mut self.deferred);
            let mut waiting = Vec::with_capacity(pending.len());

            for constraint in pending {
                match constraint.can_hold(self) {
                    Truth::False => {
                        tracing::debug!(%constraint, "deferred rejection discharged");
                    }
                    Truth::True => {
                        return Err(InferenceError::Contradiction {
                            reason: constraint.to_string(),
                            attempted: "reject",
                            state: "proven",
                        });
                    }
                    Truth::Unknown if constraint.open_count(self) <= 1 => {
                        constraint.reject_in(self, RejectMode::Defer)?;
                        changed = true;
                    }
                    Truth::Unknown => waiting.push(constraint),
                }
            }

            // Rejections resolved above may have deferred new constraints.
            self.deferred.extend(waiting);
            if !changed {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena = PossibilityArena::new();
        let id = arena.insert("p2: Gengar ability", ["cursedbody", "levitate"]);

        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(id).unwrap().len(), 2);
        assert_eq!(arena.known(id), None);
    }

    #[test]
    fn test_unknown_set() {
        let arena = PossibilityArena::new();
        assert_eq!(
            arena.get(SetId(3)).unwrap_err(),
            InferenceError::UnknownSet(SetId(3))
        );
    }

    #[test]
    fn test_narrow_through_arena() {
        let mut arena = PossibilityArena::new();
        let id = arena.insert("p2: Gengar ability", ["cursedbody", "levitate"]);

        arena.narrow(id, ["levitate"]).unwrap();

        assert_eq!(arena.known(id), Some("levitate"));
    }

    #[test]
    fn test_atomically_restores_on_error() {
        let mut arena = PossibilityArena::new();
        let ability = arena.insert("ability", ["a", "b"]);
        let item = arena.insert("item", ["x", "y"]);

        let result = arena.atomically(|a| {
            a.narrow_raw(ability, &BTreeSet::from(["a".to_string()]))?;
            a.narrow_raw(item, &BTreeSet::from(["z".to_string()]))
        });

        assert!(result.is_err());
        assert_eq!(arena.get(ability).unwrap().len(), 2);
        assert_eq!(arena.get(item).unwrap().len(), 2);
    }

    #[test]
    fn test_deferred_rejection_resolves_later() {
        let mut arena = PossibilityArena::new();
        let ability = arena.insert("ability", ["intimidate", "moxie"]);
        let item = arena.insert("item", ["choiceband", "leftovers"]);
        let both = Reason::and([
            Reason::fact(ability, ["intimidate"]),
            Reason::fact(item, ["leftovers"]),
        ]);

        both.reject_or_defer(&mut arena).unwrap();
        assert_eq!(arena.deferred().len(), 1);
        assert_eq!(arena.get(ability).unwrap().len(), 2);

        // Learning the item settles the ability.
        arena.narrow(item, ["leftovers"]).unwrap();

        assert!(arena.deferred().is_empty());
        assert_eq!(arena.known(ability), Some("moxie"));
    }

    #[test]
    fn test_deferred_rejection_discharged() {
        let mut arena = PossibilityArena::new();
        let ability = arena.insert("ability", ["intimidate", "moxie"]);
        let item = arena.insert("item", ["choiceband", "leftovers"]);
        Reason::and([
            Reason::fact(ability, ["intimidate"]),
            Reason::fact(item, ["leftovers"]),
        ])
        .reject_or_defer(&mut arena)
        .unwrap();

        arena.remove(item, ["leftovers"]).unwrap();

        assert!(arena.deferred().is_empty());
        assert_eq!(arena.get(ability).unwrap().len(), 2);
    }

    #[test]
    fn test_deferred_contradiction_rolls_back() {
        let mut arena = PossibilityArena::new();
        let ability = arena.insert("ability", ["intimidate", "moxie"]);
        let item = arena.insert("item", ["choiceband", "leftovers"]);
        Reason::and([
            Reason::fact(ability, ["intimidate"]),
            Reason::fact(item, ["leftovers"]),
        ])
        .reject_or_defer(&mut arena)
        .unwrap();
        arena.narrow(item, ["leftovers"]).unwrap();

        // Ability is now known to be moxie; claiming intimidate must fail.
        let err = arena.narrow(ability, ["intimidate"]).unwrap_err();

        assert!(matches!(err, InferenceError::Overnarrow { .. }));
        assert_eq!(arena.known(ability), Some("moxie"));
    }
}
