//! Lazy boolean reasons over possibility-set facts

use std::collections::BTreeSet;
use std::fmt;

use crate::{InferenceError, PossibilityArena, SetId};

/// Tri-state evaluation of a [`Reason`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    pub fn is_false(self) -> bool {
        self == Truth::False
    }

    pub fn is_unknown(self) -> bool {
        self == Truth::Unknown
    }
}

impl From<bool> for Truth {
    fn from(value: bool) -> Self {
        if value { Truth::True } else { Truth::False }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectMode {
    Strict,
    Defer,
}

/// A claim about concealed state.
///
/// Whether a reason has been asserted or rejected is read back from the arena
/// through [`can_hold`](Reason::can_hold): an asserted fact is one whose set
/// fits inside its values, a rejected fact one whose set avoids them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The true value of `set` is one of `values`
    Fact { set: SetId, values: BTreeSet<String> },
    And(Vec<Reason>),
    Or(Vec<Reason>),
}

impl Reason {
    pub fn fact<I, V>(set: SetId, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Reason::Fact {
            set,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(reasons: impl IntoIterator<Item = Reason>) -> Self {
        Reason::And(reasons.into_iter().collect())
    }

    pub fn or(reasons: impl IntoIterator<Item = Reason>) -> Self {
        Reason::Or(reasons.into_iter().collect())
    }

    /// Evaluate without side effects. An id the arena does not know counts as
    /// undetermined; committing it reports the error.
    pub fn can_hold(&self, arena: &PossibilityArena) -> Truth {
        match self {
            Reason::Fact { set, values } => match arena.get(*set) {
                Ok(possible) if possible.values().is_subset(values) => Truth::True,
                Ok(possible) if possible.values().is_disjoint(values) => Truth::False,
                _ => Truth::Unknown,
            },
            Reason::And(children) => {
                let mut result = Truth::True;
                for child in children {
                    match child.can_hold(arena) {
                        Truth::False => return Truth::False,
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::True => {}
                    }
                }
                result
            }
            Reason::Or(children) => {
                let mut result = Truth::False;
                for child in children {
                    match child.can_hold(arena) {
                        Truth::True => return Truth::True,
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::False => {}
                    }
                }
                result
            }
        }
    }

    /// Commit this reason as true.
    ///
    /// Re-asserting is a no-op; asserting a disproven reason is a
    /// [`InferenceError::Contradiction`]. An `Or` can only be asserted once a
    /// single child remains open.
    pub fn assert(&self, arena: &mut PossibilityArena) -> Result<(), InferenceError> {
        arena.atomically(|arena| self.assert_in(arena))
    }

    /// Commit this reason as false.
    ///
    /// An `And` with two or more open children cannot pick which one to
    /// reject and fails with [`InferenceError::AmbiguousReject`].
    pub fn reject(&self, arena: &mut PossibilityArena) -> Result<(), InferenceError> {
        arena.atomically(|arena| self.reject_in(arena, RejectMode::Strict))
    }

    /// Like [`reject`](Self::reject), but an ambiguous `And` is parked in the
    /// arena and resolved once later evidence leaves a single open child.
    pub fn reject_or_defer(&self, arena: &mut PossibilityArena) -> Result<(), InferenceError> {
        arena.atomically(|arena| self.reject_in(arena, RejectMode::Defer))
    }

    pub(crate) fn open_count(&self, arena: &PossibilityArena) -> usize {
        match self {
            Reason::Fact { .. } => usize::from(self.can_hold(arena).is_unknown()),
            Reason::And(children) | Reason::Or(children) => children
                .iter()
                .filter(|child| child.can_hold(arena).is_unknown())
                .count(),
        }
    }

    fn assert_in(&self, arena: &mut PossibilityArena) -> Result<(), InferenceError> {
        match self {
            Reason::Fact { set, values } => match self.can_hold(arena) {
                Truth::True => Ok(()),
                Truth::False => Err(self.contradiction("assert", "disproven")),
                Truth::Unknown => arena.narrow_raw(*set, values),
            },
            Reason::And(children) => {
                if self.can_hold(arena).is_false() {
                    return Err(self.contradiction("assert", "disproven"));
                }
                children.iter().try_for_each(|child| child.assert_in(arena))
            }
            Reason::Or(children) => match self.can_hold(arena) {
                Truth::True => Ok(()),
                Truth::False => Err(self.contradiction("assert", "disproven")),
                Truth::Unknown => {
                    let open = undetermined(children, arena);
                    match open.as_slice() {
                        [only] => only.assert_in(arena),
                        _ => Err(InferenceError::AmbiguousAssert {
                            reason: self.to_string(),
                            undetermined: open.len(),
                        }),
                    }
                }
            },
        }
    }

    pub(crate) fn reject_in(
        &self,
        arena: &mut PossibilityArena,
        mode: RejectMode,
    ) -> Result<(), InferenceError> {
        match self {
            Reason::Fact { set, values } => match self.can_hold(arena) {
                Truth::False => Ok(()),
                Truth::True => Err(self.contradiction("reject", "proven")),
                Truth::Unknown => arena.remove_raw(*set, values),
            },
            Reason::Or(children) => {
                if self.can_hold(arena).is_true() {
                    return Err(self.contradiction("reject", "proven"));
                }
                children
                    .iter()
                    .try_for_each(|child| child.reject_in(arena, mode))
            }
            Reason::And(children) => match self.can_hold(arena) {
                Truth::False => Ok(()),
                Truth::True => Err(self.contradiction("reject", "proven")),
                Truth::Unknown => {
                    let open = undetermined(children, arena);
                    match (open.as_slice(), mode) {
                        ([only], _) => only.reject_in(arena, mode),
                        (_, RejectMode::Defer) => {
                            arena.defer(self.clone());
                            Ok(())
                        }
                        (_, RejectMode::Strict) => Err(InferenceError::AmbiguousReject {
                            reason: self.to_string(),
                            undetermined: open.len(),
                        }),
                    }
                }
            },
        }
    }

    fn contradiction(&self, attempted: &'static str, state: &'static str) -> InferenceError {
        InferenceError::Contradiction {
            reason: self.to_string(),
            attempted,
            state,
        }
    }
}

fn undetermined(children: &[Reason], arena: &PossibilityArena) -> Vec<Reason> {
    children
        .iter()
        .filter(|child| child.can_hold(arena).is_unknown())
        .cloned()
        .collect()
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Fact { set, values } => {
                write!(f, "{set} in [")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(value)?;
                }
                f.write_str("]")
            }
            Reason::And(children) | Reason::Or(children) => {
                let op = if matches!(self, Reason::And(_)) { " & " } else { " | " };
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(op)?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}
