// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Holder for one slice of table view state.
///
/// An owned slot is mutated by the table itself. A bound slot mirrors a
/// value the host application owns: proposed changes are handed back to the
/// host and only take effect once the host pushes them in with
/// [`StateSlot::bind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSlot<S> {
    Owned(S),
    Bound(S),
}

impl<S: Default> Default for StateSlot<S> {
    fn default() -> Self {
        Self::Owned(S::default())
    }
}

impl<S: Clone + PartialEq> StateSlot<S> {
    pub fn get(&self) -> &S {
        match self {
            Self::Owned(value) | Self::Bound(value) => value,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Host-side update; switches the slot to bound mode.
    pub fn bind(&mut self, value: S) {
        *self = Self::Bound(value);
    }

    /// Overwrites the value in place, keeping the current mode.
    pub fn set(&mut self, value: S) {
        match self {
            Self::Owned(current) | Self::Bound(current) => *current = value,
        }
    }

    /// Returns the slot to table ownership, keeping the current value.
    pub fn release(&mut self) {
        if let Self::Bound(value) = self {
            *self = Self::Owned(value.clone());
        }
    }

    /// Applies `next` to an owned slot. For a bound slot the value is left
    /// alone and returned as a change request. Proposing the current value
    /// is a no-op in both modes.
    pub fn propose(&mut self, next: S) -> Option<S> {
        if *self.get() == next {
            return None;
        }
        match self {
            Self::Owned(value) => {
                *value = next;
                None
            }
            Self::Bound(_) => Some(next),
        }
    }
}
