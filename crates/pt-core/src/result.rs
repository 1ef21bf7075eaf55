//! Result type aliases and transition outcomes

use crate::error::TrackerError;

/// Standard Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Outcome of a guarded state transition.
///
/// Idempotent transitions (approving a lead that already left `New`) are not
/// errors: they report `Unchanged` with the current state and write nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<T> {
    /// The transition was applied and committed
    Applied(T),
    /// Preconditions were not met; nothing was written
    Unchanged(T),
}

impl<T> Transition<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Applied(v) | Self::Unchanged(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Applied(v) | Self::Unchanged(v) => v,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Transition<U> {
        match self {
            Self::Applied(v) => Transition::Applied(f(v)),
            Self::Unchanged(v) => Transition::Unchanged(f(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_accessors() {
        let applied = Transition::Applied(3);
        assert!(applied.is_applied());
        assert_eq!(*applied.value(), 3);

        let unchanged = Transition::Unchanged("lead").map(|s| s.len());
        assert!(!unchanged.is_applied());
        assert_eq!(unchanged.into_value(), 4);
    }
}
