//! Nil-status lattice for response value tracking.

/// Nil status of an SSA value.
///
/// `Unknown` and `MaybeNull` are distinct: `Unknown` means the analysis gave
/// up on this value; `MaybeNull` means a definite witness of nilness exists on
/// some path. Reporting merges them (both are "not provably non-nil").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NilStatus {
    /// Guaranteed not nil (fresh allocation, non-nil constant).
    NotNull,
    /// May or may not be nil (phi merge, conditional helper return).
    MaybeNull,
    /// Guaranteed nil (nil literal on every path).
    DefinitelyNull,
    /// Analysis gave up (unrecognized instruction, cycle, dynamic call).
    Unknown,
}

impl NilStatus {
    /// Join two statuses (least upper bound in the information order).
    ///
    /// Joining `Unknown` with `DefinitelyNull` is pessimistic (`MaybeNull`):
    /// a witness of nilness exists on some path even though the other side is
    /// indeterminate.
    pub fn join(self, other: NilStatus) -> NilStatus {
        use NilStatus::*;
        match (self, other) {
            (a, b) if a == b => a,
            (MaybeNull, _) | (_, MaybeNull) => MaybeNull,
            (DefinitelyNull, Unknown) | (Unknown, DefinitelyNull) => MaybeNull,
            (Unknown, _) | (_, Unknown) => Unknown,
            // NotNull with DefinitelyNull
            _ => MaybeNull,
        }
    }

    /// True if the value could be nil at runtime, including unknown cases.
    /// This is the driver's reporting predicate.
    pub fn may_be_null(self) -> bool {
        self != NilStatus::NotNull
    }

    /// Joins cannot improve past this point; loops short-circuit here.
    pub fn is_saturated(self) -> bool {
        matches!(self, NilStatus::MaybeNull | NilStatus::DefinitelyNull)
    }
}
