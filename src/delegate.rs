// SPDX-License-Identifier: MPL-2.0

//! Observability hooks for a resolution in progress.

use std::fmt::{self, Display};

use crate::constraint::Constraint;
use crate::package::Package;
use crate::version::Version;

/// Why a candidate version was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// A dependency's requirement intersected an existing requirement
    /// down to the empty set.
    EmptyIntersection,
    /// A dependency's requirement excluded the version an already-bound
    /// package was decided at.
    IncompatibleBinding,
    /// No candidate version of the package satisfies its requirement.
    NoCandidates,
}

impl Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::EmptyIntersection => write!(f, "requirements are incompatible"),
            ConflictReason::IncompatibleBinding => {
                write!(f, "requirement excludes the already-chosen version")
            }
            ConflictReason::NoCandidates => write!(f, "no candidate version satisfies"),
        }
    }
}

/// Observer of resolver decisions, conflicts and backtracks.
///
/// All methods default to no-ops, so an implementation only overrides the
/// events it cares about. A delegate must not mutate resolver state; it
/// only watches.
pub trait Delegate<P: Package> {
    /// The resolver selected a package and is about to try its candidate
    /// versions.
    fn will_resolve(&mut self, package: &P) {
        let _ = package;
    }

    /// A candidate version was bound and its dependencies propagated
    /// without conflict.
    fn did_resolve(&mut self, package: &P, version: &Version) {
        let _ = (package, version);
    }

    /// The resolver is about to undo the package's current binding and
    /// try an alternative.
    fn will_backtrack(&mut self, package: &P) {
        let _ = package;
    }

    /// A constraint was rejected. Local only; the search continues.
    fn conflict(&mut self, constraint: &Constraint<P>, reason: ConflictReason) {
        let _ = (constraint, reason);
    }
}
