// SPDX-License-Identifier: MPL-2.0

//! A constraint is one edge's demand on a target package.

use std::fmt::{self, Display};

use crate::package::Package;
use crate::version_set::VersionSet;

/// A package identifier paired with the set of versions an edge accepts
/// for it. Pure value; equality and hashing cover both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint<P: Package> {
    /// The package being constrained.
    pub package: P,
    /// The versions the constraint accepts.
    pub requirement: VersionSet,
}

impl<P: Package> Constraint<P> {
    /// Pair a package with a requirement.
    pub fn new(package: P, requirement: VersionSet) -> Self {
        Self {
            package,
            requirement,
        }
    }
}

impl<P: Package> Display for Constraint<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.package, self.requirement)
    }
}
