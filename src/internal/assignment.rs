// SPDX-License-Identifier: MPL-2.0

//! The assignment is the current state of the solution being built:
//! the versions decided so far plus the accumulated requirement on every
//! package mentioned by an active constraint.
//!
//! Every mutation made on behalf of one tentative decision is recorded in
//! a [`Delta`], so a rejected decision is undone in time proportional to
//! the number of requirements it touched.

use crate::package::Package;
use crate::type_aliases::{Map, SelectedDependencies};
use crate::version::Version;
use crate::version_set::VersionSet;

/// Outcome of intersecting a new constraint into the assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constrained {
    /// The requirement was committed (possibly unchanged).
    Updated,
    /// The intersection is empty; nothing was committed.
    Emptied,
}

/// Undo record for one tentative decision: the prior requirement of every
/// package the decision touched, plus where the introduction order stood.
#[derive(Debug)]
pub struct Delta<P: Package> {
    touched: Vec<(P, Option<VersionSet>)>,
    order_mark: usize,
}

/// The resolver's working state.
///
/// Two maps keyed by package: *bindings* hold the version decided for
/// each package, *requirements* hold the intersection of every active
/// constraint on each mentioned package. `order` remembers the order in
/// which packages were first mentioned, which is the deterministic
/// tie-break for selection.
pub struct Assignment<P: Package> {
    bindings: Map<P, Version>,
    requirements: Map<P, VersionSet>,
    order: Vec<P>,
}

impl<P: Package> Assignment<P> {
    /// An assignment with no bindings and no requirements.
    pub fn empty() -> Self {
        Self {
            bindings: Map::default(),
            requirements: Map::default(),
            order: Vec::new(),
        }
    }

    /// The accumulated requirement on a package, if any constraint has
    /// mentioned it. A missing entry means "any version".
    pub fn requirement(&self, package: &P) -> Option<&VersionSet> {
        self.requirements.get(package)
    }

    /// The version a package was decided at, if it is bound.
    pub fn binding(&self, package: &P) -> Option<&Version> {
        self.bindings.get(package)
    }

    /// Every package mentioned so far, in first-introduction order.
    pub fn packages(&self) -> impl Iterator<Item = &P> {
        self.order.iter()
    }

    /// Start an undo record at the current state.
    pub fn delta(&self) -> Delta<P> {
        Delta {
            touched: Vec::new(),
            order_mark: self.order.len(),
        }
    }

    /// Intersect `set` into the requirement on `package`.
    ///
    /// On [`Constrained::Emptied`] nothing is committed, keeping the
    /// invariant that every stored requirement is non-empty. Otherwise
    /// the prior state is pushed onto `delta`.
    pub fn constrain(
        &mut self,
        package: &P,
        set: &VersionSet,
        delta: &mut Delta<P>,
    ) -> Constrained {
        let new = match self.requirements.get(package) {
            Some(requirement) => requirement.intersection(set),
            None => set.clone(),
        };
        if new.is_empty() {
            return Constrained::Emptied;
        }
        let prior = self.requirements.insert(package.clone(), new);
        if prior.is_none() {
            self.order.push(package.clone());
        }
        delta.touched.push((package.clone(), prior));
        Constrained::Updated
    }

    /// Decide a package at a version.
    pub fn bind(&mut self, package: P, version: Version) {
        debug_assert!(
            self.requirements
                .get(&package)
                .is_some_and(|r| r.contains(&version)),
            "binding outside the accumulated requirement"
        );
        self.bindings.insert(package, version);
    }

    /// Drop a package's binding, e.g. when its decision is undone.
    pub fn unbind(&mut self, package: &P) {
        self.bindings.remove(package);
    }

    /// Undo everything recorded in `delta`, newest first.
    ///
    /// Deltas must be reverted in reverse order of creation; the order
    /// mark only lines up when no younger delta is still outstanding.
    pub fn revert(&mut self, delta: Delta<P>) {
        for (package, prior) in delta.touched.into_iter().rev() {
            match prior {
                Some(requirement) => {
                    self.requirements.insert(package, requirement);
                }
                None => {
                    self.requirements.remove(&package);
                }
            }
        }
        self.order.truncate(delta.order_mark);
    }

    /// The bindings as a finished solution.
    pub fn solution(&self) -> SelectedDependencies<P> {
        self.bindings.clone()
    }
}
