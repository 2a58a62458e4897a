// SPDX-License-Identifier: MPL-2.0

//! Backtracking version solving.
//!
//! Version solving consists in finding a set of packages and versions
//! that satisfy all the constraints of a given project's dependencies.
//! The search here is a depth-first backtracking walk over a lazily
//! discovered graph: the resolver keeps an assignment of tentative
//! decisions, always picks the unbound package with the fewest candidate
//! versions left (conflicts surface earlier that way), tries that
//! package's versions newest first, and folds each chosen version's
//! dependencies back into the assignment. A conflict rejects the current
//! candidate; when a package runs out of candidates the most recent
//! decision with unexplored alternatives is undone and the search resumes
//! there. Only the root running out of alternatives makes the whole
//! resolution unsatisfiable.
//!
//! ## API
//!
//! ```
//! use backsolve::constraint::Constraint;
//! use backsolve::provider::OfflineProvider;
//! use backsolve::solver::resolve;
//! use backsolve::version_set::VersionSet;
//!
//! let mut provider = OfflineProvider::new();
//! provider.add_dependencies("menu", (1, 0, 0), [("icons", VersionSet::any())]);
//! provider.add_dependencies("icons", (1, 0, 0), []);
//!
//! let solution = resolve(
//!     &provider,
//!     [Constraint::new("menu", VersionSet::between((1, 0, 0), (2, 0, 0)))],
//! )
//! .unwrap();
//! assert_eq!(solution["menu"], (1, 0, 0).into());
//! assert_eq!(solution["icons"], (1, 0, 0).into());
//! ```
//!
//! Where `provider` supplies the available packages and their
//! dependencies by implementing [PackageProvider]. For observation hooks
//! or cancellation, build a [Resolver] instead of calling [resolve]
//! directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::constraint::Constraint;
use crate::delegate::{ConflictReason, Delegate};
use crate::error::ResolveError;
use crate::internal::assignment::{Assignment, Constrained, Delta};
use crate::package::Package;
use crate::provider::{Container, PackageProvider};
use crate::type_aliases::{Map, SelectedDependencies};
use crate::version::Version;
use crate::version_set::VersionSet;

/// Cooperative cancellation flag, owned by the caller and checked by the
/// resolver before every selection step and every provider call.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Every resolution watching it returns
    /// [`ResolveError::Cancelled`] at its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](CancellationToken::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Main function of the library. Finds a set of package versions
/// satisfying the given root constraints, or reports why none exists.
pub fn resolve<P: Package, Prov: PackageProvider<P>>(
    provider: &Prov,
    constraints: impl IntoIterator<Item = Constraint<P>>,
) -> Result<SelectedDependencies<P>, ResolveError<P>> {
    Resolver::new(provider).resolve(constraints)
}

/// A configurable resolution: [resolve] with an optional [Delegate] and
/// an optional [CancellationToken].
///
/// The resolver keeps no state between calls; each call to
/// [`resolve`](Resolver::resolve) owns its assignment and its caches of
/// provider answers.
pub struct Resolver<'a, P: Package, Prov: PackageProvider<P>> {
    provider: &'a Prov,
    delegate: Option<&'a mut dyn Delegate<P>>,
    cancellation: Option<CancellationToken>,
}

impl<'a, P: Package, Prov: PackageProvider<P>> Resolver<'a, P, Prov> {
    /// A resolver over the given provider, with no delegate and no
    /// cancellation.
    pub fn new(provider: &'a Prov) -> Self {
        Self {
            provider,
            delegate: None,
            cancellation: None,
        }
    }

    /// Attach an observer for decisions, conflicts and backtracks.
    pub fn with_delegate(mut self, delegate: &'a mut dyn Delegate<P>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Watch a cancellation token owned by the caller.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Run one resolution for the given root constraints.
    pub fn resolve(
        &mut self,
        constraints: impl IntoIterator<Item = Constraint<P>>,
    ) -> Result<SelectedDependencies<P>, ResolveError<P>> {
        let search = Search {
            provider: self.provider,
            delegate: match self.delegate {
                Some(ref mut d) => Some(&mut **d),
                None => None,
            },
            cancellation: self.cancellation.as_ref(),
            assignment: Assignment::empty(),
            containers: Map::default(),
            deepest_depth: 0,
            deepest_witness: Vec::new(),
        };
        search.run(constraints.into_iter().collect())
    }
}

/// Provider answers cached for the duration of one resolution: the
/// version list on first container query, each dependency list on first
/// use of that version.
struct ContainerEntry<P: Package, C> {
    container: C,
    versions: Vec<Version>,
    dependencies: Map<Version, Vec<Constraint<P>>>,
}

/// One decision: the package, its candidate versions in preference
/// order, the next candidate to try, and the undo record of the
/// currently-committed candidate.
struct Frame<P: Package> {
    package: P,
    candidates: Vec<Version>,
    next: usize,
    delta: Option<Delta<P>>,
}

struct Search<'s, P: Package, Prov: PackageProvider<P>> {
    provider: &'s Prov,
    delegate: Option<&'s mut dyn Delegate<P>>,
    cancellation: Option<&'s CancellationToken>,
    assignment: Assignment<P>,
    containers: Map<P, ContainerEntry<P, Prov::Container>>,
    deepest_depth: usize,
    deepest_witness: Vec<Constraint<P>>,
}

impl<P: Package, Prov: PackageProvider<P>> Search<'_, P, Prov> {
    fn run(mut self, roots: Vec<Constraint<P>>) -> Result<SelectedDependencies<P>, ResolveError<P>> {
        // Seed the requirements from the root constraints. Roots are
        // permanent, so their delta is never reverted.
        let mut seed = self.assignment.delta();
        for root in &roots {
            match self
                .assignment
                .constrain(&root.package, &root.requirement, &mut seed)
            {
                Constrained::Updated => {}
                Constrained::Emptied => {
                    let witness = roots
                        .iter()
                        .filter(|c| c.package == root.package)
                        .cloned()
                        .collect();
                    return Err(ResolveError::Unsatisfiable { witness });
                }
            }
        }

        let mut stack: Vec<Frame<P>> = Vec::new();
        loop {
            let Some(package) = self.select()? else {
                // Every reached package is bound.
                let solution = self.assignment.solution();
                self.check_cycles(&roots, &solution)?;
                return Ok(solution);
            };
            if let Some(delegate) = self.delegate.as_deref_mut() {
                delegate.will_resolve(&package);
            }
            debug!("deciding {package}");
            let candidates = self.candidates(&package)?;
            stack.push(Frame {
                package,
                candidates,
                next: 0,
                delta: None,
            });

            // Bind the newest frame, unwinding as long as frames keep
            // running out of candidates.
            loop {
                let depth = stack.len();
                let mut frame = stack.pop().expect("entered with a frame on the stack");
                if self.try_next_candidate(&mut frame, depth)? {
                    stack.push(frame);
                    break;
                }

                // Exhausted: a local conflict on this package.
                let requirement = self
                    .assignment
                    .requirement(&frame.package)
                    .cloned()
                    .unwrap_or(VersionSet::Any);
                let conflict = Constraint::new(frame.package.clone(), requirement);
                self.note_conflict(depth, vec![conflict.clone()]);
                if let Some(delegate) = self.delegate.as_deref_mut() {
                    delegate.conflict(&conflict, ConflictReason::NoCandidates);
                }
                debug!("no candidates left for {}", frame.package);

                match stack.last_mut() {
                    None => {
                        return Err(ResolveError::Unsatisfiable {
                            witness: std::mem::take(&mut self.deepest_witness),
                        })
                    }
                    Some(parent) => {
                        trace!("backtracking to {}", parent.package);
                        if let Some(delegate) = self.delegate.as_deref_mut() {
                            delegate.will_backtrack(&parent.package);
                        }
                        let delta = parent.delta.take().expect("a stacked frame is bound");
                        self.assignment.revert(delta);
                        self.assignment.unbind(&parent.package);
                    }
                }
            }
        }
    }

    /// Bind the frame's next acceptable candidate, propagating its
    /// dependencies. Returns false when the frame has no candidate left.
    fn try_next_candidate(
        &mut self,
        frame: &mut Frame<P>,
        depth: usize,
    ) -> Result<bool, ResolveError<P>> {
        while frame.next < frame.candidates.len() {
            let version = frame.candidates[frame.next].clone();
            frame.next += 1;

            let dependencies = self.dependencies(&frame.package, &version)?;
            self.assignment.bind(frame.package.clone(), version.clone());
            let mut delta = self.assignment.delta();

            let mut rejection: Option<(Constraint<P>, ConflictReason, Vec<Constraint<P>>)> = None;
            for dependency in &dependencies {
                let prior = self
                    .assignment
                    .requirement(&dependency.package)
                    .cloned()
                    .unwrap_or(VersionSet::Any);
                match self
                    .assignment
                    .constrain(&dependency.package, &dependency.requirement, &mut delta)
                {
                    Constrained::Emptied => {
                        let witness = vec![
                            Constraint::new(dependency.package.clone(), prior),
                            dependency.clone(),
                        ];
                        rejection =
                            Some((dependency.clone(), ConflictReason::EmptyIntersection, witness));
                        break;
                    }
                    Constrained::Updated => {
                        if let Some(bound) = self.assignment.binding(&dependency.package) {
                            if !dependency.requirement.contains(bound) {
                                let witness = vec![
                                    Constraint::new(
                                        dependency.package.clone(),
                                        VersionSet::exact(bound.clone()),
                                    ),
                                    dependency.clone(),
                                ];
                                rejection = Some((
                                    dependency.clone(),
                                    ConflictReason::IncompatibleBinding,
                                    witness,
                                ));
                                break;
                            }
                        }
                    }
                }
            }

            match rejection {
                None => {
                    frame.delta = Some(delta);
                    debug!("bound {} {version}", frame.package);
                    if let Some(delegate) = self.delegate.as_deref_mut() {
                        delegate.did_resolve(&frame.package, &version);
                    }
                    return Ok(true);
                }
                Some((constraint, reason, witness)) => {
                    trace!("rejected {} {version}: {constraint} ({reason})", frame.package);
                    // The conflict happened inside the tentative binding,
                    // one level below the frame itself.
                    self.note_conflict(depth + 1, witness);
                    if let Some(delegate) = self.delegate.as_deref_mut() {
                        delegate.conflict(&constraint, reason);
                    }
                    self.assignment.revert(delta);
                    self.assignment.unbind(&frame.package);
                }
            }
        }
        Ok(false)
    }

    /// Pick the next package to decide: the unbound package with the
    /// fewest candidate versions inside its requirement. Packages that
    /// run out of versions quickly surface conflicts quickly. Ties keep
    /// the first-introduced package, which makes the search
    /// deterministic.
    fn select(&mut self) -> Result<Option<P>, ResolveError<P>> {
        self.check_cancelled()?;
        let pending: Vec<P> = self
            .assignment
            .packages()
            .filter(|package| self.assignment.binding(package).is_none())
            .cloned()
            .collect();

        let mut best: Option<(usize, P)> = None;
        for package in pending {
            self.ensure_container(&package)?;
            let requirement = self
                .assignment
                .requirement(&package)
                .cloned()
                .unwrap_or(VersionSet::Any);
            let count = self.containers[&package]
                .versions
                .iter()
                .filter(|version| requirement.contains(version))
                .count();
            if best.as_ref().map_or(true, |(c, _)| count < *c) {
                best = Some((count, package));
            }
        }
        Ok(best.map(|(_, package)| package))
    }

    /// The versions of a package inside its current requirement, newest
    /// first.
    fn candidates(&mut self, package: &P) -> Result<Vec<Version>, ResolveError<P>> {
        self.ensure_container(package)?;
        let requirement = self
            .assignment
            .requirement(package)
            .cloned()
            .unwrap_or(VersionSet::Any);
        Ok(self.containers[package]
            .versions
            .iter()
            .filter(|version| requirement.contains(version))
            .cloned()
            .collect())
    }

    fn ensure_container(&mut self, package: &P) -> Result<(), ResolveError<P>> {
        if self.containers.contains_key(package) {
            return Ok(());
        }
        self.check_cancelled()?;
        let container = self.provider.get_container(package)?;
        let versions = container.versions();
        self.containers.insert(
            package.clone(),
            ContainerEntry {
                container,
                versions,
                dependencies: Map::default(),
            },
        );
        Ok(())
    }

    fn dependencies(
        &mut self,
        package: &P,
        version: &Version,
    ) -> Result<Vec<Constraint<P>>, ResolveError<P>> {
        self.ensure_container(package)?;
        if !self.containers[package].dependencies.contains_key(version) {
            self.check_cancelled()?;
            let entry = self
                .containers
                .get_mut(package)
                .expect("container cached above");
            let dependencies = entry.container.get_dependencies(version)?;
            entry.dependencies.insert(version.clone(), dependencies);
        }
        Ok(self.containers[package].dependencies[version].clone())
    }

    /// Remember the constraints active at the deepest conflict seen so
    /// far; on equal depth the most recent conflict wins, so the witness
    /// points at the edge the search actually died on.
    fn note_conflict(&mut self, depth: usize, witness: Vec<Constraint<P>>) {
        if depth >= self.deepest_depth {
            self.deepest_depth = depth;
            self.deepest_witness = witness;
        }
    }

    fn check_cancelled(&self) -> Result<(), ResolveError<P>> {
        match self.cancellation {
            Some(token) if token.is_cancelled() => Err(ResolveError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Reject a solved graph that contains a dependency cycle among the
    /// chosen versions. Every edge was cached while binding, so this
    /// walk never touches the provider.
    fn check_cycles(
        &self,
        roots: &[Constraint<P>],
        solution: &SelectedDependencies<P>,
    ) -> Result<(), ResolveError<P>> {
        const ON_PATH: u8 = 1;
        const DONE: u8 = 2;
        let mut state: Map<P, u8> = Map::default();

        for root in roots {
            if state.contains_key(&root.package) {
                continue;
            }
            let mut path: Vec<(P, Vec<P>, usize)> = Vec::new();
            state.insert(root.package.clone(), ON_PATH);
            path.push((
                root.package.clone(),
                self.chosen_dependencies(&root.package, solution),
                0,
            ));

            loop {
                let Some((package, children, idx)) = path.last_mut() else {
                    break;
                };
                if *idx >= children.len() {
                    let package = package.clone();
                    path.pop();
                    state.insert(package, DONE);
                    continue;
                }
                let child = children[*idx].clone();
                *idx += 1;

                match state.get(&child).copied() {
                    Some(ON_PATH) => {
                        let start = path
                            .iter()
                            .position(|(p, _, _)| *p == child)
                            .expect("a package on the path is marked as such");
                        let mut cycle: Vec<P> =
                            path[start..].iter().map(|(p, _, _)| p.clone()).collect();
                        cycle.push(child);
                        return Err(ResolveError::CycleDetected { path: cycle });
                    }
                    Some(_) => {}
                    None => {
                        state.insert(child.clone(), ON_PATH);
                        let grandchildren = self.chosen_dependencies(&child, solution);
                        path.push((child, grandchildren, 0));
                    }
                }
            }
        }
        Ok(())
    }

    fn chosen_dependencies(&self, package: &P, solution: &SelectedDependencies<P>) -> Vec<P> {
        let version = &solution[package];
        self.containers[package].dependencies[version]
            .iter()
            .map(|constraint| constraint.package.clone())
            .collect()
    }
}
