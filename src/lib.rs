// SPDX-License-Identifier: MPL-2.0

//! Backtracking semver dependency resolution.
//!
//! Version solving consists in finding, for a set of top-level version
//! constraints, one concrete version per required package such that every
//! dependency edge in the resulting graph is satisfied — or proving that
//! no such assignment exists. This crate implements a depth-first
//! backtracking search over a lazily discovered package graph, pruned by
//! canonical semver range arithmetic.
//!
//! # Packages and versions
//!
//! Package identifiers are any type implementing the
//! [`Package`](package::Package) trait, which is automatic for types that
//! are `Clone + Eq + Hash + Ord + Debug + Display` — `String` or `&str`
//! work out of the box. Versions are concrete
//! [`Version`](version::Version) values implementing the full semver 2.0
//! precedence rules, and requirements on them are
//! [`VersionSet`](version_set::VersionSet)s: canonical unions of
//! singletons and half-open ranges, closed under intersection and union.
//!
//! # Basic example
//!
//! Let's imagine we are building a user interface with a menu containing
//! dropdowns, dropdowns with some icons that other parts of the interface
//! use directly:
//!
//! - `root` depends on `menu` and `icons`
//! - `menu` depends on `dropdown`
//! - `dropdown` depends on `icons`
//! - `icons` has no dependency
//!
//! We can model that scenario and resolve it as follows:
//!
//! ```
//! use backsolve::constraint::Constraint;
//! use backsolve::provider::OfflineProvider;
//! use backsolve::solver::resolve;
//! use backsolve::version_set::VersionSet;
//!
//! let mut provider = OfflineProvider::new();
//! provider.add_dependencies("menu", (1, 0, 0), [("dropdown", VersionSet::any())]);
//! provider.add_dependencies("dropdown", (1, 0, 0), [("icons", VersionSet::any())]);
//! provider.add_dependencies("icons", (1, 0, 0), []);
//!
//! let solution = resolve(
//!     &provider,
//!     [
//!         Constraint::new("menu", VersionSet::any()),
//!         Constraint::new("icons", VersionSet::any()),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(solution.len(), 3);
//! ```
//!
//! # Providers
//!
//! The [`OfflineProvider`](provider::OfflineProvider) above holds the
//! whole catalog in memory. A real package manager implements
//! [`PackageProvider`](provider::PackageProvider) itself: the resolver
//! asks it lazily for a [`Container`](provider::Container) per package,
//! for the container's available versions (newest first — the order is
//! the preference order), and for the dependencies of each version it
//! tries. Answers are cached for the duration of one resolution, so each
//! question reaches the provider at most once.
//!
//! # Failure reporting
//!
//! When there is no solution, [`resolve`](solver::resolve) returns
//! [`ResolveError::Unsatisfiable`](error::ResolveError::Unsatisfiable)
//! carrying a witness: the constraints that were active at the deepest
//! conflict the search hit. The [`report`] module renders a witness (or a
//! dependency cycle) into a human-readable explanation:
//!
//! ```
//! use backsolve::report::{DefaultStringReporter, Reporter};
//! # use backsolve::constraint::Constraint;
//! # use backsolve::error::ResolveError;
//! # let error: ResolveError<&str> = ResolveError::Unsatisfiable { witness: vec![] };
//! let explanation = DefaultStringReporter::report(&error);
//! ```
//!
//! Observability hooks for decisions, conflicts and backtracks are
//! available by attaching a [`Delegate`](delegate::Delegate) to a
//! [`Resolver`](solver::Resolver); long-running resolutions can be
//! interrupted through a
//! [`CancellationToken`](solver::CancellationToken) the caller owns.

#![warn(missing_docs)]

pub mod constraint;
pub mod delegate;
pub mod error;
pub mod package;
pub mod provider;
pub mod report;
pub mod solver;
pub mod type_aliases;
pub mod version;
pub mod version_set;

mod internal;
