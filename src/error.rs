// SPDX-License-Identifier: MPL-2.0

//! Handling resolver errors.
//!
//! Local conflicts (an emptied intersection, exhausted candidate versions
//! at a non-root frame) never appear here: they are control flow inside
//! the search and only surface as [`ResolveError::Unsatisfiable`] when the
//! root frame runs out of alternatives.

use std::fmt::Display;

use thiserror::Error;

use crate::constraint::Constraint;
use crate::package::Package;
use crate::version::MalformedVersion;
use crate::version_set::MalformedVersionSet;

/// Errors that may occur while loading packages from a
/// [PackageProvider](crate::provider::PackageProvider).
/// All of them are fatal to the resolution; none triggers backtracking.
#[derive(Error, Debug)]
pub enum ProviderError<P: Package> {
    /// The provider has no package under the given identifier.
    #[error("unknown package `{0}`")]
    UnknownPackage(P),

    /// The provider failed to load a package's container,
    /// e.g. an I/O failure or an unreadable manifest.
    #[error("failed to load container for `{package}`")]
    ContainerLoad {
        /// The package whose container could not be loaded.
        package: P,
        /// The underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A version string on the provider side did not parse.
    #[error(transparent)]
    MalformedVersion(#[from] MalformedVersion),

    /// A requirement string on the provider side did not parse.
    #[error(transparent)]
    MalformedVersionSet(#[from] MalformedVersionSet),
}

/// Errors returned by [resolve](crate::solver::resolve).
#[derive(Error, Debug)]
pub enum ResolveError<P: Package> {
    /// The search exhausted every alternative without finding a
    /// solution. The witness holds the constraints that were active at
    /// the deepest conflict, enough to name the incompatible edges.
    #[error("no version assignment satisfies the given constraints")]
    Unsatisfiable {
        /// Constraints active at the deepest conflict.
        witness: Vec<Constraint<P>>,
    },

    /// The dependency graph at the chosen versions contains a cycle.
    #[error("dependency cycle detected: {}", join_path(.path))]
    CycleDetected {
        /// The packages along the cycle; first and last entries are the
        /// same package.
        path: Vec<P>,
    },

    /// The provider failed; see [`ProviderError`].
    #[error(transparent)]
    Provider(#[from] ProviderError<P>),

    /// The caller's cancellation token was tripped.
    #[error("resolution cancelled")]
    Cancelled,
}

fn join_path<P: Display>(path: &[P]) -> String {
    path.iter()
        .map(P::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
