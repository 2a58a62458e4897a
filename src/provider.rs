// SPDX-License-Identifier: MPL-2.0

//! The catalog capability the resolver consumes.
//!
//! A [`PackageProvider`] hands out a [`Container`] per package: a handle to
//! that package's available versions and per-version dependencies. On a
//! real package manager the container is backed by a registry or the file
//! system, so both lookups may block on I/O; the resolver treats them as
//! synchronous calls and caches each answer for the duration of one
//! resolution. A provider shared between concurrent resolutions must guard
//! its own caches (per-key single-flight keeps duplicate fetches down).

use std::collections::BTreeMap;

use crate::constraint::Constraint;
use crate::error::ProviderError;
use crate::package::Package;
use crate::type_aliases::Map;
use crate::version::Version;
use crate::version_set::VersionSet;

/// Trait that allows the resolver to enumerate packages and their
/// dependencies. An implementor needs to be supplied to
/// [resolve](crate::solver::resolve).
pub trait PackageProvider<P: Package> {
    /// The handle to one package's metadata.
    type Container: Container<P>;

    /// Look up the container for a package.
    /// Fails with [`ProviderError::UnknownPackage`] if the identifier
    /// names nothing, or [`ProviderError::ContainerLoad`] if the
    /// underlying load fails.
    fn get_container(&self, package: &P) -> Result<Self::Container, ProviderError<P>>;
}

/// Handle to a single package's metadata.
pub trait Container<P: Package> {
    /// All available versions, newest first. The provider decides
    /// policy, e.g. whether pre-releases are listed. The sequence is
    /// finite; the resolver queries it once per resolution.
    fn versions(&self) -> Vec<Version>;

    /// The direct dependencies of one version. Must return the same
    /// list on every call for the same version.
    fn get_dependencies(&self, version: &Version) -> Result<Vec<Constraint<P>>, ProviderError<P>>;
}

/// A basic implementation of [`PackageProvider`] that holds every package
/// in memory. Used by the test suites and benchmarks.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OfflineProvider<P: Package> {
    packages: Map<P, BTreeMap<Version, Vec<Constraint<P>>>>,
}

impl<P: Package> OfflineProvider<P> {
    /// Creates an empty provider with no packages.
    pub fn new() -> Self {
        Self {
            packages: Map::default(),
        }
    }

    /// Registers the dependencies of a package and version pair.
    /// All dependencies of the pair must be given in one call; a second
    /// call for the same pair replaces the previous list.
    pub fn add_dependencies<I: IntoIterator<Item = (P, VersionSet)>>(
        &mut self,
        package: P,
        version: impl Into<Version>,
        dependencies: I,
    ) {
        let constraints = dependencies
            .into_iter()
            .map(|(package, requirement)| Constraint::new(package, requirement))
            .collect();
        self.packages
            .entry(package)
            .or_default()
            .insert(version.into(), constraints);
    }

    /// Lists the registered packages, in no particular order.
    pub fn packages(&self) -> impl Iterator<Item = &P> {
        self.packages.keys()
    }
}

impl<P: Package> Default for OfflineProvider<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Package> PackageProvider<P> for OfflineProvider<P> {
    type Container = OfflineContainer<P>;

    fn get_container(&self, package: &P) -> Result<Self::Container, ProviderError<P>> {
        match self.packages.get(package) {
            Some(versions) => Ok(OfflineContainer {
                package: package.clone(),
                versions: versions.clone(),
            }),
            None => Err(ProviderError::UnknownPackage(package.clone())),
        }
    }
}

/// Container handed out by [`OfflineProvider`].
#[derive(Debug, Clone)]
pub struct OfflineContainer<P: Package> {
    package: P,
    versions: BTreeMap<Version, Vec<Constraint<P>>>,
}

impl<P: Package> Container<P> for OfflineContainer<P> {
    fn versions(&self) -> Vec<Version> {
        self.versions.keys().rev().cloned().collect()
    }

    fn get_dependencies(&self, version: &Version) -> Result<Vec<Constraint<P>>, ProviderError<P>> {
        match self.versions.get(version) {
            Some(dependencies) => Ok(dependencies.clone()),
            None => Err(ProviderError::ContainerLoad {
                package: self.package.clone(),
                source: format!("no version {version} on record").into(),
            }),
        }
    }
}
