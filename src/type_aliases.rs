// SPDX-License-Identifier: MPL-2.0

//! Publicly exported type aliases.

use crate::version::Version;

/// Map implementation used by the crate.
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;

/// Concrete versions picked during [resolve](crate::solver::resolve):
/// one entry per package transitively reached from the root constraints.
pub type SelectedDependencies<P> = Map<P, Version>;
