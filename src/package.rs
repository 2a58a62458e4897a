// SPDX-License-Identifier: MPL-2.0

//! Trait for identifying packages.
//! Automatically implemented for types implementing
//! Clone + Eq + Hash + Ord + Debug + Display.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait for identifying packages. The resolver treats identifiers as
/// opaque: it only clones, compares, hashes and prints them.
pub trait Package: Clone + Eq + Hash + Ord + Debug + Display {}

/// Automatically implement the Package trait for any type
/// that already implements its bounds.
impl<T: Clone + Eq + Hash + Ord + Debug + Display> Package for T {}
