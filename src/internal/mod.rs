// SPDX-License-Identifier: MPL-2.0

//! Non-public state machinery of the resolver.

pub mod assignment;
