// SPDX-License-Identifier: MPL-2.0

//! Turn a failed resolution into a human-readable explanation.

use std::fmt::Write;

use crate::error::ResolveError;
use crate::package::Package;

/// Trait for formatting the outcome of a failed resolution.
pub trait Reporter<P: Package> {
    /// Output type of the report.
    type Output;

    /// Generate a report from a resolution error.
    fn report(error: &ResolveError<P>) -> Self::Output;
}

/// Default reporter, outputting the report as a String.
pub struct DefaultStringReporter;

impl<P: Package> Reporter<P> for DefaultStringReporter {
    type Output = String;

    fn report(error: &ResolveError<P>) -> String {
        match error {
            ResolveError::Unsatisfiable { witness } => {
                let mut out = String::from("version solving failed");
                match witness.as_slice() {
                    [] => {}
                    [single] => {
                        let _ = write!(
                            out,
                            ": no version of {} satisfies {}",
                            single.package, single.requirement
                        );
                    }
                    [first, rest @ ..] => {
                        let _ = write!(
                            out,
                            ": {} is required at {}",
                            first.package, first.requirement
                        );
                        for constraint in rest {
                            let _ = write!(
                                out,
                                ", but also at {} by another dependency",
                                constraint.requirement
                            );
                        }
                    }
                }
                out
            }
            ResolveError::CycleDetected { path } => {
                let chain = path
                    .iter()
                    .map(P::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                format!("the chosen versions depend on each other in a cycle: {chain}")
            }
            other => other.to_string(),
        }
    }
}
