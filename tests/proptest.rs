// SPDX-License-Identifier: MPL-2.0

use std::collections::HashSet;

use proptest::prelude::*;

use backsolve::constraint::Constraint;
use backsolve::error::ResolveError;
use backsolve::provider::{Container, OfflineProvider, PackageProvider};
use backsolve::solver::resolve;
use backsolve::type_aliases::SelectedDependencies;
use backsolve::version::{PreRelease, Version};
use backsolve::version_set::VersionSet;

fn ver(n: u64) -> Version {
    Version::new(n, 0, 0)
}

/// This generates a random registry index.
///
/// Every dependency edge points from a lower-indexed package to a
/// higher-indexed one, so the generated graphs are acyclic by
/// construction and every named package exists. Requirements may still
/// be empty or unsatisfiable, which exercises the conflict paths.
fn registry_strategy(
) -> impl Strategy<Value = (OfflineProvider<String>, Vec<Constraint<String>>)> {
    (2usize..8)
        .prop_flat_map(|n| {
            let versions_per_package = prop::collection::vec(1u64..=4, n);
            let raw_edges = prop::collection::vec(
                (0..n, 0..n, 0u64..5, 0u64..3, 0usize..4),
                0..3 * n,
            );
            (Just(n), versions_per_package, raw_edges)
        })
        .prop_map(|(n, versions_per_package, raw_edges)| {
            let name = |i: usize| format!("p{i}");

            let mut dependencies: Vec<Vec<Vec<(String, VersionSet)>>> = versions_per_package
                .iter()
                .map(|&count| vec![Vec::new(); count as usize])
                .collect();
            for (a, b, lo, len, pick) in raw_edges {
                if a == b {
                    continue;
                }
                let (src, dst) = if a < b { (a, b) } else { (b, a) };
                let version_idx = pick % versions_per_package[src] as usize;
                let requirement = VersionSet::between(ver(lo), ver(lo + len));
                dependencies[src][version_idx].push((name(dst), requirement));
            }

            let mut provider = OfflineProvider::new();
            for (i, &count) in versions_per_package.iter().enumerate() {
                for v in 1..=count {
                    provider.add_dependencies(
                        name(i),
                        ver(v),
                        dependencies[i][(v - 1) as usize].clone(),
                    );
                }
            }
            let roots = vec![Constraint::new(name(0), VersionSet::any())];
            (provider, roots)
        })
}

/// Soundness, consistency and minimality of a returned solution, checked
/// straight against the provider's records.
fn assert_solution_valid(
    provider: &OfflineProvider<String>,
    roots: &[Constraint<String>],
    solution: &SelectedDependencies<String>,
) {
    for root in roots {
        let chosen = solution
            .get(&root.package)
            .unwrap_or_else(|| panic!("root {} missing from solution", root.package));
        assert!(root.requirement.contains(chosen));
    }

    let mut reachable: HashSet<String> = roots.iter().map(|c| c.package.clone()).collect();
    let mut frontier: Vec<String> = reachable.iter().cloned().collect();
    while let Some(package) = frontier.pop() {
        let version = &solution[&package];
        let container = provider.get_container(&package).unwrap();
        assert!(
            container.versions().contains(version),
            "{package} bound to an unavailable version {version}"
        );
        for dependency in container.get_dependencies(version).unwrap() {
            let target = solution
                .get(&dependency.package)
                .unwrap_or_else(|| panic!("{} missing from solution", dependency.package));
            assert!(
                dependency.requirement.contains(target),
                "{} {} violates {}",
                dependency.package,
                target,
                dependency
            );
            if reachable.insert(dependency.package.clone()) {
                frontier.push(dependency.package);
            }
        }
    }

    // No extras: exactly the packages reachable from the roots.
    let solved: HashSet<String> = solution.keys().cloned().collect();
    assert_eq!(solved, reachable);
}

fn version_strategy() -> impl Strategy<Value = Version> {
    let identifier = prop_oneof![
        (0u64..5).prop_map(PreRelease::Numeric),
        "[a-c]{1,2}".prop_map(PreRelease::Alphanumeric),
    ];
    (
        0u64..3,
        0u64..3,
        0u64..3,
        prop::option::of(prop::collection::vec(identifier, 1..3)),
    )
        .prop_map(|(major, minor, patch, pre)| {
            let version = Version::new(major, minor, patch);
            match pre {
                Some(pre) => version.with_pre(pre),
                None => version,
            }
        })
}

proptest! {

    #[test]
    fn solutions_are_sound_consistent_and_minimal(
        (provider, roots) in registry_strategy()
    ) {
        match resolve(&provider, roots.clone()) {
            Ok(solution) => assert_solution_valid(&provider, &roots, &solution),
            Err(ResolveError::Unsatisfiable { witness }) => prop_assert!(!witness.is_empty()),
            Err(other) => prop_assert!(false, "unexpected failure: {other}"),
        }
    }

    #[test]
    fn resolution_is_deterministic((provider, roots) in registry_strategy()) {
        let first = resolve(&provider, roots.clone());
        let second = resolve(&provider, roots);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (
                Err(ResolveError::Unsatisfiable { witness: a }),
                Err(ResolveError::Unsatisfiable { witness: b }),
            ) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "diverging outcomes: {a:?} vs {b:?}"),
        }
    }

    // Version ordering is total: exactly one relation holds, and the
    // order is transitive and antisymmetric.

    #[test]
    fn version_order_is_transitive(
        a in version_strategy(),
        b in version_strategy(),
        c in version_strategy()
    ) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn version_order_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
        if a <= b && b <= a {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn version_order_is_total(a in version_strategy(), b in version_strategy()) {
        let relations = [a < b, a == b, a > b];
        prop_assert_eq!(relations.iter().filter(|r| **r).count(), 1);
    }
}
