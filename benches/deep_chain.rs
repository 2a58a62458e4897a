// SPDX-License-Identifier: MPL-2.0

//! Benchmarks over synthetic package graphs: a deep dependency chain
//! (resolution should stay linear in its length), a wide fan-out, and a
//! chain that forces one backtrack per link.

use criterion::{criterion_group, criterion_main, Criterion};

use backsolve::constraint::Constraint;
use backsolve::provider::OfflineProvider;
use backsolve::solver::resolve;
use backsolve::version::Version;
use backsolve::version_set::VersionSet;

fn ver(n: u64) -> Version {
    Version::new(n, 0, 0)
}

fn one_to_two() -> VersionSet {
    VersionSet::between(ver(1), ver(2))
}

fn chain_provider(length: usize) -> OfflineProvider<String> {
    let mut provider = OfflineProvider::new();
    for i in 0..length {
        let deps = if i + 1 < length {
            vec![(format!("p{}", i + 1), one_to_two())]
        } else {
            vec![]
        };
        provider.add_dependencies(format!("p{i}"), ver(1), deps);
    }
    provider
}

fn deep_chain(c: &mut Criterion) {
    for length in [100usize, 500] {
        let provider = chain_provider(length);
        c.bench_function(&format!("deep_chain_{length}"), |b| {
            b.iter(|| {
                resolve(
                    &provider,
                    [Constraint::new("p0".to_string(), one_to_two())],
                )
                .unwrap()
            })
        });
    }
}

fn wide_fanout(c: &mut Criterion) {
    let width = 200usize;
    let versions_each = 10u64;
    let mut provider = OfflineProvider::new();
    let deps: Vec<_> = (0..width)
        .map(|i| (format!("leaf{i}"), VersionSet::between(ver(1), ver(versions_each + 1))))
        .collect();
    provider.add_dependencies("root".to_string(), ver(1), deps);
    for i in 0..width {
        for v in 1..=versions_each {
            provider.add_dependencies(format!("leaf{i}"), ver(v), []);
        }
    }

    c.bench_function("wide_fanout", |b| {
        b.iter(|| {
            resolve(
                &provider,
                [Constraint::new("root".to_string(), VersionSet::any())],
            )
            .unwrap()
        })
    });
}

/// Every link's newest version wants a leaf version that does not exist,
/// so the solver has to step down once per link.
fn backtracking_chain(c: &mut Criterion) {
    let length = 100usize;
    let mut provider = OfflineProvider::new();
    for i in 0..length {
        let next = format!("p{}", i + 1);
        let good = if i + 1 < length {
            vec![(next.clone(), VersionSet::any())]
        } else {
            vec![]
        };
        let bad = if i + 1 < length {
            vec![(next, VersionSet::between(ver(9), ver(10)))]
        } else {
            vec![("missing".to_string(), VersionSet::between(ver(9), ver(10)))]
        };
        provider.add_dependencies(format!("p{i}"), ver(2), bad);
        provider.add_dependencies(format!("p{i}"), ver(1), good);
    }
    provider.add_dependencies("missing".to_string(), ver(1), []);

    c.bench_function("backtracking_chain", |b| {
        b.iter(|| {
            resolve(
                &provider,
                [Constraint::new("p0".to_string(), VersionSet::any())],
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, deep_chain, wide_fanout, backtracking_chain);
criterion_main!(benches);
