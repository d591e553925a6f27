//! Threshold evaluation and aggregation benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use scangate_core::types::{Alert, AlertSummary, Severity};
use scangate_session::aggregate::summarize;
use scangate_session::config::{SeverityThreshold, ThresholdPolicy};
use scangate_session::threshold::evaluate;

fn bench_policy() -> ThresholdPolicy {
    ThresholdPolicy {
        high: SeverityThreshold {
            weight: 10,
            soft_limit: 0,
        },
        medium: SeverityThreshold {
            weight: 3,
            soft_limit: 9,
        },
        low: SeverityThreshold {
            weight: 1,
            soft_limit: 10,
        },
        informational: SeverityThreshold {
            weight: 0,
            soft_limit: 0,
        },
        cumulative_soft_limit: 50,
    }
}

fn make_alerts(count: usize) -> Vec<Alert> {
    let severities = Severity::ALL;
    (0..count)
        .map(|i| {
            // ~25% duplicate identities to exercise the seen-set.
            let name = format!("alert-{}", i % (count * 3 / 4 + 1));
            Alert::new(name, severities[i % severities.len()])
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let policy = bench_policy();
    let summary = AlertSummary {
        high: 2,
        medium: 7,
        low: 13,
        informational: 40,
    };

    c.bench_function("threshold_evaluate", |b| {
        b.iter(|| evaluate(black_box(&summary), black_box(&policy)));
    });
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for size in [10usize, 100, 1000, 10_000] {
        let alerts = make_alerts(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &alerts, |b, alerts| {
            b.iter(|| summarize(black_box(alerts)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_summarize);
criterion_main!(benches);
