/// Forwarding overhead of the filter pipeline
///
/// Measures a count query and an attribute read through chains of inert
/// filters of increasing length, against the bare terminal server.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mbean_pipeline::mbean::{InMemoryMBeanServer, MBeanServer, ObjectName, SimpleMBean};
use mbean_pipeline::pipeline::{MBeanServerPipeline, PassThroughFilter};
use serde_json::json;
use std::sync::Arc;

fn build_pipeline(rt: &tokio::runtime::Runtime, filters: i32) -> MBeanServerPipeline {
    let terminal = Arc::new(InMemoryMBeanServer::default());
    rt.block_on(async {
        terminal
            .register_mbean(
                ObjectName::parse("bench:type=Counter").unwrap(),
                Arc::new(SimpleMBean::new("Counter").with_attribute("Value", json!(1))),
            )
            .await
            .unwrap();
    });

    let pipeline = MBeanServerPipeline::new(terminal);
    for priority in 1..=filters {
        pipeline.insert(Some(Arc::new(PassThroughFilter::new("bench", priority))));
    }
    pipeline
}

fn bench_forwarding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Forwarding");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let target = ObjectName::parse("bench:type=Counter").unwrap();

    for filters in [0, 1, 4, 16] {
        let pipeline = build_pipeline(&rt, filters);

        group.bench_with_input(
            BenchmarkId::new("get_mbean_count", filters),
            &filters,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    black_box(pipeline.head().get_mbean_count().await)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("get_attribute", filters),
            &filters,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    black_box(pipeline.head().get_attribute(&target, "Value").await)
                });
            },
        );
    }

    group.finish();
}

fn bench_membership(c: &mut Criterion) {
    let mut group = c.benchmark_group("Membership");
    let rt = tokio::runtime::Runtime::new().unwrap();

    for filters in [4, 32] {
        let pipeline = build_pipeline(&rt, filters);
        group.bench_with_input(
            BenchmarkId::new("insert_remove", filters),
            &filters,
            |b, _| {
                b.iter(|| {
                    let filter: Arc<dyn mbean_pipeline::MBeanServerFilter> =
                        Arc::new(PassThroughFilter::new("churn", 3));
                    pipeline.insert(Some(filter.clone()));
                    black_box(pipeline.remove(Some(&filter)))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_forwarding, bench_membership);
criterion_main!(benches);
