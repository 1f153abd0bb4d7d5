use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use warden_errors::{
    ComposedErrorResponse, ErrorComposer, Failure, FailureType, HandlerRegistry, StatusCategory,
};

#[derive(Debug, thiserror::Error)]
#[error("bench failure")]
struct BenchFailure(FailureType);

impl Failure for BenchFailure {
    fn failure_type(&self) -> FailureType {
        self.0.clone()
    }
}

/// A linear chain `t0 > t1 > ... > t{depth}` with a single handler at the root,
/// so every lookup from the leaf has to resolve through the whole chain.
fn chain_composer(depth: usize) -> (ErrorComposer, FailureType) {
    let mut builder = HandlerRegistry::builder();
    let mut parent = FailureType::new("t0".to_string());
    for i in 1..=depth {
        let child = FailureType::new(format!("t{i}"));
        builder.declare(child.clone(), parent).unwrap();
        parent = child;
    }
    builder.register_fn(FailureType::new("t0".to_string()), |_: &dyn Failure| {
        ComposedErrorResponse::new(StatusCategory::BadRequest, "root", "root")
    });
    (ErrorComposer::new(builder.build()), parent)
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_leaf_failure");
    for depth in [1usize, 8, 64] {
        let (composer, leaf) = chain_composer(depth);
        let failure = BenchFailure(leaf);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &failure, |b, f| {
            b.iter(|| composer.compose(black_box(f)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compose);
criterion_main!(benches);
