use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use warpv_config::prelude::*;

fn bench_apply_depth_defaults(c: &mut Criterion) {
    let presets = PresetTable::builtin();
    let mut overrides = OverrideTracker::new();
    overrides.mark_overridden("execute_stage");
    let settings: PipelineSettings = [("execute_stage", Value::Int(9)), ("cores", Value::Int(2))]
        .into_iter()
        .collect();

    let mut group = c.benchmark_group("apply_depth_defaults");
    for depth in SUPPORTED_DEPTHS {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| apply_depth_defaults(black_box(&presets), black_box(&settings), &overrides, depth))
        });
    }
    group.finish();
}

fn bench_session_replay(c: &mut Criterion) {
    let events = ["depth=4", "execute_stage=9", "cores=3", "depth=6", "execute_stage=", "depth=2"];
    c.bench_function("session_replay", |b| {
        b.iter(|| {
            let mut session = Session::builtin();
            for raw in events {
                session.apply_str(black_box(raw)).unwrap();
            }
            session.validate().is_ok()
        })
    });
}

criterion_group!(reconcile, bench_apply_depth_defaults, bench_session_replay);
criterion_main!(reconcile);
