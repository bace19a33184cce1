use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ph_core::{CalibrationModel, CalibrationPoint, DoseController, DoseState, MovingAverage};

fn bench_cycle(c: &mut Criterion) {
    let model = CalibrationModel::fit(&CalibrationPoint::FACTORY);
    let controller = DoseController::default();

    c.bench_function("filter_push_ma10", |b| {
        let mut f = MovingAverage::new(10);
        let mut v = 2.9f32;
        b.iter(|| {
            v = if v > 3.1 { 2.9 } else { v + 0.001 };
            black_box(f.push(black_box(v)))
        })
    });

    c.bench_function("decide_cycle", |b| {
        let mut f = MovingAverage::new(10);
        let mut state = DoseState::default();
        let mut now = 0u64;
        b.iter(|| {
            now += 800;
            let ph = model.apply(f.push(black_box(3.0)));
            black_box(controller.step(&mut state, ph, now))
        })
    });
}

criterion_group!(benches, bench_cycle);
criterion_main!(benches);
