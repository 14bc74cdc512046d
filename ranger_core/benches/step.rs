use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ranger_core::{ControllerBuilder, OperatingRange, SensorCompensator, map};
use ranger_core::mocks::NullDiagnostics;
use ranger_hardware::{PulseCalibration, SimulatedButton, SimulatedSensor, SimulatedServo};

fn bench_compensate_and_map(c: &mut Criterion) {
    let comp = SensorCompensator::default();
    let range = OperatingRange::default();
    c.bench_function("compensate_map", |b| {
        let mut mv = 400.0f32;
        b.iter(|| {
            mv = if mv > 3000.0 { 400.0 } else { mv + 1.7 };
            let d = comp.compensate(black_box(mv));
            black_box(map(d, &range))
        });
    });
}

fn bench_engaged_step(c: &mut Criterion) {
    let sensor = SimulatedSensor::from_millivolts(1000.0, 3300.0);
    let mut core = ControllerBuilder::new()
        .with_sensor(sensor.clone())
        .with_button(SimulatedButton::new())
        .with_actuators(
            SimulatedServo::new(PulseCalibration::new(0.015, 0.115)),
            SimulatedServo::new(PulseCalibration::new(0.0325, 0.125)),
        )
        .with_range(OperatingRange::default())
        .with_diagnostics(Box::new(NullDiagnostics))
        .build()
        .unwrap_or_else(|e| panic!("build: {e:#}"));
    core.latch().on_edge();
    // Leave INITIAL before measuring.
    let _ = core.step();

    c.bench_function("engaged_step", |b| {
        b.iter(|| black_box(core.step().map(|r| r.command).ok()));
    });
}

criterion_group!(benches, bench_compensate_and_map, bench_engaged_step);
criterion_main!(benches);
