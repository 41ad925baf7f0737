use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use padwatch::{KindSet, RawDeviceInfo, Session, VirtualPlatform};

const DEVICES: usize = 4;
const AXES: usize = 6;
const BUTTONS: usize = 16;

fn build_session() -> (Session<VirtualPlatform>, VirtualPlatform) {
    let platform = VirtualPlatform::new();
    for i in 0..DEVICES {
        platform.plug(RawDeviceInfo::new(format!("bench-{i}"), "bench", AXES, BUTTONS));
    }
    let mut session = Session::new(platform.clone());
    session.dispatcher().subscribe(KindSet::all(), |event| {
        black_box(event);
        Ok(())
    });
    session.init().expect("init");
    session.detect_devices().expect("detect");
    (session, platform)
}

pub fn bench_idle_cycle(c: &mut Criterion) {
    let (mut session, _platform) = build_session();
    c.bench_function("process_events_idle", |b| {
        b.iter(|| session.process_events().expect("process"));
    });
}

pub fn bench_busy_cycle(c: &mut Criterion) {
    let (mut session, platform) = build_session();
    let mut flip = false;
    c.bench_function("process_events_all_changing", |b| {
        b.iter(|| {
            flip = !flip;
            let value = if flip { 0.75 } else { -0.75 };
            for i in 0..DEVICES {
                let id = format!("bench-{i}");
                for axis in 0..AXES {
                    platform.set_axis(&id, axis, value);
                }
                for button in 0..BUTTONS {
                    platform.set_button(&id, button, flip);
                }
            }
            session.process_events().expect("process");
        });
    });
}

criterion_group!(benches, bench_idle_cycle, bench_busy_cycle);
criterion_main!(benches);
