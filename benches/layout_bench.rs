// Benchmark for the day layout
// Measures render model construction for growing room and appointment counts

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use room_scheduler::models::appointment::{Appointment, AppointmentId};
use room_scheduler::models::room::Room;
use room_scheduler::models::schedule::TimeWindow;
use room_scheduler::services::schedule::current_time::TimeSnapshot;
use room_scheduler::services::schedule::layout::{layout, LayoutInput};
use room_scheduler::services::schedule::viewport::ViewportClassifier;

fn fixture(room_count: i64, per_room: i64) -> (Vec<Room>, Vec<Appointment>) {
    let rooms: Vec<Room> = (1..=room_count)
        .map(|id| Room::from_number(id, &(100 + id).to_string()))
        .collect();

    let base = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
    let mut appointments = Vec::new();
    for room in 1..=room_count {
        for slot in 0..per_room {
            let start = base + Duration::minutes(slot * 45);
            appointments.push(
                Appointment::builder()
                    .id(AppointmentId::Committed(room * 1000 + slot))
                    .title(format!("Lesson {}", slot))
                    .start(start)
                    .end(start + Duration::minutes(40))
                    .room(room)
                    .build()
                    .unwrap(),
            );
        }
    }
    (rooms, appointments)
}

fn bench_layout(c: &mut Criterion, name: &str, width: f32) {
    let mut group = c.benchmark_group(name);
    let window = TimeWindow::default();
    let snapshot = TimeSnapshot::default();
    let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let viewport = ViewportClassifier::default().viewport(width);

    for room_count in [7, 30, 120].iter() {
        let (rooms, appointments) = fixture(*room_count, 16);
        group.bench_with_input(
            BenchmarkId::from_parameter(room_count),
            room_count,
            |b, _| {
                b.iter(|| {
                    layout(black_box(&LayoutInput {
                        rooms: Some(&rooms),
                        appointments: &appointments,
                        viewport,
                        window: &window,
                        day,
                        tz: Tz::UTC,
                        snapshot: &snapshot,
                    }))
                });
            },
        );
    }

    group.finish();
}

fn bench_wide_layout(c: &mut Criterion) {
    bench_layout(c, "wide_layout", 1550.0);
}

fn bench_narrow_layout(c: &mut Criterion) {
    bench_layout(c, "narrow_layout", 500.0);
}

criterion_group!(benches, bench_wide_layout, bench_narrow_layout);
criterion_main!(benches);
