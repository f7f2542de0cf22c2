use std::hint::black_box;

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use quartz_cron::CronExpression;

fn parse_take_100(expression: &str) {
    let cron = CronExpression::new(expression).expect("valid expression");
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    for _fire_time in cron.iter_after(start).take(100) {}
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse_take_100_plain", |b| {
        b.iter(|| parse_take_100(black_box("0 15 10 * * ?")))
    });
    c.bench_function("parse_take_100_last_weekday", |b| {
        b.iter(|| parse_take_100(black_box("0 15 10 LW * ?")))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
