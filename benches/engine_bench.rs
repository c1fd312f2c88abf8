use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use dipjudge::board::{Order, State};
use dipjudge::movegen::{options, random_orders};
use dipjudge::protocol::parse_order;
use dipjudge::resolve::{OrderMap, Resolver};
use dipjudge::selfplay::{play_game, SelfPlayConfig};
use dipjudge::variant::Variant;
use dipjudge::variants::{classical, pure};

/// A common Spring 1901 opening for all seven nations.
const OPENING: &[(&str, &str)] = &[
    ("Austria", "A vie - gal"),
    ("Austria", "A bud - ser"),
    ("Austria", "F tri - alb"),
    ("England", "F lon - nth"),
    ("England", "F edi - nrg"),
    ("England", "A lvp - yor"),
    ("France", "F bre - mao"),
    ("France", "A par - bur"),
    ("France", "A mar S A par - bur"),
    ("Germany", "F kie - den"),
    ("Germany", "A ber - kie"),
    ("Germany", "A mun - ruh"),
    ("Italy", "F nap - ion"),
    ("Italy", "A rom - apu"),
    ("Italy", "A ven H"),
    ("Russia", "F stp/sc - bot"),
    ("Russia", "A mos - ukr"),
    ("Russia", "A war - gal"),
    ("Russia", "F sev - bla"),
    ("Turkey", "F ank - bla"),
    ("Turkey", "A con - bul"),
    ("Turkey", "A smy - con"),
];

fn opening_state(variant: &Variant) -> State {
    let mut state = variant.start().unwrap();
    for (nation, text) in OPENING {
        let order = variant.parser.parse(variant.graph(), text).unwrap();
        state.set_order(*nation, order).unwrap();
    }
    state
}

fn bench_advance_holds(c: &mut Criterion) {
    let variant = classical::variant();
    let state = variant.start().unwrap();
    c.bench_function("advance_22_holds", |b| {
        b.iter(|| {
            let mut s = black_box(&state).clone();
            s.advance().unwrap();
            s
        })
    });
}

fn bench_advance_opening(c: &mut Criterion) {
    let variant = classical::variant();
    let state = opening_state(&variant);
    c.bench_function("advance_spring_opening", |b| {
        b.iter(|| {
            let mut s = black_box(&state).clone();
            s.advance().unwrap();
            s
        })
    });
}

fn bench_resolve_opening(c: &mut Criterion) {
    let variant = classical::variant();
    let state = variant.start().unwrap();
    let orders: OrderMap = OPENING
        .iter()
        .map(|(_, text)| {
            let order = variant.parser.parse(variant.graph(), text).unwrap();
            (order.source().super_province(), order)
        })
        .collect();
    c.bench_function("resolve_spring_opening", |b| {
        b.iter(|| {
            let mut resolver = Resolver::new(black_box(&state), black_box(&orders));
            resolver.resolve_all().unwrap();
            resolver.into_resolutions()
        })
    });
}

fn bench_movegen_all_nations(c: &mut Criterion) {
    let variant = classical::variant();
    let state = variant.start().unwrap();
    c.bench_function("movegen_all_7_nations", |b| {
        b.iter(|| {
            variant
                .nations
                .iter()
                .map(|n| options(black_box(&state), n).len())
                .sum::<usize>()
        })
    });
}

fn bench_random_orders(c: &mut Criterion) {
    let variant = classical::variant();
    let state = variant.start().unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    c.bench_function("random_orders_all_nations", |b| {
        b.iter(|| {
            let orders: Vec<Vec<Order>> = variant
                .nations
                .iter()
                .map(|n| random_orders(black_box(&state), n, &mut rng))
                .collect();
            orders
        })
    });
}

fn bench_parse_order(c: &mut Criterion) {
    c.bench_function("parse_support_move", |b| {
        b.iter(|| parse_order(black_box("F stp/sc S A mos - sev")))
    });
}

fn bench_pure_game(c: &mut Criterion) {
    let variant = pure::variant();
    let config = SelfPlayConfig {
        max_year: 1910,
        record_phases: false,
        ..SelfPlayConfig::default()
    };
    let mut group = c.benchmark_group("selfplay");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("pure_game_to_1910", |b| {
        let mut rng = SmallRng::seed_from_u64(42);
        b.iter(|| play_game(&variant, &config, 0, &mut rng).unwrap())
    });
    group.finish();
}

fn bench_state_clone(c: &mut Criterion) {
    let variant = classical::variant();
    let state = opening_state(&variant);
    c.bench_function("state_clone", |b| b.iter(|| black_box(&state).clone()));
}

criterion_group!(
    benches,
    bench_advance_holds,
    bench_advance_opening,
    bench_resolve_opening,
    bench_movegen_all_nations,
    bench_random_orders,
    bench_parse_order,
    bench_pure_game,
    bench_state_clone,
);
criterion_main!(benches);
