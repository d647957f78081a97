//! Inventory depletion and aggregation benchmarks.
//!
//! Run with: cargo bench -p lotbasis-core

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use chrono::NaiveDate;
use lotbasis_core::{array_price_dates, average_cost, CostLot, Inventory, Sku};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Generate an inventory with N lots of one SKU, each carrying two components.
fn generate_inventory(num_lots: usize) -> Inventory {
    let mut inv = Inventory::new();

    for i in 0..num_lots {
        let lot = CostLot::new(10)
            .with_component(date(2024, 1, 1 + (i % 28) as u32), dec!(-5.00) - Decimal::from(i as i32))
            .with_component(date(2024, 2, 1 + (i % 28) as u32), dec!(0.25));
        inv.add(Sku(1), lot);
    }

    inv
}

fn bench_inventory_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_add");

    for size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(generate_inventory(size)));
        });
    }

    group.finish();
}

fn bench_book_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_book_value");

    for size in [10, 100, 1000] {
        let inv = generate_inventory(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &inv, |b, inv| {
            b.iter(|| black_box(inv.book_value(Sku(1))));
        });
    }

    group.finish();
}

fn bench_deplete(c: &mut Criterion) {
    let mut group = c.benchmark_group("deplete_fifo");

    for size in [10, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || generate_inventory(size),
                |mut inv| {
                    // Take half the units, splitting one lot on odd sizes
                    let consumed = inv.deplete(Sku(1), (size as u64) * 5 + 3);
                    black_box((inv, consumed))
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_aggregate_consumed(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_consumed");

    for size in [10, 100, 500] {
        let mut inv = generate_inventory(size);
        let consumed = inv.deplete(Sku(1), (size as u64) * 10).unwrap_or_default();

        group.bench_with_input(BenchmarkId::from_parameter(size), &consumed, |b, lots| {
            b.iter(|| black_box((array_price_dates(lots), average_cost(lots))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_inventory_add,
    bench_book_value,
    bench_deplete,
    bench_aggregate_consumed,
);
criterion_main!(benches);
