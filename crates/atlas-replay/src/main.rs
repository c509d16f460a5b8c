//! Atlas Replay - synthetic workload replay and latency measurement.
//!
//! Drives the matching core through passive, aggressive and mixed phases,
//! timing every operation with the raw-counter clock and reporting latency
//! percentiles per phase.

use std::time::Instant;

use atlas_core::{OrderBook, OrderId, Side, TimeInForce};
use atlas_metrics::{LatencyHistogram, TscClock};

const MIN_PRICE: i64 = 0;
const MAX_PRICE: i64 = 200_000;
const POOL_CAPACITY: usize = 1 << 20;

/// Synthetic order id source.
struct IdSource {
    next: OrderId,
}

impl IdSource {
    fn new() -> Self {
        Self { next: 0 }
    }

    fn next(&mut self) -> OrderId {
        let id = self.next;
        self.next += 1;
        id
    }
}

fn fresh_book() -> OrderBook {
    OrderBook::new(MIN_PRICE, MAX_PRICE, POOL_CAPACITY)
}

fn main() {
    println!("=== atlas replay: matching core latency ===");
    println!();

    let clock = TscClock::new();

    // Warm-up pass so page faults and ladder growth are out of the way.
    {
        let mut book = fresh_book();
        let mut ids = IdSource::new();
        for i in 0..10_000u64 {
            let id = ids.next();
            book.create_order(id, 10_000 + (i % 100) as i64, 10, Side::Buy, TimeInForce::GFD, None);
        }
    }

    // Phase 1: passive inserts with an immediate cancel (no matches).
    println!("[1/4] insert/cancel churn");
    {
        let mut book = fresh_book();
        let mut ids = IdSource::new();
        let mut latency = LatencyHistogram::new();
        let count = 200_000u64;

        let start = Instant::now();
        for i in 0..count {
            let id = ids.next();
            let price = 10_000 + (i % 500) as i64;

            let t0 = clock.now();
            book.create_order(id, price, 10, Side::Buy, TimeInForce::GFD, None);
            book.cancel(id);
            let t1 = clock.now();

            latency.record(clock.delta_nanos(t0, t1));
        }
        report_rate(count, start);
        latency.print_summary("  insert+cancel");
    }

    // Phase 2: aggressive IOC executions against deep resting liquidity.
    println!("\n[2/4] aggressive executions");
    {
        let mut book = fresh_book();
        let mut ids = IdSource::new();
        let mut latency = LatencyHistogram::new();

        let liquidity = ids.next();
        book.create_order(liquidity, 10_000, 50_000_000, Side::Sell, TimeInForce::GFD, None);

        let count = 100_000u64;
        let start = Instant::now();
        for _ in 0..count {
            let id = ids.next();

            let t0 = clock.now();
            book.create_order(id, 10_001, 100, Side::Buy, TimeInForce::IOC, None);
            let t1 = clock.now();

            latency.record(clock.delta_nanos(t0, t1));
        }
        report_rate(count, start);
        latency.print_summary("  ioc execution");
    }

    // Phase 3: multi-level sweeps that cross several price levels.
    println!("\n[3/4] multi-level sweeps");
    {
        let mut book = fresh_book();
        let mut ids = IdSource::new();
        let mut latency = LatencyHistogram::new();

        let count = 20_000u64;
        let start = Instant::now();
        for _ in 0..count {
            for level in 0..5i64 {
                let id = ids.next();
                book.create_order(id, 10_000 + level, 10, Side::Sell, TimeInForce::GFD, None);
            }
            let id = ids.next();

            let t0 = clock.now();
            book.create_order(id, 10_004, 50, Side::Buy, TimeInForce::GFD, None);
            let t1 = clock.now();

            latency.record(clock.delta_nanos(t0, t1));
        }
        report_rate(count, start);
        latency.print_summary("  sweep");
    }

    // Phase 4: mixed workload, mostly passive with an aggressive tail.
    println!("\n[4/4] mixed workload");
    {
        let mut book = fresh_book();
        let mut ids = IdSource::new();
        let mut latency = LatencyHistogram::new();

        let count = 200_000u64;
        let start = Instant::now();
        for i in 0..count {
            let id = ids.next();
            let offset = (i % 50) as i64;

            let t0 = clock.now();
            match i % 10 {
                0..=6 => {
                    book.create_order(id, 9_900 + offset, 100, Side::Buy, TimeInForce::GFD, None);
                }
                7..=8 => {
                    book.create_order(id, 10_000 + offset, 100, Side::Sell, TimeInForce::GFD, None);
                }
                _ => {
                    book.create_order(id, 10_050, 50, Side::Buy, TimeInForce::IOC, None);
                }
            }
            let t1 = clock.now();

            latency.record(clock.delta_nanos(t0, t1));
        }
        report_rate(count, start);
        latency.print_summary("  mixed");
    }

    println!("\ndone");
}

fn report_rate(count: u64, start: Instant) {
    let elapsed = start.elapsed();
    let rate = count as f64 / elapsed.as_secs_f64();
    println!("  {count} ops in {elapsed:.2?} ({rate:.0} ops/sec)");
}
