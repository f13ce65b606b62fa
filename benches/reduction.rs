//! Benchmarks for the enumerator and the reduction engine.
//!
//! These establish baselines for the two hot paths of a search run: building
//! a candidate net in place and reducing it to its normal form.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use combinet::prelude::*;

/// Benchmarks building candidate nets in place across a window of indices.
///
/// This measures the cost of:
/// - net reset (arena clear, queue clear)
/// - node allocation and agent selection from the bit pattern
/// - ring wiring through the sever-first `connect`
fn bench_enumeration_window(c: &mut Criterion) {
    let mut net = Net::new(16, 100);
    c.bench_function("enumeration_window_1000", |b| {
        b.iter(|| {
            for index in 0..1000 {
                build_net(black_box(index), &mut net).expect("capacity covers every ring");
            }
            black_box(net.used_nodes())
        });
    });
}

/// Benchmarks build-plus-reduce over a window, the driver's inner loop.
fn bench_reduce_window(c: &mut Criterion) {
    let mut net = Net::new(100, 100_000);
    net.channel.input = 6;
    c.bench_function("build_and_reduce_window_256", |b| {
        b.iter(|| {
            let mut gas_total = 0usize;
            for index in 0..256 {
                build_net(black_box(index), &mut net).expect("capacity covers every ring");
                reduce(&mut net);
                gas_total += net.gas_used();
            }
            black_box(gas_total)
        });
    });
}

/// Benchmarks the duplication cascade: a single δ-γ pair that keeps
/// spawning replacements until the arena runs out.
fn bench_duplication_cascade(c: &mut Criterion) {
    c.bench_function("duplication_cascade_cap_100", |b| {
        let mut net = Net::new(100, 100_000);
        b.iter(|| {
            net.reset();
            let d = net.new_node(Agent::Delta).expect("empty net");
            let g = net.new_node(Agent::Gamma).expect("empty net");
            net.connect(d, PRINCIPAL, g, PRINCIPAL);
            black_box(reduce(&mut net))
        });
    });
}

/// Benchmarks raw connect churn: rewiring a ring of live nodes, which is
/// dominated by the sever-first discipline.
fn bench_connect_churn(c: &mut Criterion) {
    let mut net = Net::new(64, 100);
    for i in 0..64 {
        let agent = match i % 3 {
            0 => Agent::Delta,
            1 => Agent::Gamma,
            _ => Agent::Epsilon,
        };
        net.new_node(agent).expect("within capacity");
    }
    c.bench_function("connect_ring_64", |b| {
        b.iter(|| {
            for i in 0..64u32 {
                let next = NodeId::new((i + 1) % 64);
                net.connect(black_box(NodeId::new(i)), AUX_1, next, AUX_2);
            }
            black_box(net.used_nodes())
        });
    });
}

criterion_group!(
    benches,
    bench_enumeration_window,
    bench_reduce_window,
    bench_duplication_cascade,
    bench_connect_churn
);
criterion_main!(benches);
