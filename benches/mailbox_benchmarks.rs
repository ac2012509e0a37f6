//! Mailbox Benchmarks
//!
//! Measures baseline performance of the per-agent mailbox (§4.1):
//! - Single-message send/receive latency
//! - Sustained single-recipient throughput
//! - Drop-oldest overflow behavior at capacity

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::time::Duration;

// Layer 2: Third-party crate imports
use criterion::{criterion_group, criterion_main, Criterion};

// Layer 3: Internal module imports
use agentmesh_rt::mailbox;
use agentmesh_rt::message::{Message, MessageKind, Payload};

fn test_message() -> Message {
    Message::broadcast(None, MessageKind::User, Payload::Empty)
}

fn mailbox_send_recv(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("mailbox_send_recv", |b| {
        b.to_async(&rt).iter(|| async {
            let (tx, mut rx) = mailbox::channel(100);
            tx.send(test_message()).await.unwrap();
            let received = rx.recv().await;
            black_box(received);
        });
    });
}

fn mailbox_sustained_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("mailbox_sustained_throughput", |b| {
        b.to_async(&rt).iter(|| async {
            let (tx, mut rx) = mailbox::channel(1_000);
            for _ in 0..100 {
                tx.send(test_message()).await.unwrap();
            }

            let mut count = 0;
            while count < 100 {
                if rx.recv().await.is_some() {
                    count += 1;
                }
            }
            black_box(count);
        });
    });
}

fn mailbox_drop_oldest_overflow(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("mailbox_drop_oldest_overflow", |b| {
        b.to_async(&rt).iter(|| async {
            let (tx, rx) = mailbox::channel(10);
            for _ in 0..50 {
                tx.send(test_message()).await.unwrap();
            }
            black_box(rx);
        });
    });
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .without_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        mailbox_send_recv,
        mailbox_sustained_throughput,
        mailbox_drop_oldest_overflow
}

criterion_main!(benches);
