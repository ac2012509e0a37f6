//! Task Scheduler Benchmarks
//!
//! Measures baseline performance of task submission and dispatch (§4.6):
//! - Submitting a batch of independent tasks
//! - Priority-ordered dispatch across a populated ready queue
//! - A dependency chain unblocking on each completion

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::time::Duration;

// Layer 2: Third-party crate imports
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

// Layer 3: Internal module imports
use agentmesh_rt::ids::TaskId;
use agentmesh_rt::scheduler::{Task, TaskScheduler};

fn task(role: &str, priority: u8, deps: Vec<TaskId>) -> Task {
    Task::new(TaskId::new(), role, priority, deps, json!({}))
}

fn submit_independent_batch(c: &mut Criterion) {
    c.bench_function("scheduler_submit_independent_batch", |b| {
        b.iter(|| {
            let mut scheduler = TaskScheduler::new();
            for priority in 0..100u8 {
                scheduler.submit(task("worker", priority % 10, vec![])).unwrap();
            }
            black_box(scheduler);
        });
    });
}

fn dispatch_from_populated_queue(c: &mut Criterion) {
    c.bench_function("scheduler_dispatch_from_populated_queue", |b| {
        b.iter_batched(
            || {
                let mut scheduler = TaskScheduler::new();
                for priority in 0..200u8 {
                    scheduler.submit(task("worker", priority % 10, vec![])).unwrap();
                }
                scheduler
            },
            |mut scheduler| {
                while let Some(dispatched) = scheduler.get_next_task("worker") {
                    black_box(dispatched);
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn dependency_chain_unblocks(c: &mut Criterion) {
    c.bench_function("scheduler_dependency_chain_unblocks", |b| {
        b.iter_batched(
            || {
                let mut scheduler = TaskScheduler::new();
                let mut ids = Vec::with_capacity(50);
                let mut prev = None;
                for _ in 0..50 {
                    let deps = prev.into_iter().collect::<Vec<_>>();
                    let t = task("worker", 5, deps);
                    let id = t.id;
                    scheduler.submit(t).unwrap();
                    ids.push(id);
                    prev = Some(id);
                }
                (scheduler, ids)
            },
            |(mut scheduler, ids)| {
                for id in ids {
                    if let Some(dispatched) = scheduler.get_next_task("worker") {
                        black_box(&dispatched);
                    }
                    scheduler.complete(id, json!({"status": "ok"})).unwrap();
                }
            },
            criterion::BatchSize::SmallInput,
        );
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
        submit_independent_batch,
        dispatch_from_populated_queue,
        dependency_chain_unblocks
}

criterion_main!(benches);
