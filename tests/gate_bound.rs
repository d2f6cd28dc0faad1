// tests/gate_bound.rs

#![cfg(unix)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use procguard::exec::{Argv, ExecutionOptions};
use procguard_test_utils::builders::invoker_with_limit;
use procguard_test_utils::{init_tracing, with_timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn gate_never_admits_more_than_its_limit() {
    init_tracing();
    const LIMIT: usize = 3;
    let invoker = invoker_with_limit(LIMIT);
    let gate = invoker.context().gate().clone();

    let done = Arc::new(AtomicBool::new(false));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let sampler = {
        let done = Arc::clone(&done);
        let max_seen = Arc::clone(&max_seen);
        tokio::spawn(async move {
            while !done.load(Ordering::SeqCst) {
                max_seen.fetch_max(gate.in_use(), Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
    };

    let mut handles = Vec::new();
    for _ in 0..LIMIT + 5 {
        let invoker = invoker.clone();
        handles.push(tokio::spawn(async move {
            invoker
                .spawn(Argv::from(["sh", "-c", "sleep 0.3"]), ExecutionOptions::captured())
                .await
        }));
    }

    let results = with_timeout(async {
        let mut out = Vec::new();
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    })
    .await;
    done.store(true, Ordering::SeqCst);
    sampler.await.unwrap();

    assert_eq!(results.len(), LIMIT + 5);
    assert!(results.iter().all(|r| r.succeeded()));
    assert_eq!(max_seen.load(Ordering::SeqCst), LIMIT);
    assert_eq!(invoker.context().gate().in_use(), 0);
}

#[tokio::test]
async fn batch_concurrency_above_the_gate_is_still_bounded() {
    let invoker = invoker_with_limit(2);
    let gate = invoker.context().gate().clone();
    let options = ExecutionOptions {
        concurrency: 6,
        ..ExecutionOptions::captured()
    };

    let commands = vec![Argv::from(["sh", "-c", "sleep 0.2"]); 6];
    let run = invoker.run_multiple(commands, options);
    let probe = async {
        let mut max_seen = 0;
        for _ in 0..40 {
            max_seen = max_seen.max(gate.in_use());
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        max_seen
    };

    let (outcome, max_seen) = with_timeout(async { tokio::join!(run, probe) }).await;
    assert!(outcome.succeeded());
    assert!(max_seen <= 2, "saw {max_seen} slots in use");
}
