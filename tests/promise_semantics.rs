// tests/promise_semantics.rs

use std::sync::{Arc, Mutex};

use tickqueue::{Promise, TickQueueError};
use tickqueue_test_utils::{init_tracing, with_timeout};

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn resolve_settles_once_and_keeps_first_value() {
    init_tracing();

    let p = Promise::new();
    assert!(!p.is_settled());

    p.resolve(1).unwrap();
    assert!(p.is_settled());
    assert_eq!(p.value(), Some(1));

    match p.resolve(2) {
        Err(TickQueueError::AlreadySettled) => {}
        other => panic!("expected AlreadySettled, got {:?}", other),
    }
    assert_eq!(p.value(), Some(1));
}

#[test]
fn then_on_resolved_promise_runs_before_returning() {
    init_tracing();

    let log = new_log();
    let p = Promise::resolved("ready".to_string());

    let l = log.clone();
    let next = p.then(move |v| {
        l.lock().unwrap().push(v.clone());
        v.len()
    });
    log.lock().unwrap().push("after then".to_string());

    assert_eq!(entries(&log), vec!["ready", "after then"]);
    assert_eq!(next.value(), Some(5));
}

#[test]
fn then_on_pending_promise_waits_for_resolve() {
    init_tracing();

    let seen = Arc::new(Mutex::new(None));
    let p = Promise::new();

    let s = seen.clone();
    let next = p.then(move |v: i32| {
        *s.lock().unwrap() = Some(v);
        v * 2
    });

    assert_eq!(*seen.lock().unwrap(), None);
    assert!(!next.is_settled());

    p.resolve(21).unwrap();

    assert_eq!(*seen.lock().unwrap(), Some(21));
    assert_eq!(next.value(), Some(42));
}

#[test]
fn chained_then_feeds_each_result_forward() {
    init_tracing();

    let log = new_log();
    let p = Promise::new();

    let (lf, lg) = (log.clone(), log.clone());
    let last = p
        .then(move |v: i32| {
            lf.lock().unwrap().push(format!("f({v})"));
            v + 1
        })
        .then(move |v: i32| {
            lg.lock().unwrap().push(format!("g({v})"));
            v * 10
        });

    assert!(entries(&log).is_empty());
    p.resolve(4).unwrap();

    assert_eq!(entries(&log), vec!["f(4)", "g(5)"]);
    assert_eq!(last.value(), Some(50));
}

#[test]
fn late_continuations_receive_value_in_registration_order() {
    init_tracing();

    let log = new_log();
    let p = Promise::new();
    p.resolve(42).unwrap();

    let (a, b) = (log.clone(), log.clone());
    p.then(move |v: i32| a.lock().unwrap().push(format!("first {v}")));
    p.then(move |v: i32| b.lock().unwrap().push(format!("second {v}")));

    assert_eq!(entries(&log), vec!["first 42", "second 42"]);
}

#[test]
fn waiters_fire_in_registration_order_and_cascade_depth_first() {
    init_tracing();

    let log = new_log();
    let p = Promise::new();

    let (a, a2, b) = (log.clone(), log.clone(), log.clone());
    p.then(move |_: ()| a.lock().unwrap().push("a".to_string()))
        .then(move |_| a2.lock().unwrap().push("a.then".to_string()));
    p.then(move |_: ()| b.lock().unwrap().push("b".to_string()));

    p.resolve(()).unwrap();

    assert_eq!(entries(&log), vec!["a", "a.then", "b"]);
}

#[test]
fn continuation_may_register_on_the_promise_that_triggered_it() {
    init_tracing();

    let log = new_log();
    let p = Promise::new();

    let inner_p = p.clone();
    let outer_log = log.clone();
    p.then(move |v: u8| {
        outer_log.lock().unwrap().push(format!("outer {v}"));
        let inner_log = outer_log.clone();
        inner_p.then(move |v: u8| inner_log.lock().unwrap().push(format!("inner {v}")));
    });

    p.resolve(7).unwrap();

    assert_eq!(entries(&log), vec!["outer 7", "inner 7"]);
}

#[test]
fn panicking_continuation_abandons_its_downstream_only() {
    init_tracing();

    let log = new_log();
    let p = Promise::new();

    let broken = p.then(|_: i32| -> i32 { panic!("continuation failure") });
    let l = log.clone();
    let healthy = p.then(move |v: i32| {
        l.lock().unwrap().push(format!("healthy {v}"));
        v
    });

    p.resolve(3).unwrap();

    assert!(broken.is_abandoned());
    assert_eq!(healthy.value(), Some(3));
    assert_eq!(entries(&log), vec!["healthy 3"]);
}

#[test]
fn abandon_cascades_and_skips_callbacks() {
    init_tracing();

    let log = new_log();
    let p: Promise<i32> = Promise::new();

    let l = log.clone();
    let next = p.then(move |v| l.lock().unwrap().push(format!("{v}")));
    let after = next.then(|_| 1);

    p.abandon();

    assert!(p.is_abandoned());
    assert!(next.is_abandoned());
    assert!(after.is_abandoned());
    assert!(entries(&log).is_empty());

    // Late registration on an abandoned promise is abandoned too.
    assert!(p.then(|v| v).is_abandoned());

    match p.resolve(1) {
        Err(TickQueueError::AlreadySettled) => {}
        other => panic!("expected AlreadySettled, got {:?}", other),
    }
}

#[test]
fn abandon_after_resolve_is_a_no_op() {
    init_tracing();

    let p = Promise::resolved(9);
    p.abandon();

    assert!(p.is_settled());
    assert!(!p.is_abandoned());
    assert_eq!(p.value(), Some(9));
}

#[tokio::test]
async fn wait_returns_value_resolved_from_another_task() {
    init_tracing();

    let p = Promise::new();
    let producer = p.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        producer.resolve("done").unwrap();
    });

    let value = with_timeout(p.wait()).await.unwrap();
    assert_eq!(value, "done");
}

#[tokio::test]
async fn wait_reports_abandonment() {
    init_tracing();

    let p: Promise<u32> = Promise::new();
    let producer = p.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        producer.abandon();
    });

    match with_timeout(p.wait()).await {
        Err(TickQueueError::Abandoned) => {}
        other => panic!("expected Abandoned, got {:?}", other),
    }
}
