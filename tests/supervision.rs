mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use hivekeeper::{Action, ActionError, Config, Placeholder, RuntimeError, WorkerDescriptor, WorkerState};

use common::{descriptor, eventually, hive, hive_with, opt, settle};

#[tokio::test]
async fn unknown_class_is_fatal_and_registers_nothing() {
    let h = hive();

    let err = h
        .sup
        .start_one(&WorkerDescriptor::new("light1", "exec"))
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::UnknownFactory { ref class } if class == "exec"));
    assert!(err.is_config());
    assert!(h.sup.workers().await.is_empty());
    assert!(h.sup.status("light1").await.is_none());
}

#[tokio::test]
async fn factory_error_registers_nothing() {
    let h = hive();

    let err = h
        .sup
        .instantiate(&descriptor("bad").with_option(opt("reject", true)))
        .await
        .unwrap_err();

    assert_eq!(err.as_label(), "runtime_factory_failed");
    assert!(h.sup.worker("bad").await.is_none());
}

#[tokio::test]
async fn batch_start_stops_at_first_config_error() {
    let h = hive();

    let res = h
        .sup
        .start_all(vec![
            descriptor("a"),
            WorkerDescriptor::new("b", "missing"),
            descriptor("c"),
        ])
        .await;

    assert!(matches!(res, Err(RuntimeError::UnknownFactory { .. })));
    assert!(h.sup.worker("a").await.unwrap().is_running());
    assert!(h.sup.worker("c").await.is_none());
    assert_eq!(h.sup.worker_names().await, ["a"]);
    h.sup.stop_all().await;
}

#[tokio::test]
async fn recovers_after_two_crashes() {
    let h = hive();
    let sup = &h.sup;

    let worker = sup
        .start_one(&descriptor("flaky").with_option(opt("failures", 2)))
        .await
        .unwrap();

    eventually("third attempt running", || async move {
        sup.status("flaky").await.map(|s| s.attempts) == Some(3)
    })
    .await;
    settle().await;

    let status = sup.status("flaky").await.unwrap();
    assert_eq!(status.state, WorkerState::Running);
    assert_eq!(status.retries, 2);
    assert_eq!(status.attempts, 3);
    assert_eq!(h.runs.load(Ordering::SeqCst), 3);
    assert!(worker.is_running());
    assert!(!worker.completion().is_done());

    sup.shutdown().await.unwrap();
}

#[tokio::test]
async fn abandons_after_three_crashes() {
    let h = hive();
    let sup = &h.sup;

    let worker = sup
        .start_one(&descriptor("evil").with_option(opt("failures", 10)))
        .await
        .unwrap();

    worker.completion().wait().await;
    settle().await;

    let status = sup.status("evil").await.unwrap();
    assert_eq!(status.state, WorkerState::Abandoned);
    assert_eq!(status.attempts, 3);
    assert_eq!(status.retries, 2);
    assert_eq!(h.runs.load(Ordering::SeqCst), 3);
    assert!(!worker.is_running());
    // still registered, just inert
    assert!(sup.worker("evil").await.is_some());
}

#[tokio::test]
async fn panics_count_as_crashes() {
    let h = hive();

    let worker = h
        .sup
        .start_one(
            &descriptor("panicky")
                .with_option(opt("failures", 5))
                .with_option(opt("panic", true)),
        )
        .await
        .unwrap();

    worker.completion().wait().await;

    assert_eq!(h.runs.load(Ordering::SeqCst), 3);
    assert_eq!(
        h.sup.status("panicky").await.unwrap().state,
        WorkerState::Abandoned
    );
}

#[tokio::test]
async fn crash_ceiling_is_configurable() {
    let h = hive_with(Config {
        max_fatals: 1,
        grace: Duration::from_secs(2),
        ..Config::default()
    });

    let worker = h
        .sup
        .start_one(&descriptor("once").with_option(opt("failures", 1)))
        .await
        .unwrap();
    worker.completion().wait().await;

    assert_eq!(h.runs.load(Ordering::SeqCst), 1);
    assert_eq!(h.sup.status("once").await.unwrap().retries, 0);
}

#[tokio::test]
async fn stop_all_stops_clears_and_closes() {
    let h = hive();
    let sup = &h.sup;

    sup.start_all(vec![descriptor("a"), descriptor("b"), descriptor("c")])
        .await
        .unwrap();
    let workers = sup.workers().await;
    assert_eq!(workers.len(), 3);

    eventually("all running", || async move {
        sup.status("c").await.map(|s| s.state) == Some(WorkerState::Running)
    })
    .await;

    sup.stop_all().await;

    for w in &workers {
        assert!(!w.is_running(), "{} still running", w.name());
        w.completion().wait().await;
    }
    assert!(sup.workers().await.is_empty());
    assert_eq!(sup.worker_count().await, 0);
    for name in ["a", "b", "c"] {
        assert!(sup.status(name).await.is_none(), "{name} still tracked");
    }
}

#[tokio::test]
async fn shutdown_reports_workers_ignoring_stop() {
    let h = hive_with(Config {
        grace: Duration::from_millis(50),
        ..Config::default()
    });

    h.sup
        .start_all(vec![
            descriptor("polite"),
            descriptor("stubborn").with_option(opt("ignore_stop", true)),
        ])
        .await
        .unwrap();

    match h.sup.shutdown().await {
        Err(RuntimeError::GraceExceeded { stuck, .. }) => assert_eq!(stuck, ["stubborn"]),
        other => panic!("expected grace exceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn restart_rearms_signal_and_completion() {
    let h = hive();
    let sup = &h.sup;

    let worker = sup.start_one(&descriptor("w")).await.unwrap();
    let old_signal = worker.stop_signal();
    let old_completion = worker.completion();

    eventually("first run", || async move {
        sup.status("w").await.map(|s| s.attempts) == Some(1)
    })
    .await;

    sup.restart_one("w").await.unwrap();

    assert!(old_signal.is_cancelled());
    assert!(old_completion.is_done());
    assert!(!worker.stop_signal().is_cancelled());
    assert!(!worker.completion().is_done());
    assert!(worker.is_running());

    eventually("second run", || async move {
        sup.status("w").await.map(|s| (s.state, s.attempts))
            == Some((WorkerState::Running, 1))
    })
    .await;
    let runs = &h.runs;
    eventually("second invocation", || async move {
        runs.load(Ordering::SeqCst) == 2
    })
    .await;

    sup.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_restarts_keep_a_single_run_loop() {
    let h = hive();
    let worker = h.sup.start_one(&descriptor("w")).await.unwrap();
    let gauge = &h.gauge;
    eventually("first run", || async move { gauge.active() == 1 }).await;

    for _ in 0..20 {
        let a = tokio::spawn({
            let sup = Arc::clone(&h.sup);
            async move { sup.restart_one("w").await }
        });
        let b = tokio::spawn({
            let sup = Arc::clone(&h.sup);
            async move { sup.restart_one("w").await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
    }
    eventually("restarted run", || async move { gauge.active() == 1 }).await;
    assert_eq!(gauge.peak(), 1);

    worker.stop();
    eventually("no run-loop after stop", || async move { gauge.active() == 0 }).await;
    worker.completion().wait().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_all_racing_start_one_leaves_no_orphan() {
    let h = hive();
    h.sup.start_one(&descriptor("first")).await.unwrap();

    let start = tokio::spawn({
        let sup = Arc::clone(&h.sup);
        async move { sup.start_one(&descriptor("late")).await }
    });
    let stop = tokio::spawn({
        let sup = Arc::clone(&h.sup);
        async move { sup.stop_all().await }
    });
    let late = start.await.unwrap().unwrap();
    stop.await.unwrap();

    // either the start ran first and was stopped, or it ran after and is registered
    let registered = h.sup.worker("late").await.is_some();
    assert_eq!(registered, late.is_running());

    h.sup.shutdown().await.unwrap();
    let gauge = &h.gauge;
    eventually("all run-loops gone", || async move { gauge.active() == 0 }).await;
}

#[tokio::test]
async fn restart_revives_an_abandoned_worker() {
    let h = hive();
    let sup = &h.sup;

    let worker = sup
        .start_one(&descriptor("phoenix").with_option(opt("failures", 3)))
        .await
        .unwrap();
    worker.completion().wait().await;
    assert!(!worker.is_running());

    sup.restart_one("phoenix").await.unwrap();

    // the fourth invocation is past the scripted failures
    eventually("revived", || async move {
        sup.status("phoenix").await.map(|s| s.state) == Some(WorkerState::Running)
    })
    .await;
    assert!(worker.is_running());
    assert_eq!(sup.status("phoenix").await.unwrap().retries, 0);

    sup.shutdown().await.unwrap();
}

#[tokio::test]
async fn restart_of_unknown_worker_fails() {
    let h = hive();
    assert!(matches!(
        h.sup.restart_one("ghost").await,
        Err(RuntimeError::UnknownWorker { .. })
    ));
}

#[tokio::test]
async fn restart_all_replaces_the_worker_set() {
    let h = hive();
    let sup = &h.sup;

    sup.start_all(vec![descriptor("old1"), descriptor("old2")])
        .await
        .unwrap();
    let old = sup.worker("old1").await.unwrap();

    sup.restart_all(vec![descriptor("new1")]).await.unwrap();

    assert!(!old.is_running());
    assert!(sup.worker("old1").await.is_none());
    assert!(sup.worker("new1").await.unwrap().is_running());
    assert_eq!(sup.workers().await.len(), 1);

    sup.shutdown().await.unwrap();
}

#[tokio::test]
async fn delete_stops_and_forgets() {
    let h = hive();

    let worker = h.sup.start_one(&descriptor("gone")).await.unwrap();
    let removed = h.sup.delete("gone").await;

    assert!(removed.is_some());
    assert!(!worker.is_running());
    assert!(h.sup.worker("gone").await.is_none());

    worker.completion().wait().await;
    assert_eq!(
        h.sup.status("gone").await.unwrap().state,
        WorkerState::Deleted
    );
    assert!(h.sup.delete("gone").await.is_none());
}

#[tokio::test]
async fn actions_are_routed_to_their_worker() {
    let h = hive();
    let worker = h.sup.start_one(&descriptor("speaker")).await.unwrap();
    assert!(worker.last_action().is_none());

    let action = Action::new("speaker", "echo").with_option(Placeholder::new("text", "string", "hi"));
    let out = h.sup.execute_action(&action).await.unwrap();

    assert_eq!(out, vec![Placeholder::new("echo", "string", "hi")]);
    assert!(worker.last_action().is_some());

    let err = h
        .sup
        .execute_action(&Action::new("nobody", "echo"))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::UnknownWorker { .. }));

    let err = h
        .sup
        .execute_action(&Action::new("speaker", "dance"))
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "action_worker_failed");

    h.sup.shutdown().await.unwrap();
}
