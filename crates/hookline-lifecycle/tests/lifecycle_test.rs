//! End-to-end behavior of the orchestrator: ordering, store shape,
//! dynamic mutation, and failure handling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use hookline_lifecycle::{
    Hook, HookError, LifecycleError, Orchestrator, Point, RunPolicy, Store,
};

/// Hook that bumps `counter` and returns its own name.
fn counting_hook(name: &str, counter: Arc<AtomicUsize>) -> Hook {
    let label = name.to_string();
    Hook::from_fn(name, move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(json!(label))
    })
}

/// Hook that snapshots the store keys it can see.
fn observing_hook(name: &str, seen: Arc<Mutex<Vec<(String, Vec<String>)>>>) -> Hook {
    let label = name.to_string();
    Hook::from_fn(name, move |_, _, store: &Store| {
        let visible = store
            .iter()
            .flat_map(|(point, hooks)| hooks.keys().map(move |hook| format!("{point}/{hook}")))
            .collect();
        seen.lock().unwrap().push((label.clone(), visible));
        Ok(json!(label))
    })
}

#[tokio::test]
async fn test_single_literal_hook() {
    let orchestrator = Orchestrator::new(vec![
        Point::new("first step").with_hook(Hook::value("hook1", "literal")),
    ]);

    let result = orchestrator.run(None).await.unwrap();
    assert_eq!(
        serde_json::to_value(result.store()).unwrap(),
        json!({ "first step": { "hook1": "literal" } })
    );
}

#[tokio::test]
async fn test_add_points_runs_after_original() {
    let mut orchestrator = Orchestrator::new(vec![
        Point::new("first step").with_hook(Hook::value("hook1", 1)),
    ]);
    orchestrator.add_points(Point::new("second step").with_hook(Hook::value("hook2", 2)));

    let result = orchestrator.run(None).await.unwrap();
    let points: Vec<_> = result.store().point_names().collect();
    assert_eq!(points, vec!["first step", "second step"]);
    assert_eq!(result.store().get("second step", "hook2"), Some(&json!(2)));
}

#[tokio::test]
async fn test_replace_hook_swaps_key_and_value() {
    let mut orchestrator = Orchestrator::new(vec![
        Point::new("first step").with_hook(Hook::value("hook1", "old")),
    ]);
    orchestrator
        .replace_hook(
            "first step",
            "hook1",
            Hook::from_fn("hook3", |_, _, _| Ok(json!("hook3 result"))),
        )
        .unwrap();

    let result = orchestrator.run(None).await.unwrap();
    assert_eq!(
        serde_json::to_value(result.store()).unwrap(),
        json!({ "first step": { "hook3": "hook3 result" } })
    );
    assert!(result.store().get("first step", "hook1").is_none());
}

#[tokio::test]
async fn test_replace_preserves_hook_order_in_store() {
    let mut orchestrator = Orchestrator::new(vec![Point::new("build").with_hooks([
        Hook::value("fetch", 1),
        Hook::value("compile", 2),
        Hook::value("package", 3),
    ])]);
    orchestrator
        .replace_hook("build", "compile", Hook::value("compile-release", 20))
        .unwrap();

    let result = orchestrator.run(None).await.unwrap();
    let hooks: Vec<_> = result
        .store()
        .point("build")
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(hooks, vec!["fetch", "compile-release", "package"]);
    assert_eq!(result.store().get("build", "compile-release"), Some(&json!(20)));
}

#[tokio::test]
async fn test_store_shape_is_n_by_m() {
    let points: Vec<Point> = (0..4)
        .map(|p| {
            Point::new(format!("point-{p}"))
                .with_hooks((0..3).map(|h| Hook::value(format!("hook-{h}"), p * 10 + h)))
        })
        .collect();

    let result = Orchestrator::new(points).run(None).await.unwrap();
    assert_eq!(result.store().len(), 4);
    for (_, hooks) in result.store().iter() {
        assert_eq!(hooks.len(), 3);
    }
    assert_eq!(result.store().hook_count(), 12);
    assert_eq!(result.hooks_executed(), 12);
    assert_eq!(result.store().get("point-2", "hook-1"), Some(&json!(21)));
}

#[tokio::test]
async fn test_points_without_hooks_still_get_keys() {
    let orchestrator = Orchestrator::new(vec![Point::new("a"), Point::new("b"), Point::new("c")]);

    let result = orchestrator.run(None).await.unwrap();
    assert_eq!(result.store().len(), 3);
    assert_eq!(result.store().hook_count(), 0);
    assert_eq!(
        serde_json::to_string(result.store()).unwrap(),
        r#"{"a":{},"b":{},"c":{}}"#
    );
}

#[tokio::test]
async fn test_shared_executor_runs_under_each_hook_name() {
    let exec = Hook::from_fn("echo-point", |_, point, _| Ok(json!(point))).exec().clone();
    let orchestrator = Orchestrator::new(vec![
        Point::new("build").with_hook(Hook::from_arc("where", exec.clone())),
        Point::new("deploy").with_hook(Hook::from_arc("where-again", exec)),
    ]);

    let store = orchestrator.run(None).await.unwrap().into_store().into_inner();
    assert_eq!(store["build"]["where"], json!("build"));
    assert_eq!(store["deploy"]["where-again"], json!("deploy"));
}

#[tokio::test]
async fn test_hooks_observe_only_earlier_results() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = Orchestrator::new(vec![
        Point::new("p1")
            .with_hook(observing_hook("a", seen.clone()))
            .with_hook(observing_hook("b", seen.clone())),
        Point::new("p2").with_hook(observing_hook("c", seen.clone())),
    ]);

    orchestrator.run(None).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("a".to_string(), vec![]),
            ("b".to_string(), vec!["p1/a".to_string()]),
            (
                "c".to_string(),
                vec!["p1/a".to_string(), "p1/b".to_string()]
            ),
        ]
    );
}

#[tokio::test]
async fn test_later_hook_reads_earlier_value() {
    let orchestrator = Orchestrator::new(vec![
        Point::new("config").with_hook(Hook::value("port", 8080)),
        Point::new("serve").with_hook(Hook::from_fn("url", |_, _, store| {
            let port = store
                .get("config", "port")
                .and_then(Value::as_u64)
                .ok_or("port missing")?;
            Ok(json!(format!("http://localhost:{port}")))
        })),
    ]);

    let result = orchestrator.run(None).await.unwrap();
    assert_eq!(
        result.store().get("serve", "url"),
        Some(&json!("http://localhost:8080"))
    );
}

#[tokio::test]
async fn test_async_hooks_contribute_resolved_values() {
    let orchestrator = Orchestrator::new(vec![Point::new("io").with_hooks([
        Hook::from_async("slow", |_, _, _| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<Value, HookError>(json!("slow done"))
            })
        }),
        Hook::from_async("after-slow", |_, _, store| {
            Box::pin(async move {
                let prev = store.get("io", "slow").cloned().unwrap_or(Value::Null);
                Ok::<Value, HookError>(json!({ "saw": prev }))
            })
        }),
    ])]);

    let result = orchestrator.run(None).await.unwrap();
    assert_eq!(result.store().get("io", "slow"), Some(&json!("slow done")));
    assert_eq!(
        result.store().get("io", "after-slow"),
        Some(&json!({ "saw": "slow done" }))
    );
}

#[tokio::test]
async fn test_options_and_point_name_are_forwarded() {
    let orchestrator = Orchestrator::new(vec![
        Point::new("deploy").with_hook(Hook::from_fn("target", |options, point, _| {
            Ok(json!({ "env": options["env"].clone(), "point": point }))
        })),
    ]);

    let result = orchestrator.run(Some(json!({ "env": "staging" }))).await.unwrap();
    assert_eq!(
        result.store().get("deploy", "target"),
        Some(&json!({ "env": "staging", "point": "deploy" }))
    );
    assert_eq!(result.options(), &json!({ "env": "staging" }));
}

#[tokio::test]
async fn test_failure_aborts_remaining_hooks() {
    let counter = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::new(vec![
        Point::new("p1")
            .with_hook(counting_hook("before", counter.clone()))
            .with_hook(Hook::from_fn("broken", |_, _, _| Err("disk full".into())))
            .with_hook(counting_hook("same-point-after", counter.clone())),
        Point::new("p2").with_hook(counting_hook("next-point", counter.clone())),
    ]);

    let err = orchestrator.run(None).await.unwrap_err();
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    match err {
        LifecycleError::HookExecution {
            point,
            hook,
            source,
        } => {
            assert_eq!(point, "p1");
            assert_eq!(hook, "broken");
            assert_eq!(source.to_string(), "disk full");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_async_rejection_is_reported() {
    let counter = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::new(vec![
        Point::new("fetch").with_hook(Hook::from_async("remote", |_, _, _| {
            Box::pin(async {
                tokio::task::yield_now().await;
                Err::<Value, HookError>("connection reset".into())
            })
        })),
        Point::new("use").with_hook(counting_hook("consume", counter.clone())),
    ]);

    let err = orchestrator.run(None).await.unwrap_err();
    assert_eq!(err.point(), "fetch");
    assert_eq!(err.hook(), Some("remote"));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_repeated_runs_are_independent() {
    let counter = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::new(vec![
        Point::new("p").with_hook(counting_hook("h", counter.clone())),
    ]);

    let first = orchestrator.run(None).await.unwrap();
    let second = orchestrator.run(None).await.unwrap();

    assert_eq!(first.store(), second.store());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(orchestrator.len(), 1);
}

#[tokio::test]
async fn test_duplicate_point_last_write_wins() {
    let mut orchestrator = Orchestrator::new(vec![
        Point::new("stage")
            .with_hook(Hook::value("shared", "first"))
            .with_hook(Hook::value("only-first", 1)),
    ]);
    orchestrator.add_points(Point::new("stage").with_hook(Hook::value("shared", "second")));

    let result = orchestrator.run(None).await.unwrap();
    assert_eq!(result.store().len(), 1);
    assert_eq!(result.store().get("stage", "shared"), Some(&json!("second")));
    assert_eq!(result.store().get("stage", "only-first"), Some(&json!(1)));
    assert_eq!(result.points_executed(), 2);
}

#[tokio::test]
async fn test_empty_orchestrator_runs_to_empty_store() {
    let result = Orchestrator::default().run(None).await.unwrap();
    assert!(result.store().is_empty());
}

/// Hook that logs entry and exit around a sleep.
fn tracing_hook(name: &str, log: Arc<Mutex<Vec<String>>>) -> Hook {
    let label = name.to_string();
    Hook::from_async(name, move |_, _, _| {
        let log = log.clone();
        let label = label.clone();
        Box::pin(async move {
            log.lock().unwrap().push(format!("enter {label}"));
            tokio::time::sleep(Duration::from_millis(10)).await;
            log.lock().unwrap().push(format!("exit {label}"));
            Ok::<Value, HookError>(Value::Null)
        })
    })
}

#[tokio::test(start_paused = true)]
async fn test_serialized_policy_does_not_interleave_runs() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = Arc::new(
        Orchestrator::new(vec![Point::new("p").with_hook(tracing_hook("h", log.clone()))])
            .with_policy(RunPolicy::Serialized),
    );

    let (a, b) = tokio::join!(orchestrator.run(None), orchestrator.run(None));
    a.unwrap();
    b.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["enter h", "exit h", "enter h", "exit h"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_policy_lets_runs_overlap() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = Arc::new(Orchestrator::new(vec![
        Point::new("p").with_hook(tracing_hook("h", log.clone())),
    ]));

    let (a, b) = tokio::join!(orchestrator.run(None), orchestrator.run(None));
    a.unwrap();
    b.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["enter h", "enter h", "exit h", "exit h"]
    );
}
