// tests/registry_semantics.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use assetflow::errors::AssetflowError;
use assetflow::tasks::{Runnable, TaskRegistry};
use assetflow::types::BoxFuture;
use assetflow_test_utils::fakes::EventLog;
use assetflow_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

/// Unit that logs start/end around a sleep and optionally fails.
fn step(log: &EventLog, name: &'static str, delay_ms: u64, fail: bool) -> impl Runnable + use<> {
    let log = log.clone();
    move || -> BoxFuture<'static, assetflow::errors::Result<()>> {
        let log = log.clone();
        Box::pin(async move {
            log.push(format!("start:{name}"));
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if fail {
                log.push(format!("fail:{name}"));
                return Err(AssetflowError::ConfigError(format!("{name} failed")));
            }
            log.push(format!("end:{name}"));
            Ok(())
        })
    }
}

#[tokio::test]
async fn sequence_members_run_strictly_in_order() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut reg = TaskRegistry::new();
    reg.register("a", step(&log, "a", 30, false))?;
    reg.register("b", step(&log, "b", 0, false))?;
    reg.register("c", step(&log, "c", 10, false))?;
    reg.register_sequence("abc", &["a", "b", "c"])?;
    reg.validate()?;
    let reg = Arc::new(reg);

    with_timeout(reg.run("abc")).await?;

    assert_eq!(
        log.entries(),
        vec!["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]
    );
    Ok(())
}

#[tokio::test]
async fn sequence_stops_at_first_rejection() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut reg = TaskRegistry::new();
    reg.register("a", step(&log, "a", 0, true))?;
    reg.register("b", step(&log, "b", 0, false))?;
    reg.register("c", step(&log, "c", 0, false))?;
    reg.register_sequence("abc", &["a", "b", "c"])?;
    let reg = Arc::new(reg);

    let err = with_timeout(reg.run("abc")).await.unwrap_err();

    assert!(err.to_string().contains("a failed"), "got: {err}");
    assert!(!log.contains("start:b"));
    assert!(!log.contains("start:c"));
    Ok(())
}

#[tokio::test]
async fn composite_starts_every_member_before_waiting() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut reg = TaskRegistry::new();
    reg.register("a", step(&log, "a", 50, false))?;
    reg.register("b", step(&log, "b", 50, false))?;
    reg.register("c", step(&log, "c", 50, false))?;
    reg.register_composite("all", &["a", "b", "c"])?;
    let reg = Arc::new(reg);

    with_timeout(reg.run("all")).await?;

    let entries = log.entries();
    let last_start = ["start:a", "start:b", "start:c"]
        .iter()
        .map(|s| log.position(s).unwrap())
        .max()
        .unwrap();
    let first_end = ["end:a", "end:b", "end:c"]
        .iter()
        .map(|s| log.position(s).unwrap())
        .min()
        .unwrap();
    assert!(last_start < first_end, "members did not overlap: {entries:?}");
    Ok(())
}

#[tokio::test]
async fn composite_rejects_fast_and_leaves_siblings_running() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut reg = TaskRegistry::new();
    reg.register("fast_fail", step(&log, "fast_fail", 0, true))?;
    reg.register("slow", step(&log, "slow", 100, false))?;
    reg.register_composite("both", &["slow", "fast_fail"])?;
    let reg = Arc::new(reg);

    let err = with_timeout(reg.run("both")).await.unwrap_err();
    assert!(err.to_string().contains("fast_fail failed"));
    assert!(!log.contains("end:slow"), "rejection should not wait for siblings");

    // No rollback: the sibling finishes on its own.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(log.contains("end:slow"));
    Ok(())
}

#[tokio::test]
async fn nested_sequence_of_composites() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let mut reg = TaskRegistry::new();
    reg.register("site", step(&log, "site", 20, false))?;
    reg.register("css", step(&log, "css", 10, false))?;
    reg.register("js", step(&log, "js", 10, false))?;
    reg.register("reload", step(&log, "reload", 0, false))?;
    reg.register_composite("assets", &["css", "js"])?;
    reg.register_sequence("pipeline", &["site", "assets", "reload"])?;
    reg.validate()?;
    let reg = Arc::new(reg);

    with_timeout(reg.run("pipeline")).await?;

    let pos = |s: &str| log.position(s).unwrap();
    assert!(pos("end:site") < pos("start:css"));
    assert!(pos("end:site") < pos("start:js"));
    assert!(pos("end:css") < pos("start:reload"));
    assert!(pos("end:js") < pos("start:reload"));
    Ok(())
}

#[tokio::test]
async fn unknown_task_is_rejected() -> TestResult {
    let reg = Arc::new(TaskRegistry::new());
    let err = reg.run("nope").await.unwrap_err();
    assert!(matches!(err, AssetflowError::TaskNotFound(_)));
    Ok(())
}

#[test]
fn validate_catches_bad_compositions() -> TestResult {
    let log = EventLog::new();

    let mut missing = TaskRegistry::new();
    missing.register("a", step(&log, "a", 0, false))?;
    missing.register_sequence("s", &["a", "ghost"])?;
    assert!(matches!(
        missing.validate().unwrap_err(),
        AssetflowError::TaskNotFound(_)
    ));

    let mut cyclic = TaskRegistry::new();
    cyclic.register_sequence("x", &["y"])?;
    cyclic.register_composite("y", &["x"])?;
    assert!(matches!(
        cyclic.validate().unwrap_err(),
        AssetflowError::TaskCycle(_)
    ));

    let mut dup = TaskRegistry::new();
    dup.register("a", step(&log, "a", 0, false))?;
    assert!(dup.register_sequence("a", &[]).is_err());
    Ok(())
}
