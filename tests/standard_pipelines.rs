// tests/standard_pipelines.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use assetflow::errors::AssetflowError;
use assetflow::tasks::standard::names;
use assetflow::tasks::{TaskRegistry, standard_registry};
use assetflow::types::TaskKind;
use assetflow_test_utils::fakes::{EventLog, FakeComponents, FakeSite, RecordingTransform};
use assetflow_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

fn registry(fakes: &FakeComponents) -> Arc<TaskRegistry> {
    Arc::new(standard_registry(&fakes.components).unwrap())
}

#[tokio::test]
async fn deploy_builds_for_production_and_never_serves() -> TestResult {
    init_tracing();
    let fakes = FakeComponents::new();
    let reg = registry(&fakes);

    with_timeout(reg.run(names::DEPLOY)).await?;

    let log = &fakes.log;
    assert!(log.contains("end:site:production"));
    assert!(!log.contains("start:site:development"));
    assert_eq!(fakes.server.starts(), 0);
    assert_eq!(fakes.reload.count(), 0);

    let site_done = log.position("end:site:production").unwrap();
    for t in ["css", "js", "img"] {
        assert!(log.position(&format!("start:{t}")).unwrap() > site_done);
    }
    Ok(())
}

#[tokio::test]
async fn serve_startup_builds_everything_before_serving() -> TestResult {
    init_tracing();
    let fakes = FakeComponents::new();
    let reg = registry(&fakes);

    with_timeout(reg.run(names::SERVE_STARTUP)).await?;

    let log = &fakes.log;
    let site_done = log.position("end:site:development").unwrap();
    let server = log.position("server:start").unwrap();
    for t in ["css", "js", "img"] {
        assert!(log.position(&format!("start:{t}")).unwrap() > site_done);
        assert!(log.position(&format!("end:{t}")).unwrap() < server);
    }
    assert_eq!(fakes.server.starts(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_site_build_aborts_startup_with_exit_code() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let fakes = FakeComponents::with_parts(
        log.clone(),
        FakeSite::new(&log).failing(1),
        RecordingTransform::new("css", &log),
        RecordingTransform::new("js", &log),
        RecordingTransform::new("img", &log),
    );
    let reg = registry(&fakes);

    let err = with_timeout(reg.run(names::SERVE_STARTUP)).await.unwrap_err();

    assert!(matches!(err, AssetflowError::SiteBuildFailed { code: 1 }));
    assert!(err.to_string().contains("exited with code: 1"));
    assert!(!log.contains("start:css"));
    assert_eq!(fakes.server.starts(), 0);
    Ok(())
}

#[tokio::test]
async fn css_rule_pipeline_reloads_after_transform_only() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let fakes = FakeComponents::with_parts(
        log.clone(),
        FakeSite::new(&log),
        RecordingTransform::new("css", &log).with_delay(Duration::from_millis(30)),
        RecordingTransform::new("js", &log),
        RecordingTransform::new("img", &log),
    );
    let reg = registry(&fakes);

    with_timeout(reg.run(names::WATCH_CSS)).await?;

    assert_eq!(log.entries(), vec!["start:css", "end:css", "reload"]);
    assert_eq!(fakes.reload.count(), 1);
    Ok(())
}

#[tokio::test]
async fn content_pipeline_rebuilds_site_then_assets_then_reloads() -> TestResult {
    init_tracing();
    let fakes = FakeComponents::new();
    let reg = registry(&fakes);

    with_timeout(reg.run(names::WATCH_CONTENT)).await?;

    let log = &fakes.log;
    let reload = log.position("reload").unwrap();
    assert!(log.position("end:site:development").unwrap() < log.position("start:css").unwrap());
    for t in ["css", "js", "img"] {
        assert!(log.position(&format!("end:{t}")).unwrap() < reload);
    }
    Ok(())
}

#[tokio::test]
async fn transform_error_rejects_pipeline_without_reload() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let fakes = FakeComponents::with_parts(
        log.clone(),
        FakeSite::new(&log),
        RecordingTransform::new("css", &log),
        RecordingTransform::new("js", &log).failing("disk full"),
        RecordingTransform::new("img", &log),
    );
    let reg = registry(&fakes);

    let err = with_timeout(reg.run(names::WATCH_JS)).await.unwrap_err();

    assert!(err.to_string().contains("disk full"));
    assert_eq!(fakes.reload.count(), 0);
    Ok(())
}

#[test]
fn registry_lists_every_standard_task() {
    let fakes = FakeComponents::new();
    let reg = standard_registry(&fakes.components).unwrap();
    let listed: Vec<(&str, TaskKind)> = reg.list().into_iter().map(|(n, k, _)| (n, k)).collect();

    for (name, kind) in [
        (names::BUILD, TaskKind::Unit),
        (names::BUILD_PROD, TaskKind::Unit),
        (names::BUILD_ASSETS, TaskKind::Composite),
        (names::BROWSER, TaskKind::Unit),
        (names::BROWSER_RELOAD, TaskKind::Unit),
        (names::DEPLOY, TaskKind::Sequence),
        (names::SERVE_STARTUP, TaskKind::Sequence),
        (names::WATCH_CSS, TaskKind::Sequence),
        (names::WATCH_JS, TaskKind::Sequence),
        (names::WATCH_IMG, TaskKind::Sequence),
        (names::WATCH_CONTENT, TaskKind::Sequence),
    ] {
        assert!(listed.contains(&(name, kind)), "missing {name} ({kind})");
    }

    // Only registered when a bower directory is configured.
    assert!(!reg.contains(names::IMPORT_VENDOR_CSS));
}
