//! Recording stand-ins for the components the standard tasks close over.
//!
//! Every fake appends to a shared [`EventLog`] so tests can assert on the
//! interleaving of starts and ends across tasks.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetflow::assets::{AssetTransform, TransformReport};
use assetflow::errors::{AssetflowError, Result};
use assetflow::server::{ReloadSignal, ServerControl};
use assetflow::site::SiteBuild;
use assetflow::tasks::Components;
use assetflow::types::{BoxFuture, BuildEnvironment};

/// Shared, ordered record of what the fakes did.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }
}

/// Transform that logs `start:<name>` / `end:<name>`, optionally sleeping in
/// between and optionally failing.
#[derive(Debug)]
pub struct RecordingTransform {
    name: String,
    log: EventLog,
    delay: Duration,
    fail: Option<String>,
}

impl RecordingTransform {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            delay: Duration::ZERO,
            fail: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail = Some(message.to_string());
        self
    }
}

impl AssetTransform for RecordingTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> Result<TransformReport> {
        self.log.push(format!("start:{}", self.name));
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(msg) = &self.fail {
            self.log.push(format!("fail:{}", self.name));
            return Err(AssetflowError::Other(anyhow::anyhow!(msg.clone())));
        }
        self.log.push(format!("end:{}", self.name));
        Ok(TransformReport::from_outputs(self.name.clone(), Vec::new()))
    }
}

/// Site builder that records `site:<environment>` and can fail with an exit
/// code.
#[derive(Debug, Default)]
pub struct FakeSite {
    log: EventLog,
    fail_code: Option<i32>,
    delay: Duration,
}

impl FakeSite {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            fail_code: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(mut self, code: i32) -> Self {
        self.fail_code = Some(code);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SiteBuild for FakeSite {
    fn build(&self, env: BuildEnvironment) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.log.push(format!("start:site:{env}"));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(code) = self.fail_code {
                self.log.push(format!("fail:site:{env}"));
                return Err(AssetflowError::SiteBuildFailed { code });
            }
            self.log.push(format!("end:site:{env}"));
            Ok(())
        })
    }
}

#[derive(Debug, Default)]
pub struct FakeServer {
    log: EventLog,
    starts: AtomicUsize,
}

impl FakeServer {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            starts: AtomicUsize::new(0),
        }
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl ServerControl for FakeServer {
    fn start(&self) -> BoxFuture<'_, Result<SocketAddr>> {
        Box::pin(async move {
            self.starts.fetch_add(1, Ordering::SeqCst);
            self.log.push("server:start");
            Ok(SocketAddr::from(([127, 0, 0, 1], 0)))
        })
    }
}

#[derive(Debug, Default)]
pub struct FakeReload {
    log: EventLog,
    count: AtomicUsize,
}

impl FakeReload {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            count: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ReloadSignal for FakeReload {
    fn reload(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.log.push("reload");
        0
    }
}

/// Fakes wired into a [`Components`], with handles kept for assertions.
pub struct FakeComponents {
    pub log: EventLog,
    pub site: Arc<FakeSite>,
    pub server: Arc<FakeServer>,
    pub reload: Arc<FakeReload>,
    pub components: Components,
}

impl FakeComponents {
    /// All fakes succeed immediately.
    pub fn new() -> Self {
        let log = EventLog::new();
        let css = RecordingTransform::new("css", &log);
        let js = RecordingTransform::new("js", &log);
        let img = RecordingTransform::new("img", &log);
        Self::with_parts(log.clone(), FakeSite::new(&log), css, js, img)
    }

    pub fn with_parts(
        log: EventLog,
        site: FakeSite,
        css: RecordingTransform,
        js: RecordingTransform,
        img: RecordingTransform,
    ) -> Self {
        let site = Arc::new(site);
        let server = Arc::new(FakeServer::new(&log));
        let reload = Arc::new(FakeReload::new(&log));

        let components = Components {
            site: Arc::clone(&site) as Arc<dyn SiteBuild>,
            css: Arc::new(css),
            js: Arc::new(js),
            img: Arc::new(img),
            vendor_css: None,
            server: Arc::clone(&server) as Arc<dyn ServerControl>,
            reload: Arc::clone(&reload) as Arc<dyn ReloadSignal>,
        };

        Self {
            log,
            site,
            server,
            reload,
            components,
        }
    }
}

impl Default for FakeComponents {
    fn default() -> Self {
        Self::new()
    }
}
