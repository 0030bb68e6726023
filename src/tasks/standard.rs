// src/tasks/standard.rs

//! The fixed task set every project gets.

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use crate::assets::{AssetTransform, CssTransform, ImageTransform, JsTransform, VendorCssImport};
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::server::{DevServer, ReloadSignal, ServerControl};
use crate::site::{SiteBuild, SiteBuilder};
use crate::tasks::registry::TaskRegistry;
use crate::tasks::runnable::Runnable;
use crate::types::{BoxFuture, BuildEnvironment};

/// Registered task names.
pub mod names {
    pub const BUILD: &str = "build";
    pub const BUILD_PROD: &str = "build:prod";
    pub const BUILD_ASSETS: &str = "build:assets";
    pub const BUILD_CSS: &str = "build:css";
    pub const BUILD_JS: &str = "build:js";
    pub const BUILD_IMG: &str = "build:img";
    pub const IMPORT_VENDOR_CSS: &str = "import:vendor-css";
    pub const BROWSER: &str = "browser";
    pub const BROWSER_RELOAD: &str = "browser:reload";
    pub const DEPLOY: &str = "deploy";
    pub const SERVE_STARTUP: &str = "serve:startup";
    pub const WATCH_CSS: &str = "watch:css";
    pub const WATCH_JS: &str = "watch:js";
    pub const WATCH_IMG: &str = "watch:img";
    pub const WATCH_CONTENT: &str = "watch:content";
    /// Not a registry entry: the long-running session the CLI defaults to.
    pub const SERVE: &str = "serve";
}

/// Everything the standard tasks close over.
///
/// Built once from the config in production; tests assemble it from fakes.
#[derive(Clone)]
pub struct Components {
    pub site: Arc<dyn SiteBuild>,
    pub css: Arc<dyn AssetTransform>,
    pub js: Arc<dyn AssetTransform>,
    pub img: Arc<dyn AssetTransform>,
    pub vendor_css: Option<Arc<dyn AssetTransform>>,
    pub server: Arc<dyn ServerControl>,
    pub reload: Arc<dyn ReloadSignal>,
}

impl Components {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let server = Arc::new(DevServer::from_config(cfg)?);

        let vendor_css = VendorCssImport::from_config(cfg, Arc::clone(&fs))?
            .map(|v| Arc::new(v) as Arc<dyn AssetTransform>);

        Ok(Self {
            site: Arc::new(SiteBuilder::from_config(cfg)),
            css: Arc::new(CssTransform::from_config(cfg, Arc::clone(&fs))?),
            js: Arc::new(JsTransform::from_config(cfg, Arc::clone(&fs))?),
            img: Arc::new(ImageTransform::from_config(cfg, fs)?),
            vendor_css,
            server: Arc::clone(&server) as Arc<dyn ServerControl>,
            reload: server,
        })
    }
}

/// Runs a transform on the blocking pool and logs its report.
///
/// A failed compile is reported, not propagated; IO errors still reject.
pub fn transform_task(transform: Arc<dyn AssetTransform>) -> impl Runnable {
    move || -> BoxFuture<'static, Result<()>> {
        let transform = Arc::clone(&transform);
        Box::pin(async move {
            let name = transform.name().to_string();
            let report = tokio::task::spawn_blocking(move || transform.run())
                .await
                .with_context(|| format!("transform '{name}' panicked"))??;
            report.log();
            Ok(())
        })
    }
}

pub fn site_task(site: Arc<dyn SiteBuild>, env: BuildEnvironment) -> impl Runnable {
    move || -> BoxFuture<'static, Result<()>> {
        let site = Arc::clone(&site);
        Box::pin(async move { site.build(env).await })
    }
}

pub fn server_task(server: Arc<dyn ServerControl>) -> impl Runnable {
    move || -> BoxFuture<'static, Result<()>> {
        let server = Arc::clone(&server);
        Box::pin(async move {
            server.start().await?;
            Ok(())
        })
    }
}

pub fn reload_task(reload: Arc<dyn ReloadSignal>) -> impl Runnable {
    move || -> BoxFuture<'static, Result<()>> {
        let clients = reload.reload();
        debug!(clients, "reload signal sent");
        Box::pin(async { Ok(()) })
    }
}

/// Register the standard tasks and validate the result.
pub fn standard_registry(c: &Components) -> Result<TaskRegistry> {
    use names::*;

    let mut reg = TaskRegistry::new();

    reg.register(BUILD, site_task(Arc::clone(&c.site), BuildEnvironment::Development))?;
    reg.register(BUILD_PROD, site_task(Arc::clone(&c.site), BuildEnvironment::Production))?;

    reg.register(BUILD_CSS, transform_task(Arc::clone(&c.css)))?;
    reg.register(BUILD_JS, transform_task(Arc::clone(&c.js)))?;
    reg.register(BUILD_IMG, transform_task(Arc::clone(&c.img)))?;
    reg.register_composite(BUILD_ASSETS, &[BUILD_CSS, BUILD_JS, BUILD_IMG])?;

    if let Some(vendor) = &c.vendor_css {
        reg.register(IMPORT_VENDOR_CSS, transform_task(Arc::clone(vendor)))?;
    }

    reg.register(BROWSER, server_task(Arc::clone(&c.server)))?;
    reg.register(BROWSER_RELOAD, reload_task(Arc::clone(&c.reload)))?;

    reg.register_sequence(DEPLOY, &[BUILD_PROD, BUILD_ASSETS])?;
    reg.register_sequence(SERVE_STARTUP, &[BUILD, BUILD_ASSETS, BROWSER])?;

    reg.register_sequence(WATCH_CSS, &[BUILD_CSS, BROWSER_RELOAD])?;
    reg.register_sequence(WATCH_JS, &[BUILD_JS, BROWSER_RELOAD])?;
    reg.register_sequence(WATCH_IMG, &[BUILD_IMG, BROWSER_RELOAD])?;
    reg.register_sequence(WATCH_CONTENT, &[BUILD, BUILD_ASSETS, BROWSER_RELOAD])?;

    reg.validate()?;
    Ok(reg)
}
