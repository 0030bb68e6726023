// src/site/builder.rs

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::{AssetflowError, Result};
use crate::site::SiteBuild;
use crate::types::{BoxFuture, BuildEnvironment};

/// Runs `<command> <args...> --config <file>` in the project root.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    command: String,
    args: Vec<String>,
    dev_config: String,
    prod_config: String,
    workdir: PathBuf,
    timeout: Option<Duration>,
}

impl SiteBuilder {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            command: cfg.site.command.clone(),
            args: cfg.site.args.clone(),
            dev_config: cfg.site.config.clone(),
            prod_config: cfg.site.prod_config.clone(),
            workdir: cfg.root().to_path_buf(),
            timeout: cfg.site.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Generator config file for `env`: production uses the build config,
    /// anything else the default one.
    pub fn config_for(&self, env: BuildEnvironment) -> &str {
        match env {
            BuildEnvironment::Production => &self.prod_config,
            BuildEnvironment::Development => &self.dev_config,
        }
    }

    /// Full argv for `env`, program first.
    pub fn command_line(&self, env: BuildEnvironment) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 3);
        argv.push(self.command.clone());
        argv.extend(self.args.iter().cloned());
        argv.push("--config".to_string());
        argv.push(self.config_for(env).to_string());
        argv
    }

    async fn run(&self, env: BuildEnvironment) -> Result<()> {
        let config = self.config_for(env);
        info!(
            env = %env,
            cmd = %self.command_line(env).join(" "),
            "starting site generator"
        );

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg("--config")
            .arg(config)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning site generator '{}'", self.command))?;

        // Forward stdout verbatim; keep the handle so all of it is printed
        // before we report the outcome.
        let stdout_task = child.stdout.take().map(|stdout| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    println!("{line}");
                }
            })
        });

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("site generator: {}", line);
                }
            });
        }

        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status.context("waiting for site generator")?,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "failed to kill site generator after timeout");
                    }
                    return Err(AssetflowError::SiteBuildTimedOut {
                        secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait().await.context("waiting for site generator")?,
        };

        if let Some(task) = stdout_task {
            if let Err(e) = task.await {
                debug!(error = %e, "stdout forwarder ended abnormally");
            }
        }

        let code = status.code().unwrap_or(-1);
        info!(env = %env, exit_code = code, success = status.success(), "site generator exited");

        if status.success() {
            Ok(())
        } else {
            Err(AssetflowError::SiteBuildFailed { code })
        }
    }
}

impl SiteBuild for SiteBuilder {
    fn build(&self, env: BuildEnvironment) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.run(env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(command: &str, args: &[&str]) -> SiteBuilder {
        SiteBuilder {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            dev_config: "_config.yml".to_string(),
            prod_config: "_config.build.yml".to_string(),
            workdir: std::env::temp_dir(),
            timeout: None,
        }
    }

    #[test]
    fn environment_selects_config_file() {
        let b = builder("jekyll", &["build"]);
        assert_eq!(
            b.command_line(BuildEnvironment::Production),
            vec!["jekyll", "build", "--config", "_config.build.yml"]
        );
        assert_eq!(b.config_for(BuildEnvironment::Development), "_config.yml");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_embeds_code() {
        let b = builder("sh", &["-c", "exit 3", "sitegen"]);
        let err = b.build(BuildEnvironment::Development).await.unwrap_err();
        assert!(matches!(err, AssetflowError::SiteBuildFailed { code: 3 }));
        assert!(err.to_string().contains("exited with code: 3"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let b = builder("sh", &["-c", "echo built", "sitegen"]);
        b.build(BuildEnvironment::Production).await.unwrap();
    }

    #[tokio::test]
    async fn missing_binary_is_reported_not_panicked() {
        let b = builder("assetflow-no-such-generator", &[]);
        assert!(b.build(BuildEnvironment::Development).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_hung_generator() {
        let mut b = builder("sh", &["-c", "sleep 5", "sitegen"]);
        b.timeout = Some(Duration::from_millis(100));
        let err = b.build(BuildEnvironment::Development).await.unwrap_err();
        assert!(matches!(err, AssetflowError::SiteBuildTimedOut { .. }));
    }
}
