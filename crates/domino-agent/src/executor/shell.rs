//! Shell-backed runtime adapters.
//!
//! Thin wrappers over the host tooling: a release-directory layout for raw
//! processes, `systemctl` for managed services, and the `docker` CLI for
//! containers. Everything here shells out; the strategies above stay
//! testable against fake adapters.

use async_trait::async_trait;
use tokio::process::Command;

use super::runtime::{RuntimeAdapter, RuntimeError};

/// Run one command to completion, capturing output.
async fn run(program: &str, args: &[&str]) -> Result<std::process::Output, RuntimeError> {
    let rendered = format!("{program} {}", args.join(" "));
    tracing::debug!(command = %rendered, "Running host command");
    Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| RuntimeError::Spawn {
            command: rendered,
            source,
        })
}

/// Run a command and require a zero exit status.
async fn run_checked(program: &str, args: &[&str]) -> Result<(), RuntimeError> {
    let output = run(program, args).await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(RuntimeError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Raw host processes managed through a release-directory convention.
///
/// A deployment named `app` lives at `{releases_dir}/app/{version}` with a
/// `run.sh` to launch it and a `current` symlink selecting the active
/// version.
pub struct ProcessAdapter {
    releases_dir: String,
}

impl ProcessAdapter {
    /// Adapter rooted at the given releases directory.
    #[must_use]
    pub fn new(releases_dir: impl Into<String>) -> Self {
        Self {
            releases_dir: releases_dir.into(),
        }
    }

    fn release_path(&self, deployment: &str, version: &str) -> String {
        format!("{}/{deployment}/{version}", self.releases_dir)
    }

    fn current_path(&self, deployment: &str) -> String {
        format!("{}/{deployment}/current", self.releases_dir)
    }
}

#[async_trait]
impl RuntimeAdapter for ProcessAdapter {
    async fn create(&self, deployment: &str, version: &str) -> Result<(), RuntimeError> {
        let release = self.release_path(deployment, version);
        let current = self.current_path(deployment);
        run_checked("test", &["-d", &release]).await?;
        run_checked("ln", &["-sfn", &release, &current]).await
    }

    async fn start(&self, deployment: &str) -> Result<(), RuntimeError> {
        let script = format!("{}/run.sh", self.current_path(deployment));
        // The backgrounded process inherits the shell's stdio; without the
        // redirect it keeps the output pipes open and `run` would wait on
        // them for as long as the deployment lives.
        run_checked("sh", &["-c", &format!("{script} >/dev/null 2>&1 &")]).await
    }

    async fn stop(&self, deployment: &str) -> Result<bool, RuntimeError> {
        // pkill exits 1 when no process matched, which is our "was not
        // running" case, not a failure.
        let output = run("pkill", &["-f", deployment]).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(RuntimeError::CommandFailed {
                command: format!("pkill -f {deployment}"),
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// Deployments managed as systemd units.
///
/// The unit is expected to be provisioned out of band; installing new unit
/// versions is not something the agent does.
pub struct SystemctlAdapter;

#[async_trait]
impl RuntimeAdapter for SystemctlAdapter {
    async fn create(&self, _deployment: &str, _version: &str) -> Result<(), RuntimeError> {
        Err(RuntimeError::Unsupported(
            "service units are provisioned out of band",
        ))
    }

    async fn start(&self, deployment: &str) -> Result<(), RuntimeError> {
        run_checked("systemctl", &["start", deployment]).await
    }

    async fn stop(&self, deployment: &str) -> Result<bool, RuntimeError> {
        let active = run("systemctl", &["is-active", "--quiet", deployment]).await?;
        let was_running = active.status.success();
        run_checked("systemctl", &["stop", deployment]).await?;
        Ok(was_running)
    }
}

/// Containers managed through the `docker` CLI.
pub struct DockerCliAdapter {
    image_repository: String,
}

impl DockerCliAdapter {
    /// Adapter pulling images from the given repository prefix.
    #[must_use]
    pub fn new(image_repository: impl Into<String>) -> Self {
        Self {
            image_repository: image_repository.into(),
        }
    }

    fn image(&self, deployment: &str, version: &str) -> String {
        format!("{}/{deployment}:{version}", self.image_repository)
    }
}

#[async_trait]
impl RuntimeAdapter for DockerCliAdapter {
    async fn create(&self, deployment: &str, version: &str) -> Result<(), RuntimeError> {
        let image = self.image(deployment, version);
        run_checked("docker", &["pull", &image]).await?;
        // Replace any container left over from the previous version.
        let _ = run("docker", &["rm", "-f", deployment]).await?;
        run_checked("docker", &["create", "--name", deployment, &image]).await
    }

    async fn start(&self, deployment: &str) -> Result<(), RuntimeError> {
        run_checked("docker", &["start", deployment]).await
    }

    async fn stop(&self, deployment: &str) -> Result<bool, RuntimeError> {
        let running = run(
            "docker",
            &["inspect", "--format", "{{.State.Running}}", deployment],
        )
        .await?;
        let was_running = running.status.success()
            && String::from_utf8_lossy(&running.stdout).trim() == "true";
        run_checked("docker", &["stop", deployment]).await?;
        Ok(was_running)
    }
}
