//! Domino Agent - per-host deployment executor.
//!
//! Configuration comes entirely from environment variables; see
//! [`AgentConfig::from_env`]. The process stays up until a fatal error
//! (lost connection, unconfirmed ping) and then exits non-zero so the
//! host's supervisor restarts it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domino_agent::executor::{
    ContainerStrategy, DockerCliAdapter, HostStrategy, ProcessAdapter, SystemctlAdapter,
};
use domino_agent::healthcheck::{HealthGate, HealthMonitor};
use domino_agent::tasks::{AnnounceTask, ConnectTask, HeaderTask, KeepAliveTask};
use domino_agent::{AgentConfig, StrategyRegistry, TaskContext, TaskPipeline};

use domino_core::SourceType;

fn health_gate(config: &AgentConfig) -> HealthGate {
    match &config.healthcheck_url {
        Some(url) => HealthGate::monitored(HealthMonitor::new(
            url.clone(),
            config.healthcheck_interval(),
            config.healthcheck_max_attempts,
        )),
        None => HealthGate::disabled(),
    }
}

fn build_strategies(config: &AgentConfig) -> StrategyRegistry {
    let health = health_gate(config);
    let start_delay = config.start_delay();

    let releases_dir =
        std::env::var("RELEASES_DIR").unwrap_or_else(|_| "/opt/domino/releases".into());
    let image_repository =
        std::env::var("IMAGE_REPOSITORY").unwrap_or_else(|_| "localhost:5000".into());

    StrategyRegistry::new()
        .with_strategy(Arc::new(HostStrategy::new(
            SourceType::Process,
            Arc::new(ProcessAdapter::new(releases_dir)),
            health.clone(),
            start_delay,
        )))
        .with_strategy(Arc::new(HostStrategy::new(
            SourceType::Service,
            Arc::new(SystemctlAdapter),
            health.clone(),
            start_delay,
        )))
        .with_strategy(Arc::new(ContainerStrategy::new(
            Arc::new(DockerCliAdapter::new(image_repository)),
            health,
            start_delay,
        )))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,domino=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Domino Agent");

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid agent configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        agent_id = %config.agent_id(),
        coordinator_url = %config.coordinator_url,
        "Agent configuration loaded"
    );

    let executor = Arc::new(build_strategies(&config));
    let dispatcher = Arc::new(domino_agent::handlers::build_dispatcher());

    let (fatal_tx, mut fatal_rx) = mpsc::channel(1);
    let mut ctx = TaskContext::new(config, fatal_tx);

    let pipeline = TaskPipeline::new()
        .with_task(Box::new(HeaderTask))
        .with_task(Box::new(ConnectTask::new(dispatcher, executor)))
        .with_task(Box::new(AnnounceTask))
        .with_task(Box::new(KeepAliveTask));

    if let Err(err) = pipeline.run(&mut ctx).await {
        tracing::error!(error = %err, "Agent startup failed");
        std::process::exit(1);
    }

    // The pipeline succeeded; from here the agent is driven by the read
    // loop and keep-alive watchdog until one of them raises a fatal error.
    if let Some(err) = fatal_rx.recv().await {
        tracing::error!(error = %err, "Fatal agent error");
    }
    std::process::exit(1);
}
