//! Post-action healthcheck.
//!
//! After a start or deploy the agent can poll an HTTP endpoint until the
//! application responds, turning "the process was launched" into "the
//! application is serving". The probe loop is bounded by a fixed attempt
//! budget.

use std::time::Duration;

use domino_core::{Attempt, DeploymentStatus};

/// Where a probe sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Attempts remain and no healthy response has arrived yet.
    Probing,
    /// A probe returned a success status.
    Ok,
    /// The attempt budget is exhausted without a healthy response.
    Failed,
}

/// Fold one probe outcome into the sequence state.
///
/// `status` is the HTTP status of the probe, or `None` when the request
/// itself failed (connection refused, timeout). Only 200 counts as healthy;
/// other statuses matter for diagnostics, not for the retry decision.
pub fn observe(attempt: &mut Attempt, status: Option<u16>) -> HealthState {
    if status == Some(200) {
        return HealthState::Ok;
    }
    attempt.record_failure();
    if attempt.is_limit_reached() {
        HealthState::Failed
    } else {
        HealthState::Probing
    }
}

/// Polls one URL until it answers healthy or the budget runs out.
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    max_attempts: u32,
}

impl HealthMonitor {
    /// Create a monitor for the given probe URL.
    #[must_use]
    pub fn new(url: String, interval: Duration, max_attempts: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            interval,
            max_attempts,
        }
    }

    /// Probe until healthy or the attempt budget is exhausted.
    ///
    /// Never returns [`HealthState::Probing`].
    pub async fn await_healthy(&self) -> HealthState {
        let mut attempt = Attempt::new(self.max_attempts);
        loop {
            let status = match self.client.get(&self.url).send().await {
                Ok(response) => Some(response.status().as_u16()),
                Err(err) => {
                    tracing::debug!(url = %self.url, error = %err, "Healthcheck probe failed");
                    None
                }
            };

            match observe(&mut attempt, status) {
                HealthState::Ok => {
                    tracing::info!(url = %self.url, "Healthcheck passed");
                    return HealthState::Ok;
                }
                HealthState::Failed => {
                    tracing::warn!(
                        url = %self.url,
                        max_attempts = self.max_attempts,
                        "Healthcheck budget exhausted"
                    );
                    return HealthState::Failed;
                }
                HealthState::Probing => {
                    tracing::debug!(url = %self.url, status = ?status, "Healthcheck not ready");
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

/// Optional healthcheck applied after a start or deploy.
///
/// With no monitor configured the action's plain status stands; with one,
/// the probe outcome decides between `HEALTH_CHECK_OK` and
/// `HEALTH_CHECK_FAILURE`.
#[derive(Debug, Clone, Default)]
pub struct HealthGate {
    monitor: Option<HealthMonitor>,
}

impl HealthGate {
    /// A gate that runs the given monitor after each start/deploy.
    #[must_use]
    pub fn monitored(monitor: HealthMonitor) -> Self {
        Self {
            monitor: Some(monitor),
        }
    }

    /// A gate that passes the plain status through unchanged.
    #[must_use]
    pub fn disabled() -> Self {
        Self { monitor: None }
    }

    /// Confirm a start/deploy, returning the status to report.
    pub async fn confirm(&self, plain: DeploymentStatus) -> DeploymentStatus {
        match &self.monitor {
            None => plain,
            Some(monitor) => match monitor.await_healthy().await {
                HealthState::Ok => DeploymentStatus::HealthCheckOk,
                HealthState::Failed | HealthState::Probing => {
                    DeploymentStatus::HealthCheckFailure
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn success_status_is_ok_immediately() {
        let mut attempt = Attempt::new(3);
        assert_eq!(observe(&mut attempt, Some(200)), HealthState::Ok);
    }

    #[test]
    fn failures_consume_the_budget() {
        let mut attempt = Attempt::new(3);
        assert_eq!(observe(&mut attempt, Some(503)), HealthState::Probing);
        assert_eq!(observe(&mut attempt, None), HealthState::Probing);
        assert_eq!(observe(&mut attempt, Some(500)), HealthState::Failed);
    }

    #[test]
    fn recovery_on_final_attempt_is_ok() {
        let mut attempt = Attempt::new(2);
        assert_eq!(observe(&mut attempt, Some(404)), HealthState::Probing);
        assert_eq!(observe(&mut attempt, Some(200)), HealthState::Ok);
    }

    #[test]
    fn only_exactly_200_is_healthy() {
        let mut attempt = Attempt::new(5);
        assert_eq!(observe(&mut attempt, Some(204)), HealthState::Probing);
        assert_eq!(observe(&mut attempt, Some(301)), HealthState::Probing);
    }

    #[tokio::test]
    async fn monitor_reports_healthy_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let monitor = HealthMonitor::new(server.uri(), Duration::from_millis(10), 3);
        assert_eq!(monitor.await_healthy().await, HealthState::Ok);
    }

    #[tokio::test]
    async fn monitor_exhausts_budget_against_failing_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let monitor = HealthMonitor::new(server.uri(), Duration::from_millis(10), 2);
        assert_eq!(monitor.await_healthy().await, HealthState::Failed);
    }

    #[tokio::test]
    async fn disabled_gate_passes_status_through() {
        let gate = HealthGate::disabled();
        assert_eq!(
            gate.confirm(DeploymentStatus::Deployed).await,
            DeploymentStatus::Deployed
        );
    }

    #[tokio::test]
    async fn monitored_gate_maps_probe_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gate = HealthGate::monitored(HealthMonitor::new(
            server.uri(),
            Duration::from_millis(10),
            2,
        ));
        assert_eq!(
            gate.confirm(DeploymentStatus::Deployed).await,
            DeploymentStatus::HealthCheckOk
        );
    }
}
