/// Recovery orchestrator - runs the four roles in order, one response at a time.
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::agents::{AgentSet, Role};
use crate::config::RuntimeConfig;
use crate::error::RecoveryError;
use crate::media::{ImageInput, convert_images};
use crate::request::RecoveryRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoleOutcome {
    Success { content: String },
    Failure { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub role: Role,
    pub outcome: RoleOutcome,
    pub elapsed_ms: u64,
}

impl AgentResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RoleOutcome::Success { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            RoleOutcome::Success { content } => Some(content),
            RoleOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RoleOutcome::Success { .. } => None,
            RoleOutcome::Failure { error } => Some(error),
        }
    }

    pub fn section_title(&self) -> &'static str {
        self.role.section_title()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub responses: Vec<AgentResponse>,
}

impl RecoveryReport {
    pub fn succeeded(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.responses.len() - self.succeeded()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.responses.iter().map(|r| r.role).collect()
    }
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    pace: Duration,
}

impl Orchestrator {
    pub fn new(pace: Duration) -> Self {
        Self { pace }
    }

    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        Self::new(cfg.pace())
    }

    pub fn pace(&self) -> Duration {
        self.pace
    }

    /// Prepares a run. Fails before any agent call when no agent set is available.
    pub fn run(
        &self,
        agents: Option<Arc<AgentSet>>,
        request: RecoveryRequest,
    ) -> Result<RecoveryRun, RecoveryError> {
        let Some(agents) = agents else {
            tracing::error!("Recovery run requested without an initialized agent set");
            return Err(RecoveryError::AgentsNotInitialized);
        };

        let (narrative, buffers) = request.into_parts();
        let images = convert_images(buffers);
        tracing::info!(
            narrative_chars = narrative.chars().count(),
            images = images.len(),
            pace_ms = self.pace.as_millis() as u64,
            "Starting recovery run"
        );

        Ok(RecoveryRun {
            agents,
            narrative,
            images,
            pace: self.pace,
            next_index: 0,
        })
    }
}

/// A started run. Each call to [`RecoveryRun::next_response`] invokes exactly one role.
pub struct RecoveryRun {
    agents: Arc<AgentSet>,
    narrative: String,
    images: Vec<ImageInput>,
    pace: Duration,
    next_index: usize,
}

impl RecoveryRun {
    pub fn upcoming_role(&self) -> Option<Role> {
        Role::ALL.get(self.next_index).copied()
    }

    pub fn images(&self) -> &[ImageInput] {
        &self.images
    }

    /// Runs the next role and returns its response, or `None` once all four have run.
    ///
    /// Between consecutive roles the run sleeps for the configured pace; there is no
    /// pause after the last role. A failing role yields a failure response and the
    /// sequence carries on.
    pub async fn next_response(&mut self) -> Option<AgentResponse> {
        let role = self.upcoming_role()?;

        if self.next_index > 0 && !self.pace.is_zero() {
            tokio::time::sleep(self.pace).await;
        }
        self.next_index += 1;

        let agent = self.agents.get(role);
        let prompt = role.build_prompt(&self.narrative);
        let started = Instant::now();
        let result = agent.run(&prompt, &self.images).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = match result {
            Ok(reply) => {
                tracing::info!(role = role.label(), elapsed_ms, "Role completed");
                RoleOutcome::Success {
                    content: reply.content,
                }
            }
            Err(err) => {
                let scoped = RecoveryError::RoleInvocation {
                    agent: role.failure_label(),
                    message: err.to_string(),
                };
                tracing::error!(role = role.label(), error = %err, "Role failed");
                RoleOutcome::Failure {
                    error: scoped.to_string(),
                }
            }
        };

        Some(AgentResponse {
            role,
            outcome,
            elapsed_ms,
        })
    }

    /// Drains the remaining roles into a report.
    pub async fn collect(mut self) -> RecoveryReport {
        let mut report = RecoveryReport::default();
        while let Some(response) = self.next_response().await {
            report.responses.push(response);
        }
        report
    }
}
