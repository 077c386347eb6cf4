use std::sync::Arc;

use crate::agents::{AgentFactory, AgentSet};
use crate::credential::Credential;
use crate::error::RecoveryError;
use crate::request::{Readiness, RecoveryRequest};

/// Per-user session context: the active credential and the agent set built for it.
pub struct RecoverySession {
    factory: AgentFactory,
    credential: Option<Credential>,
    agents: Option<Arc<AgentSet>>,
    init_error: Option<String>,
}

impl RecoverySession {
    pub fn new(factory: AgentFactory) -> Self {
        Self {
            factory,
            credential: None,
            agents: None,
            init_error: None,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn agents(&self) -> Option<Arc<AgentSet>> {
        self.agents.clone()
    }

    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    pub fn factory(&self) -> &AgentFactory {
        &self.factory
    }

    /// Makes `credential` active and returns its agent set, rebuilding only when the key changed.
    ///
    /// On failure the session keeps the credential but holds no agents, so a later run is
    /// refused with [`RecoveryError::AgentsNotInitialized`].
    pub fn activate(&mut self, credential: Credential) -> Result<Arc<AgentSet>, RecoveryError> {
        if let Some(agents) = self.agents.as_ref()
            && agents.is_bound_to(&credential)
        {
            return Ok(agents.clone());
        }

        if let Some(previous) = self.credential.take()
            && previous != credential
            && self.factory.invalidate(&previous)
        {
            tracing::debug!("Credential changed; dropped cached agent set");
        }
        self.credential = Some(credential.clone());

        match self.factory.build(&credential) {
            Ok(agents) => {
                self.agents = Some(agents.clone());
                self.init_error = None;
                Ok(agents)
            }
            Err(err) => {
                self.agents = None;
                self.init_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Forgets the credential and its cached agents.
    pub fn clear(&mut self) {
        if let Some(previous) = self.credential.take() {
            self.factory.invalidate(&previous);
        }
        self.agents = None;
        self.init_error = None;
    }

    pub fn readiness(&self, request: &RecoveryRequest) -> Readiness {
        Readiness::evaluate(self.credential.as_ref(), request)
    }
}
