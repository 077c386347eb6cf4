/// Agent factory - builds the four-role set for a credential and memoizes it.
use std::collections::HashMap;
use std::sync::Arc;

use crate::credential::Credential;
use crate::error::RecoveryError;
use crate::model::ModelConnector;

use super::roles::{Role, RoleAgent};

/// Four role agents sharing one model handle, valid only for the credential they were built from.
#[derive(Debug)]
pub struct AgentSet {
    credential: Credential,
    therapist: RoleAgent,
    closure: RoleAgent,
    routine_planner: RoleAgent,
    brutal_honesty: RoleAgent,
}

impl AgentSet {
    pub fn get(&self, role: Role) -> &RoleAgent {
        match role {
            Role::Therapist => &self.therapist,
            Role::Closure => &self.closure,
            Role::RoutinePlanner => &self.routine_planner,
            Role::BrutalHonesty => &self.brutal_honesty,
        }
    }

    /// Agents in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &RoleAgent> {
        Role::ALL.into_iter().map(|role| self.get(role))
    }

    pub fn is_bound_to(&self, credential: &Credential) -> bool {
        &self.credential == credential
    }
}

pub struct AgentFactory {
    connector: Arc<dyn ModelConnector>,
    web_search: bool,
    cache: HashMap<Credential, Arc<AgentSet>>,
}

impl AgentFactory {
    pub fn new(connector: Arc<dyn ModelConnector>, web_search: bool) -> Self {
        Self {
            connector,
            web_search,
            cache: HashMap::new(),
        }
    }

    /// Returns the cached set for `credential`, constructing it on first use.
    pub fn build(&mut self, credential: &Credential) -> Result<Arc<AgentSet>, RecoveryError> {
        if let Some(existing) = self.cache.get(credential) {
            tracing::debug!(credential = %credential.masked(), "Reusing cached agent set");
            return Ok(existing.clone());
        }

        let model = self.connector.connect(credential).map_err(|err| {
            tracing::error!(error = %err, "Agent set construction failed");
            RecoveryError::AgentSetInitFailure(err.to_string())
        })?;

        let agents = Arc::new(AgentSet {
            credential: credential.clone(),
            therapist: RoleAgent::new(Role::Therapist, model.clone(), self.web_search),
            closure: RoleAgent::new(Role::Closure, model.clone(), self.web_search),
            routine_planner: RoleAgent::new(Role::RoutinePlanner, model.clone(), self.web_search),
            brutal_honesty: RoleAgent::new(Role::BrutalHonesty, model, self.web_search),
        });

        tracing::info!(
            credential = %credential.masked(),
            model = %agents.therapist.model_name(),
            web_search = agents.brutal_honesty.has_web_search(),
            "Initialized agent set"
        );
        self.cache.insert(credential.clone(), agents.clone());
        Ok(agents)
    }

    /// Drops the cached set for `credential`. Returns whether one was cached.
    pub fn invalidate(&mut self, credential: &Credential) -> bool {
        self.cache.remove(credential).is_some()
    }

    pub fn cached_sets(&self) -> usize {
        self.cache.len()
    }
}
