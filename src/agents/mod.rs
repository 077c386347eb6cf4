/// Recovery squad agents.
///
/// - `roles`: the four fixed roles (therapist, closure, routine planner, brutal honesty)
///   and the agent handle each one runs through
/// - `factory`: builds an [`AgentSet`] per credential and caches it until the key changes

pub mod factory;
pub mod roles;

pub use factory::{AgentFactory, AgentSet};
pub use roles::{Role, RoleAgent};
