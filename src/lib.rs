pub mod agents;
pub mod cli;
pub mod config;
pub mod credential;
pub mod doctor;
pub mod error;
pub mod keys;
pub mod media;
pub mod model;
pub mod orchestrator;
pub mod recovery;
pub mod render;
pub mod request;
pub mod session;
pub mod telemetry;
