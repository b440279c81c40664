//! Contract with the external cluster bootstrap engine
//!
//! The engine does the actual work (certificates, control-plane init, node
//! join) and issues the kubeconfig. This layer never interprets or retries
//! its failures.

mod http;

pub use http::{ErrorResponse, HttpBootstrapEngine};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::BootstrapPlan;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("request to bootstrap engine failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bootstrap engine returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait BootstrapEngine: Send + Sync {
    /// Provision the whole cluster. May take a long time; no timeout applies.
    async fn create_cluster(&self, plan: &BootstrapPlan) -> Result<(), EngineError>;

    /// Fetch the admin kubeconfig of a cluster this engine created
    async fn kubeconfig(&self, cluster_name: &str) -> Result<String, EngineError>;
}
