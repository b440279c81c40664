//! Cluster operations
//!
//! Every operation goes through the same lifecycle: it is parsed from the
//! raw document, validated, then run. [`parse_operation`] picks the concrete
//! operation from the document's `kind`, after which callers only deal with
//! `dyn ClusterOperation`.

mod create_cluster;

pub use create_cluster::CreateCluster;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::credentials::CredentialStore;
use crate::engine::BootstrapEngine;
use crate::error::{Error, Result};
use crate::request::OperationKind;

/// Collaborators an operation needs while running
#[derive(Clone)]
pub struct OperationContext {
    pub engine: Arc<dyn BootstrapEngine>,
    pub credentials: CredentialStore,
    /// Checked once, right before the bootstrap engine is invoked
    pub cancel: CancellationToken,
}

impl OperationContext {
    pub fn new(engine: Arc<dyn BootstrapEngine>, credentials: CredentialStore) -> Self {
        Self {
            engine,
            credentials,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
pub trait ClusterOperation: fmt::Debug + Send + Sync {
    fn kind(&self) -> OperationKind;

    /// Pure and idempotent; returns the first rule that fails
    fn validate(&self) -> Result<()>;

    /// What `run` would hand to the bootstrap engine, as pretty JSON
    fn plan(&self, verbose: bool) -> Result<String>;

    /// Refuses to act on a document that does not validate
    async fn run(&self, ctx: &OperationContext, verbose: bool) -> Result<()>;
}

type Constructor = fn(&[u8]) -> Result<Box<dyn ClusterOperation>>;

static OPERATIONS: &[(OperationKind, Constructor)] =
    &[(OperationKind::CreateCluster, CreateCluster::parse_boxed)];

#[derive(Deserialize)]
struct KindProbe {
    #[serde(default)]
    kind: OperationKind,
}

/// Parse a document into the operation its `kind` names
pub fn parse_operation(raw: &[u8]) -> Result<Box<dyn ClusterOperation>> {
    let probe: KindProbe = serde_yaml::from_slice(raw).map_err(|e| {
        debug!("could not read operation kind: {}", e);
        Error::MalformedConfiguration
    })?;

    let (_, construct) = OPERATIONS
        .iter()
        .find(|(kind, _)| *kind == probe.kind)
        .ok_or(Error::UnsupportedKind(probe.kind))?;

    construct(raw)
}
