use async_trait::async_trait;
use tracing::{info, warn};

use super::{ClusterOperation, OperationContext};
use crate::error::{Error, Result};
use crate::networking;
use crate::request::{ClusterDocument, ClusterRequest, OperationKind};
use crate::topology;
use crate::types::BootstrapPlan;

/// Stand up a new cluster and write its kubeconfig
#[derive(Debug, Clone)]
pub struct CreateCluster {
    document: ClusterDocument,
}

impl CreateCluster {
    pub fn parse(raw: &[u8]) -> Result<Self> {
        Ok(Self::from_document(ClusterDocument::parse(raw)?))
    }

    pub(super) fn parse_boxed(raw: &[u8]) -> Result<Box<dyn ClusterOperation>> {
        Ok(Box::new(Self::parse(raw)?))
    }

    pub fn from_document(document: ClusterDocument) -> Self {
        Self { document }
    }

    fn request(&self) -> Result<ClusterRequest> {
        Ok(self.document.validate(OperationKind::CreateCluster)?)
    }

    /// Validate, resolve the topology, then the networking plugin
    pub fn bootstrap_plan(&self, verbose: bool) -> Result<BootstrapPlan> {
        let request = self.request()?;
        info!("Provider found - {}", request.provider.provider());

        let topology = topology::resolve(&request)?;

        let networking = networking::resolve(&request.networking.plugin).ok_or_else(|| {
            Error::PluginNotFound(request.networking.plugin.trim().to_string())
        })?;

        let cidrs = request.networking.cidrs;

        Ok(BootstrapPlan {
            cluster_name: request.cluster_name,
            ha_proxy_node: topology.ha_proxy,
            master_nodes: topology.masters,
            worker_nodes: topology.workers,
            verbose,
            networking,
            pod_cidr: cidrs.map(|c| c.pod),
            service_cidr: cidrs.map(|c| c.service),
        })
    }
}

#[async_trait]
impl ClusterOperation for CreateCluster {
    fn kind(&self) -> OperationKind {
        OperationKind::CreateCluster
    }

    fn validate(&self) -> Result<()> {
        self.request().map(|_| ())
    }

    fn plan(&self, verbose: bool) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.bootstrap_plan(verbose)?)?)
    }

    async fn run(&self, ctx: &OperationContext, verbose: bool) -> Result<()> {
        let plan = self.bootstrap_plan(verbose)?;

        if ctx.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        info!(
            "Creating cluster {}: masters={}, workers={}, ha_proxy={}, networking={}",
            plan.cluster_name,
            plan.master_nodes.len(),
            plan.worker_nodes.len(),
            plan.ha_proxy_node
                .as_ref()
                .map(|n| n.name.as_str())
                .unwrap_or("none"),
            plan.networking.name
        );

        ctx.engine.create_cluster(&plan).await?;
        info!("Cluster {} created", plan.cluster_name);

        let kubeconfig = ctx.engine.kubeconfig(&plan.cluster_name).await?;

        let path = ctx
            .credentials
            .write(&plan.cluster_name, &kubeconfig)
            .map_err(|source| {
                let path = ctx.credentials.path_for(&plan.cluster_name);
                warn!(
                    "Cluster {} exists but its kubeconfig could not be written to {:?}: {}",
                    plan.cluster_name, path, source
                );
                Error::Persistence {
                    cluster: plan.cluster_name.clone(),
                    path,
                    source,
                }
            })?;

        info!("You can access the cluster now");
        println!();
        println!("KUBECONFIG={} kubectl get nodes", path.display());

        Ok(())
    }
}
