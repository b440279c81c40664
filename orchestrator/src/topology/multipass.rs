use serde::{Deserialize, Serialize};

use super::{ResolvedTopology, TopologyError, TopologyStrategy};
use crate::types::{Node, NodeRole, NodeTarget, VmResources};

/// Upper bound on VMs a single Multipass host is asked to launch
pub const MAX_VIRTUAL_NODES: u64 = 256;

/// VM counts and sizing for a Multipass-backed cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipassSpec {
    #[serde(default = "default_masters", alias = "masterCount")]
    pub masters: u32,
    #[serde(default, alias = "workerCount")]
    pub workers: u32,
    #[serde(default = "default_cpus")]
    pub cpus: u32,
    #[serde(default = "default_memory")]
    pub memory: String,
    #[serde(default = "default_disk")]
    pub disk: String,
    #[serde(default = "default_image")]
    pub image: String,
}

fn default_masters() -> u32 {
    1
}

fn default_cpus() -> u32 {
    2
}

fn default_memory() -> String {
    "2G".to_string()
}

fn default_disk() -> String {
    "10G".to_string()
}

fn default_image() -> String {
    "22.04".to_string()
}

impl Default for MultipassSpec {
    fn default() -> Self {
        Self {
            masters: default_masters(),
            workers: 0,
            cpus: default_cpus(),
            memory: default_memory(),
            disk: default_disk(),
            image: default_image(),
        }
    }
}

impl MultipassSpec {
    fn resources(&self) -> VmResources {
        VmResources {
            cpus: self.cpus,
            memory: self.memory.clone(),
            disk: self.disk.clone(),
            image: self.image.clone(),
        }
    }

    fn vm(&self, name: String, role: NodeRole) -> Node {
        Node {
            name,
            role,
            target: NodeTarget::Virtual(self.resources()),
        }
    }
}

/// No VMs exist yet: the nodes describe what the bootstrap engine will launch
impl TopologyStrategy for MultipassSpec {
    fn resolve(&self, cluster_name: &str) -> Result<ResolvedTopology, TopologyError> {
        if self.masters == 0 {
            return Err(TopologyError::NoMasters);
        }
        let requested = u64::from(self.masters) + u64::from(self.workers);
        if requested > MAX_VIRTUAL_NODES {
            return Err(TopologyError::TooManyNodes {
                requested,
                max: MAX_VIRTUAL_NODES,
            });
        }

        let masters: Vec<Node> = (1..=self.masters)
            .map(|i| self.vm(format!("{}-master-{}", cluster_name, i), NodeRole::Master))
            .collect();

        let workers = (1..=self.workers)
            .map(|i| self.vm(format!("{}-worker-{}", cluster_name, i), NodeRole::Worker))
            .collect();

        let ha_proxy = (masters.len() > 1)
            .then(|| self.vm(format!("{}-haproxy", cluster_name), NodeRole::LoadBalancer));

        Ok(ResolvedTopology {
            masters,
            workers,
            ha_proxy,
        })
    }
}
