use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::networking::NetworkingPlugin;

// ============================================================================
// Node Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Master,
    Worker,
    #[serde(rename = "loadbalancer", alias = "haproxy")]
    LoadBalancer,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Worker => write!(f, "worker"),
            Self::LoadBalancer => write!(f, "loadbalancer"),
        }
    }
}

/// Sizing of a VM the bootstrap engine has yet to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmResources {
    pub cpus: u32,
    pub memory: String,
    pub disk: String,
    pub image: String,
}

/// SSH coordinates of an existing machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAccess {
    pub address: String,
    pub user: String,
    pub port: u16,
    pub private_key: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeTarget {
    Virtual(VmResources),
    Physical(HostAccess),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub role: NodeRole,
    pub target: NodeTarget,
}

impl Node {
    pub fn address(&self) -> Option<&str> {
        match &self.target {
            NodeTarget::Physical(access) => Some(&access.address),
            NodeTarget::Virtual(_) => None,
        }
    }
}

// ============================================================================
// Bootstrap Plan
// ============================================================================

/// Everything the bootstrap engine needs to stand up one cluster
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapPlan {
    pub cluster_name: String,
    pub ha_proxy_node: Option<Node>,
    pub master_nodes: Vec<Node>,
    pub worker_nodes: Vec<Node>,
    pub verbose: bool,
    pub networking: &'static NetworkingPlugin,
    pub pod_cidr: Option<IpNet>,
    pub service_cidr: Option<IpNet>,
}
