use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::{ResolvedTopology, TopologyError, TopologyStrategy};
use crate::types::{HostAccess, Node, NodeRole, NodeTarget};

/// Explicit inventory of reachable machines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaremetalSpec {
    /// SSH user for hosts that do not set their own
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub private_key: Option<PathBuf>,
    #[serde(default)]
    pub hosts: Vec<HostDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDeclaration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: String,
    pub role: NodeRole,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub private_key: Option<PathBuf>,
}

fn default_user() -> String {
    "root".to_string()
}

fn default_port() -> u16 {
    22
}

impl Default for BaremetalSpec {
    fn default() -> Self {
        Self {
            user: default_user(),
            port: default_port(),
            private_key: None,
            hosts: Vec::new(),
        }
    }
}

impl BaremetalSpec {
    fn node(&self, host: &HostDeclaration) -> Node {
        let address = host.address.trim().to_string();
        Node {
            name: host.name.clone().unwrap_or_else(|| address.clone()),
            role: host.role,
            target: NodeTarget::Physical(HostAccess {
                address,
                user: host.user.clone().unwrap_or_else(|| self.user.clone()),
                port: host.port.unwrap_or(self.port),
                private_key: host.private_key.clone().or_else(|| self.private_key.clone()),
            }),
        }
    }
}

impl TopologyStrategy for BaremetalSpec {
    fn resolve(&self, _cluster_name: &str) -> Result<ResolvedTopology, TopologyError> {
        let mut seen = HashSet::new();
        for (i, host) in self.hosts.iter().enumerate() {
            let address = host.address.trim();
            if address.is_empty() {
                return Err(TopologyError::EmptyAddress(i + 1));
            }
            if !seen.insert(address) {
                return Err(TopologyError::DuplicateAddress(address.to_string()));
            }
        }

        let with_role = |role: NodeRole| -> Vec<Node> {
            self.hosts
                .iter()
                .filter(|h| h.role == role)
                .map(|h| self.node(h))
                .collect()
        };

        let masters = with_role(NodeRole::Master);
        let workers = with_role(NodeRole::Worker);
        let mut balancers = with_role(NodeRole::LoadBalancer);

        if masters.is_empty() {
            return Err(TopologyError::NoMasters);
        }
        if balancers.len() > 1 {
            return Err(TopologyError::MultipleLoadBalancers(balancers.len()));
        }

        let ha_proxy = balancers.pop();
        if masters.len() > 1 && ha_proxy.is_none() {
            return Err(TopologyError::MissingLoadBalancer {
                masters: masters.len(),
            });
        }

        Ok(ResolvedTopology {
            masters,
            workers,
            ha_proxy,
        })
    }
}
