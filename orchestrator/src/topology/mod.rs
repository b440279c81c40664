//! Node topology resolution
//!
//! Turns a validated [`ClusterRequest`] into the ordered master and worker
//! sets plus the load-balancer node fronting the masters. Bootstrap is
//! order-sensitive (the first master initializes the control plane, the rest
//! join it), so every strategy preserves declaration order.

mod baremetal;
mod multipass;

pub use baremetal::{BaremetalSpec, HostDeclaration};
pub use multipass::MultipassSpec;

use serde::Serialize;
use thiserror::Error;

use crate::request::{ClusterRequest, ProviderSpec};
use crate::types::Node;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("no master nodes declared")]
    NoMasters,

    #[error("{masters} masters require a loadbalancer node")]
    MissingLoadBalancer { masters: usize },

    #[error("only one loadbalancer node is supported, found {0}")]
    MultipleLoadBalancers(usize),

    #[error("host #{0} has an empty address")]
    EmptyAddress(usize),

    #[error("host address {0} is declared more than once")]
    DuplicateAddress(String),

    #[error("{requested} virtual nodes requested, at most {max} are supported")]
    TooManyNodes { requested: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTopology {
    pub masters: Vec<Node>,
    pub workers: Vec<Node>,
    pub ha_proxy: Option<Node>,
}

/// Provider-specific way of deciding which hosts take which role
pub trait TopologyStrategy {
    fn resolve(&self, cluster_name: &str) -> Result<ResolvedTopology, TopologyError>;
}

/// Resolve the topology of a validated request
pub fn resolve(request: &ClusterRequest) -> Result<ResolvedTopology, TopologyError> {
    let strategy: &dyn TopologyStrategy = match &request.provider {
        ProviderSpec::Multipass(spec) => spec,
        ProviderSpec::Baremetal(spec) => spec,
    };

    let topology = strategy.resolve(&request.cluster_name)?;

    // Both strategies guarantee this; bootstrap cannot start without it
    if topology.masters.is_empty() {
        return Err(TopologyError::NoMasters);
    }

    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ClusterDocument, OperationKind};
    use crate::types::NodeRole;

    fn request(raw: &str) -> ClusterRequest {
        ClusterDocument::parse(raw.as_bytes())
            .unwrap()
            .validate(OperationKind::CreateCluster)
            .unwrap()
    }

    #[test]
    fn test_every_valid_provider_yields_a_master() {
        let multipass = request(
            "kind: CreateCluster\nprovider: multipass\nclusterName: a\nmultipass: {}\nnetworking: {}\n",
        );
        let baremetal = request(
            "kind: CreateCluster\nprovider: baremetal\nclusterName: b\nnetworking: {}\nbaremetal:\n  hosts:\n    - {address: 10.0.0.1, role: master}\n",
        );

        for req in [multipass, baremetal] {
            let topology = resolve(&req).unwrap();
            assert!(!topology.masters.is_empty());
            assert!(topology.masters.iter().all(|n| n.role == NodeRole::Master));
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let req = request(
            "kind: CreateCluster\nprovider: multipass\nclusterName: dev\nmultipass: {masters: 3, workers: 2}\nnetworking: {}\n",
        );
        assert_eq!(resolve(&req).unwrap(), resolve(&req).unwrap());
    }
}
