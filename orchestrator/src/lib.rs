//! Declarative cluster provisioning
//!
//! A cluster document is parsed, validated, resolved into a node topology
//! and a networking plugin, and handed to an external bootstrap engine.
//! The resulting kubeconfig is written next to the operator's home.

pub mod credentials;
pub mod engine;
pub mod error;
pub mod networking;
pub mod operation;
pub mod request;
pub mod topology;
pub mod types;

pub use credentials::CredentialStore;
pub use engine::{BootstrapEngine, EngineError, HttpBootstrapEngine};
pub use error::{Error, Result, ValidationError};
pub use operation::{parse_operation, ClusterOperation, CreateCluster, OperationContext};
pub use request::{ClusterDocument, ClusterRequest, OperationKind, Provider};
pub use topology::{ResolvedTopology, TopologyError};
pub use types::{BootstrapPlan, Node, NodeRole};
