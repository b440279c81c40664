use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;
use crate::request::{OperationKind, Provider};
use crate::topology::TopologyError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by every stage of a cluster operation
#[derive(Debug, Error)]
pub enum Error {
    /// The document could not be deserialized into the expected shape
    #[error("error while parsing cluster configuration")]
    MalformedConfiguration,

    #[error("invalid cluster configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("network plugin not found: {0:?}")]
    PluginNotFound(String),

    #[error("topology resolution failed: {0}")]
    Topology(#[from] TopologyError),

    #[error("bootstrap engine failed: {0}")]
    Bootstrap(#[from] EngineError),

    /// The cluster exists, only its credentials are missing
    #[error(
        "cluster {cluster} was created but its kubeconfig could not be written to {}: {source}; \
         fetch the credentials from the bootstrap engine manually",
        .path.display()
    )]
    Persistence {
        cluster: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported operation kind: \"{0}\"")]
    UnsupportedKind(OperationKind),

    #[error("operation cancelled before the bootstrap engine was invoked")]
    Cancelled,
}

/// Validation failures, in the order the rules are checked
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cluster name is empty")]
    EmptyClusterName,

    #[error("kind must be {expected}, got {found:?}")]
    KindMismatch {
        expected: OperationKind,
        found: OperationKind,
    },

    #[error("provider is not set")]
    MissingProvider,

    #[error("provider {0} requires a `{0}` section")]
    MissingProviderSpec(Provider),

    #[error("networking section is missing")]
    MissingNetworking,

    #[error("podCidr and serviceCidr must either both be set or both be empty")]
    CidrPairing,

    #[error("{field} {value:?} is not a valid CIDR")]
    InvalidCidr { field: &'static str, value: String },

    #[error("podCidr {pod} overlaps serviceCidr {service}")]
    OverlappingCidrs { pod: String, service: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_mentions_created_cluster() {
        let err = Error::Persistence {
            cluster: "dev".to_string(),
            path: PathBuf::from("/home/op/.kubeconfig_dev"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cluster dev was created"));
        assert!(msg.contains("/home/op/.kubeconfig_dev"));
        assert!(msg.contains("manually"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: Error = ValidationError::CidrPairing.into();
        assert!(matches!(err, Error::Validation(ValidationError::CidrPairing)));
        assert!(err.to_string().starts_with("invalid cluster configuration"));
    }

    #[test]
    fn test_plugin_not_found_names_plugin() {
        let err = Error::PluginNotFound("nonexistent".to_string());
        assert_eq!(err.to_string(), "network plugin not found: \"nonexistent\"");
    }
}
