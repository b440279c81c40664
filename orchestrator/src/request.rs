//! Cluster request documents and their validation
//!
//! A [`ClusterDocument`] is what the operator wrote, with every field
//! tolerated so that semantic problems surface from validation rather than
//! from the deserializer. Validating a document converts it into a
//! [`ClusterRequest`], whose provider section is a sum type.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result, ValidationError};
use crate::topology::{BaremetalSpec, MultipassSpec};

// ============================================================================
// Discriminants
// ============================================================================

/// The `kind` field of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    CreateCluster,
    AddNode,
    DeleteCluster,
    Other(String),
}

impl Default for OperationKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for OperationKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "CreateCluster" => Self::CreateCluster,
            "AddNode" => Self::AddNode,
            "DeleteCluster" => Self::DeleteCluster,
            _ => Self::Other(kind),
        }
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateCluster => write!(f, "CreateCluster"),
            Self::AddNode => write!(f, "AddNode"),
            Self::DeleteCluster => write!(f, "DeleteCluster"),
            Self::Other(kind) => write!(f, "{}", kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Multipass,
    Baremetal,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multipass => write!(f, "multipass"),
            Self::Baremetal => write!(f, "baremetal"),
        }
    }
}

// ============================================================================
// Raw Document
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingDocument {
    #[serde(default)]
    pub plugin: String,
    #[serde(default)]
    pub pod_cidr: String,
    #[serde(default)]
    pub service_cidr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDocument {
    #[serde(default)]
    pub kind: OperationKind,
    #[serde(default)]
    pub provider: Option<Provider>,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub multipass: Option<MultipassSpec>,
    #[serde(default)]
    pub baremetal: Option<BaremetalSpec>,
    #[serde(default)]
    pub networking: Option<NetworkingDocument>,
}

impl ClusterDocument {
    /// Deserialize a YAML or JSON document
    pub fn parse(raw: &[u8]) -> Result<Self> {
        serde_yaml::from_slice(raw).map_err(|e| {
            debug!("cluster document did not deserialize: {}", e);
            Error::MalformedConfiguration
        })
    }

    /// Check the document for an operation of kind `expected`.
    ///
    /// Rules run in a fixed order and the first failure is returned.
    pub fn validate(
        &self,
        expected: OperationKind,
    ) -> std::result::Result<ClusterRequest, ValidationError> {
        if self.cluster_name.is_empty() {
            return Err(ValidationError::EmptyClusterName);
        }

        if self.kind != expected {
            return Err(ValidationError::KindMismatch {
                expected,
                found: self.kind.clone(),
            });
        }

        let provider = match self.provider {
            None => return Err(ValidationError::MissingProvider),
            Some(Provider::Multipass) => self
                .multipass
                .clone()
                .map(ProviderSpec::Multipass)
                .ok_or(ValidationError::MissingProviderSpec(Provider::Multipass))?,
            Some(Provider::Baremetal) => self
                .baremetal
                .clone()
                .map(ProviderSpec::Baremetal)
                .ok_or(ValidationError::MissingProviderSpec(Provider::Baremetal))?,
        };

        let networking = self
            .networking
            .as_ref()
            .ok_or(ValidationError::MissingNetworking)?;

        Ok(ClusterRequest {
            cluster_name: self.cluster_name.clone(),
            provider,
            networking: NetworkingSpec {
                plugin: networking.plugin.clone(),
                cidrs: networking.cidrs()?,
            },
        })
    }
}

impl NetworkingDocument {
    fn cidrs(&self) -> std::result::Result<Option<CidrPair>, ValidationError> {
        match (self.pod_cidr.is_empty(), self.service_cidr.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => {
                let pod = parse_cidr("podCidr", &self.pod_cidr)?;
                let service = parse_cidr("serviceCidr", &self.service_cidr)?;

                if pod.contains(&service) || service.contains(&pod) {
                    return Err(ValidationError::OverlappingCidrs {
                        pod: self.pod_cidr.clone(),
                        service: self.service_cidr.clone(),
                    });
                }

                Ok(Some(CidrPair { pod, service }))
            }
            _ => Err(ValidationError::CidrPairing),
        }
    }
}

fn parse_cidr(field: &'static str, value: &str) -> std::result::Result<IpNet, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidCidr {
        field,
        value: value.to_string(),
    })
}

// ============================================================================
// Validated Request
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSpec {
    Multipass(MultipassSpec),
    Baremetal(BaremetalSpec),
}

impl ProviderSpec {
    pub fn provider(&self) -> Provider {
        match self {
            Self::Multipass(_) => Provider::Multipass,
            Self::Baremetal(_) => Provider::Baremetal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrPair {
    pub pod: IpNet,
    pub service: IpNet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkingSpec {
    /// As written; blank selects the default plugin
    pub plugin: String,
    pub cidrs: Option<CidrPair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRequest {
    pub cluster_name: String,
    pub provider: ProviderSpec,
    pub networking: NetworkingSpec,
}
