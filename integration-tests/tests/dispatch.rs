use kubeforge_orchestrator::{
    parse_operation, ClusterOperation, CreateCluster, Error, OperationKind, ValidationError,
};

use crate::common::MULTIPASS_DEV;

#[test]
fn test_dispatch_by_kind() {
    let op = parse_operation(MULTIPASS_DEV.as_bytes()).unwrap();
    assert_eq!(op.kind(), OperationKind::CreateCluster);

    let raw = MULTIPASS_DEV.replace("kind: CreateCluster", "kind: AddNode");
    let err = parse_operation(raw.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedKind(OperationKind::AddNode)));
}

#[test]
fn test_create_cluster_rejects_other_kinds() {
    let raw = MULTIPASS_DEV.replace("kind: CreateCluster", "kind: AddNode");
    let op = CreateCluster::parse(raw.as_bytes()).unwrap();

    match op.validate() {
        Err(Error::Validation(ValidationError::KindMismatch { expected, found })) => {
            assert_eq!(expected, OperationKind::CreateCluster);
            assert_eq!(found, OperationKind::AddNode);
        }
        other => panic!("expected a kind mismatch, got {:?}", other),
    }
}

#[test]
fn test_malformed_document_is_not_diagnosed() {
    let err = parse_operation(b"kind: CreateCluster\nmultipass: {masters: lots}\n").unwrap_err();
    assert!(matches!(err, Error::MalformedConfiguration));
    assert_eq!(err.to_string(), "error while parsing cluster configuration");
}

#[test]
fn test_plan_without_engine() {
    let op = parse_operation(MULTIPASS_DEV.as_bytes()).unwrap();
    let plan: serde_json::Value = serde_json::from_str(&op.plan(false).unwrap()).unwrap();

    assert_eq!(plan["cluster_name"], "dev");
    assert_eq!(plan["worker_nodes"][1]["name"], "dev-worker-2");
}
