use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use kubeforge_orchestrator::{CredentialStore, HttpBootstrapEngine, OperationContext};

/// Behaviour knobs and recorded requests of the fake engine
#[derive(Clone, Default)]
pub struct EngineState {
    /// Plans received on POST /api/clusters, as raw JSON
    pub created: Arc<Mutex<Vec<Value>>>,
    /// When set, provisioning fails with this message
    pub fail_create: Option<String>,
    /// Number of kubeconfig requests answered with 503 before succeeding
    pub kubeconfig_failures: Arc<AtomicU32>,
}

impl EngineState {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_create: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn flaky_kubeconfig(failures: u32) -> Self {
        Self {
            kubeconfig_failures: Arc::new(AtomicU32::new(failures)),
            ..Default::default()
        }
    }

    pub fn plans(&self) -> Vec<Value> {
        self.created.lock().unwrap().clone()
    }
}

/// A bootstrap engine API served in-process on an ephemeral port
pub struct FakeEngine {
    pub state: EngineState,
    url: String,
    server: JoinHandle<()>,
}

impl FakeEngine {
    pub async fn start(state: EngineState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake engine");
        let addr = listener.local_addr().unwrap();

        let app = Router::new()
            .route("/api/clusters", post(create_cluster))
            .route("/api/clusters/:name/kubeconfig", get(kubeconfig))
            .with_state(state.clone());

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake engine failed");
        });

        Self {
            state,
            url: format!("http://{}", addr),
            server,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Operation context pointing at this engine, writing credentials into `dir`
    pub fn context(&self, dir: &TempDir, retries: u32) -> OperationContext {
        let engine = HttpBootstrapEngine::new(&self.url, retries).expect("Failed to build engine client");
        OperationContext::new(Arc::new(engine), CredentialStore::new(dir.path()))
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn create_cluster(
    State(state): State<EngineState>,
    Json(plan): Json<Value>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    if let Some(message) = &state.fail_create {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message, "error_code": "BOOTSTRAP_FAILED" })),
        ));
    }

    state.created.lock().unwrap().push(plan);
    Ok(StatusCode::CREATED)
}

async fn kubeconfig(
    State(state): State<EngineState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let pending = state
        .kubeconfig_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    if pending.is_ok() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let known = state
        .created
        .lock()
        .unwrap()
        .iter()
        .any(|plan| plan["cluster_name"] == name.as_str());
    if !known {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(json!({
        "kubeconfig": format!("apiVersion: v1\nkind: Config\ncurrent-context: {}\n", name)
    })))
}

pub const MULTIPASS_DEV: &str = r#"
kind: CreateCluster
provider: multipass
clusterName: dev
multipass:
  masters: 1
  workers: 2
networking: {}
"#;

pub const BAREMETAL_HA: &str = r#"
kind: CreateCluster
provider: baremetal
clusterName: prod
baremetal:
  user: ubuntu
  privateKey: /keys/id_ed25519
  hosts:
    - { name: cp-b, address: 10.0.0.12, role: master }
    - { name: lb, address: 10.0.0.100, role: loadbalancer }
    - { name: cp-a, address: 10.0.0.11, role: master }
    - { name: w-1, address: 10.0.0.21, role: worker }
    - { name: cp-c, address: 10.0.0.13, role: master }
networking:
  plugin: calico
  podCidr: 192.168.0.0/16
  serviceCidr: 10.96.0.0/12
"#;
