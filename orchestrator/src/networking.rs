use serde::Serialize;

/// Reserved registry key resolving to the plugin used when none is requested
pub const DEFAULT_PLUGIN_KEY: &str = "default";

/// A CNI plugin the bootstrap engine knows how to install
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct NetworkingPlugin {
    pub name: &'static str,
    pub manifest: &'static str,
    pub default_pod_cidr: &'static str,
}

const FLANNEL: NetworkingPlugin = NetworkingPlugin {
    name: "flannel",
    manifest: "https://github.com/flannel-io/flannel/releases/latest/download/kube-flannel.yml",
    default_pod_cidr: "10.244.0.0/16",
};

const CALICO: NetworkingPlugin = NetworkingPlugin {
    name: "calico",
    manifest: "https://raw.githubusercontent.com/projectcalico/calico/v3.27.0/manifests/calico.yaml",
    default_pod_cidr: "192.168.0.0/16",
};

const CANAL: NetworkingPlugin = NetworkingPlugin {
    name: "canal",
    manifest: "https://raw.githubusercontent.com/projectcalico/calico/v3.27.0/manifests/canal.yaml",
    default_pod_cidr: "10.244.0.0/16",
};

const WEAVE: NetworkingPlugin = NetworkingPlugin {
    name: "weave",
    manifest: "https://github.com/weaveworks/weave/releases/download/v2.8.1/weave-daemonset-k8s.yaml",
    default_pod_cidr: "10.32.0.0/12",
};

/// Keyed plugin table; `"default"` aliases flannel
static REGISTRY: &[(&str, NetworkingPlugin)] = &[
    (DEFAULT_PLUGIN_KEY, FLANNEL),
    ("flannel", FLANNEL),
    ("calico", CALICO),
    ("canal", CANAL),
    ("weave", WEAVE),
];

/// Exact, case-sensitive lookup
pub fn lookup(name: &str) -> Option<&'static NetworkingPlugin> {
    REGISTRY
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, plugin)| plugin)
}

/// Resolve a requested plugin name, falling back to the default when blank
pub fn resolve(requested: &str) -> Option<&'static NetworkingPlugin> {
    match requested.trim() {
        "" => Some(default_plugin()),
        name => lookup(name),
    }
}

pub fn default_plugin() -> &'static NetworkingPlugin {
    match lookup(DEFAULT_PLUGIN_KEY) {
        Some(plugin) => plugin,
        None => unreachable!("registry always carries a default entry"),
    }
}

/// Canonical plugins, without the default alias
pub fn plugins() -> impl Iterator<Item = &'static NetworkingPlugin> {
    REGISTRY
        .iter()
        .filter(|(key, _)| *key != DEFAULT_PLUGIN_KEY)
        .map(|(_, plugin)| plugin)
}
