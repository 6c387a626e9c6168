//! Docker Compose configuration types
//!
//! These types only describe what the converter writes. Field order is the
//! order keys appear in the emitted file, and empty values are skipped so
//! that no `environment: {}` or `privileged: false` ever shows up.

use crate::error::{ConvertError, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// Default restart policy; unRAID templates do not carry one
pub const DEFAULT_RESTART_POLICY: &str = "unless-stopped";

/// Default compose file version
pub const DEFAULT_COMPOSE_VERSION: &str = "3.8";

/// Conversion options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Top-level `version` key; `None` leaves it out
    pub compose_version: Option<String>,
    /// Restart policy for every converted service
    pub restart: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            compose_version: Some(DEFAULT_COMPOSE_VERSION.to_string()),
            restart: DEFAULT_RESTART_POLICY.to_string(),
        }
    }
}

/// Network mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Host,
    Bridge,
    None,
}

impl NetworkMode {
    /// Match a template `Network` value, ignoring case
    pub fn from_template(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "host" => Some(NetworkMode::Host),
            "bridge" => Some(NetworkMode::Bridge),
            "none" => Some(NetworkMode::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkMode::Host => write!(f, "host"),
            NetworkMode::Bridge => write!(f, "bridge"),
            NetworkMode::None => write!(f, "none"),
        }
    }
}

/// How a service is attached to the network; mode and named networks
/// never appear together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ServiceNetwork {
    #[serde(rename = "network_mode")]
    Mode(NetworkMode),
    #[serde(rename = "networks")]
    Networks(Vec<String>),
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    /// Image name
    pub image: String,
    /// Container name
    pub container_name: String,
    /// Restart policy
    pub restart: String,
    /// Environment variables
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub environment: IndexMap<String, String>,
    /// Volume mounts, `host:container[:ro]`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Port mappings, `host:container/protocol`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Privileged mode
    #[serde(skip_serializing_if = "is_false")]
    pub privileged: bool,
    /// Network mode or external networks
    #[serde(flatten)]
    pub network: Option<ServiceNetwork>,
    /// CPU set, always top level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpuset: Option<String>,
    /// Deploy configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeployConfig>,
    /// CPU shares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<u64>,
    /// Labels
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<String, String>,
}

impl ServiceRecord {
    /// Create a service with only the required fields set
    pub fn new(container_name: &str, image: &str, restart: &str) -> Self {
        Self {
            image: image.to_string(),
            container_name: container_name.to_string(),
            restart: restart.to_string(),
            environment: IndexMap::new(),
            volumes: Vec::new(),
            ports: Vec::new(),
            privileged: false,
            network: None,
            cpuset: None,
            deploy: None,
            cpu_shares: None,
            labels: IndexMap::new(),
        }
    }

    /// External networks this service references
    pub fn external_networks(&self) -> &[String] {
        match &self.network {
            Some(ServiceNetwork::Networks(networks)) => networks,
            _ => &[],
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Deploy configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeployConfig {
    /// Resource limits
    pub resources: ResourcesConfig,
}

/// Resources configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourcesConfig {
    /// Resource limits
    pub limits: ResourceSpec,
}

/// Resource specification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceSpec {
    /// CPU limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<String>,
    /// Memory limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// Top-level network entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    /// Network is created outside this file
    pub external: bool,
}

/// Docker Compose file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeDocument {
    /// Compose file version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Services
    pub services: IndexMap<String, ServiceRecord>,
    /// Networks
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub networks: IndexMap<String, NetworkConfig>,
}

impl ComposeDocument {
    /// Create an empty document
    pub fn new(options: &ConvertOptions) -> Self {
        Self {
            version: options.compose_version.clone(),
            services: IndexMap::new(),
            networks: IndexMap::new(),
        }
    }

    /// Create a document holding a single service
    pub fn single(
        name: &str,
        service: ServiceRecord,
        networks: &[String],
        options: &ConvertOptions,
    ) -> Self {
        let mut document = Self::new(options);
        document.services.insert(name.to_string(), service);
        for network in networks {
            document.declare_external(network);
        }
        document
    }

    /// Add a service and declare the networks it references
    pub fn add_service(
        &mut self,
        name: &str,
        service: ServiceRecord,
        networks: &[String],
    ) -> Result<()> {
        if self.services.contains_key(name) {
            return Err(ConvertError::DuplicateService(name.to_string()));
        }
        self.services.insert(name.to_string(), service);
        for network in networks {
            self.declare_external(network);
        }
        Ok(())
    }

    fn declare_external(&mut self, network: &str) {
        self.networks
            .entry(network.to_string())
            .or_insert(NetworkConfig { external: true });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_mode_from_template() {
        assert_eq!(NetworkMode::from_template("HOST"), Some(NetworkMode::Host));
        assert_eq!(NetworkMode::from_template("bridge"), Some(NetworkMode::Bridge));
        assert_eq!(NetworkMode::from_template("None"), Some(NetworkMode::None));
        assert_eq!(NetworkMode::from_template("br0"), None);
    }

    #[test]
    fn test_minimal_service_omits_empty_fields() {
        let service = ServiceRecord::new("web", "nginx", DEFAULT_RESTART_POLICY);
        let value = serde_yaml::to_value(&service).unwrap();
        let mapping = value.as_mapping().unwrap();

        let keys: Vec<&str> = mapping.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["image", "container_name", "restart"]);
    }

    #[test]
    fn test_network_serializes_as_flat_key() {
        let mut service = ServiceRecord::new("web", "nginx", DEFAULT_RESTART_POLICY);
        service.network = Some(ServiceNetwork::Mode(NetworkMode::Host));
        let value = serde_yaml::to_value(&service).unwrap();
        assert_eq!(value["network_mode"].as_str(), Some("host"));
        assert!(value.get("networks").is_none());

        service.network = Some(ServiceNetwork::Networks(vec!["proxy".to_string()]));
        let value = serde_yaml::to_value(&service).unwrap();
        assert_eq!(value["networks"][0].as_str(), Some("proxy"));
        assert!(value.get("network_mode").is_none());
    }

    #[test]
    fn test_add_service_rejects_duplicates() {
        let mut document = ComposeDocument::new(&ConvertOptions::default());
        let service = ServiceRecord::new("web", "nginx", DEFAULT_RESTART_POLICY);
        document
            .add_service("web", service.clone(), &["proxy".to_string()])
            .unwrap();

        let result = document.add_service("web", service, &[]);
        assert!(matches!(result, Err(ConvertError::DuplicateService(_))));
        assert_eq!(document.networks.len(), 1);
    }

    #[test]
    fn test_networks_are_deduplicated_in_order() {
        let mut document = ComposeDocument::new(&ConvertOptions::default());
        let a = ServiceRecord::new("a", "img", DEFAULT_RESTART_POLICY);
        let b = ServiceRecord::new("b", "img", DEFAULT_RESTART_POLICY);
        document
            .add_service("a", a, &["proxy".to_string(), "db".to_string()])
            .unwrap();
        document.add_service("b", b, &["proxy".to_string()]).unwrap();

        let names: Vec<&String> = document.networks.keys().collect();
        assert_eq!(names, vec!["proxy", "db"]);
    }
}
