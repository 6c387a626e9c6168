//! unRAID template parser
//!
//! Maps a [`TemplateDescriptor`] onto a compose [`ServiceRecord`].

use super::descriptor::{ConfigEntry, ConfigKind, TemplateDescriptor};
use super::limits::ResourceLimits;
use crate::compose::config::{
    ConvertOptions, DeployConfig, NetworkMode, ResourceSpec, ResourcesConfig, ServiceNetwork,
    ServiceRecord,
};
use crate::error::{ConvertError, Result};
use std::path::Path;
use tracing::debug;

/// Result of parsing one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// Container name, used as the service key
    pub name: String,
    /// Service definition
    pub service: ServiceRecord,
    /// External networks the service joins
    pub networks: Vec<String>,
}

/// unRAID template parser
#[derive(Debug, Clone, Default)]
pub struct TemplateParser {
    options: ConvertOptions,
}

impl TemplateParser {
    /// Create a parser with the given options
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Parse a template file from path
    pub fn parse_file(&self, path: &Path) -> Result<ParsedTemplate> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content)
    }

    /// Parse a template from XML text
    pub fn parse(&self, xml: &str) -> Result<ParsedTemplate> {
        let descriptor = TemplateDescriptor::from_xml(xml)?;
        self.convert_descriptor(descriptor)
    }

    /// Build the service for an already-read descriptor
    pub fn convert_descriptor(&self, descriptor: TemplateDescriptor) -> Result<ParsedTemplate> {
        let name = required(descriptor.name.as_deref())
            .ok_or(ConvertError::MissingRequiredField("Container name"))?;
        let image = required(descriptor.repository.as_deref())
            .ok_or(ConvertError::MissingRequiredField("Repository (image)"))?;

        let mut service = ServiceRecord::new(name, image, &self.options.restart);

        for config in &descriptor.configs {
            apply_config(&mut service, config);
        }

        service.privileged = descriptor
            .privileged
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case("true"));

        let mut networks = Vec::new();
        if let Some(network) = descriptor.network.as_deref().map(str::trim) {
            if let Some(mode) = NetworkMode::from_template(network) {
                service.network = Some(ServiceNetwork::Mode(mode));
            } else if !network.is_empty() {
                networks.push(network.to_string());
                service.network = Some(ServiceNetwork::Networks(networks.clone()));
            }
        }

        let limits = ResourceLimits::parse(
            descriptor.extra_params.as_deref().unwrap_or_default(),
            descriptor.cpuset.as_deref(),
        );
        apply_limits(&mut service, limits);

        for (key, value) in [
            ("unraid.webui", &descriptor.webui),
            ("unraid.support", &descriptor.support),
            ("unraid.project", &descriptor.project),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                service.labels.insert(key.to_string(), value.to_string());
            }
        }

        tracing::info!("Converted template {} ({})", name, image);

        Ok(ParsedTemplate {
            name: name.to_string(),
            service,
            networks,
        })
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn apply_config(service: &mut ServiceRecord, config: &ConfigEntry) {
    let (Some(kind), Some(target), Some(value)) = (&config.kind, &config.target, &config.value)
    else {
        debug!("Skipping incomplete Config entry: {:?}", config);
        return;
    };
    let mode = config.mode.as_deref().unwrap_or_default();

    match kind {
        ConfigKind::Variable => {
            service.environment.insert(target.clone(), value.clone());
        }
        ConfigKind::Path => {
            if mode.contains("ro") {
                service.volumes.push(format!("{}:{}:ro", value, target));
            } else {
                service.volumes.push(format!("{}:{}", value, target));
            }
        }
        ConfigKind::Port => {
            let protocol = if mode.contains("udp") && !mode.contains("tcp") {
                "udp"
            } else {
                "tcp"
            };
            service
                .ports
                .push(format!("{}:{}/{}", value, target, protocol));
        }
        ConfigKind::Other(other) => {
            debug!("Skipping Config entry {} of type {}", target, other);
        }
    }
}

/// cpu and memory limits go under `deploy.resources.limits`; cpuset stays
/// top level whether or not a deploy block exists.
fn apply_limits(service: &mut ServiceRecord, limits: ResourceLimits) {
    if limits.has_deploy_limits() {
        service.deploy = Some(DeployConfig {
            resources: ResourcesConfig {
                limits: ResourceSpec {
                    cpus: limits.cpus,
                    memory: limits.memory,
                },
            },
        });
    }
    service.cpuset = limits.cpuset;
    service.cpu_shares = limits.cpu_shares;
}
