//! Uptime Kuma monitor descriptors
//!
//! Each descriptor expands into the `kuma.*` labels understood by
//! AutoKuma-style label watchers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON scalar that is written into a label as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl LabelValue {
    /// Falsy values (empty text, zero, `false`) drop optional labels
    pub fn is_truthy(&self) -> bool {
        match self {
            LabelValue::Text(s) => !s.is_empty(),
            LabelValue::Integer(i) => *i != 0,
            LabelValue::Float(f) => *f != 0.0,
            LabelValue::Bool(b) => *b,
        }
    }
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Text(s) => write!(f, "{}", s),
            LabelValue::Integer(i) => write!(f, "{}", i),
            LabelValue::Float(v) => write!(f, "{}", v),
            LabelValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for LabelValue {
    fn from(s: &str) -> Self {
        LabelValue::Text(s.to_string())
    }
}

impl From<i64> for LabelValue {
    fn from(i: i64) -> Self {
        LabelValue::Integer(i)
    }
}

/// Fields every non-group monitor carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorCommon {
    pub id: LabelValue,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<LabelValue>,
}

/// Check timing shared by all monitor types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorTiming {
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_interval", alias = "retryInterval")]
    pub retry_interval: u32,
    #[serde(default, alias = "maxRetries", alias = "maxretries")]
    pub max_retries: u32,
}

impl Default for MonitorTiming {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            retry_interval: default_interval(),
            max_retries: 0,
        }
    }
}

fn default_interval() -> u32 {
    60
}

fn default_http_timeout() -> u32 {
    48
}

/// Monitor group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMonitor {
    pub id: LabelValue,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Docker container monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerMonitor {
    #[serde(flatten)]
    pub common: MonitorCommon,
    #[serde(alias = "dockerHost", alias = "host")]
    pub docker_host: LabelValue,
    pub container: String,
    #[serde(flatten)]
    pub timing: MonitorTiming,
}

/// HTTP(S) monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpMonitor {
    #[serde(flatten)]
    pub common: MonitorCommon,
    pub url: String,
    #[serde(flatten)]
    pub timing: MonitorTiming,
    #[serde(default = "default_http_timeout")]
    pub timeout: u32,
    #[serde(default)]
    pub keyword: Option<String>,
}

/// TCP port monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortMonitor {
    #[serde(flatten)]
    pub common: MonitorCommon,
    pub hostname: String,
    pub port: LabelValue,
    #[serde(flatten)]
    pub timing: MonitorTiming,
}

/// Monitor descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MonitorDescriptor {
    Group(GroupMonitor),
    Docker(DockerMonitor),
    Http(HttpMonitor),
    Port(PortMonitor),
    /// Any other `type`; produces no labels
    #[serde(other)]
    Unknown,
}

impl MonitorDescriptor {
    /// Parse a JSON array of monitors
    pub fn parse_list(json: &str) -> serde_json::Result<Vec<MonitorDescriptor>> {
        serde_json::from_str(json)
    }

    /// Labels for this monitor, in emission order
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();

        match self {
            MonitorDescriptor::Group(group) => {
                labels.push(format!("kuma.group.name={}", group.name));
                labels.push(format!("kuma.group.id={}", group.id));
                if let Some(description) = non_empty(&group.description) {
                    labels.push(format!("kuma.group.description={}", description));
                }
            }
            MonitorDescriptor::Docker(docker) => {
                push_common(&mut labels, "docker", &docker.common);
                labels.push(format!("kuma.monitor.docker.host={}", docker.docker_host));
                labels.push(format!("kuma.monitor.docker.container={}", docker.container));
                push_timing(&mut labels, &docker.timing);
            }
            MonitorDescriptor::Http(http) => {
                push_common(&mut labels, "http", &http.common);
                labels.push(format!("kuma.monitor.http.url={}", http.url));
                push_timing(&mut labels, &http.timing);
                labels.push(format!("kuma.monitor.http.timeout={}", http.timeout));
                if let Some(keyword) = non_empty(&http.keyword) {
                    labels.push(format!("kuma.monitor.http.keyword={}", keyword));
                }
            }
            MonitorDescriptor::Port(port) => {
                push_common(&mut labels, "port", &port.common);
                labels.push(format!("kuma.monitor.port.hostname={}", port.hostname));
                labels.push(format!("kuma.monitor.port.port={}", port.port));
                push_timing(&mut labels, &port.timing);
            }
            MonitorDescriptor::Unknown => {}
        }

        labels
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn push_common(labels: &mut Vec<String>, kind: &str, common: &MonitorCommon) {
    labels.push(format!("kuma.monitor.type={}", kind));
    labels.push(format!("kuma.monitor.id={}", common.id));
    labels.push(format!("kuma.monitor.name={}", common.name));
    if let Some(description) = non_empty(&common.description) {
        labels.push(format!("kuma.monitor.description={}", description));
    }
    if let Some(parent) = common.parent.as_ref().filter(|p| p.is_truthy()) {
        labels.push(format!("kuma.monitor.parent={}", parent));
    }
}

fn push_timing(labels: &mut Vec<String>, timing: &MonitorTiming) {
    labels.push(format!("kuma.monitor.interval={}", timing.interval));
    labels.push(format!("kuma.monitor.retry.interval={}", timing.retry_interval));
    labels.push(format!("kuma.monitor.max.retries={}", timing.max_retries));
}
