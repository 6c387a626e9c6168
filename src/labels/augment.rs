//! Monitoring label augmentation for existing compose files

use super::monitor::MonitorDescriptor;
use crate::compose::{ComposeEmitter, ComposeParser};
use crate::error::{ConvertError, Result};
use serde_yaml::Value;
use tracing::debug;

/// Appends monitor labels to a service of an existing compose file
#[derive(Debug, Clone, Default)]
pub struct LabelAugmenter {
    emitter: ComposeEmitter,
}

impl LabelAugmenter {
    /// Create an augmenter that writes with the given emitter
    pub fn new(emitter: ComposeEmitter) -> Self {
        Self { emitter }
    }

    /// Add labels for `monitors` to `service_name`, or to the first service
    /// when no name is given, and return the rewritten compose text
    pub fn augment(
        &self,
        compose: &str,
        monitors: &[MonitorDescriptor],
        service_name: Option<&str>,
    ) -> Result<String> {
        if monitors.is_empty() {
            return Err(ConvertError::EmptyMonitorList);
        }

        let mut document = ComposeParser::parse_str(compose)?;
        let services = ComposeParser::services_mut(&mut document)?;

        let (name, service) = match service_name.filter(|name| !name.is_empty()) {
            Some(name) => {
                let service = services
                    .get_mut(name)
                    .ok_or_else(|| ConvertError::ServiceNotFound(name.to_string()))?;
                (name.to_string(), service)
            }
            None => {
                let (key, service) = services.iter_mut().next().ok_or_else(|| {
                    ConvertError::InvalidComposeFormat("services section is empty".to_string())
                })?;
                (scalar_text(key), service)
            }
        };
        debug!("Adding monitoring labels to service {}", name);

        if service.is_null() {
            *service = Value::Mapping(Default::default());
        }
        let service_map = service.as_mapping_mut().ok_or_else(|| {
            ConvertError::InvalidComposeFormat(format!("service '{}' is not a mapping", name))
        })?;

        let slot = service_map
            .entry(Value::from("labels"))
            .or_insert(Value::Null);
        let mut labels = match std::mem::take(slot) {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items,
            Value::Mapping(mapping) => mapping
                .into_iter()
                .map(|(key, value)| {
                    Value::String(format!("{}={}", scalar_text(&key), scalar_text(&value)))
                })
                .collect(),
            _ => {
                return Err(ConvertError::InvalidComposeFormat(format!(
                    "labels of service '{}' must be a list or a mapping",
                    name
                )))
            }
        };

        let before = labels.len();
        for monitor in monitors {
            let monitor_labels = monitor.labels();
            if monitor_labels.is_empty() {
                debug!("Skipping monitor without labels: {:?}", monitor);
            }
            labels.extend(monitor_labels.into_iter().map(Value::String));
        }
        tracing::info!(
            "Added {} monitoring labels to service {}",
            labels.len() - before,
            name
        );

        *slot = Value::Sequence(labels);

        self.emitter.emit_value(&document)
    }
}

/// Text of a scalar as it would appear in a `key=value` label
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
