//! Request-style entry points
//!
//! Each call takes its whole input as text and answers with either the
//! resulting YAML or an error message, never both.

use crate::compose::{ComposeDocument, ComposeEmitter, ConvertOptions, EmitterConfig};
use crate::error::Result;
use crate::labels::{LabelAugmenter, MonitorDescriptor};
use crate::template::TemplateParser;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Response of a conversion request, `{"yaml": ...}` or `{"error": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionResponse {
    Yaml(String),
    Error(String),
}

impl ConversionResponse {
    /// Whether this response carries an error
    pub fn is_error(&self) -> bool {
        matches!(self, ConversionResponse::Error(_))
    }

    /// Serialize as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "error": e.to_string() }).to_string()
        })
    }
}

impl From<Result<String>> for ConversionResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(yaml) => ConversionResponse::Yaml(yaml),
            Err(e) => {
                debug!("Request failed: {}", e);
                ConversionResponse::Error(e.to_string())
            }
        }
    }
}

/// Handler for conversion requests
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
    emitter: ComposeEmitter,
}

impl Converter {
    /// Create a converter with explicit options
    pub fn new(options: ConvertOptions, emitter_config: EmitterConfig) -> Self {
        Self {
            options,
            emitter: ComposeEmitter::new(emitter_config),
        }
    }

    /// Convert one template to a compose document
    pub fn convert(&self, xml: &str) -> ConversionResponse {
        self.convert_many(&[xml])
    }

    /// Convert several templates into a single compose document
    pub fn convert_many(&self, templates: &[&str]) -> ConversionResponse {
        if templates.iter().all(|xml| xml.trim().is_empty()) {
            return ConversionResponse::Error("No XML data provided".to_string());
        }
        self.render(templates).into()
    }

    fn render(&self, templates: &[&str]) -> Result<String> {
        let parser = TemplateParser::new(self.options.clone());
        let mut document = ComposeDocument::new(&self.options);

        for xml in templates {
            let parsed = parser.parse(xml)?;
            document.add_service(&parsed.name, parsed.service, &parsed.networks)?;
        }

        self.emitter.emit(&document)
    }

    /// Append monitoring labels to a service of an existing compose file
    pub fn add_monitoring_labels(
        &self,
        compose: &str,
        monitors_json: &str,
        service_name: Option<&str>,
    ) -> ConversionResponse {
        if compose.trim().is_empty() {
            return ConversionResponse::Error("No compose data provided".to_string());
        }
        self.augment(compose, monitors_json, service_name).into()
    }

    fn augment(
        &self,
        compose: &str,
        monitors_json: &str,
        service_name: Option<&str>,
    ) -> Result<String> {
        let monitors = MonitorDescriptor::parse_list(monitors_json)?;
        LabelAugmenter::new(self.emitter.clone()).augment(compose, &monitors, service_name)
    }
}

/// Convert one template with default options
pub fn convert(xml: &str) -> ConversionResponse {
    Converter::default().convert(xml)
}

/// Add monitoring labels with default options
pub fn add_monitoring_labels(
    compose: &str,
    monitors_json: &str,
    service_name: Option<&str>,
) -> ConversionResponse {
    Converter::default().add_monitoring_labels(compose, monitors_json, service_name)
}
