//! Error types for unraid-compose

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion error types
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid XML data: {0}")]
    XmlSyntax(String),

    #[error("{0} not found in XML")]
    MissingRequiredField(&'static str),

    #[error("Service '{0}' not found in compose file")]
    ServiceNotFound(String),

    #[error("No monitors provided")]
    EmptyMonitorList,

    #[error("Invalid compose format: {0}")]
    InvalidComposeFormat(String),

    #[error("Invalid monitor list: {0}")]
    InvalidMonitorList(#[from] serde_json::Error),

    #[error("Duplicate service: {0}")]
    DuplicateService(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(e: serde_yaml::Error) -> Self {
        ConvertError::Yaml(e.to_string())
    }
}

impl From<quick_xml::Error> for ConvertError {
    fn from(e: quick_xml::Error) -> Self {
        ConvertError::XmlSyntax(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ConvertError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ConvertError::XmlSyntax(e.to_string())
    }
}
