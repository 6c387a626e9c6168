//! unraid-compose - unRAID Docker templates to docker-compose
//!
//! Converts the XML templates unRAID keeps for each container into
//! docker-compose service definitions, and adds Uptime Kuma monitoring
//! labels to existing compose files:
//!
//! - Template parsing (name, image, environment, volumes, ports, limits)
//! - Compose emission with a fixed scalar quoting policy
//! - Monitoring label augmentation

pub mod api;
pub mod compose;
pub mod error;
pub mod labels;
pub mod template;

pub use api::{add_monitoring_labels, convert, ConversionResponse, Converter};
pub use error::{ConvertError, Result};
