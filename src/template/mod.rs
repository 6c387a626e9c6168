//! unRAID Docker templates
//!
//! Reads the XML templates unRAID keeps for each container and maps them to
//! compose services.

pub mod descriptor;
pub mod limits;
pub mod parser;

pub use descriptor::TemplateDescriptor;
pub use limits::ResourceLimits;
pub use parser::{ParsedTemplate, TemplateParser};
