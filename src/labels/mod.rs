//! Monitoring labels
//!
//! Turns a list of Uptime Kuma monitor descriptors into `kuma.*` labels and
//! appends them to a service in an existing compose file.

pub mod augment;
pub mod monitor;

pub use augment::LabelAugmenter;
pub use monitor::MonitorDescriptor;
