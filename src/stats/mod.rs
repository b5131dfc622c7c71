//! Delivery statistics

pub mod metrics;

pub use metrics::{PublishReport, PublisherSnapshot, PublisherStats, RegistryStats};
