//! Acceptance-test helpers for the cygnus notification connector.
//!
//! This crate backs a behaviour-driven suite that feeds simulated Orion
//! context notifications to a cygnus connector and verifies the connector
//! persisted them in a hadoop cluster. The library provides the helper
//! clients the step definitions delegate to; the step vocabulary itself
//! lives in the `acceptance` test binary.

pub mod config;
pub mod cygnus;
pub mod error;
pub mod hadoop;
pub mod notification;

pub use config::{CygnusProperties, HadoopProperties, Properties};
pub use cygnus::{CygnusClient, NotificationResponse, PersistenceMode};
pub use error::{AcceptanceError, Result};
pub use hadoop::{HadoopClient, HdfsApi};
pub use notification::{NotificationContent, NotificationSchema, NotifyContextRequest};
