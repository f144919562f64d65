//! Suite configuration loaded from a `properties.json` file.
//!
//! The acceptance suite is driven by a small JSON properties file describing
//! where the cygnus connector and the hadoop cluster live and which version
//! checks to perform. The path is taken from the
//! `CYGNUS_ACCEPTANCE_PROPERTIES` environment variable when set, falling
//! back to `properties.json` in the working directory and finally to
//! localhost defaults so the suite can be pointed at a local deployment
//! without any file at all.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::{AcceptanceError, Result};

/// Environment variable naming the properties file to load.
pub const PROPERTIES_ENV: &str = "CYGNUS_ACCEPTANCE_PROPERTIES";

const DEFAULT_PROPERTIES_FILE: &str = "properties.json";

/// Connection and verification settings for the hadoop cluster.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HadoopProperties {
    /// Host running the HDFS REST gateway.
    pub host: String,
    /// Port of the HDFS REST gateway (14000 for HttpFS, 50070 for WebHDFS).
    pub port: u16,
    /// HDFS user owning the persisted datasets.
    pub user: String,
    /// REST flavour exposed by the cluster, `httpfs` or `webhdfs`.
    pub api: String,
    /// Whether the installed-correctly step checks the cluster version.
    pub verify_version: bool,
    /// Expected hadoop release, compared against the cluster info report.
    pub version: String,
    /// Cluster-info endpoint of the master node.
    pub manager_url: String,
}

impl Default for HadoopProperties {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 14000,
            user: "opendata".into(),
            api: "httpfs".into(),
            verify_version: false,
            version: "2.4.0".into(),
            manager_url: "http://localhost:8088".into(),
        }
    }
}

/// Connection settings for the cygnus connector under test.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CygnusProperties {
    /// Host running the connector.
    pub host: String,
    /// Port receiving context notifications.
    pub notification_port: u16,
    /// Port of the management API.
    pub management_port: u16,
    /// Expected connector version; skipped when empty.
    pub version: String,
}

impl Default for CygnusProperties {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            notification_port: 5050,
            management_port: 8081,
            version: String::new(),
        }
    }
}

/// Full properties document for one suite run.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Properties {
    /// Hadoop cluster settings.
    pub hadoop: HadoopProperties,
    /// Cygnus connector settings.
    pub cygnus: CygnusProperties,
}

impl Properties {
    /// Load properties from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Config`] if the file cannot be read or
    /// does not parse as a properties document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| AcceptanceError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| AcceptanceError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Load properties from the environment-selected file.
    ///
    /// When `CYGNUS_ACCEPTANCE_PROPERTIES` is unset and no
    /// `properties.json` exists in the working directory, localhost
    /// defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Config`] if a file was named but cannot
    /// be read or parsed.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(PROPERTIES_ENV) {
            return Self::load(path);
        }
        if Path::new(DEFAULT_PROPERTIES_FILE).exists() {
            return Self::load(DEFAULT_PROPERTIES_FILE);
        }
        Ok(Self::default())
    }
}
