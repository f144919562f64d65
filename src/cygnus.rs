//! Client for the cygnus connector under test.
//!
//! Mirrors the per-scenario helper the suite drives: it remembers the
//! storage schema the scenario configured, sends simulated Orion
//! notifications to the connector's notification port, and verifies what
//! the connector persisted by reading the HDFS file back through
//! [`HadoopClient`]. It is stateful on purpose so later verification
//! steps can reuse what earlier steps set.

use std::{fmt, str::FromStr};

use tracing::{debug, info};
use url::Url;

use crate::{
    config::CygnusProperties,
    error::{AcceptanceError, Result},
    hadoop::HadoopClient,
    notification::{NotificationContent, NotificationSchema, NotifyContextRequest},
};

/// How cygnus lays out persisted attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistenceMode {
    /// One line per attribute, carrying its name and type.
    Row,
    /// One line per notification, one column pair per attribute.
    Column,
}

impl FromStr for PersistenceMode {
    type Err = AcceptanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ROW" => Ok(Self::Row),
            "COLUMN" => Ok(Self::Column),
            _ => Err(AcceptanceError::InvalidMode(s.to_owned())),
        }
    }
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Row => "ROW",
            Self::Column => "COLUMN",
        })
    }
}

/// Captured outcome of a notification POST.
#[derive(Clone, Debug)]
pub struct NotificationResponse {
    /// HTTP status code the connector returned.
    pub code: u16,
    /// Response body, kept for diagnostics.
    pub body: String,
}

#[derive(Clone, Debug)]
struct SentNotification {
    value: String,
    metadata_value: String,
}

/// Stateful helper driving the connector through one scenario.
#[derive(Clone, Debug)]
pub struct CygnusClient {
    http: reqwest::Client,
    notify_url: Url,
    management_url: Url,
    expected_version: String,
    mode: PersistenceMode,
    schema: Option<NotificationSchema>,
    destination: Option<String>,
    dataset: Option<String>,
    last_sent: Option<SentNotification>,
}

impl CygnusClient {
    /// Build a client from the cygnus section of the properties file.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Url`] for malformed endpoints.
    pub fn new(props: &CygnusProperties) -> Result<Self> {
        let notify_url = Url::parse(&format!(
            "http://{}:{}/notify",
            props.host, props.notification_port
        ))?;
        let management_url = Url::parse(&format!(
            "http://{}:{}/",
            props.host, props.management_port
        ))?;
        Ok(Self {
            http: reqwest::Client::new(),
            notify_url,
            management_url,
            expected_version: props.version.clone(),
            mode: PersistenceMode::Row,
            schema: None,
            destination: None,
            dataset: None,
            last_sent: None,
        })
    }

    /// Check the connector is reachable and record the persistence mode.
    ///
    /// Queries the management `/version` endpoint; when the properties
    /// file names an expected version, the reported one must contain it.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::InvalidMode`] for an unknown mode,
    /// transport or status errors when the management API is down, and
    /// [`AcceptanceError::VersionMismatch`] on a version disagreement.
    pub async fn verify_cygnus(&mut self, mode: &str) -> Result<()> {
        let mode: PersistenceMode = mode.parse()?;
        let url = self.management_url.join("version")?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AcceptanceError::UnexpectedStatus {
                operation: "cygnus version",
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await?;
        if !self.expected_version.is_empty() && !body.contains(&self.expected_version) {
            return Err(AcceptanceError::VersionMismatch {
                component: "cygnus",
                expected: self.expected_version.clone(),
                found: body,
            });
        }
        info!("cygnus reachable, persistence mode {mode}");
        self.mode = mode;
        Ok(())
    }

    /// Store the schema later notifications and verifications will use.
    ///
    /// The six arguments are kept in the order the configuration phrase
    /// captures them. A destination override from a previous scenario
    /// step sequence is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::InvalidAttributeNumber`] when the
    /// attribute count does not parse as a positive integer.
    pub fn hadoop_configuration(
        &mut self,
        tenant: &str,
        service_path: &str,
        resource: &str,
        attribute_number: &str,
        attribute_name: &str,
        attribute_type: &str,
    ) -> Result<()> {
        let count: usize = attribute_number
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| AcceptanceError::InvalidAttributeNumber(attribute_number.to_owned()))?;
        self.schema = Some(NotificationSchema {
            tenant: tenant.to_owned(),
            service_path: service_path.to_owned(),
            resource: resource.to_owned(),
            attribute_number: count,
            attribute_name: attribute_name.to_owned(),
            attribute_type: attribute_type.to_owned(),
        });
        self.destination = None;
        self.dataset = None;
        self.last_sent = None;
        Ok(())
    }

    /// Send a simulated Orion notification built from the stored schema.
    ///
    /// The payload is rendered in the requested content kind and posted
    /// with the tenant and service path as Fiware headers. The sent values
    /// are remembered for the storage verifications.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::SchemaNotConfigured`] when no schema was
    /// stored, [`AcceptanceError::InvalidContent`] for an unknown content
    /// kind, and transport errors from the POST itself.
    pub async fn received_notification(
        &mut self,
        attribute_value: &str,
        metadata_value: &str,
        content: &str,
    ) -> Result<NotificationResponse> {
        let content: NotificationContent = content.parse()?;
        let schema = self.schema.as_ref().ok_or(AcceptanceError::SchemaNotConfigured)?;
        let body = NotifyContextRequest::build(schema, attribute_value, metadata_value)
            .render(content)?;
        debug!("posting {content} notification to {}", self.notify_url);
        let response = self
            .http
            .post(self.notify_url.clone())
            .header("Content-Type", content.content_type())
            .header("Accept", content.content_type())
            .header("Fiware-Service", &schema.tenant)
            .header("Fiware-ServicePath", &schema.service_path)
            .body(body)
            .send()
            .await?;
        let code = response.status().as_u16();
        let body = response.text().await?;
        self.last_sent = Some(SentNotification {
            value: attribute_value.to_owned(),
            metadata_value: metadata_value.to_owned(),
        });
        Ok(NotificationResponse { code, body })
    }

    /// Compare a captured response against the expected status code.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Config`] when `expected` is not a status
    /// code, and [`AcceptanceError::HttpCodeMismatch`] on disagreement.
    pub fn verify_response_http_code(
        &self,
        expected: &str,
        response: &NotificationResponse,
    ) -> Result<()> {
        let expected: u16 = expected
            .parse()
            .map_err(|_| AcceptanceError::Config(format!("invalid http code {expected:?}")))?;
        if response.code == expected {
            Ok(())
        } else {
            Err(AcceptanceError::HttpCodeMismatch {
                expected,
                found: response.code,
            })
        }
    }

    /// Check the last notification's values and attribute types were
    /// persisted in the destination file.
    ///
    /// Row mode expects the sink's pipe-separated rendering, one
    /// `<name>|<type>|<value>` triplet per attribute; column mode only
    /// carries the values as columns.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Verification`] when the destination
    /// file does not exist or an expected needle is missing, plus any
    /// error from reading the file.
    pub async fn verify_file_search_values_and_type(&self, hadoop: &HadoopClient) -> Result<()> {
        let (schema, sent) = self.verification_context()?;
        let path = self.stored_file_path(hadoop, schema);
        let stored = read_destination_file(hadoop, path.clone()).await?;
        for index in 0..schema.attribute_number {
            let needle = match self.mode {
                PersistenceMode::Row => format!(
                    "{}|{}|{}",
                    schema.attribute(index),
                    schema.attribute_type,
                    sent.value
                ),
                PersistenceMode::Column => format!("|{}", sent.value),
            };
            search(&stored, &needle, &path)?;
        }
        info!("values and type verified in {path}");
        Ok(())
    }

    /// Check the last notification's metadata value was persisted.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::Verification`] when the destination
    /// file does not exist or the metadata value is missing, plus any
    /// error from reading the file.
    pub async fn verify_file_search_metadata(&self, hadoop: &HadoopClient) -> Result<()> {
        let (schema, sent) = self.verification_context()?;
        let path = self.stored_file_path(hadoop, schema);
        let stored = read_destination_file(hadoop, path.clone()).await?;
        search(&stored, &sent.metadata_value, &path)?;
        info!("metadata verified in {path}");
        Ok(())
    }

    /// Override the file name and dataset directory used by the storage
    /// verifications.
    ///
    /// Cygnus derives the destination from notification headers; scenarios
    /// exercising that derivation tell the suite where to look instead of
    /// the schema defaults.
    pub fn change_destination_to_pattern(&mut self, destination: &str, dataset: &str) {
        self.destination = Some(destination.to_owned());
        self.dataset = Some(dataset.to_owned());
    }

    fn verification_context(&self) -> Result<(&NotificationSchema, &SentNotification)> {
        let schema = self.schema.as_ref().ok_or(AcceptanceError::SchemaNotConfigured)?;
        let sent = self.last_sent.as_ref().ok_or(AcceptanceError::SchemaNotConfigured)?;
        Ok((schema, sent))
    }

    /// Path of the persisted file: `user/<user>/<dataset>/<destination>.txt`,
    /// with the dataset defaulting to the tenant and the destination to
    /// the resource.
    fn stored_file_path(&self, hadoop: &HadoopClient, schema: &NotificationSchema) -> String {
        let dataset = self.dataset.as_deref().unwrap_or(&schema.tenant);
        let destination = self.destination.as_deref().unwrap_or(&schema.resource);
        format!("user/{}/{dataset}/{destination}.txt", hadoop.user())
    }
}

/// Check the destination file exists, then read it.
async fn read_destination_file(hadoop: &HadoopClient, path: String) -> Result<String> {
    if !hadoop.exists(&path).await? {
        return Err(AcceptanceError::Verification {
            needle: "persisted file".into(),
            path,
        });
    }
    hadoop.read_file(&path).await
}

fn search(stored: &str, needle: &str, path: &str) -> Result<()> {
    if stored.contains(needle) {
        Ok(())
    } else {
        Err(AcceptanceError::Verification {
            needle: needle.to_owned(),
            path: path.to_owned(),
        })
    }
}
