//! NGSI v1 `notifyContextRequest` payloads.
//!
//! Cygnus receives Orion context notifications over HTTP, either as JSON or
//! as XML. This module builds both renderings from the storage schema the
//! scenario configured, using Orion's field naming so the connector parses
//! the payload exactly as it would a broker-originated one.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::AcceptanceError;

/// Wire rendering of a notification body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationContent {
    /// `application/json` body.
    Json,
    /// `application/xml` body.
    Xml,
}

impl NotificationContent {
    /// MIME type sent in the `Content-Type` header.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

impl FromStr for NotificationContent {
    type Err = AcceptanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(AcceptanceError::InvalidContent(s.to_owned())),
        }
    }
}

impl fmt::Display for NotificationContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Xml => "xml",
        })
    }
}

/// Storage schema configured by the tenant step.
///
/// Holds the six captures of the configuration phrase. The resource string
/// encodes the context entity as `<id>-<type>`, split on the last hyphen;
/// a resource without a hyphen yields an entity with an empty type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationSchema {
    /// Fiware tenant (service) owning the data.
    pub tenant: String,
    /// Fiware service path within the tenant.
    pub service_path: String,
    /// Context resource, `<entity id>-<entity type>`.
    pub resource: String,
    /// How many attributes each notification carries.
    pub attribute_number: usize,
    /// Base attribute name; attributes are named `<base>_<index>`.
    pub attribute_name: String,
    /// Attribute type shared by all generated attributes.
    pub attribute_type: String,
}

impl NotificationSchema {
    /// Entity id and type encoded in the resource string.
    #[must_use]
    pub fn entity(&self) -> (&str, &str) {
        match self.resource.rsplit_once('-') {
            Some((id, ty)) => (id, ty),
            None => (self.resource.as_str(), ""),
        }
    }

    /// Name of the `index`-th generated attribute.
    #[must_use]
    pub fn attribute(&self, index: usize) -> String {
        format!("{}_{index}", self.attribute_name)
    }
}

/// One piece of attribute metadata.
#[derive(Clone, Debug, Serialize)]
pub struct ContextMetadata {
    /// Metadata name.
    pub name: String,
    /// Metadata type.
    #[serde(rename = "type")]
    pub metadata_type: String,
    /// Metadata value.
    pub value: String,
}

/// One context attribute with its metadata.
#[derive(Clone, Debug, Serialize)]
pub struct ContextAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute type.
    #[serde(rename = "type")]
    pub attribute_type: String,
    /// Attribute value.
    pub value: String,
    /// Attached metadata entries.
    pub metadatas: Vec<ContextMetadata>,
}

/// The context entity carried by the notification.
#[derive(Clone, Debug, Serialize)]
pub struct ContextElement {
    /// Attributes reported for the entity.
    pub attributes: Vec<ContextAttribute>,
    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Orion pattern flag, always the literal string `"false"` here.
    #[serde(rename = "isPattern")]
    pub is_pattern: String,
    /// Entity id.
    pub id: String,
}

/// Orion status code attached to each context response.
#[derive(Clone, Debug, Serialize)]
pub struct StatusCode {
    /// Numeric code as a string, per NGSI v1.
    pub code: String,
    /// Human-readable phrase.
    #[serde(rename = "reasonPhrase")]
    pub reason_phrase: String,
}

/// One entry of the `contextResponses` array.
#[derive(Clone, Debug, Serialize)]
pub struct ContextElementResponse {
    /// The entity and its attributes.
    #[serde(rename = "contextElement")]
    pub context_element: ContextElement,
    /// Status reported by the broker, `200 OK` for these simulations.
    #[serde(rename = "statusCode")]
    pub status_code: StatusCode,
}

/// A full `notifyContextRequest` document.
#[derive(Clone, Debug, Serialize)]
pub struct NotifyContextRequest {
    /// Subscription the notification belongs to.
    #[serde(rename = "subscriptionId")]
    pub subscription_id: String,
    /// Originator URL reported by the broker.
    pub originator: String,
    /// Context responses, one per notified entity.
    #[serde(rename = "contextResponses")]
    pub context_responses: Vec<ContextElementResponse>,
}

const SUBSCRIPTION_ID: &str = "51c0ac9ed714fb3b37d7d5a8";
const ORIGINATOR: &str = "localhost";

impl NotifyContextRequest {
    /// Build a single-entity notification from the configured schema.
    ///
    /// Generates `schema.attribute_number` attributes named
    /// `<attribute_name>_<index>`, all carrying `value` and one metadata
    /// entry with `metadata_value`.
    #[must_use]
    pub fn build(schema: &NotificationSchema, value: &str, metadata_value: &str) -> Self {
        let (entity_id, entity_type) = schema.entity();
        let attributes = (0..schema.attribute_number)
            .map(|i| ContextAttribute {
                name: schema.attribute(i),
                attribute_type: schema.attribute_type.clone(),
                value: value.to_owned(),
                metadatas: vec![ContextMetadata {
                    name: "md_name".into(),
                    metadata_type: "string".into(),
                    value: metadata_value.to_owned(),
                }],
            })
            .collect();
        Self {
            subscription_id: SUBSCRIPTION_ID.into(),
            originator: ORIGINATOR.into(),
            context_responses: vec![ContextElementResponse {
                context_element: ContextElement {
                    attributes,
                    entity_type: entity_type.to_owned(),
                    is_pattern: "false".into(),
                    id: entity_id.to_owned(),
                },
                status_code: StatusCode {
                    code: "200".into(),
                    reason_phrase: "OK".into(),
                },
            }],
        }
    }

    /// Render the notification as JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialisation error, which cannot occur for the types in
    /// this module but is propagated rather than unwrapped.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render the notification in the NGSI v1 XML format.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<notifyContextRequest>");
        push_tag(&mut out, "subscriptionId", &self.subscription_id);
        push_tag(&mut out, "originator", &self.originator);
        out.push_str("<contextResponseList>");
        for response in &self.context_responses {
            out.push_str("<contextElementResponse><contextElement>");
            let element = &response.context_element;
            out.push_str(&format!(
                "<entityId type=\"{}\" isPattern=\"{}\">",
                escape(&element.entity_type),
                element.is_pattern
            ));
            push_tag(&mut out, "id", &element.id);
            out.push_str("</entityId><contextAttributeList>");
            for attribute in &element.attributes {
                out.push_str("<contextAttribute>");
                push_tag(&mut out, "name", &attribute.name);
                push_tag(&mut out, "type", &attribute.attribute_type);
                push_tag(&mut out, "contextValue", &attribute.value);
                out.push_str("<metadata>");
                for metadata in &attribute.metadatas {
                    out.push_str("<contextMetadata>");
                    push_tag(&mut out, "name", &metadata.name);
                    push_tag(&mut out, "type", &metadata.metadata_type);
                    push_tag(&mut out, "value", &metadata.value);
                    out.push_str("</contextMetadata>");
                }
                out.push_str("</metadata></contextAttribute>");
            }
            out.push_str("</contextAttributeList></contextElement><statusCode>");
            push_tag(&mut out, "code", &response.status_code.code);
            push_tag(&mut out, "reasonPhrase", &response.status_code.reason_phrase);
            out.push_str("</statusCode></contextElementResponse>");
        }
        out.push_str("</contextResponseList></notifyContextRequest>");
        out
    }

    /// Render the notification in the requested content kind.
    ///
    /// # Errors
    ///
    /// Propagates JSON serialisation errors.
    pub fn render(&self, content: NotificationContent) -> crate::error::Result<String> {
        match content {
            NotificationContent::Json => self.to_json(),
            NotificationContent::Xml => Ok(self.to_xml()),
        }
    }
}

fn push_tag(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!("<{tag}>{}</{tag}>", escape(value)));
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
