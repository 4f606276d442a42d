#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Coolify `/api/v1` surface.
//!
//! Every response type decodes leniently: fields the server omits or sends as
//! `null` fall back to their zero value so the CLI can keep rendering partial
//! payloads from older or newer instances. Request payloads serialise exactly
//! the keys the API expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub mod version;

pub use version::{ApiVersion, PreRelease, VersionParseError};

/// Minimum API version that exposes the server endpoints.
pub const SERVERS_MIN_VERSION: &str = "4.0.0-beta.235";

/// Minimum API version that accepts private key creation and removal.
pub const PRIVATE_KEY_WRITE_MIN_VERSION: &str = "4.0.0-beta.383";

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Application deployed inside a project environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Application {
    /// Numeric database identifier.
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    /// Stable identifier used in API paths.
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    /// Display name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    /// Runtime status reported by the instance (e.g. `running:healthy`).
    #[serde(deserialize_with = "nullable")]
    pub status: String,
}

/// Environment inside a project (e.g. `production`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Environment {
    /// Numeric database identifier.
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    /// Stable identifier.
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    /// Environment name; also the path segment used to address it.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Creation timestamp as reported by the server.
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    /// Last update timestamp as reported by the server.
    #[serde(deserialize_with = "nullable")]
    pub updated_at: String,
    /// Optional description.
    pub description: Option<String>,
    /// Applications deployed in this environment.
    #[serde(deserialize_with = "nullable")]
    pub applications: Vec<Application>,
}

/// Project grouping one or more environments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Project {
    /// Stable identifier.
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    /// Display name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Environments of the project. Absent from list responses.
    #[serde(deserialize_with = "nullable")]
    pub environments: Vec<Environment>,
}

impl Project {
    /// Environment labels formatted as `name (uuid)` and joined with `, `.
    #[must_use]
    pub fn environment_labels(&self) -> String {
        self.environments
            .iter()
            .map(|env| format!("{} ({})", env.name, env.uuid))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Connection health flags embedded in a [`Server`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Whether the instance could open an SSH session to the server.
    #[serde(rename = "is_reachable", deserialize_with = "nullable")]
    pub reachable: bool,
    /// Whether the server passed validation and can host resources.
    #[serde(rename = "is_usable", deserialize_with = "nullable")]
    pub usable: bool,
}

/// Server managed by the instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Server {
    /// Numeric database identifier.
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    /// Stable identifier.
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    /// Display name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// IP address or hostname used for SSH.
    #[serde(deserialize_with = "nullable")]
    pub ip: String,
    /// SSH user.
    #[serde(deserialize_with = "nullable")]
    pub user: String,
    /// SSH port.
    #[serde(deserialize_with = "nullable")]
    pub port: u16,
    /// Connection health flags.
    #[serde(deserialize_with = "nullable")]
    pub settings: ServerSettings,
}

/// SSH key pair stored by the instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrivateKey {
    /// Numeric database identifier.
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    /// Stable identifier.
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    /// Display name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// OpenSSH public key derived from the private key.
    #[serde(deserialize_with = "nullable")]
    pub public_key: String,
    /// PEM-encoded private key material.
    #[serde(deserialize_with = "nullable")]
    pub private_key: String,
}

/// Resource (application, database or service) hosted on a server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Resource {
    /// Numeric database identifier.
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    /// Stable identifier.
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    /// Display name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Resource type label (e.g. `application`, `standalone-postgresql`).
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    /// Runtime status reported by the instance.
    #[serde(deserialize_with = "nullable")]
    pub status: String,
}

/// Server detail returned with `?resources=true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerResources {
    /// Resources hosted on the server.
    #[serde(deserialize_with = "nullable")]
    pub resources: Vec<Resource>,
}

/// Payload for `POST projects`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
}

/// Payload for `POST security/keys`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePrivateKeyRequest {
    /// Key name.
    pub name: String,
    /// PEM-encoded private key material.
    pub private_key: String,
}

/// Payload for `POST servers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateServerRequest {
    /// Server name.
    pub name: String,
    /// IP address or hostname.
    pub ip: String,
    /// SSH port.
    pub port: u16,
    /// SSH user.
    pub user: String,
    /// UUID of the private key used to connect.
    pub private_key_uuid: String,
    /// Ask the instance to validate the server right after creation.
    pub instant_validate: bool,
}

/// Acknowledgement carrying the identifier of a created resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UuidResponse {
    /// Identifier of the created resource.
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
}

/// Acknowledgement carrying a human-readable message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MessageResponse {
    /// Message produced by the server.
    #[serde(deserialize_with = "nullable")]
    pub message: String,
}

/// Error document returned on failed requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiErrorBody {
    /// Top-level error message.
    pub message: Option<String>,
    /// Validation failures keyed by field name.
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiErrorBody {
    /// Flatten the message and field errors into a single line.
    ///
    /// Returns `None` when the document carries neither.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let fields = self
            .errors
            .iter()
            .flatten()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>();

        match (self.message.as_deref().map(str::trim), fields.is_empty()) {
            (Some(message), true) if !message.is_empty() => Some(message.to_string()),
            (Some(message), false) if !message.is_empty() => {
                Some(format!("{message} ({})", fields.join("; ")))
            }
            (_, false) => Some(fields.join("; ")),
            _ => None,
        }
    }
}
