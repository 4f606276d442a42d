//! Instance definitions and the rules for picking the one a command talks to.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Path appended to an instance FQDN to reach the REST API.
const API_PATH: &str = "api/v1/";

/// One configured API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    /// Unique, user-chosen name.
    pub name: String,
    /// Base URL of the instance, e.g. `https://app.coolify.io`.
    pub fqdn: String,
    /// API token sent as a bearer credential.
    #[serde(default)]
    pub token: String,
    /// Whether this instance is used when none is selected explicitly.
    #[serde(default)]
    pub default: bool,
}

impl Instance {
    /// Root URL of the instance's REST API, always ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when the FQDN is not an absolute
    /// `http` or `https` URL.
    pub fn api_root(&self) -> ConfigResult<Url> {
        api_root_for(&self.fqdn)
    }
}

/// Compute the REST API root for an FQDN.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the FQDN is not an absolute
/// `http` or `https` URL.
pub fn api_root_for(fqdn: &str) -> ConfigResult<Url> {
    let trimmed = fqdn.trim().trim_end_matches('/');
    let base = Url::parse(trimmed).map_err(|err| ConfigError::InvalidField {
        field: "fqdn",
        reason: format!("'{fqdn}' is not a valid URL ({err})"),
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            field: "fqdn",
            reason: format!("'{fqdn}' must use http or https"),
        });
    }

    let mut root = base;
    let path = format!("{}/{API_PATH}", root.path().trim_end_matches('/'));
    root.set_path(&path);
    root.set_query(None);
    root.set_fragment(None);
    Ok(root)
}

/// Overrides supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct InstanceSelector {
    /// Explicit instance name (`--instance`).
    pub name: Option<String>,
    /// Ad-hoc instance URL (`--url` / `COOLIFY_URL`); bypasses the file.
    pub url: Option<String>,
    /// Token override (`--token` / `COOLIFY_TOKEN`).
    pub token: Option<String>,
}

/// Instance chosen for the current invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstance {
    /// Instance name, or `adhoc` when selected through `--url`.
    pub name: String,
    /// REST API root ending in `/`.
    pub api_root: Url,
    /// Bearer token.
    pub token: String,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    /// Configured instances in insertion order.
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl CliConfig {
    /// Look up an instance by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|instance| instance.name == name)
    }

    /// The instance flagged as default, falling back to the first one.
    #[must_use]
    pub fn default_instance(&self) -> Option<&Instance> {
        self.instances
            .iter()
            .find(|instance| instance.default)
            .or_else(|| self.instances.first())
    }

    /// Register a new instance.
    ///
    /// The first instance added always becomes the default.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, an invalid FQDN or a duplicate name.
    pub fn add(&mut self, mut instance: Instance, make_default: bool) -> ConfigResult<()> {
        instance.name = instance.name.trim().to_string();
        instance.fqdn = instance.fqdn.trim().trim_end_matches('/').to_string();
        if instance.name.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "name",
                reason: "instance name cannot be empty".into(),
            });
        }
        instance.api_root()?;
        if self.find(&instance.name).is_some() {
            return Err(ConfigError::DuplicateInstance {
                name: instance.name,
            });
        }

        let make_default = make_default || self.instances.is_empty();
        if make_default {
            self.clear_default();
        }
        instance.default = make_default;
        tracing::debug!(instance = %instance.name, default = make_default, "instance added");
        self.instances.push(instance);
        Ok(())
    }

    /// Remove an instance, promoting the first remaining one if the default
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownInstance`] when no instance has that name.
    pub fn remove(&mut self, name: &str) -> ConfigResult<Instance> {
        let index = self.position(name)?;
        let removed = self.instances.remove(index);
        if removed.default
            && let Some(first) = self.instances.first_mut()
        {
            first.default = true;
        }
        Ok(removed)
    }

    /// Mark an instance as the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownInstance`] when no instance has that name.
    pub fn set_default(&mut self, name: &str) -> ConfigResult<()> {
        let index = self.position(name)?;
        self.clear_default();
        self.instances[index].default = true;
        Ok(())
    }

    /// Replace the token of an instance.
    ///
    /// # Errors
    ///
    /// Fails when the instance is unknown or the token is blank.
    pub fn set_token(&mut self, name: &str, token: &str) -> ConfigResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "token",
                reason: "token cannot be empty".into(),
            });
        }
        let index = self.position(name)?;
        self.instances[index].token = token.to_string();
        Ok(())
    }

    /// Pick the instance for this invocation.
    ///
    /// Precedence: an explicit URL, then an explicit instance name, then the
    /// default instance. A token override replaces the configured token.
    ///
    /// # Errors
    ///
    /// Fails when nothing matches, the FQDN is invalid or no token is known.
    pub fn resolve(&self, selector: &InstanceSelector) -> ConfigResult<ResolvedInstance> {
        let token_override = selector
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty());

        if let Some(url) = selector.url.as_deref().filter(|url| !url.trim().is_empty()) {
            let token = token_override.ok_or_else(|| ConfigError::InvalidField {
                field: "token",
                reason: "a token is required when --url is used (pass --token or set COOLIFY_TOKEN)"
                    .into(),
            })?;
            return Ok(ResolvedInstance {
                name: "adhoc".into(),
                api_root: api_root_for(url)?,
                token: token.to_string(),
            });
        }

        let instance = match selector.name.as_deref() {
            Some(name) => self
                .find(name)
                .ok_or_else(|| ConfigError::UnknownInstance { name: name.into() })?,
            None => self.default_instance().ok_or(ConfigError::NoInstances)?,
        };

        let token = token_override.unwrap_or_else(|| instance.token.trim());
        if token.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "token",
                reason: format!(
                    "instance '{}' has no token; run `coolify instances set-token {}`",
                    instance.name, instance.name
                ),
            });
        }

        Ok(ResolvedInstance {
            name: instance.name.clone(),
            api_root: instance.api_root()?,
            token: token.to_string(),
        })
    }

    fn position(&self, name: &str) -> ConfigResult<usize> {
        self.instances
            .iter()
            .position(|instance| instance.name == name)
            .ok_or_else(|| ConfigError::UnknownInstance { name: name.into() })
    }

    fn clear_default(&mut self) {
        for instance in &mut self.instances {
            instance.default = false;
        }
    }
}
