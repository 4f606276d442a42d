//! Locating, loading and persisting the configuration document.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::model::CliConfig;

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV_VAR: &str = "COOLIFY_CONFIG";

/// Default location: `<config_dir>/coolify/config.json`.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when the platform exposes no
/// configuration directory.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("coolify").join("config.json"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Handle on the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Use an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `explicit` when given, otherwise [`default_config_path`].
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError::NoConfigDir`].
    pub fn locate(explicit: Option<PathBuf>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Ok(Self::new(path)),
            None => default_config_path().map(Self::new),
        }
    }

    /// Path backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration; a missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load(&self) -> ConfigResult<CliConfig> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "configuration file missing; using defaults");
                return Ok(CliConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(CliConfig::default());
        }

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist the configuration as pretty JSON, creating parent directories.
    ///
    /// On Unix the file is restricted to the owner since it holds API tokens.
    ///
    /// # Errors
    ///
    /// Fails when serialisation or any filesystem operation fails.
    pub fn save(&self, config: &CliConfig) -> ConfigResult<()> {
        let mut payload =
            serde_json::to_string_pretty(config).map_err(|source| ConfigError::Serialize { source })?;
        payload.push('\n');

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let write_error = |source: io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = open_private(&self.path).map_err(write_error)?;
        file.write_all(payload.as_bytes()).map_err(write_error)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}

/// Open `path` for writing, readable by the owner only on Unix.
///
/// The mode applies at creation; an existing file is narrowed before any
/// byte is written.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Instance;

    #[test]
    fn missing_file_loads_empty_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().expect("load"), CliConfig::default());
    }

    #[test]
    fn save_then_load_preserves_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("nested").join("config.json"));

        let mut config = CliConfig::default();
        config
            .add(
                Instance {
                    name: "cloud".into(),
                    fqdn: "https://app.coolify.io".into(),
                    token: "secret".into(),
                    default: false,
                },
                false,
            )
            .expect("add instance");
        store.save(&config).expect("save");

        let raw = fs::read_to_string(store.path()).expect("read back");
        assert!(raw.contains("\"fqdn\": \"https://app.coolify.io\""));
        assert_eq!(store.load().expect("load"), config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(store.path()).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[cfg(unix)]
    #[test]
    fn save_narrows_existing_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").expect("seed");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        ConfigStore::new(&path)
            .save(&CliConfig::default())
            .expect("save");
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(
            ConfigStore::new(&path).load().expect("load"),
            CliConfig::default()
        );
    }

    #[test]
    fn load_tolerates_missing_optional_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"instances":[{"name":"local","fqdn":"http://localhost:8000"}]}"#,
        )
        .expect("write");

        let config = ConfigStore::new(&path).load().expect("load");
        assert_eq!(config.instances[0].token, "");
        assert!(!config.instances[0].default);
    }

    #[test]
    fn invalid_json_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").expect("write");

        match ConfigStore::new(&path).load() {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
