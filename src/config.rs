use crate::auth::ServiceAccountCredential;
use crate::error::{AppError, ConfigError, Result};
use crate::sheets::SPREADSHEETS_SCOPE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR_PREFIX: &str = "sheet-records";

/// Names a service account key file when the config has no `[credential]` section.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub credential: Option<CredentialConfig>,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GoogleConfig {
    pub token_url: String,
    pub api_base_url: String,
    pub scopes: Vec<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            scopes: vec![SPREADSHEETS_SCOPE.to_string()],
        }
    }
}

/// Either a path to a service account JSON key, or its two fields inline.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct CredentialConfig {
    pub key_file: Option<PathBuf>,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("key_file", &self.key_file)
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectConfig {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub lists: BTreeMap<String, ListConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListConfig {
    pub range: String,
}

/// Where a logical (project, list) pair lives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListTarget {
    pub spreadsheet_id: String,
    pub range: String,
}

// Fields of a downloaded service account key that are used here.
#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
}

impl Config {
    /// Load the config file, or defaults when none exists yet.
    pub fn load() -> Result<Self> {
        match Self::xdg_dirs().find_config_file("config.toml") {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            ConfigError::Invalid(format!("Failed to parse config {:?}: {}", path, e)).into()
        })
    }

    pub fn project(&self, project: &str) -> Result<&ProjectConfig> {
        self.projects
            .get(project)
            .ok_or_else(|| ConfigError::UnknownProject(project.to_string()).into())
    }

    /// Resolve a (project, list) pair to its spreadsheet and range.
    pub fn resolve(&self, project: &str, list: &str) -> Result<ListTarget> {
        let project_config = self.project(project)?;
        let list_config = project_config.lists.get(list).ok_or_else(|| ConfigError::UnknownList {
            project: project.to_string(),
            list: list.to_string(),
        })?;

        Ok(ListTarget {
            spreadsheet_id: project_config.spreadsheet_id.clone(),
            range: list_config.range.clone(),
        })
    }

    /// Build the service account credential from config, falling back to the key file named
    /// by `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn credential(&self) -> Result<ServiceAccountCredential> {
        let env_key_file = std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from);
        self.resolve_credential(env_key_file)
    }

    fn resolve_credential(&self, env_key_file: Option<PathBuf>) -> Result<ServiceAccountCredential> {
        let scopes = self.google.scopes.clone();

        let (client_email, private_key) = match &self.credential {
            Some(CredentialConfig {
                key_file: Some(path),
                ..
            }) => read_key_file(path)?,
            Some(CredentialConfig {
                client_email: Some(email),
                private_key: Some(key),
                ..
            }) => (email.clone(), key.clone()),
            Some(_) => {
                return Err(ConfigError::MissingCredential(
                    "[credential] needs key_file, or client_email and private_key".to_string(),
                )
                .into());
            }
            None => match env_key_file {
                Some(path) => read_key_file(&path)?,
                None => {
                    return Err(ConfigError::MissingCredential(format!(
                        "no [credential] section and {} is not set",
                        CREDENTIALS_ENV
                    ))
                    .into());
                }
            },
        };

        Ok(ServiceAccountCredential {
            email: client_email,
            private_key,
            scopes,
        })
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config directory: {}", e)).into())
    }
}

fn read_key_file(path: &Path) -> Result<(String, String)> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::MissingCredential(format!("Failed to read key file {:?}: {}", path, e))
    })?;
    let key: ServiceAccountKey = serde_json::from_str(&contents).map_err(|e| {
        AppError::from(ConfigError::MissingCredential(format!(
            "Failed to parse key file {:?}: {}",
            path, e
        )))
    })?;
    Ok((key.client_email, key.private_key))
}
