#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::session::DEFAULT_ENDPOINT;
use crate::core::ConfigProvider;
use crate::domain::model::Credentials;
use crate::utils::error::{Result, StorageError};
use crate::utils::validation::Validate;
use serde::Deserialize;
use std::env;
use std::fmt;

/// Settings the adapter needs before it can talk to an org.
///
/// Supplied once at construction; every storage owns its own copy.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SalesforceConfig {
    pub username: String,
    pub password: String,
    pub folder_id: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl SalesforceConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        folder_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            folder_id: folder_id.into(),
            endpoint: default_endpoint(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Reads `SF_USERNAME`, `SF_PASSWORD`, `SF_FOLDERID` and the optional `SF_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| StorageError::MissingConfigError {
                    field: name.to_string(),
                })
        };

        Ok(Self {
            username: required("SF_USERNAME")?,
            password: required("SF_PASSWORD")?,
            folder_id: required("SF_FOLDERID")?,
            endpoint: env::var("SF_ENDPOINT").unwrap_or_else(|_| default_endpoint()),
        })
    }

    pub fn from_provider<C: ConfigProvider + ?Sized>(provider: &C) -> Self {
        Self {
            username: provider.username().to_string(),
            password: provider.password().to_string(),
            folder_id: provider.folder_id().to_string(),
            endpoint: provider.endpoint().to_string(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

impl fmt::Debug for SalesforceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SalesforceConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("folder_id", &self.folder_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ConfigProvider for SalesforceConfig {
    fn username(&self) -> &str {
        &self.username
    }

    fn password(&self) -> &str {
        &self.password
    }

    fn folder_id(&self) -> &str {
        &self.folder_id
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Validate for SalesforceConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("username", &self.username)?;
        validate_non_empty_string("password", &self.password)?;
        validate_salesforce_id("folder_id", &self.folder_id)?;
        validate_url("endpoint", &self.endpoint)?;

        tracing::debug!("Salesforce configuration validation passed");
        Ok(())
    }
}
