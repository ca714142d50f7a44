use crate::config::SalesforceConfig;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, StorageError};
use crate::utils::validation::Validate;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub salesforce: SalesforceConfig,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StorageError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StorageError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;

        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StorageError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn username(&self) -> &str {
        &self.salesforce.username
    }

    fn password(&self) -> &str {
        &self.salesforce.password
    }

    fn folder_id(&self) -> &str {
        &self.salesforce.folder_id
    }

    fn endpoint(&self) -> &str {
        &self.salesforce.endpoint
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.salesforce.validate()
    }
}
