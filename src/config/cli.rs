use crate::config::{toml_config::TomlConfig, SalesforceConfig};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "salesforce-storage")]
#[command(about = "Store, read and delete files kept as Salesforce Documents")]
pub struct CliConfig {
    #[arg(long, help = "TOML file with a [salesforce] section; SF_* variables are used otherwise")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a file as a new Document
    Store {
        file: PathBuf,
        #[arg(long, help = "Path whose base name and extension become the Document Name and Type")]
        store_path: Option<String>,
    },
    /// Download a Document's content
    Read {
        document_id: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete a Document
    Delete { document_id: String },
}

impl CliConfig {
    pub fn load_salesforce_config(&self) -> Result<SalesforceConfig> {
        match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                Ok(SalesforceConfig::from_provider(&file))
            }
            None => SalesforceConfig::from_env(),
        }
    }
}
