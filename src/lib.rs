pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::{toml_config::TomlConfig, SalesforceConfig};
pub use core::{
    document::SalesforceDocument,
    session::{Session, SoapClient, DEFAULT_ENDPOINT},
    storage::SalesforceStorage,
    uploader::{DeferredUploader, PendingUpload, SessionUploader},
};
pub use domain::model::{Credentials, UploadedFile};
pub use domain::ports::{ContentUploader, StorageEngine, StoredFile};
pub use utils::error::{Result, StorageError};
