use crate::config::SalesforceConfig;
use crate::core::document::SalesforceDocument;
use crate::core::session::SoapClient;
use crate::core::{ContentUploader, StorageEngine};
use crate::domain::model::UploadedFile;
use crate::utils::error::Result;
use std::sync::Arc;

/// Stores uploaded files as Salesforce Documents.
#[derive(Clone)]
pub struct SalesforceStorage {
    client: SoapClient,
    config: Arc<SalesforceConfig>,
    uploader: Option<Arc<dyn ContentUploader>>,
}

impl SalesforceStorage {
    pub fn new(config: SalesforceConfig) -> Self {
        Self {
            client: SoapClient::new(config.endpoint.clone()),
            config: Arc::new(config),
            uploader: None,
        }
    }

    /// Creates Documents with a placeholder body and hands the content to `uploader`.
    pub fn with_uploader(config: SalesforceConfig, uploader: Arc<dyn ContentUploader>) -> Self {
        Self {
            uploader: Some(uploader),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &SalesforceConfig {
        &self.config
    }

    pub fn client(&self) -> &SoapClient {
        &self.client
    }

    pub async fn store(&self, store_path: &str, file: &UploadedFile) -> Result<SalesforceDocument> {
        let mut document = self.handle(None);
        document.store(store_path, file).await?;
        Ok(document)
    }

    pub fn retrieve(&self, document_id: impl Into<String>) -> SalesforceDocument {
        self.handle(Some(document_id.into()))
    }

    pub fn identifier<'a>(&self, document: &'a SalesforceDocument) -> Option<&'a str> {
        document.identifier()
    }

    fn handle(&self, document_id: Option<String>) -> SalesforceDocument {
        SalesforceDocument::new(
            self.client.clone(),
            Arc::clone(&self.config),
            self.uploader.clone(),
            document_id,
        )
    }
}

impl StorageEngine for SalesforceStorage {
    type File = SalesforceDocument;

    async fn store(&self, store_path: &str, file: &UploadedFile) -> Result<SalesforceDocument> {
        SalesforceStorage::store(self, store_path, file).await
    }

    fn retrieve(&self, identifier: &str) -> SalesforceDocument {
        SalesforceStorage::retrieve(self, identifier)
    }
}
