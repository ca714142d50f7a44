use crate::config::SalesforceConfig;
use crate::core::session::{Session, SoapClient};
use crate::core::soap::SObject;
use crate::core::{ContentUploader, StoredFile};
use crate::domain::model::{
    DocumentTarget, FetchedDocument, UploadedFile, DOCUMENT_ENTITY, PLACEHOLDER_BODY,
};
use crate::utils::error::{Result, StorageError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;

/// A (possibly not yet created) Document in the org.
///
/// Body and name are fetched on first access and cached. The handle logs in
/// once, on its first remote call, and keeps that session for its lifetime.
pub struct SalesforceDocument {
    client: SoapClient,
    config: Arc<SalesforceConfig>,
    uploader: Option<Arc<dyn ContentUploader>>,
    document_id: Option<String>,
    fetched: Option<FetchedDocument>,
    session: Option<Session>,
}

impl SalesforceDocument {
    pub(crate) fn new(
        client: SoapClient,
        config: Arc<SalesforceConfig>,
        uploader: Option<Arc<dyn ContentUploader>>,
        document_id: Option<String>,
    ) -> Self {
        Self {
            client,
            config,
            uploader,
            document_id,
            fetched: None,
            session: None,
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.document_id()
    }

    pub fn folder_id(&self) -> &str {
        &self.config.folder_id
    }

    pub fn is_fetched(&self) -> bool {
        self.fetched.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Creates the Document and records its id on the handle.
    ///
    /// `Name` and `Type` come from `store_path`. Without an uploader the file
    /// content goes out with the create call; with one, the Document is created
    /// with a placeholder body and the uploader fills it in.
    pub async fn store(&mut self, store_path: &str, file: &UploadedFile) -> Result<&str> {
        if let Some(document_id) = &self.document_id {
            return Err(StorageError::AlreadyStored {
                document_id: document_id.clone(),
            });
        }

        let target = DocumentTarget::from_store_path(store_path);
        let body = match &self.uploader {
            None => STANDARD.encode(file.read().await?),
            Some(_) => STANDARD.encode(PLACEHOLDER_BODY),
        };

        let sobject = SObject::build(
            DOCUMENT_ENTITY,
            None,
            [
                ("Body", Some(body)),
                ("Type", Some(target.file_type)),
                ("Name", Some(target.name.clone())),
                ("FolderId", Some(self.config.folder_id.clone())),
            ],
        );

        let session = self.connect().await?.clone();
        let created = session.create(&sobject).await?;
        tracing::info!("Created Salesforce document {} ({})", created, target.name);
        let document_id = self.document_id.insert(created);

        if let Some(uploader) = &self.uploader {
            uploader
                .upload(&self.config.credentials(), document_id, file, &session)
                .await?;
            tracing::debug!("Uploader finished for document {}", document_id);
        }

        Ok(document_id.as_str())
    }

    pub async fn read(&mut self) -> Result<&[u8]> {
        Ok(&self.fetch().await?.body)
    }

    pub async fn file_name(&mut self) -> Result<&str> {
        Ok(&self.fetch().await?.name)
    }

    /// Deletes the remote Document; returns the org's success flag.
    pub async fn delete(&mut self) -> Result<bool> {
        let document_id = self.document_id.clone().ok_or(StorageError::NotStored)?;
        let deleted = self.connect().await?.delete(&document_id).await?;
        self.fetched = None;

        if deleted {
            tracing::info!("Deleted Salesforce document {}", document_id);
        } else {
            tracing::warn!("Salesforce refused to delete document {}", document_id);
        }
        Ok(deleted)
    }

    async fn fetch(&mut self) -> Result<&FetchedDocument> {
        let document = match self.fetched.take() {
            Some(document) => document,
            None => self.download().await?,
        };
        Ok(self.fetched.insert(document))
    }

    async fn download(&mut self) -> Result<FetchedDocument> {
        let document_id = self.document_id.clone().ok_or(StorageError::NotStored)?;
        let record = self
            .connect()
            .await?
            .retrieve(&["Body", "Name"], DOCUMENT_ENTITY, &document_id)
            .await?
            .ok_or_else(|| StorageError::DocumentNotFound {
                document_id: document_id.clone(),
            })?;

        // the org may wrap long base64 values
        let encoded: String = record
            .get("Body")
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let body = STANDARD.decode(encoded)?;
        let name = record.get("Name").unwrap_or_default().to_string();

        tracing::debug!(
            "Fetched document {} ({}, {} bytes)",
            document_id,
            name,
            body.len()
        );
        Ok(FetchedDocument { body, name })
    }

    async fn connect(&mut self) -> Result<&Session> {
        let session = match self.session.take() {
            Some(session) => session,
            None => self.client.login(&self.config.credentials()).await?,
        };
        Ok(self.session.insert(session))
    }
}

impl StoredFile for SalesforceDocument {
    fn identifier(&self) -> Option<&str> {
        SalesforceDocument::identifier(self)
    }

    async fn read(&mut self) -> Result<&[u8]> {
        SalesforceDocument::read(self).await
    }

    async fn file_name(&mut self) -> Result<&str> {
        SalesforceDocument::file_name(self).await
    }

    async fn delete(&mut self) -> Result<bool> {
        SalesforceDocument::delete(self).await
    }
}
