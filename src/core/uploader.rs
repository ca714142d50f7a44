//! Two-phase uploads: a Document is created with a placeholder body and its
//! content is written afterwards by a [`ContentUploader`].

use crate::core::session::{Session, SoapClient};
use crate::core::soap::SObject;
use crate::core::ContentUploader;
use crate::domain::model::{Credentials, UploadedFile, DOCUMENT_ENTITY};
use crate::utils::error::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Mutex;

/// Writes `file` into the `Body` of an existing Document. Only `Body` is touched.
pub async fn upload_body(session: &Session, document_id: &str, file: &UploadedFile) -> Result<String> {
    let body = STANDARD.encode(file.read().await?);
    let sobject = SObject::build(DOCUMENT_ENTITY, Some(document_id), [("Body", Some(body))]);
    session.update(&sobject).await
}

/// Uploads the content of a placeholder Document, logging in first when no session is given.
pub async fn perform_upload(
    client: &SoapClient,
    credentials: &Credentials,
    document_id: &str,
    file: &UploadedFile,
    session: Option<&Session>,
) -> Result<String> {
    match session {
        Some(session) => upload_body(session, document_id, file).await,
        None => {
            let session = client.login(credentials).await?;
            upload_body(&session, document_id, file).await
        }
    }
}

/// Uploads straight away through the storing handle's session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionUploader;

#[async_trait]
impl ContentUploader for SessionUploader {
    async fn upload(
        &self,
        _credentials: &Credentials,
        document_id: &str,
        file: &UploadedFile,
        session: &Session,
    ) -> Result<()> {
        upload_body(session, document_id, file).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub credentials: Credentials,
    pub document_id: String,
    pub file: UploadedFile,
}

impl PendingUpload {
    /// Runs the upload with a fresh session.
    pub async fn perform(&self, client: &SoapClient) -> Result<String> {
        perform_upload(client, &self.credentials, &self.document_id, &self.file, None).await
    }
}

/// Leaves the placeholder in place and queues the upload for later.
#[derive(Debug, Default)]
pub struct DeferredUploader {
    pending: Mutex<Vec<PendingUpload>>,
}

impl DeferredUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn take_pending(&self) -> Vec<PendingUpload> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl ContentUploader for DeferredUploader {
    async fn upload(
        &self,
        credentials: &Credentials,
        document_id: &str,
        file: &UploadedFile,
        _session: &Session,
    ) -> Result<()> {
        tracing::debug!("Deferring upload of document {}", document_id);
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PendingUpload {
                credentials: credentials.clone(),
                document_id: document_id.to_string(),
                file: file.clone(),
            });
        Ok(())
    }
}
