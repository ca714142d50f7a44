use crate::core::session::Session;
use crate::domain::model::{Credentials, UploadedFile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The storage-engine contract a host upload layer programs against.
pub trait StorageEngine: Send + Sync {
    type File: StoredFile;

    fn store(
        &self,
        store_path: &str,
        file: &UploadedFile,
    ) -> impl std::future::Future<Output = Result<Self::File>> + Send;

    /// Re-attaches to a stored file. Performs no remote call.
    fn retrieve(&self, identifier: &str) -> Self::File;
}

pub trait StoredFile: Send {
    fn identifier(&self) -> Option<&str>;
    fn read(&mut self) -> impl std::future::Future<Output = Result<&[u8]>> + Send;
    fn file_name(&mut self) -> impl std::future::Future<Output = Result<&str>> + Send;
    fn delete(&mut self) -> impl std::future::Future<Output = Result<bool>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn username(&self) -> &str;
    fn password(&self) -> &str;
    fn folder_id(&self) -> &str;
    fn endpoint(&self) -> &str;
}

/// Fills in the body of a Document created with a placeholder.
#[async_trait]
pub trait ContentUploader: Send + Sync {
    async fn upload(
        &self,
        credentials: &Credentials,
        document_id: &str,
        file: &UploadedFile,
        session: &Session,
    ) -> Result<()>;
}
