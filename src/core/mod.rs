pub mod document;
pub mod session;
pub mod soap;
pub mod storage;
pub mod uploader;

pub use crate::domain::model::{Credentials, FetchedDocument, Record, UploadedFile};
pub use crate::domain::ports::{ConfigProvider, ContentUploader, StorageEngine, StoredFile};
pub use crate::utils::error::Result;
