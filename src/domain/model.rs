use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Salesforce entity that holds uploaded files.
pub const DOCUMENT_ENTITY: &str = "Document";

/// Body written by the two-phase flow before the real content is uploaded.
pub const PLACEHOLDER_BODY: &str = "waiting for upload...";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A file handed over by the host for storing.
#[derive(Debug, Clone)]
pub enum UploadedFile {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl UploadedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        UploadedFile::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        UploadedFile::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn original_filename(&self) -> Option<&str> {
        match self {
            UploadedFile::Path(path) => path.file_name().and_then(|n| n.to_str()),
            UploadedFile::Bytes { name, .. } => Some(name),
        }
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        match self {
            UploadedFile::Path(path) => Ok(tokio::fs::read(path).await?),
            UploadedFile::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}

/// `Name` and `Type` of a new Document, derived from the host's store path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTarget {
    pub name: String,
    pub file_type: String,
}

impl DocumentTarget {
    pub fn from_store_path(store_path: &str) -> Self {
        let path = Path::new(store_path);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(store_path)
            .to_string();
        // `Type` keeps the leading dot; no extension leaves it empty so the field is omitted
        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        Self { name, file_type }
    }
}

/// Body and name of a Document once fetched from the org.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub body: Vec<u8>,
    pub name: String,
}

/// Field values of one record returned by `retrieve`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_store_path() {
        let target = DocumentTarget::from_store_path("uploads/somefile/test.txt");
        assert_eq!(target.name, "test.txt");
        assert_eq!(target.file_type, ".txt");
    }

    #[test]
    fn test_target_without_extension() {
        let target = DocumentTarget::from_store_path("uploads/README");
        assert_eq!(target.name, "README");
        assert_eq!(target.file_type, "");
    }

    #[test]
    fn test_target_keeps_last_extension_only() {
        let target = DocumentTarget::from_store_path("uploads/archive.tar.gz");
        assert_eq!(target.name, "archive.tar.gz");
        assert_eq!(target.file_type, ".gz");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("user@example.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_uploaded_file_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, b"abcd").unwrap();

        let file = UploadedFile::from_path(&path);
        assert_eq!(file.original_filename(), Some("test.txt"));
        assert_eq!(file.read().await.unwrap(), b"abcd");
    }
}
