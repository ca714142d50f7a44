use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Document not found: {document_id}")]
    DocumentNotFound { document_id: String },

    #[error("Document has not been stored yet")]
    NotStored,

    #[error("Document already stored as {document_id}")]
    AlreadyStored { document_id: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} from {operation}: {body}")]
    HttpStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("SOAP fault ({code}): {message}")]
    SoapFault { code: String, message: String },

    #[error("{operation} failed ({status_code}): {message}")]
    OperationFailed {
        operation: String,
        status_code: String,
        message: String,
    },

    #[error("Malformed SOAP response: {message}")]
    MalformedResponse { message: String },

    #[error("XML parse error: {0}")]
    XmlError(#[from] roxmltree::Error),

    #[error("Base64 decode error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::DocumentNotFound { .. })
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StorageError::DocumentNotFound { .. } => {
                "The document may have been deleted; check the id or store the file again"
            }
            StorageError::NotStored => "Call store before reading or deleting the document",
            StorageError::AlreadyStored { .. } => {
                "Create a new handle through the storage to upload another file"
            }
            StorageError::ApiError(_) | StorageError::HttpStatus { .. } => {
                "Check network connectivity and the configured endpoint"
            }
            StorageError::SoapFault { .. } => {
                "Check the username, password (with security token) and API access of the user"
            }
            StorageError::OperationFailed { .. } => {
                "Check the folder id and the user's permissions on Document records"
            }
            StorageError::MalformedResponse { .. }
            | StorageError::XmlError(_)
            | StorageError::DecodeError(_) => {
                "The endpoint did not answer like a Salesforce partner SOAP API"
            }
            StorageError::IoError(_) => "Check that the input file exists and is readable",
            StorageError::ConfigError { .. }
            | StorageError::MissingConfigError { .. }
            | StorageError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or the SF_* environment variables"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StorageError::DocumentNotFound { document_id } => {
                format!("No Salesforce document with id {}", document_id)
            }
            StorageError::SoapFault { message, .. } => format!("Salesforce rejected the request: {}", message),
            StorageError::MissingConfigError { field } => format!("Missing setting: {}", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        let err = StorageError::DocumentNotFound {
            document_id: "015000000000001".to_string(),
        };
        assert!(err.is_not_found());
        assert!(err.user_friendly_message().contains("015000000000001"));
        assert!(!StorageError::NotStored.is_not_found());
    }

    #[test]
    fn test_fault_message() {
        let err = StorageError::SoapFault {
            code: "sf:INVALID_LOGIN".to_string(),
            message: "Invalid username".to_string(),
        };
        assert_eq!(err.to_string(), "SOAP fault (sf:INVALID_LOGIN): Invalid username");
    }
}
