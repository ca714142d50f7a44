use crate::utils::error::{Result, StorageError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(StorageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(StorageError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(StorageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StorageError::InvalidConfigValueError {
            field: field_name.to_string(),
            // never echo secrets back
            value: String::new(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Salesforce record ids are 15 (case-sensitive) or 18 (case-safe) alphanumeric characters.
pub fn validate_salesforce_id(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if value.len() != 15 && value.len() != 18 {
        return Err(StorageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Salesforce ids are 15 or 18 characters long".to_string(),
        });
    }

    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StorageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Salesforce ids can only contain letters and digits".to_string(),
        });
    }

    Ok(())
}
