use crate::core::soap::{self, SObject};
use crate::domain::model::{Credentials, Record};
use crate::utils::error::{Result, StorageError};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fmt;

/// Login endpoint for the partner SOAP API.
pub const DEFAULT_ENDPOINT: &str = "https://www.salesforce.com/services/Soap/u/19.0";

#[derive(Debug, Clone)]
pub struct SoapClient {
    http: Client,
    endpoint: String,
}

impl SoapClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Opens a new authenticated session. No retry: failures go straight back to the caller.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        tracing::debug!(
            "Logging in to {} as {}",
            self.endpoint,
            credentials.username
        );

        let envelope = soap::envelope(None, &soap::login_body(credentials));
        let xml = post(&self.http, &self.endpoint, "login", envelope).await?;
        let record = first_result(soap::parse_results(&xml, "login")?, "login")?;

        let server_url = required(&record, "serverUrl", "login")?;
        let session_id = required(&record, "sessionId", "login")?;
        let seconds_valid = record
            .get("sessionSecondsValid")
            .and_then(|s| s.trim().parse::<i64>().ok());

        tracing::debug!("Session established against {}", server_url);

        Ok(Session {
            http: self.http.clone(),
            server_url,
            session_id,
            established_at: Utc::now(),
            seconds_valid,
        })
    }
}

/// An authenticated connection bound to the instance `serverUrl` returned by login.
#[derive(Clone)]
pub struct Session {
    http: Client,
    server_url: String,
    session_id: String,
    established_at: DateTime<Utc>,
    seconds_valid: Option<i64>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("server_url", &self.server_url)
            .field("established_at", &self.established_at)
            .field("seconds_valid", &self.seconds_valid)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// When the org will expire the session if it stays idle. Informational only.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.seconds_valid
            .and_then(TimeDelta::try_seconds)
            .map(|valid| self.established_at + valid)
    }

    pub async fn create(&self, sobject: &SObject) -> Result<String> {
        let results = self.call("create", &soap::create_body(sobject)).await?;
        saved_id("create", results)
    }

    pub async fn update(&self, sobject: &SObject) -> Result<String> {
        let results = self.call("update", &soap::update_body(sobject)).await?;
        saved_id("update", results)
    }

    /// Fetches `field_list` of one record; `None` when the org has no such record.
    pub async fn retrieve(
        &self,
        field_list: &[&str],
        entity: &str,
        id: &str,
    ) -> Result<Option<Record>> {
        let results = self
            .call("retrieve", &soap::retrieve_body(field_list, entity, id))
            .await?;
        Ok(results.into_iter().next().flatten())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let results = self.call("delete", &soap::delete_body(id)).await?;
        let record = first_result(results, "delete")?;
        let success = record.get("success") == Some("true");

        if !success {
            tracing::debug!(
                "delete of {} reported failure: {}",
                id,
                record.get("message").unwrap_or_default()
            );
        }
        Ok(success)
    }

    async fn call(&self, operation: &str, body: &str) -> Result<Vec<Option<Record>>> {
        let envelope = soap::envelope(Some(&self.session_id), body);
        let xml = post(&self.http, &self.server_url, operation, envelope).await?;
        soap::parse_results(&xml, operation)
    }
}

async fn post(http: &Client, url: &str, operation: &str, envelope: String) -> Result<String> {
    tracing::debug!("SOAP {} -> {}", operation, url);

    let response = http
        .post(url)
        .header(CONTENT_TYPE, "text/xml; charset=utf-8")
        .header("SOAPAction", operation)
        .body(envelope)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    tracing::debug!("SOAP {} response status: {}", operation, status);

    if !status.is_success() {
        // faults arrive as HTTP 500 with a SOAP body
        return Err(soap::fault(&text).unwrap_or_else(|| StorageError::HttpStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: text,
        }));
    }

    Ok(text)
}

fn first_result(results: Vec<Option<Record>>, operation: &str) -> Result<Record> {
    results
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| StorageError::MalformedResponse {
            message: format!("{} returned no result", operation),
        })
}

fn required(record: &Record, field: &str, operation: &str) -> Result<String> {
    record
        .get(field)
        .map(str::to_string)
        .ok_or_else(|| StorageError::MalformedResponse {
            message: format!("{} result has no {}", operation, field),
        })
}

fn saved_id(operation: &str, results: Vec<Option<Record>>) -> Result<String> {
    let record = first_result(results, operation)?;

    if record.get("success") == Some("true") {
        required(&record, "id", operation)
    } else {
        Err(StorageError::OperationFailed {
            operation: operation.to_string(),
            status_code: record.get("statusCode").unwrap_or("UNKNOWN").to_string(),
            message: record.get("message").unwrap_or_default().to_string(),
        })
    }
}
