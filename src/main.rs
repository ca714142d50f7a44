use clap::Parser;
use salesforce_storage::config::cli::Command;
use salesforce_storage::utils::{logger, validation::Validate};
use salesforce_storage::{CliConfig, SalesforceStorage, StorageError, UploadedFile};
use serde_json::json;

async fn run(config: CliConfig) -> Result<serde_json::Value, StorageError> {
    let salesforce = config.load_salesforce_config()?;
    salesforce.validate()?;
    tracing::debug!("Salesforce config: {:?}", salesforce);

    let storage = SalesforceStorage::new(salesforce);

    match config.command {
        Command::Store { file, store_path } => {
            let store_path = match store_path {
                Some(path) => path,
                None => file.to_string_lossy().into_owned(),
            };
            let document = storage
                .store(&store_path, &UploadedFile::from_path(&file))
                .await?;
            if let Some(expires_at) = document.session().and_then(|s| s.expires_at()) {
                tracing::debug!("Session valid until {}", expires_at);
            }
            Ok(json!({
                "document_id": document.document_id(),
                "folder_id": document.folder_id(),
                "store_path": store_path,
            }))
        }
        Command::Read {
            document_id,
            output,
        } => {
            let mut document = storage.retrieve(document_id.clone());
            let name = document.file_name().await?.to_string();
            let body = document.read().await?;
            let size = body.len();
            if let Some(path) = &output {
                tokio::fs::write(path, body).await?;
            }
            Ok(json!({
                "document_id": document_id,
                "name": name,
                "size": size,
                "output": output,
            }))
        }
        Command::Delete { document_id } => {
            let deleted = storage.retrieve(document_id.clone()).delete().await?;
            Ok(json!({ "document_id": document_id, "deleted": deleted }))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting salesforce-storage CLI");

    match run(config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Operation failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = if e.is_not_found() { 2 } else { 1 };
            std::process::exit(exit_code);
        }
    }
}
