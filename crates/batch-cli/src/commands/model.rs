//! `batch model` commands

use std::path::Path;

use super::print_response;
use crate::api::ApiClient;
use crate::error::{CliError, Result};
use crate::ModelCommand;

pub async fn run(api_url: &str, command: &ModelCommand) -> Result<()> {
    let client = ApiClient::new(api_url)?;

    let response = match command {
        ModelCommand::List => client.list_models().await?,
        ModelCommand::Describe { model_id } => client.get_model(model_id).await?,
        ModelCommand::Create { name, schema_file } => {
            let schema = read_schema(schema_file).await?;
            client.create_model(name, schema).await?
        },
        ModelCommand::Update {
            model_id,
            schema_file,
        } => {
            let schema = read_schema(schema_file).await?;
            client.update_model(model_id, schema).await?
        },
        ModelCommand::Delete { model_id } => client.delete_model(model_id).await?,
    };

    print_response(response)
}

/// Load a schema document. It must be JSON; its shape is not checked.
pub async fn read_schema(path: &Path) -> Result<serde_json::Value> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CliError::file_not_found(path.display().to_string())
        } else {
            CliError::Io(e)
        }
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{"fields": ["id", "amount"]}"#).unwrap();

        let schema = read_schema(&path).await.unwrap();
        assert_eq!(schema["fields"][1], "amount");
    }

    #[tokio::test]
    async fn test_read_schema_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "fields: [id]").unwrap();

        assert!(matches!(read_schema(&path).await, Err(CliError::JsonParse(_))));
    }
}
