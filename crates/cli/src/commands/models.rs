//! Model lifecycle CLI commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{
    ApiClient, AvailableModelList, LoadResponse, LoadedModelList, ModelSelector, UnloadAllResponse,
};
use crate::output::{format_timestamp, print_success, print_warning, OutputFormat};

/// Row for the available-models table
#[derive(Tabled)]
struct AvailableRow {
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Model")]
    model_name: String,
    #[tabled(rename = "Hub Path")]
    path: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Row for the loaded-models table
#[derive(Tabled)]
struct LoadedRow {
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Model")]
    model_name: String,
    #[tabled(rename = "Shape")]
    shape: String,
    #[tabled(rename = "Checksum")]
    checksum: String,
    #[tabled(rename = "Loaded")]
    loaded_at: String,
    #[tabled(rename = "Last Used")]
    last_used: String,
}

/// List the registry of approved models, optionally filtered by task
pub async fn list_available(
    client: &ApiClient,
    task: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let path = match &task {
        Some(t) => format!("models/available?task={}", t),
        None => "models/available".to_string(),
    };
    let result: AvailableModelList = client.get(&path).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.models)?);
        }
        OutputFormat::Table => {
            if result.models.is_empty() {
                print_warning("No models registered");
                return Ok(());
            }
            let rows: Vec<AvailableRow> = result
                .models
                .iter()
                .map(|m| AvailableRow {
                    task: m.task.clone(),
                    model_name: m.model_name.clone(),
                    path: m.path.clone(),
                    description: m.description.clone().unwrap_or_default(),
                })
                .collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

/// List models currently resident in the engine cache
pub async fn list_loaded(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: LoadedModelList = client.get("models/loaded").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.models)?);
        }
        OutputFormat::Table => {
            if result.models.is_empty() {
                print_warning("No models loaded");
                return Ok(());
            }
            let rows: Vec<LoadedRow> = result
                .models
                .iter()
                .map(|m| LoadedRow {
                    task: m.task.clone(),
                    model_name: m.model_name.clone(),
                    shape: m.shape.clone(),
                    checksum: m
                        .checksum
                        .as_deref()
                        .map(truncate_checksum)
                        .unwrap_or_default(),
                    loaded_at: format_timestamp(m.loaded_at),
                    last_used: format_timestamp(m.last_used),
                })
                .collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

/// Load a model into the engine
pub async fn load(
    client: &ApiClient,
    task: &str,
    model_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let selector = ModelSelector {
        task: task.to_string(),
        model_name: model_name.to_string(),
    };
    let response: LoadResponse = client.post("models/load", &selector).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            print_success(&format!("Model {} loaded for task {}", model_name, task));
        }
    }

    Ok(())
}

/// Unload one model
pub async fn unload(
    client: &ApiClient,
    task: &str,
    model_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let selector = ModelSelector {
        task: task.to_string(),
        model_name: model_name.to_string(),
    };
    let response: LoadResponse = client.post("models/unload", &selector).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            print_success(&format!("Model {} unloaded from task {}", model_name, task));
        }
    }

    Ok(())
}

/// Unload every model
pub async fn unload_all(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let response: UnloadAllResponse = client
        .post("models/unload-all", &serde_json::json!({}))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            print_success(&format!("Unloaded {} models", response.unloaded));
        }
    }

    Ok(())
}

/// Truncate a checksum for display
fn truncate_checksum(checksum: &str) -> String {
    if checksum.len() > 12 {
        format!("{}...", &checksum[..12])
    } else {
        checksum.to_string()
    }
}
