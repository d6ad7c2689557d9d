//! PharmQ CLI
//!
//! A command-line tool for managing engine models and running therapeutic
//! predictions against a running pharmq-engine instance.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{models, predict};

/// PharmQ Engine CLI
#[derive(Parser)]
#[command(name = "pharmq")]
#[command(author, version, about = "CLI for the PharmQ prediction engine", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via PHARMQ_API_URL env var)
    #[arg(long, env = "PHARMQ_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage engine models
    #[command(subcommand)]
    Models(ModelCommands),

    /// Run predictions
    #[command(subcommand)]
    Predict(PredictCommands),

    /// Show engine health
    Status,
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// List the registry of approved models
    List {
        /// Filter by task (DTI, DTA, DDI, ADMET, Similarity)
        #[arg(long, short)]
        task: Option<String>,
    },

    /// List models currently loaded in the engine
    Loaded,

    /// Load a model for a task
    Load {
        /// Task name (DTI, DTA, DDI, ADMET, Similarity)
        task: String,

        /// Registered model name
        model_name: String,
    },

    /// Unload a model from a task
    Unload {
        /// Task name
        task: String,

        /// Registered model name
        model_name: String,
    },

    /// Unload every loaded model
    UnloadAll,
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Predict drug-target interaction probability
    Dti {
        /// Drug SMILES string
        #[arg(long)]
        drug: String,

        /// Target protein sequence
        #[arg(long)]
        target: String,
    },

    /// Predict drug-target binding affinity
    Dta {
        /// Drug SMILES string
        #[arg(long)]
        drug: String,

        /// Target protein sequence
        #[arg(long)]
        target: String,

        /// Affinity measurement type (IC50, Kd, Ki)
        #[arg(long)]
        affinity_type: Option<String>,
    },

    /// Predict drug-drug interaction
    Ddi {
        /// First drug SMILES string
        #[arg(long)]
        drug1: String,

        /// Second drug SMILES string
        #[arg(long)]
        drug2: String,
    },

    /// Predict ADMET properties
    Admet {
        /// Drug SMILES string
        #[arg(long)]
        drug: String,

        /// Comma-separated property names
        #[arg(long, value_delimiter = ',')]
        properties: Vec<String>,
    },

    /// Search for similar molecules
    Similarity {
        /// Query SMILES string
        #[arg(long)]
        query: String,

        /// Minimum similarity threshold
        #[arg(long, default_value = "0.7")]
        threshold: f32,

        /// Similarity method
        #[arg(long, default_value = "cosine")]
        method: String,

        /// Maximum number of results
        #[arg(long, default_value = "10")]
        max_results: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Models(cmd) => match cmd {
            ModelCommands::List { task } => {
                models::list_available(&client, task, cli.format).await?;
            }
            ModelCommands::Loaded => {
                models::list_loaded(&client, cli.format).await?;
            }
            ModelCommands::Load { task, model_name } => {
                models::load(&client, &task, &model_name, cli.format).await?;
            }
            ModelCommands::Unload { task, model_name } => {
                models::unload(&client, &task, &model_name, cli.format).await?;
            }
            ModelCommands::UnloadAll => {
                models::unload_all(&client, cli.format).await?;
            }
        },
        Commands::Predict(cmd) => match cmd {
            PredictCommands::Dti { drug, target } => {
                predict::dti(&client, &drug, &target, cli.format).await?;
            }
            PredictCommands::Dta {
                drug,
                target,
                affinity_type,
            } => {
                predict::dta(&client, &drug, &target, affinity_type, cli.format).await?;
            }
            PredictCommands::Ddi { drug1, drug2 } => {
                predict::ddi(&client, &drug1, &drug2, cli.format).await?;
            }
            PredictCommands::Admet { drug, properties } => {
                predict::admet(&client, &drug, properties, cli.format).await?;
            }
            PredictCommands::Similarity {
                query,
                threshold,
                method,
                max_results,
            } => {
                predict::similarity(&client, &query, threshold, &method, max_results, cli.format)
                    .await?;
            }
        },
        Commands::Status => {
            let health: client::HealthResponse = client.get("healthz").await?;
            match cli.format {
                output::OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&health)?);
                }
                output::OutputFormat::Table => {
                    println!("Engine status: {}", output::color_status(&health.status));
                    println!("Models loaded: {}", health.models_loaded);
                    for (name, component) in &health.components {
                        let detail = component
                            .message
                            .as_deref()
                            .map(|m| format!(" ({})", m))
                            .unwrap_or_default();
                        println!(
                            "  {}: {}{}",
                            name,
                            output::color_status(&component.status),
                            detail
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
