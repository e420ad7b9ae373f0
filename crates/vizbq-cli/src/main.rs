mod clients;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vizbq_core::{AppConfig, RunConfig, WriteDisposition};

#[derive(Debug, Parser)]
#[command(name = "vizbq-cli")]
#[command(about = "Annotate bucket images with Cloud Vision and load the results into BigQuery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotate every image in a bucket and load one row per image
    Run {
        /// Project that owns the dataset and is billed for the load job
        #[arg(long, env = "VIZBQ_PROJECT_ID")]
        project_id: String,

        /// Bucket whose objects are annotated
        #[arg(long, env = "VIZBQ_INPUT_BUCKET")]
        input_bucket: String,

        /// Dataset receiving the `gcp_vision_api_annotations` table
        #[arg(long, env = "VIZBQ_OUTPUT_DATASET")]
        output_dataset: String,

        /// Service-account JSON key file
        #[arg(long, env = "VIZBQ_AUTH_FILE")]
        auth_file: PathBuf,

        /// WRITE_TRUNCATE, WRITE_APPEND or WRITE_EMPTY
        #[arg(long, env = "VIZBQ_WRITE_DISPOSITION")]
        write_disposition: WriteDisposition,
    },
    /// Annotate a single image and print its normalized record as JSON
    Inspect {
        /// Image locator, e.g. gs://bucket/object.png
        image_uri: String,

        /// Service-account JSON key file
        #[arg(long, env = "VIZBQ_AUTH_FILE")]
        auth_file: PathBuf,
    },
    /// Print the annotations table schema as JSON
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loads `.env` first so the `env` fallbacks below can see it.
    let config = vizbq_core::load_app_config()?;
    let cli = Cli::parse();
    init_tracing(&config)?;

    match cli.command {
        Commands::Run {
            project_id,
            input_bucket,
            output_dataset,
            auth_file,
            write_disposition,
        } => {
            let run = RunConfig::new(
                &project_id,
                &input_bucket,
                &output_dataset,
                auth_file,
                write_disposition,
            )?;
            run_command(&config, &run).await?;
        }
        Commands::Inspect {
            image_uri,
            auth_file,
        } => inspect_command(&config, &image_uri, &auth_file).await?,
        Commands::Schema => {
            let schema = vizbq_bigquery::annotation_table_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `VIZBQ_LOG_LEVEL`.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log filter \"{}\"", config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn run_command(config: &AppConfig, run: &RunConfig) -> anyhow::Result<()> {
    let auth = clients::authenticator(config, &run.credentials_path)?;
    let storage = clients::storage_client(config, auth.clone())?;
    let vision = clients::vision_client(config, auth.clone())?;
    let bigquery = clients::bigquery_client(config, auth)?;

    let summary = pipeline::run_pipeline(
        &storage,
        &vision,
        &bigquery,
        run,
        config.max_concurrent_annotations,
        config.schema_autodetect,
    )
    .await?;

    tracing::info!(
        table = %summary.table,
        rows = summary.rows,
        job_id = summary.job_id.as_deref().unwrap_or("none"),
        staging_path = %summary.staging_path.display(),
        "load complete"
    );
    Ok(())
}

async fn inspect_command(
    config: &AppConfig,
    image_uri: &str,
    auth_file: &std::path::Path,
) -> anyhow::Result<()> {
    let auth = clients::authenticator(config, auth_file)?;
    let vision = clients::vision_client(config, auth)?;

    let record = pipeline::annotate_one(&vision, image_uri).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

#[cfg(test)]
mod tests;
