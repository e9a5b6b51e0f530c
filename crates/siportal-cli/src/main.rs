//! Siportal CLI: manage the image list of one record from the command line.
//!
//! Storage is configured through the environment (see `Config::from_env`);
//! the image list lives in a JSON file given with `--list`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use siportal_cli::{init_tracing, load_images, print_then_finish, JsonListWriter};
use siportal_core::{AppError, Config, ErrorMetadata, ImageFile};
use siportal_services::{create_storage, ImageUploader, UploaderSettings};

#[derive(Parser)]
#[command(name = "siportal", about = "Siportal image list CLI")]
struct Cli {
    /// JSON file holding the image URL list
    #[arg(long, global = true, default_value = "images.json")]
    list: PathBuf,
    /// Owner of the uploaded images (user or record id)
    #[arg(long, global = true, env = "SIPORTAL_OWNER_ID")]
    owner: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload image files and append them to the list
    Upload {
        /// Image files, uploaded in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Override the maximum number of images
        #[arg(long)]
        max_images: Option<usize>,
    },
    /// Delete the image at a position (0-based) and drop it from the list
    Remove {
        /// Position in the list
        index: usize,
    },
    /// Print the current list
    List,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Turn a service error into a CLI error carrying the form's message.
fn user_error(err: AppError) -> anyhow::Error {
    anyhow::anyhow!("{} [{}]", err.client_message(), err.error_code())
}

async fn build_uploader(
    config: &Config,
    owner: Option<String>,
    max_images: Option<usize>,
) -> anyhow::Result<ImageUploader> {
    let owner = owner.context("--owner (or SIPORTAL_OWNER_ID) is required")?;
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;

    let mut settings = UploaderSettings::from_config(owner, config).map_err(user_error)?;
    if let Some(max_images) = max_images {
        settings = settings.with_max_images(max_images);
    }

    Ok(ImageUploader::new(storage, settings))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    match cli.command {
        Commands::Upload { files, max_images } => {
            let uploader = build_uploader(&config, cli.owner, max_images).await?;
            let current = load_images(&cli.list)?;

            let mut batch = Vec::with_capacity(files.len());
            for path in &files {
                let file = ImageFile::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                batch.push(file);
            }

            let writer = JsonListWriter::new(&cli.list);
            let outcome = uploader
                .select_and_upload(&current, batch, &writer)
                .await
                .map_err(user_error)?;
            print_then_finish(&outcome, writer, &mut std::io::stdout())?;
        }
        Commands::Remove { index } => {
            let uploader = build_uploader(&config, cli.owner, None).await?;
            let current = load_images(&cli.list)?;

            let writer = JsonListWriter::new(&cli.list);
            let images = uploader
                .remove_image(&current, index, &writer)
                .await
                .map_err(user_error)?;
            print_then_finish(&images, writer, &mut std::io::stdout())?;
        }
        Commands::List => {
            let images = load_images(&cli.list)?;
            print_json(&images)?;
        }
    }

    Ok(())
}
