//! imgur-cli - Command-line tool for uploading images to Imgur

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgur_client::{CallOptions, CancellationToken, ImgurUploader};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::UploadArgs;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "imgur-cli")]
#[command(author, version, about = "Upload images to Imgur")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path (YAML)
    #[arg(short, long, env = "IMGUR_CONFIG")]
    config: Option<PathBuf>,

    /// Imgur application client ID
    #[arg(long, env = "IMGUR_CLIENT_ID")]
    client_id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Abort the request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image file
    Upload {
        /// Image file path
        file: PathBuf,

        /// Album ID (or deletehash for anonymous albums)
        #[arg(long)]
        album: Option<String>,

        /// Image title
        #[arg(long)]
        title: Option<String>,

        /// Image description
        #[arg(long)]
        description: Option<String>,

        /// File name sent to Imgur (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,

        /// Upload type parameter, e.g. base64
        #[arg(long = "type", value_name = "TYPE")]
        media_type: Option<String>,
    },

    /// Delete an image by its delete-hash
    Delete {
        /// Delete-hash returned at upload time
        delete_hash: String,
    },

    /// Print the OAuth authorization URL for this client
    AuthorizeUrl {
        /// OAuth response type: token, code, pin
        #[arg(long, default_value = "token")]
        response_type: String,

        /// Opaque state echoed back by Imgur
        #[arg(long)]
        state: Option<String>,
    },
}


#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let client_config = config::load(cli.config.as_deref(), cli.client_id.as_deref())?;
    let uploader = ImgurUploader::new(client_config).context("Failed to create Imgur client")?;

    let ctx = OutputContext::new(cli.output, cli.no_color, cli.quiet);
    let options = call_options(cli.timeout);

    match cli.command {
        Commands::Upload {
            file,
            album,
            title,
            description,
            name,
            media_type,
        } => {
            let args = UploadArgs {
                file,
                album,
                title,
                description,
                name,
                media_type,
            };
            if !commands::upload(&uploader, &args, options, &ctx).await? {
                std::process::exit(1);
            }
        }

        Commands::Delete { delete_hash } => {
            commands::delete(&uploader, &delete_hash, options, &ctx).await?;
        }

        Commands::AuthorizeUrl {
            response_type,
            state,
        } => {
            commands::authorize_url(&uploader, &response_type, state.as_deref(), &ctx)?;
        }
    }

    Ok(())
}

/// Per-call options: optional deadline, cancelled on Ctrl-C
fn call_options(timeout_secs: Option<u64>) -> CallOptions {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let options = CallOptions::new().with_cancel(token);
    match timeout_secs {
        Some(secs) => options.with_deadline(Duration::from_secs(secs)),
        None => options,
    }
}
