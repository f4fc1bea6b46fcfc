//! Upload command - send an image file to Imgur

use anyhow::{Context, Result};
use imgur_client::{CallOptions, ImgurUploader, UploadData, UploadRequest};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::{error_pairs, success_pairs, OutputContext, OutputFormat};

/// Optional metadata for an upload
#[derive(Debug, Clone, Default)]
pub struct UploadArgs {
    pub file: PathBuf,
    pub album: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub media_type: Option<String>,
}

/// Build the request for a file; the name defaults to the file name
pub fn build_request(args: &UploadArgs, image: &[u8]) -> UploadRequest {
    let name = args.name.clone().or_else(|| file_name(&args.file));

    UploadRequest {
        album: args.album.clone(),
        media_type: args.media_type.clone(),
        name,
        title: args.title.clone(),
        description: args.description.clone(),
        ..UploadRequest::from_bytes(image)
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Upload an image file. Returns `false` when Imgur rejected it.
pub async fn upload(
    uploader: &ImgurUploader,
    args: &UploadArgs,
    options: CallOptions,
    ctx: &OutputContext,
) -> Result<bool> {
    let image = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read image file: {}", args.file.display()))?;
    if ctx.shows_progress() {
        ctx.info(&format!(
            "Uploading {} ({} bytes)...",
            args.file.display(),
            image.len()
        ));
    }

    let request = build_request(args, &image);

    let spinner = if ctx.shows_progress() {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Uploading...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = uploader.upload_with(request, options).await;
    spinner.finish_and_clear();
    let result = result.context("Upload failed")?;

    if ctx.format == OutputFormat::Json {
        ctx.print_json(&result);
        return Ok(result.is_success());
    }

    match &result.data {
        UploadData::Success(data) => {
            ctx.success("Upload complete");
            ctx.print_kv(&success_pairs(data));
            Ok(true)
        }
        UploadData::Error(data) => {
            ctx.error("Imgur rejected the upload");
            ctx.print_kv(&error_pairs(result.status, data));
            Ok(false)
        }
    }
}
