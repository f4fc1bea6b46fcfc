//! Delete command - remove an uploaded image

use anyhow::{Context, Result};
use imgur_client::{CallOptions, ImgurUploader};

use crate::output::OutputContext;

/// Delete an image by its delete-hash
pub async fn delete(
    uploader: &ImgurUploader,
    delete_hash: &str,
    options: CallOptions,
    ctx: &OutputContext,
) -> Result<()> {
    uploader
        .delete_with(delete_hash, options)
        .await
        .with_context(|| format!("Failed to delete image {}", delete_hash))?;

    ctx.success(&format!("Deleted image {}", delete_hash));
    Ok(())
}
