//! Authorize-url command

use anyhow::Result;
use imgur_client::ImgurUploader;

use crate::output::OutputContext;

/// Print the URL a user opens to grant this application access
pub fn authorize_url(
    uploader: &ImgurUploader,
    response_type: &str,
    state: Option<&str>,
    ctx: &OutputContext,
) -> Result<()> {
    let url = uploader.authorize_url(response_type, state)?;
    ctx.print_kv(&[("Authorize URL", url.to_string())]);
    Ok(())
}
