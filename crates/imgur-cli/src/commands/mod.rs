//! Command implementations for imgur-cli

pub mod authorize;
pub mod delete;
pub mod upload;

pub use authorize::authorize_url;
pub use delete::delete;
pub use upload::{upload, UploadArgs};
