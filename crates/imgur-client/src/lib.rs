//! Imgur Client Library
//!
//! Provides a typed HTTP client for the Imgur image upload API.
//!
//! # Example
//!
//! ```rust,no_run
//! use imgur_client::{ImageHost, ImgurUploader, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let uploader = ImgurUploader::with_client_id("your-client-id")?;
//!
//!     let bytes = std::fs::read("cat.png")?;
//!     let request = UploadRequest::from_bytes(&bytes).with_title("My cat");
//!     let result = uploader.upload(request).await?;
//!
//!     match result.success_data() {
//!         Some(image) => println!("uploaded to {}", image.link),
//!         None => println!("rejected: {:?}", result.error_data()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Response decoding
//!
//! Imgur wraps every payload in `{ "data": ..., "success": ..., "status": ... }`.
//! The HTTP status decides how `data` is read: 200 yields [`SuccessData`],
//! anything else yields [`ErrorData`]. A rejected upload is therefore an
//! `Ok(UploadResult)`, not an `Err`.
//!
//! # Testing
//!
//! The `testing` module runs a local axum stub and points an uploader at it:
//!
//! ```rust,ignore
//! use imgur_client::testing::TestServer;
//!
//! let server = TestServer::start(router).await?;
//! let result = server.uploader.upload(request).await?;
//! ```

mod client;
pub mod config;
mod error;
pub mod testing;
mod types;

pub use client::{CallOptions, ImageHost, ImgurUploader};
pub use config::{ClientConfig, ConfigError, ConfigSource, EnvConfigSource, YamlConfigSource};
pub use error::{ImgurError, Result};
pub use types::*;

// Re-export for callers building CallOptions
pub use tokio_util::sync::CancellationToken;
