//! Test utilities for imgur-client
//!
//! Provides a local stand-in for the Imgur API so uploads can be exercised
//! without network access.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::ClientConfig;
use crate::{ImgurUploader, Result};

/// Client ID configured on the uploader of every [`TestServer`]
pub const TEST_CLIENT_ID: &str = "test-client-id";

/// A stub server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub uploader: ImgurUploader,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start a stub server from an axum Router
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::post, Router};
    /// use imgur_client::testing::TestServer;
    ///
    /// let router = Router::new().route("/3/image", post(handler));
    /// let server = TestServer::start(router).await?;
    /// let result = server.uploader.upload(request).await?;
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Start a stub server with custom uploader timeouts
    pub async fn start_with_timeout<S>(
        router: axum::Router<S>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let config = ClientConfig::builder()
            .client_id(TEST_CLIENT_ID)
            .base_url(&format!("http://{}", addr))?
            .request_timeout_ms(timeout.as_millis() as u64)
            .connect_timeout_ms(connect_timeout.as_millis() as u64)
            .build();
        let uploader = ImgurUploader::new(config)?;

        Ok(Self {
            addr,
            uploader,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn uploader(&self) -> &ImgurUploader {
        &self.uploader
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// A success body shaped like a real Imgur upload response
pub fn sample_success_body() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "id": "orunSTu",
            "title": "Test upload",
            "description": null,
            "datetime": 1495556889,
            "type": "image/png",
            "animated": false,
            "width": 1,
            "height": 1,
            "size": 68,
            "views": 0,
            "bandwidth": 0,
            "vote": null,
            "favorite": false,
            "nsfw": null,
            "section": null,
            "account_url": null,
            "account_id": 0,
            "is_ad": false,
            "in_most_viral": false,
            "tags": [],
            "ad_type": 0,
            "ad_url": "",
            "in_gallery": false,
            "deletehash": "x70po4w7BVvSUzZ",
            "name": "",
            "link": "https://i.imgur.com/orunSTu.png"
        },
        "success": true,
        "status": 200
    })
}

/// An error body as Imgur returns it for a rejected upload
pub fn sample_error_body(error: &str, request: &str, method: &str, status: u16) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "error": error,
            "request": request,
            "method": method
        },
        "success": false,
        "status": status
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decode_upload_response;

    #[test]
    fn test_sample_bodies_decode() {
        let body = serde_json::to_vec(&sample_success_body()).unwrap();
        let result = decode_upload_response(reqwest::StatusCode::OK, &body).unwrap();
        assert_eq!(result.success_data().unwrap().id, "orunSTu");

        let body = serde_json::to_vec(&sample_error_body("bad image", "/3/image", "POST", 400)).unwrap();
        let result = decode_upload_response(reqwest::StatusCode::BAD_REQUEST, &body).unwrap();
        assert_eq!(result.error_data().unwrap().error, "bad image");
    }
}
