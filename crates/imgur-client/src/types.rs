//! Request and response types for the Imgur upload API

use base64::Engine;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ImgurError, Result};

// =============================================================================
// Upload Request
// =============================================================================

/// Image upload request
///
/// `image` carries the base64-encoded image. Every other field is optional and
/// left out of the form body when unset or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UploadRequest {
    /// Create a request from an already base64-encoded image
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    /// Create a request from raw image bytes
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self::new(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the `type` parameter (e.g. `base64`, `file`, `url`)
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the request can be sent
    pub fn validate(&self) -> Result<()> {
        if self.image.is_empty() {
            return Err(ImgurError::InvalidRequest(
                "image must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Non-empty form fields, in wire order
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let optional = [
            ("album", &self.album),
            ("type", &self.media_type),
            ("name", &self.name),
            ("title", &self.title),
            ("description", &self.description),
        ];

        let mut fields = vec![("image", self.image.as_str())];
        fields.extend(optional.into_iter().filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        }));
        fields
    }

    /// Encode as an `application/x-www-form-urlencoded` body
    pub fn to_form_body(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.form_fields() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

// =============================================================================
// Response Payloads
// =============================================================================

/// Image metadata returned by a successful upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessData {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Upload time in unix seconds
    #[serde(default)]
    pub datetime: i64,
    #[serde(default, rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub bandwidth: u64,
    #[serde(default)]
    pub vote: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub nsfw: Option<bool>,
    #[serde(default)]
    pub section: Option<String>,
    /// Secret needed to delete this image later
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletehash: Option<String>,
    pub link: String,
    #[serde(default)]
    pub in_gallery: bool,
}

/// Error payload returned for any non-200 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    /// Error message; an object-shaped `error` is reduced to its `message`
    #[serde(deserialize_with = "deserialize_error_message")]
    pub error: String,
    #[serde(default)]
    pub request: String,
    #[serde(default)]
    pub method: String,
}

/// Imgur sends `error` either as a plain string or as
/// `{ "code": ..., "message": ..., "type": ... }`
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    Message(String),
    Detail { message: String },
}

fn deserialize_error_message<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ErrorMessage::deserialize(deserializer)? {
        ErrorMessage::Message(message) => message,
        ErrorMessage::Detail { message } => message,
    })
}

/// Payload of an upload response, selected by HTTP status
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UploadData {
    Success(SuccessData),
    Error(ErrorData),
}

/// Decoded upload response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    pub data: UploadData,
    /// `success` flag as reported by Imgur
    pub success: bool,
    /// `status` as reported by Imgur
    pub status: i64,
}

impl UploadResult {
    /// Whether the response carried image metadata
    pub fn is_success(&self) -> bool {
        matches!(self.data, UploadData::Success(_))
    }

    pub fn success_data(&self) -> Option<&SuccessData> {
        match &self.data {
            UploadData::Success(data) => Some(data),
            UploadData::Error(_) => None,
        }
    }

    pub fn error_data(&self) -> Option<&ErrorData> {
        match &self.data {
            UploadData::Error(data) => Some(data),
            UploadData::Success(_) => None,
        }
    }
}

/// `{ "data": ..., "success": ..., "status": ... }`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: i64,
}

fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>> {
    serde_json::from_slice(body).map_err(|e| ImgurError::Decoding(e.to_string()))
}

/// Decode an upload response body.
///
/// The HTTP status decides the shape of `data`: 200 is image metadata,
/// anything else is an error payload. A non-200 status is not an error here.
pub fn decode_upload_response(status: StatusCode, body: &[u8]) -> Result<UploadResult> {
    if status == StatusCode::OK {
        let envelope = decode_envelope::<SuccessData>(body)?;
        Ok(UploadResult {
            data: UploadData::Success(envelope.data),
            success: envelope.success,
            status: envelope.status,
        })
    } else {
        let envelope = decode_envelope::<ErrorData>(body)?;
        Ok(UploadResult {
            data: UploadData::Error(envelope.data),
            success: envelope.success,
            status: envelope.status,
        })
    }
}

/// Decode a delete response body
pub fn decode_delete_response(status: StatusCode, body: &[u8]) -> Result<()> {
    if status == StatusCode::OK {
        let envelope = decode_envelope::<serde_json::Value>(body)?;
        if envelope.success {
            return Ok(());
        }
        let error = serde_json::from_value::<ErrorData>(envelope.data)
            .map_err(|e| ImgurError::Decoding(e.to_string()))?;
        return Err(ImgurError::Remote {
            status: status.as_u16(),
            error,
        });
    }

    let envelope = decode_envelope::<ErrorData>(body)?;
    Err(ImgurError::Remote {
        status: status.as_u16(),
        error: envelope.data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_only_form() {
        let req = UploadRequest::new("aGVsbG8=");
        assert_eq!(req.form_fields(), vec![("image", "aGVsbG8=")]);
        assert_eq!(req.to_form_body(), "image=aGVsbG8%3D");
    }

    #[test]
    fn test_empty_optionals_are_omitted() {
        let req = UploadRequest::new("abc").with_album("").with_title("");
        assert_eq!(req.to_form_body(), "image=abc");
    }

    #[test]
    fn test_full_form() {
        let req = UploadRequest::new("a+b/c=")
            .with_album("alb1")
            .with_media_type("base64")
            .with_name("cat.png")
            .with_title("My cat")
            .with_description("sleeping & dreaming");

        let body = req.to_form_body();
        assert_eq!(
            body,
            "image=a%2Bb%2Fc%3D&album=alb1&type=base64&name=cat.png&title=My+cat&description=sleeping+%26+dreaming"
        );

        let decoded: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(decoded.len(), 6);
        assert_eq!(decoded[0], ("image".to_string(), "a+b/c=".to_string()));
        assert_eq!(
            decoded[5],
            ("description".to_string(), "sleeping & dreaming".to_string())
        );
    }

    #[test]
    fn test_from_bytes_encodes_base64() {
        let req = UploadRequest::from_bytes(b"hello");
        assert_eq!(req.image, "aGVsbG8=");
    }

    #[test]
    fn test_validate_rejects_empty_image() {
        let err = UploadRequest::default().validate().unwrap_err();
        assert!(matches!(err, ImgurError::InvalidRequest(_)));
        assert!(UploadRequest::new("x").validate().is_ok());
    }

    #[test]
    fn test_decode_success() {
        let body = br#"{
            "data": {
                "id": "orunSTu",
                "title": null,
                "description": null,
                "datetime": 1495556889,
                "type": "image/gif",
                "animated": false,
                "width": 1,
                "height": 1,
                "size": 42,
                "views": 0,
                "bandwidth": 0,
                "vote": null,
                "favorite": false,
                "nsfw": null,
                "section": null,
                "account_url": null,
                "deletehash": "x70po4w7BVvSUzZ",
                "name": "",
                "link": "http://i.imgur.com/orunSTu.gif",
                "in_gallery": false
            },
            "success": true,
            "status": 200
        }"#;

        let result = decode_upload_response(StatusCode::OK, body).unwrap();
        assert!(result.is_success());
        assert!(result.success);
        assert_eq!(result.status, 200);

        let data = result.success_data().unwrap();
        assert_eq!(data.id, "orunSTu");
        assert_eq!(data.title, None);
        assert_eq!(data.datetime, 1495556889);
        assert_eq!(data.media_type, "image/gif");
        assert_eq!(data.size, 42);
        assert_eq!(data.deletehash.as_deref(), Some("x70po4w7BVvSUzZ"));
        assert_eq!(data.link, "http://i.imgur.com/orunSTu.gif");
    }

    #[test]
    fn test_decode_error_by_status() {
        let body = br#"{"data":{"error":"bad image","request":"/3/image","method":"POST"},"success":false,"status":400}"#;
        let result = decode_upload_response(StatusCode::BAD_REQUEST, body).unwrap();

        assert!(!result.is_success());
        assert_eq!(
            result.error_data(),
            Some(&ErrorData {
                error: "bad image".to_string(),
                request: "/3/image".to_string(),
                method: "POST".to_string(),
            })
        );
        assert_eq!(result.status, 400);
    }

    #[test]
    fn test_decode_object_shaped_error() {
        let body = br#"{
            "data": {
                "error": {
                    "code": 1003,
                    "message": "File type invalid (1)",
                    "type": "ImgurException",
                    "exception": []
                },
                "request": "/3/image",
                "method": "POST"
            },
            "success": false,
            "status": 400
        }"#;

        let result = decode_upload_response(StatusCode::BAD_REQUEST, body).unwrap();
        let error = result.error_data().unwrap();
        assert_eq!(error.error, "File type invalid (1)");
        assert_eq!(error.request, "/3/image");
        assert_eq!(error.method, "POST");
    }

    #[test]
    fn test_status_not_payload_drives_decoding() {
        // An error-shaped body under 200 has no `id`/`link`, so it fails as SuccessData
        let body = br#"{"data":{"error":"bad image","request":"/3/image","method":"POST"},"success":false,"status":400}"#;
        let err = decode_upload_response(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, ImgurError::Decoding(_)));
    }

    #[test]
    fn test_decode_non_json() {
        let err = decode_upload_response(StatusCode::OK, b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, ImgurError::Decoding(_)));

        let err = decode_upload_response(StatusCode::BAD_GATEWAY, b"").unwrap_err();
        assert!(matches!(err, ImgurError::Decoding(_)));
    }

    #[test]
    fn test_decode_delete() {
        let ok = br#"{"data":true,"success":true,"status":200}"#;
        assert!(decode_delete_response(StatusCode::OK, ok).is_ok());

        let denied = br#"{"data":{"error":"Permission denied","request":"/3/image/abc","method":"DELETE"},"success":false,"status":403}"#;
        match decode_delete_response(StatusCode::FORBIDDEN, denied) {
            Err(ImgurError::Remote { status, error }) => {
                assert_eq!(status, 403);
                assert_eq!(error.method, "DELETE");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
