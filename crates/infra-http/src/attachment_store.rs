// Drive upload endpoint adapter
//
// POST {filename, mimeType, base64, folderName} -> {status, viewLink} | {status, message}.
// The endpoint answers 200 even when the upload failed, so `status` is checked too.

use crate::client::{error_for_status, map_reqwest_error};
use async_trait::async_trait;
use cctv_core::error::{AppError, Result};
use cctv_core::port::{AttachmentStore, AttachmentUpload};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "Attachment store";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody<'a> {
    filename: &'a str,
    mime_type: &'a str,
    base64: &'a str,
    folder_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    status: String,
    #[serde(default)]
    view_link: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpAttachmentStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAttachmentStore {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AttachmentStore for HttpAttachmentStore {
    async fn upload(&self, upload: &AttachmentUpload) -> Result<String> {
        let body = UploadBody {
            filename: &upload.filename,
            mime_type: &upload.mime_type,
            base64: &upload.base64,
            folder_name: &upload.folder_name,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(SERVICE, e))?;
        let response = error_for_status(SERVICE, response).await?;

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| map_reqwest_error(SERVICE, e))?;

        match (parsed.status.as_str(), parsed.view_link) {
            ("success", Some(link)) => {
                debug!(
                    filename = %upload.filename,
                    folder = %upload.folder_name,
                    "Attachment stored"
                );
                Ok(link)
            }
            ("success", None) => Err(AppError::Upstream(format!(
                "{} reported success without a link for {}",
                SERVICE, upload.filename
            ))),
            (status, _) => Err(AppError::Upstream(format!(
                "{} rejected {} ({}): {}",
                SERVICE,
                upload.filename,
                status,
                parsed.message.unwrap_or_default()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_client;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn upload(base64: &str) -> AttachmentUpload {
        AttachmentUpload {
            filename: "scene.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            base64: base64.to_string(),
            folder_name: "REQ-20240501-4242".to_string(),
        }
    }

    fn store(url: String) -> HttpAttachmentStore {
        HttpAttachmentStore::new(build_client(Duration::from_secs(5)).unwrap(), url)
    }

    #[tokio::test]
    async fn test_upload_returns_view_link() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_body(Matcher::Json(json!({
                "filename": "scene.jpg",
                "mimeType": "image/jpeg",
                "base64": "aGVsbG8=",
                "folderName": "REQ-20240501-4242"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","viewLink":"https://drive.example/file/abc/view"}"#)
            .create_async()
            .await;

        let link = store(format!("{}/upload", server.url()))
            .upload(&upload("aGVsbG8="))
            .await
            .unwrap();

        assert_eq!(link, "https://drive.example/file/abc/view");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_in_body_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"status":"error","message":"Folder quota exceeded"}"#)
            .create_async()
            .await;

        let err = store(server.url()).upload(&upload("aGVsbG8=")).await.unwrap_err();
        match err {
            AppError::Upstream(msg) => assert!(msg.contains("Folder quota exceeded"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_failure_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = store(server.url()).upload(&upload("aGVsbG8=")).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref m) if m.contains("502")));
    }
}
