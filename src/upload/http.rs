//! HTTP client for a remote media endpoint.
//!
//! Uploads are `POST` multipart requests with `file` and `category` fields;
//! deletions are `DELETE` requests with a JSON body `{ "url": ... }`. Both
//! answer with a [`MediaResponse`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::error::{RemovalError, UploadError};
use crate::observer::RemovalHandler;
use crate::upload::{MediaResponse, UploadFile, Uploader};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Media endpoint reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpMediaClient {
    client: Client,
    endpoint: String,
}

impl HttpMediaClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    /// Use a preconfigured client, e.g. with custom proxy or TLS settings
    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decode an endpoint reply, falling back to the HTTP status when the body
/// is not a media response
fn decode_reply(status: reqwest::StatusCode, body: &str) -> Result<MediaResponse, String> {
    match serde_json::from_str::<MediaResponse>(body) {
        Ok(reply) => Ok(reply),
        Err(_) if !status.is_success() => Err(format!("status {}: {}", status, body.trim())),
        Err(e) => Err(format!("invalid response: {}", e)),
    }
}

#[async_trait]
impl Uploader for HttpMediaClient {
    async fn upload(&self, file: &UploadFile, category: Option<&str>) -> Result<String, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|_| UploadError::UnsupportedType(file.mime.clone()))?;

        let mut form = Form::new().part("file", part);
        if let Some(category) = category {
            form = form.text("category", category.to_string());
        }

        log::debug!("Uploading {} ({} bytes) to {}", file.name, file.size(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        decode_reply(status, &body)
            .map_err(UploadError::Rejected)?
            .into_url()
    }
}

#[async_trait]
impl RemovalHandler for HttpMediaClient {
    async fn on_image_removed(&self, url: &str) -> Result<(), RemovalError> {
        let response = self
            .client
            .delete(&self.endpoint)
            .json(&serde_json::json!({ "url": url }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| RemovalError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemovalError::Network(e.to_string()))?;

        let reply = decode_reply(status, &body).map_err(RemovalError::Rejected)?;
        if reply.success {
            Ok(())
        } else {
            Err(RemovalError::Rejected(reply.error_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn client(endpoint: &str) -> HttpMediaClient {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpMediaClient::with_client(endpoint, client)
    }

    /// Read one HTTP/1.1 request: head plus a sized or chunked body
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let head = text[..head_end].to_lowercase();
                let body_len = buf.len() - head_end - 4;
                let content_length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok());
                let done = match content_length {
                    Some(len) => body_len >= len,
                    None if head.contains("transfer-encoding: chunked") => {
                        text.ends_with("0\r\n\r\n")
                    }
                    None => true,
                };
                if done {
                    return text;
                }
            }
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return String::from_utf8_lossy(&buf).into_owned();
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Accept a single request and answer it with `status` and `body`
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api/media", listener.local_addr().unwrap());
        let reply = format!(
            "HTTP/1.1 {}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (endpoint, handle)
    }

    fn body_of(request: &str) -> &str {
        request.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
    }

    #[tokio::test]
    async fn test_upload_posts_multipart_file_and_category() {
        let (endpoint, server) =
            serve_once("200 OK", r#"{"success":true,"url":"/media/workshops/a.png"}"#).await;
        let file = UploadFile::new("a.png", "image/png", vec![0x89, b'P', b'N', b'G']);

        let url = client(&endpoint)
            .upload(&file, Some("workshops"))
            .await
            .unwrap();
        assert_eq!(url, "/media/workshops/a.png");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/media HTTP/1.1\r\n"));
        assert!(request.to_lowercase().contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains("name=\"file\"; filename=\"a.png\""));
        assert!(request.to_lowercase().contains("content-type: image/png"));
        assert!(request.contains("name=\"category\"\r\n\r\nworkshops"));
    }

    #[tokio::test]
    async fn test_upload_without_category_sends_only_the_file() {
        let (endpoint, server) =
            serve_once("200 OK", r#"{"success":true,"url":"/media/general/a.png"}"#).await;
        let file = UploadFile::new("a.png", "image/png", vec![1, 2, 3]);

        client(&endpoint).upload(&file, None).await.unwrap();
        let request = server.await.unwrap();
        assert!(request.contains("name=\"file\""));
        assert!(!request.contains("name=\"category\""));
    }

    #[tokio::test]
    async fn test_upload_rejection_carries_endpoint_error() {
        let (endpoint, server) =
            serve_once("400 Bad Request", r#"{"success":false,"error":"nope"}"#).await;
        let file = UploadFile::new("a.png", "image/png", vec![1]);

        let err = client(&endpoint).upload(&file, None).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected(ref msg) if msg == "nope"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_non_json_server_error_uses_status() {
        let (endpoint, server) = serve_once("502 Bad Gateway", "upstream down").await;
        let file = UploadFile::new("a.png", "image/png", vec![1]);

        let err = client(&endpoint).upload(&file, None).await.unwrap_err();
        match err {
            UploadError::Rejected(msg) => assert!(msg.starts_with("status 502"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api/media", listener.local_addr().unwrap());
        drop(listener);
        let file = UploadFile::new("a.png", "image/png", vec![1]);

        let err = client(&endpoint).upload(&file, None).await.unwrap_err();
        assert!(matches!(err, UploadError::Network(_)));
    }

    #[tokio::test]
    async fn test_removal_sends_delete_with_json_url() {
        let (endpoint, server) = serve_once("200 OK", r#"{"success":true}"#).await;

        client(&endpoint)
            .on_image_removed("/media/general/a.png")
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /api/media HTTP/1.1\r\n"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        let body: serde_json::Value = serde_json::from_str(body_of(&request)).unwrap();
        assert_eq!(body, serde_json::json!({ "url": "/media/general/a.png" }));
    }

    #[tokio::test]
    async fn test_removal_rejections() {
        let (endpoint, server) =
            serve_once("200 OK", r#"{"success":false,"error":"in use"}"#).await;
        let err = client(&endpoint).on_image_removed("/m/a.png").await.unwrap_err();
        assert!(matches!(err, RemovalError::Rejected(ref msg) if msg == "in use"));
        server.await.unwrap();

        let (endpoint, server) = serve_once("500 Internal Server Error", "boom").await;
        let err = client(&endpoint).on_image_removed("/m/a.png").await.unwrap_err();
        assert!(matches!(err, RemovalError::Rejected(ref msg) if msg.starts_with("status 500")));
        server.await.unwrap();
    }

    #[test]
    fn test_decode_reply_prefers_body() {
        let reply = decode_reply(StatusCode::BAD_REQUEST, r#"{"success":false,"error":"nope"}"#)
            .unwrap();
        assert_eq!(reply.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_decode_reply_falls_back_to_status() {
        let err = decode_reply(StatusCode::BAD_GATEWAY, "upstream down\n").unwrap_err();
        assert_eq!(err, "status 502 Bad Gateway: upstream down");
    }

    #[test]
    fn test_decode_reply_rejects_garbage_on_success() {
        let err = decode_reply(StatusCode::OK, "<html>").unwrap_err();
        assert!(err.starts_with("invalid response"));
    }
}
