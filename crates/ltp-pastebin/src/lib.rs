//! Pastebin adapter: the HTTP side of the paste upload.
//!
//! Speaks the `api_post.php` form contract. One client is built per process
//! and shared by every upload.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use ltp_core::{
    config::OffloadConfig,
    errors::{Error, OffloadError},
    paste::{PasteRequest, PasteResponse, FORM_CONTENT_TYPE, MAX_RESPONSE_BYTES},
    ports::PasteService,
    Result,
};

/// Process-scoped HTTP client for the paste service.
///
/// Holds the connection pool and TLS state; build it once at startup and drop
/// it at shutdown.
#[derive(Debug)]
pub struct PastebinClient {
    http: reqwest::Client,
}

impl PastebinClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("largetextpaste/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;
        tracing::debug!("paste http client initialized");
        Ok(Self { http })
    }

    async fn read_body(mut resp: reqwest::Response) -> std::result::Result<Vec<u8>, OffloadError> {
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(map_transport)? {
            tracing::debug!(bytes = chunk.len(), "paste response chunk");
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(OffloadError::InvalidResponse {
                    reason: format!("response exceeds {MAX_RESPONSE_BYTES} bytes"),
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

impl Drop for PastebinClient {
    fn drop(&mut self) {
        tracing::debug!("paste http client released");
    }
}

#[async_trait]
impl PasteService for PastebinClient {
    async fn upload(
        &self,
        req: &PasteRequest,
        cfg: &OffloadConfig,
    ) -> std::result::Result<PasteResponse, OffloadError> {
        let resp = self
            .http
            .post(&cfg.service_endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .timeout(cfg.upload_timeout)
            .body(req.to_form_body())
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status();
        let body = Self::read_body(resp).await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(OffloadError::Status {
                status: status.as_u16(),
                body: text.trim().chars().take(200).collect(),
            });
        }

        PasteResponse::from_body(body)
    }
}

fn map_transport(e: reqwest::Error) -> OffloadError {
    if e.is_timeout() {
        OffloadError::transport(format!("timed out: {e}"))
    } else if e.is_connect() {
        OffloadError::transport(format!("connect failed: {e}"))
    } else {
        OffloadError::transport(e.to_string())
    }
}
