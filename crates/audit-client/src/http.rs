//! JSON-over-HTTP protocol layer
//!
//! [`HttpBackend`] owns URL building, status checks and response decoding.
//! The actual POST is delegated to a [`Transport`] (browser `fetch` in the
//! web build, a scripted fake in tests).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use audit_types::{
    CategoriesRequest, CategoriesResponse, ChatRequest, ChatResponse, DocumentRequest, Endpoint,
    FileInfo, KeyFindings, KeyFindingsResponse, SummaryResponse, UploadRequest, UploadResponse,
    VulnerabilitiesResponse, Vulnerability,
};

use crate::backend::AuditBackend;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait Transport {
    /// POST a JSON body. Returns `Err` only when no response was received.
    async fn post_json(&self, url: &str, body: String) -> Result<HttpReply>;
}

pub struct HttpBackend<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> HttpBackend<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn post<Req, Resp>(&self, endpoint: Endpoint, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.config.endpoint_url(&endpoint);
        let payload = serde_json::to_string(body)
            .map_err(|e| ClientError::Transport(format!("failed to encode body: {}", e)))?;

        debug!(endpoint = endpoint.name(), bytes = payload.len(), "POST {}", url);
        let reply = self.transport.post_json(&url, payload).await?;

        if !reply.is_success() {
            return Err(ClientError::Status {
                endpoint: endpoint.name(),
                status: reply.status,
            });
        }

        serde_json::from_str(&reply.body).map_err(|e| ClientError::Decode {
            endpoint: endpoint.name(),
            message: e.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl<T: Transport> AuditBackend for HttpBackend<T> {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse> {
        self.post(Endpoint::Upload, request).await
    }

    async fn file_info(&self, document_id: &str) -> Result<FileInfo> {
        self.post(
            Endpoint::FileInfo(document_id.to_string()),
            &DocumentRequest::new(document_id),
        )
        .await
    }

    async fn summarize(&self, document_id: &str) -> Result<String> {
        let response: SummaryResponse = self
            .post(Endpoint::Summarize, &DocumentRequest::new(document_id))
            .await?;
        Ok(response.summary)
    }

    async fn key_findings(&self, document_id: &str) -> Result<KeyFindings> {
        let response: KeyFindingsResponse = self
            .post(Endpoint::KeyFindings, &DocumentRequest::new(document_id))
            .await?;
        Ok(response.findings)
    }

    async fn vulnerabilities(&self, document_id: &str) -> Result<Vec<Vulnerability>> {
        let response: VulnerabilitiesResponse = self
            .post(Endpoint::Vulnerabilities, &DocumentRequest::new(document_id))
            .await?;
        Ok(response.vulnerabilities)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response: ChatResponse = self.post(Endpoint::Chat, request).await?;
        Ok(response.response)
    }

    async fn categories(&self, document_ids: &[String]) -> Result<CategoriesResponse> {
        let request = CategoriesRequest {
            file_list: document_ids.to_vec(),
        };
        self.post(Endpoint::Categories, &request).await
    }
}
