//! Shared fake backend for the integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use audit_client::{AuditBackend, ClientError, Result};
use audit_types::{
    CategoriesResponse, ChatRequest, FileInfo, IndexMap, KeyFindings, UploadRequest,
    UploadResponse, Vulnerability,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// One recorded backend call: endpoint name and the id or query it carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: &'static str,
    pub detail: String,
}

/// In-memory backend with canned answers.
///
/// Endpoints can be made to fail with a 500 or be held behind a gate until
/// the test releases them.
#[derive(Default)]
pub struct FakeBackend {
    calls: RefCell<Vec<Call>>,
    failing: RefCell<HashSet<&'static str>>,
    gates: RefCell<HashMap<&'static str, Rc<Semaphore>>>,
    upload_requests: RefCell<Vec<UploadRequest>>,
    chat_requests: RefCell<Vec<ChatRequest>>,
    upload_response: RefCell<Option<UploadResponse>>,
    chat_reply: RefCell<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, endpoint: &'static str) {
        self.failing.borrow_mut().insert(endpoint);
    }

    /// Hold calls to `endpoint` until permits are added to the returned gate
    pub fn gate(&self, endpoint: &'static str) -> Rc<Semaphore> {
        self.gates
            .borrow_mut()
            .entry(endpoint)
            .or_insert_with(|| Rc::new(Semaphore::new(0)))
            .clone()
    }

    pub fn respond_to_upload(&self, response: UploadResponse) {
        *self.upload_response.borrow_mut() = Some(response);
    }

    pub fn reply_to_chat(&self, reply: &str) {
        *self.chat_reply.borrow_mut() = Some(reply.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub fn upload_requests(&self) -> Vec<UploadRequest> {
        self.upload_requests.borrow().clone()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.borrow().clone()
    }

    async fn enter(&self, endpoint: &'static str, detail: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call {
            endpoint,
            detail: detail.to_string(),
        });

        let gate = self.gates.borrow().get(endpoint).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if self.failing.borrow().contains(endpoint) {
            return Err(ClientError::Status {
                endpoint,
                status: 500,
            });
        }
        Ok(())
    }
}

pub fn sample_file_info(id: &str) -> FileInfo {
    FileInfo {
        file_name: format!("{}.pdf", id),
        file_size: "2.5 MB".to_string(),
        last_edited: "2023-09-15".to_string(),
        page_count: 42,
        author: "Security Team".to_string(),
        created_at: "2023-09-01".to_string(),
    }
}

pub fn sample_vulnerabilities() -> Vec<Vulnerability> {
    vec![
        Vulnerability {
            description: "Unpatched software with known exploits".to_string(),
            criticality: 9.0,
            reasoning: "Easily exploitable and can lead to full system compromise".to_string(),
            mitigation: "Implement regular patching schedule".to_string(),
        },
        Vulnerability {
            description: "Insufficient network segmentation".to_string(),
            criticality: 6.5,
            reasoning: "Allows lateral movement".to_string(),
            mitigation: "Segment the network".to_string(),
        },
    ]
}

pub fn sample_findings() -> KeyFindings {
    serde_json::from_str(
        r#"{
            "Vulnerabilities": {
                "Critical Issues": {
                    "top_vulnerabilities": ["Unpatched systems", "Weak access controls"],
                    "mitigation_strategies": "Patch management and zero trust"
                }
            }
        }"#,
    )
    .expect("sample findings")
}

#[async_trait(?Send)]
impl AuditBackend for FakeBackend {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse> {
        self.upload_requests.borrow_mut().push(request.clone());
        self.enter("upload", &request.len().to_string()).await?;

        if let Some(response) = self.upload_response.borrow().clone() {
            return Ok(response);
        }
        Ok(match request {
            UploadRequest::Single(payload) => UploadResponse::Single {
                id: format!("id-{}", payload.filename),
            },
            UploadRequest::Batch { files } => UploadResponse::Batch {
                ids: files
                    .iter()
                    .map(|f| {
                        let mut entry = IndexMap::new();
                        entry.insert(f.filename.clone(), format!("id-{}", f.filename));
                        entry
                    })
                    .collect(),
                user: "session-1".to_string(),
            },
        })
    }

    async fn file_info(&self, document_id: &str) -> Result<FileInfo> {
        self.enter("fileinfo", document_id).await?;
        Ok(sample_file_info(document_id))
    }

    async fn summarize(&self, document_id: &str) -> Result<String> {
        self.enter("summarize", document_id).await?;
        Ok(format!("## Summary of {}", document_id))
    }

    async fn key_findings(&self, document_id: &str) -> Result<KeyFindings> {
        self.enter("keyfindings", document_id).await?;
        Ok(sample_findings())
    }

    async fn vulnerabilities(&self, document_id: &str) -> Result<Vec<Vulnerability>> {
        self.enter("vulnerabilities", document_id).await?;
        Ok(sample_vulnerabilities())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        self.chat_requests.borrow_mut().push(request.clone());
        self.enter("chat", &request.query).await?;
        Ok(self
            .chat_reply
            .borrow()
            .clone()
            .unwrap_or_else(|| format!("You asked: {}", request.query)))
    }

    async fn categories(&self, document_ids: &[String]) -> Result<CategoriesResponse> {
        self.enter("categories", &document_ids.join(",")).await?;
        let mut categories = HashMap::new();
        categories.insert(
            "Vulnerability Assessment".to_string(),
            document_ids
                .iter()
                .map(|id| serde_json::Value::String(id.clone()))
                .collect(),
        );
        Ok(CategoriesResponse { categories })
    }
}
