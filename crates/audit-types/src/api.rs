//! JSON bodies exchanged with the analysis backend
//!
//! Every endpoint is a POST with a JSON body. The backend is an external
//! service; these types describe only the fields the client relies on.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::findings::KeyFindings;
use crate::types::{ChatMessage, Vulnerability};

/// Backend routes used by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Upload,
    FileInfo(String),
    Summarize,
    KeyFindings,
    Vulnerabilities,
    Chat,
    Categories,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Upload => "/upload".to_string(),
            Endpoint::FileInfo(id) => format!("/fileinfo/{}", id),
            Endpoint::Summarize => "/summarize".to_string(),
            Endpoint::KeyFindings => "/keyfindings".to_string(),
            Endpoint::Vulnerabilities => "/vulnerabilities".to_string(),
            Endpoint::Chat => "/chat".to_string(),
            Endpoint::Categories => "/categories".to_string(),
        }
    }

    /// Short name for logs and errors (no document id)
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Upload => "upload",
            Endpoint::FileInfo(_) => "fileinfo",
            Endpoint::Summarize => "summarize",
            Endpoint::KeyFindings => "keyfindings",
            Endpoint::Vulnerabilities => "vulnerabilities",
            Endpoint::Chat => "chat",
            Endpoint::Categories => "categories",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// One base64-encoded file, data-URL prefix already stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub file: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadRequest {
    Single(FilePayload),
    Batch { files: Vec<FilePayload> },
}

impl UploadRequest {
    /// One payload is sent bare, several as a `files` batch.
    /// Returns `None` for an empty selection.
    pub fn from_payloads(mut payloads: Vec<FilePayload>) -> Option<Self> {
        match payloads.len() {
            0 => None,
            1 => payloads.pop().map(UploadRequest::Single),
            _ => Some(UploadRequest::Batch { files: payloads }),
        }
    }

    pub fn payloads(&self) -> &[FilePayload] {
        match self {
            UploadRequest::Single(payload) => std::slice::from_ref(payload),
            UploadRequest::Batch { files } => files,
        }
    }

    pub fn len(&self) -> usize {
        self.payloads().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    /// `ids` holds one `{filename: id}` object per uploaded file
    Batch {
        ids: Vec<IndexMap<String, String>>,
        user: String,
    },
    Single {
        id: String,
    },
}

impl UploadResponse {
    /// Id the client navigates with after the upload
    pub fn primary_id(&self) -> &str {
        match self {
            UploadResponse::Batch { user, .. } => user,
            UploadResponse::Single { id } => id,
        }
    }
}

/// Body of the per-document analysis endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub id: String,
}

impl DocumentRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String, // Markdown
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFindingsResponse {
    pub findings: KeyFindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilitiesResponse {
    pub vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub id: String,
    pub query: String,
    /// Full transcript, including the turn carrying `query`
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriesRequest {
    pub file_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: HashMap<String, Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(name: &str) -> FilePayload {
        FilePayload {
            file: "JVBERi0xLjQ=".to_string(),
            filename: name.to_string(),
        }
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Upload.path(), "/upload");
        assert_eq!(Endpoint::FileInfo("abc123".into()).path(), "/fileinfo/abc123");
        assert_eq!(Endpoint::FileInfo("abc123".into()).name(), "fileinfo");
        assert_eq!(Endpoint::Categories.to_string(), "/categories");
    }

    #[test]
    fn test_single_upload_body_is_flat() {
        let request = UploadRequest::from_payloads(vec![payload("audit.pdf")]).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"file": "JVBERi0xLjQ=", "filename": "audit.pdf"})
        );
        assert_eq!(request.len(), 1);
    }

    #[test]
    fn test_batch_upload_body() {
        let request =
            UploadRequest::from_payloads(vec![payload("a.pdf"), payload("b.pdf")]).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["files"].as_array().unwrap().len(), 2);
        assert_eq!(value["files"][1]["filename"], "b.pdf");
    }

    #[test]
    fn test_empty_selection_has_no_request() {
        assert!(UploadRequest::from_payloads(Vec::new()).is_none());
    }

    #[test]
    fn test_upload_response_shapes() {
        let single: UploadResponse = serde_json::from_str(r#"{"id":"abc123"}"#).unwrap();
        assert_eq!(single.primary_id(), "abc123");

        let batch: UploadResponse = serde_json::from_str(
            r#"{"ids":[{"a.pdf":"id-a"},{"b.pdf":"id-b"}],"user":"session-9"}"#,
        )
        .unwrap();
        assert_eq!(batch.primary_id(), "session-9");
        match batch {
            UploadResponse::Batch { ids, .. } => {
                assert_eq!(ids[1].get("b.pdf"), Some(&"id-b".to_string()));
            }
            other => panic!("expected batch response, got {:?}", other),
        }
    }

    #[test]
    fn test_chat_request_body() {
        let request = ChatRequest {
            id: "abc123".to_string(),
            query: "What is the top risk?".to_string(),
            history: vec![ChatMessage::user("What is the top risk?")],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "id": "abc123",
                "query": "What is the top risk?",
                "history": [{"role": "user", "content": "What is the top risk?"}]
            })
        );
    }

    #[test]
    fn test_categories_bodies() {
        let request = CategoriesRequest {
            file_list: vec!["id-a".to_string(), "id-b".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"file_list": ["id-a", "id-b"]})
        );

        let response: CategoriesResponse = serde_json::from_value(json!({
            "categories": {"Compliance Audit": ["id-a"], "Penetration Testing": []}
        }))
        .unwrap();
        assert_eq!(response.categories["Compliance Audit"].len(), 1);
    }
}
