use async_trait::async_trait;

use audit_types::{
    CategoriesResponse, ChatRequest, FileInfo, KeyFindings, UploadRequest, UploadResponse,
    Vulnerability,
};

use crate::error::Result;

/// Operations the analysis backend offers.
///
/// Futures are not `Send`: the client runs on a single-threaded event loop.
#[async_trait(?Send)]
pub trait AuditBackend {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse>;

    async fn file_info(&self, document_id: &str) -> Result<FileInfo>;

    /// Markdown summary of the document
    async fn summarize(&self, document_id: &str) -> Result<String>;

    async fn key_findings(&self, document_id: &str) -> Result<KeyFindings>;

    async fn vulnerabilities(&self, document_id: &str) -> Result<Vec<Vulnerability>>;

    /// Returns the assistant's reply text
    async fn chat(&self, request: &ChatRequest) -> Result<String>;

    async fn categories(&self, document_ids: &[String]) -> Result<CategoriesResponse>;
}

#[async_trait(?Send)]
impl<B: AuditBackend + ?Sized> AuditBackend for std::rc::Rc<B> {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse> {
        (**self).upload(request).await
    }

    async fn file_info(&self, document_id: &str) -> Result<FileInfo> {
        (**self).file_info(document_id).await
    }

    async fn summarize(&self, document_id: &str) -> Result<String> {
        (**self).summarize(document_id).await
    }

    async fn key_findings(&self, document_id: &str) -> Result<KeyFindings> {
        (**self).key_findings(document_id).await
    }

    async fn vulnerabilities(&self, document_id: &str) -> Result<Vec<Vulnerability>> {
        (**self).vulnerabilities(document_id).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        (**self).chat(request).await
    }

    async fn categories(&self, document_ids: &[String]) -> Result<CategoriesResponse> {
        (**self).categories(document_ids).await
    }
}
