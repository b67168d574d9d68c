//! Data model shared by the CyberStrike audit client crates

pub mod api;
pub mod category;
pub mod findings;
pub mod types;

pub use api::{
    CategoriesRequest, CategoriesResponse, ChatRequest, ChatResponse, DocumentRequest, Endpoint,
    FilePayload, KeyFindingsResponse, SummaryResponse, UploadRequest, UploadResponse,
    VulnerabilitiesResponse,
};
pub use category::{AuditCategory, CategoryBreakdown, CategorySlice};
pub use findings::{field_label, FindingEntry, FindingValue, KeyFindings};
pub use indexmap::IndexMap;
pub use types::{
    ChatMessage, FileInfo, Role, Severity, StoredBatch, StoredFile, UploadedFile, Vulnerability,
    CHAT_FALLBACK_REPLY,
};
