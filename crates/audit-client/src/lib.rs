//! Client core for the CyberStrike audit analysis service
//!
//! Everything here is transport- and platform-agnostic: the browser build
//! plugs in `fetch` as the [`http::Transport`] and `localStorage` as the
//! [`storage::KeyValueStore`], tests use in-memory fakes.
//!
//! - [`upload::Uploader`]: encode and upload files, keep the recent-uploads list
//! - [`analysis::AnalysisView`]: concurrently load the four analysis sections
//! - [`chat::ChatSession`]: persisted per-document chat with a single in-flight request
//! - [`dashboard::Dashboard`]: multi-document selection and category breakdown

pub mod analysis;
pub mod backend;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod storage;
pub mod upload;

pub use analysis::{
    fetch_section, AnalysisState, AnalysisView, LoadRound, Section, SectionKind, SectionUpdate,
    Tab, VulnerabilityRow,
};
pub use backend::AuditBackend;
pub use chat::{ChatPhase, ChatSession};
pub use config::ClientConfig;
pub use dashboard::{Dashboard, Panel};
pub use error::{ClientError, Result, StorageError};
pub use http::{HttpBackend, HttpReply, Transport};
pub use storage::{KeyValueStore, MemoryStore};
pub use upload::{LocalFile, Route, UploadHistory, UploadOutcome, UploadState, Uploader};
