//! File upload flow and the recent-uploads history

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use audit_types::{
    FilePayload, StoredBatch, StoredFile, UploadRequest, UploadResponse, UploadedFile,
};

use crate::backend::AuditBackend;
use crate::error::{ClientError, Result};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn to_payload(&self) -> FilePayload {
        FilePayload {
            file: STANDARD.encode(&self.bytes),
            filename: self.filename.clone(),
        }
    }
}

/// Where the UI goes after a successful upload
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "view", content = "id", rename_all = "snake_case")]
pub enum Route {
    Analyze(String),
    Dashboard(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Analyze(id) => format!("/analyze/{}", id),
            Route::Dashboard(id) => format!("/analyze2/{}", id),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Route::Analyze(id) | Route::Dashboard(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UploadOutcome {
    pub primary_id: String,
    pub files: Vec<StoredFile>,
    pub route: Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
}

/// Capped, most-recent-first list of uploaded files
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadHistory {
    entries: Vec<UploadedFile>,
}

impl UploadHistory {
    pub const MAX_ENTRIES: usize = 10;

    /// Load the persisted list; an unreadable record is logged and ignored
    pub fn load(store: &impl KeyValueStore) -> Self {
        match load_json::<Vec<UploadedFile>>(store, keys::UPLOAD_HISTORY) {
            Ok(Some(mut entries)) => {
                entries.truncate(Self::MAX_ENTRIES);
                Self { entries }
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Ignoring unreadable upload history: {}", e);
                Self::default()
            }
        }
    }

    pub fn entries(&self) -> &[UploadedFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put `file` first, evicting the oldest entries past the cap
    pub fn record(&mut self, file: UploadedFile) {
        self.entries.insert(0, file);
        self.entries.truncate(Self::MAX_ENTRIES);
    }

    pub fn save(&self, store: &impl KeyValueStore) -> Result<()> {
        save_json(store, keys::UPLOAD_HISTORY, &self.entries)?;
        Ok(())
    }

    pub fn clear(&mut self, store: &impl KeyValueStore) -> Result<()> {
        self.entries.clear();
        store.remove(keys::UPLOAD_HISTORY)?;
        Ok(())
    }
}

/// Upload controller. Only one upload may be in flight.
pub struct Uploader<S> {
    store: S,
    state: UploadState,
    history: UploadHistory,
}

impl<S: KeyValueStore> Uploader<S> {
    pub fn new(store: S) -> Self {
        let history = UploadHistory::load(&store);
        Self {
            store,
            state: UploadState::Idle,
            history,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Whether the upload control should be enabled
    pub fn can_submit(&self) -> bool {
        self.state == UploadState::Idle
    }

    pub fn history(&self) -> &UploadHistory {
        &self.history
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear(&self.store)
    }

    /// Encode the selection and enter `Uploading`
    pub fn begin(&mut self, files: &[LocalFile]) -> Result<UploadRequest> {
        if self.state == UploadState::Uploading {
            return Err(ClientError::Busy);
        }
        let payloads = files.iter().map(LocalFile::to_payload).collect();
        let request = UploadRequest::from_payloads(payloads).ok_or(ClientError::EmptySelection)?;

        info!(files = request.len(), "Uploading selection");
        self.state = UploadState::Uploading;
        Ok(request)
    }

    /// Apply the backend's answer to a request from [`Uploader::begin`]
    pub fn finish(
        &mut self,
        request: &UploadRequest,
        response: Result<UploadResponse>,
        now: DateTime<Utc>,
    ) -> Result<UploadOutcome> {
        self.state = UploadState::Idle;

        let outcome = response.and_then(|response| resolve_outcome(request, response));
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Error uploading files: {}", e);
                return Err(e);
            }
        };

        for file in &outcome.files {
            self.history.record(UploadedFile {
                id: file.id.clone(),
                filename: file.filename.clone(),
                timestamp: now,
            });
        }
        if let Err(e) = self.history.save(&self.store) {
            warn!("Failed to persist upload history: {}", e);
        }

        let batch = StoredBatch {
            user: outcome.primary_id.clone(),
            files: outcome.files.clone(),
        };
        if let Err(e) = save_json(&self.store, keys::LAST_BATCH, &batch) {
            warn!("Failed to persist upload result: {}", e);
        }

        info!(id = %outcome.primary_id, "Upload complete");
        Ok(outcome)
    }

    pub async fn upload<B: AuditBackend + ?Sized>(
        &mut self,
        backend: &B,
        files: &[LocalFile],
        now: DateTime<Utc>,
    ) -> Result<UploadOutcome> {
        let request = self.begin(files)?;
        let response = backend.upload(&request).await;
        self.finish(&request, response, now)
    }
}

/// Pair each uploaded filename with the id the backend issued for it
fn resolve_outcome(request: &UploadRequest, response: UploadResponse) -> Result<UploadOutcome> {
    let payloads = request.payloads();
    match response {
        UploadResponse::Single { id } => {
            let [payload] = payloads else {
                return Err(ClientError::Decode {
                    endpoint: "upload",
                    message: format!("expected {} ids, got 1", payloads.len()),
                });
            };
            Ok(UploadOutcome {
                primary_id: id.clone(),
                files: vec![StoredFile {
                    filename: payload.filename.clone(),
                    id: id.clone(),
                }],
                route: Route::Analyze(id),
            })
        }
        UploadResponse::Batch { ids, user } => {
            if ids.len() != payloads.len() {
                return Err(ClientError::Decode {
                    endpoint: "upload",
                    message: format!("expected {} ids, got {}", payloads.len(), ids.len()),
                });
            }
            let files = ids
                .iter()
                .map(|entry| {
                    entry
                        .iter()
                        .next()
                        .map(|(filename, id)| StoredFile {
                            filename: filename.to_string(),
                            id: id.clone(),
                        })
                        .ok_or_else(|| ClientError::Decode {
                            endpoint: "upload",
                            message: "empty id entry".to_string(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(UploadOutcome {
                primary_id: user.clone(),
                files,
                route: Route::Dashboard(user),
            })
        }
    }
}
