//! Multi-document dashboard
//!
//! Lists the documents of the last upload, lets the user toggle one active
//! document whose analysis is fetched like the single-document view, and
//! charts the category breakdown across all of them.

use std::rc::Rc;

use tracing::{info, warn};

use audit_types::{CategoriesResponse, CategoryBreakdown, StoredBatch, StoredFile};

use crate::analysis::{AnalysisState, AnalysisView, LoadRound, Section, SectionUpdate};
use crate::backend::AuditBackend;
use crate::error::{ClientError, Result};
use crate::storage::{keys, load_json, KeyValueStore};

/// Which half of the dashboard is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Analysis,
    #[default]
    Visualisations,
}

impl Panel {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "analysis" => Some(Panel::Analysis),
            "visualisations" | "visualizations" => Some(Panel::Visualisations),
            _ => None,
        }
    }
}

pub struct Dashboard {
    session_id: String,
    store: Rc<dyn KeyValueStore>,
    batch: StoredBatch,
    active: Option<AnalysisView>,
    breakdown: Section<CategoryBreakdown>,
    panel: Panel,
}

impl Dashboard {
    /// Open the dashboard for a session, reading the stored upload result
    pub fn open(session_id: impl Into<String>, store: Rc<dyn KeyValueStore>) -> Self {
        let batch = match load_json::<StoredBatch>(&store, keys::LAST_BATCH) {
            Ok(Some(batch)) => batch,
            Ok(None) => StoredBatch::default(),
            Err(e) => {
                warn!("Ignoring unreadable upload result: {}", e);
                StoredBatch::default()
            }
        };

        Self {
            session_id: session_id.into(),
            store,
            batch,
            active: None,
            breakdown: Section::Idle,
            panel: Panel::default(),
        }
    }

    /// Id the dashboard chat is keyed by
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn files(&self) -> &[StoredFile] {
        &self.batch.files
    }

    pub fn document_ids(&self) -> Vec<String> {
        self.batch.ids()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(AnalysisView::document_id)
    }

    pub fn active_view(&self) -> Option<&AnalysisView> {
        self.active.as_ref()
    }

    pub fn active_view_mut(&mut self) -> Option<&mut AnalysisView> {
        self.active.as_mut()
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn set_panel(&mut self, panel: Panel) {
        self.panel = panel;
    }

    /// Select a document. Selecting the active one deselects it.
    pub fn select(&mut self, document_id: &str) -> Result<Option<&str>> {
        if !self.batch.contains(document_id) {
            return Err(ClientError::UnknownDocument(document_id.to_string()));
        }

        if self.active_id() == Some(document_id) {
            info!(document = document_id, "Deselected document");
            self.active = None;
        } else {
            info!(document = document_id, "Selected document");
            self.active = Some(
                AnalysisView::new(document_id).with_vulnerability_cache(self.store.clone()),
            );
        }
        Ok(self.active_id())
    }

    /// Start a load of the active document, or `None` when nothing is selected
    pub fn begin_active_load(&mut self) -> Option<(String, LoadRound)> {
        let view = self.active.as_mut()?;
        let round = view.begin_load();
        Some((view.document_id().to_string(), round))
    }

    /// Route a section result to the active view. Results from a round the
    /// active view did not start (a deselected or reselected document) are
    /// dropped.
    pub fn apply_active(&mut self, generation: u64, update: SectionUpdate) -> bool {
        match self.active.as_mut() {
            Some(view) => view.apply(generation, update),
            None => false,
        }
    }

    /// Fetch the active document's sections. Returns `false` when nothing is selected.
    pub async fn load_active<B, F>(&mut self, backend: &B, on_update: F) -> bool
    where
        B: AuditBackend + ?Sized,
        F: FnMut(&AnalysisState),
    {
        match self.active.as_mut() {
            Some(view) => {
                view.load(backend, on_update).await;
                true
            }
            None => false,
        }
    }

    pub fn breakdown(&self) -> &Section<CategoryBreakdown> {
        &self.breakdown
    }

    /// Ids to categorize, or `None` when the document set is empty
    pub fn begin_breakdown(&mut self) -> Option<Vec<String>> {
        let ids = self.document_ids();
        if ids.is_empty() {
            return None;
        }
        self.breakdown = Section::Loading;
        Some(ids)
    }

    pub fn apply_breakdown(&mut self, response: Result<CategoriesResponse>) {
        let result = response.map(|r| CategoryBreakdown::from_members(&r.categories));
        if let Err(e) = &result {
            warn!("Error fetching graph data: {}", e);
        }
        self.breakdown = Section::from_result(result);
    }

    pub async fn refresh_breakdown<B: AuditBackend + ?Sized>(&mut self, backend: &B) {
        let Some(ids) = self.begin_breakdown() else {
            return;
        };
        let response = backend.categories(&ids).await;
        self.apply_breakdown(response);
    }
}
