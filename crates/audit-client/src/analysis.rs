//! Per-document analysis view
//!
//! Four sections (file info, summary, key findings, vulnerabilities) load
//! independently. All four requests are issued together and each result is
//! applied as soon as it arrives, so one slow or failing section never
//! blocks or clears another.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use audit_types::{FileInfo, KeyFindings, Severity, Vulnerability};

use crate::backend::AuditBackend;
use crate::error::Result;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Load state of one section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section::Idle
    }
}

impl<T> Section<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Section::Loaded(data),
            Err(e) => Section::Failed(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Section::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    FileInfo,
    Summary,
    KeyFindings,
    Vulnerabilities,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::FileInfo,
        SectionKind::Summary,
        SectionKind::KeyFindings,
        SectionKind::Vulnerabilities,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::FileInfo => "file info",
            SectionKind::Summary => "summary",
            SectionKind::KeyFindings => "key findings",
            SectionKind::Vulnerabilities => "vulnerabilities",
        }
    }
}

/// Result of one section fetch
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    FileInfo(Result<FileInfo>),
    Summary(Result<String>),
    KeyFindings(Result<KeyFindings>),
    Vulnerabilities(Result<Vec<Vulnerability>>),
}

impl SectionUpdate {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionUpdate::FileInfo(_) => SectionKind::FileInfo,
            SectionUpdate::Summary(_) => SectionKind::Summary,
            SectionUpdate::KeyFindings(_) => SectionKind::KeyFindings,
            SectionUpdate::Vulnerabilities(_) => SectionKind::Vulnerabilities,
        }
    }
}

/// Issue the request behind one section
pub async fn fetch_section<B: AuditBackend + ?Sized>(
    backend: &B,
    document_id: &str,
    kind: SectionKind,
) -> SectionUpdate {
    debug!(document = document_id, section = kind.name(), "Fetching section");
    match kind {
        SectionKind::FileInfo => SectionUpdate::FileInfo(backend.file_info(document_id).await),
        SectionKind::Summary => SectionUpdate::Summary(backend.summarize(document_id).await),
        SectionKind::KeyFindings => {
            SectionUpdate::KeyFindings(backend.key_findings(document_id).await)
        }
        SectionKind::Vulnerabilities => {
            SectionUpdate::Vulnerabilities(backend.vulnerabilities(document_id).await)
        }
    }
}

/// Generations are unique across views, so a view that replaces another
/// never accepts the old one's results
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Requests issued by one `begin_load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRound {
    pub generation: u64,
    pub kinds: Vec<SectionKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Summary,
    Findings,
    Vulnerabilities,
}

impl Tab {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "summary" => Some(Tab::Summary),
            "findings" => Some(Tab::Findings),
            "vulnerabilities" => Some(Tab::Vulnerabilities),
            _ => None,
        }
    }
}

/// Vulnerability with its display band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VulnerabilityRow {
    pub description: String,
    pub criticality: f64,
    pub reasoning: String,
    pub mitigation: String,
    pub severity: Severity,
    pub color: &'static str,
}

impl From<&Vulnerability> for VulnerabilityRow {
    fn from(vuln: &Vulnerability) -> Self {
        let severity = vuln.severity();
        Self {
            description: vuln.description.clone(),
            criticality: vuln.criticality,
            reasoning: vuln.reasoning.clone(),
            mitigation: vuln.mitigation.clone(),
            severity,
            color: severity.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisState {
    pub file_info: Section<FileInfo>,
    pub summary: Section<String>,
    pub key_findings: Section<KeyFindings>,
    pub vulnerabilities: Section<Vec<Vulnerability>>,
}

impl AnalysisState {
    pub fn is_loading(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::FileInfo => self.file_info.is_loading(),
            SectionKind::Summary => self.summary.is_loading(),
            SectionKind::KeyFindings => self.key_findings.is_loading(),
            SectionKind::Vulnerabilities => self.vulnerabilities.is_loading(),
        }
    }

    pub fn any_loading(&self) -> bool {
        SectionKind::ALL.iter().any(|kind| self.is_loading(*kind))
    }

    /// Summary markdown; empty until loaded or after a failure
    pub fn summary_text(&self) -> &str {
        self.summary.data().map_or("", String::as_str)
    }

    pub fn vulnerability_rows(&self) -> Vec<VulnerabilityRow> {
        self.vulnerabilities
            .data()
            .map(|list| list.iter().map(VulnerabilityRow::from).collect())
            .unwrap_or_default()
    }
}

pub struct AnalysisView {
    document_id: String,
    state: AnalysisState,
    tab: Tab,
    generation: u64,
    vulnerability_cache: Option<Rc<dyn KeyValueStore>>,
}

impl AnalysisView {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            state: AnalysisState::default(),
            tab: Tab::default(),
            generation: 0,
            vulnerability_cache: None,
        }
    }

    /// Serve vulnerabilities from on-device storage when present and store
    /// fresh results there
    pub fn with_vulnerability_cache(mut self, store: Rc<dyn KeyValueStore>) -> Self {
        self.vulnerability_cache = Some(store);
        self
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Generation of the latest `begin_load`, 0 before the first
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mark sections as loading and return the ones that need a request.
    /// Results from earlier rounds are ignored from here on.
    pub fn begin_load(&mut self) -> LoadRound {
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let mut pending = Vec::with_capacity(SectionKind::ALL.len());

        self.state.file_info = Section::Loading;
        self.state.summary = Section::Loading;
        self.state.key_findings = Section::Loading;
        pending.extend([
            SectionKind::FileInfo,
            SectionKind::Summary,
            SectionKind::KeyFindings,
        ]);

        match self.cached_vulnerabilities() {
            Some(cached) => {
                debug!(document = %self.document_id, "Using cached vulnerabilities");
                self.state.vulnerabilities = Section::Loaded(cached);
            }
            None => {
                self.state.vulnerabilities = Section::Loading;
                pending.push(SectionKind::Vulnerabilities);
            }
        }

        LoadRound {
            generation: self.generation,
            kinds: pending,
        }
    }

    /// Apply one fetch result from round `generation`; other sections are
    /// left untouched. Returns `false` when the round is stale.
    pub fn apply(&mut self, generation: u64, update: SectionUpdate) -> bool {
        if generation != self.generation {
            debug!(
                document = %self.document_id,
                section = update.kind().name(),
                "Dropping result of an earlier load"
            );
            return false;
        }

        if let SectionUpdate::Vulnerabilities(Ok(list)) = &update {
            self.store_vulnerabilities(list);
        }

        let kind = update.kind();
        let failure = match update {
            SectionUpdate::FileInfo(result) => {
                self.state.file_info = Section::from_result(result);
                self.state.file_info.error().map(str::to_string)
            }
            SectionUpdate::Summary(result) => {
                self.state.summary = Section::from_result(result);
                self.state.summary.error().map(str::to_string)
            }
            SectionUpdate::KeyFindings(result) => {
                self.state.key_findings = Section::from_result(result);
                self.state.key_findings.error().map(str::to_string)
            }
            SectionUpdate::Vulnerabilities(result) => {
                self.state.vulnerabilities = Section::from_result(result);
                self.state.vulnerabilities.error().map(str::to_string)
            }
        };

        if let Some(message) = failure {
            warn!(document = %self.document_id, "Error fetching {}: {}", kind.name(), message);
        }
        true
    }

    /// Fetch every section concurrently, calling `on_update` after each change
    pub async fn load<B, F>(&mut self, backend: &B, mut on_update: F)
    where
        B: AuditBackend + ?Sized,
        F: FnMut(&AnalysisState),
    {
        let round = self.begin_load();
        on_update(&self.state);

        let document_id = self.document_id.clone();
        let mut pending: FuturesUnordered<_> = round
            .kinds
            .into_iter()
            .map(|kind| fetch_section(backend, &document_id, kind))
            .collect();

        while let Some(update) = pending.next().await {
            self.apply(round.generation, update);
            on_update(&self.state);
        }
    }

    fn cached_vulnerabilities(&self) -> Option<Vec<Vulnerability>> {
        let store = self.vulnerability_cache.as_ref()?;
        match load_json(store, &keys::vulnerabilities(&self.document_id)) {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Ignoring unreadable vulnerability cache: {}", e);
                None
            }
        }
    }

    fn store_vulnerabilities(&self, list: &[Vulnerability]) {
        if let Some(store) = &self.vulnerability_cache {
            let key = keys::vulnerabilities(&self.document_id);
            if let Err(e) = save_json(store, &key, list) {
                warn!("Failed to cache vulnerabilities: {}", e);
            }
        }
    }
}
