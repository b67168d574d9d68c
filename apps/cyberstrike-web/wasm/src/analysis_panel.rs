//! Single-document analysis page

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use audit_client::{
    fetch_section, AnalysisView, LoadRound, Section, SectionUpdate, Tab, VulnerabilityRow,
};
use audit_types::{FileInfo, FindingEntry, KeyFindings};

use crate::notify::Notifier;
use crate::{connect, js_error, to_js, Backend};

/// What the page renders for one document
#[derive(Serialize)]
pub(crate) struct AnalysisSnapshot<'a> {
    document_id: &'a str,
    tab: Tab,
    loading: bool,
    file_info: &'a Section<FileInfo>,
    file_info_rows: Vec<(&'static str, String)>,
    summary: &'a Section<String>,
    key_findings: &'a Section<KeyFindings>,
    findings: Vec<FindingEntry<'a>>,
    vulnerabilities: Vec<VulnerabilityRow>,
    vulnerabilities_failed: bool,
}

impl<'a> AnalysisSnapshot<'a> {
    pub(crate) fn of(view: &'a AnalysisView) -> Self {
        let state = view.state();
        Self {
            document_id: view.document_id(),
            tab: view.tab(),
            loading: state.any_loading(),
            file_info: &state.file_info,
            file_info_rows: state
                .file_info
                .data()
                .map(FileInfo::display_rows)
                .unwrap_or_default(),
            summary: &state.summary,
            key_findings: &state.key_findings,
            findings: state
                .key_findings
                .data()
                .map(KeyFindings::entries)
                .unwrap_or_default(),
            vulnerabilities: state.vulnerability_rows(),
            vulnerabilities_failed: state.vulnerabilities.is_failed(),
        }
    }
}

/// Fetch each section of `round` in its own task, handing results to
/// `apply` with the round's generation as they land
pub(crate) fn spawn_section_fetches<F>(
    backend: &Rc<Backend>,
    document_id: &str,
    round: LoadRound,
    apply: F,
) where
    F: Fn(u64, SectionUpdate) + Clone + 'static,
{
    let generation = round.generation;
    for kind in round.kinds {
        let backend = backend.clone();
        let document_id = document_id.to_string();
        let apply = apply.clone();
        spawn_local(async move {
            let update = fetch_section(&*backend, &document_id, kind).await;
            apply(generation, update);
        });
    }
}

#[wasm_bindgen]
pub struct AnalysisPanel {
    view: Rc<RefCell<AnalysisView>>,
    backend: Rc<Backend>,
    notifier: Notifier,
}

#[wasm_bindgen]
impl AnalysisPanel {
    #[wasm_bindgen(constructor)]
    pub fn new(document_id: &str, backend_url: Option<String>) -> Result<AnalysisPanel, JsValue> {
        Ok(Self {
            view: Rc::new(RefCell::new(AnalysisView::new(document_id))),
            backend: connect(backend_url)?,
            notifier: Notifier::default(),
        })
    }

    #[wasm_bindgen(getter, js_name = documentId)]
    pub fn document_id(&self) -> String {
        self.view.borrow().document_id().to_string()
    }

    /// Callback signature: () => void
    #[wasm_bindgen(js_name = setChangeCallback)]
    pub fn set_change_callback(&self, callback: Option<js_sys::Function>) {
        self.notifier.set(callback);
    }

    /// Request all four sections at once. Returns immediately; the change
    /// callback fires as each section resolves. Calling it again abandons
    /// the results still in flight.
    pub fn load(&self) {
        let (document_id, round) = {
            let mut view = self.view.borrow_mut();
            (view.document_id().to_string(), view.begin_load())
        };
        self.notifier.notify();

        let view = self.view.clone();
        let notifier = self.notifier.clone();
        spawn_section_fetches(&self.backend, &document_id, round, move |generation, update| {
            let applied = view.borrow_mut().apply(generation, update);
            if applied {
                notifier.notify();
            }
        });
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.view.borrow().state().any_loading()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&AnalysisSnapshot::of(&self.view.borrow()))
    }

    /// Key findings as markdown, empty until loaded
    #[wasm_bindgen(js_name = findingsMarkdown)]
    pub fn findings_markdown(&self) -> String {
        self.view
            .borrow()
            .state()
            .key_findings
            .data()
            .map(KeyFindings::to_markdown)
            .unwrap_or_default()
    }

    pub fn tab(&self) -> Result<JsValue, JsValue> {
        to_js(&self.view.borrow().tab())
    }

    /// "summary", "findings" or "vulnerabilities"
    #[wasm_bindgen(js_name = setTab)]
    pub fn set_tab(&self, name: &str) -> Result<(), JsValue> {
        let tab = Tab::parse(name).ok_or_else(|| js_error(format!("Unknown tab: {}", name)))?;
        self.view.borrow_mut().set_tab(tab);
        self.notifier.notify();
        Ok(())
    }
}
