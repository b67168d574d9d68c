//! Multi-document dashboard page

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use audit_client::{AuditBackend, Dashboard, KeyValueStore, Panel, Section, Tab};
use audit_types::{CategoryBreakdown, StoredFile};

use crate::analysis_panel::{spawn_section_fetches, AnalysisSnapshot};
use crate::local_store::LocalStore;
use crate::notify::Notifier;
use crate::{connect, js_error, to_js, Backend};

#[derive(Serialize)]
struct DashboardSnapshot<'a> {
    session_id: &'a str,
    files: &'a [StoredFile],
    active_id: Option<&'a str>,
    panel: Panel,
    breakdown: &'a Section<CategoryBreakdown>,
    analysis: Option<AnalysisSnapshot<'a>>,
}

#[wasm_bindgen]
pub struct DashboardPanel {
    dashboard: Rc<RefCell<Dashboard>>,
    backend: Rc<Backend>,
    notifier: Notifier,
}

#[wasm_bindgen]
impl DashboardPanel {
    /// Opens the dashboard over the documents of the last upload
    #[wasm_bindgen(constructor)]
    pub fn new(session_id: &str, backend_url: Option<String>) -> Result<DashboardPanel, JsValue> {
        let store: Rc<dyn KeyValueStore> = Rc::new(LocalStore::open().map_err(js_error)?);
        Ok(Self {
            dashboard: Rc::new(RefCell::new(Dashboard::open(session_id, store))),
            backend: connect(backend_url)?,
            notifier: Notifier::default(),
        })
    }

    /// Callback signature: () => void
    #[wasm_bindgen(js_name = setChangeCallback)]
    pub fn set_change_callback(&self, callback: Option<js_sys::Function>) {
        self.notifier.set(callback);
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        let dashboard = self.dashboard.borrow();
        let snapshot = DashboardSnapshot {
            session_id: dashboard.session_id(),
            files: dashboard.files(),
            active_id: dashboard.active_id(),
            panel: dashboard.panel(),
            breakdown: dashboard.breakdown(),
            analysis: dashboard.active_view().map(AnalysisSnapshot::of),
        };
        to_js(&snapshot)
    }

    /// Toggle `document_id` and load its analysis when it became active.
    /// Returns the active id afterwards, or `undefined`.
    pub fn select(&self, document_id: &str) -> Result<Option<String>, JsValue> {
        let pending = {
            let mut dashboard = self.dashboard.borrow_mut();
            dashboard.select(document_id).map_err(js_error)?;
            dashboard.begin_active_load()
        };
        self.notifier.notify();

        let Some((active_id, round)) = pending else {
            return Ok(None);
        };

        let dashboard = self.dashboard.clone();
        let notifier = self.notifier.clone();
        spawn_section_fetches(&self.backend, &active_id, round, move |generation, update| {
            let applied = dashboard.borrow_mut().apply_active(generation, update);
            if applied {
                notifier.notify();
            }
        });

        Ok(Some(active_id))
    }

    /// "analysis" or "visualisations"
    #[wasm_bindgen(js_name = setPanel)]
    pub fn set_panel(&self, name: &str) -> Result<(), JsValue> {
        let panel =
            Panel::parse(name).ok_or_else(|| js_error(format!("Unknown panel: {}", name)))?;
        self.dashboard.borrow_mut().set_panel(panel);
        self.notifier.notify();
        Ok(())
    }

    /// Tab of the active document's analysis
    #[wasm_bindgen(js_name = setTab)]
    pub fn set_tab(&self, name: &str) -> Result<(), JsValue> {
        let tab = Tab::parse(name).ok_or_else(|| js_error(format!("Unknown tab: {}", name)))?;
        if let Some(view) = self.dashboard.borrow_mut().active_view_mut() {
            view.set_tab(tab);
        }
        self.notifier.notify();
        Ok(())
    }

    /// Fetch the category breakdown for every document in the session
    #[wasm_bindgen(js_name = refreshBreakdown)]
    pub fn refresh_breakdown(&self) -> js_sys::Promise {
        let dashboard = self.dashboard.clone();
        let backend = self.backend.clone();
        let notifier = self.notifier.clone();

        future_to_promise(async move {
            let ids = dashboard.borrow_mut().begin_breakdown();
            let Some(ids) = ids else {
                return Ok(JsValue::UNDEFINED);
            };
            notifier.notify();

            let response = backend.categories(&ids).await;
            dashboard.borrow_mut().apply_breakdown(response);
            notifier.notify();

            let dashboard = dashboard.borrow();
            to_js(dashboard.breakdown())
        })
    }
}
