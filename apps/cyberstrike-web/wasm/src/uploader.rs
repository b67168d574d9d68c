//! Upload page controller

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::FileList;

use audit_client::{AuditBackend, UploadOutcome, Uploader};

use crate::files::read_file_list;
use crate::local_store::LocalStore;
use crate::notify::Notifier;
use crate::{connect, js_error, to_js, Backend};

#[wasm_bindgen]
pub struct UploadController {
    uploader: Rc<RefCell<Uploader<LocalStore>>>,
    backend: Rc<Backend>,
    notifier: Notifier,
}

#[wasm_bindgen]
impl UploadController {
    #[wasm_bindgen(constructor)]
    pub fn new(backend_url: Option<String>) -> Result<UploadController, JsValue> {
        let store = LocalStore::open().map_err(js_error)?;
        Ok(Self {
            uploader: Rc::new(RefCell::new(Uploader::new(store))),
            backend: connect(backend_url)?,
            notifier: Notifier::default(),
        })
    }

    /// Callback signature: () => void
    #[wasm_bindgen(js_name = setChangeCallback)]
    pub fn set_change_callback(&self, callback: Option<js_sys::Function>) {
        self.notifier.set(callback);
    }

    /// False while an upload is in flight
    #[wasm_bindgen(js_name = canSubmit)]
    pub fn can_submit(&self) -> bool {
        self.uploader.borrow().can_submit()
    }

    /// "idle" or "uploading"
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.uploader.borrow().state())
    }

    /// Recent uploads, newest first
    pub fn history(&self) -> Result<JsValue, JsValue> {
        to_js(self.uploader.borrow().history().entries())
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&self) -> Result<(), JsValue> {
        self.uploader.borrow_mut().clear_history().map_err(js_error)?;
        self.notifier.notify();
        Ok(())
    }

    /// Upload the selection and navigate to its analysis page.
    ///
    /// Resolves with the outcome (`{primary_id, files, route}`); rejects on
    /// an empty selection, a busy uploader or a failed request, leaving the
    /// page in place.
    pub fn upload(&self, files: FileList) -> js_sys::Promise {
        let uploader = self.uploader.clone();
        let backend = self.backend.clone();
        let notifier = self.notifier.clone();

        future_to_promise(async move {
            let outcome = run_upload(&uploader, &*backend, &notifier, &files).await?;
            navigate(&outcome)?;
            to_js(&outcome)
        })
    }
}

async fn run_upload(
    uploader: &RefCell<Uploader<LocalStore>>,
    backend: &Backend,
    notifier: &Notifier,
    files: &FileList,
) -> Result<UploadOutcome, JsValue> {
    if !uploader.borrow().can_submit() {
        return Err(js_error(audit_client::ClientError::Busy));
    }
    let files = read_file_list(files).await?;

    let request = uploader.borrow_mut().begin(&files).map_err(js_error)?;
    notifier.notify();

    let response = backend.upload(&request).await;
    let outcome = uploader.borrow_mut().finish(&request, response, Utc::now());
    notifier.notify();

    outcome.map_err(js_error)
}

fn navigate(outcome: &UploadOutcome) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    window.location().set_href(&outcome.route.path())
}
