//! Chat side panel, keyed by document id (or dashboard session id)

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use audit_client::{AuditBackend, ChatSession};

use crate::local_store::LocalStore;
use crate::notify::Notifier;
use crate::{connect, js_error, to_js, Backend};

#[wasm_bindgen]
pub struct ChatPanel {
    session: Rc<RefCell<ChatSession<LocalStore>>>,
    backend: Rc<Backend>,
    notifier: Notifier,
}

#[wasm_bindgen]
impl ChatPanel {
    /// Opens the session and restores its saved transcript
    #[wasm_bindgen(constructor)]
    pub fn new(document_id: &str, backend_url: Option<String>) -> Result<ChatPanel, JsValue> {
        let store = LocalStore::open().map_err(js_error)?;
        Ok(Self {
            session: Rc::new(RefCell::new(ChatSession::open(document_id, store))),
            backend: connect(backend_url)?,
            notifier: Notifier::default(),
        })
    }

    /// Callback signature: () => void
    #[wasm_bindgen(js_name = setChangeCallback)]
    pub fn set_change_callback(&self, callback: Option<js_sys::Function>) {
        self.notifier.set(callback);
    }

    /// Transcript as `[{role, content}]`
    pub fn messages(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.borrow().messages())
    }

    /// Input and send button are disabled while a reply is pending
    #[wasm_bindgen(js_name = canSend)]
    pub fn can_send(&self) -> bool {
        self.session.borrow().can_send()
    }

    #[wasm_bindgen(js_name = isAwaiting)]
    pub fn is_awaiting(&self) -> bool {
        self.session.borrow().is_awaiting()
    }

    #[wasm_bindgen(getter)]
    pub fn input(&self) -> String {
        self.session.borrow().input().to_string()
    }

    #[wasm_bindgen(setter)]
    pub fn set_input(&self, text: String) {
        self.session.borrow_mut().set_input(text);
    }

    /// Send `text`. Resolves with the assistant message, or `undefined`
    /// when the text was blank.
    pub fn send(&self, text: String) -> js_sys::Promise {
        let session = self.session.clone();
        let backend = self.backend.clone();
        let notifier = self.notifier.clone();
        future_to_promise(async move { exchange(&session, &*backend, &notifier, Some(text)).await })
    }

    /// Send the current input buffer (Enter key)
    pub fn submit(&self) -> js_sys::Promise {
        let session = self.session.clone();
        let backend = self.backend.clone();
        let notifier = self.notifier.clone();
        future_to_promise(async move { exchange(&session, &*backend, &notifier, None).await })
    }

    pub fn clear(&self) {
        self.session.borrow_mut().clear();
        self.notifier.notify();
    }
}

async fn exchange(
    session: &RefCell<ChatSession<LocalStore>>,
    backend: &Backend,
    notifier: &Notifier,
    text: Option<String>,
) -> Result<JsValue, JsValue> {
    let request = {
        let mut session = session.borrow_mut();
        match text {
            Some(text) => session.begin_send(&text),
            None => session.submit_input(),
        }
    }
    .map_err(js_error)?;

    let Some(request) = request else {
        return Ok(JsValue::UNDEFINED);
    };
    notifier.notify();

    let reply = backend.chat(&request).await;
    let message = session.borrow_mut().complete(reply).cloned();
    notifier.notify();

    match message {
        Some(message) => to_js(&message),
        None => Ok(JsValue::UNDEFINED),
    }
}
