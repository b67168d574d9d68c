//! WASM bindings for the CyberStrike audit client
//!
//! State lives in Rust (`audit-client`); JavaScript renders it and forwards
//! DOM events. Every controller takes an optional change callback that fires
//! whenever its state moves, after which the page reads `state()` again.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { UploadController, AnalysisPanel, ChatPanel } from './pkg/cyberstrike_wasm.js';
//!
//! await init();
//!
//! const uploader = new UploadController();
//! uploader.setChangeCallback(() => button.disabled = !uploader.canSubmit());
//! await uploader.upload(input.files); // navigates to /analyze/<id> or /analyze2/<user>
//!
//! const panel = new AnalysisPanel(documentId);
//! panel.setChangeCallback(() => render(panel.state()));
//! panel.load();
//!
//! const chat = new ChatPanel(documentId);
//! await chat.send("What is the top risk?");
//! ```

pub mod analysis_panel;
pub mod chat_panel;
pub mod dashboard_panel;
pub mod fetch;
pub mod files;
pub mod local_store;
pub mod logging;
pub mod uploader;

mod notify;

use std::fmt::Display;
use std::rc::Rc;

use audit_client::{ClientConfig, HttpBackend};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use analysis_panel::AnalysisPanel;
pub use chat_panel::ChatPanel;
pub use dashboard_panel::DashboardPanel;
pub use fetch::FetchTransport;
pub use local_store::LocalStore;
pub use uploader::UploadController;

pub(crate) type Backend = HttpBackend<FetchTransport>;

/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
    tracing::info!("CyberStrike WASM initialized");
}

#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Backend URL precedence: the page's value, the build-time
/// `CYBERSTRIKE_BACKEND_URL`, then the local default
pub(crate) fn resolve_config(backend_url: Option<String>) -> audit_client::Result<ClientConfig> {
    match backend_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => ClientConfig::new(&url),
        None => match option_env!("CYBERSTRIKE_BACKEND_URL") {
            Some(url) => ClientConfig::new(url),
            None => Ok(ClientConfig::default()),
        },
    }
}

pub(crate) fn connect(backend_url: Option<String>) -> Result<Rc<Backend>, JsValue> {
    let config = resolve_config(backend_url).map_err(js_error)?;
    tracing::debug!(backend = %config.backend_url, "Using backend");
    Ok(Rc::new(HttpBackend::new(config, FetchTransport)))
}

pub(crate) fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Best-effort text for a thrown JS value
pub(crate) fn describe_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
