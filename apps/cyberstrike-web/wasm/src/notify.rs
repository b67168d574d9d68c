//! Change callbacks registered from JavaScript

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;

/// Shared slot for the page's change callback; clones notify the same function
#[derive(Clone, Default)]
pub(crate) struct Notifier {
    callback: Rc<RefCell<Option<js_sys::Function>>>,
}

impl Notifier {
    pub fn set(&self, callback: Option<js_sys::Function>) {
        *self.callback.borrow_mut() = callback;
    }

    pub fn notify(&self) {
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                tracing::warn!("Change callback threw: {}", crate::describe_js(&e));
            }
        }
    }
}
