//! Browser `fetch` transport

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use audit_client::{ClientError, HttpReply, Transport};

use crate::describe_js;

/// POSTs JSON with `window.fetch`. Non-2xx replies are returned as-is for
/// the protocol layer to judge.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn post_json(&self, url: &str, body: String) -> audit_client::Result<HttpReply> {
        post(url, &body)
            .await
            .map_err(|e| ClientError::Transport(describe_js(&e)))
    }
}

async fn post(url: &str, body: &str) -> Result<HttpReply, JsValue> {
    let window = web_sys::window().ok_or("No window")?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let response = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response.dyn_into()?;

    let text = JsFuture::from(response.text()?).await?;
    Ok(HttpReply {
        status: response.status(),
        body: text.as_string().unwrap_or_default(),
    })
}
