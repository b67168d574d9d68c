//! Reading picked files into memory

use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FileList};

use audit_client::LocalFile;

pub async fn read_file(file: &File) -> Result<LocalFile, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    Ok(LocalFile::new(file.name(), bytes))
}

/// Read every file of an `<input type="file">` selection, in order
pub async fn read_file_list(list: &FileList) -> Result<Vec<LocalFile>, JsValue> {
    let mut files = Vec::with_capacity(list.length() as usize);
    for index in 0..list.length() {
        if let Some(file) = list.get(index) {
            files.push(read_file(&file).await?);
        }
    }
    Ok(files)
}
