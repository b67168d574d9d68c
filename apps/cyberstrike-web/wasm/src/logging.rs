//! Browser console logging
//!
//! `tracing` is built with its `log` feature, so with no subscriber
//! installed every event is re-emitted as a `log` record. `wasm_logger`
//! writes those to the console method matching their level.

use log::Level;

/// Debug builds log at DEBUG, release at INFO
fn max_level() -> Level {
    if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    }
}

/// Install the console logger. A second call reports the existing logger
/// to the console and keeps it.
pub fn init() {
    wasm_logger::init(wasm_logger::Config::new(max_level()));
}

