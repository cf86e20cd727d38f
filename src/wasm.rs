//! WASM bindings for the canvas host.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::to_string;
use wasm_bindgen::prelude::*;

use crate::codec;
use crate::layout::OperationParams;
use crate::output::operate;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    pub fn console_warn(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[mindmap-grid] {}", record.args());
        match record.level() {
            Level::Error => console_error(&line),
            Level::Warn => console_warn(&line),
            _ => console_log(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route engine logs to the console. With `debug` off only warnings and
/// errors are shown. Safe to call again to change the level.
#[wasm_bindgen]
pub fn init_logging(debug: bool) {
    // Already installed on repeat calls; only the level changes.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if debug { LevelFilter::Debug } else { LevelFilter::Warn });
}

/// Place a node against the grid stored in `snapshot` and return the outcome
/// as JSON (`placed`, `displaced`, `serialized_index`, `error`).
#[wasm_bindgen]
pub fn operate_on_node(
    snapshot: &[u8],
    input_json: &str,
    push_distance: f64,
    max_width: f64,
    max_height: f64,
) -> String {
    let params = OperationParams { push_distance, max_width, max_height };
    let output = operate(snapshot, input_json, &params);

    if let Some(error) = &output.error {
        console_error(&format!("Error placing node: {}", error.message));
    }

    to_string(&output).unwrap_or_else(|e| {
        console_error(&format!("Error serializing result: {:?}", e));
        r#"{"error": {"kind": "serialize_error", "message": "Serializing error"}}"#.to_string()
    })
}

/// Same as [`operate_on_node`] with the default push distance and size caps.
#[wasm_bindgen]
pub fn operate_on_node_default(snapshot: &[u8], input_json: &str) -> String {
    let params = OperationParams::default();
    operate_on_node(snapshot, input_json, params.push_distance, params.max_width, params.max_height)
}

/// Decode a snapshot into a JSON array of node rects, so the renderer can
/// restore positions without running an operation.
#[wasm_bindgen]
pub fn decode_snapshot(snapshot: &[u8]) -> String {
    let rects = codec::decode(snapshot);
    serde_json::to_string(&rects).unwrap_or_else(|_| "[]".to_string())
}
