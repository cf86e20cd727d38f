//! Output types for the canvas host.
//!
//! These structs are serialized to JSON and handed back across the wasm
//! boundary. The host moves canvas nodes to `placed`/`displaced` and stores
//! `serialized_index` for the next session.

use crate::error::GridError;
use crate::layout::{LayoutGrid, OperationInput, OperationParams, OperationResult, Rect};
use serde::Serialize;

/// Error information for the host's notices and debug console
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    /// "invalid_input", "resolution_limit_exceeded", "malformed_buffer" or "parse_error"
    pub kind: String,
    pub message: String,
}

impl From<&GridError> for ErrorInfo {
    fn from(err: &GridError) -> Self {
        Self { kind: err.kind().to_string(), message: err.to_string() }
    }
}

/// Result of one node operation as sent to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placed: Option<Rect>,
    pub displaced: Vec<Rect>,
    /// Unchanged input snapshot when the operation failed.
    pub serialized_index: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl OperationOutput {
    fn failed(error: ErrorInfo, snapshot: &[u8]) -> Self {
        Self {
            placed: None,
            displaced: vec![],
            serialized_index: snapshot.to_vec(),
            error: Some(error),
        }
    }
}

impl From<OperationResult> for OperationOutput {
    fn from(result: OperationResult) -> Self {
        Self {
            placed: Some(result.placed),
            displaced: result.displaced,
            serialized_index: result.serialized_index,
            error: None,
        }
    }
}

/// Restore a grid from `snapshot`, apply the JSON-encoded `OperationInput`,
/// and package the outcome. Never fails; errors land in `error`.
pub fn operate(snapshot: &[u8], input_json: &str, params: &OperationParams) -> OperationOutput {
    let input: OperationInput = match serde_json::from_str(input_json) {
        Ok(input) => input,
        Err(e) => {
            let info = ErrorInfo { kind: "parse_error".to_string(), message: e.to_string() };
            return OperationOutput::failed(info, snapshot);
        }
    };

    let result = LayoutGrid::from_bytes(snapshot)
        .and_then(|mut grid| grid.operate_on_node(&input, params));
    match result {
        Ok(result) => result.into(),
        Err(e) => OperationOutput::failed(ErrorInfo::from(&e), snapshot),
    }
}
