//! Node placement for mind maps on a canvas.
//!
//! New nodes are placed below (child) or beside (sibling) a reference node,
//! and nodes they land on are pushed out of the way. Node bounds live in a
//! quadtree that is persisted between sessions as a compact binary snapshot
//! (see [`codec`]).
//!
//! The crate builds to wasm for the canvas host (see the `wasm` module) and can
//! be used directly from Rust through [`LayoutGrid`].

pub mod codec;
pub mod error;
pub mod layout;
mod output;
mod wasm;

pub use error::{GridError, Result};
pub use layout::{
    GridConfig, LayoutGrid, OperationInput, OperationParams, OperationResult, Rect, Relation, Size,
};
pub use output::{ErrorInfo, OperationOutput, operate};
