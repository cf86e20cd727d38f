// Mind map node placement.
//
// A new node is placed next to a reference node (below it as a child, to the
// right as a sibling), inserted into a quadtree keyed on node centers, and any
// nodes it lands on are pushed out of the way. Pushed nodes can land on others,
// so displacement propagates until nothing collides or the budget runs out.
//
// Submodules:
// - spatial_index: quadtree over an arena of rects
// - placement: default geometry for a new node
// - overlap: overlap regions and the displacement loop
// - grid: LayoutGrid, the owner of the index and the public operation

use serde::{Deserialize, Serialize};

mod grid;
mod overlap;
mod placement;
mod spatial_index;

pub use grid::LayoutGrid;
pub use overlap::{OverlapRegion, resolve_overlaps};
pub use placement::place_node;
pub use spatial_index::SpatialIndex;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// How a node was placed relative to its reference node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Below the reference; collisions push along y.
    #[serde(rename = "addChild")]
    Child,
    /// Right of the reference; collisions push along x.
    #[serde(rename = "addSibling")]
    Sibling,
}

/// Bounds of one canvas node. `x`/`y` is the top-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Not persisted; snapshots decode to `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
}

impl Rect {
    pub fn new(id: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id, x, y, width, height, relation: None }
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }

    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Size for new nodes when the caller doesn't give one.
    pub node_size: Size,
    /// Displacements allowed per operation before giving up.
    pub max_displacements: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            node_size: Size { width: 100.0, height: 50.0 },
            max_displacements: 256,
        }
    }
}

/// Per-call knobs for [`LayoutGrid::operate_on_node`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationParams {
    /// Gap between a node and the one it is placed against or pushed past.
    pub push_distance: f64,
    /// Caps on the size of a newly placed node.
    pub max_width: f64,
    pub max_height: f64,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            push_distance: 10.0,
            max_width: 200.0,
            max_height: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationInput {
    /// Id for the new node.
    pub id: u32,
    #[serde(rename = "action")]
    pub relation: Relation,
    #[serde(rename = "referenceCoordinates")]
    pub reference: Rect,
    /// Overrides `GridConfig::node_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    /// The new node, at its final position.
    pub placed: Rect,
    /// Nodes moved during resolution, in the order they moved.
    pub displaced: Vec<Rect>,
    /// Snapshot of the index after the operation.
    pub serialized_index: Vec<u8>,
}
