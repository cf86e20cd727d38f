// Default geometry for a new node.
//
// Children go below the reference node, siblings to its right, separated by
// the push distance. Pure: never touches the index.

use super::{GridConfig, OperationInput, OperationParams, Rect, Relation, Size};

/// Candidate rect for `input`, before overlap resolution.
///
/// Size comes from `input.size` or `cfg.node_size`, capped at
/// `params.max_width` x `params.max_height`.
pub fn place_node(input: &OperationInput, cfg: &GridConfig, params: &OperationParams) -> Rect {
    let size = clamp_size(input.size.unwrap_or(cfg.node_size), params);
    let reference = &input.reference;
    let push = params.push_distance;

    let (x, y) = match input.relation {
        Relation::Child => (reference.x, reference.bottom() + push),
        Relation::Sibling => (reference.right() + push, reference.y),
    };

    Rect {
        id: input.id,
        x,
        y,
        width: size.width,
        height: size.height,
        relation: Some(input.relation),
    }
}

fn clamp_size(size: Size, params: &OperationParams) -> Size {
    Size {
        width: size.width.min(params.max_width),
        height: size.height.min(params.max_height),
    }
}
