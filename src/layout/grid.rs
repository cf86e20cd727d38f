// LayoutGrid: owns the spatial index and applies node operations to it.
//
// An operation validates its input, places the new node, and resolves overlaps
// on a staged copy of the index. The copy replaces the live index only when
// resolution succeeds, so a failed operation leaves the grid untouched.

use super::{
    GridConfig, OperationInput, OperationParams, OperationResult, Rect, SpatialIndex,
    place_node, resolve_overlaps,
};
use crate::codec;
use crate::error::{GridError, Result};

const REFERENCE_FIELDS: [&str; 4] =
    ["reference.x", "reference.y", "reference.width", "reference.height"];
const SNAPSHOT_FIELDS: [&str; 4] =
    ["snapshot.x", "snapshot.y", "snapshot.width", "snapshot.height"];
const PLACED_FIELDS: [&str; 4] = ["placed.x", "placed.y", "placed.width", "placed.height"];

#[derive(Debug, Clone, Default)]
pub struct LayoutGrid {
    index: SpatialIndex,
    cfg: GridConfig,
}

impl LayoutGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: GridConfig) -> Self {
        Self { index: SpatialIndex::new(), cfg }
    }

    /// Restore a grid from a snapshot produced by [`to_bytes`](Self::to_bytes).
    /// A partial trailing record is dropped; a record with non-finite or
    /// negative geometry is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_config(bytes, GridConfig::default())
    }

    pub fn from_bytes_with_config(bytes: &[u8], cfg: GridConfig) -> Result<Self> {
        let rects = codec::decode(bytes);
        for rect in &rects {
            validate_rect(rect, SNAPSHOT_FIELDS)?;
        }
        log::debug!("restored {} nodes from a {} byte snapshot", rects.len(), bytes.len());
        Ok(Self { index: SpatialIndex::from_rects(rects), cfg })
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(&self.index.all_rects())
    }

    /// Place node `input.id` next to `input.reference` and push aside whatever
    /// it lands on.
    pub fn operate_on_node(
        &mut self,
        input: &OperationInput,
        params: &OperationParams,
    ) -> Result<OperationResult> {
        validate_params(params)?;
        validate_rect(&input.reference, REFERENCE_FIELDS)?;
        if let Some(size) = input.size {
            check_extent("size.width", size.width)?;
            check_extent("size.height", size.height)?;
        }

        let candidate = place_node(input, &self.cfg, params);
        // Finite inputs can still sum past what a snapshot can hold.
        codec::check_encodable(&candidate, PLACED_FIELDS)?;
        log::debug!(
            "placing node {} as {:?} of node {} at ({}, {})",
            candidate.id,
            input.relation,
            input.reference.id,
            candidate.x,
            candidate.y
        );

        let mut staged = self.index.clone();
        staged.add(candidate);
        let displaced = resolve_overlaps(
            &mut staged,
            candidate.id,
            params.push_distance,
            self.cfg.max_displacements,
        )?;

        // The new node itself can get pushed by a cascade.
        let placed = staged.get(candidate.id).unwrap_or(candidate);
        self.index = staged;

        log::debug!("node {} placed, {} nodes displaced", placed.id, displaced.len());

        Ok(OperationResult {
            placed,
            displaced,
            serialized_index: self.to_bytes(),
        })
    }
}

fn validate_params(params: &OperationParams) -> Result<()> {
    check_extent("push_distance", params.push_distance)?;
    for (field, value) in [("max_width", params.max_width), ("max_height", params.max_height)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(GridError::InvalidInput { field, value });
        }
    }
    Ok(())
}

fn validate_rect(rect: &Rect, fields: [&'static str; 4]) -> Result<()> {
    check_finite(fields[0], rect.x)?;
    check_finite(fields[1], rect.y)?;
    check_extent(fields[2], rect.width)?;
    check_extent(fields[3], rect.height)
}

fn check_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GridError::InvalidInput { field, value })
    }
}

/// Finite and not negative.
fn check_extent(field: &'static str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(GridError::InvalidInput { field, value });
    }
    Ok(())
}
