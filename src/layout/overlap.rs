// Overlap resolution.
//
// Every rect has a circular overlap region derived from its relation. Whatever
// rect sits nearest inside that region gets pushed one of its own lengths plus
// the push distance along its axis, and then has its own region checked.
// This runs depth-first on an explicit stack: a pushed rect is fully settled
// before the rect that pushed it is checked again.

use super::{Point, Rect, Relation, SpatialIndex};
use crate::codec;
use crate::error::{GridError, Result};
use std::f64::consts::PI;

const DISPLACED_FIELDS: [&str; 4] =
    ["displaced.x", "displaced.y", "displaced.width", "displaced.height"];

/// Circle used to detect neighbors that collide with a rect.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlapRegion {
    pub center: Point,
    pub radius: f64,
}

impl OverlapRegion {
    /// Children care about vertical overlap (half height), siblings about
    /// horizontal overlap (half width). Untagged rects use the radius of the
    /// circle with the same area.
    pub fn of(rect: &Rect) -> Self {
        let radius = match rect.relation {
            Some(Relation::Child) => rect.height / 2.0,
            Some(Relation::Sibling) => rect.width / 2.0,
            None => (rect.width * rect.height / PI).sqrt(),
        };
        Self { center: rect.center(), radius }
    }
}

/// Move `rect` out along `axis` by its own extent plus `push`.
pub(crate) fn displace(rect: Rect, axis: Relation, push: f64) -> Rect {
    match axis {
        Relation::Child => Rect { y: rect.y + rect.height + push, ..rect },
        Relation::Sibling => Rect { x: rect.x + rect.width + push, ..rect },
    }
}

/// Push away everything colliding with the rect `start`, which must already be
/// in `index`. Returns the moved rects in the order they moved.
///
/// A collider moves along its own relation; untagged colliders (e.g. loaded
/// from a snapshot) take the axis of whatever pushed them. Fails with
/// [`GridError::ResolutionLimitExceeded`] after `budget` displacements, and with
/// [`GridError::InvalidInput`] if a push would move a rect out of snapshot
/// range. `index` is left mid-resolution on failure, so callers should work on
/// a copy.
pub fn resolve_overlaps(
    index: &mut SpatialIndex,
    start: u32,
    push: f64,
    budget: usize,
) -> Result<Vec<Rect>> {
    let mut displaced = Vec::new();
    let Some(first) = index.get(start) else {
        return Ok(displaced);
    };
    let Some(first_axis) = first.relation else {
        return Ok(displaced);
    };

    // (rect id, axis it was placed or pushed along)
    let mut stack: Vec<(u32, Relation)> = vec![(start, first_axis)];

    while let Some(&(id, axis)) = stack.last() {
        let Some(rect) = index.get(id) else {
            stack.pop();
            continue;
        };

        let region = OverlapRegion::of(&rect);
        let Some(hit) = index.nearest_within(region.center, region.radius, Some(id)) else {
            stack.pop();
            continue;
        };

        if displaced.len() >= budget {
            log::warn!(
                "overlap resolution from node {} gave up after {} displacements",
                start,
                budget
            );
            return Err(GridError::ResolutionLimitExceeded { steps: budget });
        }

        let hit_axis = hit.relation.unwrap_or(axis);
        let moved = displace(hit, hit_axis, push);
        codec::check_encodable(&moved, DISPLACED_FIELDS)?;
        log::trace!(
            "node {} pushed node {} to ({}, {})",
            id,
            moved.id,
            moved.x,
            moved.y
        );

        index.add(moved);
        displaced.push(moved);
        stack.push((moved.id, hit_axis));
    }

    Ok(displaced)
}
