// Quadtree index over node centers.
//
// Rects live in a flat arena in first-insertion order; the tree only holds slot
// indices into it. Lookup by id goes through `slots`. Overwriting a rect by id
// keeps its slot and moves it to the leaf for its new center.
//
// The root grows by doubling toward any point outside it, so there is no fixed
// world extent.

use super::{Point, Rect};
use std::collections::HashMap;

/// Slots per leaf before it splits.
const LEAF_CAPACITY: usize = 8;
/// Leaves smaller than this never split (identical centers pile up here).
const MIN_CELL_SIZE: f64 = 0.25;
/// Side length of the first root, centered on the first point.
const INITIAL_EXTENT: f64 = 512.0;

/// Square cell, half-open on the right and bottom edges.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Bounds {
    x0: f64,
    y0: f64,
    size: f64,
}

impl Bounds {
    fn around(p: Point, size: f64) -> Self {
        Self { x0: p.x - size / 2.0, y0: p.y - size / 2.0, size }
    }

    fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x < self.x0 + self.size && p.y >= self.y0 && p.y < self.y0 + self.size
    }

    /// Quadrant index: bit 0 set for east, bit 1 set for south.
    fn quadrant(&self, p: Point) -> usize {
        let half = self.size / 2.0;
        let east = p.x >= self.x0 + half;
        let south = p.y >= self.y0 + half;
        (east as usize) | ((south as usize) << 1)
    }

    fn child(&self, quadrant: usize) -> Bounds {
        let half = self.size / 2.0;
        Bounds {
            x0: if quadrant & 1 != 0 { self.x0 + half } else { self.x0 },
            y0: if quadrant & 2 != 0 { self.y0 + half } else { self.y0 },
            size: half,
        }
    }

    /// Squared distance from `p` to the closest point of the cell.
    fn distance_sq(&self, p: Point) -> f64 {
        let dx = (self.x0 - p.x).max(p.x - (self.x0 + self.size)).max(0.0);
        let dy = (self.y0 - p.y).max(p.y - (self.y0 + self.size)).max(0.0);
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone)]
struct QuadNode {
    bounds: Bounds,
    /// Arena slots; only leaves hold any.
    items: Vec<usize>,
    children: Option<[usize; 4]>,
}

impl QuadNode {
    fn leaf(bounds: Bounds) -> Self {
        Self { bounds, items: Vec::new(), children: None }
    }
}

/// Rect store with nearest-center-within-radius queries.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    rects: Vec<Rect>,
    slots: HashMap<u32, usize>,
    nodes: Vec<QuadNode>,
    root: Option<usize>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a flat list, e.g. a decoded snapshot.
    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        let mut index = Self::new();
        for rect in rects {
            index.add(rect);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<Rect> {
        self.slots.get(&id).map(|&slot| self.rects[slot])
    }

    /// All rects in first-insertion order.
    pub fn all_rects(&self) -> Vec<Rect> {
        self.rects.clone()
    }

    /// Insert a rect, or overwrite the stored rect with the same id.
    /// Coordinates must be finite.
    pub fn add(&mut self, rect: Rect) {
        debug_assert!(
            rect.center().x.is_finite() && rect.center().y.is_finite(),
            "rect {} has a non-finite center",
            rect.id
        );

        match self.slots.get(&rect.id).copied() {
            Some(slot) => {
                let old_center = self.rects[slot].center();
                self.remove_slot(slot, old_center);
                self.rects[slot] = rect;
                self.insert_slot(slot);
            }
            None => {
                let slot = self.rects.len();
                self.rects.push(rect);
                self.slots.insert(rect.id, slot);
                self.insert_slot(slot);
            }
        }
    }

    /// Some rect whose center lies strictly inside the circle, if any.
    /// See [`nearest_within`](Self::nearest_within) for which one.
    pub fn query_nearest(&self, cx: f64, cy: f64, radius: f64) -> Option<Rect> {
        self.nearest_within(Point { x: cx, y: cy }, radius, None)
    }

    /// The rect whose center is closest to `center` and strictly within
    /// `radius` of it, skipping the rect with id `exclude`.
    ///
    /// Equal distances resolve to the smaller id, so the answer depends only on
    /// the stored set and not on insertion order.
    pub fn nearest_within(&self, center: Point, radius: f64, exclude: Option<u32>) -> Option<Rect> {
        let root = self.root?;
        let radius_sq = radius * radius;
        let mut best: Option<(f64, usize)> = None;
        let mut stack = vec![root];

        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            let limit = best.map_or(radius_sq, |(d, _)| d);
            if node.bounds.distance_sq(center) > limit {
                continue;
            }

            if let Some(children) = node.children {
                stack.extend(children);
                continue;
            }

            for &slot in &node.items {
                let rect = &self.rects[slot];
                if exclude == Some(rect.id) {
                    continue;
                }
                let c = rect.center();
                let d = (c.x - center.x).powi(2) + (c.y - center.y).powi(2);
                if d >= radius_sq {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((bd, bs)) => d < bd || (d == bd && rect.id < self.rects[bs].id),
                };
                if better {
                    best = Some((d, slot));
                }
            }
        }

        best.map(|(_, slot)| self.rects[slot])
    }

    fn insert_slot(&mut self, slot: usize) {
        let p = self.rects[slot].center();

        let mut root = match self.root {
            Some(root) => root,
            None => {
                self.nodes.push(QuadNode::leaf(Bounds::around(p, INITIAL_EXTENT)));
                self.nodes.len() - 1
            }
        };
        while !self.nodes[root].bounds.contains(p) {
            root = self.grow(root, p);
        }
        self.root = Some(root);

        let leaf = self.leaf_for(root, p);
        self.nodes[leaf].items.push(slot);
        if self.nodes[leaf].items.len() > LEAF_CAPACITY {
            self.split(leaf);
        }
    }

    fn remove_slot(&mut self, slot: usize, at: Point) {
        let Some(root) = self.root else { return };
        let leaf = self.leaf_for(root, at);
        self.nodes[leaf].items.retain(|&s| s != slot);
    }

    fn leaf_for(&self, root: usize, p: Point) -> usize {
        let mut n = root;
        while let Some(children) = self.nodes[n].children {
            n = children[self.nodes[n].bounds.quadrant(p)];
        }
        n
    }

    /// Wrap `root` in a parent twice its size, extended toward `p`.
    fn grow(&mut self, root: usize, p: Point) -> usize {
        let b = self.nodes[root].bounds;
        let west = p.x < b.x0;
        let north = p.y < b.y0;
        let grown = Bounds {
            x0: if west { b.x0 - b.size } else { b.x0 },
            y0: if north { b.y0 - b.size } else { b.y0 },
            size: b.size * 2.0,
        };

        // Growing west puts the old root in the east half, and so on.
        let old_quadrant = (west as usize) | ((north as usize) << 1);
        let mut children = [root; 4];
        for (q, child) in children.iter_mut().enumerate() {
            if q != old_quadrant {
                self.nodes.push(QuadNode::leaf(grown.child(q)));
                *child = self.nodes.len() - 1;
            }
        }

        self.nodes.push(QuadNode {
            bounds: grown,
            items: Vec::new(),
            children: Some(children),
        });
        self.nodes.len() - 1
    }

    fn split(&mut self, n: usize) {
        let bounds = self.nodes[n].bounds;
        if bounds.size / 2.0 < MIN_CELL_SIZE {
            return;
        }

        let first = self.nodes.len();
        for q in 0..4 {
            self.nodes.push(QuadNode::leaf(bounds.child(q)));
        }
        let children = [first, first + 1, first + 2, first + 3];

        let items = std::mem::take(&mut self.nodes[n].items);
        self.nodes[n].children = Some(children);
        for slot in items {
            let q = bounds.quadrant(self.rects[slot].center());
            self.nodes[children[q]].items.push(slot);
        }

        // Everything may have landed in one quadrant.
        for child in children {
            if self.nodes[child].items.len() > LEAF_CAPACITY {
                self.split(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(id: u32, cx: f64, cy: f64) -> Rect {
        Rect::new(id, cx - 5.0, cy - 5.0, 10.0, 10.0)
    }

    #[test]
    fn test_insert_and_query() {
        let mut index = SpatialIndex::new();
        index.add(square(1, 0.0, 0.0));
        index.add(square(2, 200.0, 200.0));

        assert_eq!(index.query_nearest(3.0, 4.0, 10.0).map(|r| r.id), Some(1));
        assert_eq!(index.query_nearest(195.0, 200.0, 10.0).map(|r| r.id), Some(2));
        assert!(index.query_nearest(100.0, 100.0, 10.0).is_none());
    }

    #[test]
    fn test_radius_is_strict() {
        let mut index = SpatialIndex::new();
        index.add(square(1, 10.0, 0.0));

        assert!(index.query_nearest(0.0, 0.0, 10.0).is_none());
        assert!(index.query_nearest(0.0, 0.0, 10.001).is_some());
    }

    #[test]
    fn test_nearest_wins_then_smallest_id() {
        let mut index = SpatialIndex::new();
        index.add(square(9, 4.0, 0.0));
        index.add(square(3, 8.0, 0.0));
        assert_eq!(index.query_nearest(0.0, 0.0, 50.0).map(|r| r.id), Some(9));

        index.add(square(5, -4.0, 0.0));
        index.add(square(7, 0.0, 4.0));
        assert_eq!(index.query_nearest(0.0, 0.0, 50.0).map(|r| r.id), Some(5));
    }

    #[test]
    fn test_exclude_skips_by_id() {
        let mut index = SpatialIndex::new();
        index.add(square(1, 0.0, 0.0));
        index.add(square(2, 6.0, 0.0));

        let hit = index.nearest_within(Point { x: 0.0, y: 0.0 }, 20.0, Some(1));
        assert_eq!(hit.map(|r| r.id), Some(2));
        assert!(index.nearest_within(Point { x: 0.0, y: 0.0 }, 5.0, Some(1)).is_none());
    }

    #[test]
    fn test_add_overwrites_by_id() {
        let mut index = SpatialIndex::new();
        index.add(square(1, 0.0, 0.0));
        index.add(square(1, 1000.0, 0.0));

        assert_eq!(index.len(), 1);
        assert!(index.query_nearest(0.0, 0.0, 10.0).is_none());
        assert_eq!(index.query_nearest(1000.0, 0.0, 10.0).map(|r| r.id), Some(1));
        assert_eq!(index.get(1).map(|r| r.x), Some(995.0));
    }

    #[test]
    fn test_grows_in_every_direction() {
        let mut index = SpatialIndex::new();
        let points = [
            (0.0, 0.0),
            (10_000.0, 0.0),
            (-10_000.0, 0.0),
            (0.0, 25_000.0),
            (0.0, -25_000.0),
            (-1.0e6, -1.0e6),
            (1.0e6, 1.0e6),
        ];
        for (i, (x, y)) in points.iter().enumerate() {
            index.add(square(i as u32, *x, *y));
        }
        for (i, (x, y)) in points.iter().enumerate() {
            assert_eq!(index.query_nearest(*x, *y, 1.0).map(|r| r.id), Some(i as u32));
        }
    }

    #[test]
    fn test_many_points_split_leaves() {
        let mut index = SpatialIndex::new();
        for i in 0..40u32 {
            for j in 0..40u32 {
                index.add(square(i * 40 + j, i as f64 * 20.0, j as f64 * 20.0));
            }
        }
        assert_eq!(index.len(), 1600);
        assert!(index.nodes.len() > 1);

        for i in 0..40u32 {
            for j in 0..40u32 {
                let hit = index.query_nearest(i as f64 * 20.0 + 1.0, j as f64 * 20.0, 5.0);
                assert_eq!(hit.map(|r| r.id), Some(i * 40 + j));
            }
        }
    }

    #[test]
    fn test_identical_centers_do_not_split_forever() {
        let mut index = SpatialIndex::new();
        for id in 0..100 {
            index.add(square(id, 50.0, 50.0));
        }
        assert_eq!(index.len(), 100);
        assert_eq!(index.query_nearest(50.0, 50.0, 1.0).map(|r| r.id), Some(0));
    }

    #[test]
    fn test_order_independent_queries() {
        let rects: Vec<Rect> = (0..30u32)
            .map(|i| square(i, (i % 6) as f64 * 7.0, (i / 6) as f64 * 7.0))
            .collect();
        let forward = SpatialIndex::from_rects(rects.iter().copied());
        let backward = SpatialIndex::from_rects(rects.iter().rev().copied());

        for x in (-10..50).step_by(3) {
            for y in (-10..40).step_by(3) {
                let a = forward.query_nearest(x as f64, y as f64, 9.0).map(|r| r.id);
                let b = backward.query_nearest(x as f64, y as f64, 9.0).map(|r| r.id);
                assert_eq!(a, b, "query at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_all_rects_keeps_insertion_order() {
        let mut index = SpatialIndex::new();
        index.add(square(3, 0.0, 0.0));
        index.add(square(1, 100.0, 0.0));
        index.add(square(3, 50.0, 50.0));

        let ids: Vec<u32> = index.all_rects().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
