//! Quadtree spatial index over axis-aligned bounding boxes.
//!
//! Each object lives at the deepest node whose region fully contains its
//! bounds. Objects that straddle a split line stay at the parent, and
//! objects outside the root region stay at the root, so every stored object
//! is reachable by a query that touches it.
//!
//! Result order: [`Quadtree::query_region`] returns ids in insertion order;
//! [`Quadtree::query_point`] returns the most recently inserted id first so
//! the topmost object wins a hit test. [`Quadtree::update`] keeps an id's
//! insertion rank, so moving an object does not bring it to the front.

use crate::config::QuadtreeConfig;
use kurbo::{Point, Rect};
use std::collections::HashMap;
use std::hash::Hash;

/// A stored object.
#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    id: K,
    bounds: Rect,
    rank: u64,
}

/// Closed-interval overlap: touching edges and zero-area rects count.
fn rects_touch(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Whether `outer` fully contains `inner` (edges inclusive).
fn region_contains(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && inner.x1 <= outer.x1 && outer.y0 <= inner.y0 && inner.y1 <= outer.y1
}

/// Split a region into four equal quadrants: NW, NE, SW, SE.
fn quadrants(region: Rect) -> [Rect; 4] {
    let c = region.center();
    [
        Rect::new(region.x0, region.y0, c.x, c.y),
        Rect::new(c.x, region.y0, region.x1, c.y),
        Rect::new(region.x0, c.y, c.x, region.y1),
        Rect::new(c.x, c.y, region.x1, region.y1),
    ]
}

#[derive(Debug, Clone)]
struct QuadNode<K> {
    region: Rect,
    depth: usize,
    items: Vec<Entry<K>>,
    children: Option<Box<[QuadNode<K>; 4]>>,
}

impl<K: Copy + Eq> QuadNode<K> {
    fn new(region: Rect, depth: usize) -> Self {
        Self {
            region,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn fitting_child(&mut self, bounds: Rect) -> Option<&mut QuadNode<K>> {
        self.children
            .as_mut()?
            .iter_mut()
            .find(|child| region_contains(child.region, bounds))
    }

    fn insert(&mut self, entry: Entry<K>, config: &QuadtreeConfig) {
        if let Some(child) = self.fitting_child(entry.bounds) {
            child.insert(entry, config);
            return;
        }
        self.items.push(entry);
        if self.children.is_none()
            && self.items.len() > config.capacity
            && self.depth < config.max_depth
        {
            self.subdivide(config);
        }
    }

    fn subdivide(&mut self, config: &QuadtreeConfig) {
        log::trace!(
            "quadtree: subdividing {:?} at depth {} ({} items)",
            self.region,
            self.depth,
            self.items.len()
        );
        let depth = self.depth + 1;
        self.children = Some(Box::new(quadrants(self.region).map(|r| QuadNode::new(r, depth))));
        for entry in std::mem::take(&mut self.items) {
            self.insert(entry, config);
        }
    }

    fn remove(&mut self, id: K, bounds: Rect, config: &QuadtreeConfig) -> Option<Entry<K>> {
        let removed = match self.fitting_child(bounds) {
            Some(child) => child.remove(id, bounds, config)?,
            None => {
                let index = self.items.iter().position(|e| e.id == id)?;
                self.items.swap_remove(index)
            }
        };
        self.try_collapse(config);
        Some(removed)
    }

    /// Fold leaf children back into this node once they hold few enough items.
    fn try_collapse(&mut self, config: &QuadtreeConfig) {
        let Some(children) = self.children.as_ref() else {
            return;
        };
        if children.iter().any(|c| c.children.is_some()) {
            return;
        }
        let total = self.items.len() + children.iter().map(|c| c.items.len()).sum::<usize>();
        if total > config.capacity {
            return;
        }
        if let Some(children) = self.children.take() {
            for child in *children {
                self.items.extend(child.items);
            }
        }
    }

    fn collect(&self, rect: Rect, out: &mut Vec<Entry<K>>) {
        out.extend(self.items.iter().filter(|e| rects_touch(e.bounds, rect)));
        if let Some(children) = &self.children {
            for child in children.iter() {
                if rects_touch(child.region, rect) {
                    child.collect(rect, out);
                }
            }
        }
    }

    fn max_depth(&self) -> usize {
        match &self.children {
            Some(children) => children.iter().map(|c| c.max_depth()).max().unwrap_or(self.depth),
            None => self.depth,
        }
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(|c| c.node_count()).sum())
    }
}

/// A mutable quadtree keyed by object identity.
#[derive(Debug, Clone)]
pub struct Quadtree<K> {
    config: QuadtreeConfig,
    root: QuadNode<K>,
    entries: HashMap<K, (Rect, u64)>,
    next_rank: u64,
}

impl<K: Copy + Eq + Hash> Default for Quadtree<K> {
    fn default() -> Self {
        Self::new(QuadtreeConfig::default())
    }
}

impl<K: Copy + Eq + Hash> Quadtree<K> {
    /// Create an empty index.
    pub fn new(config: QuadtreeConfig) -> Self {
        let root = QuadNode::new(config.region, 0);
        Self {
            config,
            root,
            entries: HashMap::new(),
            next_rank: 0,
        }
    }

    /// Get the configuration this index was built with.
    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    /// Insert an object. Inserting a known id behaves like [`Self::update`].
    pub fn insert(&mut self, id: K, bounds: Rect) {
        if self.entries.contains_key(&id) {
            self.update(id, bounds);
            return;
        }
        let rank = self.next_rank;
        self.next_rank += 1;
        self.place(Entry { id, bounds, rank });
    }

    /// Remove an object. Returns false if the id was not stored.
    pub fn remove(&mut self, id: K) -> bool {
        self.take(id).is_some()
    }

    /// Move an object to new bounds, keeping its insertion rank.
    /// Returns false (and does nothing) if the id was not stored.
    pub fn update(&mut self, id: K, bounds: Rect) -> bool {
        match self.take(id) {
            Some(entry) => {
                self.place(Entry { bounds, ..entry });
                true
            }
            None => false,
        }
    }

    /// Every object whose bounds touch `rect`, in insertion order.
    pub fn query_region(&self, rect: Rect) -> Vec<K> {
        let mut found = self.collect(rect);
        found.sort_by_key(|e| e.rank);
        found.into_iter().map(|e| e.id).collect()
    }

    /// Every object whose bounds contain `point`, most recently inserted first.
    pub fn query_point(&self, point: Point) -> Vec<K> {
        let mut found = self.collect(Rect::from_points(point, point));
        found.sort_by(|a, b| b.rank.cmp(&a.rank));
        found.into_iter().map(|e| e.id).collect()
    }

    /// Remove everything and reset to a single root node.
    pub fn clear(&mut self) {
        self.root = QuadNode::new(self.config.region, 0);
        self.entries.clear();
        self.next_rank = 0;
    }

    /// Get the stored bounds of an object.
    pub fn bounds_of(&self, id: K) -> Option<Rect> {
        self.entries.get(&id).map(|(bounds, _)| *bounds)
    }

    /// Check if an object is stored.
    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Depth of the deepest node (0 for an unsubdivided root).
    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Number of tree nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    fn place(&mut self, entry: Entry<K>) {
        self.entries.insert(entry.id, (entry.bounds, entry.rank));
        self.root.insert(entry, &self.config);
    }

    fn take(&mut self, id: K) -> Option<Entry<K>> {
        let (bounds, _) = self.entries.remove(&id)?;
        let removed = self.root.remove(id, bounds, &self.config);
        if removed.is_none() {
            log::warn!("quadtree: id tracked but not found in tree at {:?}", bounds);
        }
        removed
    }

    fn collect(&self, rect: Rect) -> Vec<Entry<K>> {
        let mut out = Vec::new();
        self.root.collect(rect, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small_config() -> QuadtreeConfig {
        QuadtreeConfig {
            region: Rect::new(0.0, 0.0, 1024.0, 1024.0),
            capacity: 4,
            max_depth: 5,
        }
    }

    fn cell(i: u32) -> Rect {
        let x = (i % 32) as f64 * 32.0;
        let y = (i / 32) as f64 * 32.0;
        Rect::new(x + 1.0, y + 1.0, x + 9.0, y + 9.0)
    }

    fn assert_all_once(tree: &Quadtree<u32>, expected: &HashSet<u32>) {
        let found = tree.query_region(tree.config().region);
        let unique: HashSet<u32> = found.iter().copied().collect();
        assert_eq!(found.len(), unique.len(), "duplicate ids in {:?}", found);
        assert_eq!(&unique, expected);
    }

    #[test]
    fn test_insert_and_query_region() {
        let mut tree = Quadtree::new(small_config());
        tree.insert(1, Rect::new(10.0, 10.0, 20.0, 20.0));
        tree.insert(2, Rect::new(500.0, 500.0, 520.0, 520.0));
        assert_eq!(tree.query_region(Rect::new(0.0, 0.0, 100.0, 100.0)), vec![1]);
        assert_eq!(tree.query_region(Rect::new(0.0, 0.0, 1024.0, 1024.0)), vec![1, 2]);
        assert!(tree.query_region(Rect::new(200.0, 200.0, 300.0, 300.0)).is_empty());
    }

    #[test]
    fn test_subdivides_past_capacity() {
        let mut tree = Quadtree::new(small_config());
        for i in 0..4 {
            tree.insert(i, cell(i));
        }
        assert_eq!(tree.depth(), 0);
        tree.insert(4, cell(4));
        assert!(tree.depth() >= 1);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut tree = Quadtree::new(small_config());
        // Identical tiny boxes can never be separated; depth must stop at the limit.
        for i in 0..100 {
            tree.insert(i, Rect::new(1.0, 1.0, 1.5, 1.5));
        }
        assert!(tree.depth() <= 5);
        assert_eq!(tree.query_point(Point::new(1.2, 1.2)).len(), 100);
    }

    #[test]
    fn test_straddling_object_stays_at_parent() {
        let mut tree = Quadtree::new(small_config());
        for i in 0..10 {
            tree.insert(i, cell(i));
        }
        // Crosses the root's center lines.
        tree.insert(99, Rect::new(500.0, 500.0, 530.0, 530.0));
        assert_eq!(tree.query_point(Point::new(512.0, 512.0)), vec![99]);
        assert_eq!(tree.query_point(Point::new(505.0, 525.0)), vec![99]);
    }

    #[test]
    fn test_outside_root_region_is_discoverable() {
        let mut tree = Quadtree::new(small_config());
        tree.insert(7, Rect::new(-500.0, -500.0, -400.0, -400.0));
        tree.insert(8, Rect::new(1000.0, 1000.0, 1100.0, 1100.0));
        assert_eq!(tree.query_point(Point::new(-450.0, -450.0)), vec![7]);
        assert_eq!(tree.query_region(Rect::new(1050.0, 1050.0, 2000.0, 2000.0)), vec![8]);
    }

    #[test]
    fn test_remove_and_unknown_ids() {
        let mut tree = Quadtree::new(small_config());
        tree.insert(1, Rect::new(10.0, 10.0, 20.0, 20.0));
        assert!(tree.remove(1));
        assert!(!tree.remove(1));
        assert!(!tree.remove(42));
        assert!(!tree.update(42, Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(tree.is_empty());
        assert!(tree.query_point(Point::new(15.0, 15.0)).is_empty());
    }

    #[test]
    fn test_update_moves_object() {
        let mut tree = Quadtree::new(small_config());
        for i in 0..20 {
            tree.insert(i, cell(i));
        }
        assert!(tree.update(3, Rect::new(900.0, 900.0, 910.0, 910.0)));
        assert!(!tree.query_region(cell(3)).contains(&3));
        assert_eq!(tree.query_point(Point::new(905.0, 905.0)), vec![3]);
        assert_eq!(tree.bounds_of(3), Some(Rect::new(900.0, 900.0, 910.0, 910.0)));
        assert_eq!(tree.len(), 20);
    }

    #[test]
    fn test_point_query_topmost_first() {
        let mut tree = Quadtree::new(small_config());
        let shared = Rect::new(10.0, 10.0, 50.0, 50.0);
        tree.insert(1, shared);
        tree.insert(2, shared);
        tree.insert(3, shared);
        assert_eq!(tree.query_point(Point::new(20.0, 20.0)), vec![3, 2, 1]);
        assert_eq!(tree.query_region(shared), vec![1, 2, 3]);
    }

    #[test]
    fn test_update_keeps_rank() {
        let mut tree = Quadtree::new(small_config());
        let shared = Rect::new(10.0, 10.0, 50.0, 50.0);
        tree.insert(1, shared);
        tree.insert(2, shared);
        tree.update(1, shared.inflate(1.0, 1.0));
        assert_eq!(tree.query_point(Point::new(20.0, 20.0)), vec![2, 1]);
        // Re-inserting a known id is an update, not a duplicate.
        tree.insert(1, shared);
        assert_eq!(tree.query_point(Point::new(20.0, 20.0)), vec![2, 1]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_zero_area_bounds_and_edges() {
        let mut tree = Quadtree::new(small_config());
        tree.insert(1, Rect::new(100.0, 100.0, 100.0, 100.0));
        tree.insert(2, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(tree.query_point(Point::new(100.0, 100.0)), vec![1]);
        // Touching the right edge counts as an intersection.
        assert_eq!(tree.query_point(Point::new(50.0, 25.0)), vec![2]);
    }

    #[test]
    fn test_nan_bounds_do_not_panic() {
        let mut tree = Quadtree::new(small_config());
        tree.insert(1, Rect::new(f64::NAN, 0.0, 10.0, 10.0));
        tree.insert(2, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(tree.query_point(Point::new(5.0, 5.0)), vec![2]);
        assert!(tree.remove(1));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_whole_region_query_after_mixed_mutations() {
        let mut tree = Quadtree::new(small_config());
        let mut expected = HashSet::new();
        for i in 0..300u32 {
            tree.insert(i, cell(i));
            expected.insert(i);
        }
        assert_all_once(&tree, &expected);

        for i in (0..300u32).step_by(3) {
            tree.update(i, cell((i * 7 + 11) % 900));
        }
        assert_all_once(&tree, &expected);

        for i in (0..300u32).step_by(2) {
            assert!(tree.remove(i));
            expected.remove(&i);
        }
        assert_all_once(&tree, &expected);

        for i in 1000..1040u32 {
            tree.insert(i, Rect::new(500.0, 500.0, 600.0, 600.0));
            expected.insert(i);
        }
        assert_all_once(&tree, &expected);
    }

    #[test]
    fn test_removal_collapses_children() {
        let mut tree = Quadtree::new(small_config());
        for i in 0..40 {
            tree.insert(i, cell(i));
        }
        assert!(tree.node_count() > 1);
        for i in 0..40 {
            tree.remove(i);
        }
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_clear_resets() {
        let mut tree = Quadtree::new(small_config());
        for i in 0..50 {
            tree.insert(i, cell(i));
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert!(tree.query_region(Rect::new(0.0, 0.0, 1024.0, 1024.0)).is_empty());
    }
}
