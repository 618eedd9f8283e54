//! Binary space partitioning
//!
//! Splits the dungeon rectangle recursively into a binary tree. Leaves are the
//! spaces rooms are later carved from; internal nodes are where the corridor
//! router joins the two halves back together.
//!
//! Nodes live in an arena in breadth-first order. A cut is only legal when
//! both halves keep at least twice the minimum room size along the cut axis,
//! and that check runs before any random draw, so a node that cannot be split
//! never consumes randomness.

use std::collections::VecDeque;

use crate::rng::DungeonRng;

use super::rect::{Rect, SplitAxis};

/// One side must be this much longer than the other before it is always the one cut
const ELONGATION_RATIO: f32 = 1.5;

/// Index of a node in its [`PartitionTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A rectangle of the partition tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNode {
    pub id: NodeId,
    pub bounds: Rect,
    /// Distance from the root (root is 0)
    pub depth: u32,
    /// Exactly two children, or none for a leaf
    pub children: Option<[NodeId; 2]>,
    /// Axis this node was cut along, if it was cut
    pub split: Option<SplitAxis>,
}

impl PartitionNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// The finished partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTree {
    nodes: Vec<PartitionNode>,
}

impl PartitionTree {
    /// Partition a `width × length` dungeon
    ///
    /// Nodes deeper than `max_iterations` are never split.
    pub fn build(
        width: i32,
        length: i32,
        max_iterations: u32,
        room_width_min: i32,
        room_length_min: i32,
        rng: &mut DungeonRng,
    ) -> Self {
        let mut nodes = vec![PartitionNode {
            id: NodeId(0),
            bounds: Rect::new(0, 0, width, length),
            depth: 0,
            children: None,
            split: None,
        }];

        let mut queue = VecDeque::from([NodeId(0)]);
        while let Some(id) = queue.pop_front() {
            let node = &nodes[id.0];
            if node.depth >= max_iterations {
                continue;
            }
            let bounds = node.bounds;
            let depth = node.depth;

            let Some(axis) = choose_axis(&bounds, room_width_min, room_length_min, rng) else {
                continue;
            };
            let (first, second) = split_rect(&bounds, axis, room_width_min, room_length_min, rng);

            let first_id = NodeId(nodes.len());
            let second_id = NodeId(nodes.len() + 1);
            for (child_id, child_bounds) in [(first_id, first), (second_id, second)] {
                nodes.push(PartitionNode {
                    id: child_id,
                    bounds: child_bounds,
                    depth: depth + 1,
                    children: None,
                    split: None,
                });
                queue.push_back(child_id);
            }

            let node = &mut nodes[id.0];
            node.children = Some([first_id, second_id]);
            node.split = Some(axis);
        }

        log::debug!(
            "partitioned {}x{} into {} nodes ({} leaves)",
            width,
            length,
            nodes.len(),
            nodes.iter().filter(|n| n.is_leaf()).count()
        );

        Self { nodes }
    }

    pub fn root(&self) -> &PartitionNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &PartitionNode {
        &self.nodes[id.0]
    }

    /// All nodes in breadth-first order
    pub fn nodes(&self) -> &[PartitionNode] {
        &self.nodes
    }

    /// Internal (split) nodes in breadth-first order
    pub fn internal_nodes(&self) -> impl Iterator<Item = &PartitionNode> + '_ {
        self.nodes.iter().filter(|n| !n.is_leaf())
    }

    /// Every leaf, breadth-first
    pub fn leaves(&self) -> Vec<NodeId> {
        self.leaves_under(NodeId(0))
    }

    /// Leaves of the subtree rooted at `id`, breadth-first
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            match self.node(current).children {
                Some(children) => queue.extend(children),
                None => leaves.push(current),
            }
        }
        leaves
    }

    /// Maximum depth of any node
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Pick the cut axis, or `None` when neither axis admits a legal cut
fn choose_axis(bounds: &Rect, min_w: i32, min_l: i32, rng: &mut DungeonRng) -> Option<SplitAxis> {
    let can_cut_x = bounds.width() >= 4 * min_w;
    let can_cut_y = bounds.height() >= 4 * min_l;

    match (can_cut_x, can_cut_y) {
        (false, false) => None,
        (true, false) => Some(SplitAxis::Vertical),
        (false, true) => Some(SplitAxis::Horizontal),
        (true, true) => {
            let w = bounds.width() as f32;
            let h = bounds.height() as f32;
            if w >= h * ELONGATION_RATIO {
                Some(SplitAxis::Vertical)
            } else if h >= w * ELONGATION_RATIO {
                Some(SplitAxis::Horizontal)
            } else if rng.coin() {
                Some(SplitAxis::Vertical)
            } else {
                Some(SplitAxis::Horizontal)
            }
        }
    }
}

/// Cut `bounds` at a random legal position; returns (left, right) or (bottom, top)
fn split_rect(bounds: &Rect, axis: SplitAxis, min_w: i32, min_l: i32, rng: &mut DungeonRng) -> (Rect, Rect) {
    match axis {
        SplitAxis::Vertical => {
            let x = rng.range_inclusive(bounds.min.x + 2 * min_w, bounds.max.x - 2 * min_w);
            (
                Rect::new(bounds.min.x, bounds.min.y, x, bounds.max.y),
                Rect::new(x, bounds.min.y, bounds.max.x, bounds.max.y),
            )
        }
        SplitAxis::Horizontal => {
            let y = rng.range_inclusive(bounds.min.y + 2 * min_l, bounds.max.y - 2 * min_l);
            (
                Rect::new(bounds.min.x, bounds.min.y, bounds.max.x, y),
                Rect::new(bounds.min.x, y, bounds.max.x, bounds.max.y),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(seed: u32) -> PartitionTree {
        let mut rng = DungeonRng::new(seed);
        PartitionTree::build(100, 100, 10, 10, 10, &mut rng)
    }

    #[test]
    fn test_leaves_tile_the_root() {
        let tree = build(42);
        let leaves = tree.leaves();
        assert!(leaves.len() > 1);

        let total: i32 = leaves.iter().map(|id| tree.node(*id).bounds.area()).sum();
        assert_eq!(total, 100 * 100);

        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[i + 1..] {
                assert!(!tree.node(*a).bounds.intersects(&tree.node(*b).bounds));
            }
        }
    }

    #[test]
    fn test_leaves_keep_twice_min_size() {
        for seed in 0..20 {
            let tree = build(seed);
            for id in tree.leaves() {
                let b = tree.node(id).bounds;
                assert!(b.width() >= 20, "seed {seed}: leaf {b:?} too narrow");
                assert!(b.height() >= 20, "seed {seed}: leaf {b:?} too short");
            }
        }
    }

    #[test]
    fn test_children_partition_parent() {
        let tree = build(3);
        for node in tree.internal_nodes() {
            let [a, b] = node.children.unwrap();
            let (a, b) = (tree.node(a), tree.node(b));
            assert_eq!(a.depth, node.depth + 1);
            assert!(node.bounds.contains(&a.bounds));
            assert!(node.bounds.contains(&b.bounds));
            assert_eq!(a.bounds.area() + b.bounds.area(), node.bounds.area());
            assert!(node.split.is_some());
        }
    }

    #[test]
    fn test_depth_cap() {
        let mut rng = DungeonRng::new(9);
        let tree = PartitionTree::build(200, 200, 1, 10, 10, &mut rng);
        assert_eq!(tree.nodes().len(), 3);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_unsplittable_root_draws_nothing() {
        let mut rng = DungeonRng::new(5);
        let tree = PartitionTree::build(30, 30, 10, 10, 10, &mut rng);
        assert_eq!(tree.nodes().len(), 1);
        assert!(tree.root().is_leaf());

        let mut fresh = DungeonRng::new(5);
        assert_eq!(rng.range(0, 1_000_000), fresh.range(0, 1_000_000));
    }

    #[test]
    fn test_elongated_side_is_cut() {
        let mut rng = DungeonRng::new(1);
        let tree = PartitionTree::build(160, 40, 1, 10, 10, &mut rng);
        assert_eq!(tree.root().split, Some(SplitAxis::Vertical));
    }

    #[test]
    fn test_same_seed_same_tree() {
        assert_eq!(build(77), build(77));
    }

    #[test]
    fn test_leaves_under_subtree() {
        let tree = build(42);
        let [left, right] = tree.root().children.unwrap();
        let mut combined = tree.leaves_under(left);
        combined.extend(tree.leaves_under(right));
        combined.sort();
        let mut all = tree.leaves();
        all.sort();
        assert_eq!(combined, all);
    }
}
