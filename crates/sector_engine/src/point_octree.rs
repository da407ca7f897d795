//! PointOctree - spatial index over decoded point-cloud points.
//!
//! Build partitions the input points at each node's bounds center until a
//! leaf holds at most `max_leaf_size` points; every point lands in exactly
//! one leaf. Queries descend only into children whose bounds intersect the
//! query box, a branch-and-bound range query used by styling and
//! annotation tooling.

use glam::DVec3;

use crate::types::Aabb;

/// Default leaf capacity.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 32;

/// Depth cap: keeps degenerate inputs (many identical points) from
/// recursing forever.
const MAX_DEPTH: usize = 32;

enum Node {
  Leaf(Vec<u32>),
  Branch(Box<[Option<Node>; 8]>),
}

/// Octree over a fixed point array; queries return indices into it.
pub struct PointOctree {
  points: Vec<DVec3>,
  bounds: Aabb,
  root: Node,
}

impl PointOctree {
  pub fn build(points: Vec<DVec3>, max_leaf_size: usize) -> Self {
    let mut bounds = Aabb::empty();
    for point in &points {
      bounds.encapsulate(*point);
    }

    let indices: Vec<u32> = (0..points.len() as u32).collect();
    let root = build_node(&points, indices, &bounds, max_leaf_size.max(1), 0);

    Self {
      points,
      bounds,
      root,
    }
  }

  pub fn with_default_leaf_size(points: Vec<DVec3>) -> Self {
    Self::build(points, DEFAULT_MAX_LEAF_SIZE)
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Bounds of all indexed points.
  pub fn bounds(&self) -> &Aabb {
    &self.bounds
  }

  pub fn point(&self, index: u32) -> DVec3 {
    self.points[index as usize]
  }

  /// Indices of all points inside `query` (inclusive on the box faces),
  /// in ascending index order.
  pub fn points_in_box(&self, query: &Aabb) -> Vec<u32> {
    let mut out = Vec::new();
    if self.bounds.intersects(query) {
      collect(&self.root, &self.points, &self.bounds, query, &mut out);
    }
    // Ascending order makes results independent of the build's split
    // structure.
    out.sort_unstable();
    out
  }
}

fn build_node(
  points: &[DVec3],
  indices: Vec<u32>,
  bounds: &Aabb,
  max_leaf_size: usize,
  depth: usize,
) -> Node {
  if indices.len() <= max_leaf_size || depth >= MAX_DEPTH {
    return Node::Leaf(indices);
  }

  let center = bounds.center();
  let mut buckets: [Vec<u32>; 8] = Default::default();
  for index in indices {
    buckets[octant_of(points[index as usize], center)].push(index);
  }

  let mut children: [Option<Node>; 8] = Default::default();
  for (octant, bucket) in buckets.into_iter().enumerate() {
    if bucket.is_empty() {
      continue;
    }
    let child_bounds = octant_bounds(bounds, octant);
    children[octant] = Some(build_node(
      points,
      bucket,
      &child_bounds,
      max_leaf_size,
      depth + 1,
    ));
  }

  Node::Branch(Box::new(children))
}

/// Octant of a point relative to a split center. Points on a split plane go
/// to the upper octant, so every point belongs to exactly one child.
#[inline]
fn octant_of(point: DVec3, center: DVec3) -> usize {
  (point.x >= center.x) as usize
    | ((point.y >= center.y) as usize) << 1
    | ((point.z >= center.z) as usize) << 2
}

fn octant_bounds(bounds: &Aabb, octant: usize) -> Aabb {
  let center = bounds.center();
  let mut min = bounds.min;
  let mut max = center;

  if octant & 1 != 0 {
    min.x = center.x;
    max.x = bounds.max.x;
  }
  if octant & 2 != 0 {
    min.y = center.y;
    max.y = bounds.max.y;
  }
  if octant & 4 != 0 {
    min.z = center.z;
    max.z = bounds.max.z;
  }

  Aabb::new(min, max)
}

fn collect(node: &Node, points: &[DVec3], bounds: &Aabb, query: &Aabb, out: &mut Vec<u32>) {
  match node {
    Node::Leaf(indices) => {
      for &index in indices {
        if query.contains_point(points[index as usize]) {
          out.push(index);
        }
      }
    }
    Node::Branch(children) => {
      for (octant, child) in children.iter().enumerate() {
        if let Some(child) = child {
          let child_bounds = octant_bounds(bounds, octant);
          // Prune subtrees with no spatial overlap.
          if child_bounds.intersects(query) {
            collect(child, points, &child_bounds, query, out);
          }
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "point_octree_test.rs"]
mod point_octree_test;
