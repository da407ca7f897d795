//! Core value types shared across the engine.

use glam::DVec3;

/// Identifies a 3D dataset: a model and one revision of it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ModelIdentifier {
  /// Model id as assigned by the backing data store.
  pub model_id: u64,
  /// Revision id within the model.
  pub revision_id: u64,
}

impl ModelIdentifier {
  pub fn new(model_id: u64, revision_id: u64) -> Self {
    Self {
      model_id,
      revision_id,
    }
  }
}

impl std::fmt::Display for ModelIdentifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.model_id, self.revision_id)
  }
}

/// Kind of binary payload a sector carries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PayloadKind {
  /// Box-instanced low-detail geometry.
  Quads,
  /// Indexed triangle buffers with a per-vertex tree index for picking.
  Mesh,
  /// Point positions with optional colors.
  Points,
}

/// Axis-aligned bounding box in world space.
///
/// Containment is inclusive on both corners.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Aabb {
  pub min: DVec3,
  pub max: DVec3,
}

impl Aabb {
  pub fn new(min: DVec3, max: DVec3) -> Self {
    Self { min, max }
  }

  /// AABB with inverted extents, ready for encapsulation.
  pub fn empty() -> Self {
    Self {
      min: DVec3::INFINITY,
      max: DVec3::NEG_INFINITY,
    }
  }

  /// Expand to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: DVec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  #[inline]
  pub fn half_extents(&self) -> DVec3 {
    (self.max - self.min) * 0.5
  }

  /// Radius of the bounding sphere around the box center.
  #[inline]
  pub fn bounding_radius(&self) -> f64 {
    self.half_extents().length()
  }

  /// Check validity (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
  }

  /// Inclusive point containment.
  #[inline]
  pub fn contains_point(&self, p: DVec3) -> bool {
    p.x >= self.min.x
      && p.x <= self.max.x
      && p.y >= self.min.y
      && p.y <= self.max.y
      && p.z >= self.min.z
      && p.z <= self.max.z
  }

  /// Inclusive box overlap test.
  #[inline]
  pub fn intersects(&self, other: &Aabb) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Distance from a point to the box surface (0 when inside).
  #[inline]
  pub fn distance_to_point(&self, p: DVec3) -> f64 {
    let clamped = p.clamp(self.min, self.max);
    (p - clamped).length()
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
