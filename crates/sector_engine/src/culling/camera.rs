//! CameraState and frustum extraction.

use glam::{DMat4, DVec3, DVec4};

use crate::types::Aabb;

/// Camera configuration for one culling pass.
///
/// Compared field-for-field to detect a stationary camera; two equal states
/// produce identical culling results.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CameraState {
  pub position: DVec3,
  pub target: DVec3,
  pub up: DVec3,
  /// Vertical field of view in radians.
  pub fov_y: f64,
  pub aspect: f64,
  pub near: f64,
  pub far: f64,
}

impl CameraState {
  /// Camera at `position` looking at `target` with default lens settings.
  pub fn looking_at(position: DVec3, target: DVec3) -> Self {
    Self {
      position,
      target,
      up: DVec3::Y,
      fov_y: 60f64.to_radians(),
      aspect: 16.0 / 9.0,
      near: 0.1,
      far: 10_000.0,
    }
  }

  pub fn view_projection(&self) -> DMat4 {
    DMat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
      * DMat4::look_at_rh(self.position, self.target, self.up)
  }
}

/// View frustum as six inward-facing planes.
///
/// A plane `(a, b, c, d)` classifies a point `p` as inside when
/// `dot((a, b, c), p) + d >= 0`.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
  planes: [DVec4; 6],
}

impl Frustum {
  pub fn from_camera(camera: &CameraState) -> Self {
    Self::from_view_projection(&camera.view_projection())
  }

  /// Gribb-Hartmann plane extraction for a 0..1 depth range projection.
  pub fn from_view_projection(view_projection: &DMat4) -> Self {
    let r0 = view_projection.row(0);
    let r1 = view_projection.row(1);
    let r2 = view_projection.row(2);
    let r3 = view_projection.row(3);

    let planes = [
      r3 + r0, // left
      r3 - r0, // right
      r3 + r1, // bottom
      r3 - r1, // top
      r2,      // near (z >= 0 in clip space)
      r3 - r2, // far
    ]
    .map(normalize_plane);

    Self { planes }
  }

  pub fn contains_point(&self, p: DVec3) -> bool {
    self
      .planes
      .iter()
      .all(|plane| plane.truncate().dot(p) + plane.w >= 0.0)
  }

  /// Conservative AABB test: true unless the box is fully outside a plane.
  pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
    for plane in &self.planes {
      let normal = plane.truncate();
      // Positive vertex: the box corner farthest along the plane normal.
      let p = DVec3::new(
        if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
        if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
        if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
      );
      if normal.dot(p) + plane.w < 0.0 {
        return false;
      }
    }
    true
  }
}

fn normalize_plane(plane: DVec4) -> DVec4 {
  let len = plane.truncate().length();
  if len > 0.0 {
    plane / len
  } else {
    plane
  }
}

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;
