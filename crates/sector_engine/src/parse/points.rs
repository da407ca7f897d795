//! Point cloud payload.
//!
//! Body: `count u32, has_color u8`, then `count` positions (`[f32;3]`
//! each), then `count` RGB triples (`[u8;3]`) when `has_color` is 1.

use crate::error::ParseError;

use super::reader::ByteReader;

/// Decoded point cloud.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
  pub positions: Vec<[f32; 3]>,
  pub colors: Option<Vec<[u8; 3]>>,
}

impl PointCloud {
  pub fn len(&self) -> usize {
    self.positions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn gpu_size_bytes(&self) -> u64 {
    let position_bytes = self.positions.len() * 3 * 4;
    let color_bytes = self.colors.as_ref().map_or(0, |c| c.len() * 3);
    (position_bytes + color_bytes) as u64
  }
}

pub(super) fn decode_body(reader: &mut ByteReader<'_>) -> Result<PointCloud, ParseError> {
  let count = reader.read_u32()? as usize;
  let has_color = reader.read_u8()? != 0;

  let mut positions = Vec::with_capacity(count.min(1 << 20));
  for _ in 0..count {
    positions.push(reader.read_vec3()?);
  }

  let colors = if has_color {
    let mut colors = Vec::with_capacity(positions.len());
    for _ in 0..count {
      colors.push(reader.read_array::<3>()?);
    }
    Some(colors)
  } else {
    None
  };

  Ok(PointCloud { positions, colors })
}

/// Encode a full point payload, header included.
pub fn encode_points(points: &PointCloud) -> Vec<u8> {
  let mut bytes = super::header(2);
  bytes.extend_from_slice(&(points.positions.len() as u32).to_le_bytes());
  bytes.push(points.colors.is_some() as u8);
  for position in &points.positions {
    for c in position {
      bytes.extend_from_slice(&c.to_le_bytes());
    }
  }
  if let Some(colors) = &points.colors {
    for color in colors {
      bytes.extend_from_slice(color);
    }
  }
  bytes
}

#[cfg(test)]
#[path = "points_test.rs"]
mod points_test;
