//! Quads payload: box-instanced low-detail geometry.
//!
//! Body: `count u32`, then `count` instances of `center [f32;3],
//! half_extent f32`.

use crate::error::ParseError;

use super::reader::ByteReader;

/// One axis-aligned box instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadInstance {
  pub center: [f32; 3],
  pub half_extent: f32,
}

/// Decoded quads payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadInstances {
  pub instances: Vec<QuadInstance>,
}

impl QuadInstances {
  pub fn len(&self) -> usize {
    self.instances.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instances.is_empty()
  }

  pub fn gpu_size_bytes(&self) -> u64 {
    (self.instances.len() * std::mem::size_of::<QuadInstance>()) as u64
  }
}

pub(super) fn decode_body(reader: &mut ByteReader<'_>) -> Result<QuadInstances, ParseError> {
  let count = reader.read_u32()? as usize;
  let mut instances = Vec::with_capacity(count.min(1 << 20));
  for _ in 0..count {
    instances.push(QuadInstance {
      center: reader.read_vec3()?,
      half_extent: reader.read_f32()?,
    });
  }
  Ok(QuadInstances { instances })
}

/// Encode a full quads payload, header included.
pub fn encode_quads(quads: &QuadInstances) -> Vec<u8> {
  let mut bytes = super::header(0);
  bytes.extend_from_slice(&(quads.instances.len() as u32).to_le_bytes());
  for instance in &quads.instances {
    for c in instance.center {
      bytes.extend_from_slice(&c.to_le_bytes());
    }
    bytes.extend_from_slice(&instance.half_extent.to_le_bytes());
  }
  bytes
}

#[cfg(test)]
#[path = "quads_test.rs"]
mod quads_test;
