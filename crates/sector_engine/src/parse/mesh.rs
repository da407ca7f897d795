//! Detailed mesh payload: indexed triangles with picking attributes.
//!
//! Body: `vertex_count u32, index_count u32`, then `vertex_count` positions
//! (`[f32;3]` each), then one `tree_index u32` per vertex, then
//! `index_count` triangle indices (`u32`, triples).

use crate::error::ParseError;

use super::reader::ByteReader;

/// Decoded triangle mesh.
///
/// `tree_indices` runs parallel to `positions`; it identifies the source
/// node of each vertex so picking can map a hit back to the model tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
  pub positions: Vec<[f32; 3]>,
  pub tree_indices: Vec<u32>,
  pub indices: Vec<u32>,
}

impl TriangleMesh {
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }

  pub fn gpu_size_bytes(&self) -> u64 {
    let vertex_bytes = self.positions.len() * (3 * 4 + 4);
    let index_bytes = self.indices.len() * 4;
    (vertex_bytes + index_bytes) as u64
  }
}

pub(super) fn decode_body(reader: &mut ByteReader<'_>) -> Result<TriangleMesh, ParseError> {
  let vertex_count = reader.read_u32()?;
  let index_count = reader.read_u32()?;

  if index_count % 3 != 0 {
    return Err(ParseError::IndexCountNotTriangles(index_count));
  }

  let mut positions = Vec::with_capacity((vertex_count as usize).min(1 << 20));
  for _ in 0..vertex_count {
    positions.push(reader.read_vec3()?);
  }

  let mut tree_indices = Vec::with_capacity(positions.len());
  for _ in 0..vertex_count {
    tree_indices.push(reader.read_u32()?);
  }

  let mut indices = Vec::with_capacity((index_count as usize).min(1 << 20));
  for _ in 0..index_count {
    let index = reader.read_u32()?;
    if index >= vertex_count {
      return Err(ParseError::IndexOutOfRange {
        index,
        vertex_count,
      });
    }
    indices.push(index);
  }

  Ok(TriangleMesh {
    positions,
    tree_indices,
    indices,
  })
}

/// Encode a full mesh payload, header included.
pub fn encode_mesh(mesh: &TriangleMesh) -> Vec<u8> {
  let mut bytes = super::header(1);
  bytes.extend_from_slice(&(mesh.positions.len() as u32).to_le_bytes());
  bytes.extend_from_slice(&(mesh.indices.len() as u32).to_le_bytes());
  for position in &mesh.positions {
    for c in position {
      bytes.extend_from_slice(&c.to_le_bytes());
    }
  }
  for tree_index in &mesh.tree_indices {
    bytes.extend_from_slice(&tree_index.to_le_bytes());
  }
  for index in &mesh.indices {
    bytes.extend_from_slice(&index.to_le_bytes());
  }
  bytes
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
