//! Binary sector payload decoding.
//!
//! Every payload starts with a common little-endian header:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ [0..4]  Magic: b"SECT"                       │
//! │ [4..6]  Version: u16                         │
//! │ [6]     Kind: u8 (0 quads, 1 mesh, 2 points) │
//! ├──────────────────────────────────────────────┤
//! │ BODY (kind-specific, see submodules)         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Decoding is CPU-bound and runs on the parser pool, never on the polling
//! thread. Encoders live next to the decoders; the asset pre-processing
//! tooling and the tests share them.

mod mesh;
mod points;
mod pool;
mod quads;
mod reader;

pub use mesh::{encode_mesh, TriangleMesh};
pub use points::{encode_points, PointCloud};
pub use pool::{ParseCompletion, ParserPool};
pub use quads::{encode_quads, QuadInstance, QuadInstances};

use crate::error::ParseError;
use crate::types::PayloadKind;

use reader::ByteReader;

/// Payload format magic, "SECT" in ASCII.
pub const MAGIC: [u8; 4] = *b"SECT";

/// Current payload format version.
pub const VERSION: u16 = 1;

/// Decoded geometry of one sector.
pub enum SectorGeometry {
  Quads(QuadInstances),
  Mesh(TriangleMesh),
  Points(PointCloud),
}

impl SectorGeometry {
  pub fn kind(&self) -> PayloadKind {
    match self {
      SectorGeometry::Quads(_) => PayloadKind::Quads,
      SectorGeometry::Mesh(_) => PayloadKind::Mesh,
      SectorGeometry::Points(_) => PayloadKind::Points,
    }
  }

  /// Estimated GPU buffer footprint, used for allocator accounting.
  pub fn gpu_size_bytes(&self) -> u64 {
    match self {
      SectorGeometry::Quads(quads) => quads.gpu_size_bytes(),
      SectorGeometry::Mesh(mesh) => mesh.gpu_size_bytes(),
      SectorGeometry::Points(points) => points.gpu_size_bytes(),
    }
  }
}

impl std::fmt::Debug for SectorGeometry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SectorGeometry::Quads(quads) => write!(f, "Quads({} instances)", quads.len()),
      SectorGeometry::Mesh(mesh) => write!(
        f,
        "Mesh({} vertices, {} triangles)",
        mesh.positions.len(),
        mesh.triangle_count()
      ),
      SectorGeometry::Points(points) => write!(f, "Points({})", points.len()),
    }
  }
}

/// Decode a payload of any kind.
pub fn decode(bytes: &[u8]) -> Result<SectorGeometry, ParseError> {
  let mut reader = ByteReader::new(bytes);

  let magic = reader.read_array::<4>()?;
  if magic != MAGIC {
    return Err(ParseError::BadMagic(magic));
  }

  let version = reader.read_u16()?;
  if version != VERSION {
    return Err(ParseError::UnsupportedVersion(version));
  }

  let kind = reader.read_u8()?;
  match kind {
    0 => Ok(SectorGeometry::Quads(quads::decode_body(&mut reader)?)),
    1 => Ok(SectorGeometry::Mesh(mesh::decode_body(&mut reader)?)),
    2 => Ok(SectorGeometry::Points(points::decode_body(&mut reader)?)),
    other => Err(ParseError::UnknownKind(other)),
  }
}

/// Decode a payload, checking the header kind against the sector metadata.
pub fn decode_expected(bytes: &[u8], expected: PayloadKind) -> Result<SectorGeometry, ParseError> {
  let geometry = decode(bytes)?;
  if geometry.kind() != expected {
    return Err(ParseError::KindMismatch {
      header: geometry.kind(),
      expected,
    });
  }
  Ok(geometry)
}

/// Common payload header for the encoders.
fn header(kind: u8) -> Vec<u8> {
  let mut bytes = Vec::with_capacity(7);
  bytes.extend_from_slice(&MAGIC);
  bytes.extend_from_slice(&VERSION.to_le_bytes());
  bytes.push(kind);
  bytes
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_rejects_bad_magic() {
    let err = decode(b"NOPE\x01\x00\x00").unwrap_err();
    assert!(matches!(err, ParseError::BadMagic(_)));
  }

  #[test]
  fn test_decode_rejects_unsupported_version() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&9u16.to_le_bytes());
    bytes.push(0);

    let err = decode(&bytes).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(9)));
  }

  #[test]
  fn test_decode_rejects_unknown_kind() {
    let mut bytes = header(7);
    bytes.extend_from_slice(&0u32.to_le_bytes());

    let err = decode(&bytes).unwrap_err();
    assert!(matches!(err, ParseError::UnknownKind(7)));
  }

  #[test]
  fn test_decode_rejects_truncated_header() {
    let err = decode(b"SE").unwrap_err();
    assert!(matches!(err, ParseError::Truncated { .. }));
  }

  #[test]
  fn test_decode_expected_checks_kind() {
    let payload = encode_quads(&QuadInstances::default());

    assert!(decode_expected(&payload, PayloadKind::Quads).is_ok());
    let err = decode_expected(&payload, PayloadKind::Mesh).unwrap_err();
    assert!(matches!(
      err,
      ParseError::KindMismatch {
        header: PayloadKind::Quads,
        expected: PayloadKind::Mesh,
      }
    ));
  }
}
