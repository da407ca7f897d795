//! Little-endian cursor over a payload byte slice.

use crate::error::ParseError;

pub(super) struct ByteReader<'a> {
  bytes: &'a [u8],
  offset: usize,
}

impl<'a> ByteReader<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self { bytes, offset: 0 }
  }

  pub fn take(&mut self, count: usize) -> Result<&'a [u8], ParseError> {
    let end = self.offset.checked_add(count).ok_or(ParseError::Truncated {
      offset: self.offset,
      needed: count,
    })?;
    if end > self.bytes.len() {
      return Err(ParseError::Truncated {
        offset: self.offset,
        needed: end - self.bytes.len(),
      });
    }
    let slice = &self.bytes[self.offset..end];
    self.offset = end;
    Ok(slice)
  }

  pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
    let mut out = [0u8; N];
    out.copy_from_slice(self.take(N)?);
    Ok(out)
  }

  pub fn read_u8(&mut self) -> Result<u8, ParseError> {
    Ok(self.read_array::<1>()?[0])
  }

  pub fn read_u16(&mut self) -> Result<u16, ParseError> {
    Ok(u16::from_le_bytes(self.read_array()?))
  }

  pub fn read_u32(&mut self) -> Result<u32, ParseError> {
    Ok(u32::from_le_bytes(self.read_array()?))
  }

  pub fn read_f32(&mut self) -> Result<f32, ParseError> {
    Ok(f32::from_le_bytes(self.read_array()?))
  }

  pub fn read_vec3(&mut self) -> Result<[f32; 3], ParseError> {
    Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
  }
}
