//! MESHBUF: typed views over the raw geometry buffers carried by surface anchors.
//!
//! A surface anchor ships two opaque buffers:
//!
//! - a vertex buffer holding `vertex_count` positions, each three little-endian
//!   `f32` values located at `vertex_offset + i * vertex_stride` bytes;
//! - a face buffer holding `face_count` triangles as a flat index list
//!   (`face_count * 3` indices), each index `index_width` bytes wide
//!   (2 => `u16`, 4 => `u32`, little-endian).
//!
//! Layout (vertex buffer, stride 16, offset 0):
//!   00  : f32 x, f32 y, f32 z, [pad 4]
//!   10  : f32 x, f32 y, f32 z, [pad 4]
//!   ..
//!
//! Every read is bounds-checked against the buffer; a malformed descriptor
//! yields a [`DecodeError`] instead of reading out of range.

use byteorder::{ByteOrder, LittleEndian as LE, WriteBytesExt};
use thiserror::Error;

/// Size in bytes of one packed position (three `f32`).
pub const POSITION_BYTES: usize = 12;

/// Width of a single index in the face buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IndexWidth {
    U16 = 2,
    U32 = 4,
}

impl IndexWidth {
    #[inline]
    pub fn from_bytes(bytes: usize) -> Result<Self, DecodeError> {
        match bytes {
            2 => Ok(Self::U16),
            4 => Ok(Self::U32),
            other => Err(DecodeError::UnsupportedIndexWidth(other)),
        }
    }

    #[inline]
    pub fn bytes(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported index width {0} (expected 2 or 4 bytes)")]
    UnsupportedIndexWidth(usize),

    #[error("vertex stride {stride} is smaller than a packed position (12 bytes)")]
    StrideTooSmall { stride: usize },

    #[error("vertex range needs {needed} bytes but the buffer holds {available}")]
    VertexOverrun { needed: usize, available: usize },

    #[error("index range needs {needed} bytes but the buffer holds {available}")]
    IndexOverrun { needed: usize, available: usize },

    #[error("index {0} does not fit the requested index width")]
    IndexTooWide(u32),

    #[error("buffer size overflows usize")]
    SizeOverflow,
}

/// Borrowed view of a vertex buffer.
#[derive(Debug, Clone, Copy)]
pub struct VertexSource<'a> {
    pub data: &'a [u8],
    pub offset: usize,
    pub stride: usize,
    pub count: usize,
}

impl<'a> VertexSource<'a> {
    /// Checks stride and range once so per-vertex reads can index directly.
    fn validate(&self) -> Result<(), DecodeError> {
        if self.stride < POSITION_BYTES {
            return Err(DecodeError::StrideTooSmall { stride: self.stride });
        }
        if self.count == 0 {
            return Ok(());
        }
        let needed = (self.count - 1)
            .checked_mul(self.stride)
            .and_then(|n| n.checked_add(self.offset))
            .and_then(|n| n.checked_add(POSITION_BYTES))
            .ok_or(DecodeError::SizeOverflow)?;
        if needed > self.data.len() {
            return Err(DecodeError::VertexOverrun {
                needed,
                available: self.data.len(),
            });
        }
        Ok(())
    }

    /// Reads every position in the buffer.
    pub fn read_positions(&self) -> Result<Vec<[f32; 3]>, DecodeError> {
        self.validate()?;
        let positions = (0..self.count)
            .map(|i| {
                let at = self.offset + i * self.stride;
                let p = &self.data[at..at + POSITION_BYTES];
                [LE::read_f32(&p[0..4]), LE::read_f32(&p[4..8]), LE::read_f32(&p[8..12])]
            })
            .collect();
        Ok(positions)
    }
}

/// Borrowed view of a triangle-list face buffer.
#[derive(Debug, Clone, Copy)]
pub struct FaceElement<'a> {
    pub data: &'a [u8],
    /// Number of triangles.
    pub count: usize,
    pub width: IndexWidth,
}

impl<'a> FaceElement<'a> {
    /// Number of indices described by this element (three per triangle).
    #[inline]
    pub fn index_count(&self) -> usize {
        self.count * 3
    }

    /// Reads all indices, widened to `u32` regardless of the source width.
    pub fn read_indices(&self) -> Result<Vec<u32>, DecodeError> {
        let n = self.count.checked_mul(3).ok_or(DecodeError::SizeOverflow)?;
        let w = self.width.bytes();
        let needed = n.checked_mul(w).ok_or(DecodeError::SizeOverflow)?;
        if needed > self.data.len() {
            return Err(DecodeError::IndexOverrun {
                needed,
                available: self.data.len(),
            });
        }

        let bytes = &self.data[..needed];
        let indices = match self.width {
            IndexWidth::U16 => bytes.chunks_exact(2).map(|c| LE::read_u16(c) as u32).collect(),
            IndexWidth::U32 => bytes.chunks_exact(4).map(LE::read_u32).collect(),
        };
        Ok(indices)
    }
}

/// Owned geometry as delivered with a surface anchor.
#[derive(Debug, Clone, Default)]
pub struct RawGeometry {
    pub vertices: Vec<u8>,
    pub vertex_offset: usize,
    pub vertex_stride: usize,
    pub vertex_count: usize,
    pub faces: Vec<u8>,
    /// Number of triangles.
    pub face_count: usize,
    /// Bytes per index as reported by the sensor (2 or 4).
    pub index_width: usize,
}

impl RawGeometry {
    pub fn vertex_source(&self) -> VertexSource<'_> {
        VertexSource {
            data: &self.vertices,
            offset: self.vertex_offset,
            stride: self.vertex_stride,
            count: self.vertex_count,
        }
    }

    pub fn face_element(&self) -> Result<FaceElement<'_>, DecodeError> {
        Ok(FaceElement {
            data: &self.faces,
            count: self.face_count,
            width: IndexWidth::from_bytes(self.index_width)?,
        })
    }

    /// Packs positions and triangle indices into a tightly described buffer pair.
    pub fn from_parts(
        positions: &[[f32; 3]],
        stride: usize,
        triangles: &[u32],
        width: IndexWidth,
    ) -> Result<Self, DecodeError> {
        Ok(Self {
            vertices: encode_positions(positions, stride, 0)?,
            vertex_offset: 0,
            vertex_stride: stride,
            vertex_count: positions.len(),
            faces: encode_indices(triangles, width)?,
            face_count: triangles.len() / 3,
            index_width: width.bytes(),
        })
    }
}

/// Writes positions with the given stride, starting `offset` bytes into the buffer.
/// Padding bytes between positions are zeroed.
pub fn encode_positions(
    positions: &[[f32; 3]],
    stride: usize,
    offset: usize,
) -> Result<Vec<u8>, DecodeError> {
    if stride < POSITION_BYTES {
        return Err(DecodeError::StrideTooSmall { stride });
    }
    let mut out = vec![0u8; offset];
    out.reserve(positions.len() * stride);
    for p in positions {
        let start = out.len();
        for c in p {
            // Vec<u8> writes are infallible.
            out.write_f32::<LE>(*c).map_err(|_| DecodeError::SizeOverflow)?;
        }
        out.resize(start + stride, 0);
    }
    Ok(out)
}

/// Writes indices at the requested width. Values that do not fit a `u16`
/// are rejected for [`IndexWidth::U16`].
pub fn encode_indices(indices: &[u32], width: IndexWidth) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(indices.len() * width.bytes());
    for &i in indices {
        match width {
            IndexWidth::U16 => {
                let v = u16::try_from(i).map_err(|_| DecodeError::IndexTooWide(i))?;
                out.write_u16::<LE>(v).map_err(|_| DecodeError::SizeOverflow)?;
            }
            IndexWidth::U32 => out.write_u32::<LE>(i).map_err(|_| DecodeError::SizeOverflow)?,
        }
    }
    Ok(out)
}
