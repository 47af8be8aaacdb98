// src/codec.rs
//
// Frame codec for the simulator wire protocol.
//
// A frame is a bare concatenation of fixed-width IEEE-754 32-bit floats in
// little-endian order: no padding, no length prefix. The receiver knows the
// expected arity out-of-band (3 for command frames, 5 for observations).

/// Number of floats in a command frame (`[yaw, pitch, zoom]`).
pub const CMD_ARITY: usize = 3;

/// Number of floats in an observation frame (`[tag, yaw, pitch, zoom, mi]`).
pub const OBS_ARITY: usize = 5;

/// Errors produced by frame decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The byte count does not match the expected fixed arity.
    Length { expected: usize, got: usize },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Length { expected, got } => {
                write!(f, "bad frame length: expected {} bytes, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Encode a float vector into its wire representation.
///
/// Produces exactly `4 * values.len()` bytes, values packed in input order.
pub fn encode_frame(values: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 * values.len());
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

/// Decode a wire frame into exactly `count` floats.
///
/// Fails with [`FrameError::Length`] when `bytes.len() != 4 * count`; a
/// failed decode has no side effects.
pub fn decode_frame(bytes: &[u8], count: usize) -> Result<Vec<f32>, FrameError> {
    if bytes.len() != 4 * count {
        return Err(FrameError::Length {
            expected: 4 * count,
            got: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
