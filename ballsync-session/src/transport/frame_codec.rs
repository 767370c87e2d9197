//! Sample payload for frames carried on the video track.
//!
//! Layout: width (u32 BE), height (u32 BE), zlib-compressed BGR8 pixels.
//! Mostly-black synthetic frames shrink to a few RTP packets.

use ballsync_core::Frame;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use std::io::{Read, Write};
use thiserror::Error;

const HEADER_LEN: usize = 8;

/// Largest canvas a received sample may declare.
pub const MAX_FRAME_PIXELS: usize = 4096 * 4096;

#[derive(Debug, Error)]
pub enum FrameCodecError {
    #[error("sample too short for frame header ({0} bytes)")]
    Truncated(usize),
    #[error("declared frame {width}x{height} exceeds the size limit")]
    TooLarge { width: u32, height: u32 },
    #[error("pixel data is {got} bytes, expected {expected}")]
    SizeMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn encode_frame(frame: &Frame) -> Result<Bytes, FrameCodecError> {
    let mut out = BytesMut::with_capacity(HEADER_LEN + frame.pixels.len() / 64);
    out.put_u32(frame.width);
    out.put_u32(frame.height);

    let mut encoder = ZlibEncoder::new(out.writer(), Compression::fast());
    encoder.write_all(&frame.pixels)?;
    Ok(encoder.finish()?.into_inner().freeze())
}

pub fn decode_frame(mut sample: Bytes) -> Result<Frame, FrameCodecError> {
    if sample.len() < HEADER_LEN {
        return Err(FrameCodecError::Truncated(sample.len()));
    }
    let width = sample.get_u32();
    let height = sample.get_u32();
    if width as usize * height as usize > MAX_FRAME_PIXELS {
        return Err(FrameCodecError::TooLarge { width, height });
    }

    let expected = Frame::buffer_len(width, height);
    // Sized by the inflated data, never by the header. One byte past the
    // expected size is enough to detect an oversized payload.
    let mut pixels = Vec::new();
    ZlibDecoder::new(sample.reader())
        .take(expected as u64 + 1)
        .read_to_end(&mut pixels)?;

    let got = pixels.len();
    Frame::from_pixels(width, height, pixels)
        .ok_or(FrameCodecError::SizeMismatch { expected, got })
}
