//! `SimpleBlock` / `Block` header parsing and lacing expansion.
//!
//! Block layout: track number (VINT), relative timestamp (signed 16-bit),
//! flags byte, then either one frame or a lacing header followed by the
//! laced frames.

use crate::error::ProcessorError;
use crate::Result;
use bitflags::bitflags;
use bytes::Bytes;
use kvstream_ebml::ebml::read_vint;

/// Lacing types in Matroska.
pub mod lacing {
    /// No lacing - single frame per block.
    pub const NO_LACING: u8 = 0;
    /// Xiph-style lacing with variable-sized frames.
    pub const XIPH: u8 = 1;
    /// Fixed-size lacing - all frames have equal size.
    pub const FIXED: u8 = 2;
    /// EBML-style lacing with signed size deltas.
    pub const EBML: u8 = 3;
}

bitflags! {
    /// Block header flags.
    ///
    /// `KEYFRAME` and `DISCARDABLE` are only defined for `SimpleBlock`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockFlags: u8 {
        /// Frame can be decoded on its own.
        const KEYFRAME = 0x80;
        /// Frame should not be displayed.
        const INVISIBLE = 0x08;
        /// Frame can be dropped when decoding is slow.
        const DISCARDABLE = 0x01;
        /// Lacing type, two bits.
        const LACING = 0x06;
    }
}

impl BlockFlags {
    /// Lacing type (see [`lacing`]).
    pub fn lacing(self) -> u8 {
        (self.bits() >> 1) & 0x03
    }
}

/// Read only the track number of a block payload.
///
/// Used to skip blocks of unselected tracks without parsing them.
pub fn peek_track_number(payload: &[u8], offset: u64) -> Result<u64> {
    let (track_number, _) = read_vint(payload, offset).map_err(|e| ProcessorError::InvalidBlock {
        offset,
        message: format!("bad track number: {}", e),
    })?;
    Ok(track_number)
}

/// A parsed block with its frames split out.
#[derive(Debug, Clone)]
pub struct Block {
    /// Track number.
    pub track_number: u64,
    /// Timestamp relative to the cluster, in timestamp-scale units.
    pub relative_timestamp: i16,
    /// Header flags.
    pub flags: BlockFlags,
    /// Frame payloads; more than one when laced.
    pub frames: Vec<Bytes>,
    /// Bytes used by the lacing header (0 without lacing).
    pub lacing_header_size: usize,
}

impl Block {
    /// Parse a block payload. `offset` is the element's fragment offset,
    /// used in error reports.
    pub fn parse(data: &Bytes, offset: u64) -> Result<Self> {
        let invalid = |message: &str| ProcessorError::InvalidBlock {
            offset,
            message: message.to_string(),
        };

        let (track_number, vint_len) = read_vint(data, offset).map_err(|e| ProcessorError::InvalidBlock {
            offset,
            message: format!("bad track number: {}", e),
        })?;

        let pos = vint_len;
        if data.len() < pos + 3 {
            return Err(invalid("block header too small"));
        }
        let relative_timestamp = i16::from_be_bytes([data[pos], data[pos + 1]]);
        let flags = BlockFlags::from_bits_retain(data[pos + 2]);
        let header_size = pos + 3;

        let lacing_type = flags.lacing();
        let (frames, lacing_header_size) = if lacing_type == lacing::NO_LACING {
            (vec![data.slice(header_size..)], 0)
        } else {
            parse_laced_frames(data, header_size, lacing_type, offset)?
        };

        Ok(Self {
            track_number,
            relative_timestamp,
            flags,
            frames,
            lacing_header_size,
        })
    }

    /// Check if the keyframe flag is set.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(BlockFlags::KEYFRAME)
    }

    /// Check if the discardable flag is set.
    pub fn is_discardable(&self) -> bool {
        self.flags.contains(BlockFlags::DISCARDABLE)
    }
}

/// Split laced frames. Returns the frames and the lacing header length.
fn parse_laced_frames(
    data: &Bytes,
    header_size: usize,
    lacing_type: u8,
    offset: u64,
) -> Result<(Vec<Bytes>, usize)> {
    let unsupported = |message: String| ProcessorError::UnsupportedLacing { offset, message };

    if data.len() <= header_size {
        return Err(unsupported("no data after block header".to_string()));
    }

    // Stored as (count - 1)
    let num_frames = data[header_size] as usize + 1;
    let lacing_data_start = header_size + 1;
    let lace = &data[lacing_data_start..];

    let (sizes, sizes_len) = match lacing_type {
        lacing::XIPH => {
            let (mut sizes, sizes_len) = parse_xiph_lacing(lace, num_frames).map_err(unsupported)?;
            sizes.push(last_frame_size(lace.len(), sizes_len, &sizes).map_err(unsupported)?);
            (sizes, sizes_len)
        }
        lacing::EBML => {
            let (mut sizes, sizes_len) =
                parse_ebml_lacing(lace, num_frames, offset).map_err(unsupported)?;
            sizes.push(last_frame_size(lace.len(), sizes_len, &sizes).map_err(unsupported)?);
            (sizes, sizes_len)
        }
        lacing::FIXED => (parse_fixed_lacing(lace.len(), num_frames).map_err(unsupported)?, 0),
        other => return Err(unsupported(format!("unknown lacing type {}", other))),
    };

    let frames_start = lacing_data_start + sizes_len;
    let frames = split_frames(data, frames_start, &sizes).map_err(unsupported)?;
    Ok((frames, 1 + sizes_len))
}

/// Remaining bytes after the explicit sizes belong to the last frame.
fn last_frame_size(
    lace_len: usize,
    sizes_len: usize,
    sizes: &[usize],
) -> std::result::Result<usize, String> {
    let used = sizes
        .iter()
        .try_fold(sizes_len, |acc, &size| acc.checked_add(size))
        .ok_or_else(|| "laced frame sizes overflow".to_string())?;
    lace_len
        .checked_sub(used)
        .ok_or_else(|| format!("laced sizes ({} bytes) exceed block payload ({} bytes)", used, lace_len))
}

/// Parse frame sizes from Xiph-style lacing.
///
/// Each size except the last is a run of 255 bytes terminated by a byte
/// below 255.
fn parse_xiph_lacing(
    data: &[u8],
    num_frames: usize,
) -> std::result::Result<(Vec<usize>, usize), String> {
    let mut frame_sizes = Vec::with_capacity(num_frames);
    let mut offset = 0;

    for _ in 0..num_frames - 1 {
        let mut size = 0usize;
        loop {
            let byte = *data
                .get(offset)
                .ok_or_else(|| "Xiph lacing: unexpected end of data".to_string())?
                as usize;
            offset += 1;
            size = size
                .checked_add(byte)
                .ok_or_else(|| "Xiph lacing: frame size overflow".to_string())?;
            if byte < 255 {
                break;
            }
        }
        frame_sizes.push(size);
    }

    Ok((frame_sizes, offset))
}

/// Parse frame sizes from EBML-style lacing.
///
/// The first size is an unsigned VINT; each following size (except the
/// last) is a signed delta from the previous one.
fn parse_ebml_lacing(
    data: &[u8],
    num_frames: usize,
    offset: u64,
) -> std::result::Result<(Vec<usize>, usize), String> {
    // A single laced frame has no coded sizes
    if num_frames == 1 {
        return Ok((Vec::new(), 0));
    }

    let mut frame_sizes = Vec::with_capacity(num_frames);
    let mut pos = 0;

    let (first_size, len) = read_vint(data, offset).map_err(|e| format!("EBML lacing: {}", e))?;
    pos += len;
    frame_sizes.push(first_size as usize);

    let mut prev_size = first_size as i64;
    for _ in 1..num_frames - 1 {
        let (raw_delta, len) =
            read_vint(&data[pos..], offset).map_err(|e| format!("EBML lacing: {}", e))?;
        pos += len;
        prev_size = prev_size
            .checked_add(vint_to_signed_delta(raw_delta, len))
            .ok_or_else(|| "EBML lacing: frame size overflow".to_string())?;
        if prev_size < 0 {
            return Err("EBML lacing: negative frame size".to_string());
        }
        frame_sizes.push(prev_size as usize);
    }

    Ok((frame_sizes, pos))
}

/// Convert a biased VINT to a signed delta: bias = 2^(7*length - 1) - 1.
fn vint_to_signed_delta(value: u64, vint_length: usize) -> i64 {
    let bits = 7 * vint_length - 1;
    let bias = (1_i64 << bits) - 1;
    (value as i64) - bias
}

/// Parse frame sizes from fixed-size lacing.
fn parse_fixed_lacing(
    total_data_size: usize,
    num_frames: usize,
) -> std::result::Result<Vec<usize>, String> {
    if total_data_size % num_frames != 0 {
        return Err(format!(
            "fixed lacing: data size {} not evenly divisible by {} frames",
            total_data_size, num_frames
        ));
    }
    Ok(vec![total_data_size / num_frames; num_frames])
}

/// Slice frames out of `data` starting at `start`.
fn split_frames(
    data: &Bytes,
    start: usize,
    sizes: &[usize],
) -> std::result::Result<Vec<Bytes>, String> {
    let mut frames = Vec::with_capacity(sizes.len());
    let mut offset = start;

    for &size in sizes {
        let end = offset
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                format!(
                    "frame size {} exceeds remaining data {}",
                    size,
                    data.len().saturating_sub(offset)
                )
            })?;
        frames.push(data.slice(offset..end));
        offset = end;
    }

    Ok(frames)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Block payload with the given lacing and frames.
    pub(crate) fn block_bytes(track: u8, rel_ts: i16, flags: u8, lace: &[u8], frames: &[&[u8]]) -> Bytes {
        let mut data = vec![0x80 | track];
        data.extend_from_slice(&rel_ts.to_be_bytes());
        data.push(flags);
        data.extend_from_slice(lace);
        for frame in frames {
            data.extend_from_slice(frame);
        }
        Bytes::from(data)
    }

    #[test]
    fn test_unlaced_block() {
        let data = block_bytes(1, -5, 0x80, &[], &[b"frame"]);
        let block = Block::parse(&data, 0).unwrap();
        assert_eq!(block.track_number, 1);
        assert_eq!(block.relative_timestamp, -5);
        assert!(block.is_keyframe());
        assert!(!block.is_discardable());
        assert_eq!(block.frames, vec![Bytes::from_static(b"frame")]);
        assert_eq!(block.lacing_header_size, 0);
    }

    #[test]
    fn test_flags() {
        let flags = BlockFlags::from_bits_retain(0x80 | 0x08 | 0x04 | 0x01);
        assert!(flags.contains(BlockFlags::KEYFRAME | BlockFlags::INVISIBLE | BlockFlags::DISCARDABLE));
        assert_eq!(flags.lacing(), lacing::FIXED);
        assert_eq!(BlockFlags::from_bits_retain(0x06).lacing(), lacing::EBML);
    }

    #[test]
    fn test_fixed_lacing() {
        // 3 frames of 4 bytes
        let data = block_bytes(2, 0, lacing::FIXED << 1, &[2], &[b"aaaa", b"bbbb", b"cccc"]);
        let block = Block::parse(&data, 0).unwrap();
        assert_eq!(block.frames.len(), 3);
        assert_eq!(&block.frames[1][..], b"bbbb");
        assert_eq!(block.lacing_header_size, 1);

        let total: usize = block.frames.iter().map(Bytes::len).sum();
        assert_eq!(total, data.len() - 4 - block.lacing_header_size);
    }

    #[test]
    fn test_fixed_lacing_uneven() {
        let data = block_bytes(2, 0, lacing::FIXED << 1, &[1], &[b"abc"]);
        assert!(matches!(
            Block::parse(&data, 7),
            Err(ProcessorError::UnsupportedLacing { offset: 7, .. })
        ));
    }

    #[test]
    fn test_xiph_lacing() {
        // 3 frames: 300, 2, rest (3)
        let big = vec![0xAB; 300];
        let data = block_bytes(
            1,
            0,
            lacing::XIPH << 1,
            &[2, 255, 45, 2],
            &[&big, b"xy", b"end"],
        );
        let block = Block::parse(&data, 0).unwrap();
        assert_eq!(block.frames.len(), 3);
        assert_eq!(block.frames[0].len(), 300);
        assert_eq!(&block.frames[1][..], b"xy");
        assert_eq!(&block.frames[2][..], b"end");
        assert_eq!(block.lacing_header_size, 4);
    }

    #[test]
    fn test_ebml_lacing() {
        // 3 frames: 5, 5 + (-2) = 3, rest (4)
        // delta -2 as 1-byte biased VINT: 63 - 2 = 61 -> 0x80 | 61
        let data = block_bytes(
            1,
            0,
            lacing::EBML << 1,
            &[2, 0x85, 0x80 | 61],
            &[b"11111", b"222", b"3333"],
        );
        let block = Block::parse(&data, 0).unwrap();
        let lens: Vec<usize> = block.frames.iter().map(Bytes::len).collect();
        assert_eq!(lens, vec![5, 3, 4]);
        assert_eq!(&block.frames[2][..], b"3333");
    }

    #[test]
    fn test_ebml_lacing_single_frame() {
        // Count byte 0: one frame, no coded sizes
        let data = block_bytes(1, 0, lacing::EBML << 1, &[0], &[b"\x83ab"]);
        let block = Block::parse(&data, 0).unwrap();
        assert_eq!(block.frames, vec![Bytes::from_static(b"\x83ab")]);
        assert_eq!(block.lacing_header_size, 1);
    }

    #[test]
    fn test_ebml_lacing_size_overflow() {
        // 256 frames whose coded sizes are all near 2^56
        let mut lace = vec![0xFF];
        for _ in 0..255 {
            lace.extend_from_slice(&[0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
        }
        let data = block_bytes(1, 0, lacing::EBML << 1, &lace, &[&[0; 16]]);
        assert!(matches!(
            Block::parse(&data, 0),
            Err(ProcessorError::UnsupportedLacing { .. })
        ));
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(vint_to_signed_delta(63, 1), 0);
        assert_eq!(vint_to_signed_delta(0, 1), -63);
        assert_eq!(vint_to_signed_delta(8191, 2), 0);
    }

    #[test]
    fn test_lacing_sizes_overrun() {
        let data = block_bytes(1, 0, lacing::XIPH << 1, &[1, 200], &[b"short"]);
        assert!(matches!(
            Block::parse(&data, 0),
            Err(ProcessorError::UnsupportedLacing { .. })
        ));
    }

    #[test]
    fn test_short_header() {
        let data = Bytes::from_static(&[0x81, 0x00]);
        assert!(matches!(
            Block::parse(&data, 3),
            Err(ProcessorError::InvalidBlock { offset: 3, .. })
        ));
        assert!(matches!(
            Block::parse(&Bytes::new(), 0),
            Err(ProcessorError::InvalidBlock { .. })
        ));
    }

    #[test]
    fn test_peek_track_number() {
        let data = block_bytes(9, 0, 0, &[], &[b"x"]);
        assert_eq!(peek_track_number(&data, 0).unwrap(), 9);
        assert!(peek_track_number(&[0x00], 0).is_err());
    }
}
