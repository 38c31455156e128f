//! Lazy frame extraction with track filtering and sampling.

use crate::block::{peek_track_number, Block, BlockFlags};
use crate::error::ProcessorError;
use crate::Result;
use crate::tracks::tracks_from_document;
use bytes::Bytes;
use kvstream_consumer::Fragment;
use kvstream_ebml::elements::*;
use kvstream_ebml::Element;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::slice;

/// Which tracks to extract frames from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackFilter {
    /// Every track.
    #[default]
    All,
    /// Only the listed track numbers.
    Tracks(BTreeSet<u64>),
}

impl TrackFilter {
    /// Only the given track numbers.
    pub fn only(tracks: impl IntoIterator<Item = u64>) -> Self {
        TrackFilter::Tracks(tracks.into_iter().collect())
    }

    /// Check if a track passes the filter.
    pub fn contains(&self, track_number: u64) -> bool {
        match self {
            TrackFilter::All => true,
            TrackFilter::Tracks(tracks) => tracks.contains(&track_number),
        }
    }
}

/// Fraction of frames to keep, in (0, 1].
///
/// Frame `i` (counted after track filtering, from 0) is kept iff `i == 0`
/// or `floor(i * r) != floor((i - 1) * r)`. With `r = 1/n` this keeps every
/// n-th frame starting with the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRatio {
    numerator: u32,
    denominator: u32,
}

impl SampleRatio {
    /// Keep every frame.
    pub const ALL: SampleRatio = SampleRatio {
        numerator: 1,
        denominator: 1,
    };

    /// Ratio `numerator / denominator`.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 || denominator == 0 || numerator > denominator {
            return Err(ProcessorError::InvalidSampleRatio {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Keep one frame in every `n`.
    pub fn one_in(n: u32) -> Result<Self> {
        Self::new(1, n)
    }

    /// Ratio from a float, to micro precision.
    pub fn from_f64(ratio: f64) -> Result<Self> {
        const SCALE: u32 = 1_000_000;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ProcessorError::InvalidSampleRatio {
                numerator: 0,
                denominator: SCALE,
            });
        }
        let numerator = ((ratio * SCALE as f64).round() as u32).max(1);
        let divisor = gcd(numerator, SCALE);
        Self::new(numerator / divisor, SCALE / divisor)
    }

    /// The ratio as a float.
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Check if frame `index` is selected.
    pub fn keeps(&self, index: u64) -> bool {
        if index == 0 {
            return true;
        }
        let bucket = |i: u64| (i as u128 * self.numerator as u128) / self.denominator as u128;
        bucket(index) != bucket(index - 1)
    }
}

impl Default for SampleRatio {
    fn default() -> Self {
        Self::ALL
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Track filter and sample ratio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSelection {
    /// Tracks to include.
    pub track_filter: TrackFilter,
    /// Fraction of the filtered frames to keep.
    pub sample_ratio: SampleRatio,
}

impl FrameSelection {
    /// Every frame of every track.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given tracks.
    pub fn with_tracks(mut self, tracks: impl IntoIterator<Item = u64>) -> Self {
        self.track_filter = TrackFilter::only(tracks);
        self
    }

    /// Set the sample ratio.
    pub fn with_sample_ratio(mut self, ratio: SampleRatio) -> Self {
        self.sample_ratio = ratio;
        self
    }
}

/// One frame from a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    /// Track number.
    pub track_number: u64,
    /// Presentation timestamp in nanoseconds.
    pub timestamp: u64,
    /// Frame can be decoded on its own.
    pub is_keyframe: bool,
    /// Frame can be dropped.
    pub is_discardable: bool,
    /// Duration in nanoseconds, from `BlockDuration` or `DefaultDuration`.
    pub duration: Option<u64>,
    /// Codec payload.
    pub payload: Bytes,
}

/// Lazily extract frames from a fragment.
///
/// Blocks are walked in document order. Blocks whose track is filtered out
/// are skipped after reading only the track number. Malformed blocks and
/// unsupported lacing are skipped with a warning.
pub fn extract_frames<'a>(fragment: &'a Fragment, selection: &FrameSelection) -> Result<Frames<'a>> {
    Frames::new(fragment, selection.clone())
}

/// Iterator over [`FrameRecord`]s; see [`extract_frames`].
pub struct Frames<'a> {
    clusters: slice::Iter<'a, Element>,
    blocks: slice::Iter<'a, Element>,
    cluster_timestamp: u64,
    timestamp_scale: u64,
    default_durations: HashMap<u64, u64>,
    selection: FrameSelection,
    pending: VecDeque<FrameRecord>,
    index: u64,
}

impl<'a> Frames<'a> {
    fn new(fragment: &'a Fragment, selection: FrameSelection) -> Result<Self> {
        let document = fragment.document();
        let segment = document
            .segment()
            .ok_or(ProcessorError::MissingElement("Segment"))?;

        let timestamp_scale = match segment.child(INFO) {
            Some(info) => info.child_unsigned(TIMESTAMP_SCALE)?,
            None => None,
        }
        .filter(|&scale| scale > 0)
        .unwrap_or(DEFAULT_TIMESTAMP_SCALE);

        let default_durations = tracks_from_document(document)?
            .into_iter()
            .filter_map(|t| t.default_duration.map(|d| (t.track_number, d)))
            .collect();

        Ok(Self {
            clusters: segment.children().iter(),
            blocks: Default::default(),
            cluster_timestamp: 0,
            timestamp_scale,
            default_durations,
            selection,
            pending: VecDeque::new(),
            index: 0,
        })
    }

    /// Timestamp scale in nanoseconds per tick.
    pub fn timestamp_scale(&self) -> u64 {
        self.timestamp_scale
    }

    /// Advance to the next cluster. Returns false when none remain.
    fn next_cluster(&mut self) -> bool {
        for cluster in self.clusters.by_ref() {
            if cluster.id() != CLUSTER {
                continue;
            }
            self.cluster_timestamp = match cluster.child_unsigned(TIMESTAMP) {
                Ok(ts) => ts.unwrap_or(0),
                Err(e) => {
                    tracing::warn!(offset = cluster.offset(), error = %e, "bad cluster timestamp, using 0");
                    0
                }
            };
            self.blocks = cluster.children().iter();
            return true;
        }
        false
    }

    /// Expand one block element into `pending`.
    fn expand(&mut self, element: &'a Element) -> Result<()> {
        let (block_element, group) = match element.id() {
            SIMPLE_BLOCK => (element, None),
            BLOCK_GROUP => match element.child(BLOCK) {
                Some(block) => (block, Some(element)),
                None => return Ok(()),
            },
            _ => return Ok(()),
        };

        let payload = block_element.as_binary()?;
        let offset = block_element.offset();
        if !self.selection.track_filter.contains(peek_track_number(payload, offset)?) {
            return Ok(());
        }

        let block = Block::parse(payload, offset)?;
        let default_duration = self.default_durations.get(&block.track_number).copied();

        let (keyframe, block_duration) = match group {
            Some(group) => (
                group.child(REFERENCE_BLOCK).is_none(),
                group
                    .child_unsigned(BLOCK_DURATION)?
                    .map(|d| d.saturating_mul(self.timestamp_scale)),
            ),
            None => (block.is_keyframe(), None),
        };

        let ticks = i128::from(self.cluster_timestamp) + i128::from(block.relative_timestamp);
        let base = u64::try_from(ticks.max(0))
            .unwrap_or(u64::MAX)
            .saturating_mul(self.timestamp_scale);
        let laced = block.frames.len() > 1;

        for (i, payload) in block.frames.into_iter().enumerate() {
            let timestamp = match default_duration {
                Some(duration) => base.saturating_add((i as u64).saturating_mul(duration)),
                None => base,
            };
            self.pending.push_back(FrameRecord {
                track_number: block.track_number,
                timestamp,
                is_keyframe: keyframe && i == 0,
                is_discardable: block.flags.contains(BlockFlags::DISCARDABLE),
                duration: if laced { default_duration } else { block_duration.or(default_duration) },
                payload,
            });
        }
        Ok(())
    }
}

impl Iterator for Frames<'_> {
    type Item = FrameRecord;

    fn next(&mut self) -> Option<FrameRecord> {
        loop {
            while let Some(frame) = self.pending.pop_front() {
                let index = self.index;
                self.index += 1;
                if self.selection.sample_ratio.keeps(index) {
                    return Some(frame);
                }
            }

            let element = match self.blocks.next() {
                Some(element) => element,
                None => {
                    if !self.next_cluster() {
                        return None;
                    }
                    continue;
                }
            };

            if let Err(e) = self.expand(element) {
                tracing::warn!(offset = element.offset(), error = %e, "skipping block");
            }
        }
    }
}
