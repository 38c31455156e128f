//! Shared fixtures: synthetic Kinesis-style fragments built with the EBML
//! encoding helpers, and a recording handler.

#![allow(dead_code)]

use kvstream::ebml::ebml::{
    encode_element, encode_unknown_size_element, encode_unsigned_int,
};
use kvstream::elements::*;
use kvstream::{ConsumerError, Fragment, FragmentHandler};
use parking_lot::Mutex;
use std::sync::Arc;

/// How a fixture fragment is laid out.
#[derive(Debug, Clone)]
pub struct FragmentSpec {
    /// Value of the fragment-number tag.
    pub number: u64,
    /// SimpleBlocks in the single cluster.
    pub frames: usize,
    /// Write Segment and Cluster with unknown size, as live producers do.
    pub unknown_size: bool,
    /// Cluster timestamp in milliseconds.
    pub cluster_timestamp: u64,
}

impl FragmentSpec {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            frames: 5,
            unknown_size: true,
            cluster_timestamp: number * 1000,
        }
    }

    pub fn known_size(mut self) -> Self {
        self.unknown_size = false;
        self
    }

    pub fn frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }
}

pub fn ebml_header() -> Vec<u8> {
    let mut body = encode_element(EBML_VERSION, &encode_unsigned_int(1));
    body.extend(encode_element(DOC_TYPE, b"matroska"));
    body.extend(encode_element(DOC_TYPE_VERSION, &encode_unsigned_int(4)));
    encode_element(EBML, &body)
}

pub fn tracks() -> Vec<u8> {
    let mut video = encode_element(TRACK_NUMBER, &encode_unsigned_int(1));
    video.extend(encode_element(TRACK_UID, &encode_unsigned_int(11)));
    video.extend(encode_element(TRACK_TYPE, &encode_unsigned_int(TRACK_TYPE_VIDEO)));
    video.extend(encode_element(CODEC_ID, codec_ids::V_MPEG4_ISO_AVC.as_bytes()));
    video.extend(encode_element(CODEC_PRIVATE, &[0x01, 0x64, 0x00, 0x1F]));

    let mut audio = encode_element(TRACK_NUMBER, &encode_unsigned_int(2));
    audio.extend(encode_element(TRACK_UID, &encode_unsigned_int(12)));
    audio.extend(encode_element(TRACK_TYPE, &encode_unsigned_int(TRACK_TYPE_AUDIO)));
    audio.extend(encode_element(CODEC_ID, codec_ids::A_AAC.as_bytes()));
    audio.extend(encode_element(DEFAULT_DURATION, &encode_unsigned_int(20_000_000)));

    let mut body = encode_element(TRACK_ENTRY, &video);
    body.extend(encode_element(TRACK_ENTRY, &audio));
    encode_element(TRACKS, &body)
}

pub fn simple_tag(name: &str, value: &str) -> Vec<u8> {
    let mut body = encode_element(TAG_NAME, name.as_bytes());
    body.extend(encode_element(TAG_STRING, value.as_bytes()));
    encode_element(SIMPLE_TAG, &body)
}

pub fn tags(number: u64) -> Vec<u8> {
    let mut body = simple_tag("AWS_KINESISVIDEO_FRAGMENT_NUMBER", &number.to_string());
    body.extend(simple_tag("AWS_KINESISVIDEO_SERVER_TIMESTAMP", "1665090834.843"));
    body.extend(simple_tag("AWS_KINESISVIDEO_PRODUCER_TIMESTAMP", "1665090834.120"));
    encode_element(TAGS, &encode_element(TAG, &body))
}

/// SimpleBlock payload: track, relative timestamp, flags, frame bytes.
pub fn block(track: u8, relative: i16, flags: u8, lace: &[u8], frames: &[&[u8]]) -> Vec<u8> {
    let mut data = vec![0x80 | track];
    data.extend_from_slice(&relative.to_be_bytes());
    data.push(flags);
    data.extend_from_slice(lace);
    for frame in frames {
        data.extend_from_slice(frame);
    }
    encode_element(SIMPLE_BLOCK, &data)
}

/// Video frames alternate with audio frames; frame `i` has payload
/// `[number, i, ...]` and relative timestamp `i * 10`.
pub fn cluster(spec: &FragmentSpec) -> Vec<u8> {
    let mut body = encode_element(TIMESTAMP, &encode_unsigned_int(spec.cluster_timestamp));
    for i in 0..spec.frames {
        let track = if i % 2 == 0 { 1 } else { 2 };
        let flags = if i == 0 { 0x80 } else { 0x00 };
        let payload = [spec.number as u8, i as u8, 0xAA, 0xBB];
        body.extend(block(track, (i * 10) as i16, flags, &[], &[&payload]));
    }
    if spec.unknown_size {
        encode_unknown_size_element(CLUSTER, &body)
    } else {
        encode_element(CLUSTER, &body)
    }
}

pub fn info() -> Vec<u8> {
    encode_element(INFO, &encode_element(TIMESTAMP_SCALE, &encode_unsigned_int(1_000_000)))
}

/// One complete fragment: EBML header followed by a Segment.
pub fn fragment_bytes(spec: &FragmentSpec) -> Vec<u8> {
    let mut body = info();
    body.extend(tracks());
    body.extend(cluster(spec));
    body.extend(tags(spec.number));

    let mut out = ebml_header();
    if spec.unknown_size {
        out.extend(encode_unknown_size_element(SEGMENT, &body));
    } else {
        out.extend(encode_element(SEGMENT, &body));
    }
    out
}

/// `count` concatenated fragments and their individual byte spans.
pub fn stream(count: u64, unknown_size: bool) -> (Vec<u8>, Vec<Vec<u8>>) {
    let parts: Vec<Vec<u8>> = (0..count)
        .map(|n| {
            let spec = FragmentSpec::new(n);
            let spec = if unknown_size { spec } else { spec.known_size() };
            fragment_bytes(&spec)
        })
        .collect();
    (parts.concat(), parts)
}

/// What a handler saw.
#[derive(Debug, Default)]
pub struct Recording {
    pub fragments: Vec<Fragment>,
    pub completed: Vec<String>,
    pub exceptions: Vec<String>,
}

impl Recording {
    pub fn terminal_callbacks(&self) -> usize {
        self.completed.len() + self.exceptions.len()
    }

    pub fn raw_concat(&self) -> Vec<u8> {
        self.fragments
            .iter()
            .flat_map(|f| f.raw_bytes().iter().copied())
            .collect()
    }
}

/// Handler that records every callback.
#[derive(Debug, Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Recording>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Recording {
        std::mem::take(&mut *self.0.lock())
    }
}

impl FragmentHandler for Recorder {
    fn on_fragment_arrived(&mut self, fragment: Fragment) {
        self.0.lock().fragments.push(fragment);
    }

    fn on_stream_read_complete(&mut self, stream_name: &str) {
        self.0.lock().completed.push(stream_name.to_string());
    }

    fn on_stream_read_exception(&mut self, _stream_name: &str, error: &ConsumerError) {
        self.0.lock().exceptions.push(error.to_string());
    }
}
