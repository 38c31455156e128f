//! Track descriptors read from the `Tracks` element.

use crate::error::ProcessorError;
use crate::Result;
use bytes::Bytes;
use kvstream_consumer::Fragment;
use kvstream_ebml::elements::*;
use kvstream_ebml::{Document, Element};
use serde::Serialize;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrackType {
    /// Video track.
    Video,
    /// Audio track.
    Audio,
    /// Anything else, with the raw Matroska track type.
    Other(u64),
}

impl From<u64> for TrackType {
    fn from(value: u64) -> Self {
        match value {
            TRACK_TYPE_VIDEO => TrackType::Video,
            TRACK_TYPE_AUDIO => TrackType::Audio,
            other => TrackType::Other(other),
        }
    }
}

/// Video settings of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoSettings {
    /// Pixel width.
    pub pixel_width: u64,
    /// Pixel height.
    pub pixel_height: u64,
}

/// Audio settings of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioSettings {
    /// Sampling frequency in Hz.
    pub sampling_frequency: f64,
    /// Channel count.
    pub channels: u64,
}

/// One `TrackEntry`, decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackDescriptor {
    /// Track number used by blocks.
    pub track_number: u64,
    /// Track UID, referenced by tag targets.
    pub uid: Option<u64>,
    /// Track type.
    pub track_type: TrackType,
    /// Matroska codec ID (e.g. `V_MPEG4/ISO/AVC`).
    pub codec_id: String,
    /// Codec initialization data; empty when absent.
    #[serde(skip)]
    pub codec_private: Bytes,
    /// Human-readable track name.
    pub name: Option<String>,
    /// Track language.
    pub language: Option<String>,
    /// Nominal frame duration in nanoseconds.
    pub default_duration: Option<u64>,
    /// Video settings for video tracks.
    pub video: Option<VideoSettings>,
    /// Audio settings for audio tracks.
    pub audio: Option<AudioSettings>,
}

impl TrackDescriptor {
    /// Decode a `TrackEntry` element.
    pub fn from_element(entry: &Element) -> Result<Self> {
        let track_number = entry
            .child_unsigned(TRACK_NUMBER)?
            .ok_or(ProcessorError::MissingElement("TrackNumber"))?;
        let track_type = entry
            .child_unsigned(TRACK_TYPE)?
            .map(TrackType::from)
            .unwrap_or(TrackType::Other(0));
        let codec_id = entry
            .child_str(CODEC_ID)?
            .ok_or(ProcessorError::MissingElement("CodecID"))?
            .to_owned();
        let codec_private = entry.child_binary(CODEC_PRIVATE)?.cloned().unwrap_or_default();

        let language = match entry.child_str(LANGUAGE_BCP47)? {
            Some(lang) => Some(lang.to_owned()),
            None => entry.child_str(LANGUAGE)?.map(str::to_owned),
        };

        let video = entry
            .child(VIDEO)
            .map(|video| -> Result<VideoSettings> {
                Ok(VideoSettings {
                    pixel_width: video.child_unsigned(PIXEL_WIDTH)?.unwrap_or(0),
                    pixel_height: video.child_unsigned(PIXEL_HEIGHT)?.unwrap_or(0),
                })
            })
            .transpose()?;

        let audio = entry
            .child(AUDIO)
            .map(|audio| -> Result<AudioSettings> {
                Ok(AudioSettings {
                    sampling_frequency: audio.child_float(SAMPLING_FREQUENCY)?.unwrap_or(8000.0),
                    channels: audio.child_unsigned(CHANNELS)?.unwrap_or(1),
                })
            })
            .transpose()?;

        Ok(Self {
            track_number,
            uid: entry.child_unsigned(TRACK_UID)?,
            track_type,
            codec_id,
            codec_private,
            name: entry.child_str(NAME)?.map(str::to_owned),
            language,
            default_duration: entry.child_unsigned(DEFAULT_DURATION)?.filter(|&d| d > 0),
            video,
            audio,
        })
    }

    /// Check if this is a video track.
    pub fn is_video(&self) -> bool {
        self.track_type == TrackType::Video
    }

    /// Check if this is an audio track.
    pub fn is_audio(&self) -> bool {
        self.track_type == TrackType::Audio
    }
}

/// Track descriptors of a fragment, in `Tracks` order.
///
/// A fragment without a `Tracks` element has no descriptors.
pub fn extract_track_descriptors(fragment: &Fragment) -> Result<Vec<TrackDescriptor>> {
    tracks_from_document(fragment.document())
}

pub(crate) fn tracks_from_document(document: &Document) -> Result<Vec<TrackDescriptor>> {
    let segment = document
        .segment()
        .ok_or(ProcessorError::MissingElement("Segment"))?;

    segment
        .children_with_id(TRACKS)
        .flat_map(|tracks| tracks.children_with_id(TRACK_ENTRY))
        .map(TrackDescriptor::from_element)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvstream_ebml::ebml::{encode_element, encode_unsigned_int};

    fn track_entry(number: u64, track_type: u64, codec: &str, extra: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend(encode_element(TRACK_NUMBER, &encode_unsigned_int(number)));
        body.extend(encode_element(TRACK_UID, &encode_unsigned_int(1000 + number)));
        body.extend(encode_element(TRACK_TYPE, &encode_unsigned_int(track_type)));
        body.extend(encode_element(CODEC_ID, codec.as_bytes()));
        body.extend_from_slice(extra);
        encode_element(TRACK_ENTRY, &body)
    }

    fn fragment_with_tracks(entries: &[Vec<u8>]) -> Fragment {
        let tracks = encode_element(TRACKS, &entries.concat());
        Fragment::parse(encode_element(SEGMENT, &tracks)).unwrap()
    }

    #[test]
    fn test_video_and_audio_tracks() {
        let mut video = encode_element(PIXEL_WIDTH, &encode_unsigned_int(1280));
        video.extend(encode_element(PIXEL_HEIGHT, &encode_unsigned_int(720)));
        let mut video_extra = encode_element(VIDEO, &video);
        video_extra.extend(encode_element(CODEC_PRIVATE, &[1, 2, 3]));
        video_extra.extend(encode_element(DEFAULT_DURATION, &encode_unsigned_int(33_333_333)));
        video_extra.extend(encode_element(NAME, b"camera"));

        let mut audio = encode_element(SAMPLING_FREQUENCY, &48_000f64.to_be_bytes());
        audio.extend(encode_element(CHANNELS, &encode_unsigned_int(2)));
        let mut audio_extra = encode_element(AUDIO, &audio);
        audio_extra.extend(encode_element(LANGUAGE, b"eng"));

        let fragment = fragment_with_tracks(&[
            track_entry(1, TRACK_TYPE_VIDEO, codec_ids::V_MPEG4_ISO_AVC, &video_extra),
            track_entry(2, TRACK_TYPE_AUDIO, codec_ids::A_AAC, &audio_extra),
        ]);

        let tracks = extract_track_descriptors(&fragment).unwrap();
        assert_eq!(tracks.len(), 2);

        let v = &tracks[0];
        assert_eq!(v.track_number, 1);
        assert_eq!(v.uid, Some(1001));
        assert!(v.is_video());
        assert_eq!(v.codec_id, "V_MPEG4/ISO/AVC");
        assert_eq!(&v.codec_private[..], &[1, 2, 3]);
        assert_eq!(v.default_duration, Some(33_333_333));
        assert_eq!(v.name.as_deref(), Some("camera"));
        assert_eq!(
            v.video,
            Some(VideoSettings {
                pixel_width: 1280,
                pixel_height: 720
            })
        );

        let a = &tracks[1];
        assert!(a.is_audio());
        assert!(a.codec_private.is_empty());
        assert_eq!(a.language.as_deref(), Some("eng"));
        let settings = a.audio.unwrap();
        assert_eq!(settings.sampling_frequency, 48_000.0);
        assert_eq!(settings.channels, 2);
    }

    #[test]
    fn test_other_track_type() {
        let fragment = fragment_with_tracks(&[track_entry(
            3,
            TRACK_TYPE_METADATA,
            "M_AWS_KVS",
            &[],
        )]);
        let tracks = extract_track_descriptors(&fragment).unwrap();
        assert_eq!(tracks[0].track_type, TrackType::Other(TRACK_TYPE_METADATA));
    }

    #[test]
    fn test_no_tracks_element() {
        let fragment = Fragment::parse(encode_element(SEGMENT, &[])).unwrap();
        assert!(extract_track_descriptors(&fragment).unwrap().is_empty());
    }

    #[test]
    fn test_missing_track_number() {
        let entry = encode_element(
            TRACK_ENTRY,
            &encode_element(CODEC_ID, codec_ids::V_VP8.as_bytes()),
        );
        let fragment = fragment_with_tracks(&[entry]);
        assert!(matches!(
            extract_track_descriptors(&fragment),
            Err(ProcessorError::MissingElement("TrackNumber"))
        ));
    }

    #[test]
    fn test_missing_segment() {
        let fragment = Fragment::parse(encode_element(EBML, &[])).unwrap();
        assert!(matches!(
            extract_track_descriptors(&fragment),
            Err(ProcessorError::MissingElement("Segment"))
        ));
    }
}
