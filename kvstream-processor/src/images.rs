//! Frame-to-image materialization.
//!
//! Codec decoding is delegated to a [`FrameDecoder`]. [`ImageCrateDecoder`]
//! covers still-image codecs (`V_MJPEG`, `V_PNG`); compressed video codecs
//! need a caller-provided decoder.

use crate::error::ProcessorError;
use crate::Result;
use crate::frames::{extract_frames, FrameRecord, FrameSelection};
use crate::tracks::{extract_track_descriptors, TrackDescriptor};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::RgbImage;
use kvstream_consumer::Fragment;
use kvstream_ebml::elements::codec_ids;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Decoded frame pixels, packed RGB8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes, row-major.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap packed RGB8 data; `None` if the length does not match.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(3)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    fn into_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data)
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.into_raw(),
        }
    }
}

/// Decodes codec payloads to pixels.
pub trait FrameDecoder {
    /// Decode one frame.
    ///
    /// Returns [`ProcessorError::UnsupportedCodec`] for codecs the decoder
    /// does not handle.
    fn decode(&mut self, codec_id: &str, codec_private: &[u8], payload: &[u8]) -> Result<PixelBuffer>;
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for &mut D {
    fn decode(&mut self, codec_id: &str, codec_private: &[u8], payload: &[u8]) -> Result<PixelBuffer> {
        (**self).decode(codec_id, codec_private, payload)
    }
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for Box<D> {
    fn decode(&mut self, codec_id: &str, codec_private: &[u8], payload: &[u8]) -> Result<PixelBuffer> {
        (**self).decode(codec_id, codec_private, payload)
    }
}

/// Decoder for still-image codecs backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    /// Check if a codec ID can be decoded.
    pub fn supports(codec_id: &str) -> bool {
        Self::format_of(codec_id).is_some()
    }

    fn format_of(codec_id: &str) -> Option<image::ImageFormat> {
        match codec_id {
            codec_ids::V_MJPEG => Some(image::ImageFormat::Jpeg),
            codec_ids::V_PNG => Some(image::ImageFormat::Png),
            _ => None,
        }
    }
}

impl FrameDecoder for ImageCrateDecoder {
    fn decode(&mut self, codec_id: &str, _codec_private: &[u8], payload: &[u8]) -> Result<PixelBuffer> {
        let format = Self::format_of(codec_id).ok_or_else(|| ProcessorError::UnsupportedCodec {
            codec_id: codec_id.to_string(),
        })?;
        let image = image::load_from_memory_with_format(payload, format).map_err(|e| {
            ProcessorError::Decode {
                codec_id: codec_id.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(image.to_rgb8().into())
    }
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format with configurable quality.
    Jpeg,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Image output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Output format.
    pub format: ImageFormat,
    /// JPEG quality (1-100); ignored for PNG.
    pub quality: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: 85,
        }
    }
}

impl ImageOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set JPEG quality (clamped to 1-100).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Encode pixels in the configured format.
    pub fn encode(&self, pixels: PixelBuffer) -> Result<Vec<u8>> {
        let (width, height) = (pixels.width, pixels.height);
        let image = pixels.into_image().ok_or_else(|| ProcessorError::Decode {
            codec_id: String::new(),
            message: format!("pixel buffer does not match {}x{}", width, height),
        })?;

        let mut data = Vec::new();
        match self.format {
            ImageFormat::Png => image.write_with_encoder(PngEncoder::new(&mut data))?,
            ImageFormat::Jpeg => image.write_with_encoder(JpegEncoder::new_with_quality(
                &mut data,
                self.quality.clamp(1, 100),
            ))?,
        }
        Ok(data)
    }
}

/// A selected frame decoded to pixels.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Track number.
    pub track_number: u64,
    /// Presentation timestamp in nanoseconds.
    pub timestamp: u64,
    /// Keyframe flag of the source frame.
    pub is_keyframe: bool,
    /// Decoded pixels.
    pub pixels: PixelBuffer,
}

/// Decode the selected frames in memory.
///
/// Frames that fail to decode, or belong to a track without a descriptor,
/// are skipped with a warning.
pub fn decode_frames<D: FrameDecoder>(
    fragment: &Fragment,
    selection: &FrameSelection,
    mut decoder: D,
) -> Result<Vec<DecodedFrame>> {
    let tracks = track_map(fragment)?;
    let mut decoded = Vec::new();

    for frame in extract_frames(fragment, selection)? {
        if let Some(pixels) = decode_one(&tracks, &mut decoder, &frame) {
            decoded.push(DecodedFrame {
                track_number: frame.track_number,
                timestamp: frame.timestamp,
                is_keyframe: frame.is_keyframe,
                pixels,
            });
        }
    }

    Ok(decoded)
}

/// Decode the selected frames and write one image file per frame.
///
/// Files are named `track{N}_{timestamp_ns}.{ext}` inside `output_dir`,
/// with `_{k}` appended when a track/timestamp pair repeats. Returns the
/// written paths in frame order. Decode failures skip the frame; write
/// failures abort with [`ProcessorError::FilesystemWrite`].
pub fn materialize_frames_as_images<D: FrameDecoder>(
    fragment: &Fragment,
    selection: &FrameSelection,
    output_dir: impl AsRef<Path>,
    mut decoder: D,
    options: &ImageOptions,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).map_err(|e| ProcessorError::write(output_dir, e))?;

    let tracks = track_map(fragment)?;
    let mut seen: HashMap<(u64, u64), u32> = HashMap::new();
    let mut paths = Vec::new();

    for frame in extract_frames(fragment, selection)? {
        let Some(pixels) = decode_one(&tracks, &mut decoder, &frame) else {
            continue;
        };

        let repeat = seen.entry((frame.track_number, frame.timestamp)).or_insert(0);
        let name = image_file_name(frame.track_number, frame.timestamp, *repeat, options.format);
        *repeat += 1;

        let path = output_dir.join(name);
        let data = options.encode(pixels)?;
        std::fs::write(&path, data).map_err(|e| ProcessorError::write(&path, e))?;
        paths.push(path);
    }

    tracing::debug!(
        fragment = fragment.fragment_number(),
        images = paths.len(),
        dir = %output_dir.display(),
        "materialized frames"
    );
    Ok(paths)
}

fn image_file_name(track: u64, timestamp: u64, repeat: u32, format: ImageFormat) -> String {
    if repeat == 0 {
        format!("track{}_{}.{}", track, timestamp, format.extension())
    } else {
        format!("track{}_{}_{}.{}", track, timestamp, repeat, format.extension())
    }
}

fn track_map(fragment: &Fragment) -> Result<HashMap<u64, TrackDescriptor>> {
    Ok(extract_track_descriptors(fragment)?
        .into_iter()
        .map(|t| (t.track_number, t))
        .collect())
}

fn decode_one<D: FrameDecoder>(
    tracks: &HashMap<u64, TrackDescriptor>,
    decoder: &mut D,
    frame: &FrameRecord,
) -> Option<PixelBuffer> {
    let Some(track) = tracks.get(&frame.track_number) else {
        tracing::warn!(track = frame.track_number, "no track descriptor, skipping frame");
        return None;
    };

    let decoded = decoder
        .decode(&track.codec_id, &track.codec_private, &frame.payload)
        .and_then(|pixels| {
            let (width, height) = (pixels.width, pixels.height);
            PixelBuffer::new(width, height, pixels.data).ok_or_else(|| ProcessorError::Decode {
                codec_id: track.codec_id.clone(),
                message: format!("pixel buffer does not match {}x{}", width, height),
            })
        });

    match decoded {
        Ok(pixels) => Some(pixels),
        Err(e) => {
            tracing::warn!(
                track = frame.track_number,
                timestamp = frame.timestamp,
                error = %e,
                "skipping frame"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tests::block_bytes;
    use crate::frames::SampleRatio;
    use kvstream_ebml::ebml::{encode_element, encode_unsigned_int};
    use kvstream_ebml::elements::*;

    fn png_bytes(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let pixels = PixelBuffer::new(width, height, vec![shade; (width * height * 3) as usize]).unwrap();
        ImageOptions::default().encode(pixels).unwrap()
    }

    fn track_entry(number: u64, codec: &str) -> Vec<u8> {
        let mut body = encode_element(TRACK_NUMBER, &encode_unsigned_int(number));
        body.extend(encode_element(TRACK_TYPE, &encode_unsigned_int(TRACK_TYPE_VIDEO)));
        body.extend(encode_element(CODEC_ID, codec.as_bytes()));
        encode_element(TRACK_ENTRY, &body)
    }

    fn image_fragment() -> Fragment {
        let tracks = encode_element(
            TRACKS,
            &[track_entry(1, codec_ids::V_PNG), track_entry(2, codec_ids::V_VP8)].concat(),
        );
        let mut cluster = encode_element(TIMESTAMP, &encode_unsigned_int(0));
        for i in 0..4u8 {
            let png = png_bytes(2, 2, i * 10);
            cluster.extend(encode_element(
                SIMPLE_BLOCK,
                &block_bytes(1, i as i16 * 100, 0x80, &[], &[&png]),
            ));
        }
        // Same timestamp as the first frame
        cluster.extend(encode_element(
            SIMPLE_BLOCK,
            &block_bytes(1, 0, 0x80, &[], &[&png_bytes(2, 2, 200)]),
        ));
        cluster.extend(encode_element(
            SIMPLE_BLOCK,
            &block_bytes(2, 0, 0x80, &[], &[b"vp8 payload"]),
        ));
        let body = [tracks, encode_element(CLUSTER, &cluster)].concat();
        Fragment::parse(encode_element(SEGMENT, &body)).unwrap()
    }

    #[test]
    fn test_pixel_buffer_length_check() {
        assert!(PixelBuffer::new(2, 2, vec![0; 12]).is_some());
        assert!(PixelBuffer::new(2, 2, vec![0; 11]).is_none());
    }

    #[test]
    fn test_image_crate_decoder() {
        let mut decoder = ImageCrateDecoder;
        let pixels = decoder.decode(codec_ids::V_PNG, &[], &png_bytes(3, 1, 7)).unwrap();
        assert_eq!((pixels.width, pixels.height), (3, 1));
        assert_eq!(pixels.data, vec![7; 9]);

        assert!(matches!(
            decoder.decode(codec_ids::V_VP8, &[], b"x"),
            Err(ProcessorError::UnsupportedCodec { .. })
        ));
        assert!(matches!(
            decoder.decode(codec_ids::V_PNG, &[], b"not a png"),
            Err(ProcessorError::Decode { .. })
        ));
        assert!(ImageCrateDecoder::supports(codec_ids::V_MJPEG));
    }

    #[test]
    fn test_decode_frames_skips_unsupported() {
        let fragment = image_fragment();
        let frames = decode_frames(&fragment, &FrameSelection::all(), ImageCrateDecoder).unwrap();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.track_number == 1));
        assert_eq!(frames[1].timestamp, 100_000_000);
        assert_eq!(frames[1].pixels.data[0], 10);
    }

    #[test]
    fn test_materialize_png() {
        let dir = tempfile::tempdir().unwrap();
        let fragment = image_fragment();
        let paths = materialize_frames_as_images(
            &fragment,
            &FrameSelection::all().with_tracks([1]),
            dir.path(),
            ImageCrateDecoder,
            &ImageOptions::default(),
        )
        .unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "track1_0.png",
                "track1_100000000.png",
                "track1_200000000.png",
                "track1_300000000.png",
                "track1_0_1.png",
            ]
        );

        let round_trip = image::open(&paths[2]).unwrap().to_rgb8();
        assert_eq!(round_trip.get_pixel(0, 0).0, [20, 20, 20]);
    }

    #[test]
    fn test_materialize_jpeg_sampled() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("images");
        let fragment = image_fragment();
        let selection = FrameSelection::all()
            .with_tracks([1])
            .with_sample_ratio(SampleRatio::one_in(2).unwrap());
        let options = ImageOptions::new().with_format(ImageFormat::Jpeg).with_quality(90);

        let paths =
            materialize_frames_as_images(&fragment, &selection, &out, ImageCrateDecoder, &options).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.extension().unwrap() == "jpg"));
        let bytes = std::fs::read(&paths[0]).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    /// Decoder that reports a larger size than the pixels it returns.
    struct ShortDecoder;

    impl FrameDecoder for ShortDecoder {
        fn decode(&mut self, _codec_id: &str, _codec_private: &[u8], payload: &[u8]) -> Result<PixelBuffer> {
            let mut pixels = ImageCrateDecoder.decode(codec_ids::V_PNG, &[], payload)?;
            if pixels.data[0] == 20 {
                pixels.width += 1;
            }
            Ok(pixels)
        }
    }

    #[test]
    fn test_mismatched_pixel_buffer_skips_frame() {
        let dir = tempfile::tempdir().unwrap();
        let selection = FrameSelection::all().with_tracks([1]);
        let fragment = image_fragment();

        let paths = materialize_frames_as_images(
            &fragment,
            &selection,
            dir.path(),
            ShortDecoder,
            &ImageOptions::default(),
        )
        .unwrap();
        assert_eq!(paths.len(), 4);
        assert!(!paths.iter().any(|p| p.ends_with("track1_200000000.png")));

        let frames = decode_frames(&fragment, &selection, ShortDecoder).unwrap();
        assert_eq!(frames.len(), 4);
        assert!(frames.iter().all(|f| f.timestamp != 200_000_000));
    }

    #[test]
    fn test_materialize_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let result = materialize_frames_as_images(
            &image_fragment(),
            &FrameSelection::all(),
            &blocker,
            ImageCrateDecoder,
            &ImageOptions::default(),
        );
        assert!(matches!(result, Err(ProcessorError::FilesystemWrite { .. })));
    }

    #[test]
    fn test_options_quality_clamped() {
        assert_eq!(ImageOptions::new().with_quality(0).quality, 1);
        assert_eq!(ImageOptions::new().with_quality(250).quality, 100);
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
    }
}
