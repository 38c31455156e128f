//! Post-processing facade over one decoder and one set of image options.

use crate::Result;
use crate::file::save_fragment_as_file;
use crate::frames::{extract_frames, FrameSelection, Frames};
use crate::images::{
    decode_frames, materialize_frames_as_images, DecodedFrame, FrameDecoder, ImageCrateDecoder,
    ImageOptions,
};
use crate::tags::{extract_tags, tag_map, KinesisTags, TagRecord, TagValue};
use crate::tracks::{extract_track_descriptors, TrackDescriptor};
use kvstream_consumer::Fragment;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fragment post-processing.
///
/// Every operation reads the fragment and fails independently of the
/// others.
///
/// ```no_run
/// use kvstream_processor::{FragmentProcessor, FrameSelection, SampleRatio};
/// # fn handle(fragment: kvstream_consumer::Fragment) -> kvstream_processor::Result<()> {
/// let mut processor = FragmentProcessor::new();
/// let tags = processor.tag_map(&fragment)?;
/// let selection = FrameSelection::all().with_sample_ratio(SampleRatio::one_in(5)?);
/// let images = processor.materialize_images(&fragment, &selection, "frames")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FragmentProcessor<D = ImageCrateDecoder> {
    decoder: D,
    image_options: ImageOptions,
}

impl FragmentProcessor<ImageCrateDecoder> {
    /// Create a processor with the built-in still-image decoder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: FrameDecoder> FragmentProcessor<D> {
    /// Create a processor with a custom decoder.
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            image_options: ImageOptions::default(),
        }
    }

    /// Set image output options.
    pub fn with_image_options(mut self, options: ImageOptions) -> Self {
        self.image_options = options;
        self
    }

    /// Image output options.
    pub fn image_options(&self) -> &ImageOptions {
        &self.image_options
    }

    /// All `SimpleTag`s.
    pub fn tags(&self, fragment: &Fragment) -> Result<Vec<TagRecord>> {
        extract_tags(fragment)
    }

    /// Tags as a name → value map.
    pub fn tag_map(&self, fragment: &Fragment) -> Result<HashMap<String, TagValue>> {
        Ok(tag_map(&extract_tags(fragment)?))
    }

    /// The well-known Kinesis Video tags.
    pub fn kinesis_tags(&self, fragment: &Fragment) -> Result<KinesisTags> {
        KinesisTags::from_fragment(fragment)
    }

    /// Track descriptors.
    pub fn tracks(&self, fragment: &Fragment) -> Result<Vec<TrackDescriptor>> {
        extract_track_descriptors(fragment)
    }

    /// Lazy frame records.
    pub fn frames<'a>(&self, fragment: &'a Fragment, selection: &FrameSelection) -> Result<Frames<'a>> {
        extract_frames(fragment, selection)
    }

    /// Indented element tree.
    pub fn pretty(&self, fragment: &Fragment) -> String {
        fragment.document().pretty()
    }

    /// Write the fragment as a standalone file.
    pub fn save_fragment(&self, fragment: &Fragment, path: impl AsRef<Path>) -> Result<()> {
        save_fragment_as_file(fragment, path)
    }

    /// Decode the selected frames in memory.
    pub fn decode_frames(
        &mut self,
        fragment: &Fragment,
        selection: &FrameSelection,
    ) -> Result<Vec<DecodedFrame>> {
        decode_frames(fragment, selection, &mut self.decoder)
    }

    /// Write the selected frames as images into `output_dir`.
    pub fn materialize_images(
        &mut self,
        fragment: &Fragment,
        selection: &FrameSelection,
        output_dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        materialize_frames_as_images(
            fragment,
            selection,
            output_dir,
            &mut self.decoder,
            &self.image_options,
        )
    }
}
