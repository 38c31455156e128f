//! Fragment processing error types.

use kvstream_ebml::EbmlError;
use std::path::PathBuf;
use thiserror::Error;

/// Fragment processing error types.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// Missing required element.
    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    /// Sample ratio outside (0, 1].
    #[error("Invalid sample ratio {numerator}/{denominator}: must be in (0, 1]")]
    InvalidSampleRatio {
        /// Ratio numerator.
        numerator: u32,
        /// Ratio denominator.
        denominator: u32,
    },

    /// Invalid block structure.
    #[error("Invalid block at offset {offset}: {message}")]
    InvalidBlock {
        /// Fragment offset of the block element.
        offset: u64,
        /// Description of the problem.
        message: String,
    },

    /// Lacing header could not be expanded.
    #[error("Unsupported lacing in block at offset {offset}: {message}")]
    UnsupportedLacing {
        /// Fragment offset of the block element.
        offset: u64,
        /// Description of the problem.
        message: String,
    },

    /// No decoder for this codec.
    #[error("Unsupported codec: {codec_id}")]
    UnsupportedCodec {
        /// Matroska codec ID.
        codec_id: String,
    },

    /// Frame payload could not be decoded to pixels.
    #[error("Failed to decode {codec_id} frame: {message}")]
    Decode {
        /// Matroska codec ID.
        codec_id: String,
        /// Decoder message.
        message: String,
    },

    /// Writing an output file failed.
    #[error("Failed to write {}: {source}", path.display())]
    FilesystemWrite {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Image encoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Element payload error.
    #[error("EBML error: {0}")]
    Ebml(#[from] EbmlError),
}

impl ProcessorError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProcessorError::FilesystemWrite {
            path: path.into(),
            source,
        }
    }

    /// Check if the error only affects a single frame or track.
    ///
    /// Frame iteration and image output skip these with a warning.
    pub fn is_per_frame(&self) -> bool {
        matches!(
            self,
            ProcessorError::InvalidBlock { .. }
                | ProcessorError::UnsupportedLacing { .. }
                | ProcessorError::UnsupportedCodec { .. }
                | ProcessorError::Decode { .. }
        )
    }
}
