//! Matroska element IDs, track types and codec IDs.
//!
//! The [`MATROSKA`] table records each element's name, value kind and the
//! masters it may appear in. [`Schema::matroska`](crate::Schema::matroska)
//! is built from it.

use crate::schema::{ElementDef, ElementKind::*};

// =============================================================================
// EBML Header Elements
// =============================================================================

/// EBML Header element.
pub const EBML: u32 = 0x1A45DFA3;
/// EBML Version.
pub const EBML_VERSION: u32 = 0x4286;
/// EBML Read Version.
pub const EBML_READ_VERSION: u32 = 0x42F7;
/// EBML Max ID Length.
pub const EBML_MAX_ID_LENGTH: u32 = 0x42F2;
/// EBML Max Size Length.
pub const EBML_MAX_SIZE_LENGTH: u32 = 0x42F3;
/// EBML Doc Type.
pub const DOC_TYPE: u32 = 0x4282;
/// EBML Doc Type Version.
pub const DOC_TYPE_VERSION: u32 = 0x4287;
/// EBML Doc Type Read Version.
pub const DOC_TYPE_READ_VERSION: u32 = 0x4285;
/// EBML Doc Type Extension.
pub const DOC_TYPE_EXTENSION: u32 = 0x4281;
/// EBML Doc Type Extension Name.
pub const DOC_TYPE_EXTENSION_NAME: u32 = 0x4283;
/// EBML Doc Type Extension Version.
pub const DOC_TYPE_EXTENSION_VERSION: u32 = 0x4284;

// =============================================================================
// Global Elements
// =============================================================================

/// Void (padding, valid anywhere).
pub const VOID: u32 = 0xEC;
/// CRC-32 (checksum of the parent, valid anywhere).
pub const CRC32: u32 = 0xBF;

// =============================================================================
// Segment
// =============================================================================

/// Segment (the root container for all Matroska data).
pub const SEGMENT: u32 = 0x18538067;

/// SeekHead (index of top-level elements).
pub const SEEK_HEAD: u32 = 0x114D9B74;
/// Seek entry.
pub const SEEK: u32 = 0x4DBB;
/// Seek ID.
pub const SEEK_ID: u32 = 0x53AB;
/// Seek Position.
pub const SEEK_POSITION: u32 = 0x53AC;

// =============================================================================
// Segment Information
// =============================================================================

/// Segment Info.
pub const INFO: u32 = 0x1549A966;
/// Segment UID.
pub const SEGMENT_UID: u32 = 0x73A4;
/// Segment Filename.
pub const SEGMENT_FILENAME: u32 = 0x7384;
/// Previous UID.
pub const PREV_UID: u32 = 0x3CB923;
/// Previous Filename.
pub const PREV_FILENAME: u32 = 0x3C83AB;
/// Next UID.
pub const NEXT_UID: u32 = 0x3EB923;
/// Next Filename.
pub const NEXT_FILENAME: u32 = 0x3E83BB;
/// Segment Family.
pub const SEGMENT_FAMILY: u32 = 0x4444;
/// Timestamp Scale (nanoseconds per timestamp tick).
pub const TIMESTAMP_SCALE: u32 = 0x2AD7B1;
/// Duration.
pub const DURATION: u32 = 0x4489;
/// Date UTC.
pub const DATE_UTC: u32 = 0x4461;
/// Title.
pub const TITLE: u32 = 0x7BA9;
/// Muxing Application.
pub const MUXING_APP: u32 = 0x4D80;
/// Writing Application.
pub const WRITING_APP: u32 = 0x5741;

// =============================================================================
// Cluster
// =============================================================================

/// Cluster.
pub const CLUSTER: u32 = 0x1F43B675;
/// Cluster Timestamp.
pub const TIMESTAMP: u32 = 0xE7;
/// Silent Tracks.
pub const SILENT_TRACKS: u32 = 0x5854;
/// Silent Track Number.
pub const SILENT_TRACK_NUMBER: u32 = 0x58D7;
/// Position.
pub const POSITION: u32 = 0xA7;
/// Previous Cluster Size.
pub const PREV_SIZE: u32 = 0xAB;
/// Simple Block.
pub const SIMPLE_BLOCK: u32 = 0xA3;
/// Block Group.
pub const BLOCK_GROUP: u32 = 0xA0;
/// Encrypted Block.
pub const ENCRYPTED_BLOCK: u32 = 0xAF;
/// Block.
pub const BLOCK: u32 = 0xA1;
/// Block Virtual.
pub const BLOCK_VIRTUAL: u32 = 0xA2;
/// Block Additions.
pub const BLOCK_ADDITIONS: u32 = 0x75A1;
/// Block More.
pub const BLOCK_MORE: u32 = 0xA6;
/// Block Add ID.
pub const BLOCK_ADD_ID: u32 = 0xEE;
/// Block Additional.
pub const BLOCK_ADDITIONAL: u32 = 0xA5;
/// Block Duration.
pub const BLOCK_DURATION: u32 = 0x9B;
/// Reference Priority.
pub const REFERENCE_PRIORITY: u32 = 0xFA;
/// Reference Block.
pub const REFERENCE_BLOCK: u32 = 0xFB;
/// Codec State.
pub const CODEC_STATE: u32 = 0xA4;
/// Discard Padding.
pub const DISCARD_PADDING: u32 = 0x75A2;

// =============================================================================
// Tracks
// =============================================================================

/// Tracks.
pub const TRACKS: u32 = 0x1654AE6B;
/// Track Entry.
pub const TRACK_ENTRY: u32 = 0xAE;
/// Track Number.
pub const TRACK_NUMBER: u32 = 0xD7;
/// Track UID.
pub const TRACK_UID: u32 = 0x73C5;
/// Track Type.
pub const TRACK_TYPE: u32 = 0x83;
/// Flag Enabled.
pub const FLAG_ENABLED: u32 = 0xB9;
/// Flag Default.
pub const FLAG_DEFAULT: u32 = 0x88;
/// Flag Forced.
pub const FLAG_FORCED: u32 = 0x55AA;
/// Flag Lacing.
pub const FLAG_LACING: u32 = 0x9C;
/// Min Cache.
pub const MIN_CACHE: u32 = 0x6DE7;
/// Max Cache.
pub const MAX_CACHE: u32 = 0x6DF8;
/// Default Duration (nanoseconds per frame).
pub const DEFAULT_DURATION: u32 = 0x23E383;
/// Default Decoded Field Duration.
pub const DEFAULT_DECODED_FIELD_DURATION: u32 = 0x234E7A;
/// Track Timestamp Scale.
pub const TRACK_TIMESTAMP_SCALE: u32 = 0x23314F;
/// Max Block Addition ID.
pub const MAX_BLOCK_ADDITION_ID: u32 = 0x55EE;
/// Track Name.
pub const NAME: u32 = 0x536E;
/// Track Language.
pub const LANGUAGE: u32 = 0x22B59C;
/// Track Language (BCP 47).
pub const LANGUAGE_BCP47: u32 = 0x22B59D;
/// Codec ID.
pub const CODEC_ID: u32 = 0x86;
/// Codec Private Data.
pub const CODEC_PRIVATE: u32 = 0x63A2;
/// Codec Name.
pub const CODEC_NAME: u32 = 0x258688;
/// Attachment Link.
pub const ATTACHMENT_LINK: u32 = 0x7446;
/// Codec Decode All.
pub const CODEC_DECODE_ALL: u32 = 0xAA;
/// Track Overlay.
pub const TRACK_OVERLAY: u32 = 0x6FAB;
/// Codec Delay.
pub const CODEC_DELAY: u32 = 0x56AA;
/// Seek Pre-Roll.
pub const SEEK_PRE_ROLL: u32 = 0x56BB;

/// Video settings.
pub const VIDEO: u32 = 0xE0;
/// Flag Interlaced.
pub const FLAG_INTERLACED: u32 = 0x9A;
/// Field Order.
pub const FIELD_ORDER: u32 = 0x9D;
/// Stereo Mode.
pub const STEREO_MODE: u32 = 0x53B8;
/// Alpha Mode.
pub const ALPHA_MODE: u32 = 0x53C0;
/// Pixel Width.
pub const PIXEL_WIDTH: u32 = 0xB0;
/// Pixel Height.
pub const PIXEL_HEIGHT: u32 = 0xBA;
/// Pixel Crop Bottom.
pub const PIXEL_CROP_BOTTOM: u32 = 0x54AA;
/// Pixel Crop Top.
pub const PIXEL_CROP_TOP: u32 = 0x54BB;
/// Pixel Crop Left.
pub const PIXEL_CROP_LEFT: u32 = 0x54CC;
/// Pixel Crop Right.
pub const PIXEL_CROP_RIGHT: u32 = 0x54DD;
/// Display Width.
pub const DISPLAY_WIDTH: u32 = 0x54B0;
/// Display Height.
pub const DISPLAY_HEIGHT: u32 = 0x54BA;
/// Display Unit.
pub const DISPLAY_UNIT: u32 = 0x54B2;
/// Aspect Ratio Type.
pub const ASPECT_RATIO_TYPE: u32 = 0x54B3;
/// Colour Space.
pub const COLOUR_SPACE: u32 = 0x2EB524;
/// Colour.
pub const COLOUR: u32 = 0x55B0;
/// Matrix Coefficients.
pub const MATRIX_COEFFICIENTS: u32 = 0x55B1;
/// Bits Per Channel.
pub const BITS_PER_CHANNEL: u32 = 0x55B2;
/// Transfer Characteristics.
pub const TRANSFER_CHARACTERISTICS: u32 = 0x55BA;
/// Primaries.
pub const PRIMARIES: u32 = 0x55BB;
/// Range.
pub const RANGE: u32 = 0x55B9;

/// Audio settings.
pub const AUDIO: u32 = 0xE1;
/// Sampling Frequency.
pub const SAMPLING_FREQUENCY: u32 = 0xB5;
/// Output Sampling Frequency.
pub const OUTPUT_SAMPLING_FREQUENCY: u32 = 0x78B5;
/// Channels.
pub const CHANNELS: u32 = 0x9F;
/// Bit Depth.
pub const BIT_DEPTH: u32 = 0x6264;

/// Content Encodings.
pub const CONTENT_ENCODINGS: u32 = 0x6D80;
/// Content Encoding.
pub const CONTENT_ENCODING: u32 = 0x6240;
/// Content Encoding Order.
pub const CONTENT_ENCODING_ORDER: u32 = 0x5031;
/// Content Encoding Scope.
pub const CONTENT_ENCODING_SCOPE: u32 = 0x5032;
/// Content Encoding Type.
pub const CONTENT_ENCODING_TYPE: u32 = 0x5033;
/// Content Compression.
pub const CONTENT_COMPRESSION: u32 = 0x5034;
/// Content Compression Algorithm.
pub const CONTENT_COMP_ALGO: u32 = 0x4254;
/// Content Compression Settings.
pub const CONTENT_COMP_SETTINGS: u32 = 0x4255;
/// Content Encryption.
pub const CONTENT_ENCRYPTION: u32 = 0x5035;
/// Content Encryption Algorithm.
pub const CONTENT_ENC_ALGO: u32 = 0x47E1;
/// Content Encryption Key ID.
pub const CONTENT_ENC_KEY_ID: u32 = 0x47E2;

// =============================================================================
// Cues
// =============================================================================

/// Cues.
pub const CUES: u32 = 0x1C53BB6B;
/// Cue Point.
pub const CUE_POINT: u32 = 0xBB;
/// Cue Time.
pub const CUE_TIME: u32 = 0xB3;
/// Cue Track Positions.
pub const CUE_TRACK_POSITIONS: u32 = 0xB7;
/// Cue Track.
pub const CUE_TRACK: u32 = 0xF7;
/// Cue Cluster Position.
pub const CUE_CLUSTER_POSITION: u32 = 0xF1;
/// Cue Relative Position.
pub const CUE_RELATIVE_POSITION: u32 = 0xF0;
/// Cue Duration.
pub const CUE_DURATION: u32 = 0xB2;
/// Cue Block Number.
pub const CUE_BLOCK_NUMBER: u32 = 0x5378;

// =============================================================================
// Attachments
// =============================================================================

/// Attachments.
pub const ATTACHMENTS: u32 = 0x1941A469;
/// Attached File.
pub const ATTACHED_FILE: u32 = 0x61A7;
/// File Description.
pub const FILE_DESCRIPTION: u32 = 0x467E;
/// File Name.
pub const FILE_NAME: u32 = 0x466E;
/// File Media Type.
pub const FILE_MEDIA_TYPE: u32 = 0x4660;
/// File Data.
pub const FILE_DATA: u32 = 0x465C;
/// File UID.
pub const FILE_UID: u32 = 0x46AE;

// =============================================================================
// Chapters
// =============================================================================

/// Chapters.
pub const CHAPTERS: u32 = 0x1043A770;
/// Edition Entry.
pub const EDITION_ENTRY: u32 = 0x45B9;
/// Edition UID.
pub const EDITION_UID: u32 = 0x45BC;
/// Edition Flag Hidden.
pub const EDITION_FLAG_HIDDEN: u32 = 0x45BD;
/// Edition Flag Default.
pub const EDITION_FLAG_DEFAULT: u32 = 0x45DB;
/// Edition Flag Ordered.
pub const EDITION_FLAG_ORDERED: u32 = 0x45DD;
/// Chapter Atom.
pub const CHAPTER_ATOM: u32 = 0xB6;
/// Chapter UID.
pub const CHAPTER_UID: u32 = 0x73C4;
/// Chapter String UID.
pub const CHAPTER_STRING_UID: u32 = 0x5654;
/// Chapter Time Start.
pub const CHAPTER_TIME_START: u32 = 0x91;
/// Chapter Time End.
pub const CHAPTER_TIME_END: u32 = 0x92;
/// Chapter Flag Hidden.
pub const CHAPTER_FLAG_HIDDEN: u32 = 0x98;
/// Chapter Flag Enabled.
pub const CHAPTER_FLAG_ENABLED: u32 = 0x4598;
/// Chapter Segment UID.
pub const CHAPTER_SEGMENT_UID: u32 = 0x6E67;
/// Chapter Display.
pub const CHAPTER_DISPLAY: u32 = 0x80;
/// Chapter String.
pub const CHAP_STRING: u32 = 0x85;
/// Chapter Language.
pub const CHAP_LANGUAGE: u32 = 0x437C;
/// Chapter Country.
pub const CHAP_COUNTRY: u32 = 0x437E;

// =============================================================================
// Tags
// =============================================================================

/// Tags.
pub const TAGS: u32 = 0x1254C367;
/// Tag.
pub const TAG: u32 = 0x7373;
/// Targets.
pub const TARGETS: u32 = 0x63C0;
/// Target Type Value.
pub const TARGET_TYPE_VALUE: u32 = 0x68CA;
/// Target Type.
pub const TARGET_TYPE: u32 = 0x63CA;
/// Tag Track UID.
pub const TAG_TRACK_UID: u32 = 0x63C5;
/// Tag Edition UID.
pub const TAG_EDITION_UID: u32 = 0x63C9;
/// Tag Chapter UID.
pub const TAG_CHAPTER_UID: u32 = 0x63C4;
/// Tag Attachment UID.
pub const TAG_ATTACHMENT_UID: u32 = 0x63C6;
/// Simple Tag.
pub const SIMPLE_TAG: u32 = 0x67C8;
/// Tag Name.
pub const TAG_NAME: u32 = 0x45A3;
/// Tag Language.
pub const TAG_LANGUAGE: u32 = 0x447A;
/// Tag Language (BCP 47).
pub const TAG_LANGUAGE_BCP47: u32 = 0x447B;
/// Tag Default.
pub const TAG_DEFAULT: u32 = 0x4484;
/// Tag String.
pub const TAG_STRING: u32 = 0x4487;
/// Tag Binary.
pub const TAG_BINARY: u32 = 0x4485;

// =============================================================================
// Track Types
// =============================================================================

/// Track type: Video.
pub const TRACK_TYPE_VIDEO: u64 = 1;
/// Track type: Audio.
pub const TRACK_TYPE_AUDIO: u64 = 2;
/// Track type: Complex (combined video and audio).
pub const TRACK_TYPE_COMPLEX: u64 = 3;
/// Track type: Logo.
pub const TRACK_TYPE_LOGO: u64 = 16;
/// Track type: Subtitle.
pub const TRACK_TYPE_SUBTITLE: u64 = 17;
/// Track type: Buttons.
pub const TRACK_TYPE_BUTTONS: u64 = 18;
/// Track type: Control.
pub const TRACK_TYPE_CONTROL: u64 = 32;
/// Track type: Metadata.
pub const TRACK_TYPE_METADATA: u64 = 33;

/// Default Timestamp Scale: one tick is one millisecond.
pub const DEFAULT_TIMESTAMP_SCALE: u64 = 1_000_000;

/// Matroska codec ID definitions.
pub mod codec_ids {
    /// VP8 video codec.
    pub const V_VP8: &str = "V_VP8";
    /// VP9 video codec.
    pub const V_VP9: &str = "V_VP9";
    /// AV1 video codec.
    pub const V_AV1: &str = "V_AV1";
    /// H.264/AVC video codec.
    pub const V_MPEG4_ISO_AVC: &str = "V_MPEG4/ISO/AVC";
    /// H.265/HEVC video codec.
    pub const V_MPEGH_ISO_HEVC: &str = "V_MPEGH/ISO/HEVC";
    /// Motion JPEG.
    pub const V_MJPEG: &str = "V_MJPEG";
    /// PNG images.
    pub const V_PNG: &str = "V_PNG";
    /// Uncompressed video.
    pub const V_UNCOMPRESSED: &str = "V_UNCOMPRESSED";

    /// Opus audio codec.
    pub const A_OPUS: &str = "A_OPUS";
    /// AAC audio codec (generic).
    pub const A_AAC: &str = "A_AAC";
    /// PCM little-endian integer.
    pub const A_PCM_INT_LIT: &str = "A_PCM/INT/LIT";
    /// G.711 A-law (Kinesis Video producers).
    pub const A_MS_ACM: &str = "A_MS/ACM";

    /// UTF-8 text subtitles.
    pub const S_TEXT_UTF8: &str = "S_TEXT/UTF8";
}

const EBML_HEADER: &[u32] = &[EBML];
const DOC_TYPE_EXT: &[u32] = &[DOC_TYPE_EXTENSION];
const SEGMENT_CHILD: &[u32] = &[SEGMENT];
const SEEK_HEAD_CHILD: &[u32] = &[SEEK_HEAD];
const SEEK_CHILD: &[u32] = &[SEEK];
const INFO_CHILD: &[u32] = &[INFO];
const CLUSTER_CHILD: &[u32] = &[CLUSTER];
const SILENT_TRACKS_CHILD: &[u32] = &[SILENT_TRACKS];
const BLOCK_GROUP_CHILD: &[u32] = &[BLOCK_GROUP];
const BLOCK_ADDITIONS_CHILD: &[u32] = &[BLOCK_ADDITIONS];
const BLOCK_MORE_CHILD: &[u32] = &[BLOCK_MORE];
const TRACKS_CHILD: &[u32] = &[TRACKS];
const TRACK_ENTRY_CHILD: &[u32] = &[TRACK_ENTRY];
const VIDEO_CHILD: &[u32] = &[VIDEO];
const COLOUR_CHILD: &[u32] = &[COLOUR];
const AUDIO_CHILD: &[u32] = &[AUDIO];
const ENCODINGS_CHILD: &[u32] = &[CONTENT_ENCODINGS];
const ENCODING_CHILD: &[u32] = &[CONTENT_ENCODING];
const COMPRESSION_CHILD: &[u32] = &[CONTENT_COMPRESSION];
const ENCRYPTION_CHILD: &[u32] = &[CONTENT_ENCRYPTION];
const CUES_CHILD: &[u32] = &[CUES];
const CUE_POINT_CHILD: &[u32] = &[CUE_POINT];
const CUE_POSITIONS_CHILD: &[u32] = &[CUE_TRACK_POSITIONS];
const ATTACHMENTS_CHILD: &[u32] = &[ATTACHMENTS];
const ATTACHED_FILE_CHILD: &[u32] = &[ATTACHED_FILE];
const CHAPTERS_CHILD: &[u32] = &[CHAPTERS];
const EDITION_CHILD: &[u32] = &[EDITION_ENTRY];
const ATOM_PARENTS: &[u32] = &[EDITION_ENTRY, CHAPTER_ATOM];
const ATOM_CHILD: &[u32] = &[CHAPTER_ATOM];
const DISPLAY_CHILD: &[u32] = &[CHAPTER_DISPLAY];
const TAGS_CHILD: &[u32] = &[TAGS];
const TAG_CHILD: &[u32] = &[TAG];
const TARGETS_CHILD: &[u32] = &[TARGETS];
const SIMPLE_TAG_PARENTS: &[u32] = &[TAG, SIMPLE_TAG];
const SIMPLE_TAG_CHILD: &[u32] = &[SIMPLE_TAG];

/// Matroska element definitions.
pub const MATROSKA: &[ElementDef] = &[
    // EBML header
    ElementDef::top_level(EBML, "EBML", Master),
    ElementDef::within(EBML_VERSION, "EBMLVersion", UnsignedInt, EBML_HEADER),
    ElementDef::within(EBML_READ_VERSION, "EBMLReadVersion", UnsignedInt, EBML_HEADER),
    ElementDef::within(EBML_MAX_ID_LENGTH, "EBMLMaxIDLength", UnsignedInt, EBML_HEADER),
    ElementDef::within(EBML_MAX_SIZE_LENGTH, "EBMLMaxSizeLength", UnsignedInt, EBML_HEADER),
    ElementDef::within(DOC_TYPE, "DocType", String, EBML_HEADER),
    ElementDef::within(DOC_TYPE_VERSION, "DocTypeVersion", UnsignedInt, EBML_HEADER),
    ElementDef::within(DOC_TYPE_READ_VERSION, "DocTypeReadVersion", UnsignedInt, EBML_HEADER),
    ElementDef::within(DOC_TYPE_EXTENSION, "DocTypeExtension", Master, EBML_HEADER),
    ElementDef::within(DOC_TYPE_EXTENSION_NAME, "DocTypeExtensionName", String, DOC_TYPE_EXT),
    ElementDef::within(DOC_TYPE_EXTENSION_VERSION, "DocTypeExtensionVersion", UnsignedInt, DOC_TYPE_EXT),
    // Globals
    ElementDef::global(VOID, "Void", Binary),
    ElementDef::global(CRC32, "CRC-32", Binary),
    // Segment
    ElementDef::top_level(SEGMENT, "Segment", Master),
    ElementDef::within(SEEK_HEAD, "SeekHead", Master, SEGMENT_CHILD),
    ElementDef::within(SEEK, "Seek", Master, SEEK_HEAD_CHILD),
    ElementDef::within(SEEK_ID, "SeekID", Binary, SEEK_CHILD),
    ElementDef::within(SEEK_POSITION, "SeekPosition", UnsignedInt, SEEK_CHILD),
    // Info
    ElementDef::within(INFO, "Info", Master, SEGMENT_CHILD),
    ElementDef::within(SEGMENT_UID, "SegmentUUID", Binary, INFO_CHILD),
    ElementDef::within(SEGMENT_FILENAME, "SegmentFilename", Utf8, INFO_CHILD),
    ElementDef::within(PREV_UID, "PrevUUID", Binary, INFO_CHILD),
    ElementDef::within(PREV_FILENAME, "PrevFilename", Utf8, INFO_CHILD),
    ElementDef::within(NEXT_UID, "NextUUID", Binary, INFO_CHILD),
    ElementDef::within(NEXT_FILENAME, "NextFilename", Utf8, INFO_CHILD),
    ElementDef::within(SEGMENT_FAMILY, "SegmentFamily", Binary, INFO_CHILD),
    ElementDef::within(TIMESTAMP_SCALE, "TimestampScale", UnsignedInt, INFO_CHILD),
    ElementDef::within(DURATION, "Duration", Float, INFO_CHILD),
    ElementDef::within(DATE_UTC, "DateUTC", Date, INFO_CHILD),
    ElementDef::within(TITLE, "Title", Utf8, INFO_CHILD),
    ElementDef::within(MUXING_APP, "MuxingApp", Utf8, INFO_CHILD),
    ElementDef::within(WRITING_APP, "WritingApp", Utf8, INFO_CHILD),
    // Cluster
    ElementDef::within(CLUSTER, "Cluster", Master, SEGMENT_CHILD),
    ElementDef::within(TIMESTAMP, "Timestamp", UnsignedInt, CLUSTER_CHILD),
    ElementDef::within(SILENT_TRACKS, "SilentTracks", Master, CLUSTER_CHILD),
    ElementDef::within(SILENT_TRACK_NUMBER, "SilentTrackNumber", UnsignedInt, SILENT_TRACKS_CHILD),
    ElementDef::within(POSITION, "Position", UnsignedInt, CLUSTER_CHILD),
    ElementDef::within(PREV_SIZE, "PrevSize", UnsignedInt, CLUSTER_CHILD),
    ElementDef::within(SIMPLE_BLOCK, "SimpleBlock", Binary, CLUSTER_CHILD),
    ElementDef::within(BLOCK_GROUP, "BlockGroup", Master, CLUSTER_CHILD),
    ElementDef::within(ENCRYPTED_BLOCK, "EncryptedBlock", Binary, CLUSTER_CHILD),
    ElementDef::within(BLOCK, "Block", Binary, BLOCK_GROUP_CHILD),
    ElementDef::within(BLOCK_VIRTUAL, "BlockVirtual", Binary, BLOCK_GROUP_CHILD),
    ElementDef::within(BLOCK_ADDITIONS, "BlockAdditions", Master, BLOCK_GROUP_CHILD),
    ElementDef::within(BLOCK_MORE, "BlockMore", Master, BLOCK_ADDITIONS_CHILD),
    ElementDef::within(BLOCK_ADD_ID, "BlockAddID", UnsignedInt, BLOCK_MORE_CHILD),
    ElementDef::within(BLOCK_ADDITIONAL, "BlockAdditional", Binary, BLOCK_MORE_CHILD),
    ElementDef::within(BLOCK_DURATION, "BlockDuration", UnsignedInt, BLOCK_GROUP_CHILD),
    ElementDef::within(REFERENCE_PRIORITY, "ReferencePriority", UnsignedInt, BLOCK_GROUP_CHILD),
    ElementDef::within(REFERENCE_BLOCK, "ReferenceBlock", SignedInt, BLOCK_GROUP_CHILD),
    ElementDef::within(CODEC_STATE, "CodecState", Binary, BLOCK_GROUP_CHILD),
    ElementDef::within(DISCARD_PADDING, "DiscardPadding", SignedInt, BLOCK_GROUP_CHILD),
    // Tracks
    ElementDef::within(TRACKS, "Tracks", Master, SEGMENT_CHILD),
    ElementDef::within(TRACK_ENTRY, "TrackEntry", Master, TRACKS_CHILD),
    ElementDef::within(TRACK_NUMBER, "TrackNumber", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(TRACK_UID, "TrackUID", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(TRACK_TYPE, "TrackType", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(FLAG_ENABLED, "FlagEnabled", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(FLAG_DEFAULT, "FlagDefault", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(FLAG_FORCED, "FlagForced", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(FLAG_LACING, "FlagLacing", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(MIN_CACHE, "MinCache", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(MAX_CACHE, "MaxCache", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(DEFAULT_DURATION, "DefaultDuration", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(DEFAULT_DECODED_FIELD_DURATION, "DefaultDecodedFieldDuration", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(TRACK_TIMESTAMP_SCALE, "TrackTimestampScale", Float, TRACK_ENTRY_CHILD),
    ElementDef::within(MAX_BLOCK_ADDITION_ID, "MaxBlockAdditionID", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(NAME, "Name", Utf8, TRACK_ENTRY_CHILD),
    ElementDef::within(LANGUAGE, "Language", String, TRACK_ENTRY_CHILD),
    ElementDef::within(LANGUAGE_BCP47, "LanguageBCP47", String, TRACK_ENTRY_CHILD),
    ElementDef::within(CODEC_ID, "CodecID", String, TRACK_ENTRY_CHILD),
    ElementDef::within(CODEC_PRIVATE, "CodecPrivate", Binary, TRACK_ENTRY_CHILD),
    ElementDef::within(CODEC_NAME, "CodecName", Utf8, TRACK_ENTRY_CHILD),
    ElementDef::within(ATTACHMENT_LINK, "AttachmentLink", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(CODEC_DECODE_ALL, "CodecDecodeAll", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(TRACK_OVERLAY, "TrackOverlay", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(CODEC_DELAY, "CodecDelay", UnsignedInt, TRACK_ENTRY_CHILD),
    ElementDef::within(SEEK_PRE_ROLL, "SeekPreRoll", UnsignedInt, TRACK_ENTRY_CHILD),
    // Video
    ElementDef::within(VIDEO, "Video", Master, TRACK_ENTRY_CHILD),
    ElementDef::within(FLAG_INTERLACED, "FlagInterlaced", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(FIELD_ORDER, "FieldOrder", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(STEREO_MODE, "StereoMode", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(ALPHA_MODE, "AlphaMode", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(PIXEL_WIDTH, "PixelWidth", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(PIXEL_HEIGHT, "PixelHeight", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(PIXEL_CROP_BOTTOM, "PixelCropBottom", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(PIXEL_CROP_TOP, "PixelCropTop", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(PIXEL_CROP_LEFT, "PixelCropLeft", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(PIXEL_CROP_RIGHT, "PixelCropRight", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(DISPLAY_WIDTH, "DisplayWidth", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(DISPLAY_HEIGHT, "DisplayHeight", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(DISPLAY_UNIT, "DisplayUnit", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(ASPECT_RATIO_TYPE, "AspectRatioType", UnsignedInt, VIDEO_CHILD),
    ElementDef::within(COLOUR_SPACE, "ColourSpace", Binary, VIDEO_CHILD),
    ElementDef::within(COLOUR, "Colour", Master, VIDEO_CHILD),
    ElementDef::within(MATRIX_COEFFICIENTS, "MatrixCoefficients", UnsignedInt, COLOUR_CHILD),
    ElementDef::within(BITS_PER_CHANNEL, "BitsPerChannel", UnsignedInt, COLOUR_CHILD),
    ElementDef::within(RANGE, "Range", UnsignedInt, COLOUR_CHILD),
    ElementDef::within(TRANSFER_CHARACTERISTICS, "TransferCharacteristics", UnsignedInt, COLOUR_CHILD),
    ElementDef::within(PRIMARIES, "Primaries", UnsignedInt, COLOUR_CHILD),
    // Audio
    ElementDef::within(AUDIO, "Audio", Master, TRACK_ENTRY_CHILD),
    ElementDef::within(SAMPLING_FREQUENCY, "SamplingFrequency", Float, AUDIO_CHILD),
    ElementDef::within(OUTPUT_SAMPLING_FREQUENCY, "OutputSamplingFrequency", Float, AUDIO_CHILD),
    ElementDef::within(CHANNELS, "Channels", UnsignedInt, AUDIO_CHILD),
    ElementDef::within(BIT_DEPTH, "BitDepth", UnsignedInt, AUDIO_CHILD),
    // Content encodings
    ElementDef::within(CONTENT_ENCODINGS, "ContentEncodings", Master, TRACK_ENTRY_CHILD),
    ElementDef::within(CONTENT_ENCODING, "ContentEncoding", Master, ENCODINGS_CHILD),
    ElementDef::within(CONTENT_ENCODING_ORDER, "ContentEncodingOrder", UnsignedInt, ENCODING_CHILD),
    ElementDef::within(CONTENT_ENCODING_SCOPE, "ContentEncodingScope", UnsignedInt, ENCODING_CHILD),
    ElementDef::within(CONTENT_ENCODING_TYPE, "ContentEncodingType", UnsignedInt, ENCODING_CHILD),
    ElementDef::within(CONTENT_COMPRESSION, "ContentCompression", Master, ENCODING_CHILD),
    ElementDef::within(CONTENT_COMP_ALGO, "ContentCompAlgo", UnsignedInt, COMPRESSION_CHILD),
    ElementDef::within(CONTENT_COMP_SETTINGS, "ContentCompSettings", Binary, COMPRESSION_CHILD),
    ElementDef::within(CONTENT_ENCRYPTION, "ContentEncryption", Master, ENCODING_CHILD),
    ElementDef::within(CONTENT_ENC_ALGO, "ContentEncAlgo", UnsignedInt, ENCRYPTION_CHILD),
    ElementDef::within(CONTENT_ENC_KEY_ID, "ContentEncKeyID", Binary, ENCRYPTION_CHILD),
    // Cues
    ElementDef::within(CUES, "Cues", Master, SEGMENT_CHILD),
    ElementDef::within(CUE_POINT, "CuePoint", Master, CUES_CHILD),
    ElementDef::within(CUE_TIME, "CueTime", UnsignedInt, CUE_POINT_CHILD),
    ElementDef::within(CUE_TRACK_POSITIONS, "CueTrackPositions", Master, CUE_POINT_CHILD),
    ElementDef::within(CUE_TRACK, "CueTrack", UnsignedInt, CUE_POSITIONS_CHILD),
    ElementDef::within(CUE_CLUSTER_POSITION, "CueClusterPosition", UnsignedInt, CUE_POSITIONS_CHILD),
    ElementDef::within(CUE_RELATIVE_POSITION, "CueRelativePosition", UnsignedInt, CUE_POSITIONS_CHILD),
    ElementDef::within(CUE_DURATION, "CueDuration", UnsignedInt, CUE_POSITIONS_CHILD),
    ElementDef::within(CUE_BLOCK_NUMBER, "CueBlockNumber", UnsignedInt, CUE_POSITIONS_CHILD),
    // Attachments
    ElementDef::within(ATTACHMENTS, "Attachments", Master, SEGMENT_CHILD),
    ElementDef::within(ATTACHED_FILE, "AttachedFile", Master, ATTACHMENTS_CHILD),
    ElementDef::within(FILE_DESCRIPTION, "FileDescription", Utf8, ATTACHED_FILE_CHILD),
    ElementDef::within(FILE_NAME, "FileName", Utf8, ATTACHED_FILE_CHILD),
    ElementDef::within(FILE_MEDIA_TYPE, "FileMediaType", String, ATTACHED_FILE_CHILD),
    ElementDef::within(FILE_DATA, "FileData", Binary, ATTACHED_FILE_CHILD),
    ElementDef::within(FILE_UID, "FileUID", UnsignedInt, ATTACHED_FILE_CHILD),
    // Chapters
    ElementDef::within(CHAPTERS, "Chapters", Master, SEGMENT_CHILD),
    ElementDef::within(EDITION_ENTRY, "EditionEntry", Master, CHAPTERS_CHILD),
    ElementDef::within(EDITION_UID, "EditionUID", UnsignedInt, EDITION_CHILD),
    ElementDef::within(EDITION_FLAG_HIDDEN, "EditionFlagHidden", UnsignedInt, EDITION_CHILD),
    ElementDef::within(EDITION_FLAG_DEFAULT, "EditionFlagDefault", UnsignedInt, EDITION_CHILD),
    ElementDef::within(EDITION_FLAG_ORDERED, "EditionFlagOrdered", UnsignedInt, EDITION_CHILD),
    ElementDef::within(CHAPTER_ATOM, "ChapterAtom", Master, ATOM_PARENTS),
    ElementDef::within(CHAPTER_UID, "ChapterUID", UnsignedInt, ATOM_CHILD),
    ElementDef::within(CHAPTER_STRING_UID, "ChapterStringUID", Utf8, ATOM_CHILD),
    ElementDef::within(CHAPTER_TIME_START, "ChapterTimeStart", UnsignedInt, ATOM_CHILD),
    ElementDef::within(CHAPTER_TIME_END, "ChapterTimeEnd", UnsignedInt, ATOM_CHILD),
    ElementDef::within(CHAPTER_FLAG_HIDDEN, "ChapterFlagHidden", UnsignedInt, ATOM_CHILD),
    ElementDef::within(CHAPTER_FLAG_ENABLED, "ChapterFlagEnabled", UnsignedInt, ATOM_CHILD),
    ElementDef::within(CHAPTER_SEGMENT_UID, "ChapterSegmentUUID", Binary, ATOM_CHILD),
    ElementDef::within(CHAPTER_DISPLAY, "ChapterDisplay", Master, ATOM_CHILD),
    ElementDef::within(CHAP_STRING, "ChapString", Utf8, DISPLAY_CHILD),
    ElementDef::within(CHAP_LANGUAGE, "ChapLanguage", String, DISPLAY_CHILD),
    ElementDef::within(CHAP_COUNTRY, "ChapCountry", String, DISPLAY_CHILD),
    // Tags
    ElementDef::within(TAGS, "Tags", Master, SEGMENT_CHILD),
    ElementDef::within(TAG, "Tag", Master, TAGS_CHILD),
    ElementDef::within(TARGETS, "Targets", Master, TAG_CHILD),
    ElementDef::within(TARGET_TYPE_VALUE, "TargetTypeValue", UnsignedInt, TARGETS_CHILD),
    ElementDef::within(TARGET_TYPE, "TargetType", String, TARGETS_CHILD),
    ElementDef::within(TAG_TRACK_UID, "TagTrackUID", UnsignedInt, TARGETS_CHILD),
    ElementDef::within(TAG_EDITION_UID, "TagEditionUID", UnsignedInt, TARGETS_CHILD),
    ElementDef::within(TAG_CHAPTER_UID, "TagChapterUID", UnsignedInt, TARGETS_CHILD),
    ElementDef::within(TAG_ATTACHMENT_UID, "TagAttachmentUID", UnsignedInt, TARGETS_CHILD),
    ElementDef::within(SIMPLE_TAG, "SimpleTag", Master, SIMPLE_TAG_PARENTS),
    ElementDef::within(TAG_NAME, "TagName", Utf8, SIMPLE_TAG_CHILD),
    ElementDef::within(TAG_LANGUAGE, "TagLanguage", String, SIMPLE_TAG_CHILD),
    ElementDef::within(TAG_LANGUAGE_BCP47, "TagLanguageBCP47", String, SIMPLE_TAG_CHILD),
    ElementDef::within(TAG_DEFAULT, "TagDefault", UnsignedInt, SIMPLE_TAG_CHILD),
    ElementDef::within(TAG_STRING, "TagString", Utf8, SIMPLE_TAG_CHILD),
    ElementDef::within(TAG_BINARY, "TagBinary", Binary, SIMPLE_TAG_CHILD),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_element_ids() {
        // Verify some well-known element IDs
        assert_eq!(EBML, 0x1A45DFA3);
        assert_eq!(SEGMENT, 0x18538067);
        assert_eq!(CLUSTER, 0x1F43B675);
        assert_eq!(TRACKS, 0x1654AE6B);
        assert_eq!(CUES, 0x1C53BB6B);
    }

    #[test]
    fn test_table_has_unique_ids() {
        let mut seen = HashSet::new();
        for def in MATROSKA {
            assert!(seen.insert(def.id), "duplicate ID 0x{:X}", def.id);
        }
    }

    #[test]
    fn test_table_parents_are_masters() {
        let masters: HashSet<u32> = MATROSKA
            .iter()
            .filter(|d| d.kind.is_master())
            .map(|d| d.id)
            .collect();
        for def in MATROSKA {
            for parent in def.placement.parents() {
                assert!(masters.contains(parent), "0x{:X} has non-master parent", def.id);
            }
        }
    }
}
