#![no_main]

//! Fuzz target for EBML header decoding and the resumable element reader.
//!
//! Feeds arbitrary input to the VINT, ID and header decoders and walks the
//! reader over it, both in one piece and as a growing prefix.

use arbitrary::Arbitrary;
use kvstream_ebml::ebml::{self, ElementHeader};
use kvstream_ebml::{Document, ElementReader, Schema, Step};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct EbmlInput {
    data: Vec<u8>,
    operation: EbmlOperation,
}

#[derive(Arbitrary, Debug)]
enum EbmlOperation {
    /// Parse a variable-length integer (VINT)
    ReadVint,
    /// Parse an element ID
    ReadElementId,
    /// Parse an element size
    ReadElementSize,
    /// Parse a full element header (ID + size)
    ReadElementHeader,
    /// Round-trip encode/decode VINT
    VintRoundtrip { value: u64 },
    /// Round-trip element header
    ElementHeaderRoundtrip { id: u32, size: u64 },
    /// Walk the reader over the whole input
    ReadEvents,
    /// Walk the reader while the input grows `step` bytes at a time
    ReadIncremental { step: u8 },
    /// Build a full document tree
    BuildDocument,
}

fuzz_target!(|input: EbmlInput| {
    // Limit input size to prevent excessive memory allocation
    if input.data.len() > 64 * 1024 {
        return;
    }

    match input.operation {
        EbmlOperation::ReadVint => {
            let _ = ebml::read_vint(&input.data, 0);
        }

        EbmlOperation::ReadElementId => {
            let _ = ebml::read_element_id(&input.data, 0);
        }

        EbmlOperation::ReadElementSize => {
            let _ = ebml::read_element_size(&input.data, 0);
        }

        EbmlOperation::ReadElementHeader => {
            if let Ok(header) = ElementHeader::read(&input.data, 0) {
                assert!(header.header_size <= input.data.len());
            }
        }

        EbmlOperation::VintRoundtrip { value } => {
            // Largest value an 8-byte VINT carries without hitting the unknown-size marker
            let value = value % ((1u64 << 56) - 1);

            let (encoded, len) = ebml::encode_vint(value).expect("value fits in 8 bytes");
            let (decoded, read) = ebml::read_vint(&encoded[..len], 0).expect("encoded VINT decodes");
            assert_eq!(value, decoded, "VINT round-trip mismatch");
            assert_eq!(len, read);
        }

        EbmlOperation::ElementHeaderRoundtrip { id, size } => {
            // Force a 4-byte ID and a 40-bit size
            let id = (id & 0x0FFF_FFFF) | 0x1000_0000;
            let size = size & 0x00FF_FFFF_FFFF;

            let header = ElementHeader {
                id,
                size: Some(size),
                header_size: 0,
            };

            let mut buffer = Vec::new();
            if header.write(&mut buffer).is_ok() {
                if let Ok(parsed) = ElementHeader::read(&buffer, 0) {
                    assert_eq!(header.id, parsed.id, "Element ID mismatch");
                    assert_eq!(header.size, parsed.size, "Element size mismatch");
                    assert_eq!(buffer.len(), parsed.header_size);
                }
            }
        }

        EbmlOperation::ReadEvents => {
            let mut reader = ElementReader::new(Schema::matroska_shared());
            while let Ok(Step::Event(_)) = reader.next_event(&input.data, true) {}
        }

        EbmlOperation::ReadIncremental { step } => {
            let step = step.max(1) as usize;
            let mut reader = ElementReader::new(Schema::matroska_shared());
            let mut visible = 0;
            loop {
                let eos = visible >= input.data.len();
                match reader.next_event(&input.data[..visible], eos) {
                    Ok(Step::Event(_)) => {}
                    Ok(Step::NeedMore) if !eos => visible = (visible + step).min(input.data.len()),
                    _ => break,
                }
            }
        }

        EbmlOperation::BuildDocument => {
            if let Ok(document) = Document::parse_matroska(input.data.clone()) {
                let _ = document.pretty();
                assert!(document.walk().count() >= document.roots().len());
            }
        }
    }
});
