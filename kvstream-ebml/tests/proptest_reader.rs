//! Property-based tests for VINT decoding and the resumable reader.

use kvstream_ebml::ebml::{self, encode_element, encode_unknown_size_element};
use kvstream_ebml::elements::*;
use kvstream_ebml::{Document, ElementReader, ReadEvent, Schema, Step};
use proptest::prelude::*;

fn all_events(data: &[u8]) -> Vec<ReadEvent> {
    let mut reader = ElementReader::new(Schema::matroska_shared());
    let mut out = Vec::new();
    while let Ok(Step::Event(event)) = reader.next_event(data, true) {
        out.push(event);
    }
    out
}

/// Events when the input grows `step` bytes at a time.
fn incremental_events(data: &[u8], step: usize) -> Vec<ReadEvent> {
    let mut reader = ElementReader::new(Schema::matroska_shared());
    let mut out = Vec::new();
    let mut visible = 0;
    loop {
        let eos = visible >= data.len();
        match reader.next_event(&data[..visible], eos) {
            Ok(Step::Event(event)) => out.push(event),
            Ok(Step::NeedMore) => visible = (visible + step).min(data.len()),
            Ok(Step::Finished) | Err(_) => return out,
        }
    }
}

fn fragment(blocks: &[Vec<u8>], unknown_size: bool) -> Vec<u8> {
    let mut cluster = encode_element(TIMESTAMP, &[0x01]);
    for payload in blocks {
        let mut block = vec![0x81, 0x00, 0x00, 0x80];
        block.extend_from_slice(payload);
        cluster.extend_from_slice(&encode_element(SIMPLE_BLOCK, &block));
    }
    let cluster = if unknown_size {
        encode_unknown_size_element(CLUSTER, &cluster)
    } else {
        encode_element(CLUSTER, &cluster)
    };
    let mut data = encode_element(EBML, &encode_element(DOC_TYPE, b"matroska"));
    data.extend_from_slice(&encode_unknown_size_element(SEGMENT, &cluster));
    data
}

proptest! {
    /// Any value encoded at any wide-enough width decodes back.
    #[test]
    fn vint_any_width(value in 0u64..(1 << 48), extra in 0usize..3) {
        let width = (ebml::vint_length(value) + extra).min(8);
        let (bytes, len) = ebml::encode_vint_with_length(value, width).unwrap();
        let (decoded, decoded_len) = ebml::read_vint(&bytes[..len], 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(decoded_len, width);
    }

    /// Feeding the reader in small steps yields the same events as one pass.
    #[test]
    fn incremental_matches_whole(
        blocks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..6),
        unknown_size in any::<bool>(),
        step in 1usize..17,
    ) {
        let data = fragment(&blocks, unknown_size);
        prop_assert_eq!(incremental_events(&data, step), all_events(&data));
    }

    /// Arbitrary input never panics the tree builder.
    #[test]
    fn arbitrary_bytes_do_not_panic(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Document::parse_matroska(data);
    }
}
