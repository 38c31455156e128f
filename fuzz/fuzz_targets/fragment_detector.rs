#![no_main]

//! Fuzz target for fragment detection and fragment post-processing.
//!
//! Splits arbitrary bytes into chunks, feeds them to the detector and runs
//! tag, track and frame extraction over every fragment it emits.

use arbitrary::Arbitrary;
use kvstream_consumer::{ConsumerConfig, Fragment, FragmentDetector};
use kvstream_processor::{extract_frames, extract_tags, extract_track_descriptors, FrameSelection, SampleRatio};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct StreamInput {
    data: Vec<u8>,
    chunk_sizes: Vec<u8>,
    one_in: u8,
}

fn process(fragment: &Fragment, selection: &FrameSelection) {
    let _ = extract_tags(fragment);
    let _ = extract_track_descriptors(fragment);
    if let Ok(frames) = extract_frames(fragment, selection) {
        for frame in frames {
            assert!(frame.payload.len() <= fragment.len());
        }
    }
}

fuzz_target!(|input: StreamInput| {
    if input.data.len() > 64 * 1024 {
        return;
    }

    let config = ConsumerConfig::new("fuzz").with_max_fragment_bytes(128 * 1024);
    let mut detector = FragmentDetector::new(&config);
    let ratio = SampleRatio::one_in(u32::from(input.one_in.max(1))).unwrap_or(SampleRatio::ALL);
    let selection = FrameSelection::all().with_sample_ratio(ratio);

    let mut emitted = 0usize;
    let mut rest = &input.data[..];
    let mut sizes = input.chunk_sizes.iter().cycle();
    while !rest.is_empty() {
        let size = sizes.next().map(|&s| s.max(1) as usize).unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(size.min(rest.len()));
        rest = tail;

        detector.feed(chunk);
        loop {
            match detector.poll_fragment() {
                Ok(Some(fragment)) => {
                    emitted += fragment.len();
                    process(&fragment, &selection);
                }
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }

    while let Ok(Some(fragment)) = detector.finish() {
        emitted += fragment.len();
        process(&fragment, &selection);
    }

    // Fragments are disjoint slices of the input
    assert!(emitted <= input.data.len());
});
