//! Stream consumer example.
//!
//! Reads a Matroska fragment stream (for example a saved GetMedia
//! response) from a file or stdin and reports each fragment as it
//! completes. With an output directory, every fragment is also saved as a
//! standalone `.mkv` and its decodable video frames are written as images.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example consume_stream -- media.mkv
//! cargo run --example consume_stream -- media.mkv out/ 5
//! cat media.mkv | RUST_LOG=kvstream_consumer=debug cargo run --example consume_stream -- -
//! ```
//!
//! The optional third argument keeps one frame in N.
//!
//! # Features Demonstrated
//!
//! - `StreamConsumer` over a `std::io::Read` source
//! - A custom `FragmentHandler`
//! - Kinesis tags, tracks and sampled frames via `FragmentProcessor`
//! - `tracing` output controlled by `RUST_LOG`

use kvstream::prelude::*;
use kvstream::ImageCrateDecoder;
use std::env;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Prints a summary line per fragment and optionally writes it out.
struct ReportingHandler {
    processor: FragmentProcessor,
    selection: FrameSelection,
    output_dir: Option<PathBuf>,
    fragments: u64,
    bytes: u64,
}

impl ReportingHandler {
    fn report(&mut self, fragment: &Fragment) -> Result<(), ProcessorError> {
        let tags = self.processor.kinesis_tags(fragment)?;
        let tracks = self.processor.tracks(fragment)?;
        let frames = self.processor.frames(fragment, &self.selection)?.count();

        println!(
            "#{:<4} {:>8} bytes  fragment={}  server={}  tracks={}  frames={}",
            fragment.fragment_number(),
            fragment.len(),
            tags.fragment_number.as_deref().unwrap_or("-"),
            tags.server_timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
            tracks.len(),
            frames,
        );
        if tags.has_error() {
            println!(
                "      service error {} ({})",
                tags.error_code.as_deref().unwrap_or("?"),
                tags.error_id.as_deref().unwrap_or("?"),
            );
        }

        if let Some(dir) = &self.output_dir {
            let name = format!("fragment-{:06}", fragment.fragment_number());
            self.processor
                .save_fragment(fragment, dir.join(format!("{}.mkv", name)))?;
            if tracks.iter().any(|t| ImageCrateDecoder::supports(&t.codec_id)) {
                let images = self
                    .processor
                    .materialize_images(fragment, &self.selection, dir.join(&name))?;
                println!("      wrote {} images to {}", images.len(), dir.join(&name).display());
            }
        }
        Ok(())
    }
}

impl FragmentHandler for ReportingHandler {
    fn on_fragment_arrived(&mut self, fragment: Fragment) {
        self.fragments += 1;
        self.bytes += fragment.len() as u64;
        if let Err(e) = self.report(&fragment) {
            tracing::warn!(fragment = fragment.fragment_number(), error = %e, "failed to process fragment");
        }
    }

    fn on_stream_read_complete(&mut self, stream_name: &str) {
        println!(
            "{}: {} fragments, {} bytes",
            stream_name, self.fragments, self.bytes
        );
    }

    fn on_stream_read_exception(&mut self, stream_name: &str, error: &ConsumerError) {
        eprintln!("{}: stopped after {} fragments: {}", stream_name, self.fragments, error);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.mkv | -> [output_dir] [keep_one_in]", args[0]);
        std::process::exit(1);
    }

    let input = &args[1];
    let output_dir = args.get(2).map(PathBuf::from);
    let keep_one_in = match args.get(3) {
        Some(n) => n.parse()?,
        None => 1,
    };

    let (stream_name, reader): (String, Box<dyn Read + Send>) = if input == "-" {
        ("stdin".to_string(), Box::new(io::stdin()))
    } else {
        (input.clone(), Box::new(File::open(input)?))
    };

    let config = ConsumerConfig::new(stream_name);
    let handler = ReportingHandler {
        processor: FragmentProcessor::new(),
        selection: FrameSelection::all().with_sample_ratio(SampleRatio::one_in(keep_one_in)?),
        output_dir,
        fragments: 0,
        bytes: 0,
    };

    let source = ReaderSource::new(reader, config.read_chunk_size);
    let handle = StreamConsumer::new(config, source, handler)?.spawn()?;

    match handle.join() {
        StreamOutcome::Failed(e) => Err(e.into()),
        _ => Ok(()),
    }
}
