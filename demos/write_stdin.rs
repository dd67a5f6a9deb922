//! Writes stdin lines into a chunked data file plus its index.
//!
//! ```text
//! cargo run --example write_stdin -- block-gzip events ./out 0 1048576 < records.ndjson
//! ```
//!
//! Arguments: writer key, file name base, destination directory, first record
//! offset (default 0), chunk threshold in bytes (default 64MB).

use anyhow::{bail, Context};
use chunklog::{ChunkIndex, Options, WriterRegistry, DEFAULT_CHUNK_THRESHOLD};
use std::io::{self, BufRead};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("usage: write_stdin <writer> <base> <dir> [first_offset] [chunk_threshold]");
    }

    let first_offset: u64 = match args.get(3) {
        Some(s) => s.parse().context("invalid first_offset")?,
        None => 0,
    };
    let threshold: u64 = match args.get(4) {
        Some(s) => s.parse().context("invalid chunk_threshold")?,
        None => DEFAULT_CHUNK_THRESHOLD,
    };

    let registry = WriterRegistry::with_defaults();
    let options = Options::default()
        .chunk_threshold(threshold)
        .create_dir_if_missing(true);
    let mut writer = registry
        .create_with_options(&args[0], &args[1], &args[2], first_offset, &options)
        .with_context(|| format!("available writers: {:?}", registry.keys()))?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if let Err(e) = writer.write(&line) {
            writer.delete().context("failed to clean up after write error")?;
            return Err(e).context("failed to write record");
        }
    }
    writer.close()?;

    let index = ChunkIndex::read_from(writer.index_file_path())?;
    println!("Data:  {}", writer.data_file_path().display());
    println!("Index: {}", writer.index_file_path().display());
    println!(
        "{} records in {} chunks, {} bytes uncompressed -> {} bytes on disk",
        writer.num_records(),
        index.chunks.len(),
        writer.total_uncompressed_size(),
        index.total_bytes()
    );

    Ok(())
}
