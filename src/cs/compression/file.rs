//! Whole-file wrappers around the in-memory codecs.
//!
//! Files are read completely before a codec runs and the whole result is
//! written in one go. Paths are used as given; no directories are created.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;

use crate::cs::compression::stats::RoundTripReport;
use crate::cs::compression::{Compression, Result};

const COMPARE_CHUNK: usize = 8192;

/// Compresses `input` into `output`.
pub fn compress_file<C, P, Q>(codec: &C, input: P, output: Q) -> Result<RoundTripReport>
where
    C: Compression + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let data = fs::read(input.as_ref())?;
    let compressed = codec.compress(&data)?;
    fs::write(output.as_ref(), &compressed)?;

    let report = RoundTripReport::new(data.len(), compressed.len());
    info!(
        "compressed {} -> {}: {} -> {} bytes (ratio {:.2})",
        input.as_ref().display(),
        output.as_ref().display(),
        report.original_len,
        report.compressed_len,
        report.ratio
    );
    Ok(report)
}

/// Decompresses `input` into `output`.
pub fn decompress_file<C, P, Q>(codec: &C, input: P, output: Q) -> Result<RoundTripReport>
where
    C: Compression + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let compressed = fs::read(input.as_ref())?;
    let data = codec.decompress(&compressed)?;
    fs::write(output.as_ref(), &data)?;

    let report = RoundTripReport::new(data.len(), compressed.len());
    info!(
        "decompressed {} -> {}: {} -> {} bytes",
        input.as_ref().display(),
        output.as_ref().display(),
        report.compressed_len,
        report.original_len
    );
    Ok(report)
}

/// Compares two files chunk by chunk.
pub fn files_have_same_content<P, Q>(first: P, second: Q) -> Result<bool>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let first = File::open(first)?;
    let second = File::open(second)?;
    if first.metadata()?.len() != second.metadata()?.len() {
        return Ok(false);
    }

    let mut first = BufReader::new(first);
    let mut second = BufReader::new(second);
    let mut a = vec![0u8; COMPARE_CHUNK];
    let mut b = vec![0u8; COMPARE_CHUNK];
    loop {
        let read = read_full(&mut first, &mut a)?;
        if read_full(&mut second, &mut b[..read])? != read || a[..read] != b[..read] {
            return Ok(false);
        }
        if read < COMPARE_CHUNK {
            return Ok(true);
        }
    }
}

/// Fills `buf` unless the reader runs out first; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
