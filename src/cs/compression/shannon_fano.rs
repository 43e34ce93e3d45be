//! Shannon–Fano coding.
//!
//! Symbols are sorted by descending frequency and the sorted range is split
//! recursively where the two halves' weights are closest; the upper half gets a
//! `0` appended, the lower half a `1`. Codes are generally a little longer than
//! Huffman's, but the construction needs no tree at all. The output uses the
//! same container as [`super::huffman`].

use bitvec::prelude::*;
use log::debug;

use crate::cs::compression::code_table::{self, CodeTable, FrequencyTable};
use crate::cs::compression::{Compression, Result};

/// Distinct symbols with their counts, most frequent first.
///
/// Equal counts keep first-seen order.
pub fn sorted_symbols(freq_table: &FrequencyTable) -> Vec<(u8, u64)> {
    let mut entries: Vec<(u8, u64)> = freq_table
        .symbols()
        .iter()
        .map(|&symbol| (symbol, freq_table.count(symbol)))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// Build the Shannon–Fano code table for a frequency table.
pub fn build_code_table(freq_table: &FrequencyTable) -> CodeTable {
    let entries = sorted_symbols(freq_table);
    let mut table = CodeTable::new();
    match entries.len() {
        0 => {}
        1 => table.insert(entries[0].0, bitvec![u8, Msb0; 0]),
        len => split(&entries, 0, len, BitVec::new(), &mut table),
    }
    table
}

fn split(
    entries: &[(u8, u64)],
    lo: usize,
    hi: usize,
    prefix: BitVec<u8, Msb0>,
    table: &mut CodeTable,
) {
    if hi - lo == 1 {
        table.insert(entries[lo].0, prefix);
        return;
    }

    let total: u64 = entries[lo..hi].iter().map(|&(_, count)| count).sum();
    let mut left = 0u64;
    let mut best = (u64::MAX, lo + 1);
    for k in lo + 1..hi {
        left += entries[k - 1].1;
        let diff = left.abs_diff(total - left);
        if diff < best.0 {
            best = (diff, k);
        }
    }
    let mid = best.1;

    let mut upper = prefix.clone();
    upper.push(false);
    split(entries, lo, mid, upper, table);
    let mut lower = prefix;
    lower.push(true);
    split(entries, mid, hi, lower, table);
}

/// Shannon–Fano coding with the table-based container.
///
/// # Example
///
/// ```
/// use classic_codecs::cs::compression::shannon_fano::ShannonFano;
/// use classic_codecs::cs::compression::Compression;
///
/// let data = b"peter piper picked a peck of pickled peppers";
/// let compressed = ShannonFano.compress(data).unwrap();
/// assert_eq!(ShannonFano.decompress(&compressed).unwrap(), data);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShannonFano;

impl Compression for ShannonFano {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let table = build_code_table(&FrequencyTable::from_bytes(data));
        debug!(
            "shannon-fano: {} input bytes, {} distinct symbols",
            data.len(),
            table.len()
        );
        code_table::write_container(data, &table)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        code_table::read_container(data)
    }
}
