//! Frequency tables, prefix-code tables and the table-based container shared by
//! the Huffman and Shannon–Fano codecs.
//!
//! # Container layout
//!
//! All integers are big-endian.
//!
//! | field          | size                         |
//! |----------------|------------------------------|
//! | symbol count   | `u16` (0–256)                |
//! | decoded length | `u64`, symbols in the input  |
//! | table entries  | per symbol, ascending order  |
//! | payload        | codes in input order, MSB-first, zero padded |
//!
//! Each table entry is the symbol byte, the code length in bits as a `u8`
//! (1–255) and the code bits padded to whole bytes. The decoder stops after
//! exactly `decoded length` symbols, so the pad bits at the end of the payload
//! are never mistaken for codes.

use crate::cs::compression::bits::{BitReader, BitWriter};
use crate::error::{Error, Result};
use bitvec::prelude::*;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Longest code the container can describe.
pub const MAX_CODE_LENGTH: usize = u8::MAX as usize;

/// Bytes of the fixed container header.
pub const HEADER_LEN: usize = 2 + 8;

/// Occurrence counts of every byte, plus the order symbols were first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    first_seen: Vec<u8>,
}

impl FrequencyTable {
    /// Counts every byte of `input`.
    pub fn from_bytes(input: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        let mut first_seen = Vec::new();
        for &byte in input {
            if counts[byte as usize] == 0 {
                first_seen.push(byte);
            }
            counts[byte as usize] += 1;
        }
        Self { counts, first_seen }
    }

    /// Occurrences of `symbol`.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Distinct symbols in first-seen order.
    pub fn symbols(&self) -> &[u8] {
        &self.first_seen
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    /// Whether the table was built from empty input.
    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Mapping from symbol to its variable-length bit code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, BitVec<u8, Msb0>>,
}

impl CodeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `code` to `symbol`, replacing any previous code.
    pub fn insert(&mut self, symbol: u8, code: BitVec<u8, Msb0>) {
        self.codes.insert(symbol, code);
    }

    /// The code assigned to `symbol`.
    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(&symbol).map(|code| code.as_bitslice())
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the table has no symbols.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> {
        self.codes
            .iter()
            .map(|(&symbol, code)| (symbol, code.as_bitslice()))
    }

    /// Checks that no code is empty and no code is a prefix of another.
    ///
    /// Sorting the codes lexicographically puts any prefix directly before a
    /// code it prefixes, so comparing neighbours is enough.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&BitSlice<u8, Msb0>> =
            self.codes.values().map(|c| c.as_bitslice()).collect();
        if codes.iter().any(|code| code.is_empty()) {
            return false;
        }
        codes.sort();
        codes.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }

    /// Payload size in bits when encoding input with the given frequencies.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(symbol, code)| frequencies.count(symbol) * code.len() as u64)
            .sum()
    }
}

/// Serializes `input` with `table` into the shared container.
///
/// Every byte of `input` must have a code in `table`.
pub fn write_container(input: &[u8], table: &CodeTable) -> Result<Vec<u8>> {
    let mut writer = BitWriter::with_capacity(HEADER_LEN * 8);
    // At most 256 distinct bytes, always fits in u16.
    writer.push_bits(table.len() as u64, 16);
    writer.push_bits(input.len() as u64, 64);

    for (symbol, code) in table.iter() {
        if code.is_empty() || code.len() > MAX_CODE_LENGTH {
            return Err(Error::InputTooLarge {
                length: code.len(),
                max_length: MAX_CODE_LENGTH,
            });
        }
        writer.push_byte(symbol);
        writer.push_byte(code.len() as u8);
        writer.push_slice(code);
        let pad = (8 - code.len() % 8) % 8;
        writer.push_bits(0, pad);
    }

    let table_bits = writer.len();
    for &byte in input {
        let code = table
            .get(byte)
            .ok_or_else(|| Error::config(format!("no code for symbol 0x{byte:02x}")))?;
        writer.push_slice(code);
    }

    debug!(
        "prefix container: {} symbols, {} table bits, {} payload bits",
        table.len(),
        table_bits,
        writer.len() - table_bits
    );
    Ok(writer.into_bytes())
}

/// Reads the code table from a container without decoding the payload.
pub fn read_table(container: &[u8]) -> Result<CodeTable> {
    let mut reader = BitReader::new(container);
    let (table, _) = read_header_and_table(&mut reader)?;
    Ok(table)
}

/// Decodes a container produced by [`write_container`].
pub fn read_container(container: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(container);
    let (table, decoded_len) = read_header_and_table(&mut reader)?;

    if table.is_empty() {
        if decoded_len != 0 {
            return Err(Error::decode(format!(
                "empty code table but {decoded_len} symbols declared"
            )));
        }
        return Ok(Vec::new());
    }

    let lookup: HashMap<&BitSlice<u8, Msb0>, u8> =
        table.iter().map(|(symbol, code)| (code, symbol)).collect();
    let max_len = table.iter().map(|(_, code)| code.len()).max().unwrap_or(0);

    // Each symbol costs at least one payload bit.
    if decoded_len > reader.remaining() as u64 {
        return Err(Error::decode(format!(
            "{decoded_len} symbols declared but only {} payload bits present",
            reader.remaining()
        )));
    }

    let mut output = Vec::with_capacity(decoded_len as usize);
    let mut current: BitVec<u8, Msb0> = BitVec::with_capacity(max_len);
    while (output.len() as u64) < decoded_len {
        let start = reader.position();
        current.clear();
        loop {
            if current.len() == max_len {
                return Err(Error::decode_at("bit sequence matches no code", start));
            }
            current.push(reader.read_bit()?);
            if let Some(&symbol) = lookup.get(current.as_bitslice()) {
                output.push(symbol);
                break;
            }
        }
    }
    Ok(output)
}

fn read_header_and_table(reader: &mut BitReader<'_>) -> Result<(CodeTable, u64)> {
    let symbol_count = reader.read_bits(16)? as usize;
    if symbol_count > 256 {
        return Err(Error::decode(format!(
            "symbol count {symbol_count} exceeds 256"
        )));
    }
    let decoded_len = reader.read_bits(64)?;

    let mut table = CodeTable::new();
    for _ in 0..symbol_count {
        let symbol = reader.read_byte()?;
        let len = reader.read_byte()? as usize;
        if len == 0 {
            return Err(Error::decode(format!(
                "zero-length code for symbol 0x{symbol:02x}"
            )));
        }
        let code = reader.read_slice(len)?.to_bitvec();
        reader.align_to_byte();
        if table.get(symbol).is_some() {
            return Err(Error::decode(format!(
                "duplicate table entry for symbol 0x{symbol:02x}"
            )));
        }
        table.insert(symbol, code);
    }

    if !table.is_prefix_free() {
        return Err(Error::decode("code table is not prefix-free"));
    }
    Ok((table, decoded_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(bits: &str) -> BitVec<u8, Msb0> {
        bits.chars().map(|c| c == '1').collect()
    }

    fn sample_table() -> CodeTable {
        let mut table = CodeTable::new();
        table.insert(b'a', code("0"));
        table.insert(b'b', code("10"));
        table.insert(b'c', code("11"));
        table
    }

    #[test]
    fn test_frequency_table_first_seen_order() {
        let freq = FrequencyTable::from_bytes(b"banana");
        assert_eq!(freq.symbols(), b"ban");
        assert_eq!(freq.count(b'a'), 3);
        assert_eq!(freq.count(b'n'), 2);
        assert_eq!(freq.count(b'z'), 0);
        assert_eq!(freq.total(), 6);
        assert_eq!(freq.len(), 3);
    }

    #[test]
    fn test_prefix_free_detection() {
        assert!(sample_table().is_prefix_free());

        let mut table = sample_table();
        table.insert(b'd', code("1"));
        assert!(!table.is_prefix_free());

        let mut table = CodeTable::new();
        table.insert(b'x', BitVec::new());
        assert!(!table.is_prefix_free());
    }

    #[test]
    fn test_container_layout() {
        let container = write_container(b"abca", &sample_table()).unwrap();
        let expected: Vec<u8> = vec![
            0x00, 0x03, // symbol count
            0, 0, 0, 0, 0, 0, 0, 4, // decoded length
            b'a', 1, 0b0000_0000, //
            b'b', 2, 0b1000_0000, //
            b'c', 2, 0b1100_0000, //
            0b0101_1000, // a b c a, zero padded
        ];
        assert_eq!(container, expected);
        assert_eq!(read_container(&container).unwrap(), b"abca");
        assert_eq!(read_table(&container).unwrap(), sample_table());
    }

    #[test]
    fn test_empty_container() {
        let container = write_container(b"", &CodeTable::new()).unwrap();
        assert_eq!(container.len(), HEADER_LEN);
        assert!(container.iter().all(|&b| b == 0));
        assert!(read_container(&container).unwrap().is_empty());
    }

    #[test]
    fn test_missing_code_is_rejected() {
        assert!(matches!(
            write_container(b"abz", &sample_table()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(read_container(&[0x00]), Err(Error::Decode(_))));
        assert!(matches!(
            read_container(&[0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 1, b'a']),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut container = write_container(b"abcabcabc", &sample_table()).unwrap();
        container.pop();
        container.pop();
        assert!(matches!(read_container(&container), Err(Error::Decode(_))));
    }

    #[test]
    fn test_rejects_corrupt_tables() {
        // Zero-length code.
        let container = [0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 1, b'a', 0, 0x00];
        assert!(matches!(read_container(&container), Err(Error::Decode(_))));

        // Symbol count above 256.
        let container = [0x01, 0x01, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(read_container(&container), Err(Error::Decode(_))));

        // Duplicate symbol.
        let container = [
            0x00, 0x02, 0, 0, 0, 0, 0, 0, 0, 1, b'a', 1, 0x00, b'a', 1, 0x80, 0x00,
        ];
        assert!(matches!(read_container(&container), Err(Error::Decode(_))));

        // 'b' = 1 is a prefix of 'c' = 10.
        let container = [
            0x00, 0x02, 0, 0, 0, 0, 0, 0, 0, 1, b'b', 1, 0x80, b'c', 2, 0x80, 0x00,
        ];
        assert!(matches!(read_container(&container), Err(Error::Decode(_))));

        // Empty table with symbols declared.
        let container = [0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 5];
        assert!(matches!(read_container(&container), Err(Error::Decode(_))));
    }

    #[test]
    fn test_unmatched_bits_are_rejected() {
        // Only code is "00"; payload "01" matches nothing.
        let container = [0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 1, b'a', 2, 0x00, 0b0100_0000];
        assert!(matches!(read_container(&container), Err(Error::Decode(_))));
    }

    #[test]
    fn test_encoded_bits() {
        let freq = FrequencyTable::from_bytes(b"aaabbc");
        assert_eq!(sample_table().encoded_bits(&freq), 3 + 2 * 2 + 2);
    }
}
