use std::collections::HashMap;

use log::debug;

use crate::cs::compression::bits::{BitReader, BitWriter};
use crate::cs::compression::{Compression, Result};
use crate::error::Error;

/// Smallest code width; it exactly covers the 256 seeded entries.
pub const MIN_CODE_WIDTH: u8 = 8;
/// Largest supported code width.
pub const MAX_CODE_WIDTH: u8 = 24;
pub const DEFAULT_CODE_WIDTH: u8 = 12;

/// Number of single-byte entries every dictionary starts with.
const SEED_ENTRIES: usize = 256;

/// LZW codec with fixed-width codes.
///
/// The dictionary grows by one entry per emitted code until it holds
/// `2^code_width` entries, after which it is frozen.
///
/// # Example
///
/// ```
/// use classic_codecs::cs::compression::lzw::Lzw;
///
/// let lzw = Lzw::new(12).unwrap();
/// let input = b"TOBEORNOTTOBEORTOBEORNOT";
/// let codes = lzw.encode(input);
/// assert!(codes.len() < input.len());
/// assert_eq!(lzw.decode(&codes).unwrap(), input);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lzw {
    code_width: u8,
}

impl Default for Lzw {
    fn default() -> Self {
        Self {
            code_width: DEFAULT_CODE_WIDTH,
        }
    }
}

impl Lzw {
    /// Creates a codec emitting `code_width`-bit codes.
    pub fn new(code_width: u8) -> Result<Self> {
        if !(MIN_CODE_WIDTH..=MAX_CODE_WIDTH).contains(&code_width) {
            return Err(Error::config(format!(
                "code width {code_width} must be in {MIN_CODE_WIDTH}..={MAX_CODE_WIDTH}"
            )));
        }
        Ok(Self { code_width })
    }

    pub fn code_width(&self) -> u8 {
        self.code_width
    }

    /// Upper bound on the dictionary size.
    pub fn max_entries(&self) -> usize {
        1 << self.code_width
    }

    /// Compresses `input` into a sequence of dictionary codes.
    ///
    /// The dictionary maps `(prefix code, next byte)` to the code of the
    /// extended string, which is equivalent to keying on the whole string.
    pub fn encode(&self, input: &[u8]) -> Vec<u32> {
        let max_entries = self.max_entries();
        let mut dict: HashMap<(u32, u8), u32> = HashMap::new();
        let mut dict_len = SEED_ENTRIES;
        let mut codes = Vec::new();

        let mut current: Option<u32> = None;
        for &byte in input {
            let Some(prefix) = current else {
                current = Some(u32::from(byte));
                continue;
            };
            if let Some(&code) = dict.get(&(prefix, byte)) {
                current = Some(code);
                continue;
            }
            codes.push(prefix);
            if dict_len < max_entries {
                // dict_len < 2^24, always fits.
                dict.insert((prefix, byte), dict_len as u32);
                dict_len += 1;
            }
            current = Some(u32::from(byte));
        }
        if let Some(prefix) = current {
            codes.push(prefix);
        }

        debug!(
            "lzw: {} input bytes, {} codes, dictionary {}/{} entries",
            input.len(),
            codes.len(),
            dict_len,
            max_entries
        );
        codes
    }

    /// Rebuilds the input from a code sequence, regrowing the dictionary in
    /// lock-step with the encoder.
    pub fn decode(&self, codes: &[u32]) -> Result<Vec<u8>> {
        let max_entries = self.max_entries();
        let mut dict: Vec<Vec<u8>> = (0..=u8::MAX).map(|b| vec![b]).collect();
        let mut output = Vec::new();
        let mut previous: Option<Vec<u8>> = None;

        for (index, &code) in codes.iter().enumerate() {
            let code = code as usize;
            let entry = match (code < dict.len(), &previous) {
                (true, _) => dict[code].clone(),
                // The code the encoder created on the step that emitted `previous`.
                (false, Some(prev)) if code == dict.len() && dict.len() < max_entries => {
                    let mut entry = prev.clone();
                    entry.push(prev[0]);
                    entry
                }
                _ => {
                    return Err(Error::decode(format!(
                        "code {code} at position {index} is beyond dictionary size {}",
                        dict.len()
                    )));
                }
            };
            output.extend_from_slice(&entry);

            if let Some(mut prev) = previous.take() {
                if dict.len() < max_entries {
                    prev.push(entry[0]);
                    dict.push(prev);
                }
            }
            previous = Some(entry);
        }

        debug!(
            "lzw: {} codes, {} output bytes, dictionary {}/{} entries",
            codes.len(),
            output.len(),
            dict.len(),
            max_entries
        );
        Ok(output)
    }

    /// Packs codes at `code_width` bits each, MSB-first, zero padded.
    pub fn pack_codes(&self, codes: &[u32]) -> Result<Vec<u8>> {
        let width = self.code_width as usize;
        let mut writer = BitWriter::with_capacity(codes.len() * width);
        for &code in codes {
            if code as usize >= self.max_entries() {
                return Err(Error::InputTooLarge {
                    length: code as usize,
                    max_length: self.max_entries() - 1,
                });
            }
            writer.push_bits(u64::from(code), width);
        }
        Ok(writer.into_bytes())
    }

    /// Reads codes until fewer than `code_width` bits remain.
    pub fn unpack_codes(&self, packed: &[u8]) -> Result<Vec<u32>> {
        let width = self.code_width as usize;
        let mut reader = BitReader::new(packed);
        let mut codes = Vec::with_capacity(reader.remaining() / width);
        while reader.remaining() >= width {
            codes.push(reader.read_bits(width)? as u32);
        }
        Ok(codes)
    }
}

impl Compression for Lzw {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.pack_codes(&self.encode(data))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decode(&self.unpack_codes(data)?)
    }
}
