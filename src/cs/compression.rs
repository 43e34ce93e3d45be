//! Compression algorithms implementation.
//!
//! This module provides implementations of classic lossless byte-stream codecs:
//! - Statistical coding with a prefix-code table (Huffman, Shannon–Fano)
//! - Sliding-window substitution coding (LZ77)
//! - Adaptive-dictionary coding (LZW)
//!
//! Every codec builds its model from the whole input, encodes the input against
//! it and serializes both into its own ad hoc container. Decoding reverses the
//! process from the container alone.
//!
//! # Examples
//!
//! ```rust
//! use classic_codecs::cs::compression::{Codec, Compression};
//!
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! for name in ["huffman", "shannon-fano", "lz77", "lzw"] {
//!     let codec: Codec = name.parse().unwrap();
//!     let compressed = codec.compress(data).unwrap();
//!     assert_eq!(codec.decompress(&compressed).unwrap(), data);
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub mod bits;
pub mod code_table;
pub mod file;
pub mod huffman;
pub mod lz77;
pub mod lzw;
pub mod shannon_fano;
pub mod stats;

pub use bits::{BitReader, BitWriter};
pub use code_table::{CodeTable, FrequencyTable};
pub use huffman::{
    build_code_table, build_frequency_table, build_huffman_tree, huffman_decode, huffman_encode,
    Huffman, HuffmanNode, HuffmanTree,
};
pub use lz77::{Lz77, Token};
pub use lzw::Lzw;
pub use shannon_fano::ShannonFano;
pub use stats::{byte_entropy, compression_ratio, round_trip, RoundTripReport};

/// Any of the codecs, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Huffman(Huffman),
    ShannonFano(ShannonFano),
    Lz77(Lz77),
    Lzw(Lzw),
}

impl Codec {
    /// Name accepted by [`Codec::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Huffman(_) => "huffman",
            Codec::ShannonFano(_) => "shannon-fano",
            Codec::Lz77(_) => "lz77",
            Codec::Lzw(_) => "lzw",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = Error;

    /// Parses a codec name; parameterised codecs get their defaults.
    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "huffman" => Ok(Codec::Huffman(Huffman)),
            "shannon-fano" | "shannon_fano" | "shannon" => Ok(Codec::ShannonFano(ShannonFano)),
            "lz77" => Ok(Codec::Lz77(Lz77::default())),
            "lzw" => Ok(Codec::Lzw(Lzw::default())),
            other => Err(Error::config(format!("unknown codec '{other}'"))),
        }
    }
}

impl From<Huffman> for Codec {
    fn from(codec: Huffman) -> Self {
        Codec::Huffman(codec)
    }
}

impl From<ShannonFano> for Codec {
    fn from(codec: ShannonFano) -> Self {
        Codec::ShannonFano(codec)
    }
}

impl From<Lz77> for Codec {
    fn from(codec: Lz77) -> Self {
        Codec::Lz77(codec)
    }
}

impl From<Lzw> for Codec {
    fn from(codec: Lzw) -> Self {
        Codec::Lzw(codec)
    }
}

impl Compression for Codec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::Huffman(codec) => codec.compress(data),
            Codec::ShannonFano(codec) => codec.compress(data),
            Codec::Lz77(codec) => codec.compress(data),
            Codec::Lzw(codec) => codec.compress(data),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::Huffman(codec) => codec.decompress(data),
            Codec::ShannonFano(codec) => codec.decompress(data),
            Codec::Lz77(codec) => codec.decompress(data),
            Codec::Lzw(codec) => codec.decompress(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn all_codecs() -> Vec<Codec> {
        vec![
            Huffman.into(),
            ShannonFano.into(),
            Lz77::default().into(),
            Lz77::new(8, 4).unwrap().into(),
            Lz77::new(4095, 15).unwrap().into(),
            Lzw::default().into(),
            Lzw::new(9).unwrap().into(),
        ]
    }

    #[test]
    fn test_parse_names() {
        for name in ["huffman", "shannon-fano", "lz77", "lzw"] {
            let codec: Codec = name.parse().unwrap();
            assert_eq!(codec.to_string(), name);
        }
        assert_eq!("LZW".parse::<Codec>().unwrap(), Codec::Lzw(Lzw::default()));
        assert!(matches!(
            "deflate".parse::<Codec>(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_round_trip_edge_cases() {
        let inputs: Vec<Vec<u8>> = vec![
            Vec::new(),
            vec![0],
            vec![b'a'; 1000],
            b"ABABABAB".to_vec(),
            b"TOBEORNOTTOBEORTOBEORNOT".to_vec(),
            (0..=255u8).collect(),
        ];
        for codec in all_codecs() {
            for input in &inputs {
                let compressed = codec.compress(input).unwrap();
                let decompressed = codec.decompress(&compressed).unwrap();
                assert_eq!(&decompressed, input, "{codec} failed on {} bytes", input.len());
            }
        }
    }

    #[test]
    fn test_round_trip_random() {
        let mut rng = StdRng::seed_from_u64(42);
        for codec in all_codecs() {
            for len in [1usize, 7, 100, 3000] {
                let text: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'f')).collect();
                let noise: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
                for input in [text, noise] {
                    let compressed = codec.compress(&input).unwrap();
                    assert_eq!(codec.decompress(&compressed).unwrap(), input, "{codec}");
                }
            }
        }
    }

    #[test]
    fn test_repetitive_input_shrinks() {
        let input = b"abracadabra ".repeat(100);
        let codecs: Vec<Codec> = vec![
            Huffman.into(),
            ShannonFano.into(),
            Lz77::default().into(),
            Lzw::default().into(),
            Lzw::new(9).unwrap().into(),
        ];
        for codec in codecs {
            let compressed = codec.compress(&input).unwrap();
            assert!(
                compressed.len() < input.len(),
                "{codec} did not shrink: {} -> {}",
                input.len(),
                compressed.len()
            );
        }
    }
}
