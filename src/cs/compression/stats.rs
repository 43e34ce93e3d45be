//! Entropy estimate, compression ratio and the round-trip harness.

use log::debug;

use crate::cs::compression::{Compression, Result};
use crate::error::Error;

/// Normalized byte entropy of `data` in `[0, 1]`.
///
/// 0 means a single repeated byte, 1 means every byte value is equally
/// likely. Empty input has entropy 0.
pub fn byte_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut counts = [0u64; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    let total = data.len() as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log(256.0)
        })
        .sum();
    entropy.clamp(0.0, 1.0)
}

/// Original size divided by compressed size; infinite when nothing was written.
pub fn compression_ratio(original_size: usize, compressed_size: usize) -> f64 {
    if compressed_size == 0 {
        return f64::INFINITY;
    }
    original_size as f64 / compressed_size as f64
}

/// Sizes observed by a compress/decompress pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTripReport {
    pub original_len: usize,
    pub compressed_len: usize,
    pub ratio: f64,
}

impl RoundTripReport {
    pub fn new(original_len: usize, compressed_len: usize) -> Self {
        Self {
            original_len,
            compressed_len,
            ratio: compression_ratio(original_len, compressed_len),
        }
    }
}

/// Compresses `data`, decompresses the result and checks it matches.
///
/// # Example
///
/// ```
/// use classic_codecs::cs::compression::{round_trip, Lzw};
///
/// let report = round_trip(&Lzw::default(), b"TOBEORNOTTOBEORTOBEORNOT").unwrap();
/// assert_eq!(report.original_len, 24);
/// ```
pub fn round_trip<C: Compression + ?Sized>(codec: &C, data: &[u8]) -> Result<RoundTripReport> {
    let compressed = codec.compress(data)?;
    let decompressed = codec.decompress(&compressed)?;
    if decompressed != data {
        return Err(Error::RoundTripMismatch {
            expected: data.len(),
            actual: decompressed.len(),
        });
    }
    let report = RoundTripReport::new(data.len(), compressed.len());
    debug!(
        "round trip: {} -> {} bytes, ratio {:.2}",
        report.original_len, report.compressed_len, report.ratio
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::compression::{Huffman, Lz77};

    #[test]
    fn test_entropy_bounds() {
        assert_eq!(byte_entropy(b""), 0.0);
        assert_eq!(byte_entropy(&[b'a'; 64]), 0.0);

        let uniform: Vec<u8> = (0..=255u8).collect();
        assert!((byte_entropy(&uniform) - 1.0).abs() < 1e-9);

        // Two equally likely symbols carry one bit, 1/8 of a byte.
        assert!((byte_entropy(b"abababab") - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_compression_ratio() {
        assert_eq!(compression_ratio(100, 25), 4.0);
        assert_eq!(compression_ratio(0, 10), 0.0);
        assert!(compression_ratio(10, 0).is_infinite());
    }

    #[test]
    fn test_round_trip_report() {
        let data = vec![b'z'; 800];
        let report = round_trip(&Huffman, &data).unwrap();
        assert_eq!(report.original_len, 800);
        assert_eq!(report.compressed_len, 10 + 3 + 100);
        assert!(report.ratio > 7.0);
    }

    struct Lossy;

    impl Compression for Lossy {
        fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.to_vec())
        }

        fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data[..data.len() / 2].to_vec())
        }
    }

    #[test]
    fn test_round_trip_detects_mismatch() {
        assert!(matches!(
            round_trip(&Lossy, b"abcd"),
            Err(Error::RoundTripMismatch {
                expected: 4,
                actual: 2
            })
        ));
        let dynamic: &dyn Compression = &Lz77::default();
        assert!(round_trip(dynamic, b"abcd").is_ok());
    }
}
