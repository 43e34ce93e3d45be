use log::{debug, trace};

use crate::cs::compression::bits::{BitReader, BitWriter};
use crate::cs::compression::{Compression, Result};
use crate::error::Error;

/// Bits used to store a match distance.
pub const DISTANCE_BITS: usize = 12;
/// Bits used to store a match length.
pub const LENGTH_BITS: usize = 4;
/// Size of a literal token: flag plus one byte.
pub const LITERAL_TOKEN_BITS: usize = 1 + 8;
/// Size of a match token: flag, distance and length.
pub const MATCH_TOKEN_BITS: usize = 1 + DISTANCE_BITS + LENGTH_BITS;

/// Largest window the 12-bit distance field can address.
pub const MAX_WINDOW_SIZE: usize = (1 << DISTANCE_BITS) - 1;
/// Longest match the 4-bit length field can carry.
pub const MAX_LOOKAHEAD_SIZE: usize = (1 << LENGTH_BITS) - 1;

pub const DEFAULT_WINDOW_SIZE: usize = 20;
pub const DEFAULT_LOOKAHEAD_SIZE: usize = MAX_LOOKAHEAD_SIZE;
pub const DEFAULT_MIN_MATCH_LEN: usize = 2;

/// An LZ77 token.
///
/// A match copies `length` bytes starting `distance` bytes behind the current
/// end of output. `length` may exceed `distance`, in which case the copy reads
/// bytes it has just written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { distance: u16, length: u8 },
}

impl Token {
    /// Size of the token in the packed container.
    pub fn bit_len(&self) -> usize {
        match self {
            Token::Literal(_) => LITERAL_TOKEN_BITS,
            Token::Match { .. } => MATCH_TOKEN_BITS,
        }
    }

    /// Number of output bytes the token expands to.
    pub fn decoded_len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => *length as usize,
        }
    }
}

/// LZ77 codec configuration.
///
/// # Example
///
/// ```
/// use classic_codecs::cs::compression::lz77::Lz77;
/// use classic_codecs::cs::compression::Compression;
///
/// let lz77 = Lz77::new(16, 8).unwrap();
/// let data = b"abracadabra abracadabra";
/// let compressed = lz77.compress(data).unwrap();
/// assert_eq!(lz77.decompress(&compressed).unwrap(), data);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77 {
    window_size: usize,
    lookahead_size: usize,
    min_match_len: usize,
}

impl Default for Lz77 {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            lookahead_size: DEFAULT_LOOKAHEAD_SIZE,
            min_match_len: DEFAULT_MIN_MATCH_LEN,
        }
    }
}

impl Lz77 {
    /// Creates a codec searching `window_size` bytes back for matches of at
    /// most `lookahead_size` bytes.
    ///
    /// The minimum match length defaults to 2, or to `lookahead_size` when
    /// that is smaller.
    pub fn new(window_size: usize, lookahead_size: usize) -> Result<Self> {
        if window_size == 0 || window_size > MAX_WINDOW_SIZE {
            return Err(Error::config(format!(
                "window size {window_size} must be in 1..={MAX_WINDOW_SIZE}"
            )));
        }
        if lookahead_size == 0 || lookahead_size > MAX_LOOKAHEAD_SIZE {
            return Err(Error::config(format!(
                "lookahead size {lookahead_size} must be in 1..={MAX_LOOKAHEAD_SIZE}"
            )));
        }
        Ok(Self {
            window_size,
            lookahead_size,
            min_match_len: DEFAULT_MIN_MATCH_LEN.min(lookahead_size),
        })
    }

    /// Sets the shortest match worth emitting instead of literals.
    pub fn with_min_match_len(mut self, min_match_len: usize) -> Result<Self> {
        if min_match_len == 0 || min_match_len > self.lookahead_size {
            return Err(Error::config(format!(
                "minimum match length {min_match_len} must be in 1..={}",
                self.lookahead_size
            )));
        }
        self.min_match_len = min_match_len;
        Ok(self)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn lookahead_size(&self) -> usize {
        self.lookahead_size
    }

    pub fn min_match_len(&self) -> usize {
        self.min_match_len
    }

    /// Finds the longest match for `input[pos..]` starting inside the window.
    ///
    /// Returns `(distance, length)`. Matches may run past `pos` into the bytes
    /// they are copying. Among equally long matches the nearest one wins.
    pub fn find_longest_match(&self, input: &[u8], pos: usize) -> Option<(usize, usize)> {
        let max_length = self.lookahead_size.min(input.len().saturating_sub(pos));
        if max_length < self.min_match_len {
            return None;
        }
        let lookahead = &input[pos..pos + max_length];
        let search_start = pos.saturating_sub(self.window_size);

        let mut best_length = 0;
        let mut best_distance = 0;
        for candidate in (search_start..pos).rev() {
            let length = input[candidate..]
                .iter()
                .zip(lookahead)
                .take_while(|(a, b)| a == b)
                .count();
            if length > best_length {
                best_length = length;
                best_distance = pos - candidate;
                if length == max_length {
                    break;
                }
            }
        }

        (best_length >= self.min_match_len).then_some((best_distance, best_length))
    }

    /// Splits `input` into literal and match tokens.
    pub fn tokenize(&self, input: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < input.len() {
            let token = match self.find_longest_match(input, i) {
                // Bounded by the window and lookahead limits checked in `new`.
                Some((distance, length)) => Token::Match {
                    distance: distance as u16,
                    length: length as u8,
                },
                None => Token::Literal(input[i]),
            };
            trace!("lz77 token at {i}: {token:?}");
            i += token.decoded_len();
            tokens.push(token);
        }
        tokens
    }
}

/// Packs tokens into the bit container, zero-padding the final byte.
pub fn pack_tokens(tokens: &[Token]) -> Result<Vec<u8>> {
    let bits = tokens.iter().map(Token::bit_len).sum();
    let mut writer = BitWriter::with_capacity(bits);
    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                writer.push_bit(false);
                writer.push_byte(byte);
            }
            Token::Match { distance, length } => {
                if distance == 0 || distance as usize > MAX_WINDOW_SIZE {
                    return Err(Error::InputTooLarge {
                        length: distance as usize,
                        max_length: MAX_WINDOW_SIZE,
                    });
                }
                if length as usize > MAX_LOOKAHEAD_SIZE {
                    return Err(Error::InputTooLarge {
                        length: length as usize,
                        max_length: MAX_LOOKAHEAD_SIZE,
                    });
                }
                writer.push_bit(true);
                writer.push_bits(u64::from(distance), DISTANCE_BITS);
                writer.push_bits(u64::from(length), LENGTH_BITS);
            }
        }
    }
    Ok(writer.into_bytes())
}

/// Reads tokens until fewer than a literal token's worth of bits remain.
pub fn unpack_tokens(container: &[u8]) -> Result<Vec<Token>> {
    let mut reader = BitReader::new(container);
    let mut tokens = Vec::new();
    while reader.remaining() >= LITERAL_TOKEN_BITS {
        let start = reader.position();
        if reader.read_bit()? {
            if reader.remaining() < DISTANCE_BITS + LENGTH_BITS {
                return Err(Error::decode_at("truncated match token", start));
            }
            let distance = reader.read_bits(DISTANCE_BITS)? as u16;
            let length = reader.read_bits(LENGTH_BITS)? as u8;
            tokens.push(Token::Match { distance, length });
        } else {
            tokens.push(Token::Literal(reader.read_byte()?));
        }
    }
    Ok(tokens)
}

/// Replays tokens left to right to rebuild the original bytes.
pub fn replay(tokens: &[Token]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(tokens.iter().map(Token::decoded_len).sum());
    for token in tokens {
        match *token {
            Token::Literal(byte) => output.push(byte),
            Token::Match { distance, length } => {
                let distance = distance as usize;
                if distance == 0 || distance > output.len() {
                    return Err(Error::decode(format!(
                        "match distance {distance} reaches before start of output ({} bytes)",
                        output.len()
                    )));
                }
                let start = output.len() - distance;
                // Byte at a time so overlapping copies see what they just wrote.
                for k in 0..length as usize {
                    output.push(output[start + k]);
                }
            }
        }
    }
    Ok(output)
}

impl Compression for Lz77 {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tokens = self.tokenize(data);
        let matches = tokens
            .iter()
            .filter(|token| matches!(token, Token::Match { .. }))
            .count();
        debug!(
            "lz77: {} input bytes, {} tokens ({} matches), window {}, lookahead {}",
            data.len(),
            tokens.len(),
            matches,
            self.window_size,
            self.lookahead_size
        );
        pack_tokens(&tokens)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        replay(&unpack_tokens(data)?)
    }
}
