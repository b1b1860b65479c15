//! Fixed-width sequence encoding over an unambiguous alphabet.
//!
//! Sequence `n` (1-based) is written as `n - 1` in base 28, left-padded with
//! the first alphabet character, so sequence 1 is `AAAA`.

use partcode_utils::PartcodeError;
use thiserror::Error;

/// No 0, 1, 9, I, L, O, U or V: characters that are misread on labels.
pub const SKU_ALPHABET: &[u8; 28] = b"ABCDEFGHJKMNPQRSTWXYZ2345678";

const BASE: u64 = SKU_ALPHABET.len() as u64;

pub const DEFAULT_SEQUENCE_WIDTH: usize = 4;

/// 28^12 still fits in a u64.
pub const MAX_SEQUENCE_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("sequence width {0} outside 1..=12")]
    UnsupportedWidth(usize),

    #[error("sequence {value} outside 1..={capacity}")]
    OutOfRange { value: u64, capacity: u64 },

    #[error("sequence code '{code}' has {actual} characters, expected {expected}")]
    WrongWidth {
        code: String,
        expected: usize,
        actual: usize,
    },

    #[error("character '{character}' at position {position} is not in the SKU alphabet")]
    InvalidCharacter { character: char, position: usize },
}

impl From<CodecError> for PartcodeError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::UnsupportedWidth(_) => PartcodeError::configuration(error.to_string()),
            _ => PartcodeError::internal(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphabetCodec {
    width: usize,
    capacity: u64,
}

impl Default for AlphabetCodec {
    fn default() -> Self {
        Self {
            width: DEFAULT_SEQUENCE_WIDTH,
            capacity: BASE.pow(DEFAULT_SEQUENCE_WIDTH as u32),
        }
    }
}

impl AlphabetCodec {
    pub fn new(width: usize) -> Result<Self, CodecError> {
        if !(1..=MAX_SEQUENCE_WIDTH).contains(&width) {
            return Err(CodecError::UnsupportedWidth(width));
        }
        Ok(Self {
            width,
            capacity: BASE.pow(width as u32),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Largest encodable sequence.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn encode(&self, sequence: u64) -> Result<String, CodecError> {
        if sequence == 0 || sequence > self.capacity {
            return Err(CodecError::OutOfRange {
                value: sequence,
                capacity: self.capacity,
            });
        }

        let mut remaining = sequence - 1;
        let mut buf = vec![SKU_ALPHABET[0]; self.width];
        for slot in buf.iter_mut().rev() {
            *slot = SKU_ALPHABET[(remaining % BASE) as usize];
            remaining /= BASE;
        }

        Ok(buf.into_iter().map(char::from).collect())
    }

    pub fn decode(&self, code: &str) -> Result<u64, CodecError> {
        let actual = code.chars().count();
        if actual != self.width {
            return Err(CodecError::WrongWidth {
                code: code.to_string(),
                expected: self.width,
                actual,
            });
        }

        let mut value = 0u64;
        for (position, character) in code.chars().enumerate() {
            let digit = SKU_ALPHABET
                .iter()
                .position(|&c| char::from(c) == character)
                .ok_or(CodecError::InvalidCharacter { character, position })?;
            value = value * BASE + digit as u64;
        }

        Ok(value + 1)
    }
}
