//! Roman numeral codec over the fixed seven-symbol alphabet.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest value `encode` can represent in subtractive notation.
pub const MAX_ENCODABLE: u32 = 3999;

/// Errors produced by the numeral codec.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RomanError {
    /// `encode` accepts only `1..=3999`; the quest system is designed to
    /// stay inside that range, so exceeding it is a hard boundary and is
    /// never clamped.
    #[error("value {0} outside encodable range 1..={MAX_ENCODABLE}")]
    OutOfRange(u32),
    /// A character outside the numeral alphabet.
    #[error("character {0:?} is not a roman numeral symbol")]
    InvalidSymbol(char),
}

/// One of the seven numeral symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RomanChar {
    I,
    V,
    X,
    L,
    C,
    D,
    M,
}

impl RomanChar {
    /// Numeric value of the symbol.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::I => 1,
            Self::V => 5,
            Self::X => 10,
            Self::L => 50,
            Self::C => 100,
            Self::D => 500,
            Self::M => 1000,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::V => 'V',
            Self::X => 'X',
            Self::L => 'L',
            Self::C => 'C',
            Self::D => 'D',
            Self::M => 'M',
        }
    }
}

impl TryFrom<char> for RomanChar {
    type Error = RomanError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'I' => Ok(Self::I),
            'V' => Ok(Self::V),
            'X' => Ok(Self::X),
            'L' => Ok(Self::L),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'M' => Ok(Self::M),
            _ => Err(RomanError::InvalidSymbol(value)),
        }
    }
}

impl fmt::Display for RomanChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for RomanChar {
    type Err = RomanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(RomanError::InvalidSymbol(s.chars().next().unwrap_or('\0'))),
        }
    }
}

/// The full alphabet, in ascending value order.
pub const ROMAN_CHARS: [RomanChar; 7] = [
    RomanChar::I,
    RomanChar::V,
    RomanChar::X,
    RomanChar::L,
    RomanChar::C,
    RomanChar::D,
    RomanChar::M,
];

/// Subtractive-notation table, largest value first.
const NUMERAL_TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Encode `n` as the unique minimal subtractive-notation numeral.
///
/// # Errors
///
/// Returns [`RomanError::OutOfRange`] unless `1 <= n <= 3999`.
pub fn encode(n: u32) -> Result<String, RomanError> {
    if n < 1 || n > MAX_ENCODABLE {
        return Err(RomanError::OutOfRange(n));
    }
    let mut out = String::new();
    let mut remaining = n;
    for &(value, numeral) in &NUMERAL_TABLE {
        while remaining >= value {
            out.push_str(numeral);
            remaining -= value;
        }
    }
    Ok(out)
}

/// Decode a numeral string by right-to-left accumulation: a value smaller
/// than the one to its right is subtracted, otherwise added.
///
/// The decoder is deliberately permissive. Canonical form is not enforced,
/// so `"IIII"` decodes to 4 and `"IM"` to 999, and adversarial strings can
/// yield values at or below zero. Only characters outside the alphabet are
/// rejected.
///
/// # Errors
///
/// Returns [`RomanError::InvalidSymbol`] for any non-numeral character.
pub fn decode(s: &str) -> Result<i32, RomanError> {
    let mut total: i32 = 0;
    let mut prev: u32 = 0;
    for ch in s.chars().rev() {
        let value = RomanChar::try_from(ch)?.value();
        if value < prev {
            total -= value.cast_signed();
        } else {
            total += value.cast_signed();
        }
        prev = value;
    }
    Ok(total)
}

/// Membership test against the numeral alphabet.
#[must_use]
pub fn is_roman_char(ch: char) -> bool {
    RomanChar::try_from(ch).is_ok()
}
