//! Conversion between user-facing decimal amounts and integer base units.
//!
//! Token amounts arrive as decimal strings (`"1.5"`) and leave as integers
//! scaled by `10^scale` (`1500000000000000000` for 18 decimals). Extra
//! fractional digits beyond `scale` are truncated, never rounded.

use crate::U256;

/// Decimals of an ether-like native unit (wei).
pub const ETHER_DECIMALS: u32 = 18;
/// Decimals of gwei relative to wei.
pub const GWEI_DECIMALS: u32 = 9;

/// Largest scale whose power of ten still fits into 256 bits.
pub const MAX_SCALE: u32 = 77;

/// Amount parsing errors
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum UnitsError {
    /// Input is not a non-negative decimal number.
    #[error("{0:?} is not a valid non-negative decimal amount")]
    Malformed(String),
    /// Scaled value does not fit into 256 bits.
    #[error("{0:?} does not fit into 256 bits at scale {1}")]
    Overflow(String, u32),
}

pub fn to_base_units(amount: &str, scale: u32) -> Result<U256, UnitsError> {
    //! Multiply a decimal string by `10^scale` and truncate to an integer.
    //!
    //! ```rust
    //! use multichain_devkit::units::to_base_units;
    //! use multichain_devkit::U256;
    //!
    //! assert_eq!(to_base_units("1.5", 18).unwrap(), U256::from(1_500_000_000_000_000_000u64));
    //! assert_eq!(to_base_units("0.129", 2).unwrap(), U256::from(12));
    //! ```
    let malformed = || UnitsError::Malformed(amount.to_string());
    let overflow = || UnitsError::Overflow(amount.to_string(), scale);

    let text = amount.trim();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(malformed());
    }
    if scale > MAX_SCALE {
        return Err(overflow());
    }

    let kept = &fraction[..fraction.len().min(scale as usize)];
    let mut digits = String::with_capacity(whole.len() + scale as usize);
    digits.push_str(whole);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(scale as usize - kept.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| overflow())
}

pub fn to_base_units_hex(amount: &str, scale: u32) -> Result<String, UnitsError> {
    //! Same as [`to_base_units`], rendered as `0x`-prefixed lowercase hex.
    to_base_units(amount, scale).map(|v| format!("{v:#x}"))
}

pub fn from_base_units(value: U256, scale: u32) -> String {
    //! Render an integer amount of base units as a decimal string.
    //!
    //! Trailing fractional zeros are trimmed, so the result parses back
    //! into the same value with [`to_base_units`].
    let digits = value.to_string();
    let scale = scale as usize;
    if scale == 0 {
        return digits;
    }
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - scale);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

pub fn parse_integer(amount: &str) -> Result<U256, UnitsError> {
    //! Parse a plain non-negative integer (token id, raw token count).
    //!
    //! Unlike [`to_base_units`], a fractional part is an error rather than
    //! being truncated away.
    if amount.contains('.') {
        return Err(UnitsError::Malformed(amount.to_string()));
    }
    to_base_units(amount, 0)
}

pub fn parse_ether(amount: &str) -> Result<U256, UnitsError> {
    //! Convert an ether-denominated amount to wei.
    to_base_units(amount, ETHER_DECIMALS)
}

pub fn parse_gwei(amount: &str) -> Result<U256, UnitsError> {
    //! Convert a gwei-denominated amount to wei.
    to_base_units(amount, GWEI_DECIMALS)
}
