use std::fmt;
use std::str::FromStr;

use brine_fp::UnsignedNumeric;

use crate::consts::TABLE_PRECISION;
use crate::error::{CurveError, CurveResult};

/// The representation of the number one as a fixed-point value, 10^18.
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// An unsigned 128-bit fixed-point number with 18 decimal places.
///
/// The raw integer is interpreted as `raw / 10^18`. This is the layout of every
/// entry in the discrete curve tables, and the on-chain program computes with
/// the same scaled integers, so all table math stays exact in this type.
///
/// ```text
/// raw = (high << 64) | low
/// value = raw / 10^18
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedPoint128(u128);

impl FixedPoint128 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(ONE);

    /// Wraps a raw value that is already scaled by 10^18.
    pub const fn from_scaled_u128(raw: u128) -> Self {
        Self(raw)
    }

    /// Rebuilds a value from the two 64-bit halves used by the table files.
    pub const fn from_halves(high: u64, low: u64) -> Self {
        Self(((high as u128) << 64) | low as u128)
    }

    /// Scales a whole number by 10^18.
    pub fn from_whole(value: u64) -> Self {
        // u64::MAX * 10^18 < u128::MAX
        Self(value as u128 * ONE)
    }

    /// Converts an integer amount with `decimals` places (quarks) into fixed point.
    pub fn from_quarks(amount: u64, decimals: u8) -> CurveResult<Self> {
        let scale = decimal_scale(decimals)?;
        Ok(Self(amount as u128 * scale))
    }

    /// Converts back to an integer amount with `decimals` places, truncating.
    pub fn to_quarks(&self, decimals: u8) -> CurveResult<u64> {
        let scale = decimal_scale(decimals)?;
        u64::try_from(self.0 / scale).map_err(|_| CurveError::OutOfRange)
    }

    /// Parses a human-readable decimal such as `"231.804283"`.
    /// Fractional digits beyond the 18th are truncated.
    pub fn parse_decimal(s: &str) -> CurveResult<Self> {
        let malformed = || CurveError::MalformedNumber(s.to_string());

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(malformed());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| malformed())? };
        let digits = &fraction[..fraction.len().min(TABLE_PRECISION as usize)];
        let fraction: u128 = if digits.is_empty() {
            0
        } else {
            let parsed: u128 = digits.parse().map_err(|_| malformed())?;
            parsed * 10u128.pow(TABLE_PRECISION - digits.len() as u32)
        };

        whole
            .checked_mul(ONE)
            .and_then(|w| w.checked_add(fraction))
            .map(Self)
            .ok_or_else(malformed)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub const fn high(&self) -> u64 {
        (self.0 >> 64) as u64
    }

    pub const fn low(&self) -> u64 {
        self.0 as u64
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Multiplies by a whole number, e.g. a token count times a per-token price.
    pub fn checked_mul_int(&self, rhs: u64) -> Option<Self> {
        self.0.checked_mul(rhs as u128).map(Self)
    }

    /// Converts into the caller-facing decimal type. Always lossless.
    pub fn to_numeric(&self) -> UnsignedNumeric {
        UnsignedNumeric::from_scaled_u128(self.0)
    }

    /// Converts from the caller-facing decimal type. Both sides carry 18
    /// decimals, so this only fails when the value needs more than 128 bits.
    pub fn from_numeric(value: &UnsignedNumeric) -> CurveResult<Self> {
        let bytes = value.to_bytes();
        if bytes[16..24].iter().any(|b| *b != 0) {
            return Err(CurveError::OutOfRange);
        }
        let mut raw = [0u8; 16];
        raw.copy_from_slice(&bytes[0..16]);
        Ok(Self(u128::from_le_bytes(raw)))
    }
}

/// 10^(18 - decimals), the factor between quarks and fixed-point raw units.
fn decimal_scale(decimals: u8) -> CurveResult<u128> {
    let exponent = TABLE_PRECISION
        .checked_sub(decimals as u32)
        .ok_or(CurveError::OutOfRange)?;
    Ok(10u128.pow(exponent))
}

impl FromStr for FixedPoint128 {
    type Err = CurveError;

    /// Parses the raw scaled integer, e.g. `"10000877213746469"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CurveError::MalformedNumber(s.to_string()));
        }
        s.parse::<u128>()
            .map(Self)
            .map_err(|_| CurveError::MalformedNumber(s.to_string()))
    }
}

impl fmt::Display for FixedPoint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:018}", self.0 / ONE, self.0 % ONE)
    }
}
