use brine_fp::UnsignedNumeric;

use crate::consts::*;
use crate::error::{CurveError, CurveResult};
use crate::math::{mul_div_floor, FixedPoint128, ONE};

/// Convert to a whole value (e.g., 10_000_000 with 6 decimals -> 10.0)
pub fn to_numeric(amount: u64, decimal_places: u8) -> CurveResult<UnsignedNumeric> {
    FixedPoint128::from_quarks(amount, decimal_places).map(|v| v.to_numeric())
}

/// Create from a whole value, truncating (e.g., 10.0 with 6 decimals -> 10_000_000)
pub fn from_numeric(value: &UnsignedNumeric, decimal_places: u8) -> CurveResult<u64> {
    FixedPoint128::from_numeric(value)?.to_quarks(decimal_places)
}

pub fn from_basis_points(value: u16) -> UnsignedNumeric {
    FixedPoint128::from_scaled_u128(value as u128 * ONE / MAX_FEE_BPS as u128).to_numeric()
}

pub fn to_basis_points(value: &UnsignedNumeric) -> CurveResult<u16> {
    let value = FixedPoint128::from_numeric(value)?;
    let bps = mul_div_floor(value.raw(), MAX_FEE_BPS as u128, ONE).ok_or(CurveError::Overflow)?;
    u16::try_from(bps).map_err(|_| CurveError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quark_conversions() {
        let usdc = to_numeric(10_000_000, USDC_DECIMALS).unwrap();
        assert_eq!(usdc, UnsignedNumeric::new(10).unwrap());
        assert_eq!(from_numeric(&usdc, USDC_DECIMALS).unwrap(), 10_000_000);
        assert_eq!(from_numeric(&usdc, TOKEN_DECIMALS).unwrap(), 10 * QUARKS_PER_TOKEN);

        // Sub-quark remainders are dropped
        let value = FixedPoint128::parse_decimal("1.2345678").unwrap().to_numeric();
        assert_eq!(from_numeric(&value, USDC_DECIMALS).unwrap(), 1_234_567);
    }

    #[test]
    fn test_basis_points() {
        assert_eq!(from_basis_points(0), UnsignedNumeric::zero());
        assert_eq!(from_basis_points(MAX_FEE_BPS), UnsignedNumeric::one());
        assert_eq!(to_basis_points(&from_basis_points(125)).unwrap(), 125);

        let half = FixedPoint128::parse_decimal("0.5").unwrap().to_numeric();
        assert_eq!(to_basis_points(&half).unwrap(), 5_000);

        let too_big = UnsignedNumeric::new(100).unwrap();
        assert_eq!(to_basis_points(&too_big), Err(CurveError::OutOfRange));
    }
}
