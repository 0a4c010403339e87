//! The continuous exponential curve that the discrete tables were sampled from.
//!
//! This model is superseded for pricing: it relies on an `exp` approximation
//! and does not match the on-chain program at the margins. It is kept only to
//! regenerate tables offline.

use brine_fp::UnsignedNumeric;

use crate::consts::*;
use crate::error::{CurveError, CurveResult};

#[derive(Debug, Clone)]
pub struct ExponentialCurve {
    pub c: UnsignedNumeric,
    pub start_price: UnsignedNumeric,
}

impl Default for ExponentialCurve {
    fn default() -> Self {
        Self {
            c: UnsignedNumeric::from_scaled_u128(CURVE_C),
            start_price: UnsignedNumeric::from_scaled_u128(CURVE_START_PRICE),
        }
    }
}

impl ExponentialCurve {
    /// Price of the discrete step that starts at `step * STEP_SIZE` tokens.
    ///
    /// Sampled as `start_price * e^(c * supply)`, so step 0 is exactly the
    /// start price.
    pub fn step_price(&self, step: u64) -> CurveResult<UnsignedNumeric> {
        if step == 0 {
            return Ok(self.start_price.clone());
        }

        // R'(S) = start_price * e^(c * s)
        let supply = step.checked_mul(STEP_SIZE).ok_or(CurveError::OutOfRange)?;
        let supply = UnsignedNumeric::new(supply as u128).ok_or(CurveError::Overflow)?;
        let c_times_s = self.c.checked_mul(&supply).ok_or(CurveError::Overflow)?;
        let exp = c_times_s.signed().exp().ok_or(CurveError::Overflow)?;
        self.start_price.checked_mul(&exp).ok_or(CurveError::Overflow)
    }
}
