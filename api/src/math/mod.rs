// required for clippy
#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

construct_uint! {
    /// Wide intermediate for products of two 18-decimal values.
    pub struct U256(4);
}

pub mod fixed;
pub mod exponential;

pub use fixed::*;
pub use exponential::*;

/// Computes `floor(a * b / d)` without intermediate overflow.
/// Returns `None` when `d` is zero or the quotient does not fit in 128 bits.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let product = U256::from(a).checked_mul(U256::from(b))?;
    let quotient = product.checked_div(U256::from(d))?;
    if quotient.bits() > 128 {
        return None;
    }
    Some(quotient.low_u128())
}
