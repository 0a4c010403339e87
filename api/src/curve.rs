use std::sync::Arc;

use brine_fp::UnsignedNumeric;

use crate::consts::*;
use crate::error::{CurveError, CurveResult};
use crate::math::{mul_div_floor, FixedPoint128, ONE};
use crate::tables::CurveTables;
use crate::utils::to_numeric;

/// Result of pricing a purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyEstimate {
    pub gross_tokens: UnsignedNumeric,
    pub net_tokens: UnsignedNumeric,
    pub fee: UnsignedNumeric,
}

/// Result of pricing a sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SellEstimate {
    pub gross_value: UnsignedNumeric,
    pub net_value: UnsignedNumeric,
    pub fee: UnsignedNumeric,
}

/// Step-based bonding curve evaluated against pre-computed tables.
///
/// Supply is divided into steps of [`STEP_SIZE`] whole tokens with a flat price
/// inside each step. Evaluation uses only the 18-decimal scaled integers from
/// the tables, which keeps results identical to the on-chain program.
///
/// Every method is a pure function of its arguments and the shared tables.
/// The caller supplies the current supply or reserve snapshot.
#[derive(Debug, Clone)]
pub struct DiscreteBondingCurve {
    tables: Arc<CurveTables>,
}

impl DiscreteBondingCurve {
    pub fn new(tables: Arc<CurveTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &CurveTables {
        &self.tables
    }

    /// Largest supply the curve can price.
    pub fn max_supply(&self) -> u64 {
        self.tables.max_supply()
    }

    pub fn step_count(&self) -> u64 {
        self.tables.step_count()
    }

    /// Price per token at `supply`, constant across each step.
    pub fn spot_price(&self, supply: u64) -> CurveResult<UnsignedNumeric> {
        self.spot_price_fixed(supply).map(|p| p.to_numeric())
    }

    fn spot_price_fixed(&self, supply: u64) -> CurveResult<FixedPoint128> {
        self.check_supply(supply)?;
        self.price_at_step(supply / STEP_SIZE)
    }

    /// Cost of buying `tokens` whole tokens starting at `current_supply`.
    pub fn tokens_to_value(&self, current_supply: u64, tokens: u64) -> CurveResult<UnsignedNumeric> {
        self.tokens_to_value_fixed(current_supply, tokens).map(|v| v.to_numeric())
    }

    fn tokens_to_value_fixed(&self, current_supply: u64, tokens: u64) -> CurveResult<FixedPoint128> {
        self.check_supply(current_supply)?;
        let end_supply = current_supply.checked_add(tokens).ok_or(CurveError::OutOfRange)?;
        self.check_supply(end_supply)?;

        if tokens == 0 {
            return Ok(FixedPoint128::ZERO);
        }

        let start_step = current_supply / STEP_SIZE;
        let end_step = end_supply / STEP_SIZE;

        // Tokens from current_supply up to the next step boundary
        let start_boundary = (start_step + 1) * STEP_SIZE;
        let tokens_in_start_step = if start_boundary > end_supply {
            tokens
        } else {
            start_boundary - current_supply
        };

        let start_cost = self
            .price_at_step(start_step)?
            .checked_mul_int(tokens_in_start_step)
            .ok_or(CurveError::Overflow)?;

        if start_step == end_step {
            return Ok(start_cost);
        }

        // Whole steps between start_step + 1 and end_step - 1 (inclusive)
        let middle_cost = self
            .cumulative_at(end_step)?
            .checked_sub(&self.cumulative_at(start_step + 1)?)
            .ok_or(CurveError::Overflow)?;

        let mut total = start_cost.checked_add(&middle_cost).ok_or(CurveError::Overflow)?;

        // An end exactly on a boundary has nothing left to price, including
        // the final boundary which may not have a pricing entry.
        let tokens_in_end_step = end_supply - end_step * STEP_SIZE;
        if tokens_in_end_step > 0 {
            let end_cost = self
                .price_at_step(end_step)?
                .checked_mul_int(tokens_in_end_step)
                .ok_or(CurveError::Overflow)?;
            total = total.checked_add(&end_cost).ok_or(CurveError::Overflow)?;
        }

        Ok(total)
    }

    /// Number of tokens, possibly fractional, that `value` buys at `current_supply`.
    ///
    /// Exact inverse of [`Self::tokens_to_value`]; fractional tokens are
    /// floored at 18 decimals.
    pub fn value_to_tokens(&self, current_supply: u64, value: &UnsignedNumeric) -> CurveResult<UnsignedNumeric> {
        let value = FixedPoint128::from_numeric(value)?;
        self.value_to_tokens_fixed(current_supply, value).map(|t| t.to_numeric())
    }

    fn value_to_tokens_fixed(&self, current_supply: u64, value: FixedPoint128) -> CurveResult<FixedPoint128> {
        self.check_supply(current_supply)?;
        if value.is_zero() {
            return Ok(FixedPoint128::ZERO);
        }
        if current_supply >= self.max_supply() {
            return Err(CurveError::OutOfRange);
        }

        let start_step = current_supply / STEP_SIZE;
        let start_boundary = (start_step + 1) * STEP_SIZE;
        let tokens_to_complete_start_step = start_boundary - current_supply;
        let start_price = self.price_at_step(start_step)?;
        let cost_to_complete_start_step = start_price
            .checked_mul_int(tokens_to_complete_start_step)
            .ok_or(CurveError::Overflow)?;

        // Not enough to finish the current step
        if value < cost_to_complete_start_step {
            return divide_by_price(value, start_price);
        }

        let remaining_after_start = value
            .checked_sub(&cost_to_complete_start_step)
            .ok_or(CurveError::Overflow)?;
        let base_cumulative = self.cumulative_at(start_step + 1)?;
        let target_cumulative = base_cumulative
            .checked_add(&remaining_after_start)
            .ok_or(CurveError::OutOfRange)?;

        let end_step = rightmost_at_or_below(self.tables.cumulative(), start_step as usize + 1, target_cumulative);
        let end_step = end_step as u64;

        let remaining = target_cumulative
            .checked_sub(&self.cumulative_at(end_step)?)
            .ok_or(CurveError::Overflow)?;

        // Spending past the final boundary exceeds what the curve can issue
        if end_step >= self.tables.step_count() && !remaining.is_zero() {
            return Err(CurveError::OutOfRange);
        }

        let whole_tokens = tokens_to_complete_start_step + (end_step - (start_step + 1)) * STEP_SIZE;
        let partial_tokens = if remaining.is_zero() {
            FixedPoint128::ZERO
        } else {
            divide_by_price(remaining, self.price_at_step(end_step)?)?
        };

        FixedPoint128::from_whole(whole_tokens)
            .checked_add(&partial_tokens)
            .ok_or(CurveError::Overflow)
    }

    /// Supply implied by `reserve` total value locked, floored to the most
    /// recent step boundary. Never interpolates inside a step.
    pub fn supply_from_tvl(&self, reserve: &UnsignedNumeric) -> CurveResult<u64> {
        let reserve = FixedPoint128::from_numeric(reserve)?;
        Ok(self.supply_from_tvl_fixed(reserve))
    }

    fn supply_from_tvl_fixed(&self, reserve: FixedPoint128) -> u64 {
        let step = rightmost_at_or_below(self.tables.cumulative(), 0, reserve);
        step as u64 * STEP_SIZE
    }

    /// Prices spending `spend` against a pool holding `current_reserve`.
    pub fn buy(&self, spend: &UnsignedNumeric, fee_bps: u16, current_reserve: &UnsignedNumeric) -> CurveResult<BuyEstimate> {
        check_fee(fee_bps)?;
        let current_supply = self.supply_from_tvl(current_reserve)?;
        let gross = self.value_to_tokens_fixed(current_supply, FixedPoint128::from_numeric(spend)?)?;
        let (net, fee) = apply_fee(gross, fee_bps)?;

        Ok(BuyEstimate {
            gross_tokens: gross.to_numeric(),
            net_tokens: net.to_numeric(),
            fee: fee.to_numeric(),
        })
    }

    /// Prices selling `tokens` whole tokens back to a pool holding `current_reserve`.
    pub fn sell(&self, tokens: u64, fee_bps: u16, current_reserve: &UnsignedNumeric) -> CurveResult<SellEstimate> {
        check_fee(fee_bps)?;
        let current_supply = self.supply_from_tvl(current_reserve)?;
        let new_supply = current_supply.checked_sub(tokens).ok_or(CurveError::OutOfRange)?;

        let current_value = self.tokens_to_value_fixed(0, current_supply)?;
        let new_value = self.tokens_to_value_fixed(0, new_supply)?;
        let gross = current_value.checked_sub(&new_value).ok_or(CurveError::Overflow)?;
        let (net, fee) = apply_fee(gross, fee_bps)?;

        Ok(SellEstimate {
            gross_value: gross.to_numeric(),
            net_value: net.to_numeric(),
            fee: fee.to_numeric(),
        })
    }

    /// `supply * spot_price(supply)`.
    pub fn market_cap(&self, supply: u64) -> CurveResult<UnsignedNumeric> {
        self.spot_price_fixed(supply)?
            .checked_mul_int(supply)
            .map(|v| v.to_numeric())
            .ok_or(CurveError::Overflow)
    }

    /// [`Self::buy`] with USDC quarks for both the spend and the reserve.
    pub fn buy_quarks(&self, usdc_quarks: u64, fee_bps: u16, tvl_quarks: u64) -> CurveResult<BuyEstimate> {
        let spend = to_numeric(usdc_quarks, USDC_DECIMALS)?;
        let reserve = to_numeric(tvl_quarks, USDC_DECIMALS)?;
        self.buy(&spend, fee_bps, &reserve)
    }

    /// [`Self::sell`] with token quarks (floored to whole tokens) and a USDC quark reserve.
    pub fn sell_quarks(&self, token_quarks: u64, fee_bps: u16, tvl_quarks: u64) -> CurveResult<SellEstimate> {
        let tokens = token_quarks / QUARKS_PER_TOKEN;
        let reserve = to_numeric(tvl_quarks, USDC_DECIMALS)?;
        self.sell(tokens, fee_bps, &reserve)
    }

    /// [`Self::market_cap`] for a supply in token quarks, floored to whole tokens.
    pub fn market_cap_quarks(&self, supply_quarks: u64) -> CurveResult<UnsignedNumeric> {
        self.market_cap(supply_quarks / QUARKS_PER_TOKEN)
    }

    /// [`Self::supply_from_tvl`] for a reserve in USDC quarks.
    pub fn supply_from_tvl_quarks(&self, tvl_quarks: u64) -> CurveResult<u64> {
        let reserve = FixedPoint128::from_quarks(tvl_quarks, USDC_DECIMALS)?;
        Ok(self.supply_from_tvl_fixed(reserve))
    }

    fn check_supply(&self, supply: u64) -> CurveResult<()> {
        if supply > self.max_supply() {
            return Err(CurveError::OutOfRange);
        }
        Ok(())
    }

    fn price_at_step(&self, step: u64) -> CurveResult<FixedPoint128> {
        usize::try_from(step)
            .ok()
            .and_then(|i| self.tables.pricing().get(i))
            .copied()
            .ok_or(CurveError::OutOfRange)
    }

    fn cumulative_at(&self, step: u64) -> CurveResult<FixedPoint128> {
        usize::try_from(step)
            .ok()
            .and_then(|i| self.tables.cumulative().get(i))
            .copied()
            .ok_or(CurveError::OutOfRange)
    }
}

/// Largest index `i >= low` with `table[i] <= target`.
///
/// Invariant: `low <= answer <= high`; `low` moves up whenever the midpoint
/// qualifies, so ties resolve to the rightmost matching index. Callers must
/// guarantee `table[low] <= target`.
fn rightmost_at_or_below(table: &[FixedPoint128], low: usize, target: FixedPoint128) -> usize {
    let mut low = low;
    let mut high = table.len() - 1;

    while low < high {
        let mid = (low + high + 1) / 2;
        if table[mid] <= target {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    low
}

/// Tokens bought by `value` at a flat `price`, floored at 18 decimals.
fn divide_by_price(value: FixedPoint128, price: FixedPoint128) -> CurveResult<FixedPoint128> {
    mul_div_floor(value.raw(), ONE, price.raw())
        .map(FixedPoint128::from_scaled_u128)
        .ok_or(CurveError::Overflow)
}

fn check_fee(fee_bps: u16) -> CurveResult<()> {
    if fee_bps > MAX_FEE_BPS {
        return Err(CurveError::OutOfRange);
    }
    Ok(())
}

/// Splits `gross` into `(net, fee)` with the fee floored.
fn apply_fee(gross: FixedPoint128, fee_bps: u16) -> CurveResult<(FixedPoint128, FixedPoint128)> {
    let fee = mul_div_floor(gross.raw(), fee_bps as u128, MAX_FEE_BPS as u128)
        .map(FixedPoint128::from_scaled_u128)
        .ok_or(CurveError::Overflow)?;
    let net = gross.checked_sub(&fee).ok_or(CurveError::Overflow)?;
    Ok((net, fee))
}
