#![cfg(test)]

pub mod utils;
use utils::*;

use flipcash_curve::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn run_fixture_scenarios() {
    let curve = fixture_curve();

    assert_eq!(curve.max_supply(), 300);
    assert_eq!(curve.spot_price(150).unwrap(), num(2));
    assert_eq!(curve.tokens_to_value(0, 250).unwrap(), num(500));
    assert_eq!(curve.value_to_tokens(0, &num(500)).unwrap(), num(250));
    assert_eq!(curve.tokens_to_value(50, 100).unwrap(), num(150));
    assert_eq!(curve.supply_from_tvl(&num(250)).unwrap(), 100);
    assert_eq!(curve.tokens_to_value(0, 1000), Err(CurveError::OutOfRange));
}

#[test]
fn run_generated_curve_shape() {
    let curve = generated_curve();
    let tables = curve.tables();

    assert_eq!(curve.max_supply(), 200_000);
    assert_eq!(tables.step_count(), 2_000);
    assert_eq!(
        curve.spot_price(0).unwrap(),
        UnsignedNumeric::from_scaled_u128(CURVE_START_PRICE)
    );

    // Buying the first step costs exactly one dollar
    assert_eq!(curve.tokens_to_value(0, STEP_SIZE).unwrap(), num(1));
    assert_eq!(tables.cumulative()[1], FixedPoint128::ONE);

    for step in 1..tables.pricing().len() {
        assert!(tables.pricing()[step - 1] < tables.pricing()[step]);
    }
}

#[test]
fn run_round_trip_law() {
    let curve = generated_curve();
    let max_supply = curve.max_supply();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let supply = rng.gen_range(0..max_supply);
        let tokens = rng.gen_range(1..=(max_supply - supply).min(5_000));

        let value = curve.tokens_to_value(supply, tokens).unwrap();
        let bought = curve.value_to_tokens(supply, &value).unwrap();
        assert_eq!(bought, num(tokens), "supply = {}, tokens = {}", supply, tokens);
    }
}

#[test]
fn run_cost_is_additive() {
    let curve = generated_curve();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..200 {
        let supply = rng.gen_range(0..100_000);
        let first = rng.gen_range(0..5_000);
        let second = rng.gen_range(0..5_000);

        let split = fixed(&curve.tokens_to_value(supply, first).unwrap())
            .checked_add(&fixed(&curve.tokens_to_value(supply + first, second).unwrap()))
            .unwrap();
        let joined = fixed(&curve.tokens_to_value(supply, first + second).unwrap());
        assert_eq!(split, joined);
    }
}

#[test]
fn run_supply_from_tvl_is_monotone() {
    let curve = generated_curve();
    let total = fixed(&curve.tokens_to_value(0, curve.max_supply()).unwrap());
    let mut rng = StdRng::seed_from_u64(3);

    let mut reserves: Vec<u128> = (0..300).map(|_| rng.gen_range(0..=total.raw())).collect();
    reserves.sort_unstable();

    let mut last = 0;
    for reserve in reserves {
        let supply = curve
            .supply_from_tvl(&UnsignedNumeric::from_scaled_u128(reserve))
            .unwrap();
        assert_eq!(supply % STEP_SIZE, 0);
        assert!(supply >= last);
        assert!(supply <= curve.max_supply());

        // The boundary supply is affordable with the reserve
        let cost = fixed(&curve.tokens_to_value(0, supply).unwrap());
        assert!(cost.raw() <= reserve);
        last = supply;
    }

    assert_eq!(curve.supply_from_tvl(&total.to_numeric()).unwrap(), curve.max_supply());
}

#[test]
fn run_fees_split_gross() {
    let curve = generated_curve();
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..100 {
        let fee_bps = rng.gen_range(0..=MAX_FEE_BPS);
        let reserve = num(rng.gen_range(0..500));
        let spend = num(rng.gen_range(1..100));

        let estimate = curve.buy(&spend, fee_bps, &reserve).unwrap();
        let sum = fixed(&estimate.net_tokens).checked_add(&fixed(&estimate.fee)).unwrap();
        assert_eq!(sum, fixed(&estimate.gross_tokens));
        assert!(fixed(&estimate.net_tokens) <= fixed(&estimate.gross_tokens));

        let supply = curve.supply_from_tvl(&reserve).unwrap();
        let tokens = rng.gen_range(0..=supply);
        let estimate = curve.sell(tokens, fee_bps, &reserve).unwrap();
        let sum = fixed(&estimate.net_value).checked_add(&fixed(&estimate.fee)).unwrap();
        assert_eq!(sum, fixed(&estimate.gross_value));
        assert_eq!(
            estimate.gross_value,
            curve.tokens_to_value(supply - tokens, tokens).unwrap()
        );
    }
}

#[test]
fn run_fee_bounds() {
    let curve = fixture_curve();

    let estimate = curve.buy(&num(50), 0, &num(0)).unwrap();
    assert_eq!(estimate.fee, UnsignedNumeric::zero());
    assert_eq!(estimate.net_tokens, estimate.gross_tokens);

    let estimate = curve.sell(50, MAX_FEE_BPS, &num(100)).unwrap();
    assert_eq!(estimate.net_value, UnsignedNumeric::zero());
    assert_eq!(estimate.fee, estimate.gross_value);

    assert_eq!(curve.sell(1, MAX_FEE_BPS + 1, &num(100)), Err(CurveError::OutOfRange));
}

#[test]
fn run_market_cap() {
    let curve = generated_curve();
    let supply = 123_456;
    let price = fixed(&curve.spot_price(supply).unwrap());

    assert_eq!(
        fixed(&curve.market_cap(supply).unwrap()),
        price.checked_mul_int(supply).unwrap()
    );
    assert_eq!(
        curve.market_cap_quarks(supply * QUARKS_PER_TOKEN + 42).unwrap(),
        curve.market_cap(supply).unwrap()
    );
}

#[test]
fn run_full_size_table() {
    let tables = generate(&ExponentialCurve::default(), (TABLE_SIZE - 1) as u64).unwrap();
    assert_eq!(tables.cumulative().len(), TABLE_SIZE);

    let curve = DiscreteBondingCurve::new(std::sync::Arc::new(tables));
    assert_eq!(curve.max_supply(), MAX_TOKEN_SUPPLY);

    for (supply, tokens) in [(20_999_950, 50), (20_000_001, 999_999), (0, MAX_TOKEN_SUPPLY), (10_500_037, 1)] {
        let value = curve.tokens_to_value(supply, tokens).unwrap();
        let bought = curve.value_to_tokens(supply, &value).unwrap();
        assert_eq!(bought, num(tokens), "supply = {}, tokens = {}", supply, tokens);
    }

    // The whole curve value buys the whole supply and nothing more
    let total = fixed(&curve.tokens_to_value(0, MAX_TOKEN_SUPPLY).unwrap());
    assert_eq!(curve.supply_from_tvl(&total.to_numeric()).unwrap(), MAX_TOKEN_SUPPLY);
    let over = total.checked_add(&FixedPoint128::from_scaled_u128(1)).unwrap();
    assert_eq!(curve.value_to_tokens(0, &over.to_numeric()), Err(CurveError::OutOfRange));
    assert_eq!(curve.tokens_to_value(MAX_TOKEN_SUPPLY, 1), Err(CurveError::OutOfRange));

    // Top step still prices and caps without overflow
    let top = curve.spot_price(MAX_TOKEN_SUPPLY - 1).unwrap();
    assert!(fixed(&top) > FixedPoint128::from_whole(100_000));
    assert!(curve.market_cap(MAX_TOKEN_SUPPLY).is_ok());
}
