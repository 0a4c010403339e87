#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, OnceLock};

use flipcash_curve::prelude::*;

/// Prices 1, 2 and 4 for supply [0, 100), [100, 200) and [200, 300).
pub fn fixture_tables() -> CurveTables {
    CurveTables::from_parts(whole(&[1, 2, 4]), whole(&[0, 100, 300, 700])).unwrap()
}

pub fn fixture_curve() -> DiscreteBondingCurve {
    DiscreteBondingCurve::new(Arc::new(fixture_tables()))
}

/// Curve sampled from the exponential model, shared across tests in a binary.
pub fn generated_curve() -> DiscreteBondingCurve {
    static TABLES: OnceLock<Arc<CurveTables>> = OnceLock::new();
    let tables = TABLES.get_or_init(|| Arc::new(generate(&ExponentialCurve::default(), 2_000).unwrap()));
    DiscreteBondingCurve::new(tables.clone())
}

pub fn write_tables(dir: &Path, tables: &CurveTables) -> TableSource {
    let source = TableSource::in_dir(dir);
    tables.write(&source).unwrap();
    source
}

pub fn whole(values: &[u64]) -> Vec<FixedPoint128> {
    values.iter().map(|v| FixedPoint128::from_whole(*v)).collect()
}

pub fn num(value: u64) -> UnsignedNumeric {
    FixedPoint128::from_whole(value).to_numeric()
}

pub fn fixed(value: &UnsignedNumeric) -> FixedPoint128 {
    FixedPoint128::from_numeric(value).unwrap()
}
