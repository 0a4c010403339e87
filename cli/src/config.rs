use std::path::PathBuf;

use anyhow::{anyhow, ensure, Result};
use flipcash_curve::prelude::*;

pub const TABLES_ENV: &str = "FLIPCASH_CURVE_TABLES";

/// Directory holding the table files, `--tables` / `FLIPCASH_CURVE_TABLES`
/// first, then `<data dir>/flipcash/curve`.
pub fn get_tables_dir(tables: Option<PathBuf>) -> Result<PathBuf> {
    match tables {
        Some(dir) => Ok(dir),
        None => dirs::data_dir()
            .map(|dir| dir.join("flipcash").join("curve"))
            .ok_or_else(|| anyhow!("could not determine a data directory; pass --tables or set {}", TABLES_ENV)),
    }
}

pub fn get_table_source(tables: Option<PathBuf>) -> Result<TableSource> {
    get_tables_dir(tables).map(TableSource::in_dir)
}

/// Parses a decimal amount such as `100.50` for clap.
pub fn parse_amount(s: &str) -> Result<FixedPoint128, String> {
    FixedPoint128::parse_decimal(s).map_err(|err| err.to_string())
}

/// Fee in basis points from either `--fee-bps` or a decimal `--fee-rate`, default 0.
pub fn resolve_fee_bps(fee_bps: Option<u16>, fee_rate: Option<FixedPoint128>) -> Result<u16> {
    let bps = match (fee_bps, fee_rate) {
        (Some(bps), _) => bps,
        (None, Some(rate)) => to_basis_points(&rate.to_numeric())?,
        (None, None) => 0,
    };
    ensure!(bps <= MAX_FEE_BPS, "fee of {} bps exceeds {} bps", bps, MAX_FEE_BPS);
    Ok(bps)
}
