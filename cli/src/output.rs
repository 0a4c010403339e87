use anyhow::Result;
use colored::Colorize;
use flipcash_curve::prelude::*;
use serde::Serialize;
use serde_json::Value;

/// Prints `report` as pretty JSON, or as labelled lines under `title`.
pub fn emit<T: Serialize>(json: bool, title: &str, report: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_text(title, report)?);
    }
    Ok(())
}

/// Labelled lines in field declaration order.
pub fn render_text<T: Serialize>(title: &str, report: &T) -> Result<String> {
    let mut text = format!("{}\n", title.bold());
    if let Value::Object(fields) = serde_json::to_value(report)? {
        for (key, field) in fields {
            let value = match field {
                Value::String(s) => s,
                other => other.to_string(),
            };
            text.push_str(&format!("  {}: {}\n", key.replace('_', " ").cyan(), value));
        }
    }
    Ok(text)
}

pub fn amount(value: &UnsignedNumeric) -> Result<String> {
    Ok(FixedPoint128::from_numeric(value)?.to_string())
}

#[derive(Serialize)]
pub struct GenerateReport {
    pub steps: u64,
    pub max_supply: u64,
    pub pricing: String,
    pub cumulative: String,
    pub pricing_sha256: String,
    pub cumulative_sha256: String,
}

#[derive(Serialize)]
pub struct InspectReport {
    pub pricing_entries: usize,
    pub cumulative_entries: usize,
    pub step_count: u64,
    pub max_supply: u64,
    pub first_price: String,
    pub last_price: String,
    pub total_value: String,
    pub pricing_sha256: String,
    pub cumulative_sha256: String,
}

#[derive(Serialize)]
pub struct PriceReport {
    pub supply: u64,
    pub price: String,
}

#[derive(Serialize)]
pub struct CostReport {
    pub supply: u64,
    pub tokens: u64,
    pub value: String,
}

#[derive(Serialize)]
pub struct TokensReport {
    pub supply: u64,
    pub value: String,
    pub tokens: String,
}

#[derive(Serialize)]
pub struct SupplyReport {
    pub tvl: String,
    pub supply: u64,
}

#[derive(Serialize)]
pub struct BuyReport {
    pub spend: String,
    pub reserve: String,
    pub fee_bps: u16,
    pub fee_rate: String,
    pub gross_tokens: String,
    pub net_tokens: String,
    pub fee: String,
}

impl BuyReport {
    pub fn new(spend: FixedPoint128, reserve: FixedPoint128, fee_bps: u16, estimate: &BuyEstimate) -> Result<Self> {
        Ok(Self {
            spend: spend.to_string(),
            reserve: reserve.to_string(),
            fee_bps,
            fee_rate: amount(&from_basis_points(fee_bps))?,
            gross_tokens: amount(&estimate.gross_tokens)?,
            net_tokens: amount(&estimate.net_tokens)?,
            fee: amount(&estimate.fee)?,
        })
    }
}

#[derive(Serialize)]
pub struct SellReport {
    pub tokens: u64,
    pub reserve: String,
    pub fee_bps: u16,
    pub fee_rate: String,
    pub gross_value: String,
    pub net_value: String,
    pub fee: String,
}

impl SellReport {
    pub fn new(tokens: u64, reserve: FixedPoint128, fee_bps: u16, estimate: &SellEstimate) -> Result<Self> {
        Ok(Self {
            tokens,
            reserve: reserve.to_string(),
            fee_bps,
            fee_rate: amount(&from_basis_points(fee_bps))?,
            gross_value: amount(&estimate.gross_value)?,
            net_value: amount(&estimate.net_value)?,
            fee: amount(&estimate.fee)?,
        })
    }
}

#[derive(Serialize)]
pub struct MarketCapReport {
    pub supply: u64,
    pub market_cap: String,
}
