mod config;
mod output;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use flipcash_curve::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{get_table_source, get_tables_dir, parse_amount, resolve_fee_bps, TABLES_ENV};
use output::*;

#[derive(Parser)]
#[command(name = "flipcash-curve")]
#[command(about = "CLI for pricing Flipcash currencies on the discrete bonding curve")]
struct Cli {
    #[arg(long, global = true, env = TABLES_ENV, help = "Directory holding the curve table files (default: <data dir>/flipcash/curve)")]
    tables: Option<PathBuf>,

    #[arg(long, global = true, help = "Print results as JSON")]
    json: bool,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates table files from the exponential curve
    Generate {
        #[arg(long, help = "Output directory (default: the tables directory)")]
        out: Option<PathBuf>,

        #[arg(long, default_value_t = MAX_TOKEN_SUPPLY / STEP_SIZE, help = "Number of 100-token steps to cover")]
        steps: u64,

        #[arg(long, help = "Overwrite existing files without asking")]
        force: bool,
    },

    /// Validates the table files and prints a summary
    Inspect,

    /// Spot price at a supply
    Spot {
        #[arg(long, help = "Current supply in whole tokens")]
        supply: u64,
    },

    /// Cost of buying whole tokens at a supply
    Cost {
        #[arg(long, help = "Current supply in whole tokens")]
        supply: u64,

        #[arg(long, help = "Whole tokens to buy")]
        tokens: u64,
    },

    /// Tokens that a value buys at a supply
    Tokens {
        #[arg(long, help = "Current supply in whole tokens")]
        supply: u64,

        #[arg(long, value_parser = parse_amount, help = "Value to spend (e.g., 100.50)")]
        value: FixedPoint128,
    },

    /// Supply implied by a reserve, floored to a step boundary
    Supply {
        #[arg(long, value_parser = parse_amount, help = "Total value locked (e.g., 2500.25)")]
        tvl: FixedPoint128,
    },

    /// Estimates a buy against a reserve
    Buy {
        #[arg(long, value_parser = parse_amount, help = "Value to spend (e.g., 100.50)")]
        spend: FixedPoint128,

        #[arg(long, value_parser = parse_amount, help = "Current reserve (total value locked)")]
        reserve: FixedPoint128,

        #[arg(long, help = "Fee in basis points (0-10000, default: 0)")]
        fee_bps: Option<u16>,

        #[arg(long, value_parser = parse_amount, conflicts_with = "fee_bps", help = "Fee as a decimal rate (e.g., 0.0125 = 125 bps)")]
        fee_rate: Option<FixedPoint128>,
    },

    /// Estimates a sell against a reserve
    Sell {
        #[arg(long, help = "Whole tokens to sell")]
        tokens: u64,

        #[arg(long, value_parser = parse_amount, help = "Current reserve (total value locked)")]
        reserve: FixedPoint128,

        #[arg(long, help = "Fee in basis points (0-10000, default: 0)")]
        fee_bps: Option<u16>,

        #[arg(long, value_parser = parse_amount, conflicts_with = "fee_bps", help = "Fee as a decimal rate (e.g., 0.0125 = 125 bps)")]
        fee_rate: Option<FixedPoint128>,
    },

    /// Market capitalization at a supply
    MarketCap {
        #[arg(long, help = "Current supply in whole tokens")]
        supply: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;

    match cli.command {
        Commands::Generate { out, steps, force } => {
            let dir = match out {
                Some(dir) => dir,
                None => get_tables_dir(cli.tables)?,
            };
            let source = TableSource::in_dir(&dir);

            if !force && (source.pricing.exists() || source.cumulative.exists()) {
                let overwrite = Confirm::new()
                    .with_prompt(format!("Overwrite existing tables in {}?", dir.display()))
                    .default(false)
                    .interact()?;
                if !overwrite {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let progress = ProgressBar::new(steps + 1);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} steps ({eta})")?
                    .progress_chars("=> "),
            );
            let tables = generate_with_progress(&ExponentialCurve::default(), steps, |_| progress.inc(1))?;
            progress.finish_and_clear();

            fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
            tables
                .write(&source)
                .with_context(|| format!("failed to write curve tables to {}", dir.display()))?;
            let (pricing, cumulative) = tables.to_bytes();
            info!(dir = %dir.display(), steps = tables.step_count(), "wrote curve tables");

            let report = GenerateReport {
                steps: tables.step_count(),
                max_supply: tables.max_supply(),
                pricing: source.pricing.display().to_string(),
                cumulative: source.cumulative.display().to_string(),
                pricing_sha256: sha256_hex(&pricing),
                cumulative_sha256: sha256_hex(&cumulative),
            };
            emit(json, "Tables generated", &report)?;
        }

        Commands::Inspect => {
            let source = get_table_source(cli.tables)?;
            let tables = load_tables(&source)?;

            let pricing = fs::read(&source.pricing)
                .with_context(|| format!("failed to read {}", source.pricing.display()))?;
            let cumulative = fs::read(&source.cumulative)
                .with_context(|| format!("failed to read {}", source.cumulative.display()))?;

            let report = InspectReport {
                pricing_entries: tables.pricing().len(),
                cumulative_entries: tables.cumulative().len(),
                step_count: tables.step_count(),
                max_supply: tables.max_supply(),
                first_price: boundary(tables.pricing().first()),
                last_price: boundary(tables.pricing().last()),
                total_value: boundary(tables.cumulative().last()),
                pricing_sha256: sha256_hex(&pricing),
                cumulative_sha256: sha256_hex(&cumulative),
            };
            emit(json, "Curve tables", &report)?;
        }

        Commands::Spot { supply } => {
            let curve = load_curve(cli.tables)?;
            let price = curve.spot_price(supply)?;
            emit(json, "Spot price", &PriceReport { supply, price: amount(&price)? })?;
        }

        Commands::Cost { supply, tokens } => {
            let curve = load_curve(cli.tables)?;
            let value = curve.tokens_to_value(supply, tokens)?;
            emit(json, "Cost", &CostReport { supply, tokens, value: amount(&value)? })?;
        }

        Commands::Tokens { supply, value } => {
            let curve = load_curve(cli.tables)?;
            let tokens = curve.value_to_tokens(supply, &value.to_numeric())?;
            let report = TokensReport {
                supply,
                value: value.to_string(),
                tokens: amount(&tokens)?,
            };
            emit(json, "Tokens", &report)?;
        }

        Commands::Supply { tvl } => {
            let curve = load_curve(cli.tables)?;
            let supply = curve.supply_from_tvl(&tvl.to_numeric())?;
            emit(json, "Supply", &SupplyReport { tvl: tvl.to_string(), supply })?;
        }

        Commands::Buy { spend, reserve, fee_bps, fee_rate } => {
            let fee_bps = resolve_fee_bps(fee_bps, fee_rate)?;
            let curve = load_curve(cli.tables)?;
            let estimate = curve.buy(&spend.to_numeric(), fee_bps, &reserve.to_numeric())?;
            emit(json, "Buy estimate", &BuyReport::new(spend, reserve, fee_bps, &estimate)?)?;
        }

        Commands::Sell { tokens, reserve, fee_bps, fee_rate } => {
            let fee_bps = resolve_fee_bps(fee_bps, fee_rate)?;
            let curve = load_curve(cli.tables)?;
            let estimate = curve.sell(tokens, fee_bps, &reserve.to_numeric())?;
            emit(json, "Sell estimate", &SellReport::new(tokens, reserve, fee_bps, &estimate)?)?;
        }

        Commands::MarketCap { supply } => {
            let curve = load_curve(cli.tables)?;
            let market_cap = curve.market_cap(supply)?;
            emit(json, "Market cap", &MarketCapReport { supply, market_cap: amount(&market_cap)? })?;
        }
    }

    Ok(())
}

fn load_tables(source: &TableSource) -> Result<std::sync::Arc<CurveTables>> {
    CurveTables::load(source).with_context(|| {
        format!(
            "failed to load curve tables ({} / {})",
            source.pricing.display(),
            source.cumulative.display()
        )
    })
}

fn load_curve(tables: Option<PathBuf>) -> Result<DiscreteBondingCurve> {
    let source = get_table_source(tables)?;
    Ok(DiscreteBondingCurve::new(load_tables(&source)?))
}

fn boundary(entry: Option<&FixedPoint128>) -> String {
    entry.map(|v| v.to_string()).unwrap_or_default()
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults_to_full_supply() {
        let cli = Cli::try_parse_from(["flipcash-curve", "generate"]).unwrap();
        match cli.command {
            Commands::Generate { out, steps, force } => {
                assert_eq!(out, None);
                assert_eq!(steps, (TABLE_SIZE - 1) as u64);
                assert!(!force);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_fee_flags_conflict() {
        let args = ["flipcash-curve", "buy", "--spend", "10", "--reserve", "0", "--fee-bps", "5", "--fee-rate", "0.01"];
        assert!(Cli::try_parse_from(args).is_err());

        let cli = Cli::try_parse_from(["flipcash-curve", "sell", "--tokens", "5", "--reserve", "1", "--fee-rate", "0.01"]).unwrap();
        match cli.command {
            Commands::Sell { fee_bps, fee_rate, .. } => {
                assert_eq!(resolve_fee_bps(fee_bps, fee_rate).unwrap(), 100);
            }
            _ => panic!("expected sell"),
        }
    }
}
