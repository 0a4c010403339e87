pub const PRICING_TABLE_FILE: &str     = "discrete_pricing_table.bin";
pub const CUMULATIVE_TABLE_FILE: &str  = "discrete_cumulative_table.bin";

pub const STEP_SIZE: u64               = 100;       // Whole tokens per price step
pub const MAX_TOKEN_SUPPLY: u64        = 21_000_000;
pub const TABLE_SIZE: usize            = 210_001;   // One entry per step boundary, 0..=MAX_TOKEN_SUPPLY
pub const TABLE_PRECISION: u32         = 18;        // Decimal places of every table entry
pub const TABLE_ENTRY_SIZE: usize      = 16;        // (low: u64, high: u64), little-endian

pub const TOKEN_DECIMALS: u8           = 10;        // Decimals for launched currencies
pub const QUARKS_PER_TOKEN: u64        = 10_000_000_000;
pub const USDC_DECIMALS: u8            = 6;         // Decimals for the reserve currency

pub const MAX_FEE_BPS: u16             = 10_000;

// Constants for the default curve from $0.01 to $1_000_000 over 21_000_000 tokens
pub const CURVE_C: u128                = 0_000000877175273521;   // Growth rate per token
pub const CURVE_START_PRICE: u128      = 0_010000000000000000;
