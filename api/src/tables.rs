use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info, warn};

use crate::consts::*;
use crate::error::{CurveError, CurveResult};
use crate::math::{ExponentialCurve, FixedPoint128};

/// Label used for tables that were built in memory rather than read from disk.
const IN_MEMORY: &str = "<memory>";

/// Location of the two binary table files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub pricing: PathBuf,
    pub cumulative: PathBuf,
}

impl TableSource {
    pub fn new(pricing: impl Into<PathBuf>, cumulative: impl Into<PathBuf>) -> Self {
        Self { pricing: pricing.into(), cumulative: cumulative.into() }
    }

    /// Uses the standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(PRICING_TABLE_FILE), dir.join(CUMULATIVE_TABLE_FILE))
    }
}

/// On-disk layout of one table entry: 16 bytes, little-endian `(low, high)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RawTableEntry {
    low: u64,
    high: u64,
}

impl RawTableEntry {
    pub fn from_struct(value: FixedPoint128) -> Self {
        Self {
            low: value.low().to_le(),
            high: value.high().to_le(),
        }
    }

    pub fn to_struct(&self) -> FixedPoint128 {
        FixedPoint128::from_halves(u64::from_le(self.high), u64::from_le(self.low))
    }
}

/// The pre-computed pricing and cumulative tables of the discrete curve.
///
/// `pricing[i]` is the flat per-token price for supply in `[i * 100, (i + 1) * 100)`
/// and `cumulative[i]` is the total cost of the first `i * 100` tokens. Both are
/// immutable once constructed; every constructor validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveTables {
    pricing: Vec<FixedPoint128>,
    cumulative: Vec<FixedPoint128>,
}

impl CurveTables {
    /// Builds tables from in-memory values, e.g. synthetic test fixtures.
    pub fn from_parts(pricing: Vec<FixedPoint128>, cumulative: Vec<FixedPoint128>) -> CurveResult<Self> {
        let tables = Self { pricing, cumulative };
        tables.check_invariants().map_err(|reason| CurveError::corrupt(IN_MEMORY, reason))?;
        Ok(tables)
    }

    /// Decodes tables from the raw contents of the two binary files.
    pub fn from_bytes(pricing: &[u8], cumulative: &[u8]) -> CurveResult<Self> {
        Self::from_labelled_bytes(pricing, Path::new(IN_MEMORY), cumulative, Path::new(IN_MEMORY))
    }

    /// Reads and validates both table files.
    pub fn load(source: &TableSource) -> CurveResult<Arc<Self>> {
        let pricing = read_resource(&source.pricing)?;
        let cumulative = read_resource(&source.cumulative)?;

        let tables = Self::from_labelled_bytes(&pricing, &source.pricing, &cumulative, &source.cumulative)?;

        if tables.cumulative.len() != TABLE_SIZE {
            warn!(
                entries = tables.cumulative.len(),
                expected = TABLE_SIZE,
                "curve tables do not cover the full token supply"
            );
        }
        info!(
            pricing = %source.pricing.display(),
            cumulative = %source.cumulative.display(),
            entries = tables.cumulative.len(),
            max_supply = tables.max_supply(),
            "loaded discrete curve tables"
        );

        Ok(Arc::new(tables))
    }

    fn from_labelled_bytes(
        pricing: &[u8],
        pricing_path: &Path,
        cumulative: &[u8],
        cumulative_path: &Path,
    ) -> CurveResult<Self> {
        let tables = Self {
            pricing: decode_table(pricing, pricing_path)?,
            cumulative: decode_table(cumulative, cumulative_path)?,
        };
        tables
            .check_invariants()
            .map_err(|reason| CurveError::corrupt(cumulative_path, reason))?;
        Ok(tables)
    }

    /// Encodes both tables in the binary file layout, `(pricing, cumulative)`.
    pub fn to_bytes(&self) -> (Vec<u8>, Vec<u8>) {
        (encode_table(&self.pricing), encode_table(&self.cumulative))
    }

    /// Writes both tables to the files named by `source`.
    pub fn write(&self, source: &TableSource) -> io::Result<()> {
        let (pricing, cumulative) = self.to_bytes();
        fs::write(&source.pricing, pricing)?;
        fs::write(&source.cumulative, cumulative)?;
        debug!(pricing = %source.pricing.display(), entries = self.cumulative.len(), "wrote curve tables");
        Ok(())
    }

    pub fn pricing(&self) -> &[FixedPoint128] {
        &self.pricing
    }

    pub fn cumulative(&self) -> &[FixedPoint128] {
        &self.cumulative
    }

    /// Number of whole price steps covered by the tables.
    pub fn step_count(&self) -> u64 {
        (self.cumulative.len() - 1) as u64
    }

    /// Largest supply the tables can price, the last cumulative boundary.
    pub fn max_supply(&self) -> u64 {
        self.step_count() * STEP_SIZE
    }

    /// Re-checks every table invariant.
    pub fn validate(&self) -> CurveResult<()> {
        self.check_invariants().map_err(|reason| CurveError::corrupt(IN_MEMORY, reason))
    }

    fn check_invariants(&self) -> Result<(), String> {
        let pricing = &self.pricing;
        let cumulative = &self.cumulative;

        if cumulative.len() < 2 {
            return Err(format!("cumulative table needs at least 2 entries, found {}", cumulative.len()));
        }
        if pricing.len() != cumulative.len() && pricing.len() + 1 != cumulative.len() {
            return Err(format!(
                "pricing table has {} entries for {} cumulative entries",
                pricing.len(),
                cumulative.len()
            ));
        }
        if !cumulative[0].is_zero() {
            return Err(format!("cumulative[0] must be zero, found {}", cumulative[0]));
        }

        for (i, window) in pricing.windows(2).enumerate() {
            if window[1] < window[0] {
                return Err(format!("pricing decreases at step {}", i + 1));
            }
        }

        for (i, window) in cumulative.windows(2).enumerate() {
            if pricing[i].is_zero() {
                return Err(format!("pricing[{}] is zero", i));
            }
            let step_cost = pricing[i]
                .checked_mul_int(STEP_SIZE)
                .ok_or_else(|| format!("step cost overflows at step {}", i))?;
            if window[1].checked_sub(&window[0]) != Some(step_cost) {
                return Err(format!(
                    "cumulative[{}] - cumulative[{}] != {} * pricing[{}]",
                    i + 1,
                    i,
                    STEP_SIZE,
                    i
                ));
            }
        }

        debug!(entries = cumulative.len(), "curve table invariants hold");
        Ok(())
    }
}

fn read_resource(path: &Path) -> CurveResult<Vec<u8>> {
    fs::read(path).map_err(|err| CurveError::ResourceMissing {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn decode_table(bytes: &[u8], path: &Path) -> CurveResult<Vec<FixedPoint128>> {
    if bytes.is_empty() {
        return Err(CurveError::corrupt(path, "table is empty"));
    }
    if bytes.len() % TABLE_ENTRY_SIZE != 0 {
        return Err(CurveError::corrupt(
            path,
            format!("length {} is not a multiple of {}", bytes.len(), TABLE_ENTRY_SIZE),
        ));
    }

    Ok(bytes
        .chunks_exact(TABLE_ENTRY_SIZE)
        .map(|chunk| bytemuck::pod_read_unaligned::<RawTableEntry>(chunk).to_struct())
        .collect())
}

fn encode_table(entries: &[FixedPoint128]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(entries.len() * TABLE_ENTRY_SIZE);
    for entry in entries {
        bytes.extend_from_slice(bytemuck::bytes_of(&RawTableEntry::from_struct(*entry)));
    }
    bytes
}

/// Samples `curve` at every step boundary to build tables covering `steps` steps.
///
/// `pricing` gets `steps + 1` entries (the last prices supply at the final
/// boundary) and `cumulative` is accumulated exactly from `pricing`, so the
/// result always satisfies the table invariants.
pub fn generate(curve: &ExponentialCurve, steps: u64) -> CurveResult<CurveTables> {
    generate_with_progress(curve, steps, |_| {})
}

/// Same as [`generate`], reporting each finished step to `on_step`.
pub fn generate_with_progress(
    curve: &ExponentialCurve,
    steps: u64,
    mut on_step: impl FnMut(u64),
) -> CurveResult<CurveTables> {
    if steps == 0 {
        return Err(CurveError::OutOfRange);
    }

    let len = steps as usize + 1;
    let mut pricing = Vec::with_capacity(len);
    let mut cumulative = Vec::with_capacity(len);
    let mut total = FixedPoint128::ZERO;

    for step in 0..=steps {
        let price = FixedPoint128::from_numeric(&curve.step_price(step)?)?;
        pricing.push(price);
        cumulative.push(total);

        total = price
            .checked_mul_int(STEP_SIZE)
            .and_then(|cost| total.checked_add(&cost))
            .ok_or(CurveError::Overflow)?;
        on_step(step);
    }

    info!(steps, last_price = %pricing[pricing.len() - 1], "generated discrete curve tables");
    CurveTables::from_parts(pricing, cumulative)
}

/// Load-once cache for tables shared across a process.
///
/// The first call to [`SharedTables::get`] reads the files; concurrent first
/// callers block on that single load and every later call is a lock-free read.
/// A failed load is cached too, since the process cannot serve prices without
/// its tables.
#[derive(Debug)]
pub struct SharedTables {
    source: TableSource,
    cell: OnceLock<CurveResult<Arc<CurveTables>>>,
}

impl SharedTables {
    pub const fn new(source: TableSource) -> Self {
        Self { source, cell: OnceLock::new() }
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    pub fn get(&self) -> CurveResult<Arc<CurveTables>> {
        self.cell.get_or_init(|| CurveTables::load(&self.source)).clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
