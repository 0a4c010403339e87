pub mod consts;
pub mod curve;
pub mod error;
pub mod math;
pub mod tables;
pub mod utils;

pub mod prelude {
    pub use crate::consts::*;
    pub use crate::curve::*;
    pub use crate::error::*;
    pub use crate::math::*;
    pub use crate::tables::*;
    pub use crate::utils::*;

    pub use brine_fp::UnsignedNumeric;
}
