//! Construction-time configuration errors.
//!
//! A [`ConfigError`] is returned whenever a predictor is asked to build a
//! table with a structurally unsupported shape. These checks all run once,
//! at `Predictor::new`, never on the lookup/update hot path.

use std::fmt;

/// Reasons a predictor configuration cannot be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A cache table size was zero or not a power of two.
    ///
    /// The direct-mapped index computation `(addr >> 3) & (sets - 1)` only
    /// covers every slot when `sets` is a power of two.
    NotPowerOfTwo {
        /// Name of the offending table (`"ct"`, `"vpt"`, `"vht"`, `"pht"`).
        table: &'static str,
        /// The rejected size.
        size: u32,
    },

    /// A required count (counter width, threshold) was zero.
    Zero {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The last-value predictor's counter width was not 2.
    ///
    /// The classification counter is hardwired to saturate at `[0, 3]`;
    /// any other width would silently mis-saturate.
    UnsupportedCounterSize(u32),

    /// A two-level/hybrid history depth outside `{2,4,6,8,10,12,14,16}`.
    ///
    /// The VHP shift amount is only defined for these depths.
    UnsupportedHist(u32),

    /// A two-level/hybrid XOR mask selector outside `{0,6,8,12,16}`.
    UnsupportedXor(u32),

    /// An unknown predictor class name was requested from a driver/CLI.
    UnknownClass(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPowerOfTwo { table, size } => {
                write!(f, "{table} size `{size}' must be non-zero and a power of two")
            }
            Self::Zero { field } => write!(f, "{field} must be non-zero"),
            Self::UnsupportedCounterSize(n) => {
                write!(f, "counter size `{n}' is not supported, only 2 is implemented")
            }
            Self::UnsupportedHist(n) => write!(f, "illegal history depth `{n}'"),
            Self::UnsupportedXor(n) => write!(f, "illegal xor bit size `{n}'"),
            Self::UnknownClass(name) => write!(f, "bogus data predictor class `{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}
