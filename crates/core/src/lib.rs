//! Data value prediction engine.
//!
//! Implements four predictor classes consulted once per
//! integer-register-writing instruction by a host simulator: a
//! classification-counter-gated last-value predictor, a stride state
//! machine, a two-level value-history/pattern-history predictor, and a
//! hybrid of the latter two. Each predicts the output value of future
//! instances of an instruction executed at the same program counter, along
//! with a confidence classification, and is updated once the true value is
//! known.

/// The pinned `Op` classification and the `ConfigError` construction-time
/// error type.
pub mod common;
/// `PredictorClass`, per-class `*Config` structs, and `DvpConfig`.
pub mod config;
/// The generic direct-mapped `CacheTable<E>` shared by every predictor class.
pub mod cache_table;
/// The four predictor classes and the `Predictor` facade.
pub mod predictor;
/// Accumulated statistics and their derived rates.
pub mod stats;
/// Per-instruction trace line formatting.
pub mod trace;

/// The pinned instruction classification supplied by the host on every
/// `Lookup`/`Update`.
pub use crate::common::Op;
/// Root configuration type; deserialize with `serde_json` or build directly.
pub use crate::config::DvpConfig;
/// Construction-time configuration error.
pub use crate::common::ConfigError;
/// The engine: one active predictor class plus its statistics.
pub use crate::predictor::Predictor;
