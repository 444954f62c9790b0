//! The four predictor classes and the facade that dispatches between them.
//!
//! Mirrors the teacher's `BranchPredictorWrapper`: one enum variant per
//! class, each owning its own tables, behind a single `Predictor` that
//! also owns the shared [`PredictorStats`] and the trace flag.

mod hybrid;
mod last;
mod stride;
mod two_level;

pub use hybrid::HybridPredictor;
pub use last::LastPredictor;
pub use stride::StridePredictor;
pub use two_level::TwoLevelPredictor;

use std::fmt;

use tracing::debug;

use crate::common::{ConfigError, Op};
use crate::config::{DvpConfig, PredictorClass};
use crate::stats::PredictorStats;
use crate::trace::{self, LookupOutcome, TraceDetail};

/// `no_pred` classification codes, unchanged from the original engine.
pub mod no_pred {
    /// A prediction was made and is being reported.
    pub const PREDICTED: u8 = 0;
    /// No prediction was made: the confidence counter/state said not to.
    pub const SUPPRESSED: u8 = 1;
    /// No prediction was made: the primary table (CT/VHT) missed.
    pub const L1_MISS: u8 = 2;
    /// No prediction was made: the secondary table (VPT) missed.
    pub const L2_MISS: u8 = 3;
    /// The instruction was never eligible for value prediction.
    pub const INELIGIBLE: u8 = 4;
}

/// Stride confidence state machine: gains confidence only after two
/// consecutive matching strides, loses it the instant a stride changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StrideState {
    /// First sighting of this PC; no stride is known yet.
    #[default]
    Init,
    /// A stride has been recorded once but hasn't repeated yet.
    Transient,
    /// The same stride has repeated; predictions are trusted.
    Steady,
}

impl fmt::Display for StrideState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "Init",
            Self::Transient => "Transient",
            Self::Steady => "Steady",
        })
    }
}

/// One variant per predictor class, each holding its own tables — the
/// data-value-prediction analogue of the teacher's `BranchPredictorWrapper`.
#[derive(Clone, Debug)]
enum PredictorWrapper {
    Last(LastPredictor),
    Stride(StridePredictor),
    TwoLevel(TwoLevelPredictor),
    Hybrid(HybridPredictor),
}

/// The engine: one active predictor class, its accumulated statistics, and
/// whether per-instruction trace lines should be produced.
#[derive(Clone, Debug)]
pub struct Predictor {
    wrapper: PredictorWrapper,
    stats: PredictorStats,
    trace: bool,
}

impl Predictor {
    /// Builds the predictor class named by `config.class`, validating only
    /// that class's sizing knobs.
    pub fn new(config: DvpConfig) -> Result<Self, ConfigError> {
        let wrapper = match config.class {
            PredictorClass::Last => PredictorWrapper::Last(LastPredictor::new(config.last)?),
            PredictorClass::Stride => PredictorWrapper::Stride(StridePredictor::new(config.stride)?),
            PredictorClass::TwoLevel => PredictorWrapper::TwoLevel(TwoLevelPredictor::new(config.two_level)?),
            PredictorClass::Hybrid => PredictorWrapper::Hybrid(HybridPredictor::new(config.hybrid)?),
        };
        debug!(class = ?config.class, "data value predictor constructed");
        Ok(Self { wrapper, stats: PredictorStats::default(), trace: config.trace })
    }

    /// Whether textual per-instruction tracing is enabled for this
    /// instance.
    #[must_use]
    pub const fn is_tracing(&self) -> bool {
        self.trace
    }

    /// Accumulated statistics for this instance.
    #[must_use]
    pub const fn stats(&self) -> &PredictorStats {
        &self.stats
    }

    /// Zeroes every counter, e.g. after a warm-up/priming period.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Consults the active predictor for `pc`. Instructions `op` doesn't
    /// classify as value-predictable (§6's eligibility predicate) never
    /// reach a table and are reported as `no_pred::INELIGIBLE` without
    /// touching `lookups`.
    pub fn lookup(&mut self, pc: u64, op: Op) -> LookupOutcome {
        if !op.is_value_predictable() {
            return LookupOutcome { predicted_value: 0, no_pred: no_pred::INELIGIBLE, detail: TraceDetail::Ineligible };
        }
        self.stats.lookups += 1;

        let outcome = match &mut self.wrapper {
            PredictorWrapper::Last(p) => p.lookup(pc),
            PredictorWrapper::Stride(p) => p.lookup(pc),
            PredictorWrapper::TwoLevel(p) => p.lookup(pc),
            PredictorWrapper::Hybrid(p) => p.lookup(pc),
        };

        if matches!(
            &outcome.detail,
            TraceDetail::TwoLevel { aliased_addr: Some(_), .. } | TraceDetail::Hybrid { aliased_addr: Some(_), .. }
        ) {
            self.stats.alias += 1;
            debug!(pc, "aliased pattern history table probe");
        }

        outcome
    }

    /// Feeds back the resolved value for the instruction the matching
    /// `lookup` call described. `correct` is derived internally as
    /// `outcome.predicted_value == resolved`, reproducing the original
    /// engine's placeholder-vs-resolved comparison even when `no_pred != 0`
    /// (see [`PredictorStats::no_hits`]).
    pub fn update(&mut self, pc: u64, op: Op, resolved: i64, outcome: &LookupOutcome) {
        if outcome.no_pred == no_pred::INELIGIBLE {
            return;
        }
        let correct = outcome.predicted_value == resolved;

        match outcome.no_pred {
            no_pred::PREDICTED => {
                if correct {
                    self.stats.data_hits += 1;
                } else {
                    self.stats.misses += 1;
                }
            }
            no_pred::SUPPRESSED => {
                // Inherited naming inversion: the original engine credits
                // `no_misses` when the withheld prediction's placeholder
                // would have matched and `no_hits` when it wouldn't have.
                // Preserved verbatim for bit-exact stats parity; see
                // `PredictorStats::no_hits`.
                if correct {
                    self.stats.no_misses += 1;
                } else {
                    self.stats.no_hits += 1;
                }
            }
            _ => {}
        }

        match &mut self.wrapper {
            PredictorWrapper::Last(p) => p.update(pc, op, resolved, correct, &mut self.stats),
            PredictorWrapper::Stride(p) => p.update(pc, op, resolved, &mut self.stats),
            PredictorWrapper::TwoLevel(p) => p.update(pc, op, resolved, outcome.no_pred, correct, &mut self.stats),
            PredictorWrapper::Hybrid(p) => p.update(pc, op, resolved, outcome.no_pred, correct, &mut self.stats),
        }
    }

    /// Formats the two-line trace for one instruction (`§6`), or just the
    /// eligibility line when `op` isn't value-predictable. Returns `None`
    /// for the second line when tracing is disabled or the instruction was
    /// ineligible.
    #[must_use]
    pub fn trace_lines(&self, pc: u64, op_name: &str, eligible: bool, outcome: &LookupOutcome, resolved: i64) -> (String, Option<String>) {
        let first = trace::eligibility_line(pc, op_name, "-", eligible);
        let second = if self.trace { trace::prediction_line(outcome, resolved) } else { None };
        (first, second)
    }
}
