//! Last-value predictor: a classification counter (CT) gates whether a
//! per-PC value table (VPT) entry is trusted as a prediction.
//!
//! M.H.Lipasti and J.P.Shen, "Exceeding the Limit via Value Prediction",
//! Micro-29, 1996.

use crate::cache_table::CacheTable;
use crate::common::{ConfigError, Op};
use crate::config::LastConfig;
use crate::stats::PredictorStats;
use crate::trace::{LookupOutcome, TraceDetail};

use super::no_pred;

#[derive(Clone, Debug, Default)]
struct CtBody {
    counter: u8,
}

#[derive(Clone, Debug, Default)]
struct VptBody {
    /// Only index 0 is ever read or written — `hist` beyond 1 is allocated
    /// but unused, matching the upstream comment `/* only if hist == 1 */`
    /// at every VPT access.
    values: Vec<i64>,
}

/// Last-value predictor state: a CT and a VPT, each direct-mapped.
#[derive(Clone, Debug)]
pub struct LastPredictor {
    config: LastConfig,
    ct: CacheTable<CtBody>,
    vpt: CacheTable<VptBody>,
}

impl LastPredictor {
    pub(crate) fn new(config: LastConfig) -> Result<Self, ConfigError> {
        if config.counter_size != 2 {
            return Err(ConfigError::UnsupportedCounterSize(config.counter_size));
        }
        if config.hist == 0 {
            return Err(ConfigError::Zero { field: "history depth" });
        }
        let mut vpt = CacheTable::new(config.vpt_size, "vpt")?;
        for i in 0..vpt.sets() {
            vpt.raw_mut(i).body.values = vec![0; config.hist as usize];
        }
        Ok(Self {
            config,
            ct: CacheTable::new(config.ct_size, "ct")?,
            vpt,
        })
    }

    pub(crate) fn lookup(&self, pc: u64) -> LookupOutcome {
        let Some(ct_entry) = self.ct.lookup(pc) else {
            return LookupOutcome {
                predicted_value: 0,
                no_pred: no_pred::L1_MISS,
                detail: TraceDetail::Last { ct_counter: None, vpt_value: None },
            };
        };
        let counter = ct_entry.counter;

        let Some(vpt_entry) = self.vpt.lookup(pc) else {
            return LookupOutcome {
                predicted_value: 0,
                no_pred: no_pred::L2_MISS,
                detail: TraceDetail::Last { ct_counter: Some(counter), vpt_value: None },
            };
        };
        let value = vpt_entry.values[0];

        let no_pred = if counter >= 2 { no_pred::PREDICTED } else { no_pred::SUPPRESSED };
        LookupOutcome {
            predicted_value: value,
            no_pred,
            detail: TraceDetail::Last { ct_counter: Some(counter), vpt_value: Some(value) },
        }
    }

    pub(crate) fn update(&mut self, pc: u64, op: Op, data: i64, correct: bool, stats: &mut PredictorStats) {
        let ct_slot = self.ct.slot_mut(pc);
        if ct_slot.addr == Some(pc) {
            if correct {
                if ct_slot.body.counter < 3 {
                    ct_slot.body.counter += 1;
                }
            } else if ct_slot.body.counter > 0 {
                ct_slot.body.counter -= 1;
            }
        } else {
            stats.l1_misses += 1;
            ct_slot.addr = Some(pc);
            ct_slot.op = op;
            ct_slot.body.counter = 0;
        }

        let vpt_slot = self.vpt.slot_mut(pc);
        if vpt_slot.addr == Some(pc) {
            if !correct {
                vpt_slot.body.values[0] = data;
            }
        } else {
            stats.l2_misses += 1;
            vpt_slot.addr = Some(pc);
            vpt_slot.op = op;
            if vpt_slot.body.values.is_empty() {
                vpt_slot.body.values = vec![0; self.config.hist as usize];
            }
            vpt_slot.body.values[0] = data;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictor() -> LastPredictor {
        LastPredictor::new(LastConfig { ct_size: 16, counter_size: 2, vpt_size: 16, hist: 1 }).unwrap()
    }

    #[test]
    fn rejects_unsupported_counter_size() {
        let err = LastPredictor::new(LastConfig { counter_size: 3, ..LastConfig::default() }).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedCounterSize(3));
    }

    #[test]
    fn first_sighting_misses_both_tables() {
        let p = predictor();
        let outcome = p.lookup(0x40);
        assert_eq!(outcome.no_pred, no_pred::L1_MISS);
    }

    #[test]
    fn counter_warms_up_then_predicts() {
        let mut p = predictor();
        let mut stats = PredictorStats::default();

        p.update(0x40, Op::IntAlu, 7, false, &mut stats);
        assert_eq!(p.lookup(0x40).no_pred, no_pred::SUPPRESSED);

        p.update(0x40, Op::IntAlu, 7, true, &mut stats);
        p.update(0x40, Op::IntAlu, 7, true, &mut stats);
        let outcome = p.lookup(0x40);
        assert_eq!(outcome.no_pred, no_pred::PREDICTED);
        assert_eq!(outcome.predicted_value, 7);
    }

    #[test]
    fn counter_never_exceeds_three() {
        let mut p = predictor();
        let mut stats = PredictorStats::default();
        for _ in 0..10 {
            p.update(0x40, Op::IntAlu, 7, true, &mut stats);
        }
        let TraceDetail::Last { ct_counter, .. } = p.lookup(0x40).detail else { unreachable!() };
        assert_eq!(ct_counter, Some(3));
    }
}
