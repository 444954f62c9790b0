//! Stride-based predictor: a single VHT entry per PC tracks a last value
//! and stride, gated by an Init/Transient/Steady confidence state machine.

use crate::cache_table::CacheTable;
use crate::common::{ConfigError, Op};
use crate::config::StrideConfig;
use crate::stats::PredictorStats;
use crate::trace::{LookupOutcome, TraceDetail};

use super::{no_pred, StrideState};

#[derive(Clone, Debug, Default)]
struct VhtBody {
    state: StrideState,
    value: i64,
    stride: i64,
}

/// Stride predictor state: a single direct-mapped VHT.
#[derive(Clone, Debug)]
pub struct StridePredictor {
    vht: CacheTable<VhtBody>,
}

impl StridePredictor {
    pub(crate) fn new(config: StrideConfig) -> Result<Self, ConfigError> {
        Ok(Self { vht: CacheTable::new(config.vht_size, "vht")? })
    }

    pub(crate) fn lookup(&self, pc: u64) -> LookupOutcome {
        let Some(entry) = self.vht.lookup(pc) else {
            return LookupOutcome {
                predicted_value: 0,
                no_pred: no_pred::L1_MISS,
                detail: TraceDetail::Stride { state: None, stride: None },
            };
        };
        let no_pred = if entry.state == StrideState::Steady { no_pred::PREDICTED } else { no_pred::SUPPRESSED };
        LookupOutcome {
            predicted_value: entry.value + entry.stride,
            no_pred,
            detail: TraceDetail::Stride { state: Some(entry.state), stride: Some(entry.stride) },
        }
    }

    pub(crate) fn update(&mut self, pc: u64, op: Op, data: i64, stats: &mut PredictorStats) {
        let slot = self.vht.slot_mut(pc);
        if slot.addr != Some(pc) {
            stats.l1_misses += 1;
            slot.addr = Some(pc);
            slot.op = op;
            slot.body.state = StrideState::Init;
            slot.body.value = data;
            slot.body.stride = 0;
            return;
        }

        let body = &mut slot.body;
        match body.state {
            StrideState::Init => {
                body.state = StrideState::Transient;
                body.value = data;
                body.stride = 0;
            }
            StrideState::Transient => {
                let current = data - body.value;
                if current == body.stride {
                    body.state = StrideState::Steady;
                } else {
                    body.stride = current;
                }
                body.value = data;
            }
            StrideState::Steady => {
                let current = data - body.value;
                if current != body.stride {
                    body.state = StrideState::Transient;
                    body.stride = current;
                }
                body.value = data;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictor() -> StridePredictor {
        StridePredictor::new(StrideConfig { vht_size: 16 }).unwrap()
    }

    #[test]
    fn converges_to_steady_on_a_constant_stride() {
        let mut p = predictor();
        let mut stats = PredictorStats::default();
        p.update(0x40, Op::Load, 100, &mut stats); // miss -> Init, value 100
        p.update(0x40, Op::Load, 104, &mut stats); // Init -> Transient, stride 0, value 104
        p.update(0x40, Op::Load, 108, &mut stats); // Transient, stride 4 != 0 -> stays Transient, stride 4
        p.update(0x40, Op::Load, 112, &mut stats); // Transient, stride 4 == 4 -> Steady
        let outcome = p.lookup(0x40);
        assert_eq!(outcome.no_pred, no_pred::PREDICTED);
        assert_eq!(outcome.predicted_value, 116);
    }

    #[test]
    fn breaks_steady_back_to_transient_on_stride_change() {
        let mut p = predictor();
        let mut stats = PredictorStats::default();
        p.update(0x40, Op::Load, 100, &mut stats);
        p.update(0x40, Op::Load, 104, &mut stats);
        p.update(0x40, Op::Load, 108, &mut stats);
        p.update(0x40, Op::Load, 112, &mut stats); // now Steady, stride 4
        p.update(0x40, Op::Load, 200, &mut stats); // breaks stride
        let TraceDetail::Stride { state, .. } = p.lookup(0x40).detail else { unreachable!() };
        assert_eq!(state, Some(StrideState::Transient));
    }
}
