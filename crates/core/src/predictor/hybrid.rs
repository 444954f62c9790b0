//! Hybrid predictor: the two-level VHT/PHT path from [`super::two_level`],
//! falling back to a stride state machine carried in the same VHT entry
//! when the PHT counters don't clear the threshold.
//!
//! K.Wang and M.Franklin, "Highly Accurate Data Prediction using Hybrid
//! Predictors", Micro-30, 1997.

use crate::cache_table::CacheTable;
use crate::common::{ConfigError, Op};
use crate::config::{self, HybridConfig};
use crate::stats::PredictorStats;
use crate::trace::{LookupOutcome, TraceDetail};

use super::{no_pred, StrideState};

#[derive(Clone, Debug, Default)]
struct VhtBody {
    lru_info: Vec<u8>,
    values: Vec<i64>,
    vhp: u32,
    state: StrideState,
    stride: i64,
}

#[derive(Clone, Debug, Default)]
struct PhtBody {
    counters: Vec<u8>,
}

/// Hybrid predictor state: one VHT/PHT pair, plus the "which path predicted
/// last" flag the original engine threads between `lookup` and both
/// `update` and `trace`.
#[derive(Clone, Debug)]
pub struct HybridPredictor {
    config: HybridConfig,
    hist_num: u32,
    hist_mask: u32,
    xor_mask: u32,
    vht: CacheTable<VhtBody>,
    pht: CacheTable<PhtBody>,
    /// Set by the most recent `lookup`: `false` if it predicted via the
    /// two-level path, `true` if it fell back to (or was suppressed by)
    /// the stride path. Read back by `update`'s aliasing bookkeeping and by
    /// `trace` formatting — a deliberate cross-call coupling inherited
    /// from the original engine, not refactored away.
    is_stride: bool,
}

impl HybridPredictor {
    pub(crate) fn new(cfg: HybridConfig) -> Result<Self, ConfigError> {
        if cfg.threshold == 0 {
            return Err(ConfigError::Zero { field: "threshold" });
        }
        let hist_num = config::validate_hist(cfg.hist)?;
        let xor_mask = config::validate_xor(cfg.xor)?;
        let hist = cfg.hist as usize;

        let mut vht: CacheTable<VhtBody> = CacheTable::new(cfg.vht_size, "vht")?;
        let mut pht: CacheTable<PhtBody> = CacheTable::new(cfg.pht_size, "pht")?;
        for i in 0..vht.sets() {
            vht.raw_mut(i).body.lru_info = vec![0; hist];
            vht.raw_mut(i).body.values = vec![0; hist];
        }
        for i in 0..pht.sets() {
            pht.raw_mut(i).body.counters = vec![0; hist];
        }

        Ok(Self {
            config: cfg,
            hist_num,
            hist_mask: (1u32 << hist_num) - 1,
            xor_mask,
            vht,
            pht,
            is_stride: false,
        })
    }

    fn pht_indices(&self, vhp: u32, pc: u64) -> (usize, Option<usize>, usize) {
        let pht_size = self.pht.sets();
        let plain = (vhp as usize) & (pht_size - 1);
        if self.config.xor == 0 {
            (plain, None, plain)
        } else {
            let masked_pc = (pc as u32) & self.xor_mask;
            let xor_index = ((vhp ^ masked_pc) as usize) & (pht_size - 1);
            (plain, Some(xor_index), xor_index)
        }
    }

    fn argmax_counter(counters: &[u8]) -> (u8, usize) {
        let mut max = counters[0];
        let mut at = 0;
        for (i, &c) in counters.iter().enumerate().skip(1) {
            if max < c {
                max = c;
                at = i;
            }
        }
        (max, at)
    }

    pub(crate) fn lookup(&mut self, pc: u64) -> LookupOutcome {
        let Some(vht) = self.vht.lookup(pc) else {
            self.is_stride = false;
            return LookupOutcome {
                predicted_value: 0,
                no_pred: no_pred::L1_MISS,
                detail: TraceDetail::Hybrid {
                    is_stride: false,
                    stride_state: None,
                    vht_values: None,
                    vhp_index: None,
                    vhp_xor_index: None,
                    pht_counters: None,
                    aliased_addr: None,
                },
            };
        };
        let hist = self.config.hist as usize;

        let (plain_index, xor_index, select_index) = self.pht_indices(vht.vhp, pc);
        let pht_slot = self.pht.raw(select_index);
        let (max_count, winner) = Self::argmax_counter(&pht_slot.body.counters);

        if u32::from(max_count) >= self.config.threshold {
            self.is_stride = false;
            let aliased_addr = (pht_slot.addr != Some(pc)).then_some(pht_slot.addr.unwrap_or_default());
            return LookupOutcome {
                predicted_value: vht.values[winner],
                no_pred: no_pred::PREDICTED,
                detail: TraceDetail::Hybrid {
                    is_stride: false,
                    stride_state: Some(vht.state),
                    vht_values: Some(vht.values.clone()),
                    vhp_index: Some(plain_index),
                    vhp_xor_index: xor_index,
                    pht_counters: Some(pht_slot.body.counters.clone()),
                    aliased_addr,
                },
            };
        }

        self.is_stride = true;
        let (predicted, no_pred_code) = if vht.state == StrideState::Steady {
            let mru = vht.lru_info[hist - 1] as usize;
            (vht.values[mru] + vht.stride, no_pred::PREDICTED)
        } else {
            (0, no_pred::SUPPRESSED)
        };
        LookupOutcome {
            predicted_value: predicted,
            no_pred: no_pred_code,
            detail: TraceDetail::Hybrid {
                is_stride: true,
                stride_state: Some(vht.state),
                vht_values: Some(vht.values.clone()),
                vhp_index: Some(plain_index),
                vhp_xor_index: xor_index,
                pht_counters: Some(pht_slot.body.counters.clone()),
                aliased_addr: None,
            },
        }
    }

    pub(crate) fn update(&mut self, pc: u64, op: Op, data: i64, no_pred: u8, correct: bool, stats: &mut PredictorStats) {
        let hist = self.config.hist as usize;

        if self.vht.lookup(pc).is_none() {
            stats.l1_misses += 1;
            let slot = self.vht.slot_mut(pc);
            slot.addr = Some(pc);
            slot.op = op;
            slot.body.values[0] = data;
            for v in slot.body.values.iter_mut().skip(1) {
                *v = 0;
            }
            for (j, entry) in slot.body.lru_info.iter_mut().enumerate().take(hist - 1) {
                *entry = (j + 1) as u8;
            }
            slot.body.lru_info[hist - 1] = 0;
            slot.body.vhp = 0;
            slot.body.state = StrideState::Init;
            return;
        }

        let vhp = self.vht.lookup(pc).unwrap().vhp;
        let (_, _, select_index) = self.pht_indices(vhp, pc);
        let values = self.vht.lookup(pc).unwrap().values.clone();
        let matched_index = values.iter().position(|&v| v == data).unwrap_or(hist);

        {
            let pht_slot = self.pht.raw_mut(select_index);
            for (j, counter) in pht_slot.body.counters.iter_mut().enumerate() {
                if j == matched_index {
                    *counter = if *counter < 9 { *counter + 3 } else { 12 };
                } else if *counter > 0 {
                    *counter -= 1;
                }
            }
        }

        if no_pred == 0 && !self.is_stride && self.pht.raw(select_index).addr != Some(pc) {
            if correct {
                stats.alias_hits += 1;
            } else {
                stats.alias_misses += 1;
            }
        }

        if matched_index < hist {
            let slot = self.vht.slot_mut(pc);
            let i = slot.body.lru_info.iter().position(|&v| v as usize == matched_index).unwrap();
            for j in i..hist - 1 {
                slot.body.lru_info[j] = slot.body.lru_info[j + 1];
            }
            slot.body.lru_info[hist - 1] = matched_index as u8;
            slot.body.vhp = (vhp << self.hist_num) | (matched_index as u32 & self.hist_mask);
            if correct {
                self.pht.raw_mut(select_index).addr = Some(pc);
            }
        } else {
            let victim = self.vht.lookup(pc).unwrap().lru_info[0] as usize;
            let slot = self.vht.slot_mut(pc);
            slot.body.values[victim] = data;
            for j in 0..hist - 1 {
                slot.body.lru_info[j] = slot.body.lru_info[j + 1];
            }
            slot.body.lru_info[hist - 1] = victim as u8;
            slot.body.vhp = (vhp << self.hist_num) | (victim as u32 & self.hist_mask);
            self.pht.raw_mut(select_index).body.counters[victim] = 0;
        }

        // Stride state machine, run after the two-level update above so
        // `lru_info[hist-2]` reads the MRU slot from before this call.
        let slot = self.vht.slot_mut(pc);
        match slot.body.state {
            StrideState::Init => {
                slot.body.state = StrideState::Transient;
                slot.body.stride = 0;
            }
            StrideState::Transient => {
                let mru2 = slot.body.lru_info[hist - 2] as usize;
                let current = data - slot.body.values[mru2];
                if current == slot.body.stride {
                    slot.body.state = StrideState::Steady;
                } else {
                    slot.body.stride = current;
                }
            }
            StrideState::Steady => {
                let mru2 = slot.body.lru_info[hist - 2] as usize;
                let current = data - slot.body.values[mru2];
                if current != slot.body.stride {
                    slot.body.state = StrideState::Transient;
                    slot.body.stride = current;
                }
            }
        }
    }
}
