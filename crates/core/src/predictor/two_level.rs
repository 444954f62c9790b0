//! Two-level value predictor: a per-PC value history table (VHT) feeds a
//! shared pattern history table (PHT) of saturating counters, one counter
//! per VHT history slot.
//!
//! K.Wang and M.Franklin, "Highly Accurate Data Prediction using Hybrid
//! Predictors", Micro-30, 1997.

use crate::cache_table::CacheTable;
use crate::common::{ConfigError, Op};
use crate::config::{self, TwoLevelConfig};
use crate::stats::PredictorStats;
use crate::trace::{LookupOutcome, TraceDetail};

use super::no_pred;

#[derive(Clone, Debug, Default)]
pub(crate) struct VhtBody {
    /// Slot indices into `values`, ordered from LRU (`[0]`) to MRU
    /// (`[hist-1]`).
    pub(crate) lru_info: Vec<u8>,
    /// The `hist` most recent distinct values seen at this PC.
    pub(crate) values: Vec<i64>,
    /// Value history pattern: a shift register of recently (mis)matched
    /// slot indices, used to index the PHT.
    pub(crate) vhp: u32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PhtBody {
    /// One saturating counter (range `[0,12]`) per VHT history slot.
    pub(crate) counters: Vec<u8>,
}

/// Two-level predictor state: a VHT and a PHT.
#[derive(Clone, Debug)]
pub struct TwoLevelPredictor {
    config: TwoLevelConfig,
    hist_num: u32,
    hist_mask: u32,
    xor_mask: u32,
    vht: CacheTable<VhtBody>,
    pht: CacheTable<PhtBody>,
}

impl TwoLevelPredictor {
    pub(crate) fn new(cfg: TwoLevelConfig) -> Result<Self, ConfigError> {
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

    /// Index (within `[0, hist)`) of the highest PHT counter, breaking
    /// ties toward the lowest (earliest-seen) index — a strict `<`
    /// comparison never replaces the running max on a tie.
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

    pub(crate) fn lookup(&self, pc: u64) -> LookupOutcome {
        let Some(vht) = self.vht.lookup(pc) else {
            return LookupOutcome {
                predicted_value: 0,
                no_pred: no_pred::L1_MISS,
                detail: TraceDetail::TwoLevel {
                    vht_values: None,
                    vhp_index: None,
                    vhp_xor_index: None,
                    pht_counters: None,
                    aliased_addr: None,
                },
            };
        };

        let (plain_index, xor_index, select_index) = self.pht_indices(vht.vhp, pc);
        let pht_slot = self.pht.raw(select_index);
        let (max_count, winner) = Self::argmax_counter(&pht_slot.body.counters);

        let predicted = u32::from(max_count) >= self.config.threshold;
        let no_pred_code = if predicted { no_pred::PREDICTED } else { no_pred::SUPPRESSED };
        let aliased_addr = (predicted && pht_slot.addr != Some(pc)).then_some(pht_slot.addr.unwrap_or_default());

        LookupOutcome {
            predicted_value: if predicted { vht.values[winner] } else { 0 },
            no_pred: no_pred_code,
            detail: TraceDetail::TwoLevel {
                vht_values: Some(vht.values.clone()),
                vhp_index: Some(plain_index),
                vhp_xor_index: xor_index,
                pht_counters: Some(pht_slot.body.counters.clone()),
                aliased_addr,
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

        if no_pred == 0 && self.pht.raw(select_index).addr != Some(pc) {
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
    }
}
