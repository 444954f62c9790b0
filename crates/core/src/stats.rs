//! Predictor statistics collection and reporting.
//!
//! Tracks the same counters the original engine registered with its stats
//! database (`dpred_reg_stats`): lookups, data/no-prediction hit-miss
//! pairs, per-table cache misses, and (for two-level/hybrid) PHT aliasing.
//! All derived rates are computed on demand in [`PredictorStats::print`],
//! not cached, so they always reflect the latest counters.

/// Raw counters plus the section names [`PredictorStats::print_sections`]
/// can filter by.
pub const STATS_SECTIONS: &[&str] = &["prediction", "tables", "aliasing"];

/// Accumulated counters for one predictor instance.
#[derive(Clone, Debug, Default)]
pub struct PredictorStats {
    /// Total number of eligible-instruction lookups.
    pub lookups: u64,
    /// Predictions made (`no_pred == 0`) that matched the resolved value.
    pub data_hits: u64,
    /// Predictions made (`no_pred == 0`) that did not match.
    pub misses: u64,
    /// No-prediction-by-state/counter outcomes (`no_pred == 1`) whose
    /// withheld placeholder did *not* equal the resolved data.
    ///
    /// This name is intentionally the mirror image of what it sounds like:
    /// the original engine credits `no_hits` when the withheld prediction
    /// would have been wrong and `no_misses` when it would have been right,
    /// the inverse of the `data_hits`/`misses` convention above. Preserved
    /// as-is rather than renamed, since renaming it would silently change
    /// which counter callers observing both engines side by side expect to
    /// move.
    pub no_hits: u64,
    /// No-prediction-by-state/counter outcomes whose withheld placeholder
    /// *would* have equalled the resolved data (see
    /// [`PredictorStats::no_hits`]).
    pub no_misses: u64,
    /// Primary-table (CT/VHT) misses that installed a fresh entry.
    pub l1_misses: u64,
    /// Secondary-table (VPT, last-value predictor only) misses.
    pub l2_misses: u64,
    /// PHT probes that landed on a slot tagged with a different PC.
    pub alias: u64,
    /// Aliased PHT probes whose prediction still matched.
    pub alias_hits: u64,
    /// Aliased PHT probes whose prediction did not match.
    pub alias_misses: u64,
}

fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl PredictorStats {
    /// Total predict-or-not decisions that reached a resolved comparison
    /// (`no_pred` either 0 or 1).
    #[must_use]
    pub const fn updates(&self) -> u64 {
        self.data_hits + self.misses
    }

    /// Total no-prediction decisions compared against resolved data.
    #[must_use]
    pub const fn no_updates(&self) -> u64 {
        self.no_hits + self.no_misses
    }

    /// `data_hits / lookups` — overall fraction of lookups that produced a
    /// correct prediction.
    #[must_use]
    pub fn total_prediction_rate(&self) -> f64 {
        rate(self.data_hits, self.lookups)
    }

    /// `data_hits / updates` — accuracy among attempted predictions.
    #[must_use]
    pub fn data_hit_rate(&self) -> f64 {
        rate(self.data_hits, self.updates())
    }

    /// `updates / lookups` — how often the predictor chose to predict.
    #[must_use]
    pub fn prediction_rate(&self) -> f64 {
        rate(self.updates(), self.lookups)
    }

    /// `no_hits / no_updates` — see the caveat on [`PredictorStats::no_hits`].
    #[must_use]
    pub fn no_prediction_hit_rate(&self) -> f64 {
        rate(self.no_hits, self.no_updates())
    }

    /// `l1_misses / lookups`.
    #[must_use]
    pub fn l1_miss_rate(&self) -> f64 {
        rate(self.l1_misses, self.lookups)
    }

    /// `l2_misses / lookups`. Always zero outside the last-value predictor.
    #[must_use]
    pub fn l2_miss_rate(&self) -> f64 {
        rate(self.l2_misses, self.lookups)
    }

    /// `alias / updates`.
    #[must_use]
    pub fn alias_rate(&self) -> f64 {
        rate(self.alias, self.updates())
    }

    /// `alias_hits / (alias_hits + alias_misses)`.
    #[must_use]
    pub fn alias_hit_rate(&self) -> f64 {
        rate(self.alias_hits, self.alias_hits + self.alias_misses)
    }

    /// Resets every counter to zero, e.g. after a warm-up/priming period.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Prints every section, unconditionally.
    pub fn print(&self, name: &str) {
        self.print_sections(name, STATS_SECTIONS);
    }

    /// Prints only the named sections (`"prediction"`, `"tables"`,
    /// `"aliasing"`), in that fixed order.
    pub fn print_sections(&self, name: &str, sections: &[&str]) {
        let want = |section: &str| sections.contains(&section);

        if want("prediction") {
            println!("{name}.lookups = {}", self.lookups);
            println!("{name}.dpred_total_hit_rate = {:.4}", self.total_prediction_rate());
            println!("{name}.updates = {}", self.updates());
            println!("{name}.dpred_pred_rate = {:.4}", self.prediction_rate());
            println!("{name}.data_hits = {}", self.data_hits);
            println!("{name}.misses = {}", self.misses);
            println!("{name}.dpred_data_hit_rate = {:.4}", self.data_hit_rate());
            println!("{name}.no_updates = {}", self.no_updates());
            println!("{name}.no_hits = {}", self.no_hits);
            println!("{name}.no_misses = {}", self.no_misses);
            println!("{name}.dpred_no_hit_rate = {:.4}", self.no_prediction_hit_rate());
        }

        if want("tables") {
            println!("{name}.l1_misses = {}", self.l1_misses);
            println!("{name}.l1_miss_rate = {:.4}", self.l1_miss_rate());
            println!("{name}.l2_misses = {}", self.l2_misses);
            println!("{name}.l2_miss_rate = {:.4}", self.l2_miss_rate());
        }

        if want("aliasing") {
            println!("{name}.alias = {}", self.alias);
            println!("{name}.alias_rate = {:.4}", self.alias_rate());
            println!("{name}.alias_hits = {}", self.alias_hits);
            println!("{name}.alias_misses = {}", self.alias_misses);
            println!("{name}.alias_hit_rate = {:.4}", self.alias_hit_rate());
        }
    }
}
