//! The reset law: `ResetStats` zeroes every counter but leaves table
//! contents untouched, so a prediction made before the reset is identical
//! to one made after it.

use dvp_core::config::{DvpConfig, LastConfig, PredictorClass};
use dvp_core::Op;
use dvp_core::Predictor;
use pretty_assertions::assert_eq;

#[test]
fn reset_stats_zeroes_counters_but_preserves_predictions() {
    let mut p = Predictor::new(DvpConfig {
        class: PredictorClass::Last,
        last: LastConfig { ct_size: 16, counter_size: 2, vpt_size: 16, hist: 1 },
        ..DvpConfig::default()
    })
    .unwrap();
    let pc = 0x900;

    for _ in 0..4 {
        let outcome = p.lookup(pc, Op::IntAlu);
        p.update(pc, Op::IntAlu, 42, &outcome);
    }
    let before_reset = p.lookup(pc, Op::IntAlu);
    assert!(p.stats().lookups > 0);

    p.reset_stats();

    assert_eq!(p.stats().lookups, 0);
    assert_eq!(p.stats().data_hits, 0);
    assert_eq!(p.stats().l1_misses, 0);

    let after_reset = p.lookup(pc, Op::IntAlu);
    assert_eq!(after_reset.predicted_value, before_reset.predicted_value);
    assert_eq!(after_reset.no_pred, before_reset.no_pred);
}
