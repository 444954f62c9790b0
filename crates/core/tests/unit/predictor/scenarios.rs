//! End-to-end scenarios driven entirely through the public [`Predictor`]
//! facade, mirroring how a host simulator would call `lookup`/`update` once
//! per instruction. Each test names the scenario it encodes.

use dvp_core::config::{DvpConfig, HybridConfig, LastConfig, PredictorClass, StrideConfig, TwoLevelConfig};
use dvp_core::predictor::no_pred;
use dvp_core::trace::TraceDetail;
use dvp_core::{Op, Predictor};
use pretty_assertions::assert_eq;
use rstest::fixture;

#[fixture]
fn last() -> Predictor {
    Predictor::new(DvpConfig {
        class: PredictorClass::Last,
        last: LastConfig { ct_size: 1024, counter_size: 2, vpt_size: 4096, hist: 1 },
        ..DvpConfig::default()
    })
    .unwrap()
}

#[fixture]
fn stride() -> Predictor {
    Predictor::new(DvpConfig { class: PredictorClass::Stride, stride: StrideConfig { vht_size: 4096 }, ..DvpConfig::default() }).unwrap()
}

#[fixture]
fn two_level() -> Predictor {
    Predictor::new(DvpConfig {
        class: PredictorClass::TwoLevel,
        two_level: TwoLevelConfig { vht_size: 4096, threshold: 3, pht_size: 4096, hist: 4, xor: 0 },
        ..DvpConfig::default()
    })
    .unwrap()
}

/// Same table shape as the two-level fixture, but small enough that two
/// PCs whose initial VHP both sit at zero collide on the same PHT slot.
#[fixture]
fn small_two_level() -> Predictor {
    Predictor::new(DvpConfig {
        class: PredictorClass::TwoLevel,
        two_level: TwoLevelConfig { vht_size: 16, threshold: 3, pht_size: 16, hist: 4, xor: 0 },
        ..DvpConfig::default()
    })
    .unwrap()
}

#[fixture]
fn hybrid() -> Predictor {
    Predictor::new(DvpConfig {
        class: PredictorClass::Hybrid,
        hybrid: HybridConfig { vht_size: 4096, threshold: 6, pht_size: 4096, hist: 4, xor: 0 },
        ..DvpConfig::default()
    })
    .unwrap()
}

/// Scenario 1+2: a fresh PC under `Last(1024,2,4096,1)` misses both tables,
/// then warms up until its classification counter clears the confidence
/// gate.
#[rstest::rstest]
fn last_value_warms_up_from_a_cold_pc(mut last: Predictor) {
    let p = &mut last;
    let pc = 0x100;

    // First sighting: CT and VPT both miss.
    let outcome = p.lookup(pc, Op::IntAlu);
    assert_eq!(outcome.no_pred, no_pred::L1_MISS);
    p.update(pc, Op::IntAlu, 7, &outcome);

    // Second sighting: CT hits with counter 0, VPT hits with value 7 —
    // withheld by the confidence gate even though the value is right.
    let outcome = p.lookup(pc, Op::IntAlu);
    assert_eq!(outcome.no_pred, no_pred::SUPPRESSED);
    assert_eq!(outcome.predicted_value, 7);
    let TraceDetail::Last { ct_counter, .. } = outcome.detail else { unreachable!() };
    assert_eq!(ct_counter, Some(0));

    // Three more correct sightings saturate the counter to 3 and clear the
    // gate (the "Last warm-up" law — matching four consecutive identical
    // resolved values for this PC).
    for _ in 0..3 {
        let outcome = p.lookup(pc, Op::IntAlu);
        p.update(pc, Op::IntAlu, 7, &outcome);
    }
    let outcome = p.lookup(pc, Op::IntAlu);
    assert_eq!(outcome.no_pred, no_pred::PREDICTED);
    assert_eq!(outcome.predicted_value, 7);
    let TraceDetail::Last { ct_counter, .. } = outcome.detail else { unreachable!() };
    assert_eq!(ct_counter, Some(3));

    // A single differing sample drops the counter by exactly one, still
    // predicting.
    p.update(pc, Op::IntAlu, 8, &outcome);
    let outcome = p.lookup(pc, Op::IntAlu);
    let TraceDetail::Last { ct_counter, .. } = outcome.detail else { unreachable!() };
    assert_eq!(ct_counter, Some(2));
    assert_eq!(outcome.no_pred, no_pred::PREDICTED);
}

/// Scenario 3: `Stride(4096)` fed `10, 13, 16, 19` reaches Steady after the
/// fourth Update and predicts the next term exactly.
#[rstest::rstest]
fn stride_converges_and_predicts_the_next_term(mut stride: Predictor) {
    let p = &mut stride;
    let pc = 0x200;
    for data in [10, 13, 16, 19] {
        let outcome = p.lookup(pc, Op::Load);
        p.update(pc, Op::Load, data, &outcome);
    }
    let outcome = p.lookup(pc, Op::Load);
    assert_eq!(outcome.no_pred, no_pred::PREDICTED);
    assert_eq!(outcome.predicted_value, 22);
}

/// Scenario 4: `TwoLev(4096,3,4096,4,0)` fed the same value repeatedly
/// drives its matching PHT counter to saturation (12), then a differing
/// value both demotes that counter and installs itself as the LRU victim.
#[rstest::rstest]
fn two_level_saturates_then_demotes_on_a_miss(mut two_level: Predictor) {
    let p = &mut two_level;
    let pc = 0x300;

    let mut last_detail = None;
    for _ in 0..8 {
        let outcome = p.lookup(pc, Op::Load);
        p.update(pc, Op::Load, 5, &outcome);
        last_detail = Some(outcome.detail);
    }
    let outcome = p.lookup(pc, Op::Load);
    assert_eq!(outcome.no_pred, no_pred::PREDICTED);
    assert_eq!(outcome.predicted_value, 5);
    let TraceDetail::TwoLevel { pht_counters, .. } = outcome.detail else { unreachable!() };
    let counters = pht_counters.unwrap();
    assert_eq!(counters[0], 12);
    assert!(counters[1..].iter().all(|&c| c == 0));
    drop(last_detail);

    // A differing value demotes the saturated counter by exactly one and
    // becomes the new LRU-victim value.
    p.update(pc, Op::Load, 9, &outcome);
    let outcome = p.lookup(pc, Op::Load);
    let TraceDetail::TwoLevel { vht_values, pht_counters, .. } = outcome.detail else { unreachable!() };
    assert_eq!(pht_counters.unwrap()[0], 11);
    assert!(vht_values.unwrap().contains(&9));
}

/// Scenario 5: `Hybrid(4096,6,4096,4,0)` fed a pure arithmetic progression
/// never repeats a value, so the two-level counter never clears threshold
/// 6 and the stride fallback takes over, predicting the next term.
#[rstest::rstest]
fn hybrid_falls_through_to_stride_on_a_pure_progression(mut hybrid: Predictor) {
    let p = &mut hybrid;
    let pc = 0x400;
    for data in [100, 110, 120, 130, 140] {
        let outcome = p.lookup(pc, Op::Load);
        p.update(pc, Op::Load, data, &outcome);
    }
    let outcome = p.lookup(pc, Op::Load);
    assert_eq!(outcome.no_pred, no_pred::PREDICTED);
    assert_eq!(outcome.predicted_value, 150);
    let TraceDetail::Hybrid { is_stride, .. } = outcome.detail else { unreachable!() };
    assert!(is_stride);
}

/// Scenario 6: two PCs whose VHT entries are both still at their initial
/// (never-updated) value-history pattern collide on PHT slot 0 under
/// `xor=0`. A predicting lookup on the PC that didn't train that slot
/// counts as one aliased lookup.
#[rstest::rstest]
fn aliased_pht_probe_is_counted_once(mut small_two_level: Predictor) {
    let p = &mut small_two_level;
    let owner = 0x500;
    let other = 0x504;

    // Train `owner`'s slot 0 (its VHP never advances away from 0 at
    // install) until it predicts and claims the PHT slot's tag.
    for _ in 0..8 {
        let outcome = p.lookup(owner, Op::Load);
        p.update(owner, Op::Load, 5, &outcome);
    }
    assert_eq!(p.stats().alias, 0);

    // Install `other`'s VHT entry with a single miss — its VHP is also
    // still 0, so it probes the same PHT slot `owner` now owns.
    let outcome = p.lookup(other, Op::Load);
    assert_eq!(outcome.no_pred, no_pred::L1_MISS);
    p.update(other, Op::Load, 1, &outcome);

    let outcome = p.lookup(other, Op::Load);
    assert_eq!(outcome.no_pred, no_pred::PREDICTED);
    let TraceDetail::TwoLevel { aliased_addr, .. } = outcome.detail else { unreachable!() };
    assert_eq!(aliased_addr, Some(owner));
    assert_eq!(p.stats().alias, 1);
}
