//! Per-instruction trace line formatting.
//!
//! The engine's textual trace is split into two lines, mirroring the
//! original two call sites: a one-line eligibility announcement printed
//! for every instruction (`trace_inst` upstream), and — only for
//! value-predictable instructions — a second, indented line describing the
//! table state the lookup consulted (`dpred_trace` upstream). Both lines
//! reflect state as of the lookup, before the matching `update` call
//! mutates any table.

use crate::predictor::StrideState;

/// Snapshot of the table state a lookup consulted, captured before
/// `update` runs, so the trace line it feeds can describe what the
/// prediction was actually based on.
#[derive(Clone, Debug)]
pub enum TraceDetail {
    /// The instruction was not eligible for value prediction at all.
    Ineligible,
    /// Last-value predictor: CT counter and VPT value, each `None` on a
    /// table miss.
    Last {
        /// Classification counter read from the CT, if present.
        ct_counter: Option<u8>,
        /// Value read from the VPT, if present.
        vpt_value: Option<i64>,
    },
    /// Stride predictor: state and current stride, `None` on a VHT miss.
    Stride {
        /// Stride state machine state, if the VHT entry exists.
        state: Option<StrideState>,
        /// Current stride, if the VHT entry exists.
        stride: Option<i64>,
    },
    /// Two-level predictor: VHT history plus the PHT counters it probed.
    TwoLevel {
        /// VHT value history, `None` on a VHT miss.
        vht_values: Option<Vec<i64>>,
        /// PHT index derived from the VHP alone.
        vhp_index: Option<usize>,
        /// PHT index derived from VHP xor'd with PC bits, if xor indexing
        /// is enabled.
        vhp_xor_index: Option<usize>,
        /// PHT counters at the probed index.
        pht_counters: Option<Vec<u8>>,
        /// PC tag of the probed PHT slot, if it differs from this lookup's
        /// PC (i.e. an aliased probe).
        aliased_addr: Option<u64>,
    },
    /// Hybrid predictor: as [`TraceDetail::TwoLevel`], plus whether this
    /// lookup fell back to the stride path and that path's state.
    Hybrid {
        /// Whether this lookup used the stride fallback rather than the
        /// two-level path.
        is_stride: bool,
        /// Stride state machine state, when the stride fallback applies.
        stride_state: Option<StrideState>,
        /// VHT value history, `None` on a VHT miss.
        vht_values: Option<Vec<i64>>,
        /// PHT index derived from the VHP alone.
        vhp_index: Option<usize>,
        /// PHT index derived from VHP xor'd with PC bits, if enabled.
        vhp_xor_index: Option<usize>,
        /// PHT counters at the probed index.
        pht_counters: Option<Vec<u8>>,
        /// PC tag of the probed PHT slot, if aliased.
        aliased_addr: Option<u64>,
    },
}

/// Everything a `lookup` call needs to hand back: the predicted value (or
/// the `0` placeholder when none was made), the `no_pred` classification
/// code, and the table snapshot for tracing.
#[derive(Clone, Debug)]
pub struct LookupOutcome {
    /// Predicted value, or `0` when `no_pred != 0`.
    pub predicted_value: i64,
    /// Classification code: `0` predicted, `1` suppressed by
    /// counter/state, `2`/`3` table miss, `4` instruction ineligible.
    pub no_pred: u8,
    /// Table snapshot for trace formatting.
    pub detail: TraceDetail,
}

/// The first trace line, printed for every instruction regardless of
/// eligibility.
#[must_use]
pub fn eligibility_line(pc: u64, op_name: &str, operands: &str, eligible: bool) -> String {
    let label = if eligible { "pred_inst" } else { "no_pred_inst" };
    format!("{pc:#x} {op_name} {operands} - {label}")
}

fn push_values(line: &mut String, values: &[i64]) {
    for value in values {
        line.push_str(&value.to_string());
        line.push(' ');
    }
}

fn push_counters(line: &mut String, counters: &[u8]) {
    for counter in counters {
        line.push_str(&counter.to_string());
        line.push(' ');
    }
}

/// The second trace line, only produced for eligible instructions.
#[must_use]
pub fn prediction_line(outcome: &LookupOutcome, resolved: i64) -> Option<String> {
    if matches!(outcome.detail, TraceDetail::Ineligible) {
        return None;
    }

    let mut line = String::from("   ");
    if outcome.no_pred == 0 {
        let verdict = if outcome.predicted_value == resolved { "CRT" } else { "INCRT" };
        line.push_str(&format!("{verdict} pDATA:{} rDATA:{resolved} - ", outcome.predicted_value));
    } else {
        line.push_str(&format!("NOT_PRED rDATA:{resolved} - "));
    }

    match &outcome.detail {
        TraceDetail::Last { ct_counter, vpt_value } => {
            match ct_counter {
                Some(c) => line.push_str(&format!("CT_cnt:{c} ")),
                None => line.push_str("CT MISS "),
            }
            match vpt_value {
                Some(v) => line.push_str(&format!("VPT_data: {v} ")),
                None => line.push_str("VPT MISS "),
            }
        }
        TraceDetail::Stride { state, stride } => match (state, stride) {
            (Some(state), Some(stride)) => line.push_str(&format!("state: {state} stride: {stride} ")),
            _ => line.push_str("VHT MISS "),
        },
        TraceDetail::TwoLevel { vht_values, vhp_index, vhp_xor_index, pht_counters, aliased_addr } => {
            push_two_level(&mut line, vht_values, *vhp_index, *vhp_xor_index, pht_counters, *aliased_addr);
        }
        TraceDetail::Hybrid {
            is_stride,
            stride_state,
            vht_values,
            vhp_index,
            vhp_xor_index,
            pht_counters,
            aliased_addr,
        } => {
            if *is_stride {
                if let Some(state) = stride_state {
                    line.push_str(&format!("{state} "));
                }
            }
            push_two_level(&mut line, vht_values, *vhp_index, *vhp_xor_index, pht_counters, *aliased_addr);
        }
        TraceDetail::Ineligible => unreachable!("filtered above"),
    }

    Some(line)
}

fn push_two_level(
    line: &mut String,
    vht_values: &Option<Vec<i64>>,
    vhp_index: Option<usize>,
    vhp_xor_index: Option<usize>,
    pht_counters: &Option<Vec<u8>>,
    aliased_addr: Option<u64>,
) {
    let Some(values) = vht_values else {
        line.push_str("VHT MISS ");
        return;
    };
    push_values(line, values);
    if let Some(index) = vhp_index {
        line.push_str(&format!("vhp:{index:x} - "));
    }
    if let Some(index) = vhp_xor_index {
        line.push_str(&format!("vhp^pc: {index:x} - "));
    }
    if let Some(addr) = aliased_addr {
        line.push_str(&format!("ALIAS({addr:x}) "));
    }
    if let Some(counters) = pht_counters {
        push_counters(line, counters);
    }
}
