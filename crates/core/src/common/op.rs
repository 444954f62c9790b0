//! The host-provided instruction classification.
//!
//! The engine never decodes instructions itself; a calling simulator hands
//! it an [`Op`] alongside the PC on every `lookup`/`update`. This is the
//! smallest interface needed to realize the eligibility predicate
//! (`is_PRED` in the original implementation): integer-compute and load
//! instructions are predictable, long-latency ops (mul/div/fp) are not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Op {
    /// Integer ALU operation writing a general register.
    #[default]
    IntAlu,
    /// Load instruction writing a general register.
    Load,
    /// Long-latency operation (mul/div/fp/etc.) — excluded from prediction.
    LongLatency,
    /// Store instruction (no destination register, never predicted).
    Store,
    /// Branch or jump instruction.
    Branch,
    /// System instruction (ECALL, CSR access, fence, etc.).
    System,
}

impl Op {
    /// Whether this instruction's result is a candidate for value prediction.
    ///
    /// Mirrors `is_PRED`: integer-compute or load, and not long-latency.
    #[must_use]
    pub const fn is_value_predictable(self) -> bool {
        matches!(self, Self::IntAlu | Self::Load)
    }
}
