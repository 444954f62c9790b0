//! Configuration for the data value prediction engine.
//!
//! A [`DvpConfig`] selects one predictor [`PredictorClass`] and carries the
//! per-class sizing knobs for all four, mirroring how the original
//! command-line driver registered one `-dpred:*` option group per class
//! regardless of which was active. Only the selected class's sub-config is
//! validated and built; the others are ignored.
//!
//! ```
//! use dvp_core::config::DvpConfig;
//!
//! let json = r#"{"class": "2lev", "two_level": {"hist": 8, "xor": 8}}"#;
//! let config: DvpConfig = serde_json::from_str(json).unwrap();
//! assert_eq!(config.two_level.hist, 8);
//! assert_eq!(config.last.ct_size, 1024); // untouched classes keep their defaults
//! ```

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;

/// Default configuration constants, one group per predictor class.
///
/// Values match the command-line defaults of the original analyzer
/// (`sim-dpred`'s `last_config`/`stride_config`/`two_config`/
/// `hybrid_config`).
pub mod defaults {
    /// Default CT (classification table) size for the last-value predictor.
    pub const LAST_CT_SIZE: u32 = 1024;
    /// Default CT counter width; only 2 is implemented.
    pub const LAST_COUNTER_SIZE: u32 = 2;
    /// Default VPT (value prediction table) size for the last-value predictor.
    pub const LAST_VPT_SIZE: u32 = 4096;
    /// Default VPT history depth (only depth 1 is fully implemented upstream).
    pub const LAST_HIST: u32 = 1;

    /// Default VHT size for the stride predictor.
    pub const STRIDE_VHT_SIZE: u32 = 4096;

    /// Default VHT size for the two-level predictor.
    pub const TWO_LEVEL_VHT_SIZE: u32 = 4096;
    /// Default PHT saturating-counter threshold for the two-level predictor.
    pub const TWO_LEVEL_THRESHOLD: u32 = 3;
    /// Default PHT size for the two-level predictor.
    pub const TWO_LEVEL_PHT_SIZE: u32 = 4096;
    /// Default VHT history depth for the two-level predictor.
    pub const TWO_LEVEL_HIST: u32 = 4;
    /// Default VHP/PC xor mask selector (0 disables xor indexing).
    pub const TWO_LEVEL_XOR: u32 = 0;

    /// Default VHT size for the hybrid predictor.
    pub const HYBRID_VHT_SIZE: u32 = 4096;
    /// Default PHT saturating-counter threshold for the hybrid predictor.
    pub const HYBRID_THRESHOLD: u32 = 6;
    /// Default PHT size for the hybrid predictor.
    pub const HYBRID_PHT_SIZE: u32 = 4096;
    /// Default VHT history depth for the hybrid predictor.
    pub const HYBRID_HIST: u32 = 4;
    /// Default VHP/PC xor mask selector (0 disables xor indexing).
    pub const HYBRID_XOR: u32 = 0;
}

/// Which predictor class a [`DvpConfig`] builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorClass {
    /// Last-value predictor (classification counter + single-value table).
    #[default]
    Last,
    /// Stride-based predictor (init/transient/steady state machine).
    Stride,
    /// Two-level value history / pattern history predictor.
    #[serde(rename = "2lev", alias = "two_level")]
    TwoLevel,
    /// Hybrid two-level + stride predictor.
    Hybrid,
}

/// Last-value predictor sizing: CT (classification table) and VPT (value
/// prediction table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LastConfig {
    /// Entries in the classification table. Must be a power of two.
    #[serde(default = "LastConfig::default_ct_size")]
    pub ct_size: u32,
    /// CT counter width in bits. Only 2 is implemented.
    #[serde(default = "LastConfig::default_counter_size")]
    pub counter_size: u32,
    /// Entries in the value prediction table. Must be a power of two.
    #[serde(default = "LastConfig::default_vpt_size")]
    pub vpt_size: u32,
    /// VPT history depth. Only depth 1 is fully used by the lookup/update
    /// logic (an inherited limitation of the upstream implementation).
    #[serde(default = "LastConfig::default_hist")]
    pub hist: u32,
}

impl LastConfig {
    const fn default_ct_size() -> u32 {
        defaults::LAST_CT_SIZE
    }
    const fn default_counter_size() -> u32 {
        defaults::LAST_COUNTER_SIZE
    }
    const fn default_vpt_size() -> u32 {
        defaults::LAST_VPT_SIZE
    }
    const fn default_hist() -> u32 {
        defaults::LAST_HIST
    }
}

impl Default for LastConfig {
    fn default() -> Self {
        Self {
            ct_size: defaults::LAST_CT_SIZE,
            counter_size: defaults::LAST_COUNTER_SIZE,
            vpt_size: defaults::LAST_VPT_SIZE,
            hist: defaults::LAST_HIST,
        }
    }
}

/// Stride predictor sizing: a single VHT (value history table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StrideConfig {
    /// Entries in the value history table. Must be a power of two.
    #[serde(default = "StrideConfig::default_vht_size")]
    pub vht_size: u32,
}

impl StrideConfig {
    const fn default_vht_size() -> u32 {
        defaults::STRIDE_VHT_SIZE
    }
}

impl Default for StrideConfig {
    fn default() -> Self {
        Self {
            vht_size: defaults::STRIDE_VHT_SIZE,
        }
    }
}

/// Two-level predictor sizing: VHT + PHT plus the pattern-saturation
/// threshold, history depth and the optional PC-xor index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TwoLevelConfig {
    /// Entries in the value history table. Must be a power of two.
    #[serde(default = "TwoLevelConfig::default_vht_size")]
    pub vht_size: u32,
    /// PHT saturating-counter threshold a value needs to reach to be
    /// predicted.
    #[serde(default = "TwoLevelConfig::default_threshold")]
    pub threshold: u32,
    /// Entries in the pattern history table. Must be a power of two.
    #[serde(default = "TwoLevelConfig::default_pht_size")]
    pub pht_size: u32,
    /// VHT history depth; must be one of `{2,4,6,8,10,12,14,16}`, since the
    /// VHP shift width is only defined for those depths.
    #[serde(default = "TwoLevelConfig::default_hist")]
    pub hist: u32,
    /// PC-xor mask selector for PHT indexing: `0` (disabled) or one of
    /// `{6,8,12,16}` low PC bits to xor into the VHP-derived index.
    #[serde(default = "TwoLevelConfig::default_xor")]
    pub xor: u32,
}

impl TwoLevelConfig {
    const fn default_vht_size() -> u32 {
        defaults::TWO_LEVEL_VHT_SIZE
    }
    const fn default_threshold() -> u32 {
        defaults::TWO_LEVEL_THRESHOLD
    }
    const fn default_pht_size() -> u32 {
        defaults::TWO_LEVEL_PHT_SIZE
    }
    const fn default_hist() -> u32 {
        defaults::TWO_LEVEL_HIST
    }
    const fn default_xor() -> u32 {
        defaults::TWO_LEVEL_XOR
    }
}

impl Default for TwoLevelConfig {
    fn default() -> Self {
        Self {
            vht_size: defaults::TWO_LEVEL_VHT_SIZE,
            threshold: defaults::TWO_LEVEL_THRESHOLD,
            pht_size: defaults::TWO_LEVEL_PHT_SIZE,
            hist: defaults::TWO_LEVEL_HIST,
            xor: defaults::TWO_LEVEL_XOR,
        }
    }
}

/// Hybrid predictor sizing. Same shape as [`TwoLevelConfig`] — the hybrid
/// class falls back from two-level to stride prediction using the same
/// VHT/PHT tables rather than a separate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct HybridConfig {
    /// Entries in the value history table. Must be a power of two.
    #[serde(default = "HybridConfig::default_vht_size")]
    pub vht_size: u32,
    /// PHT saturating-counter threshold a value needs to reach to be
    /// predicted via the two-level path before falling back to stride.
    #[serde(default = "HybridConfig::default_threshold")]
    pub threshold: u32,
    /// Entries in the pattern history table. Must be a power of two.
    #[serde(default = "HybridConfig::default_pht_size")]
    pub pht_size: u32,
    /// VHT history depth; must be one of `{2,4,6,8,10,12,14,16}`.
    #[serde(default = "HybridConfig::default_hist")]
    pub hist: u32,
    /// PC-xor mask selector for PHT indexing: `0` (disabled) or one of
    /// `{6,8,12,16}`.
    #[serde(default = "HybridConfig::default_xor")]
    pub xor: u32,
}

impl HybridConfig {
    const fn default_vht_size() -> u32 {
        defaults::HYBRID_VHT_SIZE
    }
    const fn default_threshold() -> u32 {
        defaults::HYBRID_THRESHOLD
    }
    const fn default_pht_size() -> u32 {
        defaults::HYBRID_PHT_SIZE
    }
    const fn default_hist() -> u32 {
        defaults::HYBRID_HIST
    }
    const fn default_xor() -> u32 {
        defaults::HYBRID_XOR
    }
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            vht_size: defaults::HYBRID_VHT_SIZE,
            threshold: defaults::HYBRID_THRESHOLD,
            pht_size: defaults::HYBRID_PHT_SIZE,
            hist: defaults::HYBRID_HIST,
            xor: defaults::HYBRID_XOR,
        }
    }
}

/// Root configuration: which class to build, and every class's sizing
/// knobs (only the selected one is validated/used).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DvpConfig {
    /// Predictor class to build.
    #[serde(default)]
    pub class: PredictorClass,
    /// Last-value predictor sizing, used only if `class == Last`.
    #[serde(default)]
    pub last: LastConfig,
    /// Stride predictor sizing, used only if `class == Stride`.
    #[serde(default)]
    pub stride: StrideConfig,
    /// Two-level predictor sizing, used only if `class == TwoLevel`.
    #[serde(default, rename = "two_level", alias = "2lev")]
    pub two_level: TwoLevelConfig,
    /// Hybrid predictor sizing, used only if `class == Hybrid`.
    #[serde(default)]
    pub hybrid: HybridConfig,
    /// Whether per-instruction trace lines are emitted.
    #[serde(default)]
    pub trace: bool,
}

/// Validates a two-level/hybrid history depth against the depths the VHP
/// shift-encoding supports.
pub(crate) fn validate_hist(hist: u32) -> Result<u32, ConfigError> {
    match hist {
        2 | 4 => Ok(2),
        6 | 8 => Ok(3),
        10 | 12 | 14 | 16 => Ok(4),
        other => Err(ConfigError::UnsupportedHist(other)),
    }
}

/// Validates a two-level/hybrid PC-xor mask selector.
pub(crate) fn validate_xor(xor: u32) -> Result<u32, ConfigError> {
    match xor {
        0 => Ok(0),
        6 => Ok(0x3f),
        8 => Ok(0xff),
        12 => Ok(0xfff),
        16 => Ok(0xffff),
        other => Err(ConfigError::UnsupportedXor(other)),
    }
}
