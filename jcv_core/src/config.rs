use serde::{Deserialize, Serialize};

use crate::compare::{Stage, DEFAULT_RESCALE_DIVISOR};
use crate::error::{Error, Result};
use crate::transform::{DEFAULT_SCALE, MAX_SCALE};

/// Pass thresholds per stage; a stage passes when its maximum absolute
/// difference is strictly below the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageThresholds {
    pub dct: f64,
    pub quant: f64,
    pub zigzag: f64,
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            dct: 1000.0,
            quant: 2.0,
            zigzag: 2.0,
        }
    }
}

impl StageThresholds {
    pub fn for_stage(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Dct => self.dct,
            Stage::Quant => self.quant,
            Stage::Zigzag => self.zigzag,
        }
    }
}

/// Tunables of the reference pipeline and comparator.
///
/// Every field falls back to its default when omitted from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fixed-point multiplier of the transform.
    pub scale: i64,
    /// Divisor reconciling hardware and software fixed-point scales.
    pub rescale_divisor: f64,
    pub thresholds: StageThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            rescale_divisor: DEFAULT_RESCALE_DIVISOR,
            thresholds: StageThresholds::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SCALE).contains(&self.scale) {
            return Err(Error::Config(format!(
                "scale must be in 1..={}, got {}",
                MAX_SCALE, self.scale
            )));
        }
        if !(self.rescale_divisor.is_finite() && self.rescale_divisor > 0.0) {
            return Err(Error::Config(format!(
                "rescale_divisor must be a positive number, got {}",
                self.rescale_divisor
            )));
        }
        Ok(())
    }
}
