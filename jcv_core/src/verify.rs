use serde::Serialize;
use tracing::{info, warn};

use crate::block::{Block, Component};
use crate::compare::{Comparator, ComparisonResult, Stage};
use crate::config::{PipelineConfig, StageThresholds};
use crate::error::Result;
use crate::quant::{quantize, QuantTable};
use crate::scan::{scan, ScanSequence};
use crate::transform::Transform;

/// Source of hardware stage dumps.
///
/// Implementations locate the dump for one (component, stage, block) triple
/// and return its values flattened in row-major order. A missing or
/// unreadable dump is an `Err`; the verifier turns it into an error outcome
/// for that stage only.
pub trait DumpSource {
    fn stage_dump(&self, component: Component, stage: Stage, block: usize) -> Result<Vec<f64>>;
}

/// Software reference value at every stage for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceStages {
    pub dct: Block,
    pub quant: Block,
    pub zigzag: ScanSequence,
}

impl ReferenceStages {
    pub fn values(&self, stage: Stage) -> Vec<f64> {
        match stage {
            Stage::Dct => self.dct.to_f64_vec(),
            Stage::Quant => self.quant.to_f64_vec(),
            Stage::Zigzag => self.zigzag.to_f64_vec(),
        }
    }
}

/// One stage comparison of one block.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub component: Component,
    pub block: usize,
    #[serde(flatten)]
    pub result: ComparisonResult,
}

/// Aggregated outcomes across all components, blocks and stages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub stages: Vec<StageReport>,
}

impl VerificationReport {
    pub fn passed(&self) -> usize {
        self.stages.iter().filter(|s| s.result.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.stages.iter().filter(|s| s.result.is_fail()).count()
    }

    pub fn errored(&self) -> usize {
        self.stages.iter().filter(|s| s.result.is_error()).count()
    }

    pub fn all_passed(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(|s| s.result.is_pass())
    }
}

/// Runs the reference pipeline and diffs every stage against the hardware.
#[derive(Debug, Clone)]
pub struct Verifier {
    transform: Transform,
    comparator: Comparator,
    thresholds: StageThresholds,
}

impl Verifier {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transform: Transform::new(config.scale)?,
            comparator: Comparator::new(config.rescale_divisor),
            thresholds: config.thresholds,
        })
    }

    /// Transform → quantize → scan one level-shifted sample block.
    pub fn reference(&self, component: Component, block: &Block) -> ReferenceStages {
        let dct = self.transform.forward(block);
        let quant = quantize(&dct, QuantTable::for_component(component));
        let zigzag = scan(&quant);
        ReferenceStages { dct, quant, zigzag }
    }

    pub fn verify_block<S: DumpSource + ?Sized>(
        &self,
        source: &S,
        component: Component,
        index: usize,
        block: &Block,
    ) -> Vec<StageReport> {
        let reference = self.reference(component, block);
        Stage::ALL
            .iter()
            .map(|&stage| {
                let name = stage.stage_name(component);
                let result = match source.stage_dump(component, stage, index) {
                    Ok(hardware) => self.comparator.compare(
                        &hardware,
                        &reference.values(stage),
                        &name,
                        self.thresholds.for_stage(stage),
                    ),
                    Err(e) => {
                        warn!(
                            stage = %name,
                            block = index,
                            error = %e,
                            "hardware dump unavailable"
                        );
                        ComparisonResult::error(&name, e.to_string())
                    }
                };
                StageReport {
                    component,
                    block: index,
                    result,
                }
            })
            .collect()
    }

    /// Verify every block of one component, in index order.
    pub fn verify_component<S: DumpSource + ?Sized>(
        &self,
        source: &S,
        component: Component,
        blocks: &[Block],
        report: &mut VerificationReport,
    ) {
        for (index, block) in blocks.iter().enumerate() {
            report.stages.extend(self.verify_block(source, component, index, block));
        }
        info!(
            component = %component,
            blocks = blocks.len(),
            "verified component"
        );
    }
}
