//! Hardware-vs-software comparison with fixed-point scale reconciliation.
//!
//! The two implementations collapse their fixed-point factors at different
//! stages. Transform dumps from the hardware carry the extra factor, so the
//! hardware side is divided; from quantization on, the software values still
//! carry the ×10⁴ inherited from the transform, so the software side is
//! divided instead. Division is real-valued, never truncated.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::block::Component;
use crate::error::{Error, Result};

/// Divisor that brings the two sides onto the same scale.
pub const DEFAULT_RESCALE_DIVISOR: f64 = 10_000.0;

// ── Stage ──────────────────────────────────────────────────────────────────

/// Pipeline stage a comparison belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Dct,
    Quant,
    Zigzag,
}

/// Operand that gets divided before differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Hardware,
    Software,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Dct, Stage::Quant, Stage::Zigzag];

    /// Directory name of the hardware dumps for this stage.
    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Dct => "DCT",
            Stage::Quant => "Quant",
            Stage::Zigzag => "Zigzag",
        }
    }

    /// Stage name as used in reports, e.g. `Cb_Quant`.
    pub fn stage_name(self, component: Component) -> String {
        format!("{}_{}", component, self.dir_name())
    }

    /// Recognise the stage from a free-form stage name, case-insensitively.
    pub fn recognise(name: &str) -> Option<Stage> {
        let lower = name.to_ascii_lowercase();
        if lower.contains("dct") {
            Some(Stage::Dct)
        } else if lower.contains("quant") {
            Some(Stage::Quant)
        } else if lower.contains("zigzag") || lower.contains("scan") {
            Some(Stage::Zigzag)
        } else {
            None
        }
    }

    pub fn rescaled_side(self) -> Side {
        match self {
            Stage::Dct => Side::Hardware,
            Stage::Quant | Stage::Zigzag => Side::Software,
        }
    }
}

// ── Results ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    fn of(values: &[f64]) -> Self {
        values.iter().fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |r, &v| Self {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        )
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Quantitative divergence between the rescaled operands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Divergence {
    pub hardware: ValueRange,
    pub software: ValueRange,
    pub max_abs_diff: f64,
    /// First index at which `max_abs_diff` occurs.
    pub worst_index: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    Pass(Divergence),
    Fail(Divergence),
    /// The operands could not be compared at all.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub stage: String,
    pub outcome: Outcome,
}

impl ComparisonResult {
    pub fn error<S: Into<String>>(stage: &str, msg: S) -> Self {
        Self {
            stage: stage.to_string(),
            outcome: Outcome::Error(msg.into()),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.outcome, Outcome::Pass(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self.outcome, Outcome::Fail(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    pub fn divergence(&self) -> Option<&Divergence> {
        match &self.outcome {
            Outcome::Pass(d) | Outcome::Fail(d) => Some(d),
            Outcome::Error(_) => None,
        }
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Pass(d) => write!(
                f,
                "{}: PASS (max diff {} < {})",
                self.stage, d.max_abs_diff, d.threshold
            ),
            Outcome::Fail(d) => write!(
                f,
                "{}: FAIL (max diff {} >= {} at index {}); hardware range {}, software range {}",
                self.stage, d.max_abs_diff, d.threshold, d.worst_index, d.hardware, d.software
            ),
            Outcome::Error(msg) => write!(f, "{}: ERROR ({})", self.stage, msg),
        }
    }
}

// ── Comparator ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    divisor: f64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_RESCALE_DIVISOR,
        }
    }
}

impl Comparator {
    pub fn new(divisor: f64) -> Self {
        Self { divisor }
    }

    pub fn divisor(&self) -> f64 {
        self.divisor
    }

    /// Compare flattened operands under the rescaling rule for `stage`.
    ///
    /// Never fails: shape problems become [`Outcome::Error`].
    pub fn compare(
        &self,
        hardware: &[f64],
        software: &[f64],
        stage: &str,
        threshold: f64,
    ) -> ComparisonResult {
        let outcome = match self.diverge(hardware, software, stage, threshold) {
            Ok(d) if d.max_abs_diff < threshold => Outcome::Pass(d),
            Ok(d) => Outcome::Fail(d),
            Err(e) => Outcome::Error(e.to_string()),
        };
        let result = ComparisonResult {
            stage: stage.to_string(),
            outcome,
        };
        debug!(%result, "compared");
        result
    }

    /// Like [`compare`](Self::compare), parsing the hardware side from dump text.
    pub fn compare_dump(
        &self,
        hardware: &str,
        software: &[f64],
        stage: &str,
        threshold: f64,
    ) -> ComparisonResult {
        match parse_numeric_dump(hardware) {
            Ok(values) => self.compare(&values, software, stage, threshold),
            Err(e) => ComparisonResult::error(stage, e.to_string()),
        }
    }

    fn diverge(
        &self,
        hardware: &[f64],
        software: &[f64],
        stage: &str,
        threshold: f64,
    ) -> Result<Divergence> {
        if hardware.len() != software.len() {
            return Err(Error::ShapeMismatch {
                expected: software.len(),
                actual: hardware.len(),
            });
        }
        if hardware.is_empty() {
            return Err(Error::EmptyInput("no values to compare"));
        }
        if hardware.iter().chain(software).any(|v| !v.is_finite()) {
            return Err(Error::parse("non-finite value in operands"));
        }

        let rescale =
            |values: &[f64]| -> Vec<f64> { values.iter().map(|v| v / self.divisor).collect() };
        let (hw, sw) = match Stage::recognise(stage).map(Stage::rescaled_side) {
            Some(Side::Hardware) => (rescale(hardware), software.to_vec()),
            Some(Side::Software) => (hardware.to_vec(), rescale(software)),
            None => (hardware.to_vec(), software.to_vec()),
        };

        let (worst_index, max_abs_diff) = hw
            .iter()
            .zip(&sw)
            .map(|(h, s)| (h - s).abs())
            .enumerate()
            .fold((0, 0.0f64), |best, (i, d)| if d > best.1 { (i, d) } else { best });

        Ok(Divergence {
            hardware: ValueRange::of(&hw),
            software: ValueRange::of(&sw),
            max_abs_diff,
            worst_index,
            threshold,
        })
    }
}

/// Compare with the default rescale divisor.
pub fn compare(
    hardware: &[f64],
    software: &[f64],
    stage: &str,
    threshold: f64,
) -> ComparisonResult {
    Comparator::default().compare(hardware, software, stage, threshold)
}

/// Parse whitespace-delimited numbers, flattening any row structure.
pub fn parse_numeric_dump(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::parse(format!("not a number: {:?}", tok)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dct_divides_the_hardware_side() {
        let r = compare(&[10_000.0, 20_000.0, 30_000.0], &[1.0, 2.0, 3.0], "Y_DCT", 1000.0);
        assert!(r.is_pass(), "{r}");
        assert_eq!(r.divergence().unwrap().max_abs_diff, 0.0);

        // inverted operands must not line up
        let r = compare(&[1.0, 2.0, 3.0], &[10_000.0, 20_000.0, 30_000.0], "Y_DCT", 1.0);
        assert!(r.is_fail(), "{r}");
    }

    #[test]
    fn quant_divides_the_software_side() {
        let r = compare(&[1.0, 2.0, 3.0], &[10_000.0, 20_000.0, 30_000.0], "Cb_Quant", 0.5);
        assert!(r.is_pass(), "{r}");

        let r = compare(&[10_000.0, 20_000.0, 30_000.0], &[1.0, 2.0, 3.0], "Cb_Quant", 0.5);
        assert!(r.is_fail(), "{r}");
    }

    #[test]
    fn zigzag_divides_the_software_side() {
        let r = compare(&[5.0, -1.0], &[50_000.0, -10_000.0], "Cr_Zigzag", 0.5);
        assert!(r.is_pass(), "{r}");
        assert_eq!(Stage::recognise("cr_zigzag"), Some(Stage::Zigzag));
        assert_eq!(Stage::Zigzag.rescaled_side(), Side::Software);
    }

    #[test]
    fn unrecognised_stage_compares_raw_values() {
        assert_eq!(Stage::recognise("Y_RLE"), None);
        let r = compare(&[10.0, 20.0], &[10.0, 21.0], "Y_RLE", 2.0);
        assert!(r.is_pass());
        assert_eq!(r.divergence().unwrap().max_abs_diff, 1.0);
    }

    #[test]
    fn threshold_is_strict() {
        let r = compare(&[0.0, 0.0], &[0.0, 2.0], "raw", 2.0);
        assert!(r.is_fail());
        let d = r.divergence().unwrap();
        assert_eq!(d.worst_index, 1);
        assert_eq!(d.software, ValueRange { min: 0.0, max: 2.0 });
    }

    #[test]
    fn rescaling_does_not_truncate() {
        let r = compare(&[15_000.0], &[1.0], "Y_DCT", 0.6);
        assert!(r.is_pass());
        assert_eq!(r.divergence().unwrap().max_abs_diff, 0.5);
    }

    #[test]
    fn length_mismatch_is_an_error_outcome() {
        let r = compare(&[1.0, 2.0], &[1.0], "Y_DCT", 1000.0);
        assert!(r.is_error());
        assert!(r.to_string().contains("ERROR"));
    }

    #[test]
    fn empty_operands_are_an_error_outcome() {
        assert!(compare(&[], &[], "Y_DCT", 1.0).is_error());
    }

    #[test]
    fn unparsable_dump_is_an_error_outcome() {
        let c = Comparator::default();
        assert!(c.compare_dump("1 2 x", &[1.0, 2.0, 3.0], "Y_Quant", 1.0).is_error());
        let r = c.compare_dump("1 2\n3 4\n", &[1e4, 2e4, 3e4, 4e4], "Y_Quant", 1.0);
        assert!(r.is_pass(), "{r}");
    }

    #[test]
    fn failure_line_reports_ranges() {
        let r = compare(&[0.0, 100.0], &[0.0, 0.0], "raw", 1.0);
        let line = r.to_string();
        assert!(line.starts_with("raw: FAIL"));
        assert!(line.contains("hardware range [0, 100]"));
        assert!(line.contains("software range [0, 0]"));
    }

    #[test]
    fn stage_names_combine_component_and_stage() {
        assert_eq!(Stage::Dct.stage_name(Component::Y), "Y_DCT");
        assert_eq!(Stage::Quant.stage_name(Component::Cb), "Cb_Quant");
        assert_eq!(Stage::recognise("Y_DCT"), Some(Stage::Dct));
    }
}
