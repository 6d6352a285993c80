use log::info;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ReportError;
use crate::strength::{color_for_failure_rate, grade_for_failure_rate, ColorToken, Grade};

pub const DEFAULT_MAX_TH: f64 = 0.3;
pub const HIGHEST_RISK_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => f.write_str("PASS"),
            Status::Fail => f.write_str("FAIL"),
        }
    }
}

/// Coarse risk bucket relative to the pass threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateBand {
    Low,
    Medium,
    High,
}

pub fn rate_band(failure_rate: f64, max_th: f64) -> RateBand {
    if failure_rate < max_th * 50.0 {
        RateBand::Low
    } else if failure_rate < max_th * 100.0 {
        RateBand::Medium
    } else {
        RateBand::High
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleResult {
    pub module: String,
    pub failure_rate: f64,
    pub status: Status,
    pub threshold: f64,
    pub margin: f64,
    pub band: RateBand,
    pub grade: Grade,
    pub color: ColorToken,
}

impl ModuleResult {
    pub fn new(module: String, failure_rate: f64, max_th: f64) -> Self {
        let threshold = round(max_th * 100.0);
        let status = if failure_rate <= threshold {
            Status::Pass
        } else {
            Status::Fail
        };
        Self {
            module,
            failure_rate,
            status,
            threshold,
            margin: round((threshold - failure_rate).abs()),
            band: rate_band(failure_rate, max_th),
            grade: grade_for_failure_rate(failure_rate),
            color: color_for_failure_rate(failure_rate),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub max_th: f64,
    pub num_modules: u32,
    pub passing: u32,
    pub failing: u32,
    pub pass_rate: f64,
    /// Sorted by ascending failure rate.
    pub modules: Vec<ModuleResult>,
}

impl ScanReport {
    pub fn build<I>(results: I, max_th: f64) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut modules = Vec::new();
        for (module, failure_rate) in results {
            if !failure_rate.is_finite() {
                return Err(ReportError::NonFiniteRate(module));
            }
            modules.push(ModuleResult::new(module, failure_rate, max_th));
        }
        if modules.is_empty() {
            return Err(ReportError::EmptyInput);
        }
        modules.sort_by(|a, b| {
            a.failure_rate
                .partial_cmp(&b.failure_rate)
                .unwrap_or(Ordering::Equal)
        });

        let num_modules = modules.len() as u32;
        let failing = modules
            .iter()
            .filter(|row| row.status == Status::Fail)
            .count() as u32;
        let passing = num_modules - failing;
        let pass_rate = if num_modules > 0 {
            round(f64::from(passing) / f64::from(num_modules) * 100.0)
        } else {
            0.0
        };

        info!("scan report: {passing}/{num_modules} modules passing at max_th {max_th}");
        Ok(Self {
            max_th,
            num_modules,
            passing,
            failing,
            pass_rate,
            modules,
        })
    }

    /// The `n` rows with the highest failure rates, worst first.
    pub fn highest_risk(&self, n: usize) -> Vec<&ModuleResult> {
        self.modules.iter().rev().take(n).collect()
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .modules
            .iter()
            .map(|row| row.module.chars().count())
            .max()
            .unwrap_or(0)
            .max("Module".len());

        writeln!(f, "Threshold: {:.1}%", self.max_th * 100.0)?;
        writeln!(
            f,
            "{:<width$}  {:>12}  {:<6}  {:<5}  {:>7}",
            "Module", "Failure Rate", "Status", "Grade", "Margin"
        )?;
        for row in &self.modules {
            writeln!(
                f,
                "{:<width$}  {:>11.1}%  {:<6}  {:<5}  {:>6.1}%",
                row.module, row.failure_rate, row.status, row.grade, row.margin
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(
            f,
            "Total Passing: {}/{} ({:.1}%)",
            self.passing, self.num_modules, self.pass_rate
        )?;
        if self.failing > 0 {
            writeln!(f, "Failed Modules: {}", self.failing)?;
            writeln!(f)?;
            writeln!(f, "Highest Risk Modules:")?;
            for row in self.highest_risk(HIGHEST_RISK_COUNT) {
                writeln!(f, "- {}: {:.1}%", row.module, row.failure_rate)?;
            }
        }
        Ok(())
    }
}

/// Reads a JSON object mapping module name to failure rate.
pub fn load_results(path: &Path) -> Result<Vec<(String, f64)>, ReportError> {
    if !path.exists() {
        return Err(ReportError::FileNotFound(path.to_path_buf()));
    }
    let payload = fs::read_to_string(path)?;
    parse_results(&payload)
}

pub fn parse_results(payload: &str) -> Result<Vec<(String, f64)>, ReportError> {
    let results: BTreeMap<String, f64> = serde_json::from_str(payload)?;
    if results.is_empty() {
        return Err(ReportError::EmptyInput);
    }
    Ok(results.into_iter().collect())
}

pub fn save_report(path: &Path, report: &ScanReport) -> Result<(), ReportError> {
    let payload = serde_json::to_string_pretty(report)?;
    fs::write(path, payload + "\n")?;
    Ok(())
}

fn round(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
