use crate::collectors::MetricSample;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cpu => "CPU",
            Self::Memory => "Memory",
            Self::Disk => "Disk",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub kind: MetricKind,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Ok,
    Alert,
}

impl CheckResult {
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// A reading equal to the threshold is healthy; only a strictly greater one
/// breaches. Out-of-range readings are compared as they are.
pub fn evaluate(sample: &MetricSample, threshold: &Threshold) -> CheckResult {
    match sample.percent() {
        Some(percent) if percent > threshold.percent => CheckResult::Alert,
        _ => CheckResult::Ok,
    }
}
