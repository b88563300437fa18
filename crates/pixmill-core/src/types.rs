//! Core data types for jobs and their outcomes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PipelineError;
use crate::transform::TransformKind;

/// One unit of work: decode `source`, apply `kind`, write `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformJob {
    /// Image inside the extraction tree
    pub source: PathBuf,

    /// Where the transformed PNG is written
    pub destination: PathBuf,

    /// Which transform to apply
    pub kind: TransformKind,
}

/// Whether a job produced its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Succeeded,
    Failed,
}

/// The settled result of a single job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: TransformKind,
    pub status: JobStatus,

    /// Raster width, once decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Raster height, once decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Encoded output size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,

    /// Stage that failed ("decode", "encode", "write", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Error message for failed jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall time spent on the job
    pub elapsed_ms: u64,
}

impl JobOutcome {
    /// Outcome for a job that wrote its output.
    pub fn succeeded(job: &TransformJob, output: &JobOutput, elapsed_ms: u64) -> Self {
        Self {
            source: job.source.clone(),
            destination: job.destination.clone(),
            kind: job.kind,
            status: JobStatus::Succeeded,
            width: Some(output.width),
            height: Some(output.height),
            bytes_written: Some(output.bytes_written),
            stage: None,
            error: None,
            elapsed_ms,
        }
    }

    /// Outcome for a job that failed at some stage.
    pub fn failed(job: &TransformJob, error: &PipelineError, elapsed_ms: u64) -> Self {
        Self {
            source: job.source.clone(),
            destination: job.destination.clone(),
            kind: job.kind,
            status: JobStatus::Failed,
            width: None,
            height: None,
            bytes_written: None,
            stage: Some(error.stage().to_string()),
            error: Some(error.to_string()),
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Succeeded
    }
}

/// What a successful job produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutput {
    pub width: u32,
    pub height: u32,
    pub bytes_written: u64,
}

/// Aggregated results of a batch, available once every job has settled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of source images the jobs were planned from
    pub images: usize,

    /// Every job outcome, in completion order
    pub outcomes: Vec<JobOutcome>,

    /// Wall time for the job phase
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Failed outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// True when no job failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Total bytes written by successful jobs.
    pub fn bytes_written(&self) -> u64 {
        self.outcomes.iter().filter_map(|o| o.bytes_written).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(kind: TransformKind) -> TransformJob {
        TransformJob {
            source: PathBuf::from("/in/a.png"),
            destination: PathBuf::from("/out/a.png"),
            kind,
        }
    }

    #[test]
    fn test_report_counts() {
        let ok = JobOutcome::succeeded(
            &job(TransformKind::Sepia),
            &JobOutput {
                width: 2,
                height: 3,
                bytes_written: 120,
            },
            5,
        );
        let err = PipelineError::FileNotFound(PathBuf::from("/in/a.png"));
        let bad = JobOutcome::failed(&job(TransformKind::Dither), &err, 1);

        let report = BatchReport {
            images: 1,
            outcomes: vec![ok, bad],
            elapsed_ms: 6,
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.bytes_written(), 120);

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, TransformKind::Dither);
        assert_eq!(failures[0].stage.as_deref(), Some("decode"));
    }

    #[test]
    fn test_outcome_serialization_skips_empty_fields() {
        let ok = JobOutcome::succeeded(
            &job(TransformKind::Grayscale),
            &JobOutput {
                width: 1,
                height: 1,
                bytes_written: 70,
            },
            0,
        );
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains("\"status\":\"succeeded\""));
        assert!(json.contains("\"kind\":\"grayscale\""));
        assert!(!json.contains("\"error\""));
    }
}
