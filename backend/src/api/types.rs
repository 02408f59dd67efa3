//! REST API types for the upload screen.
//!
//! `payload` is the exact body for the bulk upsert collaborator; the rest is
//! display metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ModuleGroup, TemplateKind};
use crate::transform::curriculum::SkippedRow;
use crate::transform::pipeline::{ImportReport, Inspection, UpsertPayload};

/// Response sent after an upload is imported.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub job_id: String,

    /// "ready" or "warning"
    pub status: String,

    pub imported_at: DateTime<Utc>,

    pub payload: UpsertPayload,

    pub modules: Vec<ModuleGroup>,

    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total_modules: usize,
    pub total_lessons: usize,
    pub total_minutes: u32,
    pub template: TemplateKind,
    pub file_info: FileMetadata,
    pub skipped_rows: Vec<SkippedRowInfo>,
    pub validation: ValidationStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub format: String,
    pub encoding: Option<String>,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub warnings: Vec<String>,
}

/// A dropped row, by spreadsheet line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRowInfo {
    pub line: usize,
    pub reason: String,
}

impl From<&SkippedRow> for SkippedRowInfo {
    fn from(skip: &SkippedRow) -> Self {
        Self {
            line: skip.line(),
            reason: skip.reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub lesson_index: usize,
    pub errors: Vec<String>,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        let warn = report.invalid_count > 0
            || !report.skipped.is_empty()
            || !report.table.warnings.is_empty();

        ImportResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if warn { "warning" } else { "ready" }.to_string(),
            imported_at: Utc::now(),
            metadata: ResponseMetadata {
                total_modules: report.modules.len(),
                total_lessons: report.payload.content.len(),
                total_minutes: report.modules.iter().map(|m| m.total_minutes).sum(),
                template: report.template,
                file_info: FileMetadata {
                    format: format!("{:?}", report.table.format).to_lowercase(),
                    encoding: report.table.encoding,
                    row_count: report.table.row_count,
                    columns: report.table.headers,
                    warnings: report.table.warnings,
                },
                skipped_rows: report.skipped.iter().map(SkippedRowInfo::from).collect(),
                validation: ValidationStats {
                    valid: report.valid_count,
                    invalid: report.invalid_count,
                    errors: report
                        .validation_errors
                        .into_iter()
                        .map(|(idx, errs)| ValidationError {
                            lesson_index: idx,
                            errors: errs,
                        })
                        .collect(),
                },
            },
            payload: report.payload,
            modules: report.modules,
        }
    }
}

/// Response for a dry inspection of a file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResponse {
    pub status: String,
    #[serde(flatten)]
    pub inspection: Inspection,
}

impl From<Inspection> for InspectResponse {
    fn from(inspection: Inspection) -> Self {
        Self {
            status: "ok".to_string(),
            inspection,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "payload": null,
        "modules": [],
    })
}
