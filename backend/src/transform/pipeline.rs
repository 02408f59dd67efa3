//! High-level import API: bytes in, upsert payload out.
//!
//! Combines every step:
//!
//! 1. Read the table (CSV or spreadsheet)
//! 2. Detect the template from the first row
//! 3. Reconcile discipline/front with the caller's context
//! 4. Transform rows into lesson drafts (unusable rows are logged and dropped)
//! 5. Validate the drafts against the payload schema
//!
//! The whole pass is synchronous and owns all of its state, so concurrent
//! imports never share numbering.
//!
//! # Example
//!
//! ```rust,ignore
//! use curriculum_import::{import_file, ImportOptions};
//! use std::path::Path;
//!
//! let options = ImportOptions {
//!     course_id: Some("curso-1".into()),
//!     ..ImportOptions::default()
//! };
//! let report = import_file(Path::new("Frente A.xlsx"), &options)?;
//! println!("{} lessons", report.payload.content.len());
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::aliases::ResolverConfig;
use super::curriculum::{group_modules, transform_with_report, SkippedRow};
use super::importance::fold_accents;
use super::resolver::resolve;
use crate::api::logs::{
    log_error, log_info, log_info_indent, log_success, log_warning, log_warning_line,
};
use crate::error::{ContextError, PipelineError, PipelineResult};
use crate::models::{LessonDraft, ModuleGroup, RawRow, TemplateKind};
use crate::parser::{read_table, ParsedTable, SourceFormat};
use crate::validation::{self, missing_new_template_columns, validate_lesson_draft};

/// Options for one import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportOptions {
    /// Target course, passed through to the payload
    pub course_id: Option<String>,

    /// Discipline chosen by the user; checked against the file's column
    pub discipline: Option<String>,

    /// Front chosen by the user; checked against the file's column
    pub front: Option<String>,

    /// Skip the JSON Schema check of the drafts
    pub skip_payload_validation: bool,

    /// How many drafts to echo to the log
    pub log_preview_rows: usize,

    /// Header aliases
    pub aliases: ResolverConfig,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            course_id: None,
            discipline: None,
            front: None,
            skip_payload_validation: false,
            log_preview_rows: 3,
            aliases: ResolverConfig::default(),
        }
    }
}

/// Hand-off to the bulk upsert collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertPayload {
    #[serde(rename = "p_curso_id")]
    pub course_id: Option<String>,
    #[serde(rename = "p_disciplina_nome")]
    pub discipline_name: String,
    #[serde(rename = "p_frente_nome")]
    pub front_name: String,
    #[serde(rename = "p_conteudo")]
    pub content: Vec<LessonDraft>,
}

/// Discipline and front the lessons belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportContext {
    pub discipline: String,
    pub front: String,
}

/// File information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub format: SourceFormat,
    pub encoding: Option<String>,
    pub headers: Vec<String>,
    pub row_count: usize,
    pub warnings: Vec<String>,
}

impl From<&ParsedTable> for TableInfo {
    fn from(table: &ParsedTable) -> Self {
        Self {
            format: table.format,
            encoding: table.encoding.clone(),
            headers: table.headers.clone(),
            row_count: table.rows.len(),
            warnings: table.warnings.clone(),
        }
    }
}

/// Result of a complete import
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Payload for the persistence collaborator
    pub payload: UpsertPayload,

    /// Detected column layout
    pub template: TemplateKind,

    /// File metadata
    pub table: TableInfo,

    /// Rows that produced no lesson
    pub skipped: Vec<SkippedRow>,

    /// Lessons grouped by module
    pub modules: Vec<ModuleGroup>,

    /// Drafts passing the payload schema
    pub valid_count: usize,

    /// Drafts failing the payload schema
    pub invalid_count: usize,

    /// Schema errors (draft index, errors), first ten drafts only
    pub validation_errors: Vec<(usize, Vec<String>)>,
}

/// Result of reading and classifying a file without transforming it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub table: TableInfo,
    pub template: TemplateKind,
    /// New-template columns the file lacks
    pub missing_new_template_columns: Vec<String>,
    /// Discipline/front found in the first row
    pub discipline: Option<String>,
    pub front: Option<String>,
}

/// Check that the filename carries a supported extension.
pub fn ensure_supported(filename: &str) -> PipelineResult<SourceFormat> {
    SourceFormat::from_filename(filename)
        .ok_or_else(|| PipelineError::UnsupportedFormat(filename.to_string()))
}

/// Import a file from disk.
pub fn import_file(path: &Path, options: &ImportOptions) -> PipelineResult<ImportReport> {
    let filename = path.to_string_lossy().to_string();
    ensure_supported(&filename)?;
    let bytes = std::fs::read(path)?;
    import_bytes(&bytes, &filename, options)
}

/// Import an uploaded file held in memory.
pub fn import_bytes(
    bytes: &[u8],
    filename: &str,
    options: &ImportOptions,
) -> PipelineResult<ImportReport> {
    ensure_supported(filename)?;

    // Step 1: Read
    log_info(format!("📖 Reading {} ({} bytes)...", filename, bytes.len()));
    let table = read_table(bytes, filename)?;
    print_table_info(&table);

    // Step 2: Template
    let template = validation::validate(&table.rows, &options.aliases)?;
    log_success(format!("Template: {:?}", template));

    // Step 3: Context
    let context = resolve_context(&table.rows, options)?;
    log_success(format!(
        "Discipline: {} / Front: {}",
        context.discipline, context.front
    ));

    // Step 4: Transform
    log_info("⚙️  Building modules and lessons...");
    let outcome = transform_with_report(&table.rows, &options.aliases);
    print_skipped(&outcome.skipped);

    if outcome.lessons.is_empty() {
        log_error("No lesson could be built from the file");
        return Err(PipelineError::NoLessons);
    }

    let modules = group_modules(&outcome.lessons);
    log_success(format!(
        "{} lessons in {} modules",
        outcome.lessons.len(),
        modules.len()
    ));
    for lesson in outcome.lessons.iter().take(options.log_preview_rows) {
        log_info_indent(
            format!(
                "{}.{} {} / {}",
                lesson.module_number, lesson.lesson_number, lesson.module_name, lesson.lesson_name
            ),
            1,
        );
    }

    // Step 5: Validate payload
    let (valid_count, invalid_count, validation_errors) = if options.skip_payload_validation {
        log_info("(payload validation skipped)");
        (outcome.lessons.len(), 0, vec![])
    } else {
        log_info("✔️  Validating lessons...");
        let result = validate_lessons(&outcome.lessons);
        print_validation_result(&result);
        result
    };

    Ok(ImportReport {
        payload: UpsertPayload {
            course_id: options.course_id.clone(),
            discipline_name: context.discipline,
            front_name: context.front,
            content: outcome.lessons,
        },
        template,
        table: TableInfo::from(&table),
        skipped: outcome.skipped,
        modules,
        valid_count,
        invalid_count,
        validation_errors,
    })
}

/// Read and classify a file without transforming it.
pub fn inspect_bytes(
    bytes: &[u8],
    filename: &str,
    config: &ResolverConfig,
) -> PipelineResult<Inspection> {
    ensure_supported(filename)?;
    let table = read_table(bytes, filename)?;
    let template = validation::validate(&table.rows, config)?;
    let first = first_non_empty(&table.rows);

    Ok(Inspection {
        missing_new_template_columns: missing_new_template_columns(&table.rows, config),
        discipline: first.and_then(|r| resolve(r, &config.discipline)).map(String::from),
        front: first.and_then(|r| resolve(r, &config.front)).map(String::from),
        table: TableInfo::from(&table),
        template,
    })
}

/// Reconcile the caller's discipline/front with the first row of the file.
///
/// Caller values win; when both sides are present they must match,
/// ignoring case and accents.
pub fn resolve_context(
    rows: &[RawRow],
    options: &ImportOptions,
) -> Result<ImportContext, ContextError> {
    let first = first_non_empty(rows);
    let file_discipline = first.and_then(|r| resolve(r, &options.aliases.discipline));
    let file_front = first.and_then(|r| resolve(r, &options.aliases.front));

    let selected_discipline = non_blank(options.discipline.as_deref());
    let selected_front = non_blank(options.front.as_deref());

    if let (Some(selected), Some(file)) = (selected_discipline, file_discipline) {
        if !same_name(selected, file) {
            return Err(ContextError::DisciplineMismatch {
                selected: selected.to_string(),
                file: file.to_string(),
            });
        }
    }

    if let (Some(selected), Some(file)) = (selected_front, file_front) {
        if !same_name(selected, file) {
            return Err(ContextError::FrontMismatch {
                selected: selected.to_string(),
                file: file.to_string(),
            });
        }
    }

    let discipline = selected_discipline
        .or(file_discipline)
        .ok_or(ContextError::MissingDiscipline)?;
    let front = selected_front
        .or(file_front)
        .ok_or(ContextError::MissingFront)?;

    Ok(ImportContext {
        discipline: discipline.trim().to_string(),
        front: front.trim().to_string(),
    })
}

/// Case- and accent-insensitive name equality.
pub fn same_name(a: &str, b: &str) -> bool {
    fold_accents(a) == fold_accents(b)
}

fn first_non_empty(rows: &[RawRow]) -> Option<&RawRow> {
    rows.iter().find(|r| !r.is_blank()).or_else(|| rows.first())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate drafts and return statistics
fn validate_lessons(lessons: &[LessonDraft]) -> (usize, usize, Vec<(usize, Vec<String>)>) {
    let mut valid = 0;
    let mut invalid = 0;
    let mut errors = Vec::new();

    for (i, lesson) in lessons.iter().enumerate() {
        let result = serde_json::to_value(lesson)
            .map_err(|e| vec![e.to_string()])
            .and_then(|value| validate_lesson_draft(&value));
        match result {
            Ok(()) => valid += 1,
            Err(errs) => {
                invalid += 1;
                if errors.len() < 10 {
                    errors.push((i, errs));
                }
            }
        }
    }

    (valid, invalid, errors)
}

fn print_table_info(table: &ParsedTable) {
    if let Some(ref encoding) = table.encoding {
        log_success(format!("Detected encoding: {}", encoding));
    }
    log_success(format!("Read {} rows", table.rows.len()));
    log_info(format!("📋 {} columns:", table.headers.len()));
    for (i, col) in table.headers.iter().enumerate() {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }
}

fn print_skipped(skipped: &[SkippedRow]) {
    if skipped.is_empty() {
        return;
    }
    log_warning(format!("{} rows skipped", skipped.len()));
    for skip in skipped.iter().take(20) {
        log_warning_line(skip.line(), skip.reason.to_string());
    }
    if skipped.len() > 20 {
        log_warning(format!("... +{}", skipped.len() - 20));
    }
}

fn print_validation_result(result: &(usize, usize, Vec<(usize, Vec<String>)>)) {
    if result.1 == 0 {
        log_success(format!("All {} lessons valid!", result.0));
    } else {
        log_success(format!("Valid: {}", result.0));
        log_error(format!("Invalid: {}", result.1));
    }
}
