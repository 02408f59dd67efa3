//! Template detection and payload validation.
//!
//! # Template detection
//!
//! Only the first row is inspected, and only for column presence:
//!
//! - **New** template: discipline, front, module number, module name,
//!   lesson number and lesson name columns are all present. Checked first.
//! - **Legacy** template: a module column (number or name) and a lesson
//!   column (number or name).
//!
//! Anything else is rejected with [`ImportError::MissingColumns`] naming the
//! absent family.
//!
//! # Payload validation
//!
//! See [`schema`]: lesson drafts are checked against an embedded JSON Schema
//! before being handed to persistence.

pub mod schema;

use crate::error::{ImportError, ImportResult};
use crate::models::{RawRow, TemplateKind};
use crate::transform::aliases::ResolverConfig;
use crate::transform::resolver::has_column;

pub use schema::{is_valid_lesson_draft, validate_against_schema, validate_lesson_draft};

/// Label reported when no module column exists.
pub const MODULE_FAMILY_LABEL: &str = "\"Módulo\" ou \"Nome do Módulo\"";

/// Label reported when no lesson column exists.
pub const LESSON_FAMILY_LABEL: &str = "\"Aula\" ou \"Nome da Aula\"";

/// Decide which template the rows follow.
pub fn validate(rows: &[RawRow], config: &ResolverConfig) -> ImportResult<TemplateKind> {
    let first_row = rows.first().ok_or(ImportError::EmptyFile)?;

    let is_new_template = config
        .new_template_columns()
        .into_iter()
        .all(|(_, aliases)| has_column(first_row, aliases));
    if is_new_template {
        return Ok(TemplateKind::New);
    }

    let mut missing = Vec::new();
    if !has_column(first_row, config.module_family().as_slice()) {
        missing.push(MODULE_FAMILY_LABEL.to_string());
    }
    if !has_column(first_row, config.lesson_family().as_slice()) {
        missing.push(LESSON_FAMILY_LABEL.to_string());
    }

    if missing.is_empty() {
        Ok(TemplateKind::Legacy)
    } else {
        Err(ImportError::MissingColumns(missing))
    }
}

/// Labels of the new-template columns absent from the first row.
///
/// Informational: lets callers tell a user which columns would upgrade a
/// legacy file to the new template.
pub fn missing_new_template_columns(rows: &[RawRow], config: &ResolverConfig) -> Vec<String> {
    let Some(first_row) = rows.first() else {
        return Vec::new();
    };
    config
        .new_template_columns()
        .into_iter()
        .filter(|(_, aliases)| !has_column(first_row, *aliases))
        .map(|(label, _)| label.to_string())
        .collect()
}
