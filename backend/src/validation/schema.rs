//! JSON Schema validation for lesson drafts.
//!
//! The schema is embedded at compile time from
//! `schemas/lesson-draft.json` and describes one entry of the upsert payload
//! (persistence field names, importance labels `Alta|Media|Baixa|Base`).
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use curriculum_import::validation::is_valid_lesson_draft;
//!
//! let lesson = json!({
//!     "modulo_numero": 1,
//!     "modulo_nome": "Cinemática",
//!     "aula_numero": 1,
//!     "aula_nome": "MRU",
//!     "tempo": 16,
//!     "prioridade": 3,
//!     "importancia": "Alta"
//! });
//! assert!(is_valid_lesson_draft(&lesson));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static LESSON_DRAFT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/lesson-draft.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON Schema (draft 7).
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate_against_schema(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one serialized lesson draft.
pub fn validate_lesson_draft(data: &Value) -> Result<(), Vec<String>> {
    validate_against_schema(&LESSON_DRAFT_SCHEMA, data)
}

/// Quick check against the lesson draft schema.
pub fn is_valid_lesson_draft(data: &Value) -> bool {
    jsonschema::draft7::is_valid(&LESSON_DRAFT_SCHEMA, data)
}
