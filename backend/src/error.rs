//! Error types for the curriculum import pipeline.
//!
//! This module defines one error type per layer:
//!
//! - [`ImportError`] - File-level and schema-level fatal errors
//! - [`ContextError`] - Discipline/front context problems around the import
//! - [`ConfigError`] - Invalid environment configuration
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Row-level problems (a row without a module or lesson name) are never
//! errors: the row is dropped and reported through the log stream.

use thiserror::Error;

// =============================================================================
// Import Errors (reader + schema validator)
// =============================================================================

/// Fatal errors raised before any row is transformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The file has a header but no data rows.
    #[error("O arquivo está vazio")]
    EmptyFile,

    /// The bytes could not be decoded as a table.
    ///
    /// For CSV input the reason is `"quoting"` or `"delimiter"` when those
    /// are the cause of the empty result.
    #[error("Arquivo inválido: {0}")]
    Malformed(String),

    /// Mandatory column families are absent from the first row.
    #[error("{}", missing_columns_message(.0))]
    MissingColumns(Vec<String>),
}

fn missing_columns_message(fields: &[String]) -> String {
    match fields {
        [single] => format!("O arquivo deve conter uma coluna {}", single),
        _ => format!("O arquivo deve conter as colunas: {}", fields.join(", ")),
    }
}

impl ImportError {
    /// Reason string for `Malformed`, if any.
    pub fn malformed_reason(&self) -> Option<&str> {
        match self {
            ImportError::Malformed(reason) => Some(reason),
            _ => None,
        }
    }
}

// =============================================================================
// Context Errors
// =============================================================================

/// Errors while reconciling the caller-supplied discipline/front with the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("A disciplina selecionada ({selected}) não coincide com a disciplina do arquivo ({file}).")]
    DisciplineMismatch { selected: String, file: String },

    #[error("O nome da frente informado ({selected}) não coincide com a frente do arquivo ({file}).")]
    FrontMismatch { selected: String, file: String },

    #[error("Selecione uma disciplina ou preencha a coluna \"Disciplina\" na planilha.")]
    MissingDiscipline,

    #[error("Informe o nome da frente ou preencha a coluna \"Frente\" na planilha.")]
    MissingFront,
}

// =============================================================================
// Config Errors
// =============================================================================

/// Invalid configuration value read from the environment.
#[derive(Debug, Error)]
#[error("Invalid value for {key}: '{value}' ({message})")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub message: String,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::import_bytes`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reader or schema validation error.
    #[error("{0}")]
    Import(#[from] ImportError),

    /// Discipline/front reconciliation error.
    #[error("{0}")]
    Context(#[from] ContextError),

    /// Failed to read the input file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Extension other than `.csv`, `.xlsx` or `.xls`.
    #[error("Por favor, selecione um arquivo CSV ou XLSX ({0})")]
    UnsupportedFormat(String),

    /// Every row was dropped by the transformer.
    #[error("Nenhum dado válido encontrado no arquivo")]
    NoLessons,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reader and schema validation.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let import_err = ImportError::EmptyFile;
        let pipeline_err: PipelineError = import_err.into();
        assert!(pipeline_err.to_string().contains("vazio"));

        let context_err = ContextError::MissingFront;
        let pipeline_err: PipelineError = context_err.into();
        assert!(pipeline_err.to_string().contains("Frente"));
    }

    #[test]
    fn test_missing_columns_message_names_family() {
        let err = ImportError::MissingColumns(vec!["\"Aula\" ou \"Nome da Aula\"".into()]);
        assert_eq!(
            err.to_string(),
            "O arquivo deve conter uma coluna \"Aula\" ou \"Nome da Aula\""
        );
    }

    #[test]
    fn test_malformed_reason() {
        assert_eq!(ImportError::Malformed("quoting".into()).malformed_reason(), Some("quoting"));
        assert_eq!(ImportError::EmptyFile.malformed_reason(), None);
    }
}
