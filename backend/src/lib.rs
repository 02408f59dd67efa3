//! # Curriculum import - spreadsheet to module/lesson upsert payload
//!
//! Reads CSV or XLSX exports of a course structure (one row per lesson) and
//! turns them into numbered modules and lessons ready for a bulk upsert.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / XLSX │────▶│   Parser    │────▶│  Transform  │────▶│   Payload   │
//! │  (any enc.) │     │ (raw rows)  │     │ (aliases +  │     │ (validated) │
//! └─────────────┘     └─────────────┘     │  numbering) │     └─────────────┘
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use curriculum_import::{import_file, ImportOptions};
//! use std::path::Path;
//!
//! let report = import_file(Path::new("Frente A.xlsx"), &ImportOptions::default())?;
//! println!("{} lessons in {} modules", report.payload.content.len(), report.modules.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Rows, drafts and importance levels
//! - [`parser`] - CSV/XLSX reading with encoding detection
//! - [`transform`] - Column resolution, normalizers and pipeline
//! - [`validation`] - Template detection and payload schema
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ContextError, ImportError, ImportResult, PipelineError, PipelineResult,
    ServerError, ServerResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Importance, LessonDraft, ModuleDraft, ModuleGroup, RawRow, TemplateKind};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, read, read_table, template_csv,
    ParsedTable, SourceFormat,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    group_modules, normalize_importance, parse_minutes, resolve, transform, transform_with_report,
    ResolverConfig, SkipReason, SkippedRow, TransformOutcome,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_lesson_draft, validate, validate_lesson_draft};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    import_bytes, import_file, inspect_bytes, resolve_context, ImportContext, ImportOptions,
    ImportReport, Inspection, TableInfo, UpsertPayload,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ImportResponse, InspectResponse};
pub use config::AppConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
