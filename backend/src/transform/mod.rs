//! Transformation module.
//!
//! Turns header-labeled rows into lesson drafts:
//! - Aliases: header alias lists per column family
//! - Resolver: alias lookup against a row
//! - Duration / Importance: cell value normalizers
//! - Curriculum: row-by-row module/lesson construction
//! - Pipeline: read, detect, transform, validate

pub mod aliases;
pub mod curriculum;
pub mod duration;
pub mod importance;
pub mod pipeline;
pub mod resolver;

pub use aliases::ResolverConfig;
pub use curriculum::{
    group_modules, transform, transform_with_report, SkipReason, SkippedRow, TransformOutcome,
};
pub use duration::parse_minutes;
pub use importance::{fold_accents, normalize_importance};
pub use pipeline::*;
pub use resolver::{has_column, resolve};
