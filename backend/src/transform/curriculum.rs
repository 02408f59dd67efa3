//! Rows to a flat, numbered list of lesson drafts.
//!
//! One top-to-bottom pass. The module hierarchy is rebuilt from repeated
//! module names; numbering state is local to each
//! [`transform`] call.
//!
//! # Per-row resolution
//!
//! ```text
//! module number  ← module_number aliases (positive integer)
//! module name    ← module_name aliases
//!                  | module_bare aliases, when the number column held text
//! lesson number  ← lesson_number aliases (positive integer)
//! lesson name    ← lesson_name aliases
//!                  | generic_name aliases   (name-like only)
//!                  | lesson_bare aliases    (name-like only)
//!                  | first "nome"/"aula" key (name-like only)
//! ```
//!
//! "Name-like" means not numeric, or longer than three characters: a
//! lesson column holding `3` is a number, not a name.
//!
//! Rows without a module name or lesson name are skipped and reported in
//! [`TransformOutcome::skipped`]; they never fail the transform.

use serde::Serialize;
use std::collections::HashMap;

use super::aliases::ResolverConfig;
use super::duration::parse_minutes;
use super::importance::normalize_importance;
use super::resolver::resolve;
use crate::models::{LessonDraft, ModuleGroup, RawRow};

/// Why a row produced no lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    MissingModuleName,
    MissingLessonName,
    /// Only a short number was found where the lesson name should be.
    NumericLessonName,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::MissingModuleName => "missing module name",
            SkipReason::MissingLessonName => "missing lesson name",
            SkipReason::NumericLessonName => "lesson name is only a number",
        };
        f.write_str(text)
    }
}

/// A row that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Zero-based index into the data rows
    pub row: usize,
    /// Line number as seen in the file (header is line 1)
    pub line: usize,
    pub reason: SkipReason,
}

impl SkippedRow {
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Drafts plus the rows that were dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformOutcome {
    pub lessons: Vec<LessonDraft>,
    pub skipped: Vec<SkippedRow>,
}

/// Transform rows into lesson drafts, dropping unusable rows.
pub fn transform(rows: &[RawRow], config: &ResolverConfig) -> Vec<LessonDraft> {
    transform_with_report(rows, config).lessons
}

/// Same as [`transform`] but also reports skipped rows.
pub fn transform_with_report(rows: &[RawRow], config: &ResolverConfig) -> TransformOutcome {
    let mut numbering = Numbering::default();
    let mut outcome = TransformOutcome::default();

    for (idx, row) in rows.iter().enumerate() {
        match transform_row(row, config, &mut numbering) {
            Ok(lesson) => outcome.lessons.push(lesson),
            Err(reason) => outcome.skipped.push(SkippedRow {
                row: idx,
                // Rows built in memory have no source line
                line: row.line().unwrap_or(idx + 2),
                reason,
            }),
        }
    }

    outcome
}

/// Numbering state for one file.
#[derive(Debug, Default)]
struct Numbering {
    /// module name → auto-assigned number
    modules: HashMap<String, u32>,
    /// (module number, lesson name) → auto-assigned number
    lessons: HashMap<(u32, String), u32>,
    /// module number → lessons auto-numbered so far
    lessons_per_module: HashMap<u32, u32>,
}

impl Numbering {
    fn module_number(&mut self, explicit: Option<u32>, name: &str) -> u32 {
        if let Some(number) = explicit {
            return number;
        }
        if let Some(&number) = self.modules.get(name) {
            return number;
        }
        let number = self.modules.len() as u32 + 1;
        self.modules.insert(name.to_string(), number);
        number
    }

    fn lesson_number(&mut self, explicit: Option<u32>, module_number: u32, name: &str) -> u32 {
        if let Some(number) = explicit {
            return number;
        }
        let key = (module_number, name.to_string());
        if let Some(&number) = self.lessons.get(&key) {
            return number;
        }
        let count = self.lessons_per_module.entry(module_number).or_insert(0);
        *count += 1;
        let number = *count;
        self.lessons.insert(key, number);
        number
    }
}

fn transform_row(
    row: &RawRow,
    config: &ResolverConfig,
    numbering: &mut Numbering,
) -> Result<LessonDraft, SkipReason> {
    let explicit_module = resolve(row, &config.module_number).and_then(parse_positive_number);

    let module_name = match resolve(row, &config.module_name) {
        Some(name) => Some(name),
        None if explicit_module.is_none() => resolve(row, &config.module_bare),
        None => None,
    };

    let explicit_lesson = resolve(row, &config.lesson_number).and_then(parse_positive_number);
    let lesson_name = resolve_lesson_name(row, config);

    let Some(module_name) = module_name else {
        return Err(SkipReason::MissingModuleName);
    };
    let Some(mut lesson_name) = lesson_name else {
        return Err(SkipReason::MissingLessonName);
    };

    if !is_name_like(lesson_name) {
        lesson_name = scan_name_keys(row, config).ok_or(SkipReason::NumericLessonName)?;
    }
    let lesson_name = lesson_name.trim();

    let module_number = numbering.module_number(explicit_module, module_name);
    let lesson_number = numbering.lesson_number(explicit_lesson, module_number, lesson_name);

    Ok(LessonDraft {
        module_number,
        module_name: module_name.to_string(),
        lesson_number,
        lesson_name: lesson_name.to_string(),
        duration_minutes: parse_minutes(resolve(row, &config.duration)).filter(|m| *m > 0),
        priority: resolve(row, &config.priority).and_then(parse_priority),
        importance: normalize_importance(resolve(row, &config.importance)),
    })
}

fn resolve_lesson_name<'a>(row: &'a RawRow, config: &ResolverConfig) -> Option<&'a str> {
    resolve(row, &config.lesson_name)
        .or_else(|| resolve(row, &config.generic_name).filter(|v| is_name_like(v)))
        .or_else(|| resolve(row, &config.lesson_bare).filter(|v| is_name_like(v)))
        .or_else(|| scan_name_keys(row, config))
}

/// First name-like value under a key containing one of the name hints.
fn scan_name_keys<'a>(row: &'a RawRow, config: &ResolverConfig) -> Option<&'a str> {
    row.iter()
        .find(|(key, value)| {
            config
                .name_key_hints
                .iter()
                .any(|hint| key.contains(hint.to_lowercase().as_str()))
                && !value.trim().is_empty()
                && is_name_like(value)
        })
        .map(|(_, value)| value.trim())
}

/// Whether the text parses as a finite number.
pub fn looks_numeric(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(|v| v.is_finite())
        .unwrap_or(false)
}

/// Not numeric, or longer than three characters.
pub fn is_name_like(value: &str) -> bool {
    !looks_numeric(value) || value.trim().chars().count() > 3
}

/// A positive number, floored (`"2"` → 2, `"2.7"` → 2).
pub fn parse_positive_number(value: &str) -> Option<u32> {
    let parsed: f64 = value.trim().parse().ok()?;
    if !parsed.is_finite() || parsed < 1.0 {
        return None;
    }
    Some(parsed.floor().min(u32::MAX as f64) as u32)
}

/// Leading integer of the cell, kept only when within `0..=5`.
pub fn parse_priority(value: &str) -> Option<u8> {
    let trimmed = value.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let number: i64 = digits[..end].parse().ok()?;
    match sign * number {
        n @ 0..=5 => Some(n as u8),
        _ => None,
    }
}

/// Rebuild the module → lessons hierarchy in first-seen order.
pub fn group_modules(lessons: &[LessonDraft]) -> Vec<ModuleGroup> {
    let mut groups: Vec<ModuleGroup> = Vec::new();
    let mut index: HashMap<(u32, &str), usize> = HashMap::new();

    for lesson in lessons {
        let key = (lesson.module_number, lesson.module_name.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(ModuleGroup {
                module: lesson.module(),
                lessons: Vec::new(),
                total_minutes: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total_minutes += lesson.duration_minutes.unwrap_or(0);
        group.lessons.push(lesson.clone());
    }

    groups
}
