//! Domain models for the curriculum import pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RawRow`] - One data row keyed by normalized header
//! - [`ModuleDraft`] - A module (group of lessons) identified by name
//! - [`LessonDraft`] - One lesson annotated with its parent module
//! - [`Importance`] - Closed importance vocabulary
//! - [`TemplateKind`] - Which spreadsheet layout the file follows

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Header normalization
// =============================================================================

/// Normalize a header or alias: trim, lower-case, collapse whitespace runs.
///
/// Idempotent: `normalize_header(&normalize_header(h)) == normalize_header(h)`.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// =============================================================================
// Raw Row
// =============================================================================

/// One data row: an insertion-ordered mapping of normalized header to cell text.
///
/// Two source headers that normalize to the same key collapse into one entry;
/// the later cell wins but the entry keeps its first position.
///
/// Rows produced by the readers remember the physical line they came from
/// (header is line 1), so blank rows skipped in between do not shift it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    entries: Vec<(String, String)>,
    line: Option<usize>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Physical line in the source file, when read from one.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Insert a cell under the normalized form of `header`.
    ///
    /// Headers that normalize to the empty string are ignored.
    pub fn insert(&mut self, header: &str, value: impl Into<String>) {
        let key = normalize_header(header);
        if key.is_empty() {
            return;
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a cell by header (normalized before comparison).
    pub fn get(&self, header: &str) -> Option<&str> {
        let key = normalize_header(header);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(key, value)` pairs in read order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Normalized keys in read order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every cell is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.trim().is_empty())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// =============================================================================
// Importance
// =============================================================================

/// Importance of a lesson.
///
/// Serialized with the labels the persistence layer stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Importance {
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Media")]
    Medium,
    #[serde(rename = "Baixa")]
    Low,
    #[serde(rename = "Base")]
    Base,
}

impl Importance {
    /// Label used in spreadsheets and by the persistence layer.
    pub fn label(&self) -> &'static str {
        match self {
            Importance::High => "Alta",
            Importance::Medium => "Media",
            Importance::Low => "Baixa",
            Importance::Base => "Base",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Template Kind
// =============================================================================

/// Column layout detected from the first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Discipline, front, module number/name and lesson number/name columns.
    New,
    /// Only a module column and a lesson column (number or name).
    Legacy,
}

// =============================================================================
// Drafts
// =============================================================================

/// A module seen while scanning the file. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDraft {
    pub number: u32,
    pub name: String,
}

/// One lesson ready for bulk upsert.
///
/// Field names follow the persistence payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDraft {
    #[serde(rename = "modulo_numero")]
    pub module_number: u32,
    #[serde(rename = "modulo_nome")]
    pub module_name: String,
    #[serde(rename = "aula_numero")]
    pub lesson_number: u32,
    #[serde(rename = "aula_nome")]
    pub lesson_name: String,
    #[serde(rename = "tempo")]
    pub duration_minutes: Option<u32>,
    #[serde(rename = "prioridade")]
    pub priority: Option<u8>,
    #[serde(rename = "importancia")]
    pub importance: Option<Importance>,
}

impl LessonDraft {
    /// The module this lesson belongs to.
    pub fn module(&self) -> ModuleDraft {
        ModuleDraft {
            number: self.module_number,
            name: self.module_name.clone(),
        }
    }
}

/// A module with its lessons, rebuilt from a flat draft list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleGroup {
    #[serde(flatten)]
    pub module: ModuleDraft,
    pub lessons: Vec<LessonDraft>,
    /// Sum of known lesson durations.
    pub total_minutes: u32,
}
