//! Header alias lists for every logical field.
//!
//! Each list is ordered by preference and consumed by
//! [`resolve`](super::resolver::resolve). The defaults cover the
//! Portuguese headers (with and without accents) the import template and
//! older spreadsheets use. A custom set can be loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Alias lists used by the schema validator and the transformer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub discipline: Vec<String>,
    pub front: Vec<String>,
    /// Explicit module number (may hold a name in legacy files).
    pub module_number: Vec<String>,
    pub module_name: Vec<String>,
    /// Bare "module" column, read as a name when it is not numeric.
    pub module_bare: Vec<String>,
    /// Explicit lesson number.
    pub lesson_number: Vec<String>,
    pub lesson_name: Vec<String>,
    /// Generic "name" column, accepted only for name-like values.
    pub generic_name: Vec<String>,
    /// Bare "lesson" column, accepted only for name-like values.
    pub lesson_bare: Vec<String>,
    /// Substrings that mark a header as possibly holding a lesson name.
    pub name_key_hints: Vec<String>,
    pub duration: Vec<String>,
    pub priority: Vec<String>,
    pub importance: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            discipline: list(&["disciplina", "Disciplina"]),
            front: list(&["frente", "Frente"]),
            module_number: list(&[
                "módulo",
                "Módulo",
                "modulo",
                "numero do modulo",
                "número do módulo",
            ]),
            module_name: list(&["nome do módulo", "nome do modulo", "Nome do Módulo"]),
            module_bare: list(&["modulo", "módulo", "Módulo"]),
            lesson_number: list(&["aula", "Aula", "numero da aula", "número da aula"]),
            lesson_name: list(&["nome da aula", "Nome da Aula", "nome aula", "nomeaula"]),
            generic_name: list(&["nome", "Nome"]),
            lesson_bare: list(&["aula", "Aula"]),
            name_key_hints: list(&["nome", "aula"]),
            duration: list(&[
                "tempo em minutos",
                "tempo (minutos)",
                "tempo",
                "tempo estimado",
                "tempo_estimado",
                "tempo estimado (minutos)",
                "duração",
                "duracao",
            ]),
            priority: list(&[
                "prioridade",
                "pri",
                "prio",
                "prioridade (0-5)",
                "prioridade (1-5)",
                "prioridade 0-5",
                "prioridade 1-5",
            ]),
            importance: list(&["importância", "importancia"]),
        }
    }
}

impl ResolverConfig {
    /// Parse from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError {
            key: "aliases".to_string(),
            value: json.chars().take(40).collect(),
            message: e.to_string(),
        })
    }

    /// Column families required for the "new" template, with display labels.
    pub fn new_template_columns(&self) -> Vec<(&'static str, &[String])> {
        vec![
            ("\"Disciplina\"", self.discipline.as_slice()),
            ("\"Frente\"", self.front.as_slice()),
            ("\"Módulo\"", self.module_number.as_slice()),
            ("\"Nome do Módulo\"", self.module_name.as_slice()),
            ("\"Aula\"", self.lesson_number.as_slice()),
            ("\"Nome da Aula\"", self.lesson_name.as_slice()),
        ]
    }

    /// Any column identifying a module (number or name).
    pub fn module_family(&self) -> Vec<String> {
        merge(&[&self.module_bare, &self.module_name])
    }

    /// Any column identifying a lesson (number or name).
    pub fn lesson_family(&self) -> Vec<String> {
        merge(&[&self.lesson_bare, &self.lesson_name])
    }
}

fn merge(lists: &[&Vec<String>]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for alias in lists.iter().flat_map(|l| l.iter()) {
        if !merged.contains(alias) {
            merged.push(alias.clone());
        }
    }
    merged
}
