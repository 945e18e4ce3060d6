// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model registration and its lazily-populated metadata (spec §3, §4.3).

use crate::id::ModelDigest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A registered model. Immutable after registration; multiple models may
/// share a name but `digest` uniquely identifies one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub digest: ModelDigest,
    pub name: String,
    pub version: String,
    pub default_lang: String,
    pub exe_path: PathBuf,
    pub db_path: PathBuf,
    pub bin_dir: PathBuf,
}

/// A stripped-down view used by `AllModels` — no metadata, just enough to
/// identify and route to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBasic {
    pub digest: ModelDigest,
    pub name: String,
    pub version: String,
    pub default_lang: String,
}

impl From<&Model> for ModelBasic {
    fn from(m: &Model) -> Self {
        Self {
            digest: m.digest.clone(),
            name: m.name.clone(),
            version: m.version.clone(),
            default_lang: m.default_lang.clone(),
        }
    }
}

/// A type's enum range: either fully materialized rows or an implicit
/// `[min, max]` range sharing the same semantic contract (code = decimal
/// string of the id, description = code, empty note).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeEnumRange {
    Explicit(Vec<TypeEnumRow>),
    Implicit { min_enum_id: i64, max_enum_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEnumRow {
    pub enum_id: i64,
    pub code: String,
    pub description: String,
    pub note: String,
}

impl TypeEnumRange {
    /// Returns the packed `{min,max}` form, deriving it from explicit rows
    /// if necessary (requires non-empty rows).
    pub fn packed(&self) -> Option<(i64, i64)> {
        match self {
            TypeEnumRange::Implicit {
                min_enum_id,
                max_enum_id,
            } => Some((*min_enum_id, *max_enum_id)),
            TypeEnumRange::Explicit(rows) => {
                let min = rows.iter().map(|r| r.enum_id).min()?;
                let max = rows.iter().map(|r| r.enum_id).max()?;
                Some((min, max))
            }
        }
    }

    /// Expands to explicit rows, synthesizing them for the implicit form
    /// per the contract: code = decimal string of the id, description =
    /// code, note = empty.
    pub fn expanded(&self) -> Vec<TypeEnumRow> {
        match self {
            TypeEnumRange::Explicit(rows) => rows.clone(),
            TypeEnumRange::Implicit {
                min_enum_id,
                max_enum_id,
            } => (*min_enum_id..=*max_enum_id)
                .map(|i| TypeEnumRow {
                    enum_id: i,
                    code: i.to_string(),
                    description: i.to_string(),
                    note: String::new(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TypeMeta {
    pub type_id: i64,
    pub name: String,
    pub range: Option<(i64, i64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParamMeta {
    pub param_id: i64,
    pub name: String,
    pub type_id: i64,
    pub dim_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TableMeta {
    pub table_id: i64,
    pub name: String,
    pub dim_count: i32,
    pub accumulator_count: i32,
    pub expr_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityMeta {
    pub entity_id: i64,
    pub name: String,
    pub attr_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupMeta {
    pub group_id: i64,
    pub name: String,
    pub is_entity_group: bool,
}

/// Language-neutral metadata cached per model (spec §3, §4.3). Populated
/// fully on first request; `is_meta_full` gates that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMeta {
    pub types: Vec<TypeMeta>,
    pub params: Vec<ParamMeta>,
    pub tables: Vec<TableMeta>,
    pub entities: Vec<EntityMeta>,
    pub groups: Vec<GroupMeta>,
}

/// One (object id[, sub id]) -> text row, language tagged. Used as the
/// source/destination rows fed into the merge-walk (spec §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRow {
    pub object_id: i64,
    pub sub_id: Option<i64>,
    pub lang: String,
    pub descr: String,
    pub note: String,
}

/// Per-language descriptions, keyed the same way as `ModelMeta`'s object
/// kinds. Loaded independently of `ModelMeta` (it's a superset read).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelTextMeta {
    pub type_text: Vec<TextRow>,
    pub param_text: Vec<TextRow>,
    pub table_text: Vec<TextRow>,
    pub entity_text: Vec<TextRow>,
    pub group_text: Vec<TextRow>,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
