//! Sorted, field-projected listings over sets of entity references.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Catalog;
use crate::error::NavigationError;
use crate::model::{EntityKind, EntityRef, Value};
use crate::path::{Navigator, Path, Start};

/// One row of a sorted index, as handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// `"<type>:<id>"` of the listed entity, or `"index:<name>"` for the
    /// index directory.
    pub id: String,
    pub values: IndexMap<String, String>,
}

/// A flattened navigation result.
///
/// Ordering is natural within a type; across types, absent values sort
/// first and numbers before text. No locale or leading-article handling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Absent,
    Number(i64),
    Text(String),
}

impl fmt::Display for SortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Flatten a navigation result into a single value.
///
/// Sequences are joined depth-first with `", "`; a one-element sequence
/// yields its element unchanged and an empty one yields empty text. Leaves
/// pass through.
pub fn flatten(value: &Value) -> SortValue {
    match value {
        Value::Absent => SortValue::Absent,
        Value::Number(n) => SortValue::Number(*n),
        Value::Text(s) => SortValue::Text(s.clone()),
        Value::Refs(refs) => {
            let leaves: Vec<Value> = refs.iter().map(|r| Value::Text(r.to_string())).collect();
            flatten_list(&leaves)
        }
        Value::List(items) => flatten_list(items),
    }
}

fn flatten_list(items: &[Value]) -> SortValue {
    match items {
        [] => SortValue::Text(String::new()),
        [only] => flatten(only),
        _ => SortValue::Text(
            items
                .iter()
                .map(|item| flatten(item).to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ),
    }
}

/// A named index built during every rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    /// Collection whose entities are listed.
    pub kind: EntityKind,
    /// Path whose flattened value orders the listing.
    pub sort_by: String,
    /// Output name → path, in output order.
    pub fields: Vec<(String, String)>,
}

impl IndexDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntityKind, sort_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            sort_by: sort_by.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, output: impl Into<String>, path: impl Into<String>) -> Self {
        self.fields.push((output.into(), path.into()));
        self
    }

    /// The indexes every rebuild produces.
    #[must_use]
    pub fn predefined() -> Vec<Self> {
        vec![
            Self::new("Genres by Name", EntityKind::Genre, "name").with_field("name", "name"),
            Self::new("Artists by Name", EntityKind::Artist, "name")
                .with_field("name", "name")
                .with_field("genres", "parents:#:name"),
            Self::new("Albums by Name", EntityKind::Album, "name")
                .with_field("name", "name")
                .with_field("artists", "parents:#:name"),
            Self::new("Albums by Artist", EntityKind::Album, "parents:#:name")
                .with_field("name", "name")
                .with_field("artists", "parents:#:name"),
            Self::new("Tracks by Name", EntityKind::Track, "name")
                .with_field("name", "name")
                .with_field("album", "parents:#0:name")
                .with_field("artists", "parents:#0:parents:#:name"),
        ]
    }
}

/// Builds sorted listings by resolving paths for each reference.
#[derive(Debug, Clone, Copy)]
pub struct IndexBuilder<'a> {
    navigator: Navigator<'a>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            navigator: Navigator::new(catalog),
        }
    }

    /// One entry per reference, stable-sorted ascending by the flattened
    /// value of `sort_by`. Any navigation failure aborts the whole build.
    pub fn build<F, P>(
        &self,
        references: &[EntityRef],
        sort_by: &str,
        fields: &[(F, P)],
    ) -> Result<Vec<IndexEntry>, NavigationError>
    where
        F: AsRef<str>,
        P: AsRef<str>,
    {
        let sort_path = Path::parse(sort_by)?;
        let field_paths = fields
            .iter()
            .map(|(output, path)| Ok((output.as_ref(), Path::parse(path.as_ref())?)))
            .collect::<Result<Vec<_>, NavigationError>>()?;

        let mut rows = references
            .iter()
            .map(|reference| {
                let start = Start::At(reference);
                let sort_value = flatten(&self.navigator.resolve_path(start, &sort_path)?);
                let mut values = IndexMap::with_capacity(field_paths.len());
                for (output, path) in &field_paths {
                    let value = flatten(&self.navigator.resolve_path(start, path)?);
                    values.insert((*output).to_string(), value.to_string());
                }
                Ok((
                    sort_value,
                    IndexEntry {
                        id: reference.to_string(),
                        values,
                    },
                ))
            })
            .collect::<Result<Vec<_>, NavigationError>>()?;

        rows.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(rows.into_iter().map(|(_, entry)| entry).collect())
    }
}
