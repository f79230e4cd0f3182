use serde::Serialize;

use crate::model::ids::EntityRef;

/// A raw value produced by navigating the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// An attribute that exists but carries no value (e.g. a track without
    /// a track number).
    Absent,
    Number(i64),
    Text(String),
    /// An edge set, in insertion order.
    Refs(Vec<EntityRef>),
    /// One result per key of a fanned-out edge set.
    List(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<u32>> for Value {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Absent, |n| Self::Number(i64::from(n)))
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Absent, Self::text)
    }
}
