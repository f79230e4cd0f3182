//! The colon-delimited path language used to address catalog values.
//!
//! A path is a sequence of steps separated by `:`:
//!
//! - a plain name descends into that attribute (at the catalog root, into a
//!   collection and then an entity id);
//! - `#` fans out over every key of the current edge set, resolving the rest
//!   of the path from the catalog root once per key;
//! - `#N` picks the N-th key of the current edge set and resolves the rest
//!   of the path from the catalog root at that key.
//!
//! ```text
//! track:<id>:name                 -> "Song"
//! parents:#:name      (on artist) -> ["Rock", "Jazz"]
//! parents:#0:parents:#:name (on track) -> ["Artist1", "Artist2"]
//! ```
//!
//! Edge sets iterate in insertion order, so `#` and `#N` are deterministic.

use std::fmt;
use std::str::FromStr;

use crate::catalog::Catalog;
use crate::error::NavigationError;
use crate::model::{Entity, EntityId, EntityKind, EntityRef, RefSet, Value};

/// One parsed path step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Descend into a named attribute, collection, or entity id.
    Field(String),
    /// `#`: one result per key of the current edge set.
    FanOut,
    /// `#N`: the N-th key of the current edge set.
    Pick(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::FanOut => f.write_str("#"),
            Self::Pick(n) => write!(f, "#{n}"),
        }
    }
}

impl FromStr for Step {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NavigationError::new(s, "empty path step", s));
        }
        if s == "#" {
            return Ok(Self::FanOut);
        }
        match s.strip_prefix('#') {
            Some(index) if index.bytes().all(|b| b.is_ascii_digit()) => {
                index.parse().map(Self::Pick).map_err(|_| {
                    NavigationError::new(s, "positional selector out of range", s)
                })
            }
            Some(_) => Err(NavigationError::new(
                s,
                "positional selector must be `#` followed by digits",
                s,
            )),
            None => Ok(Self::Field(s.to_string())),
        }
    }
}

/// A parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn parse(text: &str) -> Result<Self, NavigationError> {
        let steps = text
            .split(':')
            .map(|segment| {
                segment
                    .parse()
                    .map_err(|e: NavigationError| NavigationError::new(e.step(), e.reason(), text))
            })
            .collect::<Result<Vec<Step>, _>>()?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl FromStr for Path {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Where resolution begins.
#[derive(Debug, Clone, Copy)]
pub enum Start<'r> {
    /// The catalog root; the first steps name a collection and an id.
    Root,
    /// An entity, as if its `type:id` had been walked from the root.
    At(&'r EntityRef),
}

/// Position reached while walking a path.
enum Cursor<'a> {
    Root,
    Collection(EntityKind),
    Entity(&'a dyn Entity),
    Edges(&'a RefSet),
    Value(Value),
}

/// Resolves paths against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Navigator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Parse `path` and resolve it from `start`.
    pub fn resolve(&self, start: Start<'_>, path: &str) -> Result<Value, NavigationError> {
        let path = Path::parse(path)?;
        self.resolve_path(start, &path)
    }

    pub fn resolve_path(&self, start: Start<'_>, path: &Path) -> Result<Value, NavigationError> {
        match start {
            Start::Root => self.walk(Cursor::Root, path.steps(), None),
            Start::At(reference) => self.reenter(reference, path.steps()),
        }
    }

    /// Resolve `rest` from the catalog root with `reference` prepended.
    fn reenter(&self, reference: &EntityRef, rest: &[Step]) -> Result<Value, NavigationError> {
        let label = reference.to_string();
        let entity = self.catalog.get(reference).ok_or_else(|| {
            NavigationError::new(&label, "no such entity", &self.render(&Cursor::Root))
        })?;
        self.walk(Cursor::Entity(entity), rest, Some(&label))
    }

    fn walk(
        &self,
        mut cursor: Cursor<'a>,
        steps: &[Step],
        entered_by: Option<&str>,
    ) -> Result<Value, NavigationError> {
        let mut last = entered_by.map(ToString::to_string);

        for (i, step) in steps.iter().enumerate() {
            let rest = &steps[i + 1..];
            match step {
                Step::FanOut => {
                    let edges = self.edges(&cursor, step)?;
                    return edges
                        .iter()
                        .map(|reference| self.reenter(reference, rest))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::List);
                }
                Step::Pick(n) => {
                    let edges = self.edges(&cursor, step)?;
                    let reference = edges.get_index(*n).ok_or_else(|| {
                        self.fail(
                            step,
                            format!("index {n} out of range for {} keys", edges.len()),
                            &cursor,
                        )
                    })?;
                    return self.reenter(reference, rest);
                }
                Step::Field(name) => {
                    cursor = self.descend(cursor, step, name)?;
                    last = Some(name.clone());
                }
            }
        }

        match cursor {
            Cursor::Value(value) => Ok(value),
            Cursor::Edges(edges) => Ok(Value::Refs(edges.iter().cloned().collect())),
            other => Err(NavigationError::new(
                last.unwrap_or_default(),
                "path must end at an attribute",
                &self.render(&other),
            )),
        }
    }

    fn descend(&self, cursor: Cursor<'a>, step: &Step, name: &str) -> Result<Cursor<'a>, NavigationError> {
        match cursor {
            Cursor::Root => name
                .parse::<EntityKind>()
                .map(Cursor::Collection)
                .map_err(|_| self.fail(step, "no such collection", &cursor)),
            Cursor::Collection(kind) => {
                let reference = EntityRef::new(kind, EntityId::from_raw(name));
                self.catalog
                    .get(&reference)
                    .map(Cursor::Entity)
                    .ok_or_else(|| self.fail(step, "no such entity", &cursor))
            }
            Cursor::Entity(entity) => {
                if let Some(edges) = entity.edges(name) {
                    return Ok(Cursor::Edges(edges));
                }
                entity
                    .field(name)
                    .map(Cursor::Value)
                    .ok_or_else(|| self.fail(step, "no such attribute", &cursor))
            }
            Cursor::Edges(_) => Err(self.fail(
                step,
                "edge sets are navigated with `#` or `#N`",
                &cursor,
            )),
            Cursor::Value(_) => Err(self.fail(step, "cannot descend into a value", &cursor)),
        }
    }

    fn edges(&self, cursor: &Cursor<'a>, step: &Step) -> Result<&'a RefSet, NavigationError> {
        match cursor {
            Cursor::Edges(edges) => Ok(*edges),
            other => Err(self.fail(step, "selector requires an edge set", other)),
        }
    }

    fn fail(&self, step: &Step, reason: impl Into<String>, cursor: &Cursor<'_>) -> NavigationError {
        NavigationError::new(step.to_string(), reason, &self.render(cursor))
    }

    fn render(&self, cursor: &Cursor<'_>) -> String {
        match cursor {
            Cursor::Root => format!("catalog root ({})", self.catalog.counts()),
            Cursor::Collection(kind) => {
                format!("{kind} collection ({} entities)", self.catalog.len(*kind))
            }
            Cursor::Entity(entity) => format!("{entity:?}"),
            Cursor::Edges(edges) => {
                let keys: Vec<String> = edges.iter().map(ToString::to_string).collect();
                format!("{keys:?}")
            }
            Cursor::Value(value) => format!("{value:?}"),
        }
    }
}
