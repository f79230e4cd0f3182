use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::{EntityId, EntityKind, EntityRef, RefSet};
use crate::model::value::Value;

/// Mirrored parent/child edge sets carried by every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub children: RefSet,
    #[serde(default)]
    pub parents: RefSet,
}

/// Common view over the five entity types, used by the navigator.
pub trait Entity: fmt::Debug + Send + Sync {
    fn id(&self) -> &EntityId;

    fn kind(&self) -> EntityKind;

    fn links(&self) -> &Links;

    fn links_mut(&mut self) -> &mut Links;

    /// Kind-specific scalar attribute, `None` if the kind has no such
    /// attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    fn reference(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id().clone())
    }

    /// The named edge set, if `name` is `children` or `parents`.
    fn edges(&self, name: &str) -> Option<&RefSet> {
        match name {
            "children" => Some(&self.links().children),
            "parents" => Some(&self.links().parents),
            _ => None,
        }
    }

    /// Raw value of any field, edge sets included.
    fn field(&self, name: &str) -> Option<Value> {
        if let Some(edges) = self.edges(name) {
            return Some(Value::Refs(edges.iter().cloned().collect()));
        }
        match name {
            "id" => Some(Value::text(self.id().as_str())),
            "type" => Some(Value::text(self.kind().as_str())),
            _ => self.attribute(name),
        }
    }
}

/// Implements [`Entity`] for a struct with `id` and `links` fields; the
/// closure-like tail supplies the kind-specific attributes.
macro_rules! impl_entity {
    ($ty:ty, $kind:expr, |$this:ident, $name:ident| $attributes:expr) => {
        impl $crate::model::entity::Entity for $ty {
            fn id(&self) -> &$crate::model::ids::EntityId {
                &self.id
            }

            fn kind(&self) -> $crate::model::ids::EntityKind {
                $kind
            }

            fn links(&self) -> &$crate::model::entity::Links {
                &self.links
            }

            fn links_mut(&mut self) -> &mut $crate::model::entity::Links {
                &mut self.links
            }

            fn attribute(&self, $name: &str) -> Option<$crate::model::value::Value> {
                let $this = self;
                $attributes
            }
        }
    };
}

pub(crate) use impl_entity;
