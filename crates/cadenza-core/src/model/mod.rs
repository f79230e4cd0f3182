pub mod entity;
pub mod ids;
pub mod item;
pub mod named;
pub mod track;
pub mod value;

pub use entity::{Entity, Links};
pub use ids::{EntityId, EntityKind, EntityRef, RefSet};
pub use item::Item;
pub use named::{Album, Artist, Genre};
pub use track::Track;
pub use value::Value;
