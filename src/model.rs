pub mod names;
pub mod space;

pub use names::NameTable;
pub use space::{Space, SpaceId};
