//! Domain models consumed by the inventory engine

mod line_item;
mod lot;
mod movement;
mod product;

pub use line_item::*;
pub use lot::*;
pub use movement::*;
pub use product::*;
