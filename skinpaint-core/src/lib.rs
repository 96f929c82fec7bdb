#![warn(clippy::pedantic)]

pub mod atlas;
pub mod color;
pub mod coord;
pub mod projector;
pub mod raster;
pub mod scheduler;
pub mod session;
pub mod stroke;
pub mod tools;

pub use color::Color;
pub use coord::Coordinate;
pub use raster::Raster;
pub use session::{Config, InputEvent, InputKind, Session};
pub use tools::Tool;
