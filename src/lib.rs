pub mod cell;
pub mod cellspace;
pub mod config;
pub mod light_cone;
pub mod point;
pub mod rules;
pub mod world;

pub use cell::Cell;
pub use cellspace::Cellspace;

/// Signed coordinate of a single automaton cell.
pub type WorldOffset = i64;

/// Generation offset, relative to some cell's reference time.
pub type Generation = i64;
