pub mod runner;
pub mod table;
#[cfg(feature = "physics")]
pub mod world;

pub use runner::TableRunner;
pub use table::Table;
#[cfg(feature = "physics")]
pub use world::{BallMaterial, TableGeometry, TableWorld};
