pub mod bounds;
pub mod crs;

pub use bounds::Bounds;
pub use crs::Crs;
