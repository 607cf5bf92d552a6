pub mod engine;
pub mod inference;
pub mod utils;

pub use inference::{Detector, Segment};
pub use utils::graph::{ImageSize, Point};
