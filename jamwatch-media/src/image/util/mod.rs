pub mod blend;
pub mod draw;
