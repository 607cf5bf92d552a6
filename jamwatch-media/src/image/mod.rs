pub mod decoder;
pub mod encoder;
pub mod image;
pub mod util;
