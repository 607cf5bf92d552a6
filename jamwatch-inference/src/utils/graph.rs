use num::{Num, ToPrimitive};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point<T: Num> {
    pub x: T,
    pub y: T,
}

impl<T: Num> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Point { x, y }
    }
}

impl<T: Num + ToPrimitive + Copy> Point<T> {
    pub fn to_f64(&self) -> (f64, f64) {
        (
            self.x.to_f64().unwrap_or(0.0),
            self.y.to_f64().unwrap_or(0.0),
        )
    }
}

impl Point<f32> {
    /// Drops the fractional part, the same conversion a detector's float
    /// outline goes through before it reaches the integer geometry.
    pub fn truncate(&self) -> Point<i32> {
        Point {
            x: self.x as i32,
            y: self.y as i32,
        }
    }
}

impl<T: Num> From<(T, T)> for Point<T> {
    fn from((x, y): (T, T)) -> Self {
        Point { x, y }
    }
}

/// Raster resolution shared by every mask; all polygon coordinates are
/// interpreted in this space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        ImageSize { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize::new(800, 800)
    }
}
