use crate::Image;

impl Image {
    /// `(width, height)` in pixels.
    pub fn get_size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }
}
