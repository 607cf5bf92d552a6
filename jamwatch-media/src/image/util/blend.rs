use crate::Image;
use anyhow::{bail, Result};
use rayon::prelude::*;

impl Image {
    /// Mixes `overlay` into this frame: `alpha * overlay + (1 - alpha) * self`.
    pub fn blend(&mut self, overlay: &Image, alpha: f32) -> Result<()> {
        if overlay.get_size() != self.get_size() {
            bail!(
                "Overlay of {:?} does not match a {:?} frame",
                overlay.get_size(),
                self.get_size()
            );
        }

        let alpha = alpha.clamp(0.0, 1.0);
        self.frame_mut()
            .par_iter_mut()
            .zip(overlay.raw_data().par_iter())
            .for_each(|(base, &top)| {
                let mixed = top as f32 * alpha + *base as f32 * (1.0 - alpha);
                *base = mixed.round() as u8;
            });

        Ok(())
    }
}
