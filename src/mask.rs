use image::{Rgba, RgbaImage};

use crate::{PixelPos, ViewportSize};

/// RGBA8 raster with transparent background, sized to the viewport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    image: RgbaImage,
}

impl Mask {
    pub fn transparent(size: ViewportSize) -> Self {
        Self {
            image: RgbaImage::new(size.width(), size.height()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0)
    }

    /// A pixel counts as selected as soon as it is not fully transparent
    pub fn is_selected(&self, pos: PixelPos) -> bool {
        match (u32::try_from(pos.x), u32::try_from(pos.y)) {
            (Ok(x), Ok(y)) => self.pixel(x, y).is_some_and(|[_, _, _, a]| a > 0),
            _ => false,
        }
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(self.image.as_raw())
    }

    pub fn selected_pixel_count(&self) -> usize {
        self.pixels().iter().filter(|[_, _, _, a]| *a > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels().iter().all(|[_, _, _, a]| *a == 0)
    }

    /// Raw RGBA bytes, row-major, e.g. for texture uploads
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
            if x < self.width() && y < self.height() {
                self.image.put_pixel(x, y, Rgba(color));
            }
        }
    }

    /// Fills `x_start..=x_end` of row `y`, clipped to the raster
    pub(crate) fn fill_span(&mut self, y: i32, x_start: i32, x_end: i32, color: [u8; 4]) {
        let Ok(y) = u32::try_from(y) else {
            return;
        };
        if y >= self.height() || x_end < 0 {
            return;
        }
        let start = x_start.max(0) as u32;
        let end = (x_end as u32).min(self.width() - 1);
        for x in start..=end {
            self.image.put_pixel(x, y, Rgba(color));
        }
    }
}

/// The two rasters produced by one rasterization pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMasks {
    /// Pixels inside the current selection geometry
    pub area: Mask,
    /// Outline, control points and modifier glyph
    pub shape: Mask,
}

impl SelectionMasks {
    pub fn transparent(size: ViewportSize) -> Self {
        Self {
            area: Mask::transparent(size),
            shape: Mask::transparent(size),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.area.width(), self.area.height())
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_empty() && self.shape.is_empty()
    }
}
