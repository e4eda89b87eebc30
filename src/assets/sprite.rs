use crate::foundation::error::{ReelError, ReelResult};

/// A premultiplied RGBA8 raster ready to be painted onto the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
}

impl Sprite {
    /// Wrap premultiplied pixels, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> ReelResult<Self> {
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return Err(ReelError::validation(format!(
                "sprite byte length {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Uniformly scale to `width`, preserving aspect ratio.
    pub fn scaled_to_width(&self, width: u32) -> ReelResult<Self> {
        if width == 0 || self.width == 0 {
            return Err(ReelError::validation("cannot scale sprite to zero width"));
        }
        let height = ((f64::from(self.height) * f64::from(width) / f64::from(self.width)).round()
            as u32)
            .max(1);
        let src = image::RgbaImage::from_raw(self.width, self.height, self.rgba8_premul.clone())
            .ok_or_else(|| ReelError::validation("sprite buffer does not match its size"))?;
        // Filtering premultiplied pixels keeps transparent edges free of colour fringes.
        let scaled =
            image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle);
        Ok(Self {
            width,
            height,
            rgba8_premul: scaled.into_raw(),
        })
    }
}
