//! Caller-owned output rasters.

/// An 8-bit raster with one (gray) or three (RGB) channels per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u16,
    height: u16,
    channels: u8,
    data: Vec<u8>,
}

impl Raster {
    /// Create a new white raster.
    pub fn new(width: u16, height: u16, channels: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;

        Self {
            width,
            height,
            channels,
            data: vec![0xff; len],
        }
    }

    /// Return the width of the raster.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Return the height of the raster.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Return the number of channels per pixel.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Return the samples of the raster, in row-major order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return the samples of the raster for modification.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Return the pixels of a three-channel raster.
    pub fn rgb_pixels(&self) -> Option<&[[u8; 3]]> {
        (self.channels == 3).then(|| bytemuck::cast_slice(&self.data))
    }

    /// Consume the raster, returning its samples.
    pub fn take_u8(self) -> Vec<u8> {
        self.data
    }

    #[cfg(feature = "png")]
    fn color_type(&self) -> image::ExtendedColorType {
        if self.channels == 1 {
            image::ExtendedColorType::L8
        } else {
            image::ExtendedColorType::Rgb8
        }
    }

    /// Encode the raster into a PNG file.
    #[cfg(feature = "png")]
    pub fn take_png(self) -> Result<Vec<u8>, image::ImageError> {
        use image::ImageEncoder;
        use image::codecs::png::PngEncoder;

        let mut png_data = Vec::new();
        let encoder = PngEncoder::new(std::io::Cursor::new(&mut png_data));
        encoder.write_image(
            &self.data,
            self.width as u32,
            self.height as u32,
            self.color_type(),
        )?;

        Ok(png_data)
    }

    /// Encode the raster into a binary PNM file (PGM for one channel, PPM for
    /// three).
    #[cfg(feature = "png")]
    pub fn to_pnm(&self) -> Result<Vec<u8>, image::ImageError> {
        use image::ImageEncoder;
        use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};

        let subtype = if self.channels == 1 {
            PnmSubtype::Graymap(SampleEncoding::Binary)
        } else {
            PnmSubtype::Pixmap(SampleEncoding::Binary)
        };

        let mut pnm_data = Vec::new();
        PnmEncoder::new(&mut pnm_data)
            .with_subtype(subtype)
            .write_image(
                &self.data,
                self.width as u32,
                self.height as u32,
                self.color_type(),
            )?;

        Ok(pnm_data)
    }
}
