use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, RgbImage};
use ndarray::ArrayView3;

/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only (camera decode, display
/// upload); everything in between works on packed RGB.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// A frame where every byte equals `value` (mid-gray placeholder etc.).
    pub fn uniform(width: u32, height: u32, value: u8, index: usize) -> Self {
        let len = width as usize * height as usize * 3;
        Self::new(vec![value; len], width, height, 3, index)
    }

    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Mutable RGB image view over the frame's own buffer.
    pub fn as_rgb_image_mut(&mut self) -> ImageBuffer<Rgb<u8>, &mut [u8]> {
        debug_assert_eq!(self.channels, 3, "RGB view requires 3 channels");
        ImageBuffer::from_raw(self.width, self.height, self.data.as_mut_slice())
            .expect("Frame data length must match dimensions")
    }

    /// Bilinear resize into a new frame, keeping the index.
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let view: ImageBuffer<Rgb<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width, self.height, self.data.as_slice())
                .expect("Frame data length must match dimensions");
        let resized = imageops::resize(&view, width, height, FilterType::Triangle);
        Frame::from_rgb_image(resized, self.index)
    }

    /// Mirrors the frame left-to-right in place.
    pub fn mirror_horizontal(&mut self) {
        let mut view = self.as_rgb_image_mut();
        imageops::flip_horizontal_in_place(&mut view);
    }

    /// Packed RGBA bytes with opaque alpha, as expected by image widgets.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.data.chunks_exact(self.channels as usize) {
            match px {
                [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
                [r, g, b, a] => rgba.extend_from_slice(&[*r, *g, *b, *a]),
                [v] => rgba.extend_from_slice(&[*v, *v, *v, 255]),
                _ => rgba.extend_from_slice(&[0, 0, 0, 255]),
            }
        }
        rgba
    }

    /// True when all pixels hold the same value in every channel.
    pub fn is_uniform(&self, value: u8) -> bool {
        self.data.iter().all(|&b| b == value)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
