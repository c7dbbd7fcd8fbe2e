//! Progressive accumulation buffer and tone mapping.
//!
//! Keeps the running linear sum and sample count per pixel and a tone-mapped
//! 8-bit copy that is refreshed every time a pixel receives samples, so a
//! half-converged image can be shown at any moment with correct exposure.
//!
//! Rows are stored bottom-up: row 0 is the bottom scanline, matching the
//! camera's `v` coordinate. Exporters flip to top-down.

use crate::Color;
use image::RgbImage;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Map one averaged linear channel to a display byte.
///
/// `255.99 * sqrt(x)` truncated, clamped to `[0, 255]` so over-bright
/// samples saturate instead of wrapping. NaN maps to 0.
#[inline]
pub fn tone_map_channel(linear: f32) -> u8 {
    (255.99 * linear_to_gamma(linear)).clamp(0.0, 255.0) as u8
}

/// Tone-map a running sum over `samples` samples.
#[inline]
pub fn tone_map(sum: Color, samples: u32) -> [u8; 3] {
    let avg = sum / samples.max(1) as f32;
    [
        tone_map_channel(avg.x),
        tone_map_channel(avg.y),
        tone_map_channel(avg.z),
    ]
}

/// Per-pixel running radiance sums with a tone-mapped display copy.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    width: u32,
    height: u32,
    sum: Vec<Color>,
    sample_count: Vec<u32>,
    /// RGB bytes, three per pixel
    display: Vec<u8>,
}

impl AccumulationBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            sum: vec![Color::ZERO; pixels],
            sample_count: vec![0; pixels],
            display: vec![0; pixels * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Add one sample to pixel `(x, y)` and refresh its display value.
    pub fn add_sample(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.accumulate(idx, color);
    }

    /// Add one sample to every pixel of row `y`. `colors` holds one entry
    /// per column.
    pub fn add_row(&mut self, y: u32, colors: &[Color]) {
        let start = self.index(0, y);
        for (x, color) in colors.iter().take(self.width as usize).enumerate() {
            self.accumulate(start + x, *color);
        }
    }

    fn accumulate(&mut self, idx: usize, color: Color) {
        self.sum[idx] += color;
        self.sample_count[idx] += 1;
        let rgb = tone_map(self.sum[idx], self.sample_count[idx]);
        self.display[idx * 3..idx * 3 + 3].copy_from_slice(&rgb);
    }

    /// Running linear sum at `(x, y)`.
    pub fn sum(&self, x: u32, y: u32) -> Color {
        self.sum[self.index(x, y)]
    }

    pub fn sample_count(&self, x: u32, y: u32) -> u32 {
        self.sample_count[self.index(x, y)]
    }

    /// Averaged linear color at `(x, y)`, black if never sampled.
    pub fn average(&self, x: u32, y: u32) -> Color {
        let idx = self.index(x, y);
        self.sum[idx] / self.sample_count[idx].max(1) as f32
    }

    /// Tone-mapped RGB at `(x, y)`.
    pub fn display_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = self.index(x, y) * 3;
        [self.display[idx], self.display[idx + 1], self.display[idx + 2]]
    }

    /// The whole tone-mapped buffer, bottom row first, RGB interleaved.
    pub fn display(&self) -> &[u8] {
        &self.display
    }

    /// Tone-mapped bytes of one row.
    pub fn display_row(&self, y: u32) -> &[u8] {
        let start = self.index(0, y) * 3;
        &self.display[start..start + self.width as usize * 3]
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.sum.fill(Color::ZERO);
        self.sample_count.fill(0);
        self.display.fill(0);
    }

    /// Copy of the display buffer as a top-down image.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut raw = Vec::with_capacity(self.display.len());
        for y in (0..self.height).rev() {
            raw.extend_from_slice(self.display_row(y));
        }
        // Buffer length is exactly width * height * 3
        RgbImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_tone_map_clamps() {
        assert_eq!(tone_map_channel(0.0), 0);
        assert_eq!(tone_map_channel(1.0), 255);
        assert_eq!(tone_map_channel(4.0), 255);
        assert_eq!(tone_map_channel(-0.5), 0);
        assert_eq!(tone_map_channel(f32::NAN), 0);
        assert_eq!(tone_map_channel(0.25), 127);
    }

    #[test]
    fn test_unsampled_pixels_are_black() {
        let buffer = AccumulationBuffer::new(3, 2);
        assert_eq!(buffer.display().len(), 18);
        assert!(buffer.display().iter().all(|&b| b == 0));
        assert_eq!(buffer.average(2, 1), Color::ZERO);
    }

    #[test]
    fn test_display_tracks_average() {
        let mut buffer = AccumulationBuffer::new(2, 2);
        buffer.add_sample(1, 0, Color::new(1.0, 0.0, 0.25));
        assert_eq!(buffer.display_pixel(1, 0), [255, 0, 127]);

        buffer.add_sample(1, 0, Color::new(0.0, 0.0, 0.25));
        assert_eq!(buffer.sample_count(1, 0), 2);
        assert_eq!(buffer.sum(1, 0), Color::new(1.0, 0.0, 0.5));
        // avg 0.5 -> 255.99 * 0.7071 = 181.01
        assert_eq!(buffer.display_pixel(1, 0), [181, 0, 127]);

        // Neighbours untouched
        assert_eq!(buffer.sample_count(0, 0), 0);
        assert_eq!(buffer.display_pixel(0, 1), [0, 0, 0]);
    }

    #[test]
    fn test_over_range_radiance_saturates() {
        let mut buffer = AccumulationBuffer::new(1, 1);
        buffer.add_sample(0, 0, Color::new(9.0, 1.5, 1.0));
        assert_eq!(buffer.display_pixel(0, 0), [255, 255, 255]);
    }

    #[test]
    fn test_accumulation_is_order_independent() {
        // Exactly representable samples, so float sums are exact
        let samples: Vec<Vec<Color>> = (0..6)
            .map(|pass| {
                (0..4)
                    .map(|x| Color::new(0.25 * (pass % 3) as f32, 0.125 * x as f32, 0.5))
                    .collect()
            })
            .collect();

        let mut forward = AccumulationBuffer::new(4, 3);
        let mut reverse = AccumulationBuffer::new(4, 3);
        for row in 0..3 {
            for pass in &samples {
                forward.add_row(row, pass);
            }
        }
        for row in (0..3).rev() {
            for pass in samples.iter().rev() {
                reverse.add_row(row, pass);
            }
        }

        assert_eq!(forward.display(), reverse.display());
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(forward.sum(x, y), reverse.sum(x, y));
                assert_eq!(forward.sample_count(x, y), 6);
            }
        }
    }

    #[test]
    fn test_rgb_image_is_top_down() {
        let mut buffer = AccumulationBuffer::new(1, 2);
        buffer.add_sample(0, 0, Color::new(1.0, 0.0, 0.0)); // bottom
        buffer.add_sample(0, 1, Color::new(0.0, 0.0, 1.0)); // top

        let image = buffer.to_rgb_image();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = AccumulationBuffer::new(2, 2);
        buffer.add_sample(0, 0, Color::ONE);
        buffer.clear();

        assert_eq!(buffer.sample_count(0, 0), 0);
        assert_eq!(buffer.display_pixel(0, 0), [0, 0, 0]);
    }
}
