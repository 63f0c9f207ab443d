//! ARGB pixel canvas read by the playback cursor and the offline renderer.
//!
//! Row 0 is the top of the canvas and carries the highest pitch; oscillator 0
//! (55 Hz) reads the bottom row.

use crate::error::{CanvasError, Result};

pub const OPAQUE_BLACK: u32 = 0xff00_0000;

#[inline]
pub fn red(color: u32) -> u8 {
    ((color & 0x00ff_0000) >> 16) as u8
}

#[inline]
pub fn green(color: u32) -> u8 {
    ((color & 0x0000_ff00) >> 8) as u8
}

#[inline]
pub fn blue(color: u32) -> u8 {
    (color & 0x0000_00ff) as u8
}

#[inline]
pub fn red_normalized(color: u32) -> f32 {
    red(color) as f32 / 255.0
}

#[inline]
pub fn green_normalized(color: u32) -> f32 {
    green(color) as f32 / 255.0
}

#[inline]
pub fn blue_normalized(color: u32) -> f32 {
    blue(color) as f32 / 255.0
}

#[inline]
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Opaque color from normalized channels; each channel is clamped and truncated.
pub fn color_from_normalized(red: f32, green: f32, blue: f32) -> u32 {
    let channel = |value: f32| (clamp01(value) * 255.0) as u32;
    OPAQUE_BLACK | (channel(red) << 16) | (channel(green) << 8) | channel(blue)
}

/// Stereo gains for one pixel: blue drives the left channel, red the right.
#[inline]
pub fn pixel_amplitudes(color: u32, overall_gain: f32) -> (f32, f32) {
    (
        blue_normalized(color) * overall_gain,
        red_normalized(color) * overall_gain,
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelImage {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PixelImage {
    /// Opaque black canvas.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, OPAQUE_BLACK)
    }

    pub fn filled(width: usize, height: usize, color: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyImage);
        }
        Ok(Self {
            width,
            height,
            pixels: vec![color; width * height],
        })
    }

    /// Wrap a row-major pixel buffer.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(CanvasError::EmptyImage);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, row: usize, column: usize) -> u32 {
        self.pixels[row * self.width + column]
    }

    pub fn set_pixel(&mut self, row: usize, column: usize, color: u32) {
        if row < self.height && column < self.width {
            self.pixels[row * self.width + column] = color;
        }
    }

    /// Canvas row read by `oscillator`.
    #[inline]
    pub fn row_for_oscillator(&self, oscillator: usize) -> usize {
        self.height - 1 - oscillator
    }

    #[inline]
    pub fn oscillator_pixel(&self, oscillator: usize, column: usize) -> u32 {
        self.pixel(self.row_for_oscillator(oscillator), column)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(OPAQUE_BLACK);
    }
}
