//! Built-in demo canvas: an A minor progression painted as horizontal strokes.

use crate::error::Result;
use crate::image::{color_from_normalized, PixelImage};

/// Oscillator steps per semitone (oscillators are spaced a quarter tone apart).
pub const STEPS_PER_SEMITONE: usize = 2;
pub const STEPS_PER_OCTAVE: usize = 24;

/// One painted note: a pitch held over a span of columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Semitones above A1 (55 Hz).
    pub semitone: usize,
    pub start_column: usize,
    pub length: usize,
    /// Stereo position, 0 = left (blue) .. 1 = right (red).
    pub pan: f32,
    pub level: f32,
}

impl Stroke {
    pub fn oscillator(&self) -> usize {
        self.semitone * STEPS_PER_SEMITONE
    }
}

/// Paint `stroke` with a linear fade towards its end.
pub fn paint_stroke(image: &mut PixelImage, stroke: &Stroke) {
    let oscillator = stroke.oscillator();
    if oscillator >= image.height() || stroke.length == 0 {
        return;
    }
    let row = image.row_for_oscillator(oscillator);
    let end = (stroke.start_column + stroke.length).min(image.width());
    for column in stroke.start_column..end {
        let fade = 1.0 - (column - stroke.start_column) as f32 / stroke.length as f32;
        let level = stroke.level * fade;
        let color = color_from_normalized(level * stroke.pan, 0.0, level * (1.0 - stroke.pan));
        image.set_pixel(row, column, color);
    }
}

// Am - F - C - G, as semitones above A.
const PROGRESSION: [[usize; 3]; 4] = [[0, 3, 7], [8, 12, 15], [3, 7, 10], [10, 14, 17]];

/// Demo score sized to `width` x `oscillator_count`.
pub fn demo_score(width: usize, oscillator_count: usize) -> Result<PixelImage> {
    let mut image = PixelImage::new(width, oscillator_count)?;
    let bar = (width / PROGRESSION.len()).max(1);

    for (bar_index, chord) in PROGRESSION.iter().enumerate() {
        let start = bar_index * bar;
        // Chord one octave up, root doubled in the bass.
        let root = Stroke {
            semitone: chord[0],
            start_column: start,
            length: bar,
            pan: 0.5,
            level: 1.0,
        };
        paint_stroke(&mut image, &root);

        for (voice, &semitone) in chord.iter().enumerate() {
            let stroke = Stroke {
                semitone: semitone + 12,
                start_column: start,
                length: bar,
                pan: if voice % 2 == 0 { 0.25 } else { 0.75 },
                level: 0.8,
            };
            paint_stroke(&mut image, &stroke);
        }

        // Arpeggio two octaves up, one note per quarter bar.
        let step = (bar / 4).max(1);
        for (i, &semitone) in chord.iter().chain(chord.iter().take(1)).enumerate() {
            let stroke = Stroke {
                semitone: semitone + 24,
                start_column: start + i * step,
                length: step,
                pan: i as f32 / 3.0,
                level: 0.6,
            };
            paint_stroke(&mut image, &stroke);
        }
    }

    log::debug!(
        "demo score painted: {}x{}, {} bars of {} columns",
        width,
        oscillator_count,
        PROGRESSION.len(),
        bar
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{blue, red, OPAQUE_BLACK};

    #[test]
    fn stroke_lands_on_its_oscillator_row() {
        let mut image = PixelImage::new(8, 30).unwrap();
        let stroke = Stroke {
            semitone: 12,
            start_column: 2,
            length: 4,
            pan: 0.0,
            level: 1.0,
        };
        paint_stroke(&mut image, &stroke);
        assert_eq!(image.oscillator_pixel(24, 2), 0xff00_00ff);
        assert_eq!(image.oscillator_pixel(24, 1), OPAQUE_BLACK);
        assert_eq!(image.oscillator_pixel(24, 6), OPAQUE_BLACK);
        // Fades towards the end of the stroke.
        assert!(blue(image.oscillator_pixel(24, 5)) < blue(image.oscillator_pixel(24, 3)));
    }

    #[test]
    fn strokes_above_the_canvas_are_dropped() {
        let mut image = PixelImage::new(4, 10).unwrap();
        let stroke = Stroke {
            semitone: 20,
            start_column: 0,
            length: 4,
            pan: 1.0,
            level: 1.0,
        };
        paint_stroke(&mut image, &stroke);
        assert!(image.pixels().iter().all(|&p| p == OPAQUE_BLACK));
    }

    #[test]
    fn demo_score_has_a_root_in_every_bar() {
        let image = demo_score(64, 239).unwrap();
        for (bar, chord) in PROGRESSION.iter().enumerate() {
            let color = image.oscillator_pixel(chord[0] * STEPS_PER_SEMITONE, bar * 16);
            assert!(red(color) > 0 && blue(color) > 0, "bar {}", bar);
        }
    }
}
