//! Carry buffer between the host's callback size and the engine block.
//!
//! The synth ramps amplitudes across exactly one engine block, so it is always
//! called with `engine_block_size` frames no matter what the device asks for.

use crate::audio_renderer::AudioRenderer;

pub(crate) struct AudioBuffer<R: AudioRenderer> {
    pub(crate) renderer: R,
    pub(crate) engine_block_size: usize,
    pub(crate) carry_left: Vec<f32>,
    pub(crate) carry_right: Vec<f32>,
    pub(crate) carry_available: usize,
    pub(crate) carry_index: usize,
}

impl<R: AudioRenderer> AudioBuffer<R> {
    pub(crate) fn new(renderer: R, engine_block_size: usize) -> Self {
        let engine_block_size = engine_block_size.max(1);

        Self {
            renderer,
            engine_block_size,
            carry_left: vec![0.0; engine_block_size],
            carry_right: vec![0.0; engine_block_size],
            carry_available: 0,
            carry_index: 0,
        }
    }

    /// Fill `total_frames` frames, calling `write(frame, left, right)` for each.
    pub(crate) fn pull(&mut self, total_frames: usize, mut write: impl FnMut(usize, f32, f32)) {
        let mut frames_written = 0;
        while frames_written < total_frames {
            if self.carry_available == 0 {
                self.renderer
                    .process_block(&mut self.carry_left, &mut self.carry_right);
                self.carry_index = 0;
                self.carry_available = self.engine_block_size;
                continue;
            }

            let frames_to_copy = (total_frames - frames_written).min(self.carry_available);
            for i in 0..frames_to_copy {
                let carry_pos = self.carry_index + i;
                write(
                    frames_written + i,
                    self.carry_left[carry_pos],
                    self.carry_right[carry_pos],
                );
            }

            frames_written += frames_to_copy;
            self.carry_index += frames_to_copy;
            self.carry_available -= frames_to_copy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Emits a running sample counter and records every block size it is asked for.
    struct CountingRenderer {
        next_sample: usize,
        blocks: Vec<usize>,
    }

    impl AudioRenderer for CountingRenderer {
        fn process_block(&mut self, output_left: &mut [f32], output_right: &mut [f32]) {
            self.blocks.push(output_left.len());
            for (left, right) in output_left.iter_mut().zip(output_right.iter_mut()) {
                *left = self.next_sample as f32;
                *right = -(self.next_sample as f32);
                self.next_sample += 1;
            }
        }
    }

    #[test]
    fn host_callbacks_of_any_size_see_whole_engine_blocks() {
        let renderer = CountingRenderer {
            next_sample: 0,
            blocks: Vec::new(),
        };
        let mut buffer = AudioBuffer::new(renderer, 256);

        let mut left = Vec::new();
        let mut right = Vec::new();
        for host_frames in [100, 300, 256] {
            let start = left.len();
            buffer.pull(host_frames, |frame, l, r| {
                assert_eq!(frame, left.len() - start);
                left.push(l);
                right.push(r);
            });
            assert_eq!(left.len() - start, host_frames);
        }

        // 656 frames pulled: three engine blocks, 112 frames still carried.
        assert_eq!(buffer.renderer.blocks, vec![256, 256, 256]);
        assert_eq!(buffer.carry_available, 112);
        for (i, (&l, &r)) in left.iter().zip(&right).enumerate() {
            assert_eq!(l, i as f32);
            assert_eq!(r, -(i as f32));
        }
    }

    #[test]
    fn zero_block_size_is_raised_to_one() {
        let renderer = CountingRenderer {
            next_sample: 0,
            blocks: Vec::new(),
        };
        let mut buffer = AudioBuffer::new(renderer, 0);
        let mut frames = 0;
        buffer.pull(3, |_, _, _| frames += 1);
        assert_eq!(frames, 3);
        assert_eq!(buffer.renderer.blocks, vec![1, 1, 1]);
    }
}
