//! Block reader over a [`Pcm16Audio`]
//!
//! Hands out frames in fixed-size blocks, the way an encoder or playback
//! callback consumes them. The reader borrows the buffer, so the samples
//! cannot change while it is in use.

use crate::engine::buffer::Pcm16Audio;

/// Cursor that reads frames from a buffer
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    audio: &'a Pcm16Audio,
    /// Current frame index
    position: usize,
}

impl<'a> FrameReader<'a> {
    /// Create a reader positioned at the first frame
    pub fn new(audio: &'a Pcm16Audio) -> Self {
        Self { audio, position: 0 }
    }

    /// Current frame index
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Frames left before the end of the buffer
    #[inline]
    pub fn remaining_frames(&self) -> usize {
        self.audio.total_frames().saturating_sub(self.position)
    }

    /// Check if every frame has been read
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining_frames() == 0
    }

    /// Go back to the first frame
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Jump to the start of the loop, or to the first frame if the buffer
    /// does not loop
    pub fn wrap(&mut self) {
        self.position = if self.audio.is_looping() {
            self.audio.loop_start()
        } else {
            0
        };
    }

    /// Copy up to `frames` frames into `dest` and advance
    ///
    /// The count is also limited by the capacity of `dest` and by the frames
    /// left in the buffer.
    ///
    /// # Returns
    /// Number of frames copied
    pub fn read_frames(&mut self, dest: &mut [i16], frames: usize) -> usize {
        let channels = self.audio.channels();
        let count = frames
            .min(dest.len() / channels)
            .min(self.remaining_frames());

        let start = self.position * channels;
        let end = start + count * channels;
        dest[..count * channels].copy_from_slice(&self.audio.samples()[start..end]);
        self.position += count;

        count
    }

    /// Fill `dest` with whole frames, wrapping from the loop end back to the
    /// loop start
    ///
    /// A non-looping buffer stops at its last frame.
    ///
    /// # Returns
    /// Number of frames written
    pub fn fill_looping(&mut self, dest: &mut [i16]) -> usize {
        let channels = self.audio.channels();
        let wanted = dest.len() / channels;
        let looping = self.audio.is_looping() && self.audio.loop_length() > 0;

        let mut written = 0;
        while written < wanted {
            let limit = if looping {
                self.audio.loop_end()
            } else {
                self.audio.total_frames()
            };
            let available = limit.saturating_sub(self.position);
            if available == 0 {
                if looping {
                    self.wrap();
                    continue;
                }
                break;
            }

            let count = available.min(wanted - written);
            let src = self.position * channels;
            dest[written * channels..(written + count) * channels]
                .copy_from_slice(&self.audio.samples()[src..src + count * channels]);
            self.position += count;
            written += count;
        }

        written
    }
}
