//! 16-bit PCM Audio Buffer
//!
//! Provides [`Pcm16Audio`], an interleaved 16-bit PCM buffer with optional
//! loop points, and the transformations derived from it: the intro before the
//! loop, the loop body on its own, and the fully unrolled loop with fade-out.
//!
//! The frame count of a buffer is fixed at construction. Sample content and
//! loop metadata may change afterwards, but loop bounds are only validated by
//! the constructor.

use std::borrow::Cow;
use std::fmt;
use std::slice::ChunksExact;

use crate::engine::render::{NullObserver, RenderObserver, RenderPlan};
use crate::error::{PcmError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Largest supported channel count (the maximum of a signed 16-bit integer)
pub const MAX_CHANNELS: usize = i16::MAX as usize;

/// Bits per sample for every buffer
pub const BITS_PER_SAMPLE: u16 = 16;

// ============================================================================
// Audio Buffer
// ============================================================================

/// Interleaved 16-bit PCM audio with an optional loop
///
/// Samples are stored frame by frame: `[L0, R0, L1, R1, ...]` for stereo.
/// Loop points are frame indices; `loop_end` is exclusive.
///
/// # Example
/// ```
/// use pcmloop::engine::Pcm16Audio;
///
/// let audio = Pcm16Audio::new(1, 1000, &[10, 20, 30, 40, 50], Some(1), Some(4)).unwrap();
/// let unrolled = audio.play_loop_and_fade(2, 0.0).unwrap();
/// assert_eq!(unrolled.samples(), &[10, 20, 30, 40, 20, 30, 40]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcm16Audio {
    channels: usize,
    sample_rate: u32,
    samples: Vec<i16>,
    looping: bool,
    loop_start: usize,
    loop_end: usize,
}

impl Pcm16Audio {
    /// Create a buffer from interleaved samples
    ///
    /// The samples are copied; `sample_data` is never retained.
    ///
    /// # Arguments
    /// * `channels` - Number of channels (1 to 32767)
    /// * `sample_rate` - Sample rate in Hz (must be positive)
    /// * `sample_data` - Interleaved samples
    /// * `loop_start` - First frame of the loop, or `None` for no loop
    /// * `loop_end` - Frame after the last loop frame, or `None` for the end of the data
    ///
    /// # Errors
    /// * `InvalidArgument` - If the channel count or sample rate is out of range
    /// * `InvalidLoopRange` - If both loop points are given and `loop_end` is past
    ///   the last frame
    ///
    /// Any other loop range is stored as given, including a `loop_start` past
    /// the end or after `loop_end`. Extracting the loop from such a buffer panics.
    pub fn new(
        channels: usize,
        sample_rate: u32,
        sample_data: &[i16],
        loop_start: Option<usize>,
        loop_end: Option<usize>,
    ) -> Result<Self> {
        if channels > MAX_CHANNELS {
            return Err(PcmError::invalid_argument(format!(
                "Streams of more than {} channels not supported",
                MAX_CHANNELS
            )));
        }
        if channels == 0 {
            return Err(PcmError::invalid_argument(
                "Number of channels must be a positive integer",
            ));
        }
        if sample_rate == 0 {
            return Err(PcmError::invalid_argument(
                "Sample rate must be a positive integer",
            ));
        }

        let total_frames = sample_data.len() / channels;
        if let (Some(start), Some(end)) = (loop_start, loop_end) {
            if end > total_frames {
                return Err(PcmError::InvalidLoopRange {
                    loop_start: start,
                    loop_end: end,
                    total_frames,
                });
            }
        }

        Ok(Self::from_parts(
            channels,
            sample_rate,
            sample_data.to_vec(),
            loop_start,
            loop_end,
        ))
    }

    /// Create a non-looping buffer from interleaved samples
    pub fn from_interleaved(sample_data: &[i16], channels: usize, sample_rate: u32) -> Result<Self> {
        Self::new(channels, sample_rate, sample_data, None, None)
    }

    /// Assemble a buffer from already-validated parts, applying the loop defaults
    fn from_parts(
        channels: usize,
        sample_rate: u32,
        samples: Vec<i16>,
        loop_start: Option<usize>,
        loop_end: Option<usize>,
    ) -> Self {
        let total_frames = samples.len() / channels;
        Self {
            channels,
            sample_rate,
            samples,
            looping: loop_start.is_some(),
            loop_start: loop_start.unwrap_or(0),
            // Set even when not looping
            loop_end: loop_end.unwrap_or(total_frames),
        }
    }

    /// Build a new buffer sharing this buffer's format
    fn derive(&self, samples: Vec<i16>, loop_start: Option<usize>, loop_end: Option<usize>) -> Self {
        Self::from_parts(self.channels, self.sample_rate, samples, loop_start, loop_end)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// All interleaved samples
    #[inline]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Mutable access to the sample content
    ///
    /// Returns a slice, so the length of the buffer can never change.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn total_frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Check if the buffer holds no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_frames() == 0
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.total_frames() as f64 / self.sample_rate as f64
    }

    /// Get the samples of one frame, or `None` past the end
    pub fn frame(&self, index: usize) -> Option<&[i16]> {
        let start = index.checked_mul(self.channels)?;
        self.samples.get(start..start + self.channels)
    }

    /// Iterate over frames
    pub fn frames(&self) -> ChunksExact<'_, i16> {
        self.samples.chunks_exact(self.channels)
    }

    // ------------------------------------------------------------------------
    // Loop metadata
    // ------------------------------------------------------------------------

    /// Whether the buffer carries a loop
    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// First frame of the loop
    #[inline]
    pub fn loop_start(&self) -> usize {
        self.loop_start
    }

    /// Frame after the last frame of the loop
    #[inline]
    pub fn loop_end(&self) -> usize {
        self.loop_end
    }

    /// Frames in one loop iteration, zero if the loop is inverted
    #[inline]
    pub fn loop_length(&self) -> usize {
        self.loop_end.saturating_sub(self.loop_start)
    }

    /// Turn the loop on or off without touching the loop points
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Move the loop start. Not validated.
    pub fn set_loop_start(&mut self, frame: usize) {
        self.loop_start = frame;
    }

    /// Move the loop end. Not validated.
    pub fn set_loop_end(&mut self, frame: usize) {
        self.loop_end = frame;
    }

    /// Samples of the loop body
    pub(crate) fn loop_body(&self) -> &[i16] {
        &self.samples[self.channels * self.loop_start..self.channels * self.loop_end]
    }

    // ------------------------------------------------------------------------
    // Derived buffers
    // ------------------------------------------------------------------------

    /// Create a new non-looping buffer containing only the frames before the loop
    ///
    /// # Panics
    /// Panics if `loop_start` was set past the end of the buffer.
    pub fn pre_loop_segment(&self) -> Pcm16Audio {
        let data = self.samples[..self.channels * self.loop_start].to_vec();
        self.derive(data, None, None)
    }

    /// Create a new looping buffer containing only the loop body
    ///
    /// The whole returned buffer is the loop: it starts at frame 0 and ends at
    /// the last frame.
    ///
    /// # Panics
    /// Panics if the loop points were set outside the buffer or inverted.
    pub fn loop_segment(&self) -> Pcm16Audio {
        self.derive(self.loop_body().to_vec(), Some(0), None)
    }

    /// Render the buffer with the loop played `loop_count` times, followed by
    /// `fade_seconds` of linear fade-out
    ///
    /// If the buffer does not loop, or if `loop_count` is 1 and there is no
    /// fade, the buffer itself is returned as [`Cow::Borrowed`]. Otherwise a
    /// new buffer is rendered. It keeps the original loop points and is still
    /// flagged as looping, so it should not be unrolled a second time.
    ///
    /// The fade continues the loop body from its first frame, wrapping around
    /// when the fade is longer than one iteration.
    ///
    /// # Errors
    /// * `InvalidArgument` - If `loop_count` is 0, `fade_seconds` is negative
    ///   or not finite, or the rendered buffer would be too large to address
    ///
    /// # Panics
    /// Panics if the loop points were set outside the buffer or inverted.
    pub fn play_loop_and_fade(&self, loop_count: u32, fade_seconds: f64) -> Result<Cow<'_, Pcm16Audio>> {
        self.play_loop_and_fade_observed(loop_count, fade_seconds, &mut NullObserver)
    }

    /// Same as [`Pcm16Audio::play_loop_and_fade`], reporting to `observer`
    pub fn play_loop_and_fade_observed(
        &self,
        loop_count: u32,
        fade_seconds: f64,
        observer: &mut dyn RenderObserver,
    ) -> Result<Cow<'_, Pcm16Audio>> {
        if !self.looping {
            return Ok(Cow::Borrowed(self));
        }
        if loop_count == 1 && fade_seconds == 0.0 {
            return Ok(Cow::Borrowed(self));
        }

        if loop_count < 1 {
            return Err(PcmError::invalid_argument(
                "Loop count must be at least 1. To play only the portion before the loop, use pre_loop_segment.",
            ));
        }
        if !fade_seconds.is_finite() || fade_seconds < 0.0 {
            return Err(PcmError::invalid_argument(format!(
                "Fade length must be 0 seconds or greater, got {}",
                fade_seconds
            )));
        }

        let plan = self.render_plan(loop_count, fade_seconds)?;
        observer.on_plan(&plan);

        let channels = self.channels;
        let mut data = Vec::with_capacity(plan.total_frames * channels);

        data.extend_from_slice(&self.samples[..channels * self.loop_start]);
        observer.on_progress(plan.intro_frames, plan.total_frames);

        let body = self.loop_body();
        for iteration in 1..=loop_count as usize {
            data.extend_from_slice(body);
            observer.on_progress(
                plan.intro_frames + plan.loop_frames * iteration,
                plan.total_frames,
            );
        }

        if plan.fade_frames > 0 {
            // An empty loop body leaves the fade silent
            data.resize(plan.total_frames * channels, 0);
            let fade_frames = plan.fade_frames as f64;
            let fade = data[plan.fade_start() * channels..].chunks_exact_mut(channels);
            for (i, (dest, src)) in fade.zip(body.chunks_exact(channels).cycle()).enumerate() {
                let factor = (fade_frames - i as f64) / fade_frames;
                for (out, &sample) in dest.iter_mut().zip(src) {
                    *out = (f64::from(sample) * factor) as i16;
                }
            }
            observer.on_progress(plan.total_frames, plan.total_frames);
        }

        observer.on_finish();

        Ok(Cow::Owned(self.derive(
            data,
            Some(self.loop_start),
            Some(self.loop_end),
        )))
    }

    /// Compute the layout of an unrolled buffer
    ///
    /// # Errors
    /// * `InvalidArgument` - If the fade or the whole buffer has more samples
    ///   than a `Vec<i16>` can hold
    pub fn render_plan(&self, loop_count: u32, fade_seconds: f64) -> Result<RenderPlan> {
        let too_long = || {
            PcmError::invalid_argument(format!(
                "Looping {} times with a {}s fade is too long to render",
                loop_count, fade_seconds
            ))
        };

        let fade = (f64::from(self.sample_rate) * fade_seconds).floor();
        // usize::MAX as f64 rounds up, so anything at or above it cannot fit
        if fade >= usize::MAX as f64 {
            return Err(too_long());
        }
        let fade_frames = fade as usize;

        let loop_frames = self.loop_length();
        let total_frames = loop_frames
            .checked_mul(loop_count as usize)
            .and_then(|frames| frames.checked_add(self.loop_start))
            .and_then(|frames| frames.checked_add(fade_frames))
            .ok_or_else(too_long)?;
        let max_samples = isize::MAX as usize / std::mem::size_of::<i16>();
        match total_frames.checked_mul(self.channels) {
            Some(samples) if samples <= max_samples => {}
            _ => return Err(too_long()),
        }

        Ok(RenderPlan {
            loop_count,
            fade_seconds,
            fade_frames,
            intro_frames: self.loop_start,
            loop_frames,
            total_frames,
        })
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// One-line human readable summary (same text as `Display`)
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pcm16Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds =
            self.samples.len() as u64 / (u64::from(self.sample_rate) * self.channels as u64);
        write!(
            f,
            "{}Hz {} channels: {} (",
            self.sample_rate,
            self.channels,
            self.samples.len()
        )?;
        let days = seconds / 86_400;
        if days > 0 {
            write!(f, "{}.", days)?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02})",
            seconds / 3600 % 24,
            seconds / 60 % 60,
            seconds % 60
        )?;
        if self.looping {
            write!(f, " loop {}-{}", self.loop_start, self.loop_end)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
