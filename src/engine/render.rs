//! Loop rendering plan and observer hook
//!
//! [`Pcm16Audio::play_loop_and_fade`](crate::engine::Pcm16Audio::play_loop_and_fade)
//! is pure. Callers that want to report what it is doing pass a
//! [`RenderObserver`] to the `_observed` variant instead.

use log::{debug, info};

/// Layout of an unrolled buffer, computed before any allocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    /// Times the loop body is repeated
    pub loop_count: u32,
    /// Requested fade-out length in seconds
    pub fade_seconds: f64,
    /// Fade-out length in frames (`floor(sample_rate * fade_seconds)`)
    pub fade_frames: usize,
    /// Frames before the loop
    pub intro_frames: usize,
    /// Frames in one loop iteration
    pub loop_frames: usize,
    /// Frames in the rendered buffer
    pub total_frames: usize,
}

impl RenderPlan {
    /// Frame index at which the fade-out begins
    pub fn fade_start(&self) -> usize {
        self.intro_frames + self.loop_frames * self.loop_count as usize
    }
}

/// Receives diagnostics while a looped buffer is rendered
///
/// Every method has a no-op default so implementors only override what
/// they report.
pub trait RenderObserver {
    /// Called once, before the output buffer is allocated
    fn on_plan(&mut self, _plan: &RenderPlan) {}

    /// Called after the intro, after each loop copy and after the fade
    fn on_progress(&mut self, _frames_written: usize, _total_frames: usize) {}

    /// Called once the output buffer is complete
    fn on_finish(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RenderObserver for NullObserver {}

/// Observer that reports through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RenderObserver for LogObserver {
    fn on_plan(&mut self, plan: &RenderPlan) {
        info!(
            "Looping {} times with fadeout of {}s ({} frames)",
            plan.loop_count, plan.fade_seconds, plan.fade_frames
        );
    }

    fn on_progress(&mut self, frames_written: usize, total_frames: usize) {
        debug!("Rendered {}/{} frames", frames_written, total_frames);
    }

    fn on_finish(&mut self) {
        debug!("Render complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_start() {
        let plan = RenderPlan {
            loop_count: 3,
            fade_seconds: 0.5,
            fade_frames: 500,
            intro_frames: 10,
            loop_frames: 100,
            total_frames: 810,
        };
        assert_eq!(plan.fade_start(), 310);
        assert_eq!(plan.fade_start() + plan.fade_frames, plan.total_frames);
    }

    #[test]
    fn test_default_methods_are_noops() {
        let plan = RenderPlan {
            loop_count: 1,
            fade_seconds: 0.0,
            fade_frames: 0,
            intro_frames: 0,
            loop_frames: 4,
            total_frames: 4,
        };
        let mut observer = NullObserver;
        observer.on_plan(&plan);
        observer.on_progress(4, 4);
        observer.on_finish();

        let mut observer = LogObserver;
        observer.on_plan(&plan);
        observer.on_progress(4, 4);
        observer.on_finish();
    }
}
