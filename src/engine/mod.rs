//! Audio Engine Module
//!
//! Core PCM buffer and everything around it:
//! - 16-bit PCM buffer with loop points
//! - Loop rendering plan and observer hook
//! - Block frame reader
//! - Render settings
//! - WAV file I/O

pub mod buffer;
pub mod io;
pub mod reader;
pub mod render;
pub mod settings;

pub use buffer::{Pcm16Audio, BITS_PER_SAMPLE, MAX_CHANNELS};
pub use io::{export_wav, import_wav, read_loop_points, read_wav, write_wav, LoopPoints};
pub use reader::FrameReader;
pub use render::{LogObserver, NullObserver, RenderObserver, RenderPlan};
pub use settings::RenderSettings;
