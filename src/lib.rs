//! pcmloop - Looping 16-bit PCM Audio
//!
//! pcmloop holds interleaved 16-bit PCM audio together with optional loop
//! points and derives new buffers from it:
//! 1. The intro that plays before the loop
//! 2. The loop body on its own
//! 3. The loop played a number of times, followed by a linear fade-out
//!
//! # Architecture
//!
//! - `engine::buffer`: the `Pcm16Audio` buffer and its transformations
//! - `engine::io`: WAV import/export, loop points in the `smpl` chunk
//! - `engine::reader`: block reads with loop wrap-around
//! - `cli`: the `pcmloop-cli` command line tool

pub mod cli;
pub mod engine;
pub mod error;

pub use engine::{Pcm16Audio, RenderSettings};
pub use error::{PcmError, Result};
