//! CLI Module
//!
//! Command-line interface for pcmloop.

pub mod commands;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::engine::Pcm16Audio;
use crate::error::{PcmError, Result};

/// pcmloop - unroll and split looping 16-bit PCM WAV files
#[derive(Parser, Debug)]
#[command(name = "pcmloop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a summary of a WAV file
    #[command(name = "info")]
    Info {
        /// Input WAV file
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        loop_args: LoopArgs,
    },

    /// Play the loop a number of times, then fade out
    #[command(name = "unroll")]
    Unroll {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Times to play the loop
        #[arg(short = 'n', long)]
        loops: Option<u32>,

        /// Fade-out length in seconds
        #[arg(short, long)]
        fade: Option<f64>,

        /// JSON file with render settings (flags take precedence)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        #[command(flatten)]
        loop_args: LoopArgs,
    },

    /// Write only the part before the loop
    #[command(name = "intro")]
    Intro {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        #[command(flatten)]
        loop_args: LoopArgs,
    },

    /// Write only the loop body
    #[command(name = "loop-body")]
    LoopBody {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        #[command(flatten)]
        loop_args: LoopArgs,
    },
}

/// Loop point overrides shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct LoopArgs {
    /// Loop from frame START until frame END, or until the end of the file.
    /// Without a value, loop the whole file.
    #[arg(
        long = "loop",
        value_name = "START[-END]",
        num_args = 0..=1,
        default_missing_value = "0",
        conflicts_with = "no_loop"
    )]
    pub loop_range: Option<LoopRange>,

    /// Ignore the loop stored in the file
    #[arg(long)]
    pub no_loop: bool,
}

impl LoopArgs {
    /// Apply the overrides to a loaded buffer
    ///
    /// # Errors
    /// * `InvalidLoopRange` - If the requested loop does not fit the buffer
    pub fn apply(&self, audio: &mut Pcm16Audio) -> Result<()> {
        if self.no_loop {
            audio.set_looping(false);
        }

        if let Some(range) = self.loop_range {
            let total_frames = audio.total_frames();
            let end = range.end.unwrap_or(total_frames);
            if end > total_frames || range.start > end {
                return Err(PcmError::InvalidLoopRange {
                    loop_start: range.start,
                    loop_end: end,
                    total_frames,
                });
            }

            audio.set_looping(true);
            audio.set_loop_start(range.start);
            audio.set_loop_end(end);
        }

        Ok(())
    }
}

/// Loop range given on the command line, in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopRange {
    pub start: usize,
    /// `None` loops until the end of the file
    pub end: Option<usize>,
}

impl FromStr for LoopRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid frame number '{}'", part))
        };

        match s.split_once('-') {
            Some((start, end)) => Ok(LoopRange {
                start: parse(start)?,
                end: Some(parse(end)?),
            }),
            None => Ok(LoopRange {
                start: parse(s)?,
                end: None,
            }),
        }
    }
}
