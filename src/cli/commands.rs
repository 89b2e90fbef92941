//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::cli::LoopArgs;
use crate::engine::{export_wav, import_wav, LogObserver, Pcm16Audio, RenderSettings};
use crate::error::Result;

/// Machine-readable summary printed by `info --json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioSummary {
    pub sample_rate: u32,
    pub channels: usize,
    pub samples: usize,
    pub frames: usize,
    pub duration_secs: f64,
    pub looping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_end: Option<usize>,
}

impl From<&Pcm16Audio> for AudioSummary {
    fn from(audio: &Pcm16Audio) -> Self {
        let looping = audio.is_looping();
        AudioSummary {
            sample_rate: audio.sample_rate(),
            channels: audio.channels(),
            samples: audio.samples().len(),
            frames: audio.total_frames(),
            duration_secs: audio.duration_secs(),
            looping,
            loop_start: looping.then(|| audio.loop_start()),
            loop_end: looping.then(|| audio.loop_end()),
        }
    }
}

/// Combine a settings file with command-line overrides.
pub fn resolve_settings(
    settings_path: Option<&Path>,
    loops: Option<u32>,
    fade: Option<f64>,
) -> Result<RenderSettings> {
    let mut settings = match settings_path {
        Some(path) => RenderSettings::load(path)?,
        None => RenderSettings::default(),
    };

    if let Some(loop_count) = loops {
        settings.loop_count = loop_count;
    }
    if let Some(fade_seconds) = fade {
        settings.fade_seconds = fade_seconds;
    }

    settings.validate()?;
    Ok(settings)
}

/// Load a WAV file and apply the loop overrides.
pub fn load(input: &Path, loop_args: &LoopArgs) -> Result<Pcm16Audio> {
    info!("Reading: {}", input.display());

    let mut audio = import_wav(input)?;
    loop_args.apply(&mut audio)?;
    Ok(audio)
}

/// Print a summary of a WAV file.
pub fn info(input: &Path, loop_args: &LoopArgs, json: bool) -> Result<()> {
    let audio = load(input, loop_args)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&AudioSummary::from(&audio))?);
    } else {
        println!("{}", audio);
    }

    Ok(())
}

/// Unroll the loop and write the result.
pub fn unroll(
    input: &Path,
    output: &Path,
    loop_args: &LoopArgs,
    settings: RenderSettings,
) -> Result<()> {
    let audio = load(input, loop_args)?;
    if !audio.is_looping() {
        warn!("{} has no loop; writing it unchanged", input.display());
    }

    let rendered = audio.play_loop_and_fade_observed(
        settings.loop_count,
        settings.fade_seconds,
        &mut LogObserver,
    )?;
    export_wav(&rendered, output)?;

    println!("Wrote {}: {}", output.display(), rendered);

    Ok(())
}

/// Write the part before the loop.
pub fn intro(input: &Path, output: &Path, loop_args: &LoopArgs) -> Result<()> {
    let audio = load(input, loop_args)?;
    if !audio.is_looping() {
        warn!("{} has no loop; the intro is empty", input.display());
    }

    let segment = audio.pre_loop_segment();
    export_wav(&segment, output)?;

    println!("Wrote {}: {}", output.display(), segment);

    Ok(())
}

/// Write the loop body.
pub fn loop_body(input: &Path, output: &Path, loop_args: &LoopArgs) -> Result<()> {
    let audio = load(input, loop_args)?;
    if !audio.is_looping() {
        warn!("{} has no loop; writing the whole file", input.display());
    }

    let segment = audio.loop_segment();
    export_wav(&segment, output)?;

    println!("Wrote {}: {}", output.display(), segment);

    Ok(())
}
