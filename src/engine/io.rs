//! WAV file I/O for pcmloop
//!
//! Reads and writes RIFF/WAVE files holding uncompressed integer PCM.
//! Sample data goes through `hound`; loop points travel in the RIFF sampler
//! (`smpl`) chunk, which `hound` skips, so that chunk is handled here.
//!
//! Only one forward loop (type 0) is supported. The loop end stored in the
//! chunk is treated as the exclusive end frame.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{Pcm16Audio, BITS_PER_SAMPLE};
use crate::error::{PcmError, Result};

/// Size of the fixed part of a `smpl` chunk
const SMPL_HEADER_LEN: usize = 36;

/// Size of one loop record in a `smpl` chunk
const SMPL_LOOP_LEN: usize = 24;

/// Offset of the loop count within the `smpl` chunk
const SMPL_LOOP_COUNT_OFFSET: usize = 28;

/// Size of the RIFF header ("RIFF", size, "WAVE")
const RIFF_HEADER_LEN: usize = 12;

/// Loop points read from a `smpl` chunk, in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPoints {
    pub start: usize,
    pub end: usize,
}

/// One loop record of a `smpl` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SampleLoop {
    pub loop_type: u32,
    pub start: u32,
    pub end: u32,
}

/// Import a WAV file
///
/// # Arguments
/// * `path` - Path to the WAV file to import
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the file is not 8-bit or 16-bit integer PCM, or
///   its `smpl` chunk holds something other than one forward loop
/// * `InvalidLoopRange` - If the loop ends past the last frame
pub fn import_wav(path: &Path) -> Result<Pcm16Audio> {
    if !path.exists() {
        return Err(PcmError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let bytes = fs::read(path)?;
    read_wav(&bytes)
}

/// Decode a WAV file held in memory
///
/// 8-bit files are widened to 16 bits.
pub fn read_wav(bytes: &[u8]) -> Result<Pcm16Audio> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(read_error)?;
    let spec = reader.spec();
    let samples = read_samples_as_i16(reader, spec)?;

    let (loop_start, loop_end) = match read_loop_points(bytes)? {
        Some(points) => (Some(points.start), Some(points.end)),
        None => (None, None),
    };

    Pcm16Audio::new(
        spec.channels as usize,
        spec.sample_rate,
        &samples,
        loop_start,
        loop_end,
    )
}

/// Find the loop points in the `smpl` chunk of a WAV file, if there is one
pub fn read_loop_points(bytes: &[u8]) -> Result<Option<LoopPoints>> {
    let mut offset = RIFF_HEADER_LEN;

    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let len = read_u32(bytes, offset + 4) as usize;
        let body_start = offset + 8;
        let body_end = match body_start.checked_add(len) {
            Some(end) => end,
            None => break,
        };

        if id == b"smpl" {
            let body = bytes
                .get(body_start..body_end)
                .ok_or_else(|| PcmError::InvalidAudio {
                    reason: format!(
                        "Unexpected end of data in \"smpl\" chunk: expected {} bytes, got {}",
                        len,
                        bytes.len() - body_start
                    ),
                    source: None,
                })?;
            return parse_smpl(body);
        }

        // Chunks are word-aligned
        offset = body_end + (len & 1);
    }

    Ok(None)
}

/// Export a buffer to a 16-bit WAV file
///
/// A `smpl` chunk with the loop points is written when the buffer loops.
pub fn export_wav(audio: &Pcm16Audio, path: &Path) -> Result<()> {
    let bytes = write_wav(audio)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Encode a buffer as a 16-bit WAV file in memory
pub fn write_wav(audio: &Pcm16Audio) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: audio.channels() as u16,
        sample_rate: audio.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(write_error)?;
        for &sample in audio.samples() {
            writer.write_sample(sample).map_err(write_error)?;
        }
        writer.finalize().map_err(write_error)?;
    }
    let mut bytes = cursor.into_inner();

    if audio.is_looping() {
        let sample_loop = SampleLoop {
            loop_type: 0,
            start: frame_to_u32(audio.loop_start())?,
            end: frame_to_u32(audio.loop_end())?,
        };
        append_chunk(&mut bytes, &smpl_chunk(audio.sample_rate(), &[sample_loop]))?;
    }

    Ok(bytes)
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from a WAV reader as 16-bit integers
fn read_samples_as_i16<R: std::io::Read>(mut reader: WavReader<R>, spec: WavSpec) -> Result<Vec<i16>> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(|e| PcmError::InvalidAudio {
                reason: format!("Failed to read 16-bit samples: {}", e),
                source: Some(Box::new(e)),
            }),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| i16::from(v) << 8))
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(|e| PcmError::InvalidAudio {
                reason: format!("Failed to read 8-bit samples: {}", e),
                source: Some(Box::new(e)),
            }),
        (SampleFormat::Int, bits) => Err(PcmError::UnsupportedFormat {
            format: format!("{}-bit audio (only 8-bit and 16-bit supported)", bits),
        }),
        (SampleFormat::Float, bits) => Err(PcmError::UnsupportedFormat {
            format: format!("{}-bit float audio (only uncompressed integer PCM supported)", bits),
        }),
    }
}

/// Parse the body of a `smpl` chunk
fn parse_smpl(body: &[u8]) -> Result<Option<LoopPoints>> {
    if body.len() < SMPL_HEADER_LEN {
        return Err(PcmError::InvalidAudio {
            reason: format!("\"smpl\" chunk too short: {} bytes", body.len()),
            source: None,
        });
    }

    match read_u32(body, SMPL_LOOP_COUNT_OFFSET) {
        0 => Ok(None),
        1 => {
            let record = body
                .get(SMPL_HEADER_LEN..SMPL_HEADER_LEN + SMPL_LOOP_LEN)
                .ok_or_else(|| PcmError::InvalidAudio {
                    reason: "\"smpl\" chunk declares a loop but has no loop record".to_string(),
                    source: None,
                })?;

            let loop_type = read_u32(record, 4);
            if loop_type != 0 {
                return Err(PcmError::UnsupportedFormat {
                    format: format!("loop of type {} (only type 0 supported)", loop_type),
                });
            }

            Ok(Some(LoopPoints {
                start: read_u32(record, 8) as usize,
                end: read_u32(record, 12) as usize,
            }))
        }
        count => Err(PcmError::UnsupportedFormat {
            format: format!("{} loops in \"smpl\" chunk (only one supported)", count),
        }),
    }
}

/// Build a complete `smpl` chunk (header included)
pub(crate) fn smpl_chunk(sample_rate: u32, loops: &[SampleLoop]) -> Vec<u8> {
    let body_len = SMPL_HEADER_LEN + SMPL_LOOP_LEN * loops.len();
    let mut chunk = Vec::with_capacity(8 + body_len);

    chunk.extend_from_slice(b"smpl");
    chunk.extend_from_slice(&(body_len as u32).to_le_bytes());

    // manufacturer, product
    chunk.extend_from_slice(&[0; 8]);
    // sample period in nanoseconds
    chunk.extend_from_slice(&(1_000_000_000 / sample_rate).to_le_bytes());
    // MIDI unity note, pitch fraction, SMPTE format, SMPTE offset
    chunk.extend_from_slice(&[0; 16]);
    chunk.extend_from_slice(&(loops.len() as u32).to_le_bytes());
    // sampler data
    chunk.extend_from_slice(&0_u32.to_le_bytes());

    for (id, sample_loop) in loops.iter().enumerate() {
        for value in [
            id as u32,
            sample_loop.loop_type,
            sample_loop.start,
            sample_loop.end,
            0, // fraction
            0, // play count (infinite)
        ] {
            chunk.extend_from_slice(&value.to_le_bytes());
        }
    }

    chunk
}

/// Append a chunk to a RIFF file and fix up the RIFF size
pub(crate) fn append_chunk(bytes: &mut Vec<u8>, chunk: &[u8]) -> Result<()> {
    bytes.extend_from_slice(chunk);
    if chunk.len() % 2 == 1 {
        bytes.push(0);
    }

    let riff_size = u32::try_from(bytes.len() - 8).map_err(|_| {
        PcmError::invalid_argument("Audio too large for a WAV file (4 GB limit)")
    })?;
    bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());
    Ok(())
}

fn frame_to_u32(frame: usize) -> Result<u32> {
    u32::try_from(frame).map_err(|_| {
        PcmError::invalid_argument(format!("Loop point {} does not fit in a WAV file", frame))
    })
}

/// Read a little-endian u32; the caller guarantees the bounds
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0_u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(raw)
}

fn read_error(e: hound::Error) -> PcmError {
    match e {
        hound::Error::Unsupported | hound::Error::InvalidSampleFormat => {
            PcmError::UnsupportedFormat {
                format: e.to_string(),
            }
        }
        other => PcmError::InvalidAudio {
            reason: format!("Failed to read WAV data: {}", other),
            source: Some(Box::new(other)),
        },
    }
}

fn write_error(e: hound::Error) -> PcmError {
    match e {
        hound::Error::IoError(io) => PcmError::Io(io),
        other => PcmError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn wav_bytes<S: hound::Sample + Copy>(spec: WavSpec, samples: &[S]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &sample in samples {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn spec(channels: u16, bits_per_sample: u16, sample_format: SampleFormat) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample,
            sample_format,
        }
    }

    #[test]
    fn test_write_read_non_looping() {
        let audio = Pcm16Audio::from_interleaved(&[1, -1, 300, -300, i16::MAX, i16::MIN], 2, 22050)
            .unwrap();
        let bytes = write_wav(&audio).unwrap();

        assert_eq!(read_loop_points(&bytes).unwrap(), None);
        let decoded = read_wav(&bytes).unwrap();
        assert_eq!(decoded, audio);
    }

    #[test]
    fn test_write_read_looping() {
        let audio = Pcm16Audio::new(1, 32000, &[5, 6, 7, 8, 9, 10], Some(2), Some(5)).unwrap();
        let bytes = write_wav(&audio).unwrap();

        assert_eq!(
            read_loop_points(&bytes).unwrap(),
            Some(LoopPoints { start: 2, end: 5 })
        );

        let riff_size = read_u32(&bytes, 4) as usize;
        assert_eq!(riff_size, bytes.len() - 8);

        let decoded = read_wav(&bytes).unwrap();
        assert!(decoded.is_looping());
        assert_eq!(decoded.loop_start(), 2);
        assert_eq!(decoded.loop_end(), 5);
        assert_eq!(decoded.samples(), audio.samples());
    }

    #[test]
    fn test_read_8bit_widens() {
        let bytes = wav_bytes(spec(1, 8, SampleFormat::Int), &[0_i8, 1, -128, 127]);
        let decoded = read_wav(&bytes).unwrap();
        assert_eq!(decoded.samples(), &[0, 256, -32768, 32512]);
    }

    #[test]
    fn test_read_float_unsupported() {
        let bytes = wav_bytes(spec(1, 32, SampleFormat::Float), &[0.5_f32, -0.5]);
        assert!(matches!(
            read_wav(&bytes),
            Err(PcmError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_read_24bit_unsupported() {
        let bytes = wav_bytes(spec(1, 24, SampleFormat::Int), &[0_i32, 1000]);
        assert!(matches!(
            read_wav(&bytes),
            Err(PcmError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_read_garbage() {
        let result = read_wav(b"RIFX0000WAVEjunk");
        assert!(matches!(result, Err(PcmError::InvalidAudio { .. })));
    }

    #[test]
    fn test_smpl_with_two_loops_unsupported() {
        let mut bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[0_i16; 8]);
        let loops = [
            SampleLoop { loop_type: 0, start: 0, end: 4 },
            SampleLoop { loop_type: 0, start: 4, end: 8 },
        ];
        append_chunk(&mut bytes, &smpl_chunk(22050, &loops)).unwrap();

        assert!(matches!(
            read_wav(&bytes),
            Err(PcmError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_smpl_with_pingpong_loop_unsupported() {
        let mut bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[0_i16; 8]);
        let loops = [SampleLoop { loop_type: 1, start: 0, end: 4 }];
        append_chunk(&mut bytes, &smpl_chunk(22050, &loops)).unwrap();

        assert!(matches!(
            read_wav(&bytes),
            Err(PcmError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_smpl_without_loops() {
        let mut bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[0_i16; 8]);
        append_chunk(&mut bytes, &smpl_chunk(22050, &[])).unwrap();

        let decoded = read_wav(&bytes).unwrap();
        assert!(!decoded.is_looping());
    }

    #[test]
    fn test_smpl_loop_past_end() {
        let mut bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[0_i16; 8]);
        let loops = [SampleLoop { loop_type: 0, start: 2, end: 9 }];
        append_chunk(&mut bytes, &smpl_chunk(22050, &loops)).unwrap();

        assert!(matches!(
            read_wav(&bytes),
            Err(PcmError::InvalidLoopRange { .. })
        ));
    }

    #[test]
    fn test_smpl_inverted_loop_loads() {
        let mut bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[0_i16; 8]);
        let loops = [SampleLoop { loop_type: 0, start: 6, end: 3 }];
        append_chunk(&mut bytes, &smpl_chunk(22050, &loops)).unwrap();

        let decoded = read_wav(&bytes).unwrap();
        assert!(decoded.is_looping());
        assert_eq!(decoded.loop_start(), 6);
        assert_eq!(decoded.loop_end(), 3);
    }

    #[test]
    fn test_smpl_after_odd_chunk() {
        // An odd-sized chunk must be followed by a pad byte
        let mut bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[0_i16; 8]);
        append_chunk(&mut bytes, b"note\x03\x00\x00\x00abc").unwrap();
        let loops = [SampleLoop { loop_type: 0, start: 1, end: 3 }];
        append_chunk(&mut bytes, &smpl_chunk(22050, &loops)).unwrap();

        assert_eq!(
            read_loop_points(&bytes).unwrap(),
            Some(LoopPoints { start: 1, end: 3 })
        );
    }

    #[test]
    fn test_truncated_smpl() {
        let mut bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[0_i16; 8]);
        let loops = [SampleLoop { loop_type: 0, start: 1, end: 3 }];
        append_chunk(&mut bytes, &smpl_chunk(22050, &loops)).unwrap();
        bytes.truncate(bytes.len() - 10);

        assert!(matches!(
            read_loop_points(&bytes),
            Err(PcmError::InvalidAudio { .. })
        ));
    }

    #[test]
    fn test_export_import_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loop.wav");

        let audio = Pcm16Audio::new(2, 44100, &[1, 2, 3, 4, 5, 6, 7, 8], Some(1), None).unwrap();
        export_wav(&audio, &path).unwrap();

        let imported = import_wav(&path).unwrap();
        assert_eq!(imported, audio);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_wav(Path::new("/nonexistent/path/audio.wav"));

        match result.unwrap_err() {
            PcmError::FileNotFound { path, .. } => {
                assert!(path.contains("nonexistent"));
            }
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }
}
