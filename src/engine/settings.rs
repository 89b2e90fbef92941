//! Render settings for loop unrolling
//!
//! Settings can be built in code or loaded from a JSON file such as:
//!
//! ```json
//! { "loop_count": 3, "fade_seconds": 5.0 }
//! ```
//!
//! Missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PcmError, Result};

/// Default number of times the loop is played
pub const DEFAULT_LOOP_COUNT: u32 = 2;

/// Default fade-out length in seconds
pub const DEFAULT_FADE_SECONDS: f64 = 10.0;

/// How many times to play the loop and how long to fade out afterwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Times to play the loop (at least 1)
    pub loop_count: u32,
    /// Fade-out after the last loop, in seconds (0 or greater)
    pub fade_seconds: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            loop_count: DEFAULT_LOOP_COUNT,
            fade_seconds: DEFAULT_FADE_SECONDS,
        }
    }
}

impl RenderSettings {
    /// Create settings with the given loop count and fade length
    pub fn new(loop_count: u32, fade_seconds: f64) -> Self {
        RenderSettings {
            loop_count,
            fade_seconds,
        }
    }

    /// Load settings from a JSON file
    ///
    /// # Errors
    /// * `FileNotFound` - If the file does not exist
    /// * `Serialization` - If the file is not valid settings JSON
    /// * `InvalidArgument` - If the loaded values are out of range
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PcmError::FileNotFound {
            path: path.display().to_string(),
            source: Some(e),
        })?;
        let settings: RenderSettings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the values are usable for rendering
    pub fn validate(&self) -> Result<()> {
        if self.loop_count < 1 {
            return Err(PcmError::invalid_argument("Loop count must be at least 1"));
        }
        if !self.fade_seconds.is_finite() || self.fade_seconds < 0.0 {
            return Err(PcmError::invalid_argument(format!(
                "Fade length must be 0 seconds or greater, got {}",
                self.fade_seconds
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert_eq!(settings.loop_count, 2);
        assert_relative_eq!(settings.fade_seconds, 10.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: RenderSettings = serde_json::from_str(r#"{ "loop_count": 4 }"#).unwrap();
        assert_eq!(settings.loop_count, 4);
        assert_relative_eq!(settings.fade_seconds, DEFAULT_FADE_SECONDS);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(RenderSettings::new(0, 1.0).validate().is_err());
        assert!(RenderSettings::new(1, -0.5).validate().is_err());
        assert!(RenderSettings::new(1, f64::NAN).validate().is_err());
        assert!(RenderSettings::new(1, 0.0).validate().is_ok());
    }

    #[test]
    fn test_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("render.json");
        fs::write(&path, r#"{ "loop_count": 3, "fade_seconds": 2.5 }"#).unwrap();

        let settings = RenderSettings::load(&path).unwrap();
        assert_eq!(settings, RenderSettings::new(3, 2.5));
    }

    #[test]
    fn test_load_invalid() {
        let dir = tempdir().unwrap();

        let path = dir.path().join("zero.json");
        fs::write(&path, r#"{ "loop_count": 0 }"#).unwrap();
        assert!(matches!(
            RenderSettings::load(&path),
            Err(PcmError::InvalidArgument { .. })
        ));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ loop_count").unwrap();
        assert!(matches!(
            RenderSettings::load(&path),
            Err(PcmError::Serialization(_))
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            RenderSettings::load(&missing),
            Err(PcmError::FileNotFound { .. })
        ));
    }
}
