use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// All user-facing options. Detector options are passed through to the pose
/// engine verbatim; the compositor only ever reads `visible_debug`.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Mirror the camera feed horizontally before detection.
    #[serde(default = "default_selfie_mode")]
    pub selfie_mode: bool,
    /// Start with the skeleton debug overlay visible.
    #[serde(default)]
    pub visible_debug: bool,
    /// Directory holding the arm sprite images.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Override the pose model location (defaults to `models/`).
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub detector: DetectorOptions,
}

/// Options forwarded to the pose engine. Several of these exist only so a
/// swapped-in engine can honor them; the bundled one uses the confidence
/// thresholds and logs the rest.
#[derive(Debug, Deserialize, Clone)]
pub struct DetectorOptions {
    #[serde(default = "default_model_complexity")]
    pub model_complexity: u8,
    #[serde(default = "default_true")]
    pub smooth_landmarks: bool,
    #[serde(default)]
    pub enable_segmentation: bool,
    #[serde(default = "default_true")]
    pub smooth_segmentation: bool,
    #[serde(default = "default_confidence")]
    pub min_detection_confidence: f32,
    #[serde(default = "default_confidence")]
    pub min_tracking_confidence: f32,
    #[serde(default = "default_effect")]
    pub effect: String,
}

fn default_selfie_mode() -> bool {
    true
}
fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}
fn default_model_complexity() -> u8 {
    1
}
fn default_true() -> bool {
    true
}
fn default_confidence() -> f32 {
    0.5
}
fn default_effect() -> String {
    "background".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selfie_mode: default_selfie_mode(),
            visible_debug: false,
            assets_dir: default_assets_dir(),
            model_path: None,
            detector: DetectorOptions::default(),
        }
    }
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            model_complexity: default_model_complexity(),
            smooth_landmarks: true,
            enable_segmentation: false,
            smooth_segmentation: true,
            min_detection_confidence: default_confidence(),
            min_tracking_confidence: default_confidence(),
            effect: default_effect(),
        }
    }
}

impl Config {
    /// Load from the given TOML file, or fall back to defaults when the file
    /// does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_control_panel() {
        let config = Config::default();
        assert!(config.selfie_mode);
        assert!(!config.visible_debug);
        assert_eq!(config.detector.model_complexity, 1);
        assert!(config.detector.smooth_landmarks);
        assert!(!config.detector.enable_segmentation);
        assert!(config.detector.smooth_segmentation);
        assert_eq!(config.detector.min_detection_confidence, 0.5);
        assert_eq!(config.detector.min_tracking_confidence, 0.5);
        assert_eq!(config.detector.effect, "background");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            visible_debug = true

            [detector]
            min_detection_confidence = 0.8
            "#,
        )
        .unwrap();
        assert!(config.visible_debug);
        assert!(config.selfie_mode);
        assert_eq!(config.detector.min_detection_confidence, 0.8);
        assert_eq!(config.detector.min_tracking_confidence, 0.5);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_or_default("does/not/exist.toml").unwrap();
        assert!(config.selfie_mode);
    }
}
