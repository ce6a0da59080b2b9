use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::brush::{BrushConfig, BrushSize, PaintColor};
use crate::error::ConfigError;

/// Path of an optional JSON config file
pub const CONFIG_PATH_ENV: &str = "SKETCH_IT_CONFIG";
/// Overrides the export directory from any other source
pub const EXPORT_DIR_ENV: &str = "SKETCH_IT_EXPORT_DIR";

/// User settings. Persisted by eframe between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct SketchConfig {
    pub export_dir: PathBuf,
    pub brush_size: BrushSize,
    pub color: PaintColor,
    pub share_after_export: bool,
    pub canvas_background: PaintColor,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            brush_size: BrushSize::default(),
            color: PaintColor::default(),
            share_after_export: true,
            canvas_background: PaintColor::White,
        }
    }
}

impl SketchConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Defaults, overlaid by the file named in `SKETCH_IT_CONFIG` if it exists.
    /// A broken file is logged and ignored.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Apply environment overrides. Called after every other source.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(EXPORT_DIR_ENV) {
            self.export_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn brush(&self) -> BrushConfig {
        BrushConfig {
            color: self.color.color32(),
            thickness: self.brush_size.thickness(),
        }
    }
}

/// `<cache dir>/sketch_it/exports`, or the temp dir when there is no cache dir
pub fn default_export_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("sketch_it")
        .join("exports")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: SketchConfig = serde_json::from_str(r#"{ "color": "Red" }"#).unwrap();
        assert_eq!(config.color, PaintColor::Red);
        assert_eq!(config.brush_size, BrushSize::Medium);
        assert!(config.share_after_export);
        assert_eq!(config.export_dir, default_export_dir());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = SketchConfig {
            export_dir: PathBuf::from("/tmp/exports"),
            brush_size: BrushSize::Large,
            color: PaintColor::Blue,
            share_after_export: false,
            canvas_background: PaintColor::Yellow,
        };
        config.save(&path).unwrap();
        assert_eq!(SketchConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SketchConfig::load(&path),
            Err(ConfigError::Serialization(_))
        ));
    }

    #[test]
    fn test_brush_from_config() {
        let config = SketchConfig {
            brush_size: BrushSize::Small,
            color: PaintColor::Green,
            ..Default::default()
        };
        let brush = config.brush();
        assert_eq!(brush.thickness, 10.0);
        assert_eq!(brush.color, PaintColor::Green.color32());
    }
}
