use anyhow::{Context, Result};
use directories::ProjectDirs;
use hairfit_align::engine::{DEFAULT_NOSE_DROP, DEFAULT_WIDTH_FRACTION};
use hairfit_align::{AnchorMode, EngineConfig};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("HAIRFIT_CONFIG_PATH").unwrap_or("/usr/local/etc/hairfit/config.toml"))
});

/// Per-user fallback, used when the system-wide file does not exist.
pub static USER_CONFIG_PATH: Lazy<Option<PathBuf>> = Lazy::new(|| {
    ProjectDirs::from("", "", "hairfit").map(|dirs| dirs.config_dir().join("config.toml"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub anchor: AnchorMode,
    pub overlay_width_fraction: f32,
    pub nose_drop: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anchor: AnchorMode::default(),
            overlay_width_fraction: DEFAULT_WIDTH_FRACTION,
            nose_drop: DEFAULT_NOSE_DROP,
        }
    }
}

impl Config {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            anchor: self.anchor,
            overlay_width_fraction: self.overlay_width_fraction,
            nose_drop: self.nose_drop,
            ..EngineConfig::default()
        }
    }
}

/// The file `load_config(None)` reads: the system path if present, else the
/// per-user one.
pub fn default_path() -> PathBuf {
    if CONFIG_PATH.exists() {
        return CONFIG_PATH.to_path_buf();
    }
    USER_CONFIG_PATH
        .clone()
        .unwrap_or_else(|| CONFIG_PATH.to_path_buf())
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, data).with_context(|| format!("writing config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = load_config(Some(&dir.path().join("does-not-exist.toml")))?;
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.anchor, AnchorMode::Nose);
        assert_eq!(cfg.overlay_width_fraction, 1.0);
        Ok(())
    }

    #[test]
    fn partial_file_fills_defaults() -> Result<()> {
        let cfg: Config = toml::from_str(r#"anchor = "eyes-mid""#)?;
        assert_eq!(cfg.anchor, AnchorMode::EyesMidpoint);
        assert_eq!(cfg.nose_drop, DEFAULT_NOSE_DROP);
        Ok(())
    }

    #[test]
    fn save_then_load_creates_parent_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            anchor: AnchorMode::Forehead,
            overlay_width_fraction: 0.7,
            nose_drop: 0.35,
        };
        save_config(&cfg, Some(&path))?;
        assert!(path.exists());
        let loaded = load_config(Some(&path))?;
        assert_eq!(loaded, cfg);
        Ok(())
    }

    #[test]
    fn bad_anchor_is_a_parse_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "anchor = \"chin\"\n")?;
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"));
        Ok(())
    }

    #[test]
    fn engine_config_carries_settings() {
        let cfg = Config {
            anchor: AnchorMode::Mouth,
            overlay_width_fraction: 0.5,
            nose_drop: 0.3,
        };
        let engine = cfg.engine_config();
        assert_eq!(engine.anchor, AnchorMode::Mouth);
        assert_eq!(engine.overlay_width_fraction, 0.5);
        assert_eq!(engine.nose_drop, 0.3);
        assert_eq!(engine.scheme, hairfit_align::FACE_MESH);
    }
}
