use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use sub_overlay::{
    edit::DEFAULT_UNDO_LIMIT,
    raw::DEFAULT_RAW_EDIT_CUTOFF_BYTES,
    render::{
        Capacity, DEFAULT_FONT_SCALE, Dimensions, FontSizing, MAX_CONCURRENT_CAPTIONS, MAX_TRACKS,
    },
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: Logging,
    pub editor: Editor,
    pub render: Render,
    pub playback: Playback,
}

impl Config {
    pub fn load(path_opt: Option<&Path>) -> Result<Self> {
        let default_path = Path::new("config.toml");
        let path = if let Some(p) = path_opt {
            Some(p)
        } else if default_path.exists() {
            Some(default_path)
        } else {
            None
        };

        let mut cfg = Config::default();

        if let Some(path) = path {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading config file: {}", path.display()))?;
            cfg = toml::from_str(&raw)
                .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        }

        Ok(cfg)
    }

    pub fn to_toml_pretty(&self) -> Result<String> {
        let s = toml::to_string_pretty(self).context("failed serializing config as TOML")?;
        Ok(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub format: String,
    pub debug_cue_samples: usize,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            debug_cue_samples: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Editor {
    pub undo_limit: usize,
    /// Raw captions larger than this are not offered to the basic editor.
    pub raw_edit_cutoff_bytes: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            raw_edit_cutoff_bytes: DEFAULT_RAW_EDIT_CUTOFF_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Render {
    pub max_tracks: usize,
    pub max_concurrent_captions: usize,
    /// Font size as a fraction of the video height.
    pub font_scale: f64,
    pub font_multiplier: f64,
    pub container_width: f64,
    pub container_height: f64,
}

impl Default for Render {
    fn default() -> Self {
        Self {
            max_tracks: MAX_TRACKS,
            max_concurrent_captions: MAX_CONCURRENT_CAPTIONS,
            font_scale: DEFAULT_FONT_SCALE,
            font_multiplier: 1.0,
            container_width: 1280.0,
            container_height: 720.0,
        }
    }
}

impl Render {
    pub fn capacity(&self) -> Capacity {
        Capacity {
            max_tracks: self.max_tracks,
            max_concurrent_captions: self.max_concurrent_captions,
        }
    }

    pub fn font_sizing(&self) -> FontSizing {
        FontSizing {
            scale: self.font_scale,
            multiplier: self.font_multiplier,
        }
    }

    pub fn container(&self) -> Dimensions {
        Dimensions::new(self.container_width, self.container_height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Playback {
    pub step_ms: i64,
}

impl Default for Playback {
    fn default() -> Self {
        Self { step_ms: 100 }
    }
}

pub fn init_tracing(logging: &Logging, cli_override_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = cli_override_level.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let is_json = logging.format.to_lowercase() == "json";

    // stdout carries command output; logs go to stderr.
    if is_json {
        fmt()
            .with_env_filter(filter)
            .event_format(fmt::format().json())
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .pretty()
            .init();
    }

    tracing::info!(
        level = level,
        format = logging.format.as_str(),
        "logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render]\nmax_tracks = 2\n\n[editor]\nundo_limit = 5\n").unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.render.max_tracks, 2);
        assert_eq!(cfg.render.max_concurrent_captions, 3);
        assert_eq!(cfg.editor.undo_limit, 5);
        assert_eq!(cfg.editor.raw_edit_cutoff_bytes, 1_000_000);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = Config::default().to_toml_pretty().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.playback.step_ms, 100);
        assert_eq!(back.render.capacity(), Capacity::default());
    }
}
