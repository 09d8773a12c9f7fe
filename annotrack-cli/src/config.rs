//! Configuration handling for the annotrack CLI
//!
//! Supports loading configuration from annotrack.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use annotrack_core::TileBuildConfig;
use annotrack_render::{Color, TrackStyle};

pub const DEFAULT_CONFIG_FILE: &str = "annotrack.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub tiles: TilesConfig,
    #[serde(default)]
    pub track: TrackStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Print frame statistics as JSON after rendering
    #[serde(default)]
    pub print_stats: bool,

    /// Region used when --region is not given ("start-end" or "chr:start-end")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Output width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Track height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Document title drawn at the top
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Write the generated-at footer
    #[serde(default = "default_true")]
    pub footer: bool,

    /// Background color
    #[serde(default = "default_background")]
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: None,
            footer: true,
            background: default_background(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesConfig {
    /// Finest zoom level built by 'annotrack tile'
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Features kept per tile, most important first
    #[serde(default = "default_max_per_tile")]
    pub max_per_tile: usize,

    /// Nominal tile width in pixels
    #[serde(default = "default_tile_px")]
    pub tile_px: f64,
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            max_zoom: default_max_zoom(),
            max_per_tile: default_max_per_tile(),
            tile_px: default_tile_px(),
        }
    }
}

impl TilesConfig {
    pub fn build_config(&self) -> TileBuildConfig {
        TileBuildConfig {
            max_zoom: self.max_zoom,
            max_per_tile: self.max_per_tile,
            tile_px: self.tile_px,
        }
    }
}

fn default_width() -> u32 {
    1200
}
fn default_height() -> u32 {
    80
}
fn default_true() -> bool {
    true
}
fn default_background() -> Color {
    Color(0xffffff)
}
fn default_max_zoom() -> u8 {
    TileBuildConfig::default().max_zoom
}
fn default_max_per_tile() -> usize {
    TileBuildConfig::default().max_per_tile
}
fn default_tile_px() -> f64 {
    TileBuildConfig::default().tile_px
}

impl Config {
    /// Load configuration from file, falling back to annotrack.toml in the
    /// working directory and then to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotrack_core::ScaleKind;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.width, 1200);
        assert_eq!(config.track.block_threshold_px, 10.0);
        assert_eq!(config.track.forward_color, Color::BLUE);
        assert_eq!(config.tiles.max_zoom, 12);
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.render.title = Some("BRCA1 locus".into());
        config.track.x_scale = ScaleKind::Log;
        config.track.reverse_color = Color(0x336699);

        let temp_file = NamedTempFile::new()?;
        config.save_to_file(temp_file.path())?;
        let loaded_config = Config::load_from_file(temp_file.path())?;

        assert_eq!(config, loaded_config);
        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r##"
            [render]
            width = 640

            [track]
            forward_color = "#00aa00"
            flip_text = true
            "##,
        )
        .unwrap();
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 80);
        assert_eq!(config.track.forward_color, Color(0x00aa00));
        assert!(config.track.flip_text);
        assert_eq!(config.track.exon_height, 5.0);
    }

    #[test]
    fn test_example_toml_generation() {
        let example = Config::example_toml().unwrap();
        assert!(example.contains("[general]"));
        assert!(example.contains("[render]"));
        assert!(example.contains("[track]"));
    }
}
