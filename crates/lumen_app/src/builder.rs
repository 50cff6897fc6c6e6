use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use lumen_core::Color;
use lumen_renderer::{StagingConfig, ENTITY_PAYLOADS};
use serde::Deserialize;

use crate::traits::LumenApp;

/// Window, logging and ring settings.
///
/// Every key is optional in the TOML file; missing keys keep their default.
///
/// ```toml
/// title = "Lumen"
/// width = 1600
/// height = 900
/// vsync = false
/// log_level = "debug"
/// clear_color = [0.1, 0.1, 0.12]
/// max_draws_per_frame = 128
/// frames_in_flight = 3
/// sky_faces = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    /// Checked for `<name>.wgsl` before the embedded shaders.
    pub shader_dir: Option<PathBuf>,
    /// Linear RGB.
    pub clear_color: [f32; 3],
    /// Upper bound on draws recorded in one frame, sky included.
    pub max_draws_per_frame: u32,
    /// Whole frames the constant ring holds.
    pub frames_in_flight: u32,
    /// Cubemap faces in `+X, -X, +Y, -Y, +Z, -Z` order.  A generated
    /// gradient is used when absent.
    pub sky_faces: Option<[PathBuf; 6]>,
    /// Seconds between statistics lines in the log.
    pub stats_interval: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let clear = Color::CORNFLOWER;
        Self {
            title: "Lumen".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            log_level: "info".to_string(),
            shader_dir: None,
            clear_color: [clear.r, clear.g, clear.b],
            max_draws_per_frame: 64,
            frames_in_flight: 3,
            sky_faces: None,
            stats_interval: 5.0,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text).context("invalid configuration")?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn level_filter(&self) -> anyhow::Result<log::LevelFilter> {
        log::LevelFilter::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("unknown log level `{}`", self.log_level))
    }

    pub fn clear_color(&self) -> Color {
        let [r, g, b] = self.clear_color;
        Color::rgb(r, g, b)
    }

    /// Ring sized for `max_draws_per_frame` entity draws per frame.
    pub fn staging(&self, alignment: u64) -> StagingConfig {
        StagingConfig::sized_for(
            self.max_draws_per_frame,
            &ENTITY_PAYLOADS,
            alignment,
            self.frames_in_flight,
        )
    }
}

/// Entry point.  Configure with the builder methods, then [`App::run`].
pub struct App<A: LumenApp> {
    config: AppConfig,
    app_state: A,
}

impl<A: LumenApp + 'static> App<A> {
    pub fn new(app_state: A) -> Self {
        Self {
            config: AppConfig::default(),
            app_state,
        }
    }

    /// Replaces the whole configuration with the contents of `path`.
    /// Builder calls made afterwards still override it.
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        self.config = AppConfig::load(path.as_ref())?;
        Ok(self)
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Installs the logger and runs the event loop until the window closes
    /// or a frame fails.
    pub fn run(self) -> anyhow::Result<()> {
        crate::logging::init(&self.config)?;
        crate::runner::run_internal(self.config, self.app_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            title = "demo"
            vsync = false
            max_draws_per_frame = 22
            "#,
        )
        .unwrap();
        assert_eq!(config.title, "demo");
        assert!(!config.vsync);
        assert_eq!(config.max_draws_per_frame, 22);
        assert_eq!(config.width, 1280);
        assert_eq!(config.frames_in_flight, 3);
        assert_eq!(config.sky_faces, None);
    }

    #[test]
    fn sky_faces_and_colour_parse() {
        let config = AppConfig::from_toml_str(
            r#"
            clear_color = [0.0, 0.5, 1.0]
            sky_faces = ["a", "b", "c", "d", "e", "f"]
            "#,
        )
        .unwrap();
        assert_eq!(config.clear_color(), Color::rgb(0.0, 0.5, 1.0));
        let faces = config.sky_faces.unwrap();
        assert_eq!(faces[5], PathBuf::from("f"));
    }

    #[test]
    fn rejects_bad_level_and_unknown_keys() {
        assert!(AppConfig::from_toml_str("log_level = \"loud\"").is_err());
        assert!(AppConfig::from_toml_str("widht = 3").is_err());
        assert!(AppConfig::from_toml_str("sky_faces = [\"a\"]").is_err());
        assert_eq!(
            AppConfig::from_toml_str("log_level = \"debug\"")
                .unwrap()
                .level_filter()
                .unwrap(),
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn staging_holds_configured_frames() {
        let config = AppConfig {
            max_draws_per_frame: 10,
            frames_in_flight: 2,
            ..Default::default()
        };
        let staging = config.staging(256);
        assert_eq!(staging.max_draws_per_frame, 10);
        assert_eq!(staging.capacity, staging.frame_bytes() * 2);
        assert!(staging.validate().is_ok());
    }
}
