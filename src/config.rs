use crate::scene::AA_MAX;
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Render settings loaded from a TOML file, with CLI overrides applied on
/// top. Validated once, before any tracing starts.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output resolution in pixels.
    pub width: u32,
    pub height: u32,
    /// Supersampling factor: N x N samples per pixel, 1..=4.
    pub aa_code: u32,
    /// Jitter each subpixel sample within its cell.
    pub jitter: bool,
    /// Maximum number of mirror bounces.
    pub depth: u32,
    /// Seed for the jitter RNG; omit for a fresh seed per run.
    pub seed: Option<u64>,
    /// Preset scene number.
    pub scene: u32,
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            aa_code: 1,
            jitter: false,
            depth: 3,
            seed: None,
            scene: 0,
            output: PathBuf::from("output.png"),
        }
    }
}

impl RenderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "resolution {}x{} must be nonzero",
            self.width,
            self.height
        );
        ensure!(
            (1..=AA_MAX).contains(&self.aa_code),
            "antialiasing factor {} outside 1..={AA_MAX}",
            self.aa_code
        );
        Ok(())
    }
}
