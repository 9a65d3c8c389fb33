//! Configuration loaded from `config.toml`

use anyhow::{Context, Result};
use clap::ValueEnum;
use huediff_core::{Algorithm, DiffEngine, MarkupRenderer, Mode, Palette, DEFAULT_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How comparisons are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Coloured terminal text
    #[default]
    Ansi,
    /// Inline `<span>` markup
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
}

impl From<DiffAlgorithm> for Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mode used when none is given on the command line
    pub default_mode: Mode,
    pub format: OutputFormat,
    pub algorithm: DiffAlgorithm,
    /// Where the session state is kept
    pub state_file: Option<PathBuf>,
    /// Shown when there is nothing to compare
    pub placeholder: String,
    pub colors: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: Mode::default(),
            format: OutputFormat::default(),
            algorithm: DiffAlgorithm::default(),
            state_file: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            colors: Palette::default(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// Only an explicitly requested file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("huediff").join("config.toml"))
    }

    pub fn state_path(&self) -> PathBuf {
        if let Some(path) = &self.state_file {
            return path.clone();
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("huediff").join("state.json"))
            .unwrap_or_else(|| PathBuf::from(".huediff-state.json"))
    }

    pub fn engine(&self) -> DiffEngine {
        DiffEngine::new().with_algorithm(self.algorithm.into())
    }

    pub fn renderer(&self) -> MarkupRenderer {
        MarkupRenderer::new()
            .with_palette(self.colors.clone())
            .with_placeholder(self.placeholder.clone())
    }
}
