use crate::ansi::render_ansi;
use crate::config::{Config, DiffAlgorithm, OutputFormat};
use anyhow::{bail, Context, Result};
use huediff_core::{DiffEngine, Mode};
use std::io::Read;
use std::path::Path;

pub struct Options<'a> {
    pub old: &'a str,
    pub new: &'a str,
    pub mode: Mode,
    pub format: OutputFormat,
    pub algorithm: DiffAlgorithm,
    pub literal: bool,
}

pub fn execute(config: &Config, options: Options<'_>) -> Result<()> {
    let (old, new) = if options.literal {
        (options.old.to_string(), options.new.to_string())
    } else {
        if options.old == "-" && options.new == "-" {
            bail!("Only one input can be read from stdin");
        }
        (
            read_source(Path::new(options.old))?,
            read_source(Path::new(options.new))?,
        )
    };

    let engine = DiffEngine::new().with_algorithm(options.algorithm.into());
    println!(
        "{}",
        present(config, &engine, &old, &new, options.mode, options.format)
    );
    Ok(())
}

/// Read a file, or stdin for `-`
pub fn read_source(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))
}

/// Compare and format; nothing to compare when either input is empty
pub fn present(
    config: &Config,
    engine: &DiffEngine,
    old: &str,
    new: &str,
    mode: Mode,
    format: OutputFormat,
) -> String {
    let renderer = config.renderer();
    if old.is_empty() || new.is_empty() {
        return match format {
            OutputFormat::Html => renderer.placeholder(),
            OutputFormat::Ansi => render_ansi(
                &Default::default(),
                &config.colors,
                &config.placeholder,
            ),
        };
    }

    let comparison = engine.diff(old, new, mode);
    match format {
        OutputFormat::Html => renderer.render(&comparison.result),
        OutputFormat::Ansi => render_ansi(&comparison.result, &config.colors, &config.placeholder),
    }
}
