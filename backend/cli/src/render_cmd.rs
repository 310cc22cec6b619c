//! `llamachat render`: normalize markdown and print the direct render.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tokio::io::AsyncReadExt;

use markdown::{normalize, Renderer};

use crate::console::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Terminal text (styled when the terminal supports color)
    Text,
    /// HTML markup
    Html,
    /// The normalized block sequence as JSON
    Json,
}

pub async fn run(format: RenderFormat, file: Option<PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read stdin")?;
            raw
        }
    };

    println!("{}", render(&raw, format, Console::detect().ansi())?);
    Ok(())
}

pub fn render(raw: &str, format: RenderFormat, color: bool) -> Result<String> {
    let blocks = normalize(raw);
    let output = match format {
        RenderFormat::Json => serde_json::to_string_pretty(&blocks)?,
        RenderFormat::Html => Renderer::to_html(&Renderer::render(&blocks)),
        RenderFormat::Text if color => Renderer::to_ansi(&Renderer::render(&blocks)),
        RenderFormat::Text => Renderer::to_plain_text(&Renderer::render(&blocks)),
    };
    Ok(output)
}
