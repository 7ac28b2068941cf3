// Command line arguments

use clap::{Parser, Subcommand};
use nanobanana_lib::{AspectRatio, Lighting, MediaType, VisualStyle};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nanobanana")]
#[command(about = "Nano Banana - turn a concept into an optimized prompt, then an image or video")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive wizard (default)
    Session {
        /// Directory for saved assets
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Optimize a concept and generate once
    Run {
        /// What to generate
        #[arg(short, long)]
        concept: String,

        /// Visual style, e.g. "Cinematic 8K" or cyberpunk-anime
        #[arg(long, value_parser = parse_style, default_value = "Cinematic 8K")]
        style: VisualStyle,

        /// Lighting, e.g. "Golden Magic Hour"
        #[arg(long, value_parser = parse_lighting, default_value = "Natural Sunlight")]
        lighting: Lighting,

        /// Aspect ratio (16:9, 9:16, 1:1, 4:3)
        #[arg(long, value_parser = parse_ratio, default_value = "16:9")]
        ratio: AspectRatio,

        /// image or video
        #[arg(long, value_parser = parse_media, default_value = "image")]
        media: MediaType,

        /// Directory for the saved asset
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Stop after optimizing and print the prompt
        #[arg(long)]
        prompt_only: bool,
    },

    /// Inspect or edit the prompt history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List saved prompts, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one entry
    Delete { id: String },

    /// Delete every entry
    Clear,
}

pub fn parse_style(s: &str) -> Result<VisualStyle, String> {
    VisualStyle::from_label(s).ok_or_else(|| {
        format!(
            "unknown style '{}' (expected one of: {})",
            s,
            join_labels(VisualStyle::ALL.iter().map(|v| v.label()))
        )
    })
}

pub fn parse_lighting(s: &str) -> Result<Lighting, String> {
    Lighting::from_label(s).ok_or_else(|| {
        format!(
            "unknown lighting '{}' (expected one of: {})",
            s,
            join_labels(Lighting::ALL.iter().map(|v| v.label()))
        )
    })
}

pub fn parse_ratio(s: &str) -> Result<AspectRatio, String> {
    AspectRatio::from_label(s).ok_or_else(|| {
        format!(
            "unknown aspect ratio '{}' (expected one of: {})",
            s,
            join_labels(AspectRatio::ALL.iter().map(|v| v.as_str()))
        )
    })
}

pub fn parse_media(s: &str) -> Result<MediaType, String> {
    MediaType::from_label(s).ok_or_else(|| format!("unknown media type '{}' (image or video)", s))
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}
