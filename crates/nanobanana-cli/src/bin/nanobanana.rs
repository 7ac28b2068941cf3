// Nano Banana terminal client
// Concept -> optimized prompt -> image or video, through the Gemini API
//
// Run with: cargo run --bin nanobanana
// One-shot: nanobanana run --concept "a red fox in snow" --media video

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::context::{key_selector, load_config, open_controller, open_history};
use cli::{Cli, Commands};
use nanobanana_lib::utils::shared_store::sanitize_error;
use nanobanana_lib::PromptConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", sanitize_error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;

    match cli.command.unwrap_or(Commands::Session { out: None }) {
        Commands::Session { out } => {
            let host = key_selector();
            let controller = open_controller(&config, host.clone())?;
            let out = out.unwrap_or_else(|| PathBuf::from("."));
            cli::session::run_session(controller, host, out).await
        }
        Commands::Run {
            concept,
            style,
            lighting,
            ratio,
            media,
            out,
            prompt_only,
        } => {
            let host = key_selector();
            let mut controller = open_controller(&config, host)?;
            let request = PromptConfig {
                concept,
                style,
                lighting,
                aspect_ratio: ratio,
                media_type: media,
            };
            cli::oneshot::run_once(&mut controller, request, &out, prompt_only).await
        }
        Commands::History { action } => {
            let store = open_history(&config)?;
            cli::oneshot::run_history(&store, action)
        }
    }
}
