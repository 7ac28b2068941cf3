// One-shot subcommands: `run` and `history`

use anyhow::{bail, Context, Result};
use nanobanana_lib::services::media::MediaBackend;
use nanobanana_lib::services::{HistoryStore, TransitionOutcome, WorkflowController};
use nanobanana_lib::{generating_status, PromptConfig};
use std::path::Path;

use super::args::HistoryAction;
use super::render::render_history;
use super::session::generate_with_interrupt;

/// Optimize `config.concept`, then generate and save the asset into `out`.
/// With `prompt_only` the optimized prompt is printed and nothing is generated.
pub async fn run_once<B: MediaBackend>(
    controller: &mut WorkflowController<B>,
    config: PromptConfig,
    out: &Path,
    prompt_only: bool,
) -> Result<()> {
    controller.edit_config(|c| *c = config);

    match controller.optimize().await {
        TransitionOutcome::Advanced(_) => {}
        TransitionOutcome::Rejected(rejection) => bail!(rejection.message()),
        TransitionOutcome::Failed(_) => bail!(failure_message(controller)),
    }

    let prompt = controller.state().optimized_prompt.clone();
    if prompt_only {
        println!("{}", prompt);
        return Ok(());
    }
    eprintln!("Prompt: {}", prompt);
    eprintln!("{}", generating_status(controller.state().config.media_type));

    match generate_with_interrupt(controller).await {
        TransitionOutcome::Advanced(_) => {}
        TransitionOutcome::Rejected(rejection) => bail!(rejection.message()),
        TransitionOutcome::Failed(_) => bail!(failure_message(controller)),
    }

    let path = controller
        .download(out)
        .map_err(anyhow::Error::msg)
        .context("Failed to save the generated asset")?;
    println!("{}", path.display());
    Ok(())
}

fn failure_message<B: MediaBackend>(controller: &WorkflowController<B>) -> String {
    let status = &controller.state().status;
    match controller.last_error() {
        Some(detail) => format!("{} ({})", status, detail),
        None => status.clone(),
    }
}

pub fn run_history(store: &HistoryStore, action: HistoryAction) -> Result<()> {
    let log = store.load();

    match action {
        HistoryAction::List { json } => {
            if json {
                let text = serde_json::to_string_pretty(log.items())
                    .context("Failed to serialize history")?;
                println!("{}", text);
            } else {
                println!("{}", render_history(&log));
            }
        }
        HistoryAction::Delete { id } => {
            if log.find(&id).is_none() {
                bail!("No history entry with id {}", id);
            }
            store
                .try_remove(&id, &log)
                .map_err(anyhow::Error::msg)
                .context("Failed to save history")?;
            println!("Deleted {}", id);
        }
        HistoryAction::Clear => {
            store
                .try_clear()
                .map_err(anyhow::Error::msg)
                .context("Failed to save history")?;
            println!("Cleared {} entries", log.len());
        }
    }
    Ok(())
}
