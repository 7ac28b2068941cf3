// Interactive wizard
// Reads one command per line and drives the workflow controller

use anyhow::Result;
use nanobanana_lib::services::media::{EntitlementHost, KeySelector, MediaBackend};
use nanobanana_lib::services::{TransitionOutcome, WorkflowController};
use nanobanana_lib::utils::shared_store::sanitize_error;
use nanobanana_lib::Step;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::clipboard::copy_to_clipboard;
use super::commands::{parse_command, SessionCommand, HELP};
use super::render::{render_config, render_history, render_options, render_state};

/// Run generation, cancelling it when the user presses Ctrl-C
pub async fn generate_with_interrupt<B: MediaBackend>(
    controller: &mut WorkflowController<B>,
) -> TransitionOutcome {
    let cancel = controller.cancel_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::debug!("Interrupt received, cancelling generation");
            cancel.cancel();
        }
    });

    let outcome = controller.generate().await;
    watcher.abort();
    outcome
}

/// Print the result of a workflow action
pub fn report<B: MediaBackend>(controller: &WorkflowController<B>, outcome: TransitionOutcome) {
    match outcome {
        TransitionOutcome::Rejected(rejection) => println!("{}", rejection.message()),
        TransitionOutcome::Advanced(_) => {
            println!("{}", render_state(controller.step(), controller.state()))
        }
        TransitionOutcome::Failed(_) => {
            println!("{}", controller.state().status);
            if let Some(detail) = controller.last_error() {
                eprintln!("  {}", detail);
            }
        }
    }
}

pub async fn run_session<B: MediaBackend>(
    mut controller: WorkflowController<B>,
    host: Arc<KeySelector>,
    out_dir: PathBuf,
) -> Result<()> {
    println!("Nano Banana - concept to prompt to media. Type `help` for commands.\n");
    println!("{}", render_state(controller.step(), controller.state()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt(controller.step())?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        if command == SessionCommand::Quit {
            break;
        }
        execute(&mut controller, &host, &out_dir, command).await;
    }

    Ok(())
}

fn print_prompt(step: Step) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\n[{}] > ", step.number())?;
    stdout.flush()?;
    Ok(())
}

async fn execute<B: MediaBackend>(
    controller: &mut WorkflowController<B>,
    host: &KeySelector,
    out_dir: &Path,
    command: SessionCommand,
) {
    match command {
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Show => println!("{}", render_state(controller.step(), controller.state())),
        SessionCommand::Options => println!("{}", render_options()),
        SessionCommand::Concept(concept) => {
            controller.edit_config(|c| c.concept = concept);
            println!("{}", render_config(&controller.state().config));
        }
        SessionCommand::Style(style) => {
            controller.edit_config(|c| c.style = style);
            println!("Style: {}", style);
        }
        SessionCommand::Lighting(lighting) => {
            controller.edit_config(|c| c.lighting = lighting);
            println!("Lighting: {} ({})", lighting, lighting.group().display_name());
        }
        SessionCommand::Ratio(ratio) => {
            controller.edit_config(|c| c.aspect_ratio = ratio);
            println!("Aspect ratio: {} ({})", ratio, ratio.hint());
        }
        SessionCommand::Media(media) => {
            controller.edit_config(|c| c.media_type = media);
            println!("Media: {}", media.display_name());
        }
        SessionCommand::Optimize => {
            println!("Optimizing prompt...");
            let outcome = controller.optimize().await;
            report(controller, outcome);
        }
        SessionCommand::Generate => {
            if controller.step() == Step::Optimize {
                println!(
                    "Generating {} (Ctrl-C to cancel)...",
                    controller.state().config.media_type.display_name().to_lowercase()
                );
            }
            let outcome = generate_with_interrupt(controller).await;
            report(controller, outcome);
        }
        SessionCommand::Back => {
            let outcome = controller.back();
            report(controller, outcome);
        }
        SessionCommand::Reset => {
            let outcome = controller.reset();
            report(controller, outcome);
        }
        SessionCommand::Copy(id) => {
            let text = match &id {
                Some(id) => controller.history().find(id).map(|item| item.prompt.clone()),
                None => controller.copy_text().map(str::to_string),
            };
            match text {
                Some(text) => match copy_to_clipboard(&text) {
                    Ok(()) => println!("Copied!"),
                    Err(e) => eprintln!("Copy failed: {}", e),
                },
                None if id.is_some() => println!("No history entry with that id."),
                None => println!("Nothing to copy yet."),
            }
        }
        SessionCommand::Save(dir) => {
            let dir = dir.unwrap_or_else(|| out_dir.to_path_buf());
            match controller.download(&dir) {
                Ok(path) => println!("Saved to {}", path.display()),
                Err(e) => eprintln!("{}", sanitize_error(&e)),
            }
        }
        SessionCommand::History => println!("{}", render_history(controller.history())),
        SessionCommand::Delete(id) => {
            if controller.delete_history(&id) {
                println!("Deleted.");
            } else {
                println!("No history entry with that id.");
            }
        }
        SessionCommand::ClearHistory => {
            controller.clear_history();
            println!("History cleared.");
        }
        SessionCommand::Key(key) => {
            host.select(key);
            if host.has_video_entitlement() {
                println!("Video key selected.");
            } else {
                println!("Video key cleared.");
            }
        }
        SessionCommand::Quit => {}
    }
}
