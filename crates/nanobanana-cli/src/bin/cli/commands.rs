// Interactive session commands
// One command per input line: a keyword followed by an optional argument

use nanobanana_lib::{AspectRatio, Lighting, MediaType, VisualStyle};
use std::path::PathBuf;

use super::args::{parse_lighting, parse_media, parse_ratio, parse_style};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Help,
    /// Show the current step, configuration and status
    Show,
    /// List the available styles, lighting themes and ratios
    Options,
    Concept(String),
    Style(VisualStyle),
    Lighting(Lighting),
    Ratio(AspectRatio),
    Media(MediaType),
    Optimize,
    Generate,
    Back,
    Reset,
    /// Copy the optimized prompt, or a history entry's prompt
    Copy(Option<String>),
    /// Save the generated asset, optionally into another directory
    Save(Option<PathBuf>),
    History,
    Delete(String),
    ClearHistory,
    /// Select a paid key for video generation; empty clears it
    Key(String),
    Quit,
}

pub const HELP: &str = "\
Commands:
  concept <text>      set the concept to visualize
  style <name>        visual style (see `options`)
  lighting <name>     lighting theme (see `options`)
  ratio <ratio>       aspect ratio: 16:9, 9:16, 1:1, 4:3
  media <kind>        image or video
  optimize            step 1 -> 2: rewrite the concept into a detailed prompt
  generate            step 2 -> 3: generate the media (Ctrl-C cancels)
  back                return from step 2 to step 1
  reset               start over with the same settings
  copy [id]           copy the optimized prompt (or a history entry) to the clipboard
  save [dir]          save the generated asset
  history             list saved prompts
  delete <id>         delete a history entry
  clear-history       delete every history entry
  key [api-key]       select a paid key for video generation (no argument clears)
  show                show the current state
  options             list styles, lighting themes and ratios
  quit                exit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (keyword, arg) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let command = match keyword.to_ascii_lowercase().as_str() {
        "help" | "?" => SessionCommand::Help,
        "show" | "status" => SessionCommand::Show,
        "options" => SessionCommand::Options,
        "concept" => SessionCommand::Concept(required(keyword, arg, "a concept")?.to_string()),
        "style" => SessionCommand::Style(parse_style(required(keyword, arg, "a style")?)?),
        "lighting" => SessionCommand::Lighting(parse_lighting(required(keyword, arg, "a lighting theme")?)?),
        "ratio" => SessionCommand::Ratio(parse_ratio(required(keyword, arg, "an aspect ratio")?)?),
        "media" => SessionCommand::Media(parse_media(required(keyword, arg, "image or video")?)?),
        "optimize" | "o" => SessionCommand::Optimize,
        "generate" | "g" => SessionCommand::Generate,
        "back" => SessionCommand::Back,
        "reset" => SessionCommand::Reset,
        "copy" => SessionCommand::Copy(optional(arg)),
        "save" | "download" => SessionCommand::Save(optional(arg).map(PathBuf::from)),
        "history" => SessionCommand::History,
        "delete" | "rm" => SessionCommand::Delete(required(keyword, arg, "a history id")?.to_string()),
        "clear-history" => SessionCommand::ClearHistory,
        "key" => SessionCommand::Key(arg.to_string()),
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("Unknown command `{}`. Type `help`.", other)),
    };

    Ok(Some(command))
}

fn required<'a>(keyword: &str, arg: &'a str, what: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("`{}` needs {}", keyword, what))
    } else {
        Ok(arg)
    }
}

fn optional(arg: &str) -> Option<String> {
    if arg.is_empty() {
        None
    } else {
        Some(arg.to_string())
    }
}
