// Terminal clipboard
// Write-only copy through the OSC 52 escape sequence

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::{self, Write};

/// Escape sequence that asks the terminal to place `text` on the clipboard
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

pub fn copy_to_clipboard(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(osc52_sequence(text).as_bytes())?;
    stdout.flush()
}
