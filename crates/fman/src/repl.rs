//! Line-editing front end for interactive terminals

use crate::shell::Shell;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Where typed commands are remembered between sessions
pub fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("fman").join("history.txt"))
}

/// Drive `shell` from a rustyline editor with history until `exit`,
/// Ctrl-D or a terminal error. Ctrl-C abandons the current line.
pub fn run_interactive<W: Write>(shell: &mut Shell<W>) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        if let Err(err) = editor.load_history(path) {
            debug!(path = %path.display(), error = %err, "no history loaded");
        }
    }

    shell.greet()?;
    while !shell.is_finished() {
        match editor.readline(&shell.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.as_str())?;
                }
                shell.handle_line(&line)?;
                shell.flush()?;
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    shell.farewell()?;

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        editor.save_history(path)?;
    }
    Ok(())
}
