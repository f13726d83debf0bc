//! Rendering of edit scripts for the console and for files

use crossterm::style::Stylize;
use fman_core::{ChangeKind, EditScript};
use serde::{Deserialize, Serialize};

/// Output format of the `diff` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiffFormat {
    /// One `- `, `+ ` or `= ` prefixed line per entry
    #[default]
    Text,
    /// The edit script as a JSON array
    Json,
}

/// Render `script` as text lines; `color` adds terminal styling
pub fn render_text(script: &EditScript, color: bool) -> Vec<String> {
    script
        .iter()
        .map(|change| {
            let line = change.to_string();
            if !color {
                return line;
            }
            match change.kind {
                ChangeKind::Removed => line.red().to_string(),
                ChangeKind::Added => line.green().to_string(),
                ChangeKind::Unchanged => line,
            }
        })
        .collect()
}

pub fn render_json(script: &EditScript) -> serde_json::Result<String> {
    serde_json::to_string_pretty(script)
}

/// Render `script` in `format` as output lines
pub fn render(script: &EditScript, format: DiffFormat, color: bool) -> serde_json::Result<Vec<String>> {
    match format {
        DiffFormat::Text => Ok(render_text(script, color)),
        DiffFormat::Json => Ok(vec![render_json(script)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fman_core::DiffEngine;

    fn script() -> EditScript {
        DiffEngine::new().diff_lines(&["a", "b", "c"], &["a", "x", "c"])
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(render_text(&script(), false), vec!["= a", "- b", "+ x", "= c"]);
    }

    #[test]
    fn test_colored_text_keeps_content() {
        let lines = render_text(&script(), true);
        assert_eq!(lines[0], "= a");
        assert!(lines[1].contains("- b"));
        assert!(lines[2].contains("+ x"));
    }

    #[test]
    fn test_json() {
        let lines = render(&script(), DiffFormat::Json, true).unwrap();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value[1]["kind"], "removed");
        assert_eq!(value[2]["text"], "x");
    }
}
