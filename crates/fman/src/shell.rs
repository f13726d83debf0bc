//! Interactive shell: prompt, dispatch and output

use crate::command::{parse_line, parse_tokens, Command, ParseError};
use crate::config::Config;
use crate::messages;
use crate::render::{self, DiffFormat};
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use fman_core::{
    copy_matching, find, find_recursive, list_drives, resolve, ChangeKind, FileOps, FmError,
    Mask, OverwritePolicy, TextEncoding,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
enum ShellError {
    /// The command failed; reported to the user
    #[error(transparent)]
    Command(#[from] FmError),
    /// Writing to the console failed
    #[error(transparent)]
    Output(#[from] io::Error),
}

impl From<serde_json::Error> for ShellError {
    fn from(err: serde_json::Error) -> Self {
        ShellError::Output(err.into())
    }
}

pub struct Shell<W: Write> {
    cwd: PathBuf,
    ops: FileOps,
    config: Config,
    format: DiffFormat,
    color: bool,
    finished: bool,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(cwd: PathBuf, config: Config, out: W) -> Self {
        let ops = FileOps::new().with_max_file_size(config.max_file_size);
        Self {
            cwd,
            ops,
            format: config.diff_format,
            color: config.color,
            config,
            finished: false,
            out,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn with_format(mut self, format: DiffFormat) -> Self {
        self.format = format;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Prompt shown before each command
    pub fn prompt(&self) -> String {
        format!("{}$ ", self.cwd.display())
    }

    pub fn greet(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", messages::GREETING)?;
        self.out.flush()
    }

    pub fn farewell(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", messages::GOODBYE)?;
        self.out.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Run the read-eval-print loop over `input` until `exit` or end of input
    pub fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        self.greet()?;
        let mut line = String::new();
        while !self.is_finished() {
            let prompt = self.prompt();
            write!(self.out, "{prompt}")?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }
            self.handle_line(line.trim_end_matches(['\n', '\r']))?;
        }
        self.farewell()
    }

    /// Parse and execute one line typed at the prompt
    pub fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        let parsed = parse_line(line, self.config.max_command_length);
        self.handle_parsed(parsed)
    }

    /// Execute a command given as separate words (one-shot mode)
    pub fn run_once<S: AsRef<str>>(&mut self, words: &[S]) -> io::Result<bool> {
        self.handle_parsed(parse_tokens(words))
    }

    /// Returns whether the command succeeded
    fn handle_parsed(&mut self, parsed: Result<Command, ParseError>) -> io::Result<bool> {
        let command = match parsed {
            Ok(command) => command,
            Err(ParseError::TooLong(max)) => {
                writeln!(self.out, "Commands are limited to {max} characters.")?;
                return Ok(false);
            }
            Err(ParseError::Unknown) => {
                writeln!(self.out, "{}", messages::INCORRECT_COMMAND)?;
                return Ok(false);
            }
        };

        debug!(?command, cwd = %self.cwd.display(), "executing command");
        match self.execute(command) {
            Ok(()) => Ok(true),
            Err(ShellError::Command(err)) => {
                warn!(category = %err.category(), error = %err, "command failed");
                writeln!(self.out, "{}", messages::error_message(&err))?;
                Ok(false)
            }
            Err(ShellError::Output(err)) => Err(err),
        }
    }

    fn path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }

    fn encoding(&self, name: Option<&str>) -> Result<TextEncoding, FmError> {
        match name {
            Some(name) => name.parse(),
            None => Ok(self.config.default_encoding),
        }
    }

    fn mask(&self, words: &[String]) -> Result<Mask, FmError> {
        Mask::from_args(words, &self.config.default_mask)
    }

    fn print_lines<I, S>(&mut self, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            writeln!(self.out, "{}", line.as_ref())?;
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<(), ShellError> {
        match command {
            Command::Help => writeln!(self.out, "{}", messages::HELP)?,
            Command::Exit => self.finished = true,
            Command::Reset => {
                crossterm::execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
            }
            Command::Drives => {
                for drive in list_drives()? {
                    writeln!(self.out, "Name: {} Type: {}", drive.name, drive.kind)?;
                }
            }
            Command::List => {
                let listing = self.ops.list_directory(&self.cwd)?;
                let names: Vec<String> = listing.names().map(str::to_string).collect();
                self.print_lines(names)?;
            }
            Command::Encodings => {
                writeln!(self.out, "Supported encodings:")?;
                self.print_lines(TextEncoding::ALL.iter().map(|e| e.name()))?;
            }
            Command::ChangeDir(target) => {
                self.cwd = self.ops.change_directory(&self.cwd, &target)?;
            }
            Command::Read { path, encoding } => {
                let encoding = self.encoding(encoding.as_deref())?;
                let text = self.ops.read_text(&self.path(&path), encoding)?;
                writeln!(self.out, "{text}")?;
            }
            Command::Copy { from, to } => {
                self.ops.copy_file(&self.path(&from), &self.path(&to))?;
            }
            Command::Move { from, to } => {
                self.ops.move_file(&self.path(&from), &self.path(&to))?;
            }
            Command::Remove(path) => self.ops.remove_file(&self.path(&path))?,
            Command::Create {
                path,
                encoding,
                lines,
            } => {
                let encoding = self.encoding(encoding.as_deref())?;
                self.ops.create_text(&self.path(&path), &lines, encoding)?;
            }
            Command::Concat { sources, dest } => {
                let sources: Vec<PathBuf> = sources.iter().map(|s| self.path(s)).collect();
                let text = self.ops.concatenate(&sources, &self.path(&dest))?;
                writeln!(self.out, "{text}")?;
            }
            Command::Mask(words) => {
                let mask = self.mask(&words)?;
                let found = find(&self.cwd, &mask)?;
                let names: Vec<String> = found
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();
                self.print_lines(names)?;
            }
            Command::MaskRecursive(words) => {
                let mask = self.mask(&words)?;
                let found = find_recursive(&self.cwd, &mask)?;
                self.print_lines(found.iter().map(|p| p.display().to_string()))?;
            }
            Command::MaskCopy {
                from,
                to,
                mode,
                mask,
            } => {
                let policy: OverwritePolicy = mode.parse()?;
                let mask = self.mask(&mask)?;
                let report = copy_matching(&self.path(&from), &self.path(&to), policy, &mask)?;
                writeln!(
                    self.out,
                    "Copied {} file(s), skipped {}.",
                    report.copied, report.skipped
                )?;
            }
            Command::Diff { old, new, dest } => self.diff(&old, &new, dest.as_deref())?,
        }
        Ok(())
    }

    fn diff(&mut self, old: &str, new: &str, dest: Option<&str>) -> Result<(), ShellError> {
        let script = self.ops.diff_files(&self.path(old), &self.path(new))?;
        debug!(
            removed = script.count(ChangeKind::Removed),
            added = script.count(ChangeKind::Added),
            unchanged = script.count(ChangeKind::Unchanged),
            "diff finished"
        );

        match dest {
            Some(dest) => {
                let lines = render::render(&script, self.format, false)?;
                self.ops.write_lines(&self.path(dest), &lines)?;
            }
            None => {
                let lines = render::render(&script, self.format, self.color)?;
                self.print_lines(lines)?;
            }
        }
        Ok(())
    }
}
