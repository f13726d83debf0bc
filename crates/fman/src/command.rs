//! Shell command parsing

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("command is longer than {0} characters")]
    TooLong(usize),
    #[error("incorrect command")]
    Unknown,
}

/// A parsed shell command. Paths are kept as typed and resolved against
/// the working directory when the command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Reset,
    Drives,
    List,
    Encodings,
    ChangeDir(String),
    Read {
        path: String,
        encoding: Option<String>,
    },
    Copy {
        from: String,
        to: String,
    },
    Move {
        from: String,
        to: String,
    },
    Remove(String),
    Create {
        path: String,
        encoding: Option<String>,
        lines: Vec<String>,
    },
    Concat {
        sources: Vec<String>,
        dest: String,
    },
    Mask(Vec<String>),
    MaskRecursive(Vec<String>),
    MaskCopy {
        from: String,
        to: String,
        mode: String,
        mask: Vec<String>,
    },
    Diff {
        old: String,
        new: String,
        dest: Option<String>,
    },
}

/// Parse a line typed at the prompt. Tokens are separated by single spaces.
pub fn parse_line(line: &str, max_len: usize) -> Result<Command, ParseError> {
    if line.chars().count() > max_len {
        return Err(ParseError::TooLong(max_len));
    }
    let tokens: Vec<&str> = line.split(' ').collect();
    parse_tokens(&tokens)
}

/// Split the text of `create` into lines on the literal characters `\n`
fn text_lines(words: &[String]) -> Vec<String> {
    if words.is_empty() {
        return Vec::new();
    }
    words.join(" ").split("\\n").map(str::to_string).collect()
}

pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Command, ParseError> {
    let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
    let Some((name, args)) = tokens.split_first() else {
        return Err(ParseError::Unknown);
    };
    let arg = |i: usize| args[i].clone();

    let command = match (name.as_str(), args.len()) {
        ("help", 0) => Command::Help,
        ("exit", 0) => Command::Exit,
        ("reset", 0) => Command::Reset,
        ("lsblk", 0) => Command::Drives,
        ("ls", 0) => Command::List,
        ("encodings", 0) => Command::Encodings,
        ("cd", 1) => Command::ChangeDir(arg(0)),
        ("read", 1 | 2) => Command::Read {
            path: arg(0),
            encoding: args.get(1).cloned(),
        },
        ("cp", 2) => Command::Copy {
            from: arg(0),
            to: arg(1),
        },
        ("mv", 2) => Command::Move {
            from: arg(0),
            to: arg(1),
        },
        ("rm", 1) => Command::Remove(arg(0)),
        ("create", n) if n >= 1 => Command::Create {
            path: arg(0),
            encoding: args.get(1).cloned(),
            lines: text_lines(args.get(2..).unwrap_or_default()),
        },
        ("cat", n) if n >= 2 => {
            let (dest, sources) = args.split_last().ok_or(ParseError::Unknown)?;
            Command::Concat {
                sources: sources.to_vec(),
                dest: dest.clone(),
            }
        }
        ("mask", _) => Command::Mask(args.to_vec()),
        ("maskd", _) => Command::MaskRecursive(args.to_vec()),
        ("maskc", n) if n >= 3 => Command::MaskCopy {
            from: arg(0),
            to: arg(1),
            mode: arg(2),
            mask: args[3..].to_vec(),
        },
        ("diff", 2 | 3) => Command::Diff {
            old: arg(0),
            new: arg(1),
            dest: args.get(2).cloned(),
        },
        _ => return Err(ParseError::Unknown),
    };
    Ok(command)
}
