//! User-facing text printed by the shell

use fman_core::{ErrorCategory, FmError};

pub const GREETING: &str = "Welcome to fman! Type help to list the available commands, \
or enter any of them right away.";

pub const GOODBYE: &str = "Thanks for using fman, goodbye!";

pub const INCORRECT_COMMAND: &str = "Incorrect command, please try again.";

pub const HELP: &str = "\
lsblk - show all mounted drives.
ls - list the files and directories of the current directory.
cd <path> - change the current directory to <path>.
read <path> [encoding] - print the text of the file at <path>, decoded with [encoding].
cp <path_from> <path_to> - copy the file <path_from> to <path_to>. An existing <path_to>
    is overwritten when possible.
mv <path_from> <path_to> - move the file <path_from> to <path_to>. An existing <path_to>
    is overwritten when possible.
rm <path> - delete the file at <path>.
encodings - list the supported encodings.
create <path> [encoding] [text] - create the file <path> containing [text] in [encoding].
    Use \\n inside [text] to start a new line.
cat <path1> <path2> ... <pathn> <path_destination> - write the contents of <path1> ... <pathn>
    to <path_destination> and print the result.
mask [mask] - list the files of the current directory whose name matches [mask].
maskd [mask] - list the files of the current directory and all subdirectories whose name
    matches [mask].
maskc <directory_from> <directory_to> <type_of_copy> [mask] - copy every file matching [mask]
    from <directory_from> and its subdirectories into <directory_to>. With <type_of_copy> 0
    existing files are kept, with 1 they are overwritten.
diff <path1> <path2> [path_destination] - print the steps that turn <path1> into <path2>:
    '- ' removed, '+ ' added, '= ' unchanged. Optionally write them to [path_destination].
reset - clear the screen.
exit - quit.
Paths may be relative or absolute. Masks are regular expressions, see
https://docs.rs/regex/latest/regex/#syntax
Arguments in [brackets] are optional; the default mask matches any name.ext file.";

/// Message shown when a command fails
pub fn error_message(err: &FmError) -> String {
    match err.category() {
        ErrorCategory::NotFound => format!("The file you are trying to use does not exist ({err})."),
        ErrorCategory::DirectoryNotFound => {
            format!("The directory you are trying to use does not exist ({err}).")
        }
        ErrorCategory::AccessDenied => format!(
            "Cannot access the file or directory, it may be open in another program ({err})."
        ),
        ErrorCategory::TooLarge => format!("The file is too large to be processed ({err})."),
        ErrorCategory::InvalidPattern => format!("The regular expression is not valid ({err})."),
        ErrorCategory::WriteFailed => format!("Cannot write the result ({err})."),
        ErrorCategory::UnsupportedEncoding => {
            format!("The encoding does not exist or is not supported ({err}).")
        }
        ErrorCategory::InvalidCopyMode => {
            format!("The type of copy must be 0 or 1 ({err}).")
        }
        ErrorCategory::Io => format!("Something went wrong ({err})."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_message_names_path() {
        let message = error_message(&FmError::NotFound(PathBuf::from("missing.txt")));
        assert!(message.contains("does not exist"));
        assert!(message.contains("missing.txt"));
    }

    #[test]
    fn test_help_lists_every_command() {
        for name in [
            "lsblk", "ls", "cd", "read", "cp", "mv", "rm", "encodings", "create", "cat", "mask",
            "maskd", "maskc", "diff", "reset", "exit",
        ] {
            assert!(HELP.lines().any(|l| l.starts_with(name)), "{name} missing from help");
        }
    }
}
