//! fman core - LCS line diff engine and file operations
//!
//! This library provides the diff engine used by the `diff` command along
//! with the file, encoding and mask operations behind the other commands of
//! the `fman` shell.

pub mod change;
pub mod diff;
pub mod encoding;
pub mod error;
pub mod fs;
pub mod mask;

pub use change::{Change, ChangeKind, EditScript};
pub use diff::{build_edit_script, compute_lcs_table, reconstruct_lcs, split_lines, Choice, DiffEngine, LcsTable};
pub use encoding::TextEncoding;
pub use error::{ErrorCategory, FmError, FmResult};
pub use fs::{list_drives, resolve, DirListing, Drive, FileOps, DEFAULT_MAX_FILE_SIZE};
pub use mask::{copy_matching, find, find_recursive, CopyReport, Mask, OverwritePolicy, DEFAULT_MASK};
