//! Regex file masks: search and masked directory copy

use crate::error::{FmError, FmResult};
use regex::Regex;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Mask used when none is given: any `name.ext` file
pub const DEFAULT_MASK: &str = r"(\w+)\.(\w+)";

/// A compiled file name mask.
///
/// Matching is an unanchored search against the file name only.
#[derive(Debug, Clone)]
pub struct Mask {
    regex: Regex,
}

impl Mask {
    pub fn new(pattern: &str) -> FmResult<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Build a mask from command arguments, joined by single spaces, or
    /// `default` when there are none
    pub fn from_args<S: AsRef<str>>(args: &[S], default: &str) -> FmResult<Self> {
        if args.is_empty() {
            return Self::new(default);
        }
        let pattern = args.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        Self::new(&pattern)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.is_match(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

/// Files directly inside `dir` whose name matches `mask`, sorted by name
pub fn find(dir: &Path, mask: &Mask) -> FmResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|_| FmError::DirectoryNotFound(dir.to_path_buf()))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() && mask.matches_path(&entry.path()) {
            found.push(entry.path());
        }
    }
    found.sort();
    debug!(dir = %dir.display(), mask = mask.as_str(), count = found.len(), "mask search");
    Ok(found)
}

/// Siblings order: files before directories, then by name
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Files in `dir` and all of its subdirectories whose name matches `mask`.
///
/// Each directory contributes its own files before those of its
/// subdirectories.
pub fn find_recursive(dir: &Path, mask: &Mask) -> FmResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FmError::DirectoryNotFound(dir.to_path_buf()));
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).sort_by(files_first) {
        let entry = entry.map_err(|e| FmError::Io(e.into()))?;
        if entry.file_type().is_file() && mask.matches_path(entry.path()) {
            found.push(entry.into_path());
        }
    }
    debug!(dir = %dir.display(), mask = mask.as_str(), count = found.len(), "recursive mask search");
    Ok(found)
}

/// What to do when a copied file already exists in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// `0`: keep the existing file
    Skip,
    /// `1`: replace it
    Overwrite,
}

impl FromStr for OverwritePolicy {
    type Err = FmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(OverwritePolicy::Skip),
            "1" => Ok(OverwritePolicy::Overwrite),
            other => Err(FmError::InvalidCopyMode(other.to_string())),
        }
    }
}

/// Outcome of [`copy_matching`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub skipped: usize,
}

/// Copy every file under `from` matching `mask` into `to`, flattened by
/// file name. `to` is created when missing.
pub fn copy_matching(
    from: &Path,
    to: &Path,
    policy: OverwritePolicy,
    mask: &Mask,
) -> FmResult<CopyReport> {
    if !from.is_dir() {
        return Err(FmError::DirectoryNotFound(from.to_path_buf()));
    }
    fs::create_dir_all(to).map_err(|source| FmError::WriteFailed {
        path: to.to_path_buf(),
        source,
    })?;

    let files = find_recursive(from, mask)?;
    let mut report = CopyReport::default();
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let dest = to.join(name);
        let exists = dest.exists();
        let same = exists && file.canonicalize().ok() == dest.canonicalize().ok();
        if same || (exists && policy == OverwritePolicy::Skip) {
            report.skipped += 1;
            continue;
        }
        fs::copy(&file, &dest).map_err(|source| FmError::WriteFailed { path: dest, source })?;
        report.copied += 1;
    }

    info!(
        from = %from.display(),
        to = %to.display(),
        copied = report.copied,
        skipped = report.skipped,
        "masked copy finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.txt"), "b");
        touch(&dir.path().join("a.rs"), "a");
        touch(&dir.path().join("README"), "r");
        touch(&dir.path().join("sub/c.txt"), "c");
        touch(&dir.path().join("sub/deep/d.txt"), "d");
        touch(&dir.path().join("aaa/e.txt"), "e");
        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_mask_needs_extension() {
        let mask = Mask::new(DEFAULT_MASK).unwrap();
        assert!(mask.is_match("a.rs"));
        assert!(!mask.is_match("README"));
    }

    #[test]
    fn test_mask_is_unanchored() {
        let mask = Mask::new("txt").unwrap();
        assert!(mask.is_match("notes.txt.bak"));
    }

    #[test]
    fn test_invalid_mask() {
        let err = Mask::new("(unclosed").unwrap_err();
        assert!(matches!(err, FmError::InvalidPattern(_)));
    }

    #[test]
    fn test_from_args_joins_with_spaces() {
        let mask = Mask::from_args(&["my", "file"], DEFAULT_MASK).unwrap();
        assert_eq!(mask.as_str(), "my file");
        let empty: [&str; 0] = [];
        assert_eq!(Mask::from_args(&empty, DEFAULT_MASK).unwrap().as_str(), DEFAULT_MASK);
    }

    #[test]
    fn test_find_current_dir_only() {
        let dir = tree();
        let found = find(dir.path(), &Mask::new(DEFAULT_MASK).unwrap()).unwrap();
        assert_eq!(names(&found), vec!["a.rs", "b.txt"]);
    }

    #[test]
    fn test_find_recursive_files_before_subdirs() {
        let dir = tree();
        let found = find_recursive(dir.path(), &Mask::new(r"\.txt$").unwrap()).unwrap();
        assert_eq!(names(&found), vec!["b.txt", "e.txt", "c.txt", "d.txt"]);
        assert!(found.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_overwrite_policy_parse() {
        assert_eq!("0".parse::<OverwritePolicy>().unwrap(), OverwritePolicy::Skip);
        assert_eq!("1".parse::<OverwritePolicy>().unwrap(), OverwritePolicy::Overwrite);
        assert!(matches!(
            "2".parse::<OverwritePolicy>().unwrap_err(),
            FmError::InvalidCopyMode(_)
        ));
    }

    #[test]
    fn test_copy_matching_skip_existing() {
        let dir = tree();
        let out = dir.path().join("out");
        touch(&out.join("c.txt"), "existing");

        let mask = Mask::new(r"\.txt$").unwrap();
        let report = copy_matching(&dir.path().join("sub"), &out, OverwritePolicy::Skip, &mask).unwrap();

        assert_eq!(report, CopyReport { copied: 1, skipped: 1 });
        assert_eq!(fs::read_to_string(out.join("c.txt")).unwrap(), "existing");
        assert_eq!(fs::read_to_string(out.join("d.txt")).unwrap(), "d");
    }

    #[test]
    fn test_copy_matching_overwrite() {
        let dir = tree();
        let out = dir.path().join("out");
        touch(&out.join("c.txt"), "existing");

        let mask = Mask::new(r"\.txt$").unwrap();
        let report =
            copy_matching(&dir.path().join("sub"), &out, OverwritePolicy::Overwrite, &mask).unwrap();

        assert_eq!(report.copied, 2);
        assert_eq!(fs::read_to_string(out.join("c.txt")).unwrap(), "c");
    }

    #[test]
    fn test_copy_matching_missing_source() {
        let dir = TempDir::new().unwrap();
        let mask = Mask::new(DEFAULT_MASK).unwrap();
        let err = copy_matching(
            &dir.path().join("missing"),
            &dir.path().join("out"),
            OverwritePolicy::Skip,
            &mask,
        )
        .unwrap_err();
        assert!(matches!(err, FmError::DirectoryNotFound(_)));
        assert!(!dir.path().join("out").exists());
    }
}
