//! File operations behind the shell commands
//!
//! Every operation checks its preconditions up front and reports a
//! [`FmError`] instead of touching the filesystem when one fails.

use crate::change::EditScript;
use crate::diff::{split_lines, DiffEngine};
use crate::encoding::TextEncoding;
use crate::error::{FmError, FmResult};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files at or above this size are not buffered (`i32::MAX` bytes).
pub const DEFAULT_MAX_FILE_SIZE: u64 = i32::MAX as u64;

/// Resolve `path` against `cwd`; absolute paths are returned as they are.
pub fn resolve(cwd: &Path, path: impl AsRef<Path>) -> PathBuf {
    cwd.join(path)
}

/// Classify an I/O failure on `path`.
fn access_error(path: &Path, err: io::Error) -> FmError {
    debug!(path = %path.display(), error = %err, "file access failed");
    match err.kind() {
        io::ErrorKind::NotFound => FmError::NotFound(path.to_path_buf()),
        _ => FmError::AccessDenied(path.to_path_buf()),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Join `lines` with a trailing newline after each one.
fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    text
}

/// A mounted filesystem as shown by `lsblk`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    pub name: String,
    pub kind: String,
}

/// Contents of a directory, files first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

impl DirListing {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .chain(self.directories.iter())
            .map(String::as_str)
    }
}

/// File operations with a shared size limit
#[derive(Debug, Clone)]
pub struct FileOps {
    /// Largest file size (exclusive) that will be read into memory
    max_file_size: u64,
    engine: DiffEngine,
}

impl Default for FileOps {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            engine: DiffEngine::new(),
        }
    }
}

impl FileOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Check that `path` is an existing file that can be opened for reading
    /// and is below the size limit. Returns its size.
    pub fn check_readable(&self, path: &Path) -> FmResult<u64> {
        if !path.is_file() {
            return Err(FmError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| access_error(path, e))?;
        let size = file.metadata().map_err(|e| access_error(path, e))?.len();
        if size >= self.max_file_size {
            return Err(FmError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_file_size,
            });
        }
        Ok(size)
    }

    /// Fail with `AccessDenied` if `path` exists but cannot be opened for
    /// writing.
    fn check_writable(&self, path: &Path) -> FmResult<()> {
        if path.exists() {
            OpenOptions::new()
                .append(true)
                .open(path)
                .map_err(|_| FmError::AccessDenied(path.to_path_buf()))?;
        }
        Ok(())
    }

    /// Copy a file, replacing `to` if it exists
    pub fn copy_file(&self, from: &Path, to: &Path) -> FmResult<u64> {
        if !from.is_file() {
            return Err(FmError::NotFound(from.to_path_buf()));
        }
        if is_same_file(from, to) {
            // Copying onto itself would truncate the source
            return Ok(fs::metadata(from)?.len());
        }
        let bytes = fs::copy(from, to).map_err(|e| access_error(to, e))?;
        info!(from = %from.display(), to = %to.display(), bytes, "file copied");
        Ok(bytes)
    }

    /// Move a file, replacing `to` if it exists
    pub fn move_file(&self, from: &Path, to: &Path) -> FmResult<()> {
        if !from.is_file() {
            return Err(FmError::NotFound(from.to_path_buf()));
        }
        match fs::rename(from, to) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
                debug!(error = %err, "rename crosses filesystems, copying instead");
                fs::copy(from, to).map_err(|e| access_error(to, e))?;
                if let Err(err) = fs::remove_file(from) {
                    // Leave the source as the only copy
                    let _ = fs::remove_file(to);
                    return Err(access_error(from, err));
                }
            }
            Err(err) => return Err(access_error(from, err)),
        }
        info!(from = %from.display(), to = %to.display(), "file moved");
        Ok(())
    }

    pub fn remove_file(&self, path: &Path) -> FmResult<()> {
        if !path.is_file() {
            return Err(FmError::NotFound(path.to_path_buf()));
        }
        fs::remove_file(path).map_err(|e| access_error(path, e))?;
        info!(path = %path.display(), "file removed");
        Ok(())
    }

    /// Resolve `target` against `cwd` and return the new working directory
    pub fn change_directory(&self, cwd: &Path, target: &str) -> FmResult<PathBuf> {
        let path = resolve(cwd, target);
        if !path.is_dir() {
            return Err(FmError::DirectoryNotFound(path));
        }
        let path = path.canonicalize().map_err(|e| access_error(&path, e))?;
        debug!(cwd = %path.display(), "directory changed");
        Ok(path)
    }

    /// Names of the files and subdirectories of `dir`, each group sorted
    pub fn list_directory(&self, dir: &Path) -> FmResult<DirListing> {
        let entries = fs::read_dir(dir).map_err(|_| FmError::DirectoryNotFound(dir.to_path_buf()))?;
        let mut listing = DirListing::default();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                listing.directories.push(name);
            } else {
                listing.files.push(name);
            }
        }
        listing.files.sort();
        listing.directories.sort();
        Ok(listing)
    }

    /// Read a whole text file in `encoding`
    pub fn read_text(&self, path: &Path, encoding: TextEncoding) -> FmResult<String> {
        self.check_readable(path)?;
        let bytes = fs::read(path).map_err(|e| access_error(path, e))?;
        debug!(path = %path.display(), %encoding, bytes = bytes.len(), "file read");
        Ok(encoding.decode(&bytes))
    }

    /// Create (or truncate) `path` and write `lines` in `encoding`, each
    /// followed by a newline
    pub fn create_text<S: AsRef<str>>(
        &self,
        path: &Path,
        lines: &[S],
        encoding: TextEncoding,
    ) -> FmResult<()> {
        self.check_writable(path)?;
        let text = join_lines(lines);
        fs::write(path, encoding.encode(&text)).map_err(|source| FmError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), %encoding, lines = lines.len(), "file created");
        Ok(())
    }

    /// Write the UTF-8 contents of `sources` to `dest`, one after another,
    /// and return the written text
    pub fn concatenate(&self, sources: &[PathBuf], dest: &Path) -> FmResult<String> {
        if dest.exists() {
            self.check_readable(dest)?;
            self.check_writable(dest)?;
        }
        let mut texts = Vec::with_capacity(sources.len());
        for source in sources {
            texts.push(self.read_text(source, TextEncoding::Utf8)?);
        }
        let text = join_lines(&texts);
        fs::write(dest, &text).map_err(|source| FmError::WriteFailed {
            path: dest.to_path_buf(),
            source,
        })?;
        info!(dest = %dest.display(), sources = sources.len(), "files concatenated");
        Ok(text)
    }

    /// Read `path` as UTF-8 and split it into lines
    pub fn read_lines(&self, path: &Path) -> FmResult<Vec<String>> {
        let text = self.read_text(path, TextEncoding::Utf8)?;
        Ok(split_lines(&text).into_iter().map(str::to_string).collect())
    }

    /// Diff two files line by line.
    ///
    /// Both paths must exist before either is opened; nothing is computed
    /// unless both files pass every check.
    pub fn diff_files(&self, old: &Path, new: &Path) -> FmResult<EditScript> {
        for path in [old, new] {
            if !path.is_file() {
                return Err(FmError::NotFound(path.to_path_buf()));
            }
        }
        self.check_readable(old)?;
        self.check_readable(new)?;

        let old_lines = self.read_lines(old)?;
        let new_lines = self.read_lines(new)?;
        Ok(self.engine.diff_lines(&old_lines, &new_lines))
    }

    /// Write `lines` to `dest`, one per line
    pub fn write_lines<S: AsRef<str>>(&self, dest: &Path, lines: &[S]) -> FmResult<()> {
        fs::write(dest, join_lines(lines)).map_err(|source| FmError::WriteFailed {
            path: dest.to_path_buf(),
            source,
        })?;
        debug!(dest = %dest.display(), lines = lines.len(), "lines written");
        Ok(())
    }
}

/// List mounted filesystems
#[cfg(target_os = "linux")]
pub fn list_drives() -> FmResult<Vec<Drive>> {
    let mounts = fs::read_to_string("/proc/mounts")?;
    Ok(parse_mounts(&mounts))
}

/// List filesystem roots
#[cfg(windows)]
pub fn list_drives() -> FmResult<Vec<Drive>> {
    Ok((b'A'..=b'Z')
        .map(|letter| format!("{}:\\", letter as char))
        .filter(|root| Path::new(root).exists())
        .map(|name| Drive {
            name,
            kind: "Fixed".to_string(),
        })
        .collect())
}

/// List filesystem roots
#[cfg(not(any(target_os = "linux", windows)))]
pub fn list_drives() -> FmResult<Vec<Drive>> {
    Ok(vec![Drive {
        name: "/".to_string(),
        kind: "Fixed".to_string(),
    }])
}

/// Parse `/proc/mounts` content into drives (mount point and filesystem type)
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_mounts(mounts: &str) -> Vec<Drive> {
    mounts
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            Some(Drive {
                name: unescape_mount(mount_point),
                kind: fs_type.to_string(),
            })
        })
        .collect()
}

/// Undo the octal escapes (`\040` for space, ...) used in `/proc/mounts`
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn unescape_mount(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::Change;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_lines_lone_carriage_return() {
        let dir = TempDir::new().unwrap();
        let old = write(dir.path(), "a.txt", "a\rb\n");
        let new = write(dir.path(), "b.txt", "a\nb\n");
        let ops = FileOps::new();

        assert_eq!(ops.read_lines(&old).unwrap(), vec!["a", "b"]);
        let script = ops.diff_files(&old, &new).unwrap();
        assert_eq!(script.to_lines(), vec!["= a", "= b"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_move_out_of_read_only_directory_keeps_single_copy() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let from = write(&locked, "a.txt", "data");
        let to = dir.path().join("b.txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions
        let privileged = File::create(locked.join("write-check")).is_ok();
        let result = FileOps::new().move_file(&from, &to);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if privileged {
            return;
        }

        assert!(matches!(result, Err(FmError::AccessDenied(_))));
        assert!(from.exists());
        assert!(!to.exists());
    }

    #[test]
    fn test_move_replaces_existing_target() {
        let dir = TempDir::new().unwrap();
        let from = write(dir.path(), "a.txt", "new");
        let to = write(dir.path(), "b.txt", "old");
        FileOps::new().move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "new");
    }

    #[test]
    fn test_check_readable_missing() {
        let dir = TempDir::new().unwrap();
        let err = FileOps::new().check_readable(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, FmError::NotFound(_)));
    }

    #[test]
    fn test_check_readable_too_large() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "big.txt", "0123456789");
        let ops = FileOps::new().with_max_file_size(10);
        let err = ops.check_readable(&path).unwrap_err();
        assert!(matches!(err, FmError::TooLarge { size: 10, limit: 10, .. }));
        assert_eq!(FileOps::new().with_max_file_size(11).check_readable(&path).unwrap(), 10);
    }

    #[test]
    fn test_check_readable_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let err = FileOps::new().check_readable(dir.path()).unwrap_err();
        assert!(matches!(err, FmError::NotFound(_)));
    }

    #[test]
    fn test_copy_overwrites() {
        let dir = TempDir::new().unwrap();
        let from = write(dir.path(), "a.txt", "new");
        let to = write(dir.path(), "b.txt", "old");
        FileOps::new().copy_file(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "new");
        assert!(from.exists());
    }

    #[test]
    fn test_copy_onto_itself_keeps_content() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "a.txt", "keep");
        let ops = FileOps::new();
        assert_eq!(ops.copy_file(&path, &path).unwrap(), 4);
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep");
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = FileOps::new()
            .copy_file(&dir.path().join("a"), &dir.path().join("b"))
            .unwrap_err();
        assert!(matches!(err, FmError::NotFound(p) if p.ends_with("a")));
    }

    #[test]
    fn test_move_overwrites_and_removes_source() {
        let dir = TempDir::new().unwrap();
        let from = write(dir.path(), "a.txt", "moved");
        let to = write(dir.path(), "b.txt", "old");
        FileOps::new().move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "moved");
    }

    #[test]
    fn test_remove_file() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "a.txt", "x");
        let ops = FileOps::new();
        ops.remove_file(&path).unwrap();
        assert!(!path.exists());
        assert!(matches!(ops.remove_file(&path).unwrap_err(), FmError::NotFound(_)));
    }

    #[test]
    fn test_change_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let ops = FileOps::new();
        let cwd = ops.change_directory(dir.path(), "sub").unwrap();
        assert!(cwd.ends_with("sub"));
        let back = ops.change_directory(&cwd, "..").unwrap();
        assert_eq!(back, dir.path().canonicalize().unwrap());
        let err = ops.change_directory(dir.path(), "missing").unwrap_err();
        assert!(matches!(err, FmError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_list_directory_files_then_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.txt", "");
        write(dir.path(), "a.txt", "");
        fs::create_dir(dir.path().join("aaa")).unwrap();
        let listing = FileOps::new().list_directory(dir.path()).unwrap();
        assert_eq!(listing.names().collect::<Vec<_>>(), vec!["a.txt", "b.txt", "aaa"]);
    }

    #[test]
    fn test_create_and_read_in_encoding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        let ops = FileOps::new();
        ops.create_text(&path, &["héllo", "wörld"], TextEncoding::Utf16).unwrap();
        assert_eq!(ops.read_text(&path, TextEncoding::Utf16).unwrap(), "héllo\nwörld\n");
        assert_ne!(fs::read(&path).unwrap(), "héllo\nwörld\n".as_bytes());
    }

    #[test]
    fn test_create_without_text_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        let none: [&str; 0] = [];
        FileOps::new().create_text(&path, &none, TextEncoding::Utf8).unwrap();
        assert_eq!(fs::read(&path).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_concatenate() {
        let dir = TempDir::new().unwrap();
        let a = write(dir.path(), "a.txt", "one");
        let b = write(dir.path(), "b.txt", "two\nthree");
        let dest = dir.path().join("out.txt");
        let text = FileOps::new().concatenate(&[a, b], &dest).unwrap();
        assert_eq!(text, "one\ntwo\nthree\n");
        assert_eq!(fs::read_to_string(&dest).unwrap(), text);
    }

    #[test]
    fn test_concatenate_missing_source_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let a = write(dir.path(), "a.txt", "one");
        let dest = dir.path().join("out.txt");
        let err = FileOps::new()
            .concatenate(&[a, dir.path().join("missing.txt")], &dest)
            .unwrap_err();
        assert!(matches!(err, FmError::NotFound(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn test_diff_files() {
        let dir = TempDir::new().unwrap();
        let old = write(dir.path(), "old.txt", "a\nb\nc\n");
        let new = write(dir.path(), "new.txt", "a\nx\nc\n");
        let script = FileOps::new().diff_files(&old, &new).unwrap();
        assert_eq!(
            script.into_changes(),
            vec![
                Change::unchanged("a"),
                Change::removed("b"),
                Change::added("x"),
                Change::unchanged("c"),
            ]
        );
    }

    #[test]
    fn test_diff_files_checks_existence_first() {
        let dir = TempDir::new().unwrap();
        let big = write(dir.path(), "big.txt", "0123456789");
        let ops = FileOps::new().with_max_file_size(4);
        let err = ops.diff_files(&big, &dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FmError::NotFound(_)));
        let err = ops.diff_files(&big, &big).unwrap_err();
        assert!(matches!(err, FmError::TooLarge { .. }));
    }

    #[test]
    fn test_write_lines_failure() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("no/such/dir/out.txt");
        let err = FileOps::new().write_lines(&dest, &["x"]).unwrap_err();
        assert!(matches!(err, FmError::WriteFailed { .. }));
    }

    #[test]
    fn test_parse_mounts() {
        let mounts = "/dev/sda1 / ext4 rw,relatime 0 0\n\
                      tmpfs /mnt/my\\040disk tmpfs rw 0 0\n";
        let drives = parse_mounts(mounts);
        assert_eq!(
            drives,
            vec![
                Drive { name: "/".into(), kind: "ext4".into() },
                Drive { name: "/mnt/my disk".into(), kind: "tmpfs".into() },
            ]
        );
    }
}
