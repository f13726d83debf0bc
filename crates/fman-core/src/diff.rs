//! Line diff engine based on the longest common subsequence
//!
//! A diff runs in three phases: [`compute_lcs_table`] fills the dynamic
//! programming table together with the branch taken at every cell,
//! [`reconstruct_lcs`] walks the recorded branches back from the last cell,
//! and [`build_edit_script`] merges both inputs around the common
//! subsequence into an [`EditScript`].

use crate::change::{Change, EditScript};
use tracing::debug;

/// Recurrence branch that produced a cell of the LCS table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Base row or column
    None,
    /// Value inherited from `(i - 1, j)`
    SkipSource,
    /// Lines `source[i - 1]` and `target[j - 1]` are equal
    Match,
    /// Value inherited from `(i, j - 1)`
    SkipTarget,
}

/// LCS lengths and choices for every prefix pair of two line sequences.
///
/// Both matrices are `(n + 1) × (m + 1)` and stored row-major in flat buffers.
#[derive(Debug, Clone)]
pub struct LcsTable {
    rows: usize,
    cols: usize,
    lengths: Vec<usize>,
    choices: Vec<Choice>,
}

impl LcsTable {
    fn new(n: usize, m: usize) -> Self {
        let cells = (n + 1) * (m + 1);
        Self {
            rows: n + 1,
            cols: m + 1,
            lengths: vec![0; cells],
            choices: vec![Choice::None; cells],
        }
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols);
        i * self.cols + j
    }

    /// Number of source lines the table was built for
    pub fn source_len(&self) -> usize {
        self.rows - 1
    }

    /// Number of target lines the table was built for
    pub fn target_len(&self) -> usize {
        self.cols - 1
    }

    /// LCS length of `source[..i]` and `target[..j]`
    pub fn length(&self, i: usize, j: usize) -> usize {
        self.lengths[self.index(i, j)]
    }

    /// Branch recorded for cell `(i, j)`
    pub fn choice(&self, i: usize, j: usize) -> Choice {
        self.choices[self.index(i, j)]
    }

    /// LCS length of the full sequences
    pub fn lcs_len(&self) -> usize {
        self.length(self.source_len(), self.target_len())
    }
}

/// Fill the LCS table for `source` and `target`.
///
/// Lines are compared by exact string equality. When skipping either side
/// yields the same length, the source line is skipped; the target line is
/// skipped only when that is strictly better.
pub fn compute_lcs_table<S, T>(source: &[S], target: &[T]) -> LcsTable
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let n = source.len();
    let m = target.len();
    let mut table = LcsTable::new(n, m);

    for i in 1..=n {
        let line = source[i - 1].as_ref();
        for j in 1..=m {
            let (length, choice) = if line == target[j - 1].as_ref() {
                (table.length(i - 1, j - 1) + 1, Choice::Match)
            } else {
                let up = table.length(i - 1, j);
                let left = table.length(i, j - 1);
                if left > up {
                    (left, Choice::SkipTarget)
                } else {
                    (up, Choice::SkipSource)
                }
            };
            let idx = table.index(i, j);
            table.lengths[idx] = length;
            table.choices[idx] = choice;
        }
    }

    table
}

/// Walk the choices of `table` back from its last cell and collect the
/// common subsequence, in order.
///
/// `source` must be the sequence the table was computed from.
pub fn reconstruct_lcs<'a, S>(table: &LcsTable, source: &'a [S]) -> Vec<&'a str>
where
    S: AsRef<str>,
{
    debug_assert_eq!(table.source_len(), source.len());

    let mut common = Vec::with_capacity(table.lcs_len());
    let mut i = table.source_len();
    let mut j = table.target_len();

    loop {
        match table.choice(i, j) {
            Choice::Match => {
                common.push(source[i - 1].as_ref());
                i -= 1;
                j -= 1;
            }
            Choice::SkipSource => i -= 1,
            Choice::SkipTarget => j -= 1,
            Choice::None => break,
        }
    }

    common.reverse();
    common
}

/// Merge `source` and `target` around `common` into an edit script.
///
/// Every element of `common` must occur in order in both sequences, which
/// holds for the output of [`reconstruct_lcs`].
pub fn build_edit_script<S, T>(source: &[S], target: &[T], common: &[&str]) -> EditScript
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let mut script = EditScript::with_capacity(source.len() + target.len());
    let mut i = 0;
    let mut j = 0;

    for &anchor in common {
        while i < source.len() && source[i].as_ref() != anchor {
            script.push(Change::removed(source[i].as_ref()));
            i += 1;
        }
        while j < target.len() && target[j].as_ref() != anchor {
            script.push(Change::added(target[j].as_ref()));
            j += 1;
        }
        script.push(Change::unchanged(anchor));
        i += 1;
        j += 1;
    }

    for line in source.iter().skip(i) {
        script.push(Change::removed(line.as_ref()));
    }
    for line in target.iter().skip(j) {
        script.push(Change::added(line.as_ref()));
    }

    script
}

/// Split `text` into lines ending at `\n`, `\r\n` or a lone `\r`.
///
/// A terminator at the very end does not start an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// The diff engine
///
/// Stateless; every call allocates its own tables and drops them before
/// returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the edit script turning `source` into `target`
    pub fn diff_lines<S, T>(&self, source: &[S], target: &[T]) -> EditScript
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let table = compute_lcs_table(source, target);
        let common = reconstruct_lcs(&table, source);
        let script = build_edit_script(source, target, &common);

        debug!(
            source_lines = source.len(),
            target_lines = target.len(),
            lcs = common.len(),
            "diff computed"
        );

        script
    }

    /// Compute the edit script between two texts, split into lines
    pub fn diff_strings(&self, old: &str, new: &str) -> EditScript {
        self.diff_lines(&split_lines(old), &split_lines(new))
    }
}
