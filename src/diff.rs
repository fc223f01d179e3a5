//! Diff statistics for export-style and extended-diff patches.
//!
//! [`diffstat`] counts changed files, added lines and removed lines the same
//! way `hg diff --git --stat` does, for either a patch produced by
//! `hg export --git` or a bare Git extended diff.
//!
//! An export patch looks like this:
//!
//! ```text
//! # HG changeset patch
//! # User Jane Doe <jane@example.com>
//! # Node ID 62a578a28fe94efb7f03138bbfaa458d1c31314e
//! # Parent  3659a2ff799f0a531283d22d112b08eb23a9ced7
//! Fix capitalization
//!
//! diff --git a/hello.txt b/hello.txt
//! --- a/hello.txt
//! +++ b/hello.txt
//! @@ -1,1 +1,1 @@
//! -hello world
//! +Hello World
//! ```
//!
//! Only three kinds of line matter: `diff --git` starts a file section, `@@ `
//! starts a hunk, and inside a hunk `+`/`-` lines are additions/deletions.
//! Everything before the first hunk of a file (the `#` header, the commit
//! description, `---`/`+++`, rename and binary markers) is ignored.
//!
//! # Known limitation
//!
//! A commit description that itself contains a `diff --git` or `@@ ` line
//! is indistinguishable from a real patch body, and the counts come out
//! inflated.
//!
//! # Examples
//!
//! ```
//! use commit_diffstat::diffstat;
//!
//! let patch = "diff --git a/hello.txt b/hello.txt\n\
//!              --- a/hello.txt\n\
//!              +++ b/hello.txt\n\
//!              @@ -1,1 +1,1 @@\n\
//!              -hello world\n\
//!              +Hello World\n";
//!
//! let stat = diffstat(patch);
//! assert_eq!(stat.files_changed, 1);
//! assert_eq!(stat.additions, 1);
//! assert_eq!(stat.deletions, 1);
//! ```

use serde::Serialize;
use std::fmt;
use std::ops::Add;

const FILE_START: &str = "diff --git";
const HUNK_START: &str = "@@ ";

/// Summary statistics for one patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DiffStat {
    /// Number of `diff --git` file sections
    #[serde(rename = "changedFiles")]
    pub files_changed: u64,
    /// Number of `+` lines inside hunks
    pub additions: u64,
    /// Number of `-` lines inside hunks
    pub deletions: u64,
}

impl DiffStat {
    /// Total number of changed lines (additions plus deletions).
    #[must_use]
    pub fn changed_lines(&self) -> u64 {
        self.additions + self.deletions
    }

    /// True when the patch touched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for DiffStat {
    type Output = DiffStat;

    fn add(self, rhs: Self) -> Self::Output {
        DiffStat {
            files_changed: self.files_changed + rhs.files_changed,
            additions: self.additions + rhs.additions,
            deletions: self.deletions + rhs.deletions,
        }
    }
}

impl std::iter::Sum for DiffStat {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DiffStat::default(), Add::add)
    }
}

/// Renders the summary line printed by `git diff --stat`.
///
/// ```text
/// 3 files changed, 10 insertions(+), 1 deletion(-)
/// ```
impl fmt::Display for DiffStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} changed",
            self.files_changed,
            plural(self.files_changed, "file", "files")
        )?;
        if self.additions > 0 {
            write!(
                f,
                ", {} {}(+)",
                self.additions,
                plural(self.additions, "insertion", "insertions")
            )?;
        }
        if self.deletions > 0 {
            write!(
                f,
                ", {} {}(-)",
                self.deletions,
                plural(self.deletions, "deletion", "deletions")
            )?;
        }
        Ok(())
    }
}

fn plural<'a>(n: u64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

/// Count changed files, additions and deletions in a patch.
///
/// Accepts the output of `hg export --git` or a bare Git extended diff. Never
/// fails: text that is not a patch simply yields zero or best-effort counts.
///
/// File renames and binary changes count as a changed file but add no
/// additions or deletions unless the patch carries a hunk for them. Lines of
/// added and deleted files are included in the totals.
#[must_use]
pub fn diffstat(patch_text: &str) -> DiffStat {
    let mut files_changed = 0;
    let mut additions = 0;
    let mut deletions = 0;

    // Header lines between `diff --git` and the first `@@ ` of a file
    // (`---`, `+++`, rename/copy/binary markers) must never be counted.
    let mut in_hunk = false;

    for line in patch_text.lines() {
        if line.starts_with(FILE_START) {
            in_hunk = false;
            files_changed += 1;
        } else if line.starts_with(HUNK_START) {
            in_hunk = true;
        } else if in_hunk && line.starts_with('+') {
            additions += 1;
        } else if in_hunk && line.starts_with('-') {
            deletions += 1;
        }
        // Context (' ') and "\ No newline at end of file" lines fall through
    }

    let stat = DiffStat {
        files_changed,
        additions,
        deletions,
    };
    log::trace!("diffstat: {stat}");
    stat
}
