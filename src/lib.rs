use error_set::error_set;
use std::fs;
use std::io::{self, Read};

mod changeset;
mod diff;
mod export;
mod telemetry;

pub use changeset::{Changeset, ChangesetError};
pub use diff::{DiffStat, diffstat};
pub use export::ExportHeader;
pub use telemetry::{
    FilePatchSource, PatchSource, PatchSourceError, Payload, PayloadError, diffstat_for_changeset,
    payload_for_changeset,
};

/// Input name that selects standard input
pub const STDIN: &str = "-";

error_set! {
    /// Top-level error for commit-diffstat operations
    CommitDiffstatError := {
        #[display("Failed to write output: {message}")]
        OutputError { message: String },
        PayloadError(PayloadError),
        PatchSourceError(PatchSourceError),
        ChangesetError(ChangesetError),
    } || InputError

    /// Errors from reading patch or metadata input
    InputError := {
        #[display("Failed to read {input}: {message}")]
        UnreadableInput { input: String, message: String },
    }
}

/// Read a whole input, where `-` means standard input.
///
/// # Errors
///
/// Returns [`InputError::UnreadableInput`] when the file cannot be read or is
/// not valid UTF-8.
pub fn read_input(input: &str) -> Result<String, InputError> {
    let unreadable = |e: io::Error| InputError::UnreadableInput {
        input: input.to_string(),
        message: e.to_string(),
    };

    if input == STDIN {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(unreadable)?;
        Ok(text)
    } else {
        fs::read_to_string(input).map_err(unreadable)
    }
}

/// Statistics for an export patch, or `None` when its header marks a merge.
///
/// Bare extended diffs carry no parent information and are always counted.
///
/// # Examples
///
/// ```
/// # use commit_diffstat::diffstat_unless_merge;
/// let merge = concat!(
///     "# HG changeset patch\n",
///     "# Parent  3659a2ff799f0a531283d22d112b08eb23a9ced7\n",
///     "# Parent  8ab2c5c1d0e1f0a4c3b2d1e0f9a8b7c6d5e4f3a2\n",
///     "merge\n",
/// );
/// assert_eq!(diffstat_unless_merge(merge), None);
///
/// let diff = "diff --git a/x b/x\n@@ -1 +1 @@\n-a\n+b\n";
/// assert_eq!(diffstat_unless_merge(diff).unwrap().additions, 1);
/// ```
#[must_use]
pub fn diffstat_unless_merge(patch_text: &str) -> Option<DiffStat> {
    match ExportHeader::parse(patch_text) {
        Some(header) if header.is_merge() => {
            log::debug!(
                "skipping merge {}",
                header.node_id.as_deref().unwrap_or("<unknown>")
            );
            None
        }
        _ => Some(diffstat(patch_text)),
    }
}
