//! Building push telemetry payloads for a changeset.
//!
//! The payload embeds a [`DiffStat`] for ordinary changesets. Merges get a
//! `null` diffstat, and their patch is never fetched.

use crate::changeset::{Changeset, ChangesetError};
use crate::diff::{DiffStat, diffstat};
use chrono::{DateTime, Utc};
use error_set::error_set;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

error_set! {
    /// Errors from obtaining the raw patch of a changeset
    PatchSourceError := {
        #[display("Failed to read patch {path}: {message}")]
        ReadFailed { path: String, message: String },
        #[display("No patch available for changeset {changeset}")]
        Missing { changeset: String },
    }

    /// Errors from assembling a telemetry payload
    PayloadError := {
        ChangesetError(ChangesetError),
    } || PatchSourceError
}

/// Supplies the `hg export` text of a changeset.
pub trait PatchSource {
    /// Return the raw export patch for `changeset_id`.
    fn raw_patch(&self, changeset_id: &str) -> Result<String, PatchSourceError>;
}

/// A patch stored in a single file, used for whichever changeset is asked for.
#[derive(Debug, Clone)]
pub struct FilePatchSource {
    path: PathBuf,
}

impl FilePatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PatchSource for FilePatchSource {
    fn raw_patch(&self, changeset_id: &str) -> Result<String, PatchSourceError> {
        log::debug!(
            "reading patch for {changeset_id} from {}",
            self.path.display()
        );
        fs::read_to_string(&self.path).map_err(|e| PatchSourceError::ReadFailed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Telemetry document describing one pushed changeset.
///
/// The upstream hgpush schema also has `reviewSystemUsed`; it is not emitted
/// here because the review-system classifier is not part of this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(rename = "changesetID")]
    pub changeset_id: String,
    /// `None` for merge changesets
    pub diffstat: Option<DiffStat>,
    pub landing_system: Option<String>,
    pub repository: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub push_date: DateTime<Utc>,
}

/// Fetch a changeset's patch and compute its statistics.
///
/// # Errors
///
/// Propagates any [`PatchSourceError`] from `source`.
pub fn diffstat_for_changeset(
    source: &dyn PatchSource,
    changeset_id: &str,
) -> Result<DiffStat, PatchSourceError> {
    let raw_patch = source.raw_patch(changeset_id)?;
    let stat = diffstat(&raw_patch);
    log::debug!("{changeset_id}: {stat}");
    Ok(stat)
}

/// Build the telemetry payload for `changeset`, pushed to `repo_url`.
///
/// # Errors
///
/// Returns [`PayloadError`] when the patch cannot be obtained or the push
/// date is out of range.
pub fn payload_for_changeset(
    changeset: &Changeset,
    repo_url: &str,
    source: &dyn PatchSource,
) -> Result<Payload, PayloadError> {
    let diffstat = if changeset.is_merge() {
        log::debug!("{} is a merge, skipping diffstat", changeset.node);
        None
    } else {
        Some(diffstat_for_changeset(source, &changeset.node)?)
    };

    Ok(Payload {
        changeset_id: changeset.node.clone(),
        diffstat,
        landing_system: changeset.landingsystem.clone(),
        repository: repo_url.to_string(),
        push_date: changeset.push_date_utc()?,
    })
}
