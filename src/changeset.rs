//! Changeset metadata as served by hgweb's `json-rev` view.

use chrono::{DateTime, Utc};
use error_set::error_set;
use serde::Deserialize;

error_set! {
    /// Errors from decoding changeset metadata
    ChangesetError := {
        /// The document is not valid changeset JSON
        #[display("Invalid changeset JSON: {message}")]
        InvalidJson { message: String },
        /// The push timestamp is outside the representable range
        #[display("Invalid push date: {seconds}")]
        InvalidPushDate { seconds: i64 },
    }
}

/// The subset of a changeset's metadata needed for telemetry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Changeset {
    /// 40 hex char changeset id
    pub node: String,
    /// Parent changeset ids; more than one means a merge
    #[serde(default)]
    pub parents: Vec<String>,
    /// `(unix seconds, timezone offset)` of the push
    pub pushdate: (i64, i32),
    /// Landing system name, absent or `null` for direct pushes
    #[serde(default)]
    pub landingsystem: Option<String>,
}

impl Changeset {
    /// Decode a `json-rev` document.
    ///
    /// # Errors
    ///
    /// Returns [`ChangesetError::InvalidJson`] when the document is malformed
    /// or lacks the `node` or `pushdate` fields.
    pub fn from_json(json: &str) -> Result<Self, ChangesetError> {
        serde_json::from_str(json).map_err(|e| ChangesetError::InvalidJson {
            message: e.to_string(),
        })
    }

    /// A changeset with more than one parent is a merge.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Push time in UTC.
    ///
    /// hgweb dates pair unix seconds with the pusher's timezone offset; the
    /// seconds are already UTC so the offset is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ChangesetError::InvalidPushDate`] for timestamps chrono
    /// cannot represent.
    pub fn push_date_utc(&self) -> Result<DateTime<Utc>, ChangesetError> {
        let (seconds, _offset) = self.pushdate;
        DateTime::from_timestamp(seconds, 0).ok_or(ChangesetError::InvalidPushDate { seconds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn decode_full_document() {
        let json = r#"{
            "node": "62a578a28fe94efb7f03138bbfaa458d1c31314e",
            "parents": ["3659a2ff799f0a531283d22d112b08eb23a9ced7"],
            "pushdate": [1527872156, 0],
            "landingsystem": "lando",
            "desc": "Fix capitalization"
        }"#;
        let changeset = Changeset::from_json(json).unwrap();
        assert_eq!(changeset.node, "62a578a28fe94efb7f03138bbfaa458d1c31314e");
        assert_eq!(changeset.landingsystem.as_deref(), Some("lando"));
        assert!(!changeset.is_merge());
        assert_eq!(
            changeset.push_date_utc().unwrap().to_rfc3339(),
            "2018-06-01T16:55:56+00:00"
        );
    }

    #[test]
    fn null_and_missing_landing_system() {
        let null = r#"{"node": "a", "pushdate": [0, 0], "landingsystem": null}"#;
        let missing = r#"{"node": "a", "pushdate": [0, 0]}"#;
        assert_eq!(Changeset::from_json(null).unwrap().landingsystem, None);
        assert_eq!(Changeset::from_json(missing).unwrap().landingsystem, None);
    }

    #[test]
    fn merge_detection() {
        let root = r#"{"node": "a", "pushdate": [0, 0], "parents": []}"#;
        let single = r#"{"node": "a", "pushdate": [0, 0], "parents": ["123abc"]}"#;
        let merge = r#"{"node": "a", "pushdate": [0, 0], "parents": ["123abc", "456def"]}"#;
        assert!(!Changeset::from_json(root).unwrap().is_merge());
        assert!(!Changeset::from_json(single).unwrap().is_merge());
        assert!(Changeset::from_json(merge).unwrap().is_merge());
    }

    #[test]
    fn missing_pushdate_is_an_error() {
        let result = Changeset::from_json(r#"{"node": "a"}"#);
        assert!(matches!(result, Err(ChangesetError::InvalidJson { .. })));
    }

    #[test]
    fn out_of_range_pushdate() {
        let changeset = Changeset {
            node: "a".to_string(),
            parents: vec![],
            pushdate: (i64::MAX, 0),
            landingsystem: None,
        };
        assert!(matches!(
            changeset.push_date_utc(),
            Err(ChangesetError::InvalidPushDate { .. })
        ));
    }
}
