//! Reading the metadata block of an `hg export` patch.
//!
//! ```text
//! # HG changeset patch
//! # User Jane Doe <jane@example.com>
//! # Date 1530120920 14400
//! #      Wed Jun 27 13:35:20 2018 -0400
//! # Node ID 62a578a28fe94efb7f03138bbfaa458d1c31314e
//! # Parent  3659a2ff799f0a531283d22d112b08eb23a9ced7
//! Fix capitalization
//! ```
//!
//! Only the contiguous `#` lines at the very top are read. Continuation lines
//! and keys this module does not know about are skipped.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, space1},
    combinator::{map, rest},
    sequence::preceded,
};

const EXPORT_MARKER: &str = "# HG changeset patch";

/// Metadata from the header of an export-style patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportHeader {
    pub user: Option<String>,
    /// Raw `Date` value: unix seconds and timezone offset
    pub date: Option<String>,
    pub node_id: Option<String>,
    /// One entry per `# Parent` line, in order
    pub parents: Vec<String>,
    pub branch: Option<String>,
}

/// A single recognised `# Key value` line
#[derive(Debug, PartialEq)]
enum HeaderField<'a> {
    User(&'a str),
    Date(&'a str),
    NodeId(&'a str),
    Parent(&'a str),
    Branch(&'a str),
}

impl ExportHeader {
    /// Read the export header at the top of `patch_text`.
    ///
    /// Returns `None` when the text does not start with `# HG changeset patch`,
    /// e.g. for a bare extended diff.
    ///
    /// # Examples
    ///
    /// ```
    /// use commit_diffstat::ExportHeader;
    ///
    /// let patch = concat!(
    ///     "# HG changeset patch\n",
    ///     "# Node ID 62a578a28fe94efb7f03138bbfaa458d1c31314e\n",
    ///     "# Parent  3659a2ff799f0a531283d22d112b08eb23a9ced7\n",
    ///     "Fix capitalization\n",
    /// );
    /// let header = ExportHeader::parse(patch).unwrap();
    /// assert_eq!(header.parents.len(), 1);
    /// assert!(!header.is_merge());
    ///
    /// assert!(ExportHeader::parse("diff --git a/x b/x\n").is_none());
    /// ```
    #[must_use]
    pub fn parse(patch_text: &str) -> Option<Self> {
        let mut lines = patch_text.lines();
        if lines.next()?.trim_end() != EXPORT_MARKER {
            return None;
        }

        let mut header = ExportHeader::default();
        for line in lines.take_while(|line| line.starts_with('#')) {
            match header_field(line) {
                Ok((_, field)) => header.apply(field),
                Err(_) => log::trace!("skipping export header line {line:?}"),
            }
        }

        Some(header)
    }

    /// A changeset with more than one parent is a merge.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    fn apply(&mut self, field: HeaderField<'_>) {
        match field {
            HeaderField::User(user) => self.user = Some(user.to_string()),
            HeaderField::Date(date) => self.date = Some(date.to_string()),
            HeaderField::NodeId(node) => self.node_id = Some(node.to_string()),
            HeaderField::Parent(parent) => self.parents.push(parent.to_string()),
            HeaderField::Branch(branch) => self.branch = Some(branch.to_string()),
        }
    }
}

/// Parse one `# Key value` header line
fn header_field(input: &str) -> IResult<&str, HeaderField<'_>> {
    preceded(
        (char('#'), space1),
        alt((
            map(keyed("User", text_value), HeaderField::User),
            map(keyed("Date", text_value), HeaderField::Date),
            map(keyed("Node ID", changeset_id), HeaderField::NodeId),
            map(keyed("Parent", changeset_id), HeaderField::Parent),
            map(keyed("Branch", text_value), HeaderField::Branch),
        )),
    )
    .parse(input)
}

/// `Key<whitespace>value`
fn keyed<'a, O>(
    key: &'static str,
    value: impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>> {
    preceded((tag(key), space1), value)
}

/// Hexadecimal changeset id
fn changeset_id(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_hexdigit()).parse(input)
}

/// The rest of the line, without trailing whitespace
fn text_value(input: &str) -> IResult<&str, &str> {
    map(rest, str::trim_end).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const EXPORT: &str = r#"# HG changeset patch
# User Jane Doe <jane@example.com>
# Date 1530120920 14400
#      Wed Jun 27 13:35:20 2018 -0400
# Node ID 62a578a28fe94efb7f03138bbfaa458d1c31314e
# Parent  3659a2ff799f0a531283d22d112b08eb23a9ced7
Fix capitalization

diff --git a/hello.txt b/hello.txt
"#;

    #[test]
    fn parse_full_header() {
        let header = ExportHeader::parse(EXPORT).unwrap();
        assert_eq!(
            header,
            ExportHeader {
                user: Some("Jane Doe <jane@example.com>".to_string()),
                date: Some("1530120920 14400".to_string()),
                node_id: Some("62a578a28fe94efb7f03138bbfaa458d1c31314e".to_string()),
                parents: vec!["3659a2ff799f0a531283d22d112b08eb23a9ced7".to_string()],
                branch: None,
            }
        );
        assert!(!header.is_merge());
    }

    #[test]
    fn parse_merge_header() {
        let patch = r#"# HG changeset patch
# User Jane Doe <jane@example.com>
# Branch stable
# Node ID 62a578a28fe94efb7f03138bbfaa458d1c31314e
# Parent  3659a2ff799f0a531283d22d112b08eb23a9ced7
# Parent  8ab2c5c1d0e1f0a4c3b2d1e0f9a8b7c6d5e4f3a2
merge default into stable
"#;
        let header = ExportHeader::parse(patch).unwrap();
        assert_eq!(header.branch.as_deref(), Some("stable"));
        assert_eq!(header.parents.len(), 2);
        assert!(header.is_merge());
    }

    #[test]
    fn header_stops_at_first_non_comment_line() {
        let patch = r#"# HG changeset patch
# Parent  3659a2ff799f0a531283d22d112b08eb23a9ced7
Bug 1 - description mentions
# Parent  8ab2c5c1d0e1f0a4c3b2d1e0f9a8b7c6d5e4f3a2
"#;
        let header = ExportHeader::parse(patch).unwrap();
        assert_eq!(header.parents.len(), 1);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let patch = "# HG changeset patch\n# EXP-Topic cleanup\n# User someone\n";
        let header = ExportHeader::parse(patch).unwrap();
        assert_eq!(header.user.as_deref(), Some("someone"));
    }

    #[test]
    fn bare_diff_has_no_header() {
        assert_eq!(ExportHeader::parse("diff --git a/x b/x\n"), None);
        assert_eq!(ExportHeader::parse(""), None);
    }

    #[test]
    fn header_field_rejects_continuation_lines() {
        assert!(header_field("#      Wed Jun 27 13:35:20 2018 -0400").is_err());
    }

    #[test]
    fn header_field_parent() {
        assert_eq!(
            header_field("# Parent  3659a2ff").unwrap(),
            ("", HeaderField::Parent("3659a2ff"))
        );
    }
}
