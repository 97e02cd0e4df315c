//! Comment-annotation and change-history extraction from object definitions.
//!
//! Definitions may carry labelled header lines such as
//!
//! ```text
//! -- Author: J. Doe
//! -- Created: 2021-04-01
//! -- Description: Open orders per customer
//! ```
//!
//! and change-log lines of the form `Commit;user;date;comment`.
//!
//! Labels are matched case-insensitively at the start of a line, after any
//! whitespace and SQL comment markers, and must be followed by `:`. The
//! first line matching a label wins. All three labels must be present,
//! otherwise nothing is trusted and the result is empty.

use chrono::NaiveDate;

const CREATOR_LABELS: &[&str] = &["ersteller/in", "creator", "author"];
const DATE_LABELS: &[&str] = &["erstelldatum", "creation date", "created"];
const DESCRIPTION_LABELS: &[&str] = &["kommentar", "description", "comment"];

const COMMIT_MARKER: &str = "Commit;";

/// Metadata extracted from a definition's comment header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotations {
    pub creator: String,
    /// `None` when the date label is present but not `YYYY-MM-DD`
    pub created: Option<NaiveDate>,
    pub description: String,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.creator.is_empty() && self.created.is_none() && self.description.is_empty()
    }
}

/// One `Commit;` line from a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub user: String,
    pub date: String,
    pub comment: String,
}

/// Extracts creator, creation date and description from a definition.
///
/// # Example
/// ```rust
/// use dbcatalog_core::export::annotations::extract_annotations;
///
/// let definition = "/*\n * Author: jdoe\n * Created: 2021-04-01\n * Description: Open orders\n */";
/// let annotations = extract_annotations(definition);
/// assert_eq!(annotations.creator, "jdoe");
/// assert_eq!(annotations.description, "Open orders");
/// assert!(annotations.created.is_some());
/// ```
pub fn extract_annotations(definition: &str) -> Annotations {
    let mut creator = None;
    let mut created = None;
    let mut description = None;

    for line in definition.lines() {
        let content = strip_comment_markers(line);
        if creator.is_none() {
            creator = match_label(content, CREATOR_LABELS);
        }
        if created.is_none() {
            created = match_label(content, DATE_LABELS);
        }
        if description.is_none() {
            description = match_label(content, DESCRIPTION_LABELS);
        }
    }

    match (creator, created, description) {
        (Some(creator), Some(created), Some(description)) => Annotations {
            creator: creator.to_string(),
            created: parse_date(created),
            description: description.to_string(),
        },
        _ => Annotations::default(),
    }
}

/// Parses `Commit;user;date;comment` lines.
///
/// Fields beyond the third stay part of the comment. Missing fields are
/// empty.
pub fn parse_change_history(definition: &str) -> Vec<ChangeRecord> {
    definition
        .lines()
        .filter_map(|line| line.trim().strip_prefix(COMMIT_MARKER))
        .map(|rest| {
            let mut fields = rest.splitn(3, ';');
            ChangeRecord {
                user: fields.next().unwrap_or_default().trim().to_string(),
                date: fields.next().unwrap_or_default().trim().to_string(),
                comment: fields.next().unwrap_or_default().trim().to_string(),
            }
        })
        .collect()
}

/// Strict `YYYY-MM-DD`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn strip_comment_markers(line: &str) -> &str {
    let mut rest = line.trim_start();
    loop {
        let next = rest
            .strip_prefix("--")
            .or_else(|| rest.strip_prefix("/*"))
            .or_else(|| rest.strip_prefix('*'));
        match next {
            Some(stripped) => rest = stripped.trim_start(),
            None => return rest,
        }
    }
}

/// Returns the trimmed value after `label:` when the line starts with one
/// of `labels`.
fn match_label<'a>(content: &'a str, labels: &[&str]) -> Option<&'a str> {
    labels.iter().find_map(|label| {
        let head = content.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let value = content[label.len()..].trim_start().strip_prefix(':')?;
        Some(value.trim().trim_end_matches("*/").trim_end())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HEADER: &str = "-- Ersteller/in: Max Muster\n\
        -- Erstelldatum: 2020-02-29\n\
        -- Kommentar: Offene Bestellungen\n\
        CREATE VIEW dbo.vOpen AS SELECT 1 AS x";

    #[test]
    fn test_extracts_all_three_labels() {
        let annotations = extract_annotations(FULL_HEADER);
        assert_eq!(annotations.creator, "Max Muster");
        assert_eq!(annotations.created, NaiveDate::from_ymd_opt(2020, 2, 29));
        assert_eq!(annotations.description, "Offene Bestellungen");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let definition = "AUTHOR: a\ncreated: 2021-01-02\nDESCRIPTION: d";
        let annotations = extract_annotations(definition);
        assert_eq!(annotations.creator, "a");
        assert_eq!(annotations.description, "d");
        assert!(annotations.created.is_some());
    }

    #[test]
    fn test_missing_description_yields_nothing() {
        let definition = "-- Creator: jdoe\n-- Created: 2021-04-01\nSELECT 1";
        let annotations = extract_annotations(definition);
        assert_eq!(annotations, Annotations::default());
        assert!(annotations.is_empty());
    }

    #[test]
    fn test_unparseable_date_is_none() {
        for date in ["01.04.2021", "2021-4-1", "2021-13-01", "2021-04-01 10:00", ""] {
            let definition = format!("Author: a\nCreated: {}\nComment: c", date);
            let annotations = extract_annotations(&definition);
            assert_eq!(annotations.creator, "a", "date {:?}", date);
            assert_eq!(annotations.created, None, "date {:?}", date);
        }
    }

    #[test]
    fn test_first_match_wins() {
        let definition = "Author: first\nAuthor: second\nCreated: 2021-04-01\nComment: c";
        assert_eq!(extract_annotations(definition).creator, "first");
    }

    #[test]
    fn test_block_comment_header() {
        let definition = "/* Author: jdoe */\n/* Creation date: 2022-12-31 */\n/* Comment: totals */";
        let annotations = extract_annotations(definition);
        assert_eq!(annotations.creator, "jdoe");
        assert_eq!(annotations.created, NaiveDate::from_ymd_opt(2022, 12, 31));
        assert_eq!(annotations.description, "totals");
    }

    #[test]
    fn test_creator_does_not_match_creation_date() {
        let definition = "Creation date: 2022-12-31\nComment: c";
        assert_eq!(extract_annotations(definition), Annotations::default());
    }

    #[test]
    fn test_parse_change_history() {
        let definition = "CREATE VIEW v AS\n  Commit;jdoe;2021-04-01;initial version\n\
            -- not a commit\n\
            Commit;asmith;2021-05-02;fix; add column\n\
            Commit;only-user";
        let changes = parse_change_history(definition);

        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].user, "jdoe");
        assert_eq!(changes[0].date, "2021-04-01");
        assert_eq!(changes[0].comment, "initial version");
        assert_eq!(changes[1].comment, "fix; add column");
        assert_eq!(changes[2].user, "only-user");
        assert!(changes[2].date.is_empty());
    }
}
