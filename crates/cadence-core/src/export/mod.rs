//! Single-sheet calendar export.
//!
//! The sheet is CSV with two stacked sections:
//!
//! ```text
//! Posts
//! post_id,subreddit,title,body,author_username,timestamp,keyword_ids
//! ...
//! (three blank rows)
//! Comments
//! comment_id,post_id,parent_comment_id,comment_text,username,timestamp
//! ...
//! ```
//!
//! Fields are quoted per RFC 4180 when they contain a comma, quote, or line
//! break. Timestamps are RFC 3339 UTC with millisecond precision.

mod csv;

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::models::Calendar;

pub const POSTS_SECTION: &str = "Posts";
pub const COMMENTS_SECTION: &str = "Comments";
pub const POST_COLUMNS: [&str; 7] = [
    "post_id",
    "subreddit",
    "title",
    "body",
    "author_username",
    "timestamp",
    "keyword_ids",
];
pub const COMMENT_COLUMNS: [&str; 6] = [
    "comment_id",
    "post_id",
    "parent_comment_id",
    "comment_text",
    "username",
    "timestamp",
];
const SECTION_GAP: usize = 3;
const KEYWORD_SEPARATOR: &str = ", ";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed sheet at record {record}: {message}")]
    Malformed { record: usize, message: String },
}

/// One row of the Posts section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub post_id: String,
    pub subreddit: String,
    pub title: String,
    pub body: String,
    pub author_username: String,
    pub timestamp: DateTime<Utc>,
    pub keyword_ids: Vec<String>,
}

/// One row of the Comments section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    pub comment_id: String,
    pub post_id: String,
    pub parent_comment_id: Option<String>,
    pub comment_text: String,
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

/// Parsed contents of an exported sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub posts: Vec<PostRow>,
    pub comments: Vec<CommentRow>,
}

/// Suggested file name for a week's export.
pub fn download_filename(week_number: u32) -> String {
    format!("content_calendar_week_{week_number}.csv")
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write `calendar` as a sheet to `w`.
pub fn write_sheet<W: Write>(calendar: &Calendar, w: &mut W) -> Result<(), ExportError> {
    csv::write_record(w, &[POSTS_SECTION])?;
    csv::write_record(w, &POST_COLUMNS)?;
    for post in &calendar.posts {
        let keywords = post.keyword_ids.join(KEYWORD_SEPARATOR);
        let timestamp = format_timestamp(&post.instant);
        csv::write_record(
            w,
            &[
                post.post_id.as_str(),
                post.channel.as_str(),
                post.title.as_str(),
                post.body.as_str(),
                post.author.as_str(),
                timestamp.as_str(),
                keywords.as_str(),
            ],
        )?;
    }

    for _ in 0..SECTION_GAP {
        csv::write_record(w, &[""])?;
    }

    csv::write_record(w, &[COMMENTS_SECTION])?;
    csv::write_record(w, &COMMENT_COLUMNS)?;
    for comment in &calendar.comments {
        let timestamp = format_timestamp(&comment.instant);
        csv::write_record(
            w,
            &[
                comment.comment_id.as_str(),
                comment.post_id.as_str(),
                comment.parent_id.as_deref().unwrap_or(""),
                comment.text.as_str(),
                comment.author.as_str(),
                timestamp.as_str(),
            ],
        )?;
    }

    w.flush()?;
    Ok(())
}

/// Render `calendar` as sheet bytes.
pub fn to_bytes(calendar: &Calendar) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_sheet(calendar, &mut buf)?;
    Ok(buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Start,
    PostsHeader,
    Posts,
    CommentsHeader,
    Comments,
}

/// Parse a sheet produced by [`write_sheet`].
pub fn read_sheet(input: &str) -> Result<Sheet, ExportError> {
    let records = csv::parse(input).map_err(|(record, message)| ExportError::Malformed {
        record,
        message,
    })?;

    let mut sheet = Sheet::default();
    let mut section = Section::Start;

    for (idx, record) in records.iter().enumerate() {
        let n = idx + 1;
        let malformed = |message: String| ExportError::Malformed { record: n, message };
        let blank = record.iter().all(String::is_empty);

        match section {
            Section::Start if blank => {}
            Section::Start => {
                if record[0] != POSTS_SECTION {
                    return Err(malformed(format!("expected {POSTS_SECTION:?} section")));
                }
                section = Section::PostsHeader;
            }
            Section::PostsHeader => {
                expect_header(record, &POST_COLUMNS).map_err(malformed)?;
                section = Section::Posts;
            }
            Section::Posts if blank => {}
            Section::Posts if record.len() == 1 && record[0] == COMMENTS_SECTION => {
                section = Section::CommentsHeader;
            }
            Section::Posts => {
                let [post_id, subreddit, title, body, author, ts, keywords] =
                    fields::<7>(record).map_err(malformed)?;
                sheet.posts.push(PostRow {
                    post_id,
                    subreddit,
                    title,
                    body,
                    author_username: author,
                    timestamp: parse_timestamp(&ts).map_err(malformed)?,
                    keyword_ids: split_keywords(&keywords),
                });
            }
            Section::CommentsHeader => {
                expect_header(record, &COMMENT_COLUMNS).map_err(malformed)?;
                section = Section::Comments;
            }
            Section::Comments if blank => {}
            Section::Comments => {
                let [comment_id, post_id, parent, text, username, ts] =
                    fields::<6>(record).map_err(malformed)?;
                sheet.comments.push(CommentRow {
                    comment_id,
                    post_id,
                    parent_comment_id: (!parent.is_empty()).then_some(parent),
                    comment_text: text,
                    username,
                    timestamp: parse_timestamp(&ts).map_err(malformed)?,
                });
            }
        }
    }

    match section {
        Section::Posts | Section::Comments => Ok(sheet),
        _ => Err(ExportError::Malformed {
            record: records.len(),
            message: "sheet ended before a complete section".into(),
        }),
    }
}

fn expect_header(record: &[String], columns: &[&str]) -> Result<(), String> {
    if record.iter().map(String::as_str).eq(columns.iter().copied()) {
        Ok(())
    } else {
        Err(format!("expected header {}", columns.join(",")))
    }
}

fn fields<const N: usize>(record: &[String]) -> Result<[String; N], String> {
    <[String; N]>::try_from(record.to_vec())
        .map_err(|r| format!("expected {N} fields, found {}", r.len()))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp {s:?}: {e}"))
}

fn split_keywords(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{
        Comment, CommentRole, Post, QualityBreakdown, Severity, SpamReport, Strategy,
        StructureReport,
    };

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, hour, 15, 0).unwrap()
    }

    fn comment(id: &str, parent: Option<&str>, text: &str) -> Comment {
        Comment {
            comment_id: id.into(),
            text: text.into(),
            author: "sam".into(),
            parent_id: parent.map(str::to_string),
            post_id: "P1".into(),
            instant: at(12),
            role: CommentRole::Discovery,
            quality_score: 8.0,
            quality_breakdown: QualityBreakdown::default(),
            warning: None,
        }
    }

    fn calendar() -> Calendar {
        Calendar {
            session_id: "week1-1".into(),
            week_number: 1,
            company: "Acme".into(),
            posts: vec![Post {
                post_id: "P1".into(),
                title: "Decks, \"fast\"?".into(),
                body: "line one\nline two, with comma".into(),
                channel: "r/startups".into(),
                author: "riley".into(),
                author_info: String::new(),
                instant: at(9),
                keyword_ids: vec!["K1".into(), "K4".into()],
                strategy: Strategy::GenuineQuestion,
                quality_score: 8.0,
                quality_breakdown: QualityBreakdown::default(),
                warning: None,
            }],
            comments: vec![
                comment("P1-C1", None, "try it"),
                comment("P1-C2", None, "+1"),
                comment("P1-C3", Some("P1-C1"), "thanks!"),
            ],
            total_posts: 1,
            total_comments: 3,
            average_quality: 8.0,
            spam_report: SpamReport {
                has_issues: false,
                issues: vec![],
                severity: Severity::Low,
            },
            structure_report: StructureReport::default(),
            generated_at: at(8),
        }
    }

    #[test]
    fn sheet_layout_has_sections_and_gap() {
        let text = String::from_utf8(to_bytes(&calendar()).unwrap()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(lines[0], "Posts");
        assert_eq!(lines[1], POST_COLUMNS.join(","));
        // the post row spans two physical lines because of the embedded newline
        assert!(text.contains("\r\n\r\n\r\n\r\nComments\r\n"));
        assert!(text.contains("\"Decks, \"\"fast\"\"?\""));
        assert!(text.contains("2025-03-03T09:15:00.000Z"));
        assert!(text.contains("\"K1, K4\""));
    }

    #[test]
    fn reader_recovers_rows_and_parent_links() {
        let bytes = to_bytes(&calendar()).unwrap();
        let sheet = read_sheet(std::str::from_utf8(&bytes).unwrap()).unwrap();

        assert_eq!(sheet.posts.len(), 1);
        let post = &sheet.posts[0];
        assert_eq!(post.title, "Decks, \"fast\"?");
        assert_eq!(post.body, "line one\nline two, with comma");
        assert_eq!(post.keyword_ids, vec!["K1", "K4"]);
        assert_eq!(post.timestamp, at(9));

        assert_eq!(sheet.comments.len(), 3);
        assert_eq!(sheet.comments[0].parent_comment_id, None);
        assert_eq!(sheet.comments[1].parent_comment_id, None);
        assert_eq!(sheet.comments[2].parent_comment_id.as_deref(), Some("P1-C1"));
    }

    #[test]
    fn wrong_header_is_rejected() {
        let err = read_sheet("Posts\r\nid,title\r\n").unwrap_err();
        assert!(matches!(err, ExportError::Malformed { record: 2, .. }));
    }

    #[test]
    fn truncated_sheet_is_rejected() {
        assert!(read_sheet("Posts\r\n").is_err());
        assert!(read_sheet("").is_err());
    }

    #[test]
    fn filename_carries_week() {
        assert_eq!(download_filename(3), "content_calendar_week_3.csv");
    }
}
