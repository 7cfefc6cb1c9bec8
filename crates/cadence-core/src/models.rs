use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A posting destination, such as a subreddit.
pub type Channel = String;

/// The company whose content calendar is being planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Product/company name. Also the term counted by strategic scoring.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ordered channel list used for round-robin distribution.
    pub subreddits: Vec<Channel>,
    pub posts_per_week: usize,
}

/// A synthetic author identity. Identified by `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub username: String,
    #[serde(default)]
    pub info: String,
}

/// A target keyword. Identified by `keyword_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword_id: String,
    pub keyword: String,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Rhetorical approach of a post, derived from its keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    GenuineQuestion,
    ComparisonSeeking,
    RecommendationRequest,
    ProblemSolving,
    ExperienceSharing,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GenuineQuestion => "genuine_question",
            Self::ComparisonSeeking => "comparison_seeking",
            Self::RecommendationRequest => "recommendation_request",
            Self::ProblemSolving => "problem_solving",
            Self::ExperienceSharing => "experience_sharing",
        };
        f.write_str(s)
    }
}

impl FromStr for Strategy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genuine_question" => Ok(Self::GenuineQuestion),
            "comparison_seeking" => Ok(Self::ComparisonSeeking),
            "recommendation_request" => Ok(Self::RecommendationRequest),
            "problem_solving" => Ok(Self::ProblemSolving),
            "experience_sharing" => Ok(Self::ExperienceSharing),
            other => Err(ParseEnumError::new("strategy", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Position of a comment within its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentRole {
    /// Top-level comment that brings up the product.
    Discovery,
    /// Top-level comment backing up the discovery comment.
    Validation,
    /// The post author replying to the discovery comment.
    OpResponse,
}

impl fmt::Display for CommentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Discovery => "discovery",
            Self::Validation => "validation",
            Self::OpResponse => "op_response",
        };
        f.write_str(s)
    }
}

impl FromStr for CommentRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(Self::Discovery),
            "validation" => Ok(Self::Validation),
            "op_response" => Ok(Self::OpResponse),
            other => Err(ParseEnumError::new("comment role", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Severity of an audit finding. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParseEnumError::new("severity", other)),
        }
    }
}

/// Error returned when parsing an unknown enum string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

// ---------------------------------------------------------------------------
// Phase 1: structure
// ---------------------------------------------------------------------------

/// A post slot produced by the distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionSlot {
    /// 1-based position in the week.
    pub post_number: usize,
    pub post_id: String,
    pub channel: Channel,
}

/// A slot with its scheduled instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledSlot {
    pub post_id: String,
    pub instant: DateTime<Utc>,
    pub channel: Channel,
}

/// Everything the text generator needs to write one post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPlan {
    pub post_id: String,
    pub channel: Channel,
    pub instant: DateTime<Utc>,
    pub persona: String,
    pub persona_info: String,
    pub keywords: Vec<Keyword>,
    pub strategy: Strategy,
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// Per-dimension quality sub-scores, each in `[0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityBreakdown {
    pub naturalness: f64,
    pub authenticity: f64,
    pub engagement: f64,
    pub strategic: f64,
}

/// Weighted overall score plus its breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityScore {
    pub overall: f64,
    pub breakdown: QualityBreakdown,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// A generated post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub title: String,
    pub body: String,
    pub channel: Channel,
    pub author: String,
    pub author_info: String,
    pub instant: DateTime<Utc>,
    pub keyword_ids: Vec<String>,
    pub strategy: Strategy,
    pub quality_score: f64,
    pub quality_breakdown: QualityBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// One planned comment within a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentPlan {
    pub comment_id: String,
    pub author: String,
    pub author_info: String,
    pub parent_id: Option<String>,
    pub role: CommentRole,
    /// 1-based position within the thread.
    pub order: u8,
}

/// The fixed three-comment reply structure attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    pub post_id: String,
    pub comments: Vec<CommentPlan>,
}

impl Thread {
    /// Find the planned comment with the given role.
    pub fn comment(&self, role: CommentRole) -> Option<&CommentPlan> {
        self.comments.iter().find(|c| c.role == role)
    }
}

/// A generated comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub text: String,
    pub author: String,
    pub parent_id: Option<String>,
    pub post_id: String,
    pub instant: DateTime<Utc>,
    pub role: CommentRole,
    pub quality_score: f64,
    pub quality_breakdown: QualityBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// What an audit finding is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    PersonaOveruse {
        persona: String,
        percentage: f64,
    },
    TimeClustering {
        post1: String,
        post2: String,
        hours_diff: f64,
    },
    RepetitiveLanguage {
        post1: String,
        post2: String,
        common_words: usize,
    },
}

impl IssueKind {
    /// The fixed severity attached to each kind of finding.
    pub fn severity(&self) -> Severity {
        match self {
            Self::PersonaOveruse { .. } => Severity::High,
            Self::TimeClustering { .. } => Severity::Medium,
            Self::RepetitiveLanguage { .. } => Severity::Low,
        }
    }
}

/// A single audit finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamIssue {
    #[serde(flatten)]
    pub kind: IssueKind,
    pub severity: Severity,
}

impl From<IssueKind> for SpamIssue {
    fn from(kind: IssueKind) -> Self {
        let severity = kind.severity();
        Self { kind, severity }
    }
}

/// Result of auditing a finished batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamReport {
    pub has_issues: bool,
    pub issues: Vec<SpamIssue>,
    pub severity: Severity,
}

/// Advisory results of the structural validators. Never enforced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructureReport {
    /// No channel holds more than half the posts.
    pub distribution_balanced: bool,
    /// Every consecutive pair of posts is at least the global gap apart.
    pub global_gap_ok: bool,
    /// Every consecutive pair within a channel is at least the channel gap apart.
    pub channel_gap_ok: bool,
    /// The persona assigner had to fall back to the least-used persona.
    pub persona_fallback_used: bool,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The output of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub session_id: String,
    pub week_number: u32,
    pub company: String,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub total_posts: usize,
    pub total_comments: usize,
    pub average_quality: f64,
    pub spam_report: SpamReport,
    pub structure_report: StructureReport,
    pub generated_at: DateTime<Utc>,
}
