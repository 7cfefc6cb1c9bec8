//! Prompt construction and response parsing for model-backed generators.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{GeneratedComment, GeneratedPost};
use crate::models::{CommentPlan, CommentRole, Company, Post, PostPlan};

/// Title used when a model response carries no `TITLE:` line.
pub const FALLBACK_TITLE: &str = "Untitled Post";

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)TITLE:\s*(.+?)(?:\n|BODY:)").expect("valid regex"));
static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)BODY:\s*(.+)").expect("valid regex"));
static COMMENT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(COMMENT:|TEXT:)\s*").expect("valid regex"));

pub fn post_prompt(plan: &PostPlan, company: &Company) -> String {
    let keywords = plan
        .keywords
        .iter()
        .map(|k| k.keyword.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let name = &company.name;

    format!(
        "You are {persona}, posting in {channel}.

PERSONA INFO:
{info}

COMPANY TO MENTION (naturally):
{name}: {description}

TARGET KEYWORDS (integrate naturally): {keywords}

POST STRATEGY: {strategy}

CRITICAL RULES:
- Write like a REAL Reddit user, not an AI
- Use casual language, contractions, occasional typos are OK
- NO marketing buzzwords (revolutionary, game-changing, etc.)
- Be specific and personal
- Ask genuine questions
- Mention {name} naturally if relevant, but don't force it
- Sound human and authentic

Generate a Reddit post with:

TITLE: (question or statement, 50-100 chars)
BODY: (2-4 paragraphs, personal experience, specific details, natural voice)

Format as:
TITLE: [your title]
BODY: [your body text]",
        persona = plan.persona,
        channel = plan.channel,
        info = plan.persona_info,
        description = company.description,
        strategy = plan.strategy,
    )
}

pub fn comment_prompt(plan: &CommentPlan, post: &Post, company: &Company) -> String {
    let mut prompt = format!(
        "You are {author}, commenting in {channel}.

PERSONA INFO:
{info}

POST YOU'RE RESPONDING TO:
Title: {title}
Body: {body}

YOUR ROLE: {role}

",
        author = plan.author,
        channel = post.channel,
        info = plan.author_info,
        title = post.title,
        body = post.body,
        role = plan.role,
    );

    let name = &company.name;
    let guidance = match plan.role {
        CommentRole::Discovery => format!(
            "Write a discovery comment that:
- Naturally mentions {name} as a solution
- Shares your personal experience with it
- Is helpful and genuine, not promotional
- 2-3 sentences, casual tone
- Maybe includes a caveat (\"not perfect but...\")
"
        ),
        CommentRole::Validation => "Write a validation comment that:
- Supports the previous comment's suggestion
- Adds your own brief experience
- Keeps it short (1-2 sentences)
- Uses Reddit casual language (+1, honestly, tbh, etc.)
"
        .to_string(),
        CommentRole::OpResponse => "Write an OP response that:
- Thanks for the recommendation
- Shows genuine interest
- Very brief (1 sentence)
- Natural enthusiasm without over-selling
"
        .to_string(),
    };
    prompt.push_str(&guidance);

    prompt.push_str(
        "\nCRITICAL: Sound like a real person, not an AI or marketer.\n\nGenerate just the comment text (no labels):",
    );
    prompt
}

/// Split a model response into title and body.
///
/// Missing `TITLE:` yields [`FALLBACK_TITLE`]; missing `BODY:` makes the
/// whole trimmed response the body.
pub fn parse_post(text: &str) -> GeneratedPost {
    let title = TITLE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let body = BODY
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| text.trim().to_string());

    GeneratedPost { title, body }
}

/// Trim a comment response and drop a leading `COMMENT:` or `TEXT:` label.
pub fn parse_comment(text: &str) -> GeneratedComment {
    let trimmed = text.trim();
    GeneratedComment {
        text: COMMENT_LABEL.replace(trimmed, "").into_owned(),
    }
}
