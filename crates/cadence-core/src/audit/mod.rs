//! Post-hoc pattern audit over a finished batch.
//!
//! Purely observational: findings are reported on the calendar and logged,
//! nothing is regenerated or rejected.

use std::collections::{BTreeMap, HashSet};

use chrono::TimeDelta;

use crate::models::{Comment, IssueKind, Post, Severity, SpamIssue, SpamReport};
use crate::quality::round1;

/// Audit thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditRules {
    /// Flag an author with more than this share (percent) of posts.
    pub max_persona_share: f64,
    /// Flag consecutive posts closer than this many hours.
    pub min_gap_hours: i64,
    /// Title tokens must be longer than this to count.
    pub min_token_len: usize,
    /// Flag a pair of titles sharing more than this many tokens.
    pub max_common_tokens: usize,
}

impl Default for AuditRules {
    fn default() -> Self {
        Self {
            max_persona_share: 40.0,
            min_gap_hours: 8,
            min_token_len: 4,
            max_common_tokens: 3,
        }
    }
}

/// Run every check with the default rules.
pub fn detect_spam_patterns(posts: &[Post], comments: &[Comment]) -> SpamReport {
    audit(posts, comments, &AuditRules::default())
}

/// Run every check. Comments are accepted for symmetry with the calendar
/// and are not currently inspected.
pub fn audit(posts: &[Post], _comments: &[Comment], rules: &AuditRules) -> SpamReport {
    let mut issues: Vec<SpamIssue> = Vec::new();

    issues.extend(persona_overuse(posts, rules).into_iter().map(SpamIssue::from));
    issues.extend(time_clustering(posts, rules).into_iter().map(SpamIssue::from));
    issues.extend(repetitive_language(posts, rules).into_iter().map(SpamIssue::from));

    for issue in &issues {
        tracing::warn!(severity = %issue.severity, issue = ?issue.kind, "pattern audit finding");
    }

    let severity = issues
        .iter()
        .map(|i| i.severity)
        .max()
        .unwrap_or(Severity::Low);

    SpamReport {
        has_issues: !issues.is_empty(),
        issues,
        severity,
    }
}

fn persona_overuse(posts: &[Post], rules: &AuditRules) -> Vec<IssueKind> {
    if posts.is_empty() {
        return Vec::new();
    }

    // BTreeMap keeps findings in a stable order.
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for post in posts {
        *counts.entry(post.author.as_str()).or_insert(0) += 1;
    }

    let total = posts.len() as f64;
    counts
        .into_iter()
        .filter_map(|(persona, count)| {
            let percentage = count as f64 / total * 100.0;
            (percentage > rules.max_persona_share).then(|| IssueKind::PersonaOveruse {
                persona: persona.to_string(),
                percentage: round1(percentage),
            })
        })
        .collect()
}

/// Consecutive pairs are taken after sorting by instant, and the reported
/// ids are those of the sorted posts.
fn time_clustering(posts: &[Post], rules: &AuditRules) -> Vec<IssueKind> {
    let mut sorted: Vec<&Post> = posts.iter().collect();
    sorted.sort_by_key(|p| p.instant);

    let min_gap = TimeDelta::hours(rules.min_gap_hours);
    sorted
        .windows(2)
        .filter_map(|w| {
            let gap = w[1].instant - w[0].instant;
            (gap < min_gap).then(|| IssueKind::TimeClustering {
                post1: w[0].post_id.clone(),
                post2: w[1].post_id.clone(),
                hours_diff: round1(gap.num_seconds() as f64 / 3600.0),
            })
        })
        .collect()
}

/// Counts tokens of the earlier title (duplicates included) that appear
/// anywhere in the later one.
fn repetitive_language(posts: &[Post], rules: &AuditRules) -> Vec<IssueKind> {
    let tokens: Vec<Vec<String>> = posts
        .iter()
        .map(|p| {
            p.title
                .to_lowercase()
                .split_whitespace()
                .filter(|w| w.chars().count() > rules.min_token_len)
                .map(str::to_string)
                .collect()
        })
        .collect();

    let mut out = Vec::new();
    for i in 0..posts.len() {
        for j in (i + 1)..posts.len() {
            let other: HashSet<&str> = tokens[j].iter().map(String::as_str).collect();
            let common = tokens[i].iter().filter(|w| other.contains(w.as_str())).count();
            if common > rules.max_common_tokens {
                out.push(IssueKind::RepetitiveLanguage {
                    post1: posts[i].post_id.clone(),
                    post2: posts[j].post_id.clone(),
                    common_words: common,
                });
            }
        }
    }
    out
}
