//! Shared test utilities for cadence integration tests.
//!
//! Provides input fixtures and deterministic [`TextGenerator`] doubles:
//! - [`ScriptedGenerator`] replays canned texts and counts calls.
//! - [`FailingGenerator`] always fails, to exercise the abort path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadence_core::generator::{GeneratedComment, GeneratedPost, TextGenerator};
use cadence_core::models::{CommentPlan, Company, Keyword, Persona, Post, PostPlan};
use cadence_core::{CalendarInput, CalendarRequest, GenerationError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const COMPANY_NAME: &str = "SlideForge";

pub fn company(posts_per_week: usize) -> Company {
    Company {
        name: COMPANY_NAME.to_string(),
        description: "AI presentation builder for small teams".to_string(),
        subreddits: vec![
            "r/startups".to_string(),
            "r/productivity".to_string(),
            "r/design".to_string(),
        ],
        posts_per_week,
    }
}

pub fn personas() -> Vec<Persona> {
    [
        ("riley_ops", "Operations lead at a 20-person startup"),
        ("jordan_designs", "Freelance brand designer"),
        ("emily_pm", "Product manager, writes a lot of decks"),
        ("alex_sales", "Account executive, pitches weekly"),
        ("priya_founder", "First-time founder raising a seed round"),
    ]
    .into_iter()
    .map(|(username, info)| Persona {
        username: username.to_string(),
        info: info.to_string(),
    })
    .collect()
}

pub fn keywords() -> Vec<Keyword> {
    [
        "best ai presentation maker",
        "pitch deck generator",
        "alternatives to powerpoint",
        "how to make slides faster",
        "canva vs slideforge",
        "ai slide deck tool",
        "presentation design tips",
        "tool for client presentations",
    ]
    .into_iter()
    .enumerate()
    .map(|(i, keyword)| Keyword {
        keyword_id: format!("K{}", i + 1),
        keyword: keyword.to_string(),
    })
    .collect()
}

pub fn input(posts_per_week: usize, week_number: u32) -> CalendarInput {
    CalendarInput {
        company: Some(company(posts_per_week)),
        personas: Some(personas()),
        keywords: Some(keywords()),
        week_number: Some(week_number),
        start_date: None,
    }
}

pub fn request(posts_per_week: usize) -> CalendarRequest {
    input(posts_per_week, 1)
        .validate()
        .expect("fixture input is valid")
}

/// A post text the default heuristic scorer rates at or above 7.5.
pub fn good_post() -> GeneratedPost {
    GeneratedPost {
        title: "Anyone found a decent way to build pitch decks?".to_string(),
        body: "I've been rebuilding our deck for 3 weeks and my cofounder keeps asking for changes. \
               A friend mentioned SlideForge, has anyone tried it?"
            .to_string(),
    }
}

/// A post text the default heuristic scorer rates below 6.0.
pub fn spam_post() -> GeneratedPost {
    GeneratedPost {
        title: "Revolutionary game-changing cutting-edge tool!!!".to_string(),
        body: "Furthermore, this innovative solution will leverage synergy. Absolutely a must-have!"
            .to_string(),
    }
}

/// A comment text the default heuristic scorer rates below 6.0.
pub fn spam_comment() -> GeneratedComment {
    GeneratedComment {
        text: "This revolutionary, game-changing, cutting-edge synergy is a paradigm shift!!! Absolutely a must-have!"
            .to_string(),
    }
}

pub fn good_comment() -> GeneratedComment {
    GeneratedComment {
        text: "honestly SlideForge saved me a couple hours last week, not perfect but solid"
            .to_string(),
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Replays queued responses in order. When a queue runs dry its fallback
/// response is returned for every further call.
pub struct ScriptedGenerator {
    posts: Mutex<VecDeque<Result<GeneratedPost, GenerationError>>>,
    comments: Mutex<VecDeque<Result<GeneratedComment, GenerationError>>>,
    fallback_post: GeneratedPost,
    fallback_comment: GeneratedComment,
    post_calls: AtomicUsize,
    comment_calls: AtomicUsize,
}

impl ScriptedGenerator {
    /// Always answers with [`good_post`] and [`good_comment`].
    pub fn new() -> Self {
        Self {
            posts: Mutex::new(VecDeque::new()),
            comments: Mutex::new(VecDeque::new()),
            fallback_post: good_post(),
            fallback_comment: good_comment(),
            post_calls: AtomicUsize::new(0),
            comment_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fallback_post(mut self, post: GeneratedPost) -> Self {
        self.fallback_post = post;
        self
    }

    /// Queue post responses ahead of the fallback.
    pub fn with_posts(self, posts: impl IntoIterator<Item = GeneratedPost>) -> Self {
        self.posts.try_lock().expect("not shared yet").extend(posts.into_iter().map(Ok));
        self
    }

    /// Queue a failure for the next post call.
    pub fn with_post_error(self, err: GenerationError) -> Self {
        self.posts.try_lock().expect("not shared yet").push_back(Err(err));
        self
    }

    pub fn with_comments(self, comments: impl IntoIterator<Item = GeneratedComment>) -> Self {
        self.comments
            .try_lock()
            .expect("not shared yet")
            .extend(comments.into_iter().map(Ok));
        self
    }

    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    pub fn comment_calls(&self) -> usize {
        self.comment_calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_post(
        &self,
        _plan: &PostPlan,
        _company: &Company,
    ) -> Result<GeneratedPost, GenerationError> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        match self.posts.lock().await.pop_front() {
            Some(next) => next,
            None => Ok(self.fallback_post.clone()),
        }
    }

    async fn generate_comment(
        &self,
        _plan: &CommentPlan,
        _post: &Post,
        _company: &Company,
    ) -> Result<GeneratedComment, GenerationError> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        match self.comments.lock().await.pop_front() {
            Some(next) => next,
            None => Ok(self.fallback_comment.clone()),
        }
    }
}

/// Fails every call as a generator whose retries ran out.
#[derive(Debug, Default)]
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate_post(
        &self,
        plan: &PostPlan,
        _company: &Company,
    ) -> Result<GeneratedPost, GenerationError> {
        Err(GenerationError::Exhausted {
            attempts: 3,
            message: format!("HTTP 503 while generating {}", plan.post_id),
        })
    }

    async fn generate_comment(
        &self,
        plan: &CommentPlan,
        _post: &Post,
        _company: &Company,
    ) -> Result<GeneratedComment, GenerationError> {
        Err(GenerationError::Exhausted {
            attempts: 3,
            message: format!("HTTP 503 while generating {}", plan.comment_id),
        })
    }
}
