//! Calendar orchestrator: runs the four phases of a week strictly in order.
//!
//! 1. Structure: distribution, timing, keyword/strategy/persona assignment.
//! 2. Posts: one gated generation per plan, in post-number order.
//! 3. Comments: thread, timing, and gated generation (C1, C2, C3) per post.
//! 4. Audit: pattern report and average quality.
//!
//! Generation is sequential; the only suspension points are generator
//! calls. A generator failure aborts the run with no partial calendar.

pub mod plan;
pub mod request;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::assign::AssignmentState;
use crate::audit::detect_spam_patterns;
use crate::config::EngineConfig;
use crate::error::CalendarError;
use crate::gate::{GatePolicy, QualityGate};
use crate::generator::TextGenerator;
use crate::models::{Calendar, Comment, Post};
use crate::quality::{HeuristicScorer, QualityScorer, round1};
use crate::thread::{CommentDelays, build_thread, schedule_comments};

pub use plan::{WeekPlan, plan_week};
pub use request::{CalendarInput, CalendarRequest};

/// Drives one or more calendar runs against a text generator.
pub struct Orchestrator<'a> {
    generator: &'a dyn TextGenerator,
    scorer: Option<&'a dyn QualityScorer>,
    config: EngineConfig,
    delays: CommentDelays,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator with default tunables. Without [`Self::with_scorer`],
    /// each run scores with a [`HeuristicScorer`] for the company's name.
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self {
            generator,
            scorer: None,
            config: EngineConfig::default(),
            delays: CommentDelays::default(),
        }
    }

    pub fn with_scorer(mut self, scorer: &'a dyn QualityScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_delays(mut self, delays: CommentDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Generate one week's calendar.
    pub async fn run<R: Rng + Send + ?Sized>(
        &self,
        request: &CalendarRequest,
        rng: &mut R,
    ) -> Result<Calendar, CalendarError> {
        let company = &request.company;
        let heuristic;
        let scorer: &dyn QualityScorer = match self.scorer {
            Some(s) => s,
            None => {
                heuristic = HeuristicScorer::new(&company.name);
                &heuristic
            }
        };
        let gate = QualityGate::new(scorer, GatePolicy::from(&self.config));
        let generator = self.generator;

        let start = request.start_date_from(Utc::now().date_naive());
        tracing::info!(
            week = request.week_number,
            company = %company.name,
            posts = company.posts_per_week,
            personas = request.personas.len(),
            keywords = request.keywords.len(),
            %start,
            generator = generator.name(),
            "starting calendar generation"
        );

        // Phase 1
        let mut state = AssignmentState::default();
        let week = plan_week(request, start, &self.config, &mut state, rng);

        // Phase 2
        let mut posts: Vec<Post> = Vec::with_capacity(week.posts.len());
        for (i, plan) in week.posts.iter().enumerate() {
            tracing::info!(post_id = %plan.post_id, n = i + 1, of = week.posts.len(), "generating post");
            let outcome = gate
                .run(&plan.post_id, move |_| generator.generate_post(plan, company))
                .await
                .map_err(|source| CalendarError::Generation {
                    artifact: format!("post {}", plan.post_id),
                    source,
                })?;
            let (best, warning) = outcome.into_parts();

            posts.push(Post {
                post_id: plan.post_id.clone(),
                title: best.content.title,
                body: best.content.body,
                channel: plan.channel.clone(),
                author: plan.persona.clone(),
                author_info: plan.persona_info.clone(),
                instant: plan.instant,
                keyword_ids: plan.keywords.iter().map(|k| k.keyword_id.clone()).collect(),
                strategy: plan.strategy,
                quality_score: best.score.overall,
                quality_breakdown: best.score.breakdown,
                warning,
            });
        }
        tracing::info!(posts = posts.len(), "post phase complete");

        // Phase 3
        let mut comments: Vec<Comment> = Vec::new();
        for post in &posts {
            let Some(thread) = build_thread(post, &request.personas, rng) else {
                tracing::warn!(post_id = %post.post_id, "not enough personas for a thread, skipping comments");
                continue;
            };
            let times = schedule_comments(&thread, post.instant, &self.delays, rng);

            for (cplan, (_, instant)) in thread.comments.iter().zip(times) {
                tracing::debug!(comment_id = %cplan.comment_id, role = %cplan.role, "generating comment");
                let outcome = gate
                    .run(&cplan.comment_id, move |_| {
                        generator.generate_comment(cplan, post, company)
                    })
                    .await
                    .map_err(|source| CalendarError::Generation {
                        artifact: format!("comment {}", cplan.comment_id),
                        source,
                    })?;
                let (best, warning) = outcome.into_parts();

                comments.push(Comment {
                    comment_id: cplan.comment_id.clone(),
                    text: best.content.text,
                    author: cplan.author.clone(),
                    parent_id: cplan.parent_id.clone(),
                    post_id: post.post_id.clone(),
                    instant,
                    role: cplan.role,
                    quality_score: best.score.overall,
                    quality_breakdown: best.score.breakdown,
                    warning,
                });
            }
        }
        tracing::info!(comments = comments.len(), "comment phase complete");

        // Phase 4
        let spam_report = detect_spam_patterns(&posts, &comments);
        let average_quality = average_quality(&posts);
        tracing::info!(
            average_quality,
            has_issues = spam_report.has_issues,
            severity = %spam_report.severity,
            "quality control complete"
        );

        let generated_at = Utc::now();
        Ok(Calendar {
            session_id: format!("week{}-{}", request.week_number, Uuid::new_v4().simple()),
            week_number: request.week_number,
            company: company.name.clone(),
            total_posts: posts.len(),
            total_comments: comments.len(),
            posts,
            comments,
            average_quality,
            spam_report,
            structure_report: week.structure,
            generated_at,
        })
    }
}

/// Generate one week's calendar with default tunables.
pub async fn generate_calendar<R: Rng + Send + ?Sized>(
    request: &CalendarRequest,
    generator: &dyn TextGenerator,
    rng: &mut R,
) -> Result<Calendar, CalendarError> {
    Orchestrator::new(generator).run(request, rng).await
}

/// Mean post score rounded to one decimal; zero for an empty batch.
pub fn average_quality(posts: &[Post]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let sum: f64 = posts.iter().map(|p| p.quality_score).sum();
    round1(sum / posts.len() as f64)
}
