//! Offline generator that fills fixed templates from the plan.
//!
//! Output depends only on its inputs, so runs are reproducible without
//! network access.

use async_trait::async_trait;

use super::trait_def::TextGenerator;
use super::types::{GeneratedComment, GeneratedPost};
use crate::error::GenerationError;
use crate::models::{CommentPlan, CommentRole, Company, Post, PostPlan, Strategy};

#[derive(Debug, Clone, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn title_for(strategy: Strategy, topic: &str) -> String {
    match strategy {
        Strategy::GenuineQuestion => format!("Honest question about {topic}?"),
        Strategy::ComparisonSeeking => format!("{topic} vs the usual options, what do you use?"),
        Strategy::RecommendationRequest => format!("Looking for recommendations: {topic}"),
        Strategy::ProblemSolving => format!("Stuck on {topic}, how do you handle it?"),
        Strategy::ExperienceSharing => format!("What 3 months of {topic} taught me"),
    }
}

#[async_trait]
impl TextGenerator for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate_post(
        &self,
        plan: &PostPlan,
        company: &Company,
    ) -> Result<GeneratedPost, GenerationError> {
        let topics: Vec<&str> = plan.keywords.iter().map(|k| k.keyword.as_str()).collect();
        let topic = topics.first().copied().unwrap_or("this");

        let body = format!(
            "I've been dealing with {all} for a while now and my team keeps going back and forth. \
             We tried a couple of things, {name} included, and I'm curious what works for people \
             in {channel}. Anything I'm missing?",
            all = topics.join(", "),
            name = company.name,
            channel = plan.channel,
        );

        Ok(GeneratedPost {
            title: title_for(plan.strategy, topic),
            body,
        })
    }

    async fn generate_comment(
        &self,
        plan: &CommentPlan,
        _post: &Post,
        company: &Company,
    ) -> Result<GeneratedComment, GenerationError> {
        let text = match plan.role {
            CommentRole::Discovery => format!(
                "honestly had the same problem, {} helped me here. not perfect but it saves me about 2 hours a week",
                company.name
            ),
            CommentRole::Validation => "+1, tbh it worked for my team too".to_string(),
            CommentRole::OpResponse => "thanks, going to give it a try this week".to_string(),
        };
        Ok(GeneratedComment { text })
    }
}
