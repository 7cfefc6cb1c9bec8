//! The `TextGenerator` trait: the adapter interface for text backends.
//!
//! Each backend (a hosted model, the offline template writer, test
//! doubles) implements this trait. It is object-safe so generators can be
//! stored as `Box<dyn TextGenerator>` in the [`super::GeneratorRegistry`]
//! and shared as `Arc<dyn TextGenerator>` by the HTTP server.

use async_trait::async_trait;

use super::types::{GeneratedComment, GeneratedPost};
use crate::error::GenerationError;
use crate::models::{CommentPlan, Company, Post, PostPlan};

/// Produces post and comment text from resolved plans.
///
/// Implementations that talk to a remote service retry transient failures
/// themselves; an `Err` returned here is final for the current run.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Registry name (e.g. "gemini", "template").
    fn name(&self) -> &str;

    /// Write the title and body for one post.
    async fn generate_post(
        &self,
        plan: &PostPlan,
        company: &Company,
    ) -> Result<GeneratedPost, GenerationError>;

    /// Write one comment replying within `post`'s thread.
    async fn generate_comment(
        &self,
        plan: &CommentPlan,
        post: &Post,
        company: &Company,
    ) -> Result<GeneratedComment, GenerationError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn TextGenerator) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Strategy;
    use chrono::Utc;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate_post(
            &self,
            plan: &PostPlan,
            _company: &Company,
        ) -> Result<GeneratedPost, GenerationError> {
            Ok(GeneratedPost {
                title: plan.post_id.clone(),
                body: plan.persona.clone(),
            })
        }

        async fn generate_comment(
            &self,
            plan: &CommentPlan,
            _post: &Post,
            _company: &Company,
        ) -> Result<GeneratedComment, GenerationError> {
            Ok(GeneratedComment {
                text: plan.comment_id.clone(),
            })
        }
    }

    #[tokio::test]
    async fn generator_is_usable_as_trait_object() {
        let generator: Box<dyn TextGenerator> = Box::new(EchoGenerator);
        assert_eq!(generator.name(), "echo");

        let plan = PostPlan {
            post_id: "P1".into(),
            channel: "r/a".into(),
            instant: Utc::now(),
            persona: "alice".into(),
            persona_info: String::new(),
            keywords: vec![],
            strategy: Strategy::GenuineQuestion,
        };
        let company = Company {
            name: "Acme".into(),
            description: String::new(),
            subreddits: vec!["r/a".into()],
            posts_per_week: 1,
        };
        let post = generator.generate_post(&plan, &company).await.unwrap();
        assert_eq!(post.title, "P1");
        assert_eq!(post.body, "alice");
    }
}
