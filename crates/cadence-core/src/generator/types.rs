//! Values exchanged with text generators.

use serde::{Deserialize, Serialize};

use crate::gate::Scorable;
use crate::quality::ScoreTarget;

/// Raw text of a generated post, before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub title: String,
    pub body: String,
}

/// Raw text of a generated comment, before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedComment {
    pub text: String,
}

impl Scorable for GeneratedPost {
    fn score_target(&self) -> ScoreTarget<'_> {
        ScoreTarget::Post {
            title: &self.title,
            body: &self.body,
        }
    }
}

impl Scorable for GeneratedComment {
    fn score_target(&self) -> ScoreTarget<'_> {
        ScoreTarget::Comment { text: &self.text }
    }
}
