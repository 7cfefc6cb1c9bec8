//! Comment threads: who replies to a post, and when.

pub mod timing;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::models::{CommentPlan, CommentRole, Persona, Post, Thread};

pub use timing::{CommentDelays, schedule_comments};

/// Build the three-comment thread for a finished post.
///
/// Two distinct personas other than the author are drawn at random as the
/// discovery and validation commenters; the author answers the discovery
/// comment. Returns `None` when fewer than two other personas exist.
pub fn build_thread<R: Rng + ?Sized>(
    post: &Post,
    personas: &[Persona],
    rng: &mut R,
) -> Option<Thread> {
    let others: Vec<&Persona> = personas
        .iter()
        .filter(|p| p.username != post.author)
        .collect();

    if others.len() < 2 {
        return None;
    }

    let picked: Vec<&&Persona> = others.choose_multiple(rng, 2).collect();
    let (first, second) = (*picked[0], *picked[1]);

    let discovery_id = format!("{}-C1", post.post_id);

    let comments = vec![
        CommentPlan {
            comment_id: discovery_id.clone(),
            author: first.username.clone(),
            author_info: first.info.clone(),
            parent_id: None,
            role: CommentRole::Discovery,
            order: 1,
        },
        CommentPlan {
            comment_id: format!("{}-C2", post.post_id),
            author: second.username.clone(),
            author_info: second.info.clone(),
            parent_id: None,
            role: CommentRole::Validation,
            order: 2,
        },
        CommentPlan {
            comment_id: format!("{}-C3", post.post_id),
            author: post.author.clone(),
            author_info: post.author_info.clone(),
            parent_id: Some(discovery_id),
            role: CommentRole::OpResponse,
            order: 3,
        },
    ];

    Some(Thread {
        post_id: post.post_id.clone(),
        comments,
    })
}
