//! Comment timestamps relative to their post and parent.

use std::ops::Range;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::models::{CommentRole, Thread};

/// Delay windows, in hours, for each comment role.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDelays {
    /// Discovery comment, after the post.
    pub discovery: Range<f64>,
    /// Validation comment, after the post (independent of discovery).
    pub validation: Range<f64>,
    /// OP response, after the discovery comment.
    pub op_response: Range<f64>,
    /// OP response after the post when the thread has no discovery comment.
    pub op_response_fallback: f64,
}

impl Default for CommentDelays {
    fn default() -> Self {
        Self {
            discovery: 2.0..6.0,
            validation: 4.0..8.0,
            op_response: 2.0..4.0,
            op_response_fallback: 4.0,
        }
    }
}

/// Compute an instant for every comment in `thread`, in thread order.
///
/// The OP response is anchored on the discovery comment's resolved instant,
/// so comments are processed strictly in order. Validation may land before
/// or after discovery.
pub fn schedule_comments<R: Rng + ?Sized>(
    thread: &Thread,
    post_instant: DateTime<Utc>,
    delays: &CommentDelays,
    rng: &mut R,
) -> Vec<(String, DateTime<Utc>)> {
    let mut out: Vec<(String, DateTime<Utc>)> = Vec::with_capacity(thread.comments.len());
    let mut discovery_at: Option<DateTime<Utc>> = None;

    for plan in &thread.comments {
        let instant = match plan.role {
            CommentRole::Discovery => {
                let at = post_instant + jitter(&delays.discovery, rng);
                discovery_at = Some(at);
                at
            }
            CommentRole::Validation => post_instant + jitter(&delays.validation, rng),
            CommentRole::OpResponse => match discovery_at {
                Some(c1) => c1 + jitter(&delays.op_response, rng),
                None => post_instant + hours(delays.op_response_fallback),
            },
        };
        out.push((plan.comment_id.clone(), instant));
    }

    out
}

fn jitter<R: Rng + ?Sized>(window: &Range<f64>, rng: &mut R) -> TimeDelta {
    if window.is_empty() {
        return hours(window.start);
    }
    hours(rng.random_range(window.clone()))
}

fn hours(h: f64) -> TimeDelta {
    TimeDelta::milliseconds((h * 3_600_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::models::CommentPlan;

    fn plan(n: u8, role: CommentRole, parent: Option<&str>) -> CommentPlan {
        CommentPlan {
            comment_id: format!("P1-C{n}"),
            author: format!("u{n}"),
            author_info: String::new(),
            parent_id: parent.map(str::to_string),
            role,
            order: n,
        }
    }

    fn full_thread() -> Thread {
        Thread {
            post_id: "P1".into(),
            comments: vec![
                plan(1, CommentRole::Discovery, None),
                plan(2, CommentRole::Validation, None),
                plan(3, CommentRole::OpResponse, Some("P1-C1")),
            ],
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    #[test]
    fn delays_fall_inside_their_windows() {
        let delays = CommentDelays::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let times = schedule_comments(&full_thread(), t0(), &delays, &mut rng);
            assert_eq!(times.len(), 3);

            let c1 = times[0].1 - t0();
            let c2 = times[1].1 - t0();
            let c3 = times[2].1 - times[0].1;
            assert!(c1 >= TimeDelta::hours(2) && c1 <= TimeDelta::hours(6));
            assert!(c2 >= TimeDelta::hours(4) && c2 <= TimeDelta::hours(8));
            assert!(c3 >= TimeDelta::hours(2) && c3 <= TimeDelta::hours(4));
        }
    }

    #[test]
    fn op_response_always_follows_discovery() {
        let mut rng = StdRng::seed_from_u64(99);
        let times = schedule_comments(&full_thread(), t0(), &CommentDelays::default(), &mut rng);
        assert!(times[2].1 > times[0].1);
    }

    #[test]
    fn op_response_without_discovery_uses_fixed_fallback() {
        let thread = Thread {
            post_id: "P1".into(),
            comments: vec![plan(3, CommentRole::OpResponse, Some("P1-C1"))],
        };
        let mut rng = StdRng::seed_from_u64(1);
        let times = schedule_comments(&thread, t0(), &CommentDelays::default(), &mut rng);
        assert_eq!(times[0].1, t0() + TimeDelta::hours(4));
    }
}
