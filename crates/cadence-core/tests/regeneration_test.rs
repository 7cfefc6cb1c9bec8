//! Quality gate behaviour observed through full runs.

use rand::SeedableRng;
use rand::rngs::StdRng;

use cadence_core::gate::DEGRADED_WARNING;
use cadence_core::generator::{GeneratedComment, GeneratedPost};
use cadence_core::generate_calendar;
use cadence_test_utils::{ScriptedGenerator, good_post, request, spam_comment, spam_post};

#[tokio::test]
async fn good_first_attempt_costs_one_call_per_post() {
    let generator = ScriptedGenerator::new();
    let mut rng = StdRng::seed_from_u64(1);

    let cal = generate_calendar(&request(3), &generator, &mut rng).await.unwrap();

    assert_eq!(generator.post_calls(), 3);
    assert!(cal.posts.iter().all(|p| p.warning.is_none()));
}

#[tokio::test]
async fn spam_every_time_keeps_first_candidate_with_warning() {
    let first = GeneratedPost {
        title: "first".to_string(),
        ..spam_post()
    };
    let generator = ScriptedGenerator::new()
        .with_posts([first, spam_post(), spam_post()])
        .with_fallback_post(good_post());
    let mut rng = StdRng::seed_from_u64(1);

    let cal = generate_calendar(&request(2), &generator, &mut rng).await.unwrap();

    // P1 consumed all three scripted attempts, P2 got a good post at once.
    assert_eq!(generator.post_calls(), 4);

    let p1 = &cal.posts[0];
    assert_eq!(p1.title, "first");
    assert_eq!(p1.warning.as_deref(), Some(DEGRADED_WARNING));
    assert!(p1.quality_score < 6.0);

    assert!(cal.posts[1].warning.is_none());
}

#[tokio::test]
async fn later_attempt_can_rescue_a_post() {
    let generator = ScriptedGenerator::new().with_posts([spam_post(), good_post()]);
    let mut rng = StdRng::seed_from_u64(1);

    let cal = generate_calendar(&request(1), &generator, &mut rng).await.unwrap();

    assert_eq!(generator.post_calls(), 2);
    assert_eq!(cal.posts[0].title, good_post().title);
    assert!(cal.posts[0].warning.is_none());
}

#[tokio::test]
async fn spam_comment_is_kept_with_warning_after_three_attempts() {
    let first = GeneratedComment {
        text: format!("first {}", spam_comment().text),
    };
    let generator =
        ScriptedGenerator::new().with_comments([first, spam_comment(), spam_comment()]);
    let mut rng = StdRng::seed_from_u64(1);

    let cal = generate_calendar(&request(1), &generator, &mut rng).await.unwrap();

    // The first comment consumed all three scripted attempts; the other two
    // were accepted on their first call.
    assert_eq!(cal.total_comments, 3);
    assert_eq!(generator.comment_calls(), 5);

    let degraded = &cal.comments[0];
    assert!(degraded.text.starts_with("first "));
    assert_eq!(degraded.warning.as_deref(), Some(DEGRADED_WARNING));
    assert!(degraded.quality_score < 6.0);

    assert!(cal.comments[1..].iter().all(|c| c.warning.is_none()));
    assert!(cal.posts[0].warning.is_none());
}
