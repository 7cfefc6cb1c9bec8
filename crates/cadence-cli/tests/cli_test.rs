//! Integration tests for the `cadence` binary.
//!
//! Each test runs the compiled binary with an isolated config directory so a
//! developer's own `~/.config/cadence` and API key never leak in.

use std::path::Path;
use std::process::{Command, Output};

use cadence_core::export::read_sheet;
use cadence_core::models::Calendar;
use cadence_test_utils::input;

fn cadence(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cadence"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("CADENCE_API_KEY")
        .env_remove("CADENCE_MODEL")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run cadence binary")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_input(dir: &Path, posts: usize, week: u32) -> String {
    let path = dir.join("input.json");
    std::fs::write(&path, serde_json::to_string_pretty(&input(posts, week)).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn offline_generate_writes_calendar_and_sheet() {
    let tmp = tempfile::tempdir().unwrap();
    let input_path = write_input(tmp.path(), 5, 1);
    let out = tmp.path().join("calendar.json");
    let sheet = tmp.path().join("sheet.csv");

    let output = cadence(
        tmp.path(),
        &[
            "generate",
            &input_path,
            "--offline",
            "--seed",
            "3",
            "--output",
            out.to_str().unwrap(),
            "--export",
            sheet.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("5 posts, 15 comments"), "stdout: {stdout}");

    let calendar: Calendar = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(calendar.total_posts, 5);

    let parsed = read_sheet(&std::fs::read_to_string(&sheet).unwrap()).unwrap();
    assert_eq!(parsed.posts.len(), 5);
    assert_eq!(parsed.comments.len(), 15);
}

#[test]
fn generate_to_stdout_prints_json() {
    let tmp = tempfile::tempdir().unwrap();
    let input_path = write_input(tmp.path(), 2, 4);

    let output = cadence(tmp.path(), &["generate", &input_path, "--offline", "--seed", "9"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let calendar: Calendar = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(calendar.week_number, 4);
    assert_eq!(calendar.total_comments, 6);
}

#[test]
fn generate_without_api_key_requires_offline() {
    let tmp = tempfile::tempdir().unwrap();
    let input_path = write_input(tmp.path(), 2, 1);

    let output = cadence(tmp.path(), &["generate", &input_path]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--offline"), "stderr: {}", stderr(&output));
}

#[test]
fn invalid_input_fails_with_reason() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("input.json");
    let mut value = serde_json::to_value(input(3, 1)).unwrap();
    value["company"]["subreddits"] = serde_json::json!([]);
    std::fs::write(&path, value.to_string()).unwrap();

    let output = cadence(tmp.path(), &["generate", path.to_str().unwrap(), "--offline"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("at least one subreddit"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn init_writes_config_and_refuses_to_overwrite() {
    let tmp = tempfile::tempdir().unwrap();

    let output = cadence(tmp.path(), &["init", "--api-key", "AIzaSyTestKey123456"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("AIza...3456"), "stdout: {stdout}");
    assert!(!stdout.contains("AIzaSyTestKey123456"));

    let path = tmp.path().join("cadence").join("config.toml");
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("api_key = \"AIzaSyTestKey123456\""));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    let again = cadence(tmp.path(), &["init"]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("--force"));

    let forced = cadence(tmp.path(), &["init", "--force"]);
    assert!(forced.status.success(), "stderr: {}", stderr(&forced));
}
