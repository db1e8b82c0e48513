//! Process-level tests for StageInvoker, using /bin/sh scripts as stages

use pretty_assertions::assert_eq;
use starpipe_stage::{StageError, StageInvoker, StageSpec};
use starpipe_story::{CodecError, LineNormalization, Stories, StoryNode};
use std::time::{Duration, Instant};

fn sh(id: &str, script: &str) -> StageSpec {
    StageSpec::from_argv(
        id,
        vec!["sh".to_string(), "-c".to_string(), script.to_string()],
    )
    .unwrap()
}

fn cluster() -> StoryNode {
    StoryNode::new("Particle")
        .with_attribute("N", "2")
        .with_child(StoryNode::new("Log").with_line("  made = by test"))
        .with_child(StoryNode::new("Particle").with_attribute("i", "1"))
        .with_child(StoryNode::new("Particle").with_attribute("i", "2"))
}

#[tokio::test]
async fn generator_stage_without_input() {
    let invoker = StageInvoker::new();
    let stage = sh("gen", "printf '(Particle\\n  N = 0\\n)Particle\\n'");
    let story = invoker.run(&stage, None).await.unwrap().into_single().unwrap();
    assert_eq!(story.kind(), "Particle");
    assert_eq!(story.attribute("N"), Some("0"));
}

#[tokio::test]
async fn generator_sees_empty_stdin() {
    let invoker = StageInvoker::new();
    let stage = sh("gen", "n=$(wc -c); printf '(Count\\n  bytes = %s\\n)Count\\n' $n");
    let story = invoker.run(&stage, None).await.unwrap().into_single().unwrap();
    assert_eq!(story.attribute("bytes"), Some("0"));
}

#[tokio::test]
async fn identity_stage_round_trips_input() {
    let invoker = StageInvoker::new();
    let input = cluster();
    let output = invoker.run(&sh("cat", "cat"), Some(&input)).await.unwrap();
    assert_eq!(output, Stories::Single(input.clone()));
}

#[tokio::test]
async fn spilled_input_reaches_stage() {
    let invoker = StageInvoker::new().with_spill_threshold(16);
    let input = cluster();
    assert!(input.to_story_string().len() > 16);
    let output = invoker.run(&sh("cat", "cat"), Some(&input)).await.unwrap();
    assert_eq!(output.into_single().unwrap(), input);
}

#[tokio::test]
async fn expanding_stage_yields_sequence() {
    let invoker = StageInvoker::new();
    let stage = sh(
        "evolve",
        "cat > /dev/null; for t in 1 2 3; do printf '(Particle\\n  t = %s\\n)Particle\\n' $t; done",
    );
    let output = invoker.run(&stage, Some(&cluster())).await.unwrap();
    let times: Vec<_> = output.iter().filter_map(|s| s.attribute("t")).collect();
    assert_eq!(times, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn stage_ignoring_large_input_is_not_an_error() {
    let invoker = StageInvoker::new();
    let mut big = StoryNode::new("Particle");
    for i in 0..20_000 {
        big.push_child(StoryNode::new("Particle").with_attribute("i", i.to_string()));
    }
    let stage = sh("ignore", "printf '(Particle\\n)Particle\\n'");
    let output = invoker.run(&stage, Some(&big)).await.unwrap();
    assert_eq!(output.into_single().unwrap().kind(), "Particle");
}

#[tokio::test]
async fn non_zero_exit_is_failed_with_stderr() {
    let invoker = StageInvoker::new();
    let stage = sh(
        "broken",
        "printf '(Particle\\n)Particle\\n'; echo 'broken: bad option -q' >&2; exit 3",
    );
    let err = invoker.run(&stage, None).await.unwrap_err();
    match err {
        StageError::Failed { stage, status, stderr } => {
            assert_eq!(stage, "broken");
            assert_eq!(status, Some(3));
            assert_eq!(stderr, "broken: bad option -q\n");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn crash_with_garbled_stdout_reports_exit_and_stderr() {
    let stage = sh(
        "crashy",
        "printf '(Particle\\n\\377\\376\\n'; echo 'crashy: segfault' >&2; exit 3",
    );
    match StageInvoker::new().run(&stage, None).await.unwrap_err() {
        StageError::Failed { stage, status, stderr } => {
            assert_eq!(stage, "crashy");
            assert_eq!(status, Some(3));
            assert_eq!(stderr, "crashy: segfault\n");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_utf8_output_on_success_is_parse_error() {
    let stage = sh("garbled", "printf '(Particle\\n\\377\\376\\n)Particle\\n'");
    let err = StageInvoker::new().run(&stage, None).await.unwrap_err();
    assert!(
        matches!(
            err,
            StageError::Parse { source: CodecError::InvalidUtf8 { line: 2 }, .. }
        ),
        "unexpected error: {err:?}"
    );
}

/// `None` once the process is gone or only a zombie remains
#[cfg(target_os = "linux")]
fn process_state(pid: &str) -> Option<char> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let state = stat.rsplit_once(')')?.1.trim_start().chars().next()?;
    (state != 'Z').then_some(state)
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn dropping_run_kills_stage() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let stage = sh(
        "sleeper",
        &format!("echo $$ > '{}'; exec sleep 30", pid_file.display()),
    );

    let invoker = StageInvoker::new();
    let aborted = tokio::time::timeout(Duration::from_millis(500), invoker.run(&stage, None)).await;
    assert!(aborted.is_err(), "stage should still be running when abandoned");

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let pid = pid.trim();
    assert!(!pid.is_empty());

    let started = Instant::now();
    while process_state(pid).is_some() {
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "stage {pid} still alive after the run was dropped"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn stderr_capture_is_bounded() {
    let invoker = StageInvoker::new().with_stderr_limit(10);
    let stage = sh("noisy", "printf 'aaaaaaaaaaaaaaaaaaaaTAIL' >&2; exit 1");
    let err = invoker.run(&stage, None).await.unwrap_err();
    let stderr = err.stderr().unwrap();
    assert_eq!(stderr.len(), 10);
    assert!(stderr.ends_with("TAIL"));
}

#[tokio::test]
async fn deadline_kills_stage() {
    let invoker = StageInvoker::new();
    let stage = sh("sleepy", "sleep 30").with_timeout(Duration::from_millis(200));
    let started = Instant::now();
    let err = invoker.run(&stage, None).await.unwrap_err();
    assert!(matches!(err, StageError::TimedOut { ref stage, .. } if stage == "sleepy"));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn default_deadline_applies() {
    let invoker = StageInvoker::new().with_default_timeout(Some(Duration::from_millis(200)));
    let err = invoker.run(&sh("sleepy", "sleep 30"), None).await.unwrap_err();
    assert!(matches!(err, StageError::TimedOut { .. }));
}

#[tokio::test]
async fn empty_output_is_parse_error() {
    let invoker = StageInvoker::new();
    let err = invoker.run(&sh("quiet", "true"), None).await.unwrap_err();
    assert!(matches!(
        err,
        StageError::Parse { source: CodecError::EmptyResult, .. }
    ));
}

#[tokio::test]
async fn unterminated_output_is_parse_error() {
    let invoker = StageInvoker::new();
    let err = invoker
        .run(&sh("truncated", "printf '(Particle\\n(Dynamics\\n'"), None)
        .await
        .unwrap_err();
    match err {
        StageError::Parse {
            source: CodecError::UnterminatedBlock { kinds },
            ..
        } => assert_eq!(kinds, vec!["Dynamics".to_string(), "Particle".to_string()]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_program_is_spawn_error() {
    let invoker = StageInvoker::new();
    let stage = StageSpec::from_command_line("starpipe-no-such-program-xyz -n 5").unwrap();
    let err = invoker.run(&stage, None).await.unwrap_err();
    assert!(matches!(err, StageError::Spawn { ref stage, .. } if stage == "starpipe-no-such-program-xyz"));
}

#[tokio::test]
async fn output_trailing_whitespace_trimmed_by_default() {
    let stage = sh("padded", "printf '(Log\\nnote   \\n)Log   \\n'");
    let trimmed = StageInvoker::new().run(&stage, None).await.unwrap();
    assert_eq!(trimmed.into_single().unwrap().lines(), &["note".to_string()]);

    let kept = StageInvoker::new()
        .with_normalization(LineNormalization::Terminator)
        .run(&sh("padded", "printf '(Log\\nnote   \\n)Log\\n'"), None)
        .await
        .unwrap();
    assert_eq!(kept.into_single().unwrap().lines(), &["note   ".to_string()]);
}
