//! Integration tests for the session driver.
//!
//! Each test drives `/bin/sh -c <script>`, where the script prints prompts the
//! way a prompt library would and reads the answers from stdin.

#![cfg(unix)]

use std::time::Duration;

use prompt_responder::{EntryKind, ResponderError, Session, SessionBuilder, SpawnError};

fn sh(script: &str) -> SessionBuilder {
    Session::builder("/bin/sh")
        .arg("-c")
        .arg(script)
        .timeout(Duration::from_secs(10))
}

#[tokio::test]
async fn named_answer_reaches_the_child() {
    let output = sh(r#"printf '? Enter the model name: '
read name
printf '\033[2K\033[G? Enter the model name: %s\n' "$name"
printf 'created %s\n' "$name""#)
    .answer("modelName", "a-model")
    .run()
    .await
    .unwrap();

    assert!(output.success(), "{}", output.transcript);
    assert!(output.transcript.render().contains("PROMPT: ^? Enter the model name:$"));
    assert!(output.stdout.contains("created a-model"));
    assert!(!output.stdout.contains('\x1b'));
    assert!(
        output
            .transcript
            .render()
            .contains(" -> Sending modelName: \"a-model\"")
    );
}

#[tokio::test]
async fn selections_accept_the_default() {
    let output = sh(r#"printf '\033[?25l? Select the datasource to attach models to: (Use arrow keys)\n\342\235\257 db\n  other'
read choice
printf '? Expose it via the REST API? (Y/n) '
read expose
printf 'chose [%s] [%s]\n' "$choice" "$expose""#)
    .run()
    .await
    .unwrap();

    assert!(output.success(), "{}", output.transcript);
    assert!(output.stdout.contains("chose [] []"));
    let ignored: Vec<_> = output.transcript.of_kind(EntryKind::Ignored).collect();
    assert_eq!(ignored.len(), 1, "{}", output.transcript);
    assert_eq!(ignored[0].text, "chose [] []");
    assert_eq!(
        output
            .transcript
            .render()
            .matches(" -> Selecting the default choice")
            .count(),
        2
    );
}

#[tokio::test]
async fn missing_answer_fails_the_session() {
    let err = sh(r"printf '? Enter the datasource name: '
read name
echo unreachable")
    .answer("modelName", "a-model")
    .run()
    .await
    .unwrap_err();

    match err {
        ResponderError::MissingAnswer {
            key,
            prompt,
            transcript,
        } => {
            assert_eq!(key, "dataSourceName");
            assert_eq!(prompt, "? Enter the datasource name:");
            assert!(transcript.contains("PROMPT: ^? Enter the datasource name:$"));
        }
        other => panic!("expected a missing answer, got {other}"),
    }
}

#[tokio::test]
async fn unrecognized_prompt_times_out() {
    let err = sh(r"printf '? Favourite colour: '
read colour")
    .timeout(Duration::from_millis(500))
    .run()
    .await
    .unwrap_err();

    assert!(err.is_timeout());
    let transcript = err.transcript().unwrap();
    assert!(transcript.contains("IGNORED: ^? Favourite colour:$"));
    assert!(err.to_string().contains("? Favourite colour:"));
}

#[tokio::test]
async fn crash_is_reported_as_signal() {
    let output = sh(r"printf 'about to crash\n'
kill -9 $$")
    .run()
    .await
    .unwrap();

    assert!(!output.success());
    assert_eq!(output.exit_code, None);
    assert_eq!(output.signal_name(), Some("SIGKILL"));
    assert!(output.stdout.contains("about to crash"));
}

#[tokio::test]
async fn exit_code_is_propagated() {
    let output = sh("exit 3").run().await.unwrap();
    assert_eq!(output.exit_code, Some(3));
    assert_eq!(output.signal, None);
}

#[tokio::test]
async fn session_ends_when_the_child_exits() {
    let started = std::time::Instant::now();
    let output = sh("sleep 30 &\necho done")
        .timeout(Duration::from_secs(10))
        .run()
        .await
        .unwrap();

    assert!(output.success(), "{}", output.transcript);
    assert_eq!(output.stdout, "done\n");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn background_process_does_not_hang_without_deadline() {
    let output = tokio::time::timeout(
        Duration::from_secs(10),
        sh("sleep 30 &\nprintf '? Path uri: '\nread uri\necho \"uri=[$uri]\"")
            .no_timeout()
            .run(),
    )
    .await
    .expect("session should finish once sh exits")
    .unwrap();

    assert!(output.success(), "{}", output.transcript);
    assert!(output.stdout.contains("uri=[]"));
}

#[tokio::test]
async fn stderr_is_mirrored_verbatim() {
    let output = sh(r"printf '\033[1mwarn\033[22m\n' >&2
echo done")
    .run()
    .await
    .unwrap();

    assert!(output.success());
    assert_eq!(output.stderr, "\x1b[1mwarn\x1b[22m\n");
    assert_eq!(output.stdout, "done\n");
}

#[tokio::test]
async fn garbage_is_stripped_from_stdout() {
    let output = sh(r"printf '\033[1mcreate\033[22m \033(Bfile\n'")
        .run()
        .await
        .unwrap();

    assert_eq!(output.stdout, "create file\n");
}

#[tokio::test]
async fn closed_stdin_does_not_abort_the_session() {
    let output = sh(r"exec 0<&-
printf '? Path uri: '
sleep 0.2
echo finished")
    .run()
    .await
    .unwrap();

    assert!(output.success(), "{}", output.transcript);
    assert!(output.stdout.contains("finished"));
}

#[tokio::test]
async fn environment_and_working_dir_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let output = sh(r#"printf '%s in %s\n' "$GREETING" "$(pwd -P)""#)
        .env("GREETING", "hello")
        .current_dir(dir.path())
        .run()
        .await
        .unwrap();

    let expected = dir.path().canonicalize().unwrap();
    assert!(
        output
            .stdout
            .contains(&format!("hello in {}", expected.display())),
        "{}",
        output.stdout
    );
}

#[tokio::test]
async fn spawn_failures_are_classified() {
    let err = Session::builder("/nonexistent/prompt-responder-binary")
        .run()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResponderError::Spawn(SpawnError::CommandNotFound { .. })
    ));

    let err = sh("true")
        .current_dir("/nonexistent/prompt-responder-dir")
        .run()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResponderError::Spawn(SpawnError::InvalidWorkingDir { .. })
    ));
}

#[test]
fn run_blocking_outside_a_runtime() {
    let output = sh("echo blocking").run_blocking().unwrap();
    assert!(output.success());
    assert_eq!(output.stdout, "blocking\n");
}
