//! Child process driver.
//!
//! Spawns the child with piped standard streams and runs a single loop that
//! multiplexes stdout and stderr with `tokio::select!`. Stdout chunks are
//! decoded and fed to the [`Responder`] in arrival order; stderr is only
//! collected. The loop ends when the child exits; output already in the
//! pipes is then read for a short grace period and stdin is closed.

use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::process::{Child, Command};

use super::{Session, SessionOutput};
use crate::config::SessionConfig;
use crate::encoding::Utf8StreamDecoder;
use crate::error::{ResponderError, Result, SpawnError};
use crate::filter::strip_garbage;
use crate::responder::Responder;

/// How long to keep reading after the child exits.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Raw text collected from the child's output streams.
#[derive(Debug, Default)]
struct Captured {
    stdout: String,
    stderr: String,
}

impl Captured {
    fn stdout(&self) -> String {
        strip_garbage(&self.stdout).into_owned()
    }
}

pub(super) async fn run(session: &Session) -> Result<SessionOutput> {
    let config = session.config();
    let started = Instant::now();
    let mut child = spawn(config)?;

    let stdin = child
        .stdin
        .take()
        .ok_or(SpawnError::MissingPipe { stream: "stdin" })?;
    let stdout = child
        .stdout
        .take()
        .ok_or(SpawnError::MissingPipe { stream: "stdout" })?;
    let stderr = child
        .stderr
        .take()
        .ok_or(SpawnError::MissingPipe { stream: "stderr" })?;

    let mut responder = Responder::new(stdin, session.answers().clone(), Arc::clone(session.rules()))
        .with_line_ending(config.line_ending);
    let mut streams = Streams::new(stdout, stderr, config.read_chunk_size);
    let mut captured = Captured::default();

    let driven = within(
        config.timeout,
        drive(&mut responder, &mut streams, &mut captured, &mut child),
    )
    .await;

    // Dropping the writer closes the child's stdin
    let (stdin, transcript) = responder.into_parts();
    drop(stdin);

    let status = match driven {
        Some(Ok(status)) => status,
        Some(Err(e)) => {
            kill_and_reap(&mut child).await;
            return Err(e);
        }
        None => {
            kill_and_reap(&mut child).await;
            return Err(timed_out(config, &captured, &transcript.render()));
        }
    };

    tracing::debug!(
        command = %config.command,
        code = ?status.code(),
        elapsed_ms = started.elapsed().as_millis(),
        "Session finished"
    );

    let stdout = captured.stdout();
    Ok(SessionOutput::new(stdout, captured.stderr, status, transcript))
}

fn spawn(config: &SessionConfig) -> Result<Child> {
    if config.command.is_empty() {
        return Err(SpawnError::NoCommand.into());
    }

    let mut cmd = Command::new(&config.command);
    cmd.args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if !config.inherit_env {
        cmd.env_clear();
    }
    cmd.envs(&config.env);

    if let Some(dir) = &config.working_dir {
        if !dir.is_dir() {
            return Err(SpawnError::InvalidWorkingDir {
                path: dir.display().to_string(),
            }
            .into());
        }
        cmd.current_dir(dir);
    }

    let child = cmd
        .spawn()
        .map_err(|e| SpawnError::from_spawn_io(&config.command, e))?;

    tracing::debug!(
        command = %config.command,
        args = ?config.args,
        pid = ?child.id(),
        "Spawned session"
    );

    Ok(child)
}

/// The child's output pipes and their decoding state.
struct Streams<O, E> {
    stdout: O,
    stderr: E,
    out_buf: Vec<u8>,
    err_buf: Vec<u8>,
    out_decoder: Utf8StreamDecoder,
    err_decoder: Utf8StreamDecoder,
    out_open: bool,
    err_open: bool,
}

impl<O, E> Streams<O, E>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    fn new(stdout: O, stderr: E, chunk_size: usize) -> Self {
        Self {
            stdout,
            stderr,
            out_buf: vec![0u8; chunk_size.max(1)],
            err_buf: vec![0u8; chunk_size.max(1)],
            out_decoder: Utf8StreamDecoder::new(),
            err_decoder: Utf8StreamDecoder::new(),
            out_open: true,
            err_open: true,
        }
    }

    const fn is_open(&self) -> bool {
        self.out_open || self.err_open
    }

    /// Read one chunk from whichever stream is ready first.
    ///
    /// Stdout text goes through the responder; stderr is only collected.
    async fn next_chunk<W: AsyncWrite + Unpin>(
        &mut self,
        responder: &mut Responder<W>,
        captured: &mut Captured,
    ) -> Result<()> {
        tokio::select! {
            read = self.stdout.read(&mut self.out_buf), if self.out_open => {
                let n = read.map_err(|e| ResponderError::io_context("reading child stdout", e))?;
                let text = if n == 0 {
                    self.out_open = false;
                    self.out_decoder.finish()
                } else {
                    self.out_decoder.decode(&self.out_buf[..n])
                };
                if !text.is_empty() {
                    captured.stdout.push_str(&text);
                    respond(responder, &text).await?;
                }
            }
            read = self.stderr.read(&mut self.err_buf), if self.err_open => {
                let n = read.map_err(|e| ResponderError::io_context("reading child stderr", e))?;
                if n == 0 {
                    self.err_open = false;
                    captured.stderr.push_str(&self.err_decoder.finish());
                } else {
                    captured.stderr.push_str(&self.err_decoder.decode(&self.err_buf[..n]));
                }
            }
            else => {}
        }
        Ok(())
    }
}

/// Respond to prompts until the child exits, then collect what it left
/// in the pipes.
///
/// The session ends on the child's exit rather than on end of file, since
/// a background process started by the child can hold the pipes open.
async fn drive<W, O, E>(
    responder: &mut Responder<W>,
    streams: &mut Streams<O, E>,
    captured: &mut Captured,
    child: &mut Child,
) -> Result<ExitStatus>
where
    W: AsyncWrite + Unpin,
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let status = loop {
        tokio::select! {
            chunk = streams.next_chunk(responder, captured), if streams.is_open() => chunk?,
            status = child.wait() => {
                break status.map_err(|e| ResponderError::io_context("waiting for child", e))?;
            }
        }
    };

    drain(responder, streams, captured).await?;
    Ok(status)
}

/// Read the remaining output until end of file or [`DRAIN_GRACE`] elapses.
async fn drain<W, O, E>(
    responder: &mut Responder<W>,
    streams: &mut Streams<O, E>,
    captured: &mut Captured,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let drained = tokio::time::timeout(DRAIN_GRACE, async {
        while streams.is_open() {
            streams.next_chunk(responder, captured).await?;
        }
        Ok::<(), ResponderError>(())
    })
    .await;

    drained.unwrap_or_else(|_| {
        tracing::debug!("Output pipes still open after the child exited");
        Ok(())
    })
}

async fn respond<W: AsyncWrite + Unpin>(responder: &mut Responder<W>, text: &str) -> Result<()> {
    match responder.detect_prompt_and_respond(text).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_broken_pipe() => {
            // The child stopped reading; keep collecting until it exits
            tracing::warn!(error = %e, "Child closed stdin before the answer was written");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn within<F: Future>(deadline: Option<Duration>, future: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout(deadline, future).await.ok(),
        None => Some(future.await),
    }
}

async fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, pid = ?child.id(), "Failed to kill child");
    }
}

fn timed_out(config: &SessionConfig, captured: &Captured, transcript: &str) -> ResponderError {
    let duration = config.timeout.unwrap_or_default();
    tracing::warn!(command = %config.command, ?duration, "Session timed out");
    ResponderError::timeout(duration, captured.stdout(), transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Answers;
    use crate::rules::RuleTable;

    fn responder() -> Responder<Vec<u8>> {
        Responder::new(
            Vec::new(),
            Answers::new().with("modelName", "a-model"),
            Arc::new(RuleTable::scaffold()),
        )
    }

    #[tokio::test]
    async fn drain_answers_prompts_and_collects_streams() {
        let stdout: &[u8] = b"? Enter the model name: \x1b[2K\x1b[G? Enter the model name: a-model\n";
        let stderr: &[u8] = b"warning: deprecated\n";
        let mut responder = responder();
        let mut streams = Streams::new(stdout, stderr, 24);
        let mut captured = Captured::default();

        drain(&mut responder, &mut streams, &mut captured)
            .await
            .unwrap();

        assert!(!streams.is_open());
        assert_eq!(captured.stderr, "warning: deprecated\n");
        assert_eq!(
            captured.stdout(),
            "? Enter the model name: ? Enter the model name: a-model\n"
        );
        let (input, _) = responder.into_parts();
        assert_eq!(input, b"a-model\n");
    }

    #[tokio::test]
    async fn drain_gives_up_on_pipes_held_open() {
        let (mut writer, reader) = tokio::io::duplex(64);
        tokio::io::AsyncWriteExt::write_all(&mut writer, b"done\n")
            .await
            .unwrap();
        let mut responder = responder();
        let mut streams = Streams::new(reader, tokio::io::empty(), 64);
        let mut captured = Captured::default();

        let started = Instant::now();
        drain(&mut responder, &mut streams, &mut captured)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(streams.is_open());
        assert_eq!(captured.stdout, "done\n");
        drop(writer);
    }

    #[tokio::test]
    async fn within_without_deadline_always_completes() {
        assert_eq!(within(None, async { 7 }).await, Some(7));
        assert_eq!(
            within(Some(Duration::from_millis(10)), std::future::pending::<()>()).await,
            None
        );
    }
}
