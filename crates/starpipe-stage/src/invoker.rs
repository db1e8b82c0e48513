//! External stage process invocation

use crate::error::{StageError, StageResult};
use crate::input::StagedInput;
use crate::spec::StageSpec;
use starpipe_story::{
    CodecError, CodecResult, LineNormalization, ParseOptions, Stories, StoryNode, StoryParser,
};
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};

/// In-memory bound for staged input before it spills to a temporary file
pub const DEFAULT_SPILL_THRESHOLD: usize = 1024 * 1024;

/// Bytes of stderr kept for error reports (the tail is kept)
pub const DEFAULT_STDERR_LIMIT: usize = 64 * 1024;

/// Runs one stage process against one input story
///
/// From the caller's point of view [`run`](Self::run) is a single awaited
/// operation: it returns once the process has exited and its output has been
/// drained and parsed. Dropping the future kills the process and releases
/// the staged input.
#[derive(Debug, Clone)]
pub struct StageInvoker {
    spill_threshold: usize,
    stderr_limit: usize,
    parse_options: ParseOptions,
    default_timeout: Option<Duration>,
}

impl Default for StageInvoker {
    fn default() -> Self {
        Self {
            spill_threshold: DEFAULT_SPILL_THRESHOLD,
            stderr_limit: DEFAULT_STDERR_LIMIT,
            parse_options: ParseOptions::new()
                .with_normalization(LineNormalization::TrimTrailingWhitespace),
            default_timeout: None,
        }
    }
}

impl StageInvoker {
    /// Create invoker with default limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With spill threshold in bytes
    #[inline]
    #[must_use]
    pub fn with_spill_threshold(mut self, bytes: usize) -> Self {
        self.spill_threshold = bytes;
        self
    }

    /// With stderr capture limit in bytes
    #[inline]
    #[must_use]
    pub fn with_stderr_limit(mut self, bytes: usize) -> Self {
        self.stderr_limit = bytes;
        self
    }

    /// With output line normalization
    #[inline]
    #[must_use]
    pub fn with_normalization(mut self, normalization: LineNormalization) -> Self {
        self.parse_options = self.parse_options.with_normalization(normalization);
        self
    }

    /// With deadline for stages that have none of their own
    #[inline]
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Spill threshold in bytes
    #[inline]
    #[must_use]
    pub fn spill_threshold(&self) -> usize {
        self.spill_threshold
    }

    /// Deadline applied to `spec`
    #[must_use]
    pub fn deadline_for(&self, spec: &StageSpec) -> Option<Duration> {
        spec.timeout().or(self.default_timeout)
    }

    /// Run `spec`, feeding `input` on stdin when present
    ///
    /// # Errors
    /// - `Input` if the story cannot be staged
    /// - `Spawn` if the process cannot start
    /// - `Io` on pipe failures other than the stage closing its stdin early
    /// - `TimedOut` if the deadline expires (the process is killed)
    /// - `Failed` on non-zero exit, whatever happened on the pipes; parsed
    ///   output is discarded
    /// - `Parse` if the output is not well-formed UTF-8 story text
    #[tracing::instrument(name = "stage", skip_all, fields(stage = %spec.id()))]
    pub async fn run(&self, spec: &StageSpec, input: Option<&StoryNode>) -> StageResult<Stories> {
        let id = spec.id();
        let staged = input
            .map(|node| StagedInput::stage(node, self.spill_threshold))
            .transpose()
            .map_err(|e| StageError::input(id, e))?;

        let mut command = Command::new(spec.program());
        command
            .args(spec.argv().get(1..).unwrap_or_default())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let feed = match staged {
            None => {
                command.stdin(Stdio::null());
                None
            }
            Some(StagedInput::Spilled(file)) => {
                command.stdin(Stdio::from(file));
                None
            }
            Some(StagedInput::InMemory(bytes)) => {
                command.stdin(Stdio::piped());
                Some(bytes)
            }
        };

        tracing::debug!(argv = ?spec.argv(), "spawning stage");
        let mut child = command.spawn().map_err(|e| StageError::spawn(id, e))?;
        // Dropping the command releases the parent's copy of a spilled stdin file.
        drop(command);

        let deadline = self.deadline_for(spec);
        let drained = {
            let exchange = self.exchange(&mut child, feed);
            match deadline {
                Some(limit) => match tokio::time::timeout(limit, exchange).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(?limit, "stage deadline expired, killing process");
                        if let Err(e) = child.kill().await {
                            tracing::warn!(error = %e, "failed to kill timed-out stage");
                        }
                        return Err(StageError::TimedOut {
                            stage: id.to_string(),
                            after: limit,
                        });
                    }
                },
                None => exchange.await,
            }
        };
        let drained = drained.map_err(|e| StageError::io(id, e))?;

        tracing::debug!(status = ?drained.status.code(), "stage exited");

        // Exit status wins over anything that went wrong reading the pipes.
        if !drained.status.success() {
            return Err(StageError::Failed {
                stage: id.to_string(),
                status: drained.status.code(),
                stderr: drained.stderr,
            });
        }

        drained.written.map_err(|e| StageError::io(id, e))?;
        let stories = drained.stories.map_err(|e| StageError::io(id, e))?;
        tracing::trace!(lines = stories.lines_seen, "stage output drained");
        stories.finish().map_err(|source| StageError::Parse {
            stage: id.to_string(),
            source,
        })
    }

    /// Write stdin, drain stdout into the parser and capture stderr, then reap
    ///
    /// All three pipes are driven to completion even if one of them fails, so
    /// the child is always reaped and its stderr kept.
    async fn exchange(&self, child: &mut Child, feed: Option<Vec<u8>>) -> io::Result<Drained> {
        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stderr not captured"))?;

        let (written, stories, stderr) = tokio::join!(
            write_input(stdin, feed),
            read_stories(stdout, self.parse_options),
            read_tail(stderr, self.stderr_limit),
        );
        let status = child.wait().await?;

        Ok(Drained {
            status,
            written,
            stories,
            stderr: stderr.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read stage stderr");
                String::new()
            }),
        })
    }
}

struct Drained {
    status: ExitStatus,
    written: io::Result<()>,
    stories: io::Result<StoryLines>,
    stderr: String,
}

/// Stage stdout fed line by line into a parser
struct StoryLines {
    parser: StoryParser,
    lines_seen: usize,
    invalid_utf8: Option<usize>,
}

impl StoryLines {
    fn finish(self) -> CodecResult<Stories> {
        match self.invalid_utf8 {
            Some(line) => Err(CodecError::InvalidUtf8 { line }),
            None => self.parser.finish(),
        }
    }
}

async fn write_input(stdin: Option<ChildStdin>, feed: Option<Vec<u8>>) -> io::Result<()> {
    let (Some(mut pipe), Some(bytes)) = (stdin, feed) else {
        return Ok(());
    };
    match pipe.write_all(&bytes).await {
        Ok(()) => {}
        // A stage may legitimately exit without consuming all of its input.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("stage closed stdin before reading all input");
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    match pipe.shutdown().await {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
        _ => Ok(()),
    }
}

/// Drain `stdout` to EOF; lines after the first non-UTF-8 one are discarded
async fn read_stories<R>(stdout: R, options: ParseOptions) -> io::Result<StoryLines>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stdout);
    let mut drained = StoryLines {
        parser: StoryParser::new(options),
        lines_seen: 0,
        invalid_utf8: None,
    };
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        drained.lines_seen += 1;
        if drained.invalid_utf8.is_some() {
            continue;
        }
        match std::str::from_utf8(&buf) {
            Ok(line) => drained.parser.push_line(line),
            Err(_) => drained.invalid_utf8 = Some(drained.lines_seen),
        }
    }
    Ok(drained)
}

async fn read_tail<R>(mut stderr: R, limit: usize) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = stderr.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        tail.extend_from_slice(&chunk[..n]);
        if tail.len() > limit {
            let excess = tail.len() - limit;
            tail.drain(..excess);
        }
    }
    Ok(String::from_utf8_lossy(&tail).into_owned())
}
