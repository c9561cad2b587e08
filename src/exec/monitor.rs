// src/exec/monitor.rs

//! Drains runner output into the log sink and reaps the process.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::exec::output::CombinedOutput;
use crate::sink::LogSink;
use crate::types::{ProcessStatus, RunId};

/// What a drain task observed over the lifetime of one runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainReport {
    pub run_id: RunId,
    /// Lines forwarded to the sink.
    pub lines: u64,
    /// Set when reading stopped early because of an I/O error.
    pub read_error: Option<String>,
    /// Exit code of the runner, if it exited normally and was reaped.
    pub exit_code: Option<i32>,
}

/// Completion handle of a drain task.
///
/// Awaiting it is optional; the task runs to completion either way.
#[derive(Debug)]
pub struct DrainHandle {
    inner: JoinHandle<DrainReport>,
}

impl DrainHandle {
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the runner's output to close and the runner to be reaped.
    pub async fn join(self) -> Result<DrainReport, JoinError> {
        self.inner.await
    }
}

/// Longest line forwarded as one sink entry. Longer lines are split.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Starts one drain task per launched runner.
#[derive(Debug, Clone)]
pub struct OutputMonitor {
    sink: Arc<dyn LogSink>,
}

impl OutputMonitor {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Spawn the drain task for `child`.
    ///
    /// The task owns the child from here on. It publishes
    /// [`ProcessStatus::Exited`] on `status` once the process has been
    /// reaped (or [`ProcessStatus::Unknown`] if waiting failed).
    pub fn attach(
        &self,
        run_id: RunId,
        output: CombinedOutput,
        child: Child,
        status: Arc<watch::Sender<ProcessStatus>>,
    ) -> DrainHandle {
        let sink = Arc::clone(&self.sink);
        let inner = tokio::spawn(drain(run_id, output, child, sink, status));
        DrainHandle { inner }
    }
}

async fn drain(
    run_id: RunId,
    output: CombinedOutput,
    mut child: Child,
    sink: Arc<dyn LogSink>,
    status: Arc<watch::Sender<ProcessStatus>>,
) -> DrainReport {
    debug!(run_id = %run_id, "drain task started");

    let (lines, read_error) = forward_lines(&run_id, output, sink.as_ref()).await;

    let exit_code = match child.wait().await {
        Ok(exit) => {
            info!(
                run_id = %run_id,
                exit_code = exit.code().unwrap_or(-1),
                success = exit.success(),
                lines,
                "benchmark runner exited"
            );
            status.send_replace(ProcessStatus::Exited);
            exit.code()
        }
        Err(e) => {
            error!(run_id = %run_id, error = %e, "failed to wait for the benchmark runner");
            status.send_replace(ProcessStatus::Unknown);
            None
        }
    };

    DrainReport {
        run_id,
        lines,
        read_error,
        exit_code,
    }
}

/// Forward every line of `output` to the sink until EOF or a read error.
///
/// Bytes are decoded lossily so a stray invalid byte does not end the drain.
/// A trailing `\r\n` or `\n` is stripped; an unterminated last line is still
/// forwarded. Lines longer than [`MAX_LINE_BYTES`] arrive as several entries.
async fn forward_lines(
    run_id: &RunId,
    output: CombinedOutput,
    sink: &dyn LogSink,
) -> (u64, Option<String>) {
    let mut reader = BufReader::new(output);
    let mut buf = Vec::new();
    let mut count = 0u64;

    loop {
        buf.clear();
        let mut limited = (&mut reader).take(MAX_LINE_BYTES as u64);
        match limited.read_until(b'\n', &mut buf).await {
            Ok(0) => return (count, None),
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                sink.append(run_id, &String::from_utf8_lossy(&buf));
                count += 1;
            }
            Err(e) => {
                error!(
                    run_id = %run_id,
                    error = %e,
                    "[Runner {}] => Failed to read from the benchmark runner.",
                    run_id
                );
                return (count, Some(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, ReadBuf};

    use super::*;

    #[derive(Debug, Default)]
    struct VecSink(Mutex<Vec<String>>);

    impl LogSink for VecSink {
        fn append(&self, _run_id: &RunId, line: &str) {
            self.0.lock().unwrap().push(line.to_string());
        }
    }

    #[tokio::test]
    async fn forwards_crlf_and_unterminated_lines() {
        let sink = VecSink::default();
        let input: CombinedOutput = Box::new(&b"one\r\ntwo\n\nthree"[..]);

        let (count, err) = forward_lines(&RunId::new("r"), input, &sink).await;

        assert_eq!(count, 4);
        assert!(err.is_none());
        assert_eq!(*sink.0.lock().unwrap(), vec!["one", "two", "", "three"]);
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_stop_the_drain() {
        let sink = VecSink::default();
        let input: CombinedOutput = Box::new(&b"ok\n\xff\xfe\nafter\n"[..]);

        let (count, err) = forward_lines(&RunId::new("r"), input, &sink).await;

        assert_eq!(count, 3);
        assert!(err.is_none());
        let lines = sink.0.lock().unwrap();
        assert_eq!(lines[0], "ok");
        assert_eq!(lines[2], "after");
    }

    #[tokio::test]
    async fn overlong_lines_are_split() {
        let sink = VecSink::default();
        let mut data = vec![b'a'; MAX_LINE_BYTES + 10];
        data.extend_from_slice(b"\nnext\n");
        let input: CombinedOutput = Box::new(io::Cursor::new(data));

        let (count, err) = forward_lines(&RunId::new("r"), input, &sink).await;

        assert_eq!(count, 3);
        assert!(err.is_none());
        let lines = sink.0.lock().unwrap();
        assert_eq!(lines[0].len(), MAX_LINE_BYTES);
        assert_eq!(lines[1], "a".repeat(10));
        assert_eq!(lines[2], "next");
    }

    /// Yields one chunk, then fails every read.
    struct BrokenAfter(Option<&'static [u8]>);

    impl AsyncRead for BrokenAfter {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.0.take() {
                Some(chunk) => {
                    buf.put_slice(chunk);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::other("pipe broke"))),
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn read_error_ends_the_drain_but_still_reaps() {
        let sink = Arc::new(VecSink::default());
        let monitor = OutputMonitor::new(sink.clone());
        let child = tokio::process::Command::new("true")
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .spawn()
            .unwrap();
        let status = Arc::new(watch::Sender::new(ProcessStatus::Running));

        let handle = monitor.attach(
            RunId::new("broken"),
            Box::new(BrokenAfter(Some(b"first\n"))),
            child,
            Arc::clone(&status),
        );
        let report = handle.join().await.unwrap();

        assert_eq!(report.lines, 1);
        assert_eq!(report.read_error.as_deref(), Some("pipe broke"));
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(*status.borrow(), ProcessStatus::Exited);
        assert_eq!(*sink.0.lock().unwrap(), vec!["first"]);
    }
}
