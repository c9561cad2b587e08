// src/exec/output.rs

//! Single combined stdout + stderr stream for a runner process.
//!
//! Both of the child's output descriptors are pointed at the write end of one
//! OS pipe, so lines arrive in exactly the order the runner wrote them,
//! whichever stream they went to.

use std::io;
use std::process::Stdio;

use tokio::io::AsyncRead;

/// Read half of the combined stream.
pub type CombinedOutput = Box<dyn AsyncRead + Send + Unpin>;

/// Write ends to hand to the child, one per output descriptor.
pub struct ChildOutput {
    pub stdout: Stdio,
    pub stderr: Stdio,
}

/// Create the pipe. The returned [`ChildOutput`] must be dropped by the
/// parent once the child is spawned, otherwise the reader never sees EOF.
pub fn combined_pipe() -> io::Result<(CombinedOutput, ChildOutput)> {
    let (reader, writer) = io::pipe()?;
    let writer_err = writer.try_clone()?;

    let child = ChildOutput {
        stdout: Stdio::from(writer),
        stderr: Stdio::from(writer_err),
    };
    Ok((async_reader(reader)?, child))
}

#[cfg(unix)]
fn async_reader(reader: io::PipeReader) -> io::Result<CombinedOutput> {
    use std::os::fd::OwnedFd;
    use tokio::net::unix::pipe;

    let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
    Ok(Box::new(receiver))
}

#[cfg(windows)]
fn async_reader(reader: io::PipeReader) -> io::Result<CombinedOutput> {
    use std::os::windows::io::OwnedHandle;

    let file = std::fs::File::from(OwnedHandle::from(reader));
    Ok(Box::new(tokio::fs::File::from_std(file)))
}
