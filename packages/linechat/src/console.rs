//! Operator-facing line input and output.
//!
//! Reading stdin can't be interrupted, so [`ThreadedLines`] does the blocking reads on a
//! detached helper thread and hands lines over through a channel, which the keyboard stage can
//! wait on with a timeout. The helper is not one of the session's stages and is never joined;
//! it dies with the process.

use bytes::Bytes;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::{
    io::{self, BufRead, Write},
    thread,
    time::Duration,
};


/// Outcome of one [`LineReader::read_line`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A complete line, newline included, or the unterminated tail before end-of-input
    Line(Bytes),
    /// Nothing arrived within the poll interval
    Idle,
    /// End of input. No further lines will arrive.
    Closed,
}

/// Source of operator lines
pub trait LineReader: Send {
    /// Wait, at most one poll interval, for the next line
    fn read_line(&mut self) -> io::Result<ReadLine>;
}

/// Destination for displayed lines
pub trait LineWriter: Send {
    /// Write `prefix` followed by `line`, with no newline added, and flush
    fn write_line(&mut self, prefix: &[u8], line: &[u8]) -> io::Result<()>;
}


/// [`LineReader`] fed by a helper thread doing blocking reads
pub struct ThreadedLines {
    lines: Receiver<io::Result<Bytes>>,
    poll_interval: Duration,
}

impl ThreadedLines {
    /// Read lines from stdin
    pub fn stdin(poll_interval: Duration) -> io::Result<Self> {
        // StdinLock can't move to another thread, so buffer on top of the handle instead
        Self::spawn(io::BufReader::new(io::stdin()), poll_interval)
    }

    /// Read lines from `input` on a new helper thread
    pub fn spawn<R>(input: R, poll_interval: Duration) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (send, recv) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name("line-reader".into())
            .spawn(move || forward_lines(input, send))?;
        Ok(ThreadedLines { lines: recv, poll_interval })
    }
}

// helper thread body. returns at end-of-input, or once the reader side is gone.
fn forward_lines<R: BufRead>(mut input: R, out: Sender<io::Result<Bytes>>) {
    loop {
        let mut line = Vec::new();
        let forwarded = match input.read_until(b'\n', &mut line) {
            // dropping `out` is how end-of-input reaches the reader side
            Ok(0) => return,
            Ok(_) => out.send(Ok(line.into())),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => out.send(Err(e)),
        };
        if forwarded.is_err() {
            return;
        }
    }
}

impl LineReader for ThreadedLines {
    fn read_line(&mut self) -> io::Result<ReadLine> {
        match self.lines.recv_timeout(self.poll_interval) {
            Ok(Ok(line)) => Ok(ReadLine::Line(line)),
            Ok(Err(e)) => Err(e),
            Err(RecvTimeoutError::Timeout) => Ok(ReadLine::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(ReadLine::Closed),
        }
    }
}


/// [`LineWriter`] over any [`Write`]
pub struct WriterLines<W>(W);

impl<W: Write + Send> WriterLines<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        WriterLines(inner)
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.0
    }
}

/// [`LineWriter`] to stdout
pub fn stdout() -> WriterLines<io::Stdout> {
    WriterLines::new(io::stdout())
}

impl<W: Write + Send> LineWriter for WriterLines<W> {
    fn write_line(&mut self, prefix: &[u8], line: &[u8]) -> io::Result<()> {
        self.0.write_all(prefix)?;
        self.0.write_all(line)?;
        self.0.flush()
    }
}
