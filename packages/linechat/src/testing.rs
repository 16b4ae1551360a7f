// in-memory stand-ins for the transport and the console, for tests.

use crate::{
    console::{LineReader, LineWriter, ReadLine},
    message::Message,
    pipeline::{Fetched, Sink, Source},
    shutdown::ShutdownCause,
    transport::Transport,
};
use bytes::Bytes;
use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};


// how long doubles pretend to block when they have nothing to give.
const IDLE: Duration = Duration::from_millis(1);


// source that replays a script, then closes (or idles forever).
pub(crate) struct ScriptedSource {
    script: VecDeque<io::Result<Fetched>>,
    close_at_end: bool,
}

impl ScriptedSource {
    pub(crate) fn new(script: Vec<io::Result<Fetched>>) -> Self {
        ScriptedSource { script: script.into(), close_at_end: true }
    }

    pub(crate) fn idle_forever() -> Self {
        ScriptedSource { script: VecDeque::new(), close_at_end: false }
    }
}

impl Source for ScriptedSource {
    fn fetch(&mut self) -> io::Result<Fetched> {
        match self.script.pop_front() {
            Some(next) => next,
            None if self.close_at_end => Ok(Fetched::Closed),
            None => {
                thread::sleep(IDLE);
                Ok(Fetched::Idle)
            }
        }
    }
}


// sink that records what it was given.
pub(crate) struct RecordingSink {
    delivered: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_remaining: usize,
    cause: ShutdownCause,
}

impl RecordingSink {
    pub(crate) fn new(cause: ShutdownCause) -> Self {
        RecordingSink { delivered: Default::default(), fail_remaining: 0, cause }
    }

    // fail the first n deliveries without recording them.
    pub(crate) fn failing_first(mut self, n: usize) -> Self {
        self.fail_remaining = n;
        self
    }

    pub(crate) fn delivered(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.delivered)
    }
}

impl Sink for RecordingSink {
    fn deliver(&mut self, msg: &Message) -> io::Result<()> {
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(io::Error::new(io::ErrorKind::Other, "scripted delivery failure"));
        }
        self.delivered.lock().unwrap().push(msg.as_bytes().to_vec());
        Ok(())
    }

    fn sentinel_cause(&self) -> ShutdownCause {
        self.cause
    }
}


// operator who types a fixed script, then either goes quiet or hits end-of-input.
pub(crate) struct ScriptedReader {
    lines: VecDeque<Bytes>,
    close_at_end: bool,
}

impl ScriptedReader {
    pub(crate) fn new<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        ScriptedReader {
            lines: lines.into_iter().map(Into::into).collect(),
            close_at_end: false,
        }
    }

    pub(crate) fn then_close(mut self) -> Self {
        self.close_at_end = true;
        self
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self) -> io::Result<ReadLine> {
        match self.lines.pop_front() {
            Some(line) => Ok(ReadLine::Line(line)),
            None if self.close_at_end => Ok(ReadLine::Closed),
            None => {
                thread::sleep(IDLE);
                Ok(ReadLine::Idle)
            }
        }
    }
}


// screen whose contents can be inspected from another thread.
#[derive(Clone, Default)]
pub(crate) struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl SharedWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl LineWriter for SharedWriter {
    fn write_line(&mut self, prefix: &[u8], line: &[u8]) -> io::Result<()> {
        let mut lock = self.0.lock().unwrap();
        lock.extend_from_slice(prefix);
        lock.extend_from_slice(line);
        Ok(())
    }
}


// transport that records sends and replays queued datagrams.
#[derive(Default)]
pub(crate) struct MemoryTransport {
    sent: Mutex<Vec<Vec<u8>>>,
    inbox: Mutex<VecDeque<io::Result<Vec<u8>>>>,
    fail_sends: bool,
}

impl MemoryTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    // queue a datagram for receive.
    pub(crate) fn deliver(&self, datagram: &[u8]) {
        self.inbox.lock().unwrap().push_back(Ok(datagram.to_vec()));
    }

    pub(crate) fn fail_next_receive(&self) {
        self.inbox.lock().unwrap()
            .push_back(Err(io::Error::new(io::ErrorKind::ConnectionReset, "scripted receive failure")));
    }

    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for MemoryTransport {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_sends {
            return Err(io::Error::new(io::ErrorKind::Other, "scripted send failure"));
        }
        self.sent.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    fn receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        let next = self.inbox.lock().unwrap().pop_front();
        match next {
            Some(Ok(datagram)) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok(Some(datagram.len()))
            }
            Some(Err(e)) => Err(e),
            None => {
                thread::sleep(IDLE);
                Ok(None)
            }
        }
    }
}
