//! Transport -> display queue -> screen.

use super::{Fetched, Sink, Source};
use crate::{
    console::LineWriter,
    message::{Message, DISPLAY_PREFIX, MAX_DATAGRAM},
    shutdown::ShutdownCause,
    transport::Transport,
};
use std::io;


/// Receive producer source: one message per datagram
///
/// Zero-length datagrams come out as empty messages, which the producer drops.
pub struct Inbound<T> {
    transport: T,
    // reused for every receive. messages get their own right-sized copy.
    buf: Box<[u8]>,
}

impl<T: Transport> Inbound<T> {
    pub fn new(transport: T) -> Self {
        Inbound {
            transport,
            buf: vec![0; MAX_DATAGRAM].into_boxed_slice(),
        }
    }
}

// empty buffer with room for exactly `len` bytes, reporting allocation failure as an error.
fn alloc_exact(len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
    Ok(buf)
}

// copy into a new exactly-sized allocation.
fn copy_datagram(datagram: &[u8]) -> io::Result<Vec<u8>> {
    let mut copy = alloc_exact(datagram.len())?;
    copy.extend_from_slice(datagram);
    Ok(copy)
}

impl<T: Transport> Source for Inbound<T> {
    fn fetch(&mut self) -> io::Result<Fetched> {
        let Some(n) = self.transport.receive(&mut self.buf)? else {
            return Ok(Fetched::Idle);
        };
        let datagram = copy_datagram(&self.buf[..n])?;
        Ok(Fetched::Message(Message::new(datagram)))
    }
}


/// Display consumer sink: prefixed lines to a [`LineWriter`]
pub struct Display<W>(W);

impl<W: LineWriter> Display<W> {
    pub fn new(writer: W) -> Self {
        Display(writer)
    }
}

impl<W: LineWriter> Sink for Display<W> {
    fn deliver(&mut self, msg: &Message) -> io::Result<()> {
        self.0.write_line(DISPLAY_PREFIX, msg.as_bytes())
    }

    fn sentinel_cause(&self) -> ShutdownCause {
        ShutdownCause::RemoteSentinel
    }
}
