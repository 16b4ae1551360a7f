//! Keyboard -> send queue -> transport.

use super::{Fetched, Sink, Source};
use crate::{
    console::{LineReader, ReadLine},
    message::Message,
    shutdown::ShutdownCause,
    transport::Transport,
};
use std::io;


/// Input producer source: operator lines from a [`LineReader`]
pub struct Keyboard<R>(R);

impl<R: LineReader> Keyboard<R> {
    pub fn new(reader: R) -> Self {
        Keyboard(reader)
    }
}

impl<R: LineReader> Source for Keyboard<R> {
    fn fetch(&mut self) -> io::Result<Fetched> {
        Ok(match self.0.read_line()? {
            ReadLine::Line(line) => Fetched::Message(Message::new(line)),
            ReadLine::Idle => Fetched::Idle,
            ReadLine::Closed => Fetched::Closed,
        })
    }
}


/// Send consumer sink: one datagram per message
pub struct Outbound<T>(T);

impl<T: Transport> Outbound<T> {
    pub fn new(transport: T) -> Self {
        Outbound(transport)
    }
}

impl<T: Transport> Sink for Outbound<T> {
    fn deliver(&mut self, msg: &Message) -> io::Result<()> {
        self.0.send(msg.as_bytes())
    }

    fn sentinel_cause(&self) -> ShutdownCause {
        ShutdownCause::LocalSentinel
    }
}
