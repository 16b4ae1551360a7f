//! Chat messages.

use bytes::Bytes;
use std::fmt::{self, Formatter, Debug};


/// Largest datagram payload read from the transport.
///
/// 65,535 bytes minus the 8-byte UDP header, the 20-byte IPv4 header, and one spare byte.
pub const MAX_DATAGRAM: usize = 65_506;

/// Content of the termination message.
pub const SENTINEL: &[u8] = b"!\n";

/// Literal written before every displayed message.
pub const DISPLAY_PREFIX: &[u8] = b"Received: ";


/// One line of chat text, including its trailing newline if it had one.
///
/// Deliberately not `Clone`: a message is owned by exactly one pipeline stage or queue at a time.
pub struct Message(Bytes);

impl Message {
    /// Wrap bytes as a message.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Message(bytes.into())
    }

    /// Message content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the message has no content.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is the termination message, `!` followed by a newline.
    pub fn is_sentinel(&self) -> bool {
        &self.0[..] == SENTINEL
    }
}

impl Debug for Message {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // chat text is usually utf-8, but nothing guarantees it
        write!(f, "Message({:?})", String::from_utf8_lossy(&self.0))
    }
}
