//! The producer-consumer pattern both directions of a session are built from.
//!
//! ```text
//!  Source --fetch--> run_producer --push--> Queue --pop_wait--> run_consumer --deliver--> Sink
//! ```
//!
//! - [`input`]: keyboard -> send queue -> transport
//! - [`receive`]: transport -> display queue -> screen
//!
//! Neither loop ever exits because of an error. A failed fetch or delivery is logged and the
//! message involved (if any) is dropped. Both loops check the shutdown signal at their head.
//! The sentinel is detected on the consumer side in both directions, after it has been
//! delivered, so it still reaches the peer or the screen.

pub mod input;
pub mod receive;

use crate::{
    message::Message,
    queue::api::Queue,
    shutdown::{Shutdown, ShutdownCause},
};
use std::io;


/// Outcome of one [`Source::fetch`]
#[derive(Debug)]
pub enum Fetched {
    /// A new message. Empty messages are dropped rather than enqueued.
    Message(Message),
    /// The blocking call returned without data
    Idle,
    /// The source is exhausted. The producer stops.
    Closed,
}

/// Upstream end of a pipeline
pub trait Source: Send {
    /// Block, for at most a bounded time, for the next message
    fn fetch(&mut self) -> io::Result<Fetched>;
}

/// Downstream end of a pipeline
pub trait Sink: Send {
    /// Hand a message to its final destination
    fn deliver(&mut self, msg: &Message) -> io::Result<()>;

    /// Reported as the shutdown cause when this sink delivers the sentinel
    fn sentinel_cause(&self) -> ShutdownCause;
}


/// Per-stage counters returned when a stage loop exits
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct StageStats {
    /// Messages enqueued (producer) or delivered (consumer)
    pub messages: u64,
    /// Empty messages a producer dropped
    pub skipped: u64,
    /// Failed fetches or deliveries
    pub errors: u64,
}


/// Move messages from `source` into `queue` until shutdown is requested or the source closes
pub fn run_producer<S: Source>(
    mut source: S,
    queue: &Queue<Message>,
    shutdown: &Shutdown,
) -> StageStats {
    let mut stats = StageStats::default();
    while !shutdown.is_requested() {
        match source.fetch() {
            Ok(Fetched::Message(msg)) if msg.is_empty() => {
                debug!("dropping empty message");
                stats.skipped += 1;
            }
            Ok(Fetched::Message(msg)) => {
                trace!(len = msg.len(), "enqueueing message");
                queue.push(msg);
                stats.messages += 1;
            }
            Ok(Fetched::Idle) => (),
            Ok(Fetched::Closed) => {
                info!("source closed, producer stopping");
                break;
            }
            Err(e) => {
                error!(error = %e, "failed to fetch message");
                stats.errors += 1;
            }
        }
    }
    debug!(?stats, "producer exiting");
    stats
}

/// Move messages from `queue` into `sink` until shutdown is requested
///
/// Delivering the sentinel requests shutdown with the sink's
/// [`sentinel_cause`](Sink::sentinel_cause).
pub fn run_consumer<K: Sink>(
    mut sink: K,
    queue: &Queue<Message>,
    shutdown: &Shutdown,
) -> StageStats {
    let mut stats = StageStats::default();
    while let Ok(msg) = queue.pop_wait(shutdown) {
        match sink.deliver(&msg) {
            Ok(()) => {
                trace!(len = msg.len(), "delivered message");
                stats.messages += 1;
            }
            Err(e) => {
                error!(error = %e, "failed to deliver message");
                stats.errors += 1;
            }
        }
        if msg.is_sentinel() {
            shutdown.request(sink.sentinel_cause());
        }
    }
    debug!(?stats, "consumer exiting");
    stats
}
