//! A running chat session and its shutdown coordinator.
//!
//! ```text
//!  keyboard --> [send queue] --> send ------> Transport
//!  Transport --> receive --> [display queue] --> display --> screen
//! ```
//!
//! [`Session::start`] owns everything the four stage threads share: both queues, the
//! [`Shutdown`] handle, and the transport. Nothing is global, so several sessions can run in one
//! process. [`Session::wait`] walks the shutdown lifecycle from the coordinator's side:
//!
//! 1. block until some stage requests shutdown (`CancelRequested`),
//! 2. move to `Draining` and join every stage thread,
//! 3. release the queues and move to `Terminated`.
//!
//! Join handles are consumed by the join, so redundant shutdown requests can never cause a
//! second join. Dropping a [`Session`] that was never waited on walks the same lifecycle with
//! [`ShutdownCause::Dropped`].

use crate::{
    console::{LineReader, LineWriter},
    message::Message,
    pipeline::{
        input::{Keyboard, Outbound},
        receive::{Display, Inbound},
        run_consumer,
        run_producer,
        StageStats,
    },
    queue::api::Queue,
    shutdown::{Shutdown, ShutdownCause, ShutdownState},
    transport::Transport,
    util::RequestOnPanic,
};
use std::{
    io,
    mem,
    sync::Arc,
    thread::{self, JoinHandle},
};


/// Name of the thread reading operator lines
pub const KEYBOARD: &str = "keyboard";
/// Name of the thread sending datagrams
pub const SEND: &str = "send";
/// Name of the thread receiving datagrams
pub const RECEIVE: &str = "receive";
/// Name of the thread writing to the screen
pub const DISPLAY: &str = "display";


/// Handle to a running session
///
/// Dropping this without calling [`wait`](Self::wait) requests shutdown and joins every stage
/// thread before returning.
pub struct Session {
    shutdown: Shutdown,
    send_queue: Queue<Message>,
    display_queue: Queue<Message>,
    stages: Vec<Stage>,
}

struct Stage {
    name: &'static str,
    join: JoinHandle<StageStats>,
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// What triggered shutdown
    pub cause: ShutdownCause,
    /// Outcome of each stage, in start order
    pub stages: Vec<StageReport>,
    /// Messages still in the send queue at teardown
    pub unsent: usize,
    /// Messages still in the display queue at teardown
    pub undisplayed: usize,
}

/// How one stage thread ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: &'static str,
    /// `None` if the thread panicked
    pub stats: Option<StageStats>,
}

impl Report {
    /// Look up a stage by name
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    /// Names of stages whose threads panicked
    pub fn panicked(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().filter(|stage| stage.stats.is_none()).map(|stage| stage.name)
    }
}

impl Session {
    /// Build the queues and start the four stage threads
    ///
    /// If a thread can't be spawned, the threads already started are shut down and joined
    /// before the error is returned.
    pub fn start<R, W, T>(reader: R, writer: W, transport: T) -> io::Result<Self>
    where
        R: LineReader + 'static,
        W: LineWriter + 'static,
        T: Transport + 'static,
    {
        let shutdown = Shutdown::new();
        let send_queue = Queue::new();
        let display_queue = Queue::new();
        shutdown.attach(&send_queue);
        shutdown.attach(&display_queue);
        let transport = Arc::new(transport);

        let mut session = Session {
            shutdown,
            send_queue,
            display_queue,
            stages: Vec::with_capacity(4),
        };

        // consumers first, so nothing is ever pushed without someone to pop it
        let outbound = Outbound::new(Arc::clone(&transport));
        session.spawn(SEND, {
            let (queue, shutdown) = (session.send_queue.clone(), session.shutdown.clone());
            move || run_consumer(outbound, &queue, &shutdown)
        })?;
        let display = Display::new(writer);
        session.spawn(DISPLAY, {
            let (queue, shutdown) = (session.display_queue.clone(), session.shutdown.clone());
            move || run_consumer(display, &queue, &shutdown)
        })?;
        let inbound = Inbound::new(transport);
        session.spawn(RECEIVE, {
            let (queue, shutdown) = (session.display_queue.clone(), session.shutdown.clone());
            move || run_producer(inbound, &queue, &shutdown)
        })?;
        let keyboard = Keyboard::new(reader);
        session.spawn(KEYBOARD, {
            let (queue, shutdown) = (session.send_queue.clone(), session.shutdown.clone());
            move || run_producer(keyboard, &queue, &shutdown)
        })?;

        info!("session started");
        Ok(session)
    }

    // spawn a named stage thread. on failure, tear down what's already running.
    fn spawn<F>(&mut self, name: &'static str, body: F) -> io::Result<()>
    where
        F: FnOnce() -> StageStats + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let spawned = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let _guard = RequestOnPanic::new(shutdown, name);
                let span = info_span!("stage", name);
                let _enter = span.enter();
                body()
            });
        match spawned {
            Ok(join) => {
                self.stages.push(Stage { name, join });
                Ok(())
            }
            Err(e) => {
                error!(stage = name, error = %e, "failed to spawn stage thread");
                self.abandon(ShutdownCause::SpawnFailed(name));
                Err(e)
            }
        }
    }

    /// The session's shutdown signal
    ///
    /// Requesting shutdown through it ends the session just like a sentinel would.
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Current lifecycle state
    pub fn state(&self) -> ShutdownState {
        self.shutdown.state()
    }

    /// Block until some stage requests shutdown, then join every stage and tear down
    pub fn wait(mut self) -> Report {
        let cause = self.shutdown.wait_requested();
        info!(%cause, "session shutting down");
        let stages = self.join_all();

        let report = Report {
            cause,
            stages,
            unsent: self.send_queue.len(),
            undisplayed: self.display_queue.len(),
        };
        // last handles to the queues. any remaining messages are dropped here.
        drop(mem::take(&mut self.send_queue));
        drop(mem::take(&mut self.display_queue));
        self.shutdown.mark_terminated();
        info!(?report, "session terminated");
        report
    }

    // request shutdown if nobody has yet, then join every started stage and terminate.
    fn abandon(&mut self, cause: ShutdownCause) {
        self.shutdown.request(cause);
        self.join_all();
        self.shutdown.mark_terminated();
    }

    // move to draining and join every started stage. shutdown must already be requested.
    fn join_all(&mut self) -> Vec<StageReport> {
        self.shutdown.begin_draining();
        self.stages
            .drain(..)
            .map(|Stage { name, join }| {
                let stats = match join.join() {
                    Ok(stats) => Some(stats),
                    Err(_) => {
                        warn!(stage = name, "joined panicked stage");
                        None
                    }
                };
                StageReport { name, stats }
            })
            .collect()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // empty once waited on, or once a failed start has torn down
        if !self.stages.is_empty() {
            self.abandon(ShutdownCause::Dropped);
        }
    }
}
