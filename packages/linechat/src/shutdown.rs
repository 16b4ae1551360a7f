//! Session-wide cooperative shutdown signal.
//!
//! A [`Shutdown`] handle is shared by every stage of a session. Stages poll
//! [`is_requested`](Shutdown::is_requested) at the head of their loops, consumers parked on a
//! [`Queue`] are woken by the request itself, and the coordinator blocks in
//! [`wait_requested`](Shutdown::wait_requested).

use crate::queue::api::Queue;
use std::{
    fmt::{self, Display, Formatter},
    sync::{
        atomic::{
            Ordering::{Acquire, AcqRel, Release},
            AtomicU8,
        },
        Arc,
        Condvar,
        Mutex,
        MutexGuard,
        PoisonError,
    },
};


// something a shutdown request must wake.
pub(crate) trait Wake: Send + Sync {
    // wake every thread waiting on it. must synchronize with waiters' predicate checks.
    fn wake_all(&self);
}


/// Lifecycle of a session
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ShutdownState {
    /// All stages active
    Running,
    /// Some stage has requested shutdown and every waiter has been woken
    CancelRequested,
    /// The coordinator is joining the stages
    Draining,
    /// Every stage has been joined
    Terminated,
}

impl ShutdownState {
    fn from_byte(b: u8) -> Self {
        if b == ShutdownState::Running as u8 {
            ShutdownState::Running
        } else if b == ShutdownState::CancelRequested as u8 {
            ShutdownState::CancelRequested
        } else if b == ShutdownState::Draining as u8 {
            ShutdownState::Draining
        } else if b == ShutdownState::Terminated as u8 {
            ShutdownState::Terminated
        } else {
            unreachable!("invalid shutdown state byte: {}", b)
        }
    }
}

/// Why shutdown was requested
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShutdownCause {
    /// The operator's sentinel was sent to the peer
    LocalSentinel,
    /// The peer's sentinel was displayed
    RemoteSentinel,
    /// A stage thread panicked
    StagePanicked(&'static str),
    /// A stage thread could not be started
    SpawnFailed(&'static str),
    /// The session handle was dropped without being waited on
    Dropped,
}

impl Display for ShutdownCause {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ShutdownCause::LocalSentinel => f.write_str("local sentinel sent"),
            ShutdownCause::RemoteSentinel => f.write_str("remote sentinel received"),
            ShutdownCause::StagePanicked(stage) => write!(f, "{} stage panicked", stage),
            ShutdownCause::SpawnFailed(stage) => write!(f, "{} stage failed to start", stage),
            ShutdownCause::Dropped => f.write_str("session handle dropped"),
        }
    }
}


/// Cloneable handle to a session's shutdown signal
#[derive(Clone)]
pub struct Shutdown(Arc<Shared>);

struct Shared {
    // a ShutdownState. only ever moves forwards.
    state: AtomicU8,
    // guards the cause and the coordinator's wait.
    lockable: Mutex<Lockable>,
    // notified once, when the request happens.
    cond: Condvar,
}

struct Lockable {
    // set by the request that won the Running -> CancelRequested transition.
    cause: Option<ShutdownCause>,
    // queues to broadcast on request.
    wakers: Vec<Arc<dyn Wake>>,
}

impl Shutdown {
    /// Construct in the [`Running`](ShutdownState::Running) state with nothing attached
    pub fn new() -> Self {
        Shutdown(Arc::new(Shared {
            state: AtomicU8::new(ShutdownState::Running as u8),
            lockable: Mutex::new(Lockable { cause: None, wakers: Vec::new() }),
            cond: Condvar::new(),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, Lockable> {
        self.0.lockable.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a queue whose waiting consumers must be woken when shutdown is requested
    ///
    /// If shutdown was already requested, the queue is woken immediately.
    pub fn attach<T: Send + 'static>(&self, queue: &Queue<T>) {
        let waker = queue.waker();
        let mut lock = self.lock();
        if self.is_requested() {
            drop(lock);
            waker.wake_all();
        } else {
            lock.wakers.push(waker);
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ShutdownState {
        ShutdownState::from_byte(self.0.state.load(Acquire))
    }

    /// Whether shutdown has been requested
    pub fn is_requested(&self) -> bool {
        self.state() != ShutdownState::Running
    }

    /// The cause of the winning request, if any
    pub fn cause(&self) -> Option<ShutdownCause> {
        self.lock().cause
    }

    /// Request shutdown
    ///
    /// Idempotent. Only the first call moves the state to
    /// [`CancelRequested`](ShutdownState::CancelRequested), records `cause`, and wakes all
    /// attached queues and the coordinator. Returns whether this call was that first call.
    pub fn request(&self, cause: ShutdownCause) -> bool {
        let won = self.0.state
            .compare_exchange(
                ShutdownState::Running as u8,
                ShutdownState::CancelRequested as u8,
                AcqRel,
                Acquire,
            )
            .is_ok();
        if !won {
            trace!(%cause, "redundant shutdown request");
            return false;
        }
        info!(%cause, "shutdown requested");

        let wakers = {
            let mut lock = self.lock();
            lock.cause = Some(cause);
            self.0.cond.notify_all();
            // attach won't add any more now that the state has moved on
            std::mem::take(&mut lock.wakers)
        };
        for waker in wakers {
            waker.wake_all();
        }
        true
    }

    /// Block, without timeout, until shutdown has been requested, and return its cause
    pub fn wait_requested(&self) -> ShutdownCause {
        let mut lock = self.lock();
        loop {
            if let Some(cause) = lock.cause {
                return cause;
            }
            lock = self.0.cond.wait(lock).unwrap_or_else(PoisonError::into_inner);
        }
    }

    // coordinator-only transitions. each asserts the state it moves from.

    pub(crate) fn begin_draining(&self) {
        self.advance(ShutdownState::CancelRequested, ShutdownState::Draining);
    }

    pub(crate) fn mark_terminated(&self) {
        self.advance(ShutdownState::Draining, ShutdownState::Terminated);
    }

    fn advance(&self, from: ShutdownState, to: ShutdownState) {
        let prev = self.0.state.swap(to as u8, Release);
        debug_assert_eq!(prev, from as u8, "invalid shutdown transition (internal bug)");
        debug!(state = ?to, "session state changed");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
