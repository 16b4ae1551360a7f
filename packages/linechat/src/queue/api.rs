// exposed API of queues

use super::{
    error::*,
    core,
};
use crate::shutdown::{Shutdown, Wake};
use std::sync::Arc;


/// Handle to an unbounded, thread-safe FIFO queue
///
/// Cloning produces another handle to the same queue. Elements are moved in by
/// [`push`](Self::push) and moved out by exactly one successful pop, so an element is never
/// reachable from two places at once.
pub struct Queue<T>(Arc<core::Shared<T>>);

impl<T> Queue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Queue(Arc::new(core::Shared::new()))
    }

    /// Append an element at the back and wake any waiting consumer
    ///
    /// Never blocks beyond briefly taking the queue's lock.
    pub fn push(&self, elem: T) {
        self.0.push(elem);
    }

    /// Remove and return the front element, or `None` if empty
    pub fn pop(&self) -> Option<T> {
        self.0.pop()
    }

    /// Number of buffered elements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no elements are buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block until the front element can be removed, or until `shutdown` is requested
    ///
    /// There is no timeout. `shutdown` must have this queue [attached](Shutdown::attach) for a
    /// shutdown request to wake a consumer that is already waiting. Shutdown takes priority:
    /// once requested, this returns [`CancelledError`] even if elements remain.
    pub fn pop_wait(&self, shutdown: &Shutdown) -> Result<T, CancelledError> {
        self.0.pop_wait(shutdown).ok_or(CancelledError)
    }
}

impl<T: Send + 'static> Queue<T> {
    // type-erased handle for the shutdown broadcast list.
    pub(crate) fn waker(&self) -> Arc<dyn Wake> {
        self.0.clone()
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Queue(Arc::clone(&self.0))
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}


// ==== tests ====
