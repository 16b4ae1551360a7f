// the only code that touches the queue's lock and condvar.

use crate::shutdown::{Shutdown, Wake};
use std::{
    collections::VecDeque,
    sync::{
        Condvar,
        Mutex,
        MutexGuard,
        PoisonError,
    },
};


// queue shared state.
pub(crate) struct Shared<T> {
    // buffered elements, oldest at the front.
    elems: Mutex<VecDeque<T>>,
    // notified whenever an element is pushed or shutdown is requested. only ever used while
    // holding `elems`.
    cond: Condvar,
}

impl<T> Shared<T> {
    // construct empty.
    pub(crate) fn new() -> Self {
        Shared {
            elems: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
        }
    }

    // lock the elements.
    //
    // a stage that panicked while holding the lock can't have left the VecDeque half-modified
    // in any way we care about, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.elems.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // append to the back and wake all waiters.
    pub(crate) fn push(&self, elem: T) {
        let mut lock = self.lock();
        lock.push_back(elem);
        self.cond.notify_all();
    }

    // take the front if there is one.
    pub(crate) fn pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    // current number of buffered elements.
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    // block until the front can be taken or shutdown is requested, in which case return none.
    //
    // both predicates are re-checked under the lock after every wake, so spurious wakes and
    // wakes that lost the race for the element just go back to waiting.
    pub(crate) fn pop_wait(&self, shutdown: &Shutdown) -> Option<T> {
        let mut lock = self.lock();
        loop {
            if shutdown.is_requested() {
                return None;
            }
            if let Some(elem) = lock.pop_front() {
                return Some(elem);
            }
            lock = self.cond.wait(lock).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl<T: Send> Wake for Shared<T> {
    fn wake_all(&self) {
        // taking the lock orders this notify after any waiter's predicate check
        let _lock = self.lock();
        self.cond.notify_all();
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let elems = self.elems.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !elems.is_empty() {
            debug!(count = elems.len(), "discarding undelivered queue elements");
        }
    }
}
