// implementation of the pipeline queue.
//
// the architecture is a cut-down version of a channel:
//
// queue handles wrap around Arc<shared state>
//                                |
//          /---------------------/
//          v
//       shared state
//          |
//          |------ a mutex around a VecDeque<T> holding the buffered elements, oldest at the
//          |       front. it is unbounded, so pushing never blocks.
//          |
//          \------ a condvar, which is only ever waited on or notified while holding that same
//                  mutex. a single lock domain is what rules out lost wakeups: a producer's
//                  notify can't slip in between a consumer checking for emptiness and the
//                  consumer starting to wait.
//
// cancellation is not owned by the queue. a consumer waits until either an element is present
// or the session's Shutdown handle reports a request, and Shutdown takes every attached queue's
// lock before notifying it, for the same lost-wakeup reason.
//
// the organization of these modules is as such:
//
//      core: owns the mutex and condvar, and is the only place that touches them.
//        ^
//        |
//      api: thin public handle around core.
//
// there is also the error module, which contains the relevant error types, which is also
// re-exported publically.

pub(crate) mod error;
pub(crate) mod api;

mod core;
